//! Cut legality rules
//!
//! Checked in order, the first failing rule wins:
//! 1. the new height must not be below the zero plane
//! 2. a flat tool must not remove material while descending
//! 3. a single pass must not remove more than the cutting length

use millsim_core::{CutError, ToolKind, Waypoint};

/// Check one candidate height update.
///
/// `new_height` is the tool surface height over the cell, `current` is the
/// cell's height before the update, and `from`/`to` are the endpoints of the
/// segment being travelled. The update only removes material when
/// `new_height < current`.
pub fn validate_cut(
    kind: ToolKind,
    cutting_length: f32,
    new_height: f32,
    current: f32,
    from: &Waypoint,
    to: &Waypoint,
) -> Result<(), CutError> {
    if new_height < 0.0 {
        return Err(CutError::NegativeHeight);
    }

    let cuts = new_height < current;
    if kind == ToolKind::Flat && to.y < from.y && cuts {
        return Err(CutError::IllegalFlatPlunge);
    }

    if cuts && current - new_height > cutting_length {
        return Err(CutError::ToolBreakage);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEVEL: (Waypoint, Waypoint) = (
        Waypoint {
            x: 0.0,
            y: 5.0,
            z: 0.0,
        },
        Waypoint {
            x: 1.0,
            y: 5.0,
            z: 0.0,
        },
    );

    fn descending() -> (Waypoint, Waypoint) {
        (Waypoint::new(0.0, 5.0, 0.0), Waypoint::new(1.0, 4.0, 0.0))
    }

    #[test]
    fn test_negative_height_wins_first() {
        let (a, b) = descending();
        assert_eq!(
            validate_cut(ToolKind::Flat, 0.1, -0.01, 50.0, &a, &b),
            Err(CutError::NegativeHeight)
        );
        assert_eq!(
            validate_cut(ToolKind::Flat, 10.0, 0.0, 5.0, &LEVEL.0, &LEVEL.1),
            Ok(())
        );
    }

    #[test]
    fn test_flat_plunge_only_when_cutting_downwards() {
        let (a, b) = descending();
        assert_eq!(
            validate_cut(ToolKind::Flat, 100.0, 4.0, 10.0, &a, &b),
            Err(CutError::IllegalFlatPlunge)
        );
        // no material removed
        assert_eq!(validate_cut(ToolKind::Flat, 100.0, 4.0, 4.0, &a, &b), Ok(()));
        // ascending
        assert_eq!(validate_cut(ToolKind::Flat, 100.0, 4.0, 10.0, &b, &a), Ok(()));
        // spherical tools may plunge
        assert_eq!(
            validate_cut(ToolKind::Spherical, 100.0, 4.0, 10.0, &a, &b),
            Ok(())
        );
    }

    #[test]
    fn test_tool_breakage_boundary() {
        let (a, b) = LEVEL;
        assert_eq!(validate_cut(ToolKind::Flat, 2.0, 8.0, 10.0, &a, &b), Ok(()));
        assert_eq!(
            validate_cut(ToolKind::Flat, 2.0, 7.5, 10.0, &a, &b),
            Err(CutError::ToolBreakage)
        );
        // a non-cutting candidate never breaks the tool
        assert_eq!(validate_cut(ToolKind::Flat, 0.0, 12.0, 10.0, &a, &b), Ok(()));
    }

    #[test]
    fn test_plunge_reported_before_breakage() {
        let (a, b) = descending();
        assert_eq!(
            validate_cut(ToolKind::Flat, 1.0, 1.0, 50.0, &a, &b),
            Err(CutError::IllegalFlatPlunge)
        );
        assert_eq!(
            validate_cut(ToolKind::Spherical, 1.0, 1.0, 50.0, &a, &b),
            Err(CutError::ToolBreakage)
        );
    }
}
