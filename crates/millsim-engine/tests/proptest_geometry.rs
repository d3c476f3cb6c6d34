//! Property-based tests for rasterization, cut validation and tool profiles.

use millsim_core::{CutError, ToolKind, Waypoint};
use millsim_engine::{build_tool_profile, rasterize_segment, validate_cut};
use proptest::prelude::*;

fn arb_kind() -> impl Strategy<Value = ToolKind> {
    prop_oneof![Just(ToolKind::Flat), Just(ToolKind::Spherical)]
}

fn arb_waypoint() -> impl Strategy<Value = Waypoint> {
    (-50.0..50.0f32, 0.0..60.0f32, -50.0..50.0f32).prop_map(|(x, y, z)| Waypoint::new(x, y, z))
}

proptest! {
    #[test]
    fn raster_covers_segment_without_gaps(
        xa in -300i32..300,
        za in -300i32..300,
        xb in -300i32..300,
        zb in -300i32..300,
    ) {
        let steps: Vec<_> = rasterize_segment(xa, za, xb, zb).collect();
        let expected_len = (xb - xa).abs().max((zb - za).abs()) as usize + 1;

        prop_assert_eq!(steps.len(), expected_len);
        prop_assert_eq!((steps[0].x, steps[0].z), (xa, za));
        let last = steps[steps.len() - 1];
        prop_assert_eq!((last.x, last.z), (xb, zb));

        for pair in steps.windows(2) {
            prop_assert!((pair[1].x - pair[0].x).abs() <= 1);
            prop_assert!((pair[1].z - pair[0].z).abs() <= 1);
            prop_assert!(pair[1].progress > pair[0].progress);
        }
        prop_assert_eq!(steps[0].progress, 0.0);
        prop_assert!(last.progress < 1.0);
    }

    #[test]
    fn raster_is_restartable(xa in -50i32..50, za in -50i32..50, xb in -50i32..50, zb in -50i32..50) {
        let raster = rasterize_segment(xa, za, xb, zb);
        let first: Vec<_> = raster.clone().collect();
        let second: Vec<_> = raster.collect();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn negative_heights_always_rejected(
        kind in arb_kind(),
        depth in 0.0001..100.0f32,
        current in 0.0..100.0f32,
        a in arb_waypoint(),
        b in arb_waypoint(),
    ) {
        prop_assert_eq!(
            validate_cut(kind, 1000.0, -depth, current, &a, &b),
            Err(CutError::NegativeHeight)
        );
    }

    #[test]
    fn non_cutting_updates_always_pass(
        kind in arb_kind(),
        current in 0.0..100.0f32,
        above in 0.0..10.0f32,
        cutting_length in 0.0..10.0f32,
        a in arb_waypoint(),
        b in arb_waypoint(),
    ) {
        prop_assert_eq!(
            validate_cut(kind, cutting_length, current + above, current, &a, &b),
            Ok(())
        );
    }

    #[test]
    fn profile_is_odd_and_bounded(kind in arb_kind(), radius in 1u32..6, ppu in 1u32..12) {
        let profile = build_tool_profile(kind, radius, ppu);
        prop_assert_eq!(profile.size() % 2, 1);
        prop_assert_eq!(profile.size(), 2 * (radius * ppu) as usize + 1);
        prop_assert!(profile.contact_cells() > 0);
        for &offset in profile.cells().iter().flatten() {
            prop_assert!(offset >= 0.0 && offset <= radius as f32);
        }
    }
}

#[test]
fn validator_zero_height_boundary() {
    let a = Waypoint::new(0.0, 1.0, 0.0);
    let b = Waypoint::new(1.0, 1.0, 0.0);
    for kind in [ToolKind::Flat, ToolKind::Spherical] {
        assert_eq!(
            validate_cut(kind, 100.0, -0.0001, 10.0, &a, &b),
            Err(CutError::NegativeHeight)
        );
        assert_eq!(validate_cut(kind, 100.0, 0.0, 10.0, &a, &b), Ok(()));
    }
}

#[test]
fn validator_cutting_length_boundary() {
    let a = Waypoint::new(0.0, 1.0, 0.0);
    let b = Waypoint::new(1.0, 1.0, 0.0);
    for kind in [ToolKind::Flat, ToolKind::Spherical] {
        // depth of exactly 4.0
        assert_eq!(validate_cut(kind, 4.0, 6.0, 10.0, &a, &b), Ok(()));
        // depth of 4.0 plus a little
        assert_eq!(
            validate_cut(kind, 4.0, 5.999, 10.0, &a, &b),
            Err(CutError::ToolBreakage)
        );
    }
}
