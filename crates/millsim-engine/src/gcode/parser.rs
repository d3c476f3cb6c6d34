//! Program line and file name parser
//!
//! Accepts absolute linear moves only (`G01`), with an optional `N` sequence
//! number and any non-empty subset of the X, Y, Z axes in that order.
//! Whitespace anywhere in a line is ignored and letters match in either case.

use std::path::Path;
use std::sync::OnceLock;

use millsim_core::{Instruction, ParseError, ToolKind, Waypoint};
use regex::Regex;
use tracing::{debug, trace, warn};

/// Axis values as written on one program line, in file coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct MoveWords {
    x: Option<f32>,
    y: Option<f32>,
    z: Option<f32>,
}

impl MoveWords {
    /// Resolve against the previous target.
    ///
    /// File axes map onto model axes as `(x, z_file, y_file)` so that the
    /// file's Z becomes height. Missing axes inherit from `last`.
    fn resolve(self, last: &Waypoint) -> Waypoint {
        Waypoint {
            x: self.x.unwrap_or(last.x),
            y: self.z.unwrap_or(last.y),
            z: self.y.unwrap_or(last.z),
        }
    }
}

/// Accumulator threaded through the line fold
#[derive(Debug, Default)]
struct ParseState {
    last: Waypoint,
    instructions: Vec<Instruction>,
}

fn move_regex() -> &'static Regex {
    static MOVE_REGEX: OnceLock<Regex> = OnceLock::new();
    MOVE_REGEX.get_or_init(|| {
        const NUM: &str = r"[-+]?(?:\d+(?:\.\d*)?|\.\d+)(?:E[-+]?\d+)?";
        let pattern = format!(
            r"(?i)^(?:N\d+)?G01(?:X(?P<x>{NUM}))?(?:Y(?P<y>{NUM}))?(?:Z(?P<z>{NUM}))?$"
        );
        Regex::new(&pattern).expect("invalid regex pattern")
    })
}

/// Match one whitespace-free line against the accepted move shapes.
fn parse_move_words(compact: &str) -> Option<MoveWords> {
    let caps = move_regex().captures(compact)?;
    let axis = |name: &str| -> Option<Option<f32>> {
        match caps.name(name) {
            Some(m) => m
                .as_str()
                .parse::<f32>()
                .ok()
                .filter(|value| value.is_finite())
                .map(Some),
            None => Some(None),
        }
    };

    let words = MoveWords {
        x: axis("x")?,
        y: axis("y")?,
        z: axis("z")?,
    };

    if words.x.is_none() && words.y.is_none() && words.z.is_none() {
        return None;
    }
    Some(words)
}

/// Parse program lines into resolved move instructions.
///
/// Blank lines are skipped. The first malformed line aborts the whole parse
/// and is reported with its 1-based line number. Once every line has been
/// resolved the depth axis (model Z, the file's Y) is negated for the whole
/// program. Values that overflow `f32` are rejected with the line.
pub fn parse_instructions<I, S>(lines: I) -> Result<Vec<Instruction>, ParseError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let state = lines.into_iter().enumerate().try_fold(
        ParseState::default(),
        |mut state, (index, line)| -> Result<ParseState, ParseError> {
            let line = line.as_ref();
            let compact: String = line.chars().filter(|c| !c.is_whitespace()).collect();
            if compact.is_empty() {
                return Ok(state);
            }

            let words = parse_move_words(&compact).ok_or_else(|| {
                warn!("Rejecting program at line {}: '{}'", index + 1, line);
                ParseError::BadInstructionLine {
                    line_number: index + 1,
                    line: line.to_string(),
                }
            })?;

            let target = words.resolve(&state.last);
            trace!("line {}: move to {}", index + 1, target);
            state.last = target;
            state.instructions.push(Instruction::Move { target });
            Ok(state)
        },
    )?;

    let instructions = state
        .instructions
        .into_iter()
        .map(|instruction| match instruction {
            Instruction::Move { target } => Instruction::Move {
                target: Waypoint {
                    z: -target.z,
                    ..target
                },
            },
        })
        .collect::<Vec<_>>();
    debug!("Parsed {} move instructions", instructions.len());
    Ok(instructions)
}

/// Decode the tool from a program file extension.
///
/// The first letter picks the kind (`f` flat, `k` spherical) and the one or
/// two digits after it give the tool size. A size of 1 is taken as the
/// radius; any other size is a diameter and is halved with integer division.
pub fn parse_tool_extension(filename: &Path) -> Result<(ToolKind, u32), ParseError> {
    let extension = filename
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();

    let mut chars = extension.chars();
    let kind = chars
        .next()
        .and_then(ToolKind::from_extension_letter)
        .ok_or_else(|| ParseError::BadExtensionToolKind {
            extension: extension.to_string(),
        })?;

    let digits = chars.as_str();
    let bad_radius = || ParseError::BadExtensionRadius {
        extension: extension.to_string(),
    };
    if digits.is_empty() || digits.len() > 2 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(bad_radius());
    }
    let size: u32 = digits.parse().map_err(|_| bad_radius())?;

    let radius = if size == 1 { 1 } else { size / 2 };
    debug!(
        "Tool from extension '{}': {} radius {}",
        extension, kind, radius
    );
    Ok((kind, radius))
}
