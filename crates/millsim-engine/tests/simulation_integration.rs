//! End-to-end simulation tests: program text in, carved grid out

use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use millsim_core::{thread_safe_rw, GridSpec, ParseError, ThreadSafeRw, ToolKind};
use millsim_engine::{
    parse_program, read_program, FileLineSource, Grid, Program, Runner, RunnerState, Tool,
};

const DEPTH: f32 = 50.0;

fn grid_200() -> ThreadSafeRw<Grid> {
    thread_safe_rw(
        Grid::new(GridSpec {
            mesh_size: (20, 20),
            pixels_per_unit: 10,
            default_depth: DEPTH,
        })
        .unwrap(),
    )
}

fn run(program: Arc<Program>, tool: Arc<Tool>, grid: ThreadSafeRw<Grid>) -> millsim_engine::RunReport {
    let mut runner = Runner::default();
    runner.start(program, tool, grid, true).unwrap();
    runner.join().unwrap()
}

fn channel_program() -> Arc<Program> {
    Arc::new(parse_program("channel.f2", ["N10 G01 X0Y0Z0", "N20 G01 X10Y0Z0"]).unwrap())
}

#[test]
fn test_flat_tool_carves_channel() {
    let program = channel_program();
    assert_eq!(program.tool_kind, ToolKind::Flat);
    assert_eq!(program.tool_radius, 1);

    let tool = Arc::new(Tool::for_program(&program, 10, Some(60.0)));
    let grid = grid_200();
    let report = run(program, tool, Arc::clone(&grid));
    assert!(report.is_clean(), "unexpected violations: {:?}", report.violations);

    let grid = grid.read();
    // Traversed row is z = 0, i.e. cell row 100; the tool spans rows 90..=109
    for z in 90..=109 {
        assert_eq!(grid.get(150, z), Some(0.0), "row {z} should be carved");
    }
    assert_eq!(grid.get(150, 89), Some(DEPTH));
    assert_eq!(grid.get(150, 110), Some(DEPTH));

    // Starts at x = 0 (cell 100) and runs off the right edge
    assert_eq!(grid.get(90, 100), Some(0.0));
    assert_eq!(grid.get(89, 100), Some(DEPTH));
    assert_eq!(grid.get(199, 100), Some(0.0));

    let carved_rows = (0..200)
        .filter(|&z| grid.get(150, z) == Some(0.0))
        .count();
    assert_eq!(carved_rows, 20);

    assert!(grid.heights().iter().all(|&h| h == 0.0 || h == DEPTH));
}

#[test]
fn test_shallow_pass_above_zero_plane_cuts_cleanly() {
    // file Z is height, file Y is depth and lands at model z = -3
    let program = Arc::new(
        parse_program("face.f10", ["N1G01X0Y3Z45", "N2G01X5Y3Z45"]).unwrap(),
    );
    let tool = Arc::new(Tool::for_program(&program, 10, None));
    let grid = grid_200();
    let report = run(program, tool, Arc::clone(&grid));

    assert!(report.is_clean(), "unexpected violations: {:?}", report.violations);
    assert!(report.cells_cut > 0);

    let grid = grid.read();
    assert_eq!(grid.min_height(), 45.0);
    // rows 20..=119 around cell row 70
    assert_eq!(grid.get(150, 70), Some(45.0));
    assert_eq!(grid.get(150, 20), Some(45.0));
    assert_eq!(grid.get(150, 125), Some(DEPTH));
    assert_eq!(grid.get(150, 15), Some(DEPTH));
}

#[test]
fn test_tool_breakage_leaves_grid_untouched() {
    let program = channel_program();
    // default cutting length is the diameter, far less than the 50 deep cut
    let tool = Arc::new(Tool::for_program(&program, 10, None));
    let grid = grid_200();
    let report = run(program, tool, Arc::clone(&grid));

    assert!(!report.cancelled);
    assert_eq!(report.cells_cut, 0);
    assert!(report.violations.tool_breakage > 0);
    assert_eq!(report.violations.negative_height, 0);
    assert_eq!(report.segment_violations.len(), 1);
    assert_eq!(grid.read().min_height(), DEPTH);
}

#[test]
fn test_replay_is_deterministic() {
    let program = Arc::new(
        parse_program(
            "pocket.k4",
            [
                "N1G01X-5Y-5Z45",
                "N2G01X5Y-3Z46",
                "N3G01X2Y4",
                "N4G01Z47",
                "N5G01X-4Y4Z48",
                "N6G01X-4Y4Z48",
            ],
        )
        .unwrap(),
    );
    let tool = Arc::new(Tool::for_program(&program, 10, None));

    let first = grid_200();
    let second = grid_200();
    let a = run(Arc::clone(&program), Arc::clone(&tool), Arc::clone(&first));
    let b = run(program, tool, Arc::clone(&second));

    assert_eq!(first.read().heights(), second.read().heights());
    assert_eq!(a.cells_cut, b.cells_cut);
    assert_eq!(a.stamps, b.stamps);
}

#[test]
fn test_heights_never_increase() {
    let program = Arc::new(
        parse_program(
            "zigzag.f4",
            ["G01X-8Y-8Z49", "G01X8Y-6", "G01X-8Y-4Z48.5", "G01X8Y-2", "G01Z47"],
        )
        .unwrap(),
    );
    let tool = Arc::new(Tool::for_program(&program, 10, None));
    let grid = grid_200();
    let before = grid.read().heights().to_vec();
    run(program, tool, Arc::clone(&grid));

    let after = grid.read();
    assert!(before
        .iter()
        .zip(after.heights())
        .all(|(&initial, &last)| last <= initial));
    assert!(after.removed_volume() > 0.0);
}

#[test]
fn test_cancel_stops_run_early() {
    let lines: Vec<String> = (0..50)
        .map(|i| format!("G01X{}Y0Z49", if i % 2 == 0 { -8 } else { 8 }))
        .collect();
    let program = Arc::new(parse_program("slow.f2", &lines).unwrap());
    let tool = Arc::new(Tool::for_program(&program, 10, None));
    let grid = grid_200();

    let mut runner = Runner::new(Duration::from_millis(2));
    runner
        .start(program, tool, Arc::clone(&grid), false)
        .unwrap();
    std::thread::sleep(Duration::from_millis(20));
    runner.cancel();
    let report = runner.join().unwrap();

    assert!(report.cancelled);
    assert!(!runner.is_finished());
    assert!(report.segments_completed < report.segments_total);
    assert_eq!(runner.state(), RunnerState::Idle);
}

#[test]
fn test_runner_can_restart_after_join() {
    let program = channel_program();
    let tool = Arc::new(Tool::for_program(&program, 10, Some(60.0)));
    let grid = grid_200();
    let mut runner = Runner::default();

    runner
        .start(Arc::clone(&program), Arc::clone(&tool), Arc::clone(&grid), true)
        .unwrap();
    runner.join().unwrap();
    grid.write().reset();
    runner.start(program, tool, Arc::clone(&grid), true).unwrap();
    let report = runner.join().unwrap();
    assert!(runner.is_finished());
    assert!(report.cells_cut > 0);
}

#[test]
fn test_tool_profile_follows_grid_resolution() {
    let program = channel_program();
    // built for the wrong resolution; the run rebuilds it for the grid
    let tool = Arc::new(Tool::for_program(&program, 4, Some(60.0)));
    let grid = grid_200();
    run(program, tool, Arc::clone(&grid));
    let grid = grid.read();
    assert_eq!(grid.get(150, 90), Some(0.0));
    assert_eq!(grid.get(150, 109), Some(0.0));
}

#[test]
fn test_extension_decoding_from_files() {
    let dir = tempfile::tempdir().unwrap();
    let source = FileLineSource::new();

    for (name, expected) in [
        ("prog.f5", Some((ToolKind::Flat, 2))),
        ("prog.k1", Some((ToolKind::Spherical, 1))),
        ("prog.x5", None),
    ] {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "N1 G01 X0 Y0 Z0").unwrap();
        drop(file);

        match (read_program(&path, &source), expected) {
            (Ok(program), Some((kind, radius))) => {
                assert_eq!(program.tool_kind, kind);
                assert_eq!(program.tool_radius, radius);
            }
            (Err(err), None) => {
                assert!(matches!(err, ParseError::BadExtensionToolKind { .. }));
            }
            (result, _) => panic!("unexpected result for {name}: {result:?}"),
        }
    }

    let missing = read_program(Path::new("/definitely/not/here.f5"), &source);
    assert!(matches!(missing, Err(ParseError::MissingFile { .. })));
}

#[test]
fn test_bad_line_in_file_discards_program() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.k2");
    std::fs::write(&path, "N1G01X0Y0Z0\nN2G01X1\nN3G02X1Y1\n").unwrap();

    let err = read_program(&path, &FileLineSource::new()).unwrap_err();
    assert_eq!(err.line_number(), Some(3));
    assert_eq!(err.to_string(), "Incorrect instruction at line 3: 'N3G02X1Y1'");
}
