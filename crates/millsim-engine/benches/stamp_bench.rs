use criterion::{black_box, criterion_group, criterion_main, Criterion};
use millsim_core::{GridSpec, ToolKind, Waypoint};
use millsim_engine::{build_tool_profile, rasterize_segment, stamp_tool, Grid, Tool};

fn bench_profile(c: &mut Criterion) {
    c.bench_function("build_spherical_profile_r8_ppu10", |b| {
        b.iter(|| build_tool_profile(black_box(ToolKind::Spherical), 8, 10))
    });
}

fn bench_stamp(c: &mut Criterion) {
    let spec = GridSpec::default();
    let from = Waypoint::new(0.0, 40.0, 0.0);
    let to = Waypoint::new(10.0, 40.0, 0.0);

    for (name, kind) in [
        ("stamp_flat_r4", ToolKind::Flat),
        ("stamp_spherical_r4", ToolKind::Spherical),
    ] {
        let tool = Tool::new(kind, 4, spec.pixels_per_unit, Some(100.0));
        c.bench_function(name, |b| {
            let mut grid = Grid::new(spec).unwrap();
            b.iter(|| {
                stamp_tool(
                    &mut grid,
                    &tool,
                    black_box(750),
                    black_box(750),
                    40.0,
                    &from,
                    &to,
                )
            })
        });
    }
}

fn bench_segment(c: &mut Criterion) {
    let spec = GridSpec::default();
    let tool = Tool::new(ToolKind::Spherical, 2, spec.pixels_per_unit, Some(100.0));
    let from = Waypoint::new(-20.0, 45.0, -10.0);
    let to = Waypoint::new(20.0, 44.0, 10.0);
    let (xa, za) = from.to_grid(spec.pixels_per_unit);
    let (xb, zb) = to.to_grid(spec.pixels_per_unit);

    c.bench_function("carve_segment_400px", |b| {
        b.iter(|| {
            let mut grid = Grid::new(spec).unwrap();
            let (hw, hh) = grid.half_extent();
            for step in rasterize_segment(xa, za, xb, zb) {
                let height = from.lerp(&to, step.progress).y;
                stamp_tool(&mut grid, &tool, step.x + hw, step.z + hh, height, &from, &to);
            }
            grid
        })
    });
}

criterion_group!(benches, bench_profile, bench_stamp, bench_segment);
criterion_main!(benches);
