//! Performance benchmarks for the oransim core.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use oransim::{
    AccessPointParams, CellParams, PanelParams, PowerModel, RadioUnitParams, RrhParams,
    Simulation, UeParams,
};

fn build_topology(n_cells: usize, n_ues: usize) -> Simulation {
    let mut sim = Simulation::new(10.0, 0);
    let mut cells = Vec::with_capacity(n_cells);
    for _ in 0..n_cells {
        let cell = sim.make_cell(CellParams::default()).unwrap();
        let ap = sim
            .make_access_point(cell, AccessPointParams::default())
            .unwrap();
        let ru = sim
            .make_radio_unit(cell, ap, None, RadioUnitParams::default())
            .unwrap();
        let rrh = sim
            .make_rrh(ap, Some(ru), None, RrhParams::default())
            .unwrap();
        sim.make_antenna_panel(rrh, PanelParams::default()).unwrap();
        cells.push(cell);
    }
    for i in 0..n_ues {
        let ue = sim
            .make_ue(UeParams {
                power_model: Some(PowerModel::constant(2.0)),
                ..Default::default()
            })
            .unwrap();
        sim.attach_ue(ue, cells[i % cells.len()]).unwrap();
    }
    sim
}

fn bench_topology_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("topology_build");
    for n_cells in [4, 16, 64] {
        group.throughput(Throughput::Elements(n_cells as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(n_cells),
            &n_cells,
            |b, &n_cells| {
                b.iter(|| black_box(build_topology(n_cells, n_cells * 4)));
            },
        );
    }
    group.finish();
}

fn bench_run_loop(c: &mut Criterion) {
    let mut group = c.benchmark_group("run_loop");
    for n_cells in [4, 16] {
        group.bench_with_input(
            BenchmarkId::from_parameter(n_cells),
            &n_cells,
            |b, &n_cells| {
                b.iter(|| {
                    let mut sim = build_topology(n_cells, n_cells * 4);
                    sim.run().unwrap();
                    black_box(sim.total_joules())
                });
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_topology_build, bench_run_loop);
criterion_main!(benches);
