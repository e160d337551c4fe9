//! A small campus rollout: four cells with their radio fan-out, a DU/CU
//! pair, and nine UEs that re-attach over the run.
//!
//! Run with: `cargo run --example campus`

use oransim::{
    AccessPointParams, CellParams, DuPowerParams, PanelParams, RadioUnitParams, RrhParams,
    Simulation, TrafficProfile, UeParams, UserEquipment, Xyz,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    oransim::init_logging("info");

    let mut sim = Simulation::new(10.0, 42);

    let du = sim.make_distributed_unit(DuPowerParams::default())?;
    let cu = sim.make_centralised_unit(Some(du))?;

    let mut cells = Vec::new();
    for i in 0..4 {
        let cell = sim.make_cell(CellParams {
            xyz: Xyz::new(500.0 + 1000.0 * i as f64, 500.0, 20.0),
            radius_m: 500.0,
            ..Default::default()
        })?;
        let ap = sim.make_access_point(
            cell,
            AccessPointParams {
                at_cell_centre: false,
                ..Default::default()
            },
        )?;
        let ru = sim.make_radio_unit(cell, ap, Some(du), RadioUnitParams::default())?;
        let rrh = sim.make_rrh(ap, Some(ru), Some(du), RrhParams::default())?;
        sim.make_antenna_panel(rrh, PanelParams::default())?;
        sim.make_antenna_panel(rrh, PanelParams::default())?;
        cells.push(cell);
    }

    for i in 0..9 {
        let ue = sim.make_ue(UeParams {
            traffic: Some(TrafficProfile::Video),
            ..Default::default()
        })?;
        sim.attach_ue(ue, cells[i % cells.len()])?;
        // Halfway through the run, every UE hands over to the next cell.
        let (home, next) = (cells[i % cells.len()], cells[(i + 1) % cells.len()]);
        sim.node_mut::<UserEquipment>(ue)?
            .set_decision(Box::new(move |now, _| {
                Some(if now < 5.0 { home } else { next })
            }));
    }

    sim.run()?;

    println!("topology: {}", serde_json::to_string_pretty(&sim.topology_snapshot())?);
    println!("stats: {}", serde_json::to_string_pretty(&sim.export_stats())?);
    println!("CU drew {:.2} J over the run", sim.energy_of(cu)?);
    Ok(())
}
