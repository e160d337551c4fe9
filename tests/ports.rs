//! Port-pool behavior at the node level: RF port capacity on antenna-panel
//! attach, fronthaul allocation on DU attach, and the all-or-nothing
//! guarantee on pool exhaustion.

use oransim::{
    AccessPointParams, AntennaPanel, CellParams, DuPowerParams, PanelParams, RemoteRadioHead,
    RrhParams, SimError, Simulation,
};

fn sim_with_rrh(n_rf_ports: usize) -> (Simulation, u64) {
    let mut sim = Simulation::new(10.0, 0);
    let cell = sim.make_cell(CellParams::default()).unwrap();
    let ap = sim
        .make_access_point(cell, AccessPointParams::default())
        .unwrap();
    let rrh = sim
        .make_rrh(
            ap,
            None,
            None,
            RrhParams {
                n_rf_ports,
                ..Default::default()
            },
        )
        .unwrap();
    (sim, rrh)
}

#[test]
fn test_two_ports_two_panels_third_fails() {
    let (mut sim, rrh) = sim_with_rrh(2);

    let p0 = sim.make_antenna_panel(rrh, PanelParams::default()).unwrap();
    let p1 = sim.make_antenna_panel(rrh, PanelParams::default()).unwrap();
    assert_eq!(sim.node::<AntennaPanel>(p0).unwrap().rf_slot(), 0);
    assert_eq!(sim.node::<AntennaPanel>(p1).unwrap().rf_slot(), 1);

    let nodes_before = sim.node_count();
    let err = sim
        .make_antenna_panel(rrh, PanelParams::default())
        .unwrap_err();
    assert!(matches!(err, SimError::PoolExhausted { capacity: 2, .. }));

    // All-or-nothing: the third panel was never registered.
    assert_eq!(sim.node_count(), nodes_before);
    assert_eq!(sim.node::<RemoteRadioHead>(rrh).unwrap().rf_ports().occupied(), 2);
}

#[test]
fn test_panel_occupies_lowest_free_slot_after_release() {
    let (mut sim, rrh) = sim_with_rrh(3);

    let p0 = sim.make_antenna_panel(rrh, PanelParams::default()).unwrap();
    let _p1 = sim.make_antenna_panel(rrh, PanelParams::default()).unwrap();

    sim.deregister(p0); // frees slot 0
    let p2 = sim.make_antenna_panel(rrh, PanelParams::default()).unwrap();
    assert_eq!(sim.node::<AntennaPanel>(p2).unwrap().rf_slot(), 0);
}

#[test]
fn test_panels_link_to_their_head() {
    let (mut sim, rrh) = sim_with_rrh(2);
    let panel = sim.make_antenna_panel(rrh, PanelParams::default()).unwrap();

    assert!(sim.neighbors(rrh).unwrap().contains(&panel));
    assert!(sim.neighbors(panel).unwrap().contains(&rrh));
}

#[test]
fn test_du_attach_allocates_fronthaul_port() {
    let (mut sim, rrh) = sim_with_rrh(2);
    let du = sim.make_distributed_unit(DuPowerParams::default()).unwrap();

    let slot = sim.attach_du_to_rrh(du, rrh).unwrap();
    assert_eq!(slot, 0);
    assert!(sim.neighbors(du).unwrap().contains(&rrh));

    let head = sim.node::<RemoteRadioHead>(rrh).unwrap();
    assert_eq!(head.fronthaul().pool().occupant(0), Some(du));
    assert_eq!(head.fronthaul().protocol(), "CPRI");
}

#[test]
fn test_du_attach_fails_when_fronthaul_exhausted() {
    let (mut sim, rrh) = sim_with_rrh(2);

    // Default fronthaul interface carries two ports.
    let du0 = sim.make_distributed_unit(DuPowerParams::default()).unwrap();
    let du1 = sim.make_distributed_unit(DuPowerParams::default()).unwrap();
    let du2 = sim.make_distributed_unit(DuPowerParams::default()).unwrap();
    sim.attach_du_to_rrh(du0, rrh).unwrap();
    sim.attach_du_to_rrh(du1, rrh).unwrap();

    let err = sim.attach_du_to_rrh(du2, rrh).unwrap_err();
    assert!(matches!(err, SimError::PoolExhausted { .. }));
    // The failed attach recorded no link.
    assert!(!sim.neighbors(du2).unwrap().contains(&rrh));
}

#[test]
fn test_rf_and_fronthaul_pools_are_independent() {
    let (mut sim, rrh) = sim_with_rrh(1);
    let panel = sim.make_antenna_panel(rrh, PanelParams::default()).unwrap();
    let du = sim.make_distributed_unit(DuPowerParams::default()).unwrap();

    // RF exhausted, fronthaul still open.
    assert!(sim.make_antenna_panel(rrh, PanelParams::default()).is_err());
    assert!(sim.attach_du_to_rrh(du, rrh).is_ok());
    assert_eq!(sim.node::<AntennaPanel>(panel).unwrap().rf_slot(), 0);
}
