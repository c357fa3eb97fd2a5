//! Table invariants under sustained observation traffic.

use crate::*;

use beacon_services::NeighborTable;

#[test]
fn observation_storm_preserves_all_invariants() {
    let mut rng = XorShift::new(0xbeac0);
    let mut table = NeighborTable::new(5).unwrap();

    for _ in 0..2000 {
        // 20 possible nodes, RSSI in [-100, -20]
        let id = node((rng.next() % 20) as u8, 1);
        let rssi = -100 + (rng.next() % 81) as i16;

        // Rejection is a normal outcome here, not a failure.
        let _ = table.observe(id, rssi);

        assert_invariants(&table);
    }

    // With 20 nodes competing for 5 slots the table must be full by now.
    assert!(table.is_full());
}

#[test]
fn strongest_nodes_win_the_table() {
    let mut table = NeighborTable::new(3).unwrap();

    // 10 nodes with strictly increasing strength, each heard once.
    for i in 0..10u8 {
        let _ = table.observe(node(i, 0), -90 + (i as i16) * 5);
    }

    assert_invariants(&table);
    assert_eq!(table_ids(&table), vec![node(9, 0), node(8, 0), node(7, 0)]);
    assert_eq!(table_rssis(&table), vec![-45, -50, -55]);
}

#[test]
fn fading_neighbor_drops_to_the_tail_then_out() {
    let mut table = NeighborTable::new(3).unwrap();
    table.observe(node(1, 0), -30).unwrap();
    table.observe(node(2, 0), -40).unwrap();
    table.observe(node(3, 0), -50).unwrap();

    // Node 1 fades below everyone else.
    table.observe(node(1, 0), -95).unwrap();
    assert_eq!(table_ids(&table), vec![node(2, 0), node(3, 0), node(1, 0)]);

    // A fresh, stronger node now evicts it.
    table.observe(node(4, 0), -60).unwrap();
    assert_invariants(&table);
    assert_eq!(
        table_ids(&table),
        vec![node(2, 0), node(3, 0), node(4, 0)]
    );
}

#[test]
fn rejection_reports_the_weakest_rssi() {
    let mut table = NeighborTable::new(2).unwrap();
    table.observe(node(1, 0), -40).unwrap();
    table.observe(node(2, 0), -70).unwrap();

    let rejected = table.observe(node(3, 0), -80).unwrap_err();
    assert_eq!(rejected.weakest, -70);
    assert_eq!(rejected.rssi, -80);

    // The message names both parties, for the caller's log line.
    let text = rejected.to_string();
    assert!(text.contains("3.0"), "unexpected message: {text}");
    assert!(text.contains("-70"), "unexpected message: {text}");
}
