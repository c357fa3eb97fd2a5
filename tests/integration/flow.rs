//! End-to-end flow: hellos serialized to wire bytes, parsed back, and fed
//! into the table as observations — the daemon's receive path minus the
//! socket.

use crate::*;

use beacon_core::wire::{HelloDatagram, HELLO_VERSION};
use beacon_services::NeighborTable;
use zerocopy::{AsBytes, FromBytes};

fn observe_from_wire(table: &mut NeighborTable, bytes: &[u8]) -> bool {
    let hello = match HelloDatagram::read_from_prefix(bytes) {
        Some(h) => h,
        None => return false,
    };
    if hello.version != HELLO_VERSION {
        return false;
    }
    let sender = hello.node_id;
    let rssi = hello.rssi;
    table.observe(sender, rssi).is_ok()
}

#[test]
fn hellos_heard_on_the_wire_rank_the_neighborhood() {
    let mut table = NeighborTable::new(2).unwrap();

    let hellos = [
        (node(1, 1), -10i16),
        (node(2, 2), -20),
        (node(3, 3), -5),
        (node(2, 2), -2),
    ];

    for (id, rssi) in hellos {
        let bytes = HelloDatagram::new(id, rssi, b"Hello").unwrap();
        assert!(observe_from_wire(&mut table, bytes.as_bytes()));
        assert_invariants(&table);
    }

    // 3.3 evicted 2.2 at -20; 2.2 re-announced stronger and evicted 1.1.
    assert_eq!(table_ids(&table), vec![node(2, 2), node(3, 3)]);
    assert_eq!(table_rssis(&table), vec![-2, -5]);
}

#[test]
fn garbage_on_the_wire_never_reaches_the_table() {
    let mut table = NeighborTable::new(2).unwrap();

    assert!(!observe_from_wire(&mut table, b"not a hello"));
    assert!(!observe_from_wire(&mut table, &[]));

    let mut bytes = HelloDatagram::new(node(1, 1), -10, b"Hello")
        .unwrap()
        .as_bytes()
        .to_vec();
    bytes[2] = 0x42; // bogus version
    assert!(!observe_from_wire(&mut table, &bytes));

    assert!(table.is_empty());
}

#[test]
fn greeting_survives_the_round_trip() {
    let original = HelloDatagram::new(node(7, 7), -33, b"Hello").unwrap();
    let recovered = HelloDatagram::read_from(original.as_bytes()).unwrap();
    assert_eq!(recovered.message(), b"Hello");
}
