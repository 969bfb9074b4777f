use marblemaze_core::{Node, NodeId};
use marblemaze_designer::Lattice;
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn line(len: i32) -> Lattice {
    let xs: Vec<f64> = (0..len).map(f64::from).collect();
    Lattice::from_grid(1.0, "line", &xs, &[0.0], &[0.0], |_, _, _| true).unwrap()
}

fn cube(side: i32) -> Lattice {
    let axis: Vec<f64> = (0..side).map(f64::from).collect();
    Lattice::from_grid(1.0, "cube", &axis, &axis, &axis, |_, _, _| true).unwrap()
}

#[test]
fn test_from_grid_applies_filter() {
    let axis = [-1.0, 0.0, 1.0];
    let lattice = Lattice::from_grid(1.0, "cross", &axis, &axis, &axis, |x, y, z| {
        x.abs() + y.abs() + z.abs() <= 1.0
    })
    .unwrap();
    assert_eq!(lattice.len(), 7);
    assert!(lattice.find(0.0, 0.0, 0.0).is_some());
    assert!(lattice.find(1.0, 1.0, 0.0).is_none());
}

#[test]
fn test_from_grid_rejects_empty() {
    let err = Lattice::from_grid(1.0, "void", &[0.0], &[0.0], &[0.0], |_, _, _| false).unwrap_err();
    assert!(err.is_lattice_error());
    assert!(err.to_string().contains("void"));
}

#[test]
fn test_insert_merges_grid_membership() {
    let mut lattice = Lattice::new(1.0);
    let a = lattice.insert(Node::new(1.0, 0.0, 0.0));
    let b = lattice.insert(Node::circular(1.0 + 1e-9, 0.0, 0.0));

    assert_eq!(a, b);
    assert_eq!(lattice.len(), 1);
    let node = lattice.node(a);
    assert!(node.in_rectangular_grid && node.in_circular_grid);
    assert_eq!(lattice.circular_nodes(), &[a]);
}

#[test]
fn test_start_ramp_extends_along_negative_x() {
    let mut lattice = line(3);
    let start = lattice.place_start_node_along_negative_x(0.0, 0.0);

    let node = lattice.node(start);
    assert_eq!(node.coords(), (-2.0, 0.0, 0.0));
    assert!(node.puzzle_start && node.start_ramp);
    assert_eq!(lattice.start_node(), Some(start));

    let inner = lattice.find(-1.0, 0.0, 0.0).unwrap();
    assert!(lattice.node(inner).start_ramp);
    assert!(!lattice.node(inner).puzzle_start);
}

#[test]
fn test_retain_renumbers_and_keeps_start() {
    let mut lattice = line(4);
    lattice.place_start_node_along_negative_x(0.0, 0.0);
    lattice.retain(|n| n.x != 1.0);

    assert_eq!(lattice.len(), 5);
    assert!(lattice.find(1.0, 0.0, 0.0).is_none());
    let start = lattice.start_node().unwrap();
    assert_eq!(lattice.node(start).coords(), (-2.0, 0.0, 0.0));
    for (id, node) in lattice.iter() {
        assert_eq!(lattice.find(node.x, node.y, node.z), Some(id));
    }
}

#[test]
fn test_nearest_breaks_ties_by_id() {
    let lattice = Lattice::from_grid(1.0, "pair", &[0.0, 2.0], &[0.0], &[0.0], |_, _, _| true).unwrap();
    assert_eq!(lattice.nearest(1.0, 0.0, 0.0, |_, _| true), Some(NodeId(0)));
    assert_eq!(lattice.nearest(1.0, 0.0, 0.0, |id, _| id != NodeId(0)), Some(NodeId(1)));
    assert_eq!(lattice.nearest(1.0, 0.0, 0.0, |_, _| false), None);
}

#[test]
fn test_bounds_and_axis_values() {
    let lattice = cube(3);
    let bounds = lattice.bounds().unwrap();
    assert_eq!(bounds.min.x, 0.0);
    assert_eq!(bounds.max.z, 2.0);
    assert_eq!(lattice.axis_values(1), vec![0.0, 1.0, 2.0]);
    assert!(Lattice::new(1.0).bounds().is_none());
}

#[test]
fn test_claim_mounting_targets_marks_nearest_free() {
    let mut lattice = line(5);
    lattice.node_mut(NodeId(4)).occupied = true;
    let claimed = lattice.claim_mounting_targets(&[(4.2, 0.0, 0.0), (0.0, 0.0, 0.0)], |_| true);

    assert_eq!(claimed, vec![NodeId(3), NodeId(0)]);
    assert!(lattice.node(NodeId(3)).mounting && lattice.node(NodeId(3)).waypoint);
    assert_eq!(lattice.mounting_nodes(), vec![NodeId(0), NodeId(3)]);
}

#[test]
fn test_select_waypoints_is_seeded() {
    let mut a = cube(5);
    let mut b = cube(5);
    let picks_a = a.select_waypoints(6, 8, &mut StdRng::seed_from_u64(11));
    let picks_b = b.select_waypoints(6, 8, &mut StdRng::seed_from_u64(11));
    assert_eq!(picks_a, picks_b);
    assert_eq!(a.waypoints().len(), 6);
}

#[test]
fn test_select_waypoints_reduces_count() {
    let mut lattice = line(4);
    lattice.node_mut(NodeId(0)).occupied = true;
    lattice.node_mut(NodeId(1)).mounting = true;

    let picks = lattice.select_waypoints(10, 3, &mut StdRng::seed_from_u64(1));
    assert_eq!(picks.len(), 2);
    assert!(picks.contains(&NodeId(2)) && picks.contains(&NodeId(3)));
}

proptest! {
    #[test]
    fn prop_waypoints_avoid_reserved_nodes(seed in any::<u64>(), count in 0usize..40, candidates in 1usize..12) {
        let mut lattice = cube(4);
        for i in (0..lattice.len()).step_by(5) {
            lattice.node_mut(NodeId(i)).occupied = true;
        }
        for i in (1..lattice.len()).step_by(7) {
            lattice.node_mut(NodeId(i)).mounting = true;
        }
        let free = lattice
            .nodes()
            .iter()
            .filter(|n| !n.occupied && !n.mounting)
            .count();

        let picks = lattice.select_waypoints(count, candidates, &mut StdRng::seed_from_u64(seed));
        prop_assert_eq!(picks.len(), count.min(free));

        let mut unique = picks.clone();
        unique.sort();
        unique.dedup();
        prop_assert_eq!(unique.len(), picks.len());
        for id in picks {
            let node = lattice.node(id);
            prop_assert!(node.waypoint);
            prop_assert!(!node.occupied && !node.mounting);
        }
    }
}
