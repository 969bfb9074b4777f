use marblemaze_core::{Node, NodeId, ObstacleId, PathCurveType};
use nalgebra::Vector3;

#[test]
fn test_node_constructors_set_grid_membership() {
    let rect = Node::new(1.0, 2.0, 3.0);
    assert!(rect.in_rectangular_grid);
    assert!(!rect.in_circular_grid);

    let ring = Node::circular(1.0, 0.0, 0.0);
    assert!(ring.in_circular_grid);
    assert!(!ring.in_rectangular_grid);

    let stitch = Node::detached(0.5, 0.0, 0.0);
    assert!(!stitch.in_circular_grid && !stitch.in_rectangular_grid);
}

#[test]
fn test_set_position_moves_node() {
    let mut node = Node::new(0.0, 0.0, 0.0);
    node.set_position(&Vector3::new(1.5, -2.0, 4.0));
    assert_eq!(node.coords(), (1.5, -2.0, 4.0));
    assert_eq!(node.position(), Vector3::new(1.5, -2.0, 4.0));
}

#[test]
fn test_copy_location_drops_flags() {
    let mut node = Node::circular(3.0, 4.0, 0.0);
    node.waypoint = true;
    node.occupied = true;
    node.path_curve_type = Some(PathCurveType::Arc);
    node.obstacle = Some(ObstacleId(2));

    let copy = node.copy_location();
    assert_eq!(copy.coords(), node.coords());
    assert!(copy.in_circular_grid);
    assert!(!copy.waypoint && !copy.occupied);
    assert_eq!(copy.path_curve_type, None);
    assert_eq!(copy.obstacle, None);
}

#[test]
fn test_key_matches_for_equal_positions() {
    let a = Node::new(0.1 + 0.2, 0.0, 0.0);
    let b = Node::circular(0.3, 0.0, 0.0);
    assert_eq!(a.key(), b.key());
}

#[test]
fn test_node_serialization_round_trip() {
    let mut node = Node::new(10.0, 0.0, -10.0);
    node.mounting = true;
    node.path_curve_type = Some(PathCurveType::Curve90);

    let json = serde_json::to_string(&node).unwrap();
    assert!(json.contains("\"curve_90\""));
    let back: Node = serde_json::from_str(&json).unwrap();
    assert_eq!(back, node);
}

#[test]
fn test_display() {
    assert_eq!(Node::new(1.0, 2.5, -3.0).to_string(), "(1.000, 2.500, -3.000)");
    assert_eq!(NodeId(7).index(), 7);
}
