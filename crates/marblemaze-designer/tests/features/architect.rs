use marblemaze_core::{
    DesignStrategy, Node, NodeId, ObstacleId, PathCurveType, PathProfileType, TransitionType,
};
use marblemaze_designer::architect::{PathArchitect, PathSegment};
use marblemaze_designer::obstacles::{ObstacleTransform, QuarterTurns};
use marblemaze_designer::{Lattice, PlacedObstacle};
use marblemaze_settings::PathSettings;
use nalgebra::Vector3;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn compound(nodes: Vec<usize>, main: usize, secondary: usize) -> PathSegment {
    let mut segment = PathSegment::new(nodes, main, secondary);
    segment.design_strategy = Some(DesignStrategy::Compound);
    segment
}

fn arena(points: &[(f64, f64, f64)]) -> Vec<Node> {
    points.iter().map(|&(x, y, z)| Node::new(x, y, z)).collect()
}

fn line_lattice(last: i32, rows: i32) -> Lattice {
    let xs: Vec<f64> = (0..=last).map(f64::from).collect();
    let ys: Vec<f64> = (0..rows).map(f64::from).collect();
    let mut lattice = Lattice::from_grid(1.0, "line", &xs, &ys, &[0.0], |_, _, _| true).unwrap();
    lattice.place_start_node_along_negative_x(0.0, 0.0);
    lattice
}

fn path_along(lattice: &Lattice, points: &[(f64, f64)]) -> Vec<NodeId> {
    points
        .iter()
        .map(|&(x, y)| lattice.find(x, y, 0.0).unwrap())
        .collect()
}

fn lengths(segments: &[PathSegment]) -> Vec<usize> {
    segments.iter().map(PathSegment::len).collect()
}

#[test]
fn test_split_on_waypoints_and_mounting() {
    let mut lattice = line_lattice(6, 1);
    let path = path_along(
        &lattice,
        &[(-2.0, 0.0), (-1.0, 0.0), (0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (3.0, 0.0), (4.0, 0.0), (5.0, 0.0), (6.0, 0.0)],
    );
    lattice.node_mut(path[4]).waypoint = true;
    lattice.node_mut(path[6]).waypoint = true;
    lattice.node_mut(path[6]).mounting = true;
    lattice.node_mut(path[8]).waypoint = true;

    let settings = PathSettings {
        waypoint_change_interval: 1,
        ..PathSettings::default()
    };
    let mut architect = PathArchitect::new(&settings, 1.0);
    architect.split_path_into_segments(&lattice, &path, &[]);

    let segments = architect.segments();
    assert_eq!(lengths(segments), vec![2, 3, 1, 1, 2]);
    let mains: Vec<usize> = segments.iter().map(|s| s.main_index).collect();
    assert_eq!(mains, vec![1, 2, 3, 4, 5]);
    assert!(architect.nodes()[segments[3].nodes[0]].mounting);
}

#[test]
fn test_waypoint_interval_groups_waypoints() {
    let mut lattice = line_lattice(6, 1);
    let path = path_along(
        &lattice,
        &[(-2.0, 0.0), (-1.0, 0.0), (0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (3.0, 0.0), (4.0, 0.0)],
    );
    for &i in &[2usize, 3, 4, 5] {
        lattice.node_mut(path[i]).waypoint = true;
    }

    let settings = PathSettings {
        waypoint_change_interval: 2,
        ..PathSettings::default()
    };
    let mut architect = PathArchitect::new(&settings, 1.0);
    architect.split_path_into_segments(&lattice, &path, &[]);
    assert_eq!(lengths(architect.segments()), vec![2, 2, 2, 1]);
}

fn obstacle_fixture() -> (Lattice, Vec<NodeId>, PlacedObstacle) {
    let mut lattice = line_lattice(6, 2);
    let body = path_along(&lattice, &[(2.0, 0.0), (2.0, 1.0), (3.0, 1.0), (4.0, 1.0), (4.0, 0.0)]);
    for &id in &body {
        let node = lattice.node_mut(id);
        node.occupied = true;
        node.obstacle = Some(ObstacleId(0));
    }
    lattice.node_mut(body[0]).waypoint = true;

    let path = path_along(
        &lattice,
        &[(-2.0, 0.0), (-1.0, 0.0), (0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (4.0, 0.0), (5.0, 0.0), (6.0, 0.0)],
    );
    let obstacle = PlacedObstacle {
        id: ObstacleId(0),
        name: "U Turn".to_string(),
        transform: ObstacleTransform {
            rotation: QuarterTurns::default(),
            translation: Vector3::zeros(),
            pitch: 1.0,
        },
        entry: body[0],
        exit: body[4],
        path: body,
    };
    (lattice, path, obstacle)
}

#[test]
fn test_obstacle_is_spliced_as_three_segments() {
    let (lattice, path, obstacle) = obstacle_fixture();
    let settings = PathSettings::default();
    let mut architect = PathArchitect::new(&settings, 1.0);
    architect.split_path_into_segments(&lattice, &path, std::slice::from_ref(&obstacle));

    let segments = architect.segments();
    assert_eq!(lengths(segments), vec![2, 3, 2, 3, 2, 2]);

    let (entry, locked, exit) = (&segments[2], &segments[3], &segments[4]);
    assert_eq!(entry.main_index, locked.main_index);
    assert_eq!(locked.main_index, exit.main_index);
    assert_eq!((entry.secondary_index, locked.secondary_index, exit.secondary_index), (0, 1, 2));
    assert!(locked.locked && !entry.locked && !exit.locked);
    assert_eq!(entry.design_strategy, Some(DesignStrategy::Single));
    assert_eq!(locked.design_strategy, Some(DesignStrategy::Compound));
    assert!([entry, locked, exit].iter().all(|s| s.obstacle == Some(ObstacleId(0))));

    // shared boundaries reuse the same arena slot
    assert_eq!(segments[1].last(), entry.first());
    assert_eq!(entry.last(), locked.first());
    assert_eq!(locked.last(), exit.first());
}

#[test]
fn test_properties_respect_mounting_and_obstacles() {
    let (mut lattice, path, obstacle) = obstacle_fixture();
    let mount = lattice.find(5.0, 0.0, 0.0).unwrap();
    lattice.node_mut(mount).mounting = true;
    lattice.node_mut(mount).waypoint = true;

    let settings = PathSettings::default();
    let mut architect = PathArchitect::new(&settings, 1.0);
    architect.split_path_into_segments(&lattice, &path, std::slice::from_ref(&obstacle));
    architect.assign_path_properties(&mut StdRng::seed_from_u64(8));

    let segments = architect.segments();
    let nodes = architect.nodes();
    for segment in segments {
        assert!(segment.profile.is_some());
        assert!(segment.design_strategy.is_some());
        if segment.nodes.iter().any(|&i| nodes[i].mounting) {
            assert_eq!(segment.design_strategy, Some(DesignStrategy::Compound));
            assert!(PathProfileType::mounting_profiles().contains(&segment.profile.unwrap()));
        }
        if segment.locked {
            assert_eq!(segment.design_strategy, Some(DesignStrategy::Compound));
        }
    }

    let obstacle_profiles: Vec<_> = segments
        .iter()
        .filter(|s| s.obstacle.is_some())
        .map(|s| s.profile)
        .collect();
    assert_eq!(obstacle_profiles.len(), 3);
    assert!(obstacle_profiles.windows(2).all(|w| w[0] == w[1]));

    for pair in segments.windows(2) {
        let same_obstacle = pair[1].obstacle.is_some() && pair[0].obstacle == pair[1].obstacle;
        if !same_obstacle {
            assert_ne!(pair[0].profile, pair[1].profile);
        }
    }
}

#[test]
fn test_compound_segment_splits_on_s_curve() {
    let nodes = arena(&[
        (0.0, 0.0, 0.0),
        (10.0, 0.0, 0.0),
        (20.0, 0.0, 0.0),
        (30.0, 10.0, 0.0),
        (40.0, 10.0, 0.0),
        (50.0, 10.0, 0.0),
    ]);
    let settings = PathSettings::default();
    let mut architect = PathArchitect::new(&settings, 10.0)
        .with_segments(nodes, vec![compound(vec![0, 1, 2, 3, 4, 5], 1, 0)]);
    architect.detect_curves_and_adjust_segments();

    let segments = architect.segments();
    assert_eq!(lengths(segments), vec![1, 4, 1]);
    assert_eq!(segments[1].curve_type, Some(PathCurveType::SCurve));
    assert_eq!(segments[0].curve_type, None);
    assert!(segments.iter().all(|s| s.main_index == 1));

    let mut secondaries: Vec<usize> = segments.iter().map(|s| s.secondary_index).collect();
    secondaries.dedup();
    assert_eq!(secondaries.len(), 3);
}

#[test]
fn test_compound_segment_splits_on_quarter_turn() {
    let nodes = arena(&[
        (0.0, 0.0, 0.0),
        (10.0, 0.0, 0.0),
        (20.0, 0.0, 0.0),
        (30.0, 0.0, 0.0),
        (30.0, 10.0, 0.0),
        (30.0, 20.0, 0.0),
        (30.0, 30.0, 0.0),
    ]);
    let settings = PathSettings::default();
    let mut architect = PathArchitect::new(&settings, 10.0)
        .with_segments(nodes, vec![compound((0..7).collect(), 1, 0)]);
    architect.detect_curves_and_adjust_segments();

    let segments = architect.segments();
    assert_eq!(lengths(segments), vec![1, 5, 1]);
    assert_eq!(segments[1].curve_type, Some(PathCurveType::Curve90));
}

#[test]
fn test_adjacent_curves_get_connector() {
    let mut nodes = arena(&[
        (0.0, 0.0, 0.0),
        (10.0, 0.0, 0.0),
        (20.0, 0.0, 0.0),
        (30.0, 10.0, 0.0),
        (40.0, 10.0, 0.0),
    ]);
    nodes.push(Node::circular(50.0, 10.0, 0.0));
    let settings = PathSettings::default();
    let mut architect = PathArchitect::new(&settings, 10.0)
        .with_segments(nodes, vec![compound((0..6).collect(), 1, 0)]);
    architect.detect_curves_and_adjust_segments();

    let segments = architect.segments();
    assert_eq!(lengths(segments), vec![1, 4, 2, 1]);
    let connector = &segments[2];
    assert_eq!(connector.nodes, vec![4, 5]);
    assert_eq!(connector.curve_type, None);
    assert_eq!(connector.design_strategy, Some(DesignStrategy::Compound));
    assert_eq!(segments[3].curve_type, Some(PathCurveType::Arc));
}

#[test]
fn test_locked_segment_is_not_reclassified() {
    let nodes = arena(&[
        (0.0, 0.0, 0.0),
        (10.0, 0.0, 0.0),
        (20.0, 0.0, 0.0),
        (30.0, 10.0, 0.0),
        (40.0, 10.0, 0.0),
        (50.0, 10.0, 0.0),
    ]);
    let mut segment = compound((0..6).collect(), 1, 0);
    segment.locked = true;
    let settings = PathSettings::default();
    let mut architect = PathArchitect::new(&settings, 10.0).with_segments(nodes, vec![segment.clone()]);
    architect.detect_curves_and_adjust_segments();
    assert_eq!(architect.segments(), &[segment]);
}

fn spline_fixture(next_head: (f64, f64, f64)) -> PathArchitect<'static> {
    static SETTINGS: std::sync::OnceLock<PathSettings> = std::sync::OnceLock::new();
    let settings = SETTINGS.get_or_init(PathSettings::default);

    let nodes = arena(&[
        (0.0, 0.0, 0.0),
        (10.0, 0.0, 0.0),
        (20.0, 0.0, 0.0),
        (30.0, 0.0, 0.0),
        (30.0, 10.0, 0.0),
        (30.0, 20.0, 0.0),
        next_head,
        (next_head.0, next_head.1 + 10.0, 0.0),
    ]);
    let mut spline = PathSegment::new(vec![2, 3, 4, 5], 2, 0);
    spline.design_strategy = Some(DesignStrategy::Spline);
    PathArchitect::new(settings, 10.0).with_segments(
        nodes,
        vec![compound(vec![0, 1], 1, 0), spline, compound(vec![6, 7], 3, 0)],
    )
}

#[test]
fn test_spline_without_stitches_when_collinear() {
    let mut architect = spline_fixture((30.0, 30.0, 0.0));
    architect.detect_curves_and_adjust_segments();

    let segments = architect.segments();
    assert_eq!(lengths(segments), vec![2, 4, 2]);
    assert_eq!(segments[1].design_strategy, Some(DesignStrategy::Spline));
}

#[test]
fn test_spline_gets_trailing_stitch_on_turn() {
    let mut architect = spline_fixture((40.0, 20.0, 0.0));
    architect.detect_curves_and_adjust_segments();

    let segments = architect.segments();
    assert_eq!(lengths(segments), vec![2, 3, 1, 2]);
    assert_eq!(segments[1].design_strategy, Some(DesignStrategy::Spline));
    assert_eq!(segments[2].design_strategy, Some(DesignStrategy::Single));
    assert_eq!(segments[2].nodes, vec![5]);
}

#[test]
fn test_short_spline_becomes_lone_nodes() {
    let nodes = arena(&[(0.0, 0.0, 0.0), (10.0, 0.0, 0.0)]);
    let mut spline = PathSegment::new(vec![0, 1], 1, 0);
    spline.design_strategy = Some(DesignStrategy::Spline);
    let settings = PathSettings::default();
    let mut architect = PathArchitect::new(&settings, 10.0).with_segments(nodes, vec![spline]);
    architect.detect_curves_and_adjust_segments();

    let segments = architect.segments();
    assert_eq!(lengths(segments), vec![1, 1]);
    assert!(segments
        .iter()
        .all(|s| s.design_strategy == Some(DesignStrategy::Compound)));
}

#[test]
fn test_mixed_single_is_split_into_runs() {
    let nodes = vec![
        Node::new(0.0, 0.0, 0.0),
        Node::circular(10.0, 0.0, 0.0),
        Node::circular(20.0, 0.0, 0.0),
        Node::new(30.0, 0.0, 0.0),
    ];
    let mut single = PathSegment::new(vec![0, 1, 2, 3], 1, 0);
    single.design_strategy = Some(DesignStrategy::Single);
    let settings = PathSettings::default();
    let mut architect = PathArchitect::new(&settings, 10.0).with_segments(nodes, vec![single]);
    architect.adjust_segments();

    let segments = architect.segments();
    let curves: Vec<_> = segments.iter().map(|s| s.curve_type).collect();
    assert_eq!(
        curves,
        vec![
            Some(PathCurveType::Straight),
            Some(PathCurveType::Straight),
            Some(PathCurveType::Arc),
            Some(PathCurveType::Straight),
            Some(PathCurveType::Straight),
        ]
    );
    assert!(segments.iter().all(|s| s.len() == 2 && s.main_index == 1));
    for pair in segments.windows(2) {
        assert_eq!(pair[0].last(), pair[1].first());
    }
}

#[test]
fn test_straight_segment_gets_half_pitch_extensions() {
    let nodes = arena(&[(0.0, 0.0, 0.0), (10.0, 0.0, 0.0), (20.0, 0.0, 0.0)]);
    let settings = PathSettings::default();
    let mut architect =
        PathArchitect::new(&settings, 10.0).with_segments(nodes, vec![compound(vec![0, 1, 2], 1, 0)]);
    architect.adjust_segments();

    let segment = &architect.segments()[0];
    let nodes = architect.nodes();
    assert_eq!(segment.len(), 5);
    assert_eq!(nodes[segment.nodes[0]].x, -5.0);
    assert_eq!(nodes[segment.nodes[4]].x, 25.0);
}

#[test]
fn test_harmonise_pattern_a() {
    let nodes = vec![
        Node::new(0.0, 0.0, 0.0),
        Node::circular(10.0, 5.0, 0.0),
        Node::circular(20.0, 0.0, 0.0),
        Node::circular(30.0, 0.0, 0.0),
    ];
    let settings = PathSettings::default();
    let mut architect = PathArchitect::new(&settings, 10.0)
        .with_segments(nodes, vec![compound(vec![0, 1], 1, 0), compound(vec![2, 3], 2, 1)]);
    architect.harmonise_circular_transitions();

    let segments = architect.segments();
    assert_eq!(segments.len(), 3);
    let bridge = segments[0].nodes[1];
    assert_eq!(architect.nodes()[bridge].position(), Vector3::new(10.0, 0.0, 0.0));
    assert!(!architect.nodes()[bridge].in_circular_grid);

    assert_eq!(segments[1].nodes, vec![bridge, 2]);
    assert_eq!(segments[1].label(), (2, 0));
    assert_eq!(segments[1].curve_type, None);
    assert_eq!(segments[1].last(), segments[2].first());
}

#[test]
fn test_harmonise_pattern_b() {
    let nodes = vec![
        Node::circular(0.0, 0.0, 0.0),
        Node::circular(10.0, 0.0, 0.0),
        Node::circular(20.0, 5.0, 0.0),
        Node::new(20.0, 10.0, 0.0),
    ];
    let settings = PathSettings::default();
    let mut architect = PathArchitect::new(&settings, 10.0)
        .with_segments(nodes, vec![compound(vec![0, 1], 1, 0), compound(vec![2, 3], 2, 0)]);
    architect.harmonise_circular_transitions();

    let segments = architect.segments();
    assert_eq!(segments.len(), 3);
    let bridge = segments[2].nodes[0];
    assert_eq!(architect.nodes()[bridge].position(), Vector3::new(15.0, 5.0, 0.0));
    assert_eq!(segments[1].nodes, vec![1, bridge]);
    assert_eq!(segments[1].label(), (1, 1));
    assert_eq!(segments[0].last(), segments[1].first());
}

#[test]
fn test_harmonise_ignores_same_main_index() {
    let nodes = vec![
        Node::new(0.0, 0.0, 0.0),
        Node::circular(10.0, 5.0, 0.0),
        Node::circular(20.0, 0.0, 0.0),
        Node::circular(30.0, 0.0, 0.0),
    ];
    let segments = vec![compound(vec![0, 1], 1, 0), compound(vec![2, 3], 1, 1)];
    let settings = PathSettings::default();
    let mut architect = PathArchitect::new(&settings, 10.0).with_segments(nodes, segments.clone());
    architect.harmonise_circular_transitions();
    assert_eq!(architect.segments(), segments.as_slice());
}

#[test]
fn test_finish_box_extends_along_travel() {
    let mut nodes = arena(&[(0.0, 0.0, 0.0), (10.0, 0.0, 0.0)]);
    nodes[1].puzzle_end = true;
    let settings = PathSettings::default();
    let mut architect =
        PathArchitect::new(&settings, 10.0).with_segments(nodes, vec![compound(vec![0, 1], 1, 0)]);
    architect.create_finish_box();

    let segments = architect.segments();
    assert_eq!(segments.len(), 2);
    let finish = &segments[1];
    assert_eq!(finish.first(), Some(1));
    assert_eq!(finish.curve_type, Some(PathCurveType::Straight));
    assert_eq!(finish.label(), (1, 1));

    let end = &architect.nodes()[finish.nodes[1]];
    assert_eq!(end.position(), Vector3::new(15.0, 0.0, 0.0));
    assert!(end.puzzle_end && end.segment_end);
    assert!(!architect.nodes()[1].puzzle_end);
}

#[test]
fn test_finish_box_follows_ring_tangent() {
    let mut nodes = vec![Node::circular(9.0, -1.0, 0.0), Node::circular(10.0, 0.0, 0.0)];
    nodes[1].puzzle_end = true;
    let settings = PathSettings::default();
    let mut architect =
        PathArchitect::new(&settings, 10.0).with_segments(nodes, vec![compound(vec![0, 1], 1, 0)]);
    architect.create_finish_box();

    let finish = &architect.segments()[1];
    let end = &architect.nodes()[finish.nodes[1]];
    assert!((end.position() - Vector3::new(10.0, 5.0, 0.0)).norm() < 1e-9);
    assert!(end.in_circular_grid);
}

#[test]
fn test_start_ramp_gets_u_profile() {
    let mut nodes = arena(&[(0.0, 0.0, 0.0), (10.0, 0.0, 0.0)]);
    nodes[0].puzzle_start = true;
    let mut segment = compound(vec![0, 1], 1, 0);
    segment.profile = Some(PathProfileType::VShape);
    let settings = PathSettings::default();
    let mut architect = PathArchitect::new(&settings, 10.0).with_segments(nodes, vec![segment]);
    architect.create_start_ramp();
    assert_eq!(architect.segments()[0].profile, Some(PathProfileType::UShape));
}

#[test]
fn test_transitions_and_profile_hints() {
    let nodes = arena(&[(0.0, 0.0, 0.0), (10.0, 0.0, 0.0)]);
    let with = |main, secondary, strategy, profile| {
        let mut s = PathSegment::new(vec![0, 1], main, secondary);
        s.design_strategy = Some(strategy);
        s.profile = Some(profile);
        s
    };
    let segments = vec![
        with(1, 0, DesignStrategy::Compound, PathProfileType::LShape),
        with(1, 1, DesignStrategy::Compound, PathProfileType::LShape),
        with(2, 0, DesignStrategy::Compound, PathProfileType::VShape),
        with(3, 0, DesignStrategy::Compound, PathProfileType::OShape),
        with(4, 0, DesignStrategy::Compound, PathProfileType::UShape),
        with(4, 1, DesignStrategy::Single, PathProfileType::UShape),
    ];
    let settings = PathSettings::default();
    let mut architect = PathArchitect::new(&settings, 10.0).with_segments(nodes, segments);
    architect.assign_transition_types();
    architect.assign_profile_hints();

    let transitions: Vec<_> = architect.segments().iter().map(|s| s.transition).collect();
    assert_eq!(
        transitions,
        vec![
            Some(TransitionType::Right),
            Some(TransitionType::Right),
            Some(TransitionType::Round),
            Some(TransitionType::Round),
            Some(TransitionType::Round),
            Some(TransitionType::Round),
        ]
    );

    let o = &architect.segments()[3];
    assert_eq!(o.support_profile, Some(PathProfileType::OShapeSupport));
    assert_eq!(o.accent_profile, None);
    let u = &architect.segments()[4];
    assert_eq!(u.accent_profile, Some(PathProfileType::UShapePathColor));
}
