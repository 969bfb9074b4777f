use marblemaze_designer::{Casing, Lattice, ObstacleCatalogue, ObstacleManager, ObstacleTemplate};
use marblemaze_settings::{CasingSettings, ObstacleSettings};
use nalgebra::Vector3;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashSet;

fn roomy_box() -> Lattice {
    let settings = CasingSettings::Box {
        width: 100.0,
        height: 100.0,
        length: 100.0,
        panel_thickness: 0.0,
    };
    Casing::from_settings(&settings, 10.0).unwrap().create_nodes().unwrap()
}

fn settings(count: usize) -> ObstacleSettings {
    ObstacleSettings {
        count,
        ..ObstacleSettings::default()
    }
}

fn cell(x: i32, y: i32, z: i32) -> Vector3<i32> {
    Vector3::new(x, y, z)
}

#[test]
fn test_builtin_catalogue() {
    let catalogue = ObstacleCatalogue::builtin();
    assert_eq!(
        catalogue.names(),
        vec![
            "U Turn",
            "Alpha",
            "Omega",
            "Spiral",
            "Question Mark",
            "Gosper Curve",
            "Overhand Knot",
            "Zig Zag",
            "Sine",
            "Pulse",
        ]
    );
    for template in catalogue.templates() {
        assert!(template.occupied().len() >= 4, "{} too short", template.name());
        assert_ne!(template.entry(), template.exit());
    }
}

#[test]
fn test_builtin_templates_are_simple_unit_chains() {
    for template in ObstacleCatalogue::builtin().templates() {
        let path = template.occupied();
        for pair in path.windows(2) {
            assert_eq!(
                (pair[1] - pair[0]).abs().sum(),
                1,
                "{} jumps from {:?} to {:?}",
                template.name(),
                pair[0],
                pair[1]
            );
        }
        let distinct: HashSet<[i32; 3]> = path.iter().map(|p| [p.x, p.y, p.z]).collect();
        assert_eq!(distinct.len(), path.len(), "{} revisits a cell", template.name());
    }
}

#[test]
fn test_u_turn_doubles_back_underneath() {
    let catalogue = ObstacleCatalogue::builtin();
    let u_turn = catalogue.get("U Turn").unwrap();
    assert_eq!(
        u_turn.occupied(),
        &[
            cell(0, 0, 0),
            cell(0, 1, 0),
            cell(0, 1, 1),
            cell(1, 1, 1),
            cell(1, 1, 0),
            cell(1, 1, -1),
            cell(1, 1, -2),
            cell(0, 1, -2),
            cell(0, 1, -1),
            cell(0, 0, -1),
        ][..]
    );
}

#[test]
fn test_curved_templates_keep_their_end_points() {
    let catalogue = ObstacleCatalogue::builtin();
    let cases = [
        ("Alpha", cell(0, -2, 0), cell(-2, 0, 2)),
        ("Omega", cell(-3, -2, 0), cell(3, -2, 0)),
        ("Spiral", cell(1, -1, 0), cell(1, 1, 2)),
        ("Question Mark", cell(0, -3, 0), cell(-1, 0, 0)),
    ];
    for (name, entry, exit) in cases {
        let template = catalogue.get(name).unwrap();
        assert_eq!(template.entry(), entry, "{name} entry");
        assert_eq!(template.exit(), exit, "{name} exit");
    }
}

#[test]
fn test_signal_templates_are_planar_with_level_connectors() {
    let catalogue = ObstacleCatalogue::builtin();
    for name in ["Zig Zag", "Sine", "Pulse"] {
        let template = catalogue.get(name).unwrap();
        let path = template.occupied();
        assert!(path.iter().all(|p| p.z == 0), "{name} leaves the plane");
        assert_eq!(path[0].x + 1, path[1].x);
        assert_eq!(path[0].y, path[1].y);
        let n = path.len();
        assert_eq!(path[n - 2].x + 1, path[n - 1].x);
        assert_eq!(path[n - 2].y, path[n - 1].y);
    }
}

#[test]
fn test_catalogue_filter() {
    let catalogue = ObstacleCatalogue::builtin();
    let filtered = catalogue
        .filtered(&["Spiral".to_string(), "U Turn".to_string()])
        .unwrap();
    assert_eq!(filtered.names(), vec!["U Turn", "Spiral"]);

    let err = catalogue.filtered(&["Loop de Loop".to_string()]).unwrap_err();
    assert!(err.is_placement_error());
    assert!(err.to_string().contains("Loop de Loop"));
}

#[test]
fn test_clearance_excludes_body() {
    let template = ObstacleTemplate::new("bar", &[[0, 0, 0], [1, 0, 0]]);
    let clearance = template.clearance();
    assert_eq!(clearance.len(), 10);
    for offset in &clearance {
        assert!(!template.occupied().contains(offset));
    }
}

#[test]
fn test_placed_obstacles_do_not_overlap() {
    let mut lattice = roomy_box();
    let manager = ObstacleManager::new(settings(4), &ObstacleCatalogue::builtin()).unwrap();
    let placed = manager.place_obstacles(&mut lattice, &mut StdRng::seed_from_u64(3));

    assert!(!placed.is_empty());
    assert!(placed.len() <= 4);

    let mut seen = HashSet::new();
    for obstacle in &placed {
        assert_eq!(obstacle.path.first(), Some(&obstacle.entry));
        assert_eq!(obstacle.path.last(), Some(&obstacle.exit));
        assert!(lattice.node(obstacle.entry).waypoint);
        for &id in &obstacle.path {
            assert!(seen.insert(id), "node {id} claimed twice");
            let node = lattice.node(id);
            assert!(node.occupied);
            assert_eq!(node.obstacle, Some(obstacle.id));
            assert!(!node.start_ramp);
        }
    }
}

#[test]
fn test_placement_is_seeded() {
    let manager = ObstacleManager::new(settings(3), &ObstacleCatalogue::builtin()).unwrap();

    let mut a = roomy_box();
    let mut b = roomy_box();
    let placed_a = manager.place_obstacles(&mut a, &mut StdRng::seed_from_u64(99));
    let placed_b = manager.place_obstacles(&mut b, &mut StdRng::seed_from_u64(99));
    assert_eq!(placed_a, placed_b);
}

#[test]
fn test_per_type_limit_stops_placement() {
    let settings = ObstacleSettings {
        count: 3,
        per_type_limit: 1,
        allowed: vec!["U Turn".to_string()],
        ..ObstacleSettings::default()
    };
    let manager = ObstacleManager::new(settings, &ObstacleCatalogue::builtin()).unwrap();
    let mut lattice = roomy_box();
    let placed = manager.place_obstacles(&mut lattice, &mut StdRng::seed_from_u64(5));

    assert_eq!(placed.len(), 1);
    assert_eq!(placed[0].name, "U Turn");
}

#[test]
fn test_zero_count_places_nothing() {
    let manager = ObstacleManager::new(settings(0), &ObstacleCatalogue::builtin()).unwrap();
    let mut lattice = roomy_box();
    assert!(manager.place_obstacles(&mut lattice, &mut StdRng::seed_from_u64(0)).is_empty());
    assert_eq!(lattice.occupied_count(), 0);
}

#[test]
fn test_mounting_nodes_are_never_covered() {
    let casing = Casing::from_settings(
        &CasingSettings::Box {
            width: 100.0,
            height: 100.0,
            length: 100.0,
            panel_thickness: 0.0,
        },
        10.0,
    )
    .unwrap();
    let mut lattice = casing.create_nodes().unwrap();
    let mounting = casing.get_mounting_waypoints(&mut lattice);

    let manager = ObstacleManager::new(settings(6), &ObstacleCatalogue::builtin()).unwrap();
    let placed = manager.place_obstacles(&mut lattice, &mut StdRng::seed_from_u64(21));
    for obstacle in &placed {
        for id in &mounting {
            assert!(!obstacle.contains(*id));
        }
    }
}
