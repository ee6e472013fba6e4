use geoedit_editor::geometry::{coord, distance};
use geoedit_editor::{
    ArcDirection, ArrayLayout, ArrayParams, Diameter, DrillSession, DrillToolKind, LinearAxis,
};
use geoedit_settings::EditorSettings;

fn d(value: f64) -> Diameter {
    Diameter::new(value).unwrap()
}

#[test]
fn test_add_needs_active_diameter() {
    let mut session = DrillSession::new(EditorSettings::default());
    let msg = session.select_tool(DrillToolKind::Add);
    assert!(msg.is_failure());
    assert_eq!(session.tool_kind(), &DrillToolKind::Select);
}

#[test]
fn test_add_drills_stays_armed() {
    let mut session = DrillSession::new(EditorSettings::default());
    session.add_diameter(0.8).unwrap();
    session.select_tool(DrillToolKind::Add);
    session.on_click(coord(1.0, 1.0));
    session.on_click(coord(2.0, 2.0));

    assert_eq!(session.tool_kind(), &DrillToolKind::Add);
    let drills = session.commit_drills();
    assert_eq!(drills.len(), 1);
    assert_eq!(drills[0].0, d(0.8));
    assert_eq!(drills[0].1.len(), 2);
    assert!(distance(drills[0].1[1], coord(2.0, 2.0)) < 1e-9);
}

#[test]
fn test_circular_array_through_session() {
    let mut session = DrillSession::new(EditorSettings::default());
    session.add_diameter(1.0).unwrap();
    session.select_tool(DrillToolKind::Array(ArrayParams::new(
        4,
        ArrayLayout::Circular {
            angle_step: 90.0,
            direction: ArcDirection::Ccw,
        },
    )));
    session.on_click(coord(0.0, 0.0));
    let msg = session.on_click(coord(1.0, 0.0));
    assert!(!msg.is_failure());

    let drills = session.commit_drills();
    let centers = &drills[0].1;
    let expected = [(1.0, 0.0), (0.0, 1.0), (-1.0, 0.0), (0.0, -1.0)];
    assert_eq!(centers.len(), 4);
    for (c, (x, y)) in centers.iter().zip(expected) {
        assert!(distance(*c, coord(x, y)) < 1e-9, "{:?}", c);
    }
}

#[test]
fn test_linear_array_with_typed_axis() {
    let mut session = DrillSession::new(EditorSettings::default());
    session.add_diameter(0.6).unwrap();
    session.select_tool(DrillToolKind::Array(ArrayParams::new(
        3,
        ArrayLayout::Linear {
            axis: LinearAxis::Y,
            pitch: 2.5,
        },
    )));
    session.on_click(coord(0.0, 0.0));
    let drills = session.commit_drills();
    let centers = &drills[0].1;
    assert!(distance(centers[2], coord(0.0, 5.0)) < 1e-9);
}

#[test]
fn test_resize_moves_drills_between_diameters() {
    let mut session = DrillSession::new(EditorSettings::default());
    session.load_drills([
        (d(0.8), vec![coord(0.0, 0.0), coord(5.0, 5.0)]),
        (d(1.0), vec![coord(1.0, 0.0)]),
    ]);
    session.set_active_diameter(d(0.8)).unwrap();

    let msg = session.resize_drills(vec![d(0.8)], d(1.2));
    assert!(!msg.is_failure());

    let drills = session.commit_drills();
    let diameters: Vec<Diameter> = drills.iter().map(|(d, _)| *d).collect();
    assert_eq!(diameters, vec![d(1.0), d(1.2)]);
    assert!(distance(drills[1].1[1], coord(5.0, 5.0)) < 1e-9);
    assert_eq!(session.workspace().active(), Some(d(1.2)));
    assert_eq!(session.selection().len(), 2);
}

#[test]
fn test_move_across_buckets() {
    let mut session = DrillSession::new(EditorSettings::default());
    session.load_drills([
        (d(0.8), vec![coord(0.0, 0.0)]),
        (d(1.0), vec![coord(3.0, 0.0)]),
    ]);
    session.select_all();
    session.select_tool(DrillToolKind::Move);
    session.on_click(coord(0.0, 0.0));
    session.on_click(coord(0.0, 2.0));

    let drills = session.commit_drills();
    assert!(distance(drills[0].1[0], coord(0.0, 2.0)) < 1e-9);
    assert!(distance(drills[1].1[0], coord(3.0, 2.0)) < 1e-9);
    assert_eq!(session.workspace().len(), 2);
}

#[test]
fn test_delete_last_drill_drops_bucket() {
    let mut session = DrillSession::new(EditorSettings::default());
    session.load_drills([(d(0.8), vec![coord(0.0, 0.0)])]);
    session.select_all();
    session.delete_selected();

    assert!(session.workspace().diameters().next().is_none());
    assert!(session.commit_drills().is_empty());
}

#[test]
fn test_remove_diameter() {
    let mut session = DrillSession::new(EditorSettings::default());
    session.load_drills([
        (d(0.8), vec![coord(0.0, 0.0), coord(1.0, 0.0)]),
        (d(1.0), vec![coord(3.0, 0.0)]),
    ]);
    session.select_all();
    assert_eq!(session.remove_diameter(d(0.8)).unwrap(), 2);
    assert_eq!(session.selection().len(), 1);
    assert!(session.remove_diameter(d(0.8)).is_err());
}
