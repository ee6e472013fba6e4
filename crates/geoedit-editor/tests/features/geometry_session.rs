use geoedit_editor::geometry::coord;
use geoedit_editor::primitives::rectangle;
use geoedit_editor::{
    BufferKind, BufferParams, EditorSession, Geometry, GeometryToolKind, Layer, RecordingCanvas,
    ReferencePoint, ToolKey, TransformOp,
};
use geoedit_settings::EditorSettings;

fn session_with(shapes: Vec<Geometry>) -> EditorSession {
    let mut session = EditorSession::new(EditorSettings::default());
    session.load(shapes);
    session
}

fn rect(x: f64, y: f64, w: f64, h: f64) -> Geometry {
    Geometry::Polygon(rectangle(coord(x, y), coord(x + w, y + h)))
}

fn type_text(session: &mut EditorSession, text: &str) {
    for c in text.chars() {
        session.on_key(ToolKey::Char(c));
    }
}

#[test]
fn test_draw_rectangle_rearms_tool() {
    let mut session = EditorSession::new(EditorSettings::default());
    session.select_tool(GeometryToolKind::Rectangle);
    session.on_click(coord(0.0, 0.0));
    assert!(session.on_move(coord(1.0, 1.0)).is_some());
    let msg = session.on_click(coord(2.0, 1.0));

    assert!(!msg.is_failure());
    assert_eq!(session.tool_kind(), &GeometryToolKind::Rectangle);
    assert!(session.utility().is_none());
    let shapes = session.commit();
    assert_eq!(shapes.len(), 1);
    assert!((shapes[0].area() - 2.0).abs() < 1e-9);
}

#[test]
fn test_polygon_finishes_on_enter() {
    let mut session = EditorSession::new(EditorSettings::default());
    session.select_tool(GeometryToolKind::Polygon);
    for p in [(0.0, 0.0), (4.0, 0.0), (4.0, 3.0)] {
        session.on_click(coord(p.0, p.1));
    }
    let msg = session.on_key(ToolKey::Enter).unwrap();
    assert!(!msg.is_failure());

    let shapes = session.commit();
    assert_eq!(shapes.len(), 1);
    assert!((shapes[0].area() - 6.0).abs() < 1e-9);
}

#[test]
fn test_escape_abandons_points() {
    let mut session = EditorSession::new(EditorSettings::default());
    session.select_tool(GeometryToolKind::Path);
    session.on_click(coord(0.0, 0.0));
    session.on_click(coord(1.0, 0.0));
    session.on_key(ToolKey::Escape);

    assert_eq!(session.tool_kind(), &GeometryToolKind::Select);
    assert!(session.commit().is_empty());
}

#[test]
fn test_select_click_then_move() {
    let mut session = session_with(vec![rect(0.0, 0.0, 1.0, 1.0), rect(5.0, 5.0, 1.0, 1.0)]);
    session.on_click(coord(0.0, 0.0));
    assert_eq!(session.selection().len(), 1);

    session.select_tool(GeometryToolKind::Move);
    session.on_click(coord(0.0, 0.0));
    session.on_click(coord(10.0, 0.0));

    let shapes = session.commit();
    assert_eq!(shapes.len(), 2);
    let moved = shapes
        .iter()
        .filter_map(|g| g.bounding_rect())
        .find(|r| r.min().x > 9.0)
        .expect("moved shape");
    assert_eq!(moved.min(), coord(10.0, 0.0));
    assert_eq!(session.selection().len(), 1);
}

#[test]
fn test_drag_selects_enclosed_shapes() {
    let mut session = session_with(vec![rect(0.0, 0.0, 1.0, 1.0), rect(5.0, 5.0, 1.0, 1.0)]);
    session.on_click(coord(-1.0, -1.0));
    session.on_click_release(coord(2.0, 2.0));
    assert_eq!(session.selection().len(), 1);
}

#[test]
fn test_scale_zero_factor_is_ignored() {
    let mut session = session_with(vec![rect(0.0, 0.0, 2.0, 1.0)]);
    session.select_all();
    session.select_tool(GeometryToolKind::Transform {
        op: TransformOp::Scale,
        reference: ReferencePoint::Center,
    });
    type_text(&mut session, "0,1");
    let msg = session.on_key(ToolKey::Enter).unwrap();
    assert!(!msg.is_failure());

    let rect = session.commit()[0].bounding_rect().unwrap();
    assert!((rect.width() - 2.0).abs() < 1e-9);
    assert!((rect.height() - 1.0).abs() < 1e-9);
    assert_eq!(session.selection().len(), 1);
    assert_eq!(session.tool_kind(), &GeometryToolKind::Select);
}

#[test]
fn test_buffer_selects_result() {
    let mut session = session_with(vec![rect(0.0, 0.0, 2.0, 2.0)]);
    session.select_all();
    session.select_tool(GeometryToolKind::Buffer(BufferParams {
        distance: 0.5,
        kind: BufferKind::Interior,
        join: None,
    }));
    session.on_key(ToolKey::Enter);

    assert_eq!(session.commit().len(), 2);
    assert_eq!(session.selection().len(), 1);
    let id = session.selection().first().unwrap();
    let rect = session.workspace().get(id).unwrap().geometry.bounding_rect().unwrap();
    assert!((rect.width() - 1.0).abs() < 1e-6);
    assert!((rect.center().x - 1.0).abs() < 1e-6);
}

#[test]
fn test_union_replaces_selection() {
    let mut session = session_with(vec![rect(0.0, 0.0, 2.0, 2.0), rect(1.0, 1.0, 2.0, 2.0)]);
    session.select_all();
    let msg = session.union_selected();
    assert!(!msg.is_failure());

    let shapes = session.commit();
    assert_eq!(shapes.len(), 1);
    assert!((shapes[0].area() - 7.0).abs() < 1e-9);
    assert_eq!(session.selection().len(), 1);
}

#[test]
fn test_failed_boolean_leaves_store_unchanged() {
    let mut session = session_with(vec![rect(0.0, 0.0, 1.0, 1.0), rect(5.0, 5.0, 1.0, 1.0)]);
    session.select_all();
    let before = session.commit();

    let msg = session.intersection_selected();
    assert!(msg.is_failure());
    assert_eq!(session.commit(), before);
    assert_eq!(session.selection().len(), 2);
}

#[test]
fn test_subtract_keeps_tools() {
    let mut session = session_with(vec![rect(0.0, 0.0, 4.0, 4.0), rect(1.0, 1.0, 1.0, 1.0)]);
    session.select_all();
    session.subtract_selected();

    let shapes = session.commit();
    assert_eq!(shapes.len(), 2);
    let total: f64 = shapes.iter().map(Geometry::area).sum();
    assert!((total - 16.0).abs() < 1e-9);
}

#[test]
fn test_delete_selected() {
    let mut session = session_with(vec![rect(0.0, 0.0, 1.0, 1.0), rect(5.0, 5.0, 1.0, 1.0)]);
    assert!(session.delete_selected().is_failure());
    session.select_all();
    session.delete_selected();
    assert!(session.commit().is_empty());
    assert!(session.selection().is_empty());
}

#[test]
fn test_replot_draws_preview() {
    let mut session = session_with(vec![rect(0.0, 0.0, 1.0, 1.0)]);
    session.select_tool(GeometryToolKind::Circle);
    session.on_click(coord(5.0, 5.0));
    session.on_move(coord(6.0, 5.0));

    let mut canvas = RecordingCanvas::new();
    session.replot(&mut canvas);
    assert_eq!(canvas.on_layer(Layer::Shapes).count(), 1);
    assert_eq!(canvas.on_layer(Layer::Utility).count(), 1);
}
