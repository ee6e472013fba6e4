use geoedit_core::{Completion, EditorResult, Job, TokioWorker, WorkerQueue};
use geoedit_editor::geometry::coord;
use geoedit_editor::primitives::rectangle;
use geoedit_editor::{
    BufferKind, BufferParams, Edit, EditorSession, Geometry, GeometryToolKind, Session,
    SpatialShapeStore, ToolKey,
};
use geoedit_settings::EditorSettings;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

type EditResult = EditorResult<Edit<SpatialShapeStore>>;

/// Holds jobs until the test runs them.
struct ManualWorker {
    pending: Rc<RefCell<Vec<(u64, Job<EditResult>)>>>,
    done: Rc<RefCell<VecDeque<Completion<EditResult>>>>,
}

impl ManualWorker {
    fn run_all(&self) {
        for (generation, job) in self.pending.borrow_mut().drain(..) {
            self.done
                .borrow_mut()
                .push_back(Completion { generation, result: job() });
        }
    }
}

impl WorkerQueue<EditResult> for ManualWorker {
    fn enqueue(&mut self, generation: u64, job: Job<EditResult>) {
        self.pending.borrow_mut().push((generation, job));
    }

    fn try_next(&mut self) -> Option<Completion<EditResult>> {
        self.done.borrow_mut().pop_front()
    }
}

fn manual_session() -> (EditorSession, ManualWorker) {
    let pending = Rc::new(RefCell::new(Vec::new()));
    let done = Rc::new(RefCell::new(VecDeque::new()));
    let worker = ManualWorker {
        pending: pending.clone(),
        done: done.clone(),
    };
    let mut session = Session::with_worker(
        SpatialShapeStore::new(),
        EditorSettings::default(),
        Box::new(worker),
    );
    session.load([Geometry::Polygon(rectangle(coord(0.0, 0.0), coord(2.0, 2.0)))]);
    session.select_all();
    (session, ManualWorker { pending, done })
}

fn start_buffer(session: &mut EditorSession) {
    session.select_tool(GeometryToolKind::Buffer(BufferParams {
        distance: 0.5,
        kind: BufferKind::Interior,
        join: None,
    }));
    session.on_key(ToolKey::Enter);
}

#[test]
fn test_input_rejected_while_busy() {
    let (mut session, worker) = manual_session();
    start_buffer(&mut session);
    assert!(session.is_busy());

    let msg = session.on_click(coord(1.0, 1.0));
    assert!(msg.is_failure());
    assert!(session.delete_selected().is_failure());

    worker.run_all();
    let messages = session.poll_worker();
    assert_eq!(messages.len(), 1);
    assert!(!messages[0].is_failure());
    assert!(!session.is_busy());
    assert_eq!(session.workspace().len(), 2);
    assert_eq!(session.tool_kind(), &GeometryToolKind::Select);
}

#[test]
fn test_result_dropped_after_escape() {
    let (mut session, worker) = manual_session();
    start_buffer(&mut session);
    session.on_key(ToolKey::Escape);
    assert!(!session.is_busy());

    worker.run_all();
    assert!(session.poll_worker().is_empty());
    assert_eq!(session.workspace().len(), 1);
}

#[test]
fn test_result_dropped_after_selection_change() {
    let (mut session, worker) = manual_session();
    start_buffer(&mut session);
    session.clear_selection();

    worker.run_all();
    assert!(session.poll_worker().is_empty());
    assert_eq!(session.workspace().len(), 1);
}

#[test]
fn test_tokio_worker_delivers_result() {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let worker = TokioWorker::new(runtime.handle().clone());
    let mut session = Session::with_worker(
        SpatialShapeStore::new(),
        EditorSettings::default(),
        Box::new(worker),
    );
    session.load([Geometry::Polygon(rectangle(coord(0.0, 0.0), coord(2.0, 2.0)))]);
    session.select_all();
    start_buffer(&mut session);

    let mut messages = Vec::new();
    for _ in 0..500 {
        messages = session.poll_worker();
        if !messages.is_empty() || !session.is_busy() {
            break;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    assert!(!session.is_busy());
    assert!(messages.iter().all(|m| !m.is_failure()));
    assert_eq!(session.workspace().len(), 2);
}
