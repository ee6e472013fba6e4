//! Headless replay of editor event scripts.
//!
//! A script names the editor to drive, its initial content and a list of
//! events:
//!
//! ```json
//! {
//!   "editor": "geometry",
//!   "events": [
//!     { "event": "tool", "tool": "rectangle" },
//!     { "event": "click", "x": 0.0, "y": 0.0 },
//!     { "event": "click", "x": 10.0, "y": 5.0 }
//!   ]
//! }
//! ```
//!
//! Deferred steps run on the tokio blocking pool when a runtime is present;
//! the replay waits for each one before feeding the next event.

use geo::Coord;
use geoedit_core::{EditorResult, InlineWorker, StatusMessage, TokioWorker};
use geoedit_editor::tools::Edit;
use geoedit_editor::{
    Diameter, DrillSession, DrillStores, DrillToolKind, EditorSession, Geometry,
    GeometryToolKind, Modifiers, Session, SpatialShapeStore, ToolKey, Workspace,
};
use geoedit_settings::EditorSettings;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How often a busy session is polled.
const POLL_INTERVAL: Duration = Duration::from_millis(5);

/// One input event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event<K> {
    Tool { tool: K },
    Click { x: f64, y: f64 },
    Release { x: f64, y: f64 },
    Move { x: f64, y: f64 },
    Key { key: ToolKey },
    /// Types every character of `text`.
    Type { text: String },
    Modifiers { control: bool, shift: bool },
    Escape,
    SelectAll,
    ClearSelection,
    Delete,
    // geometry editor
    Union,
    Intersection,
    Subtract,
    Cut,
    // drill editor
    AddDiameter { diameter: f64 },
    ActiveDiameter { diameter: f64 },
    RemoveDiameter { diameter: f64 },
    Resize { from: Vec<f64>, to: f64 },
}

/// Drill centers of one diameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrillGroup {
    pub diameter: f64,
    pub centers: Vec<Coord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "editor", rename_all = "snake_case")]
pub enum Script {
    Geometry {
        #[serde(default)]
        shapes: Vec<Geometry>,
        events: Vec<Event<GeometryToolKind>>,
    },
    Drill {
        #[serde(default)]
        drills: Vec<DrillGroup>,
        events: Vec<Event<DrillToolKind>>,
    },
}

/// Committed content plus every status message the replay produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "editor", rename_all = "snake_case")]
pub enum Report {
    Geometry {
        messages: Vec<StatusMessage>,
        shapes: Vec<Geometry>,
    },
    Drill {
        messages: Vec<StatusMessage>,
        drills: Vec<DrillGroup>,
    },
}

fn new_session<W: Workspace + Default>(settings: EditorSettings) -> Session<W> {
    match TokioWorker::<EditorResult<Edit<W>>>::current() {
        Some(worker) => Session::with_worker(W::default(), settings, Box::new(worker)),
        None => {
            tracing::debug!("No tokio runtime, running deferred steps inline");
            Session::with_worker(W::default(), settings, Box::new(InlineWorker::new()))
        }
    }
}

/// Feeds the events every editor understands. Returns editor-specific
/// events unhandled.
fn replay_common<W: Workspace>(
    session: &mut Session<W>,
    event: Event<W::ToolKind>,
    messages: &mut Vec<StatusMessage>,
) -> Option<Event<W::ToolKind>> {
    let message = match event {
        Event::Tool { tool } => Some(session.select_tool(tool)),
        Event::Click { x, y } => Some(session.on_click(Coord { x, y })),
        Event::Release { x, y } => session.on_click_release(Coord { x, y }),
        Event::Move { x, y } => {
            session.on_move(Coord { x, y });
            None
        }
        Event::Key { key } => session.on_key(key),
        Event::Type { text } => {
            for c in text.chars() {
                messages.extend(session.on_key(ToolKey::Char(c)));
            }
            None
        }
        Event::Modifiers { control, shift } => {
            session.set_modifiers(Modifiers { control, shift });
            None
        }
        Event::Escape => Some(session.escape()),
        Event::SelectAll => Some(session.select_all()),
        Event::ClearSelection => {
            session.clear_selection();
            None
        }
        Event::Delete => Some(session.delete_selected()),
        other => return Some(other),
    };
    messages.extend(message);
    None
}

/// Polls until the deferred step in flight has been applied.
async fn settle<W: Workspace>(session: &mut Session<W>, messages: &mut Vec<StatusMessage>) {
    while session.is_busy() {
        tokio::time::sleep(POLL_INTERVAL).await;
        messages.extend(session.poll_worker());
    }
}

fn diameter(value: f64, messages: &mut Vec<StatusMessage>) -> Option<Diameter> {
    match Diameter::new(value) {
        Ok(d) => Some(d),
        Err(e) => {
            messages.push((&e).into());
            None
        }
    }
}

impl Script {
    /// Replays the script against a fresh session.
    pub async fn run(self, settings: EditorSettings) -> Report {
        match self {
            Self::Geometry { shapes, events } => {
                let mut session: EditorSession = new_session::<SpatialShapeStore>(settings);
                session.load(shapes);
                let mut messages = Vec::new();
                for event in events {
                    if let Some(event) = replay_common(&mut session, event, &mut messages) {
                        let message = match event {
                            Event::Union => session.union_selected(),
                            Event::Intersection => session.intersection_selected(),
                            Event::Subtract => session.subtract_selected(),
                            Event::Cut => session.cut_selected(),
                            other => {
                                tracing::warn!("{:?} is not a geometry editor event", other);
                                StatusMessage::warning("Event not supported by the geometry editor")
                            }
                        };
                        messages.push(message);
                    }
                    settle(&mut session, &mut messages).await;
                }
                Report::Geometry {
                    messages,
                    shapes: session.commit(),
                }
            }
            Self::Drill { drills, events } => {
                let mut session: DrillSession = new_session::<DrillStores>(settings);
                let mut messages = Vec::new();
                let initial: Vec<(Diameter, Vec<Coord>)> = drills
                    .into_iter()
                    .filter_map(|g| Some((diameter(g.diameter, &mut messages)?, g.centers)))
                    .collect();
                session.load_drills(initial);

                for event in events {
                    if let Some(event) = replay_common(&mut session, event, &mut messages) {
                        replay_drill(&mut session, event, &mut messages);
                    }
                    settle(&mut session, &mut messages).await;
                }
                let drills = session
                    .commit_drills()
                    .into_iter()
                    .map(|(d, centers)| DrillGroup {
                        diameter: d.value(),
                        centers,
                    })
                    .collect();
                Report::Drill { messages, drills }
            }
        }
    }
}

fn replay_drill(
    session: &mut DrillSession,
    event: Event<DrillToolKind>,
    messages: &mut Vec<StatusMessage>,
) {
    let result = match event {
        Event::AddDiameter { diameter } => session
            .add_diameter(diameter)
            .map(|d| StatusMessage::success(format!("Added diameter {}", d))),
        Event::ActiveDiameter { diameter } => Diameter::new(diameter)
            .and_then(|d| session.set_active_diameter(d).map(|_| d))
            .map(|d| StatusMessage::info(format!("Active diameter {}", d))),
        Event::RemoveDiameter { diameter } => Diameter::new(diameter)
            .and_then(|d| session.remove_diameter(d))
            .map(|n| StatusMessage::success(format!("Removed {} drills", n))),
        Event::Resize { from, to } => {
            let from: Option<Vec<Diameter>> = from.iter().map(|v| diameter(*v, messages)).collect();
            match (from, diameter(to, messages)) {
                (Some(from), Some(to)) => Ok(session.resize_drills(from, to)),
                _ => return,
            }
        }
        other => {
            tracing::warn!("{:?} is not a drill editor event", other);
            Ok(StatusMessage::warning("Event not supported by the drill editor"))
        }
    };
    messages.push(match result {
        Ok(message) => message,
        Err(e) => (&e).into(),
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn replay(json: &str) -> Report {
        let script: Script = serde_json::from_str(json).unwrap();
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        runtime.block_on(script.run(EditorSettings::default()))
    }

    #[test]
    fn test_geometry_script() {
        let report = replay(
            r#"{
                "editor": "geometry",
                "events": [
                    { "event": "tool", "tool": "rectangle" },
                    { "event": "click", "x": 0.0, "y": 0.0 },
                    { "event": "click", "x": 2.0, "y": 2.0 },
                    { "event": "escape" },
                    { "event": "select_all" },
                    { "event": "tool", "tool": { "buffer": { "distance": 0.5, "kind": "interior" } } },
                    { "event": "key", "key": "enter" }
                ]
            }"#,
        );
        let Report::Geometry { shapes, messages } = report else {
            panic!("geometry report expected");
        };
        assert_eq!(shapes.len(), 2);
        assert!(messages.iter().all(|m| !m.is_failure()), "{:?}", messages);
    }

    #[test]
    fn test_drill_script() {
        let report = replay(
            r#"{
                "editor": "drill",
                "drills": [ { "diameter": 1.0, "centers": [ { "x": 5.0, "y": 5.0 } ] } ],
                "events": [
                    { "event": "add_diameter", "diameter": 0.8 },
                    { "event": "tool", "tool": "add" },
                    { "event": "click", "x": 1.0, "y": 1.0 },
                    { "event": "union" }
                ]
            }"#,
        );
        let Report::Drill { drills, messages } = report else {
            panic!("drill report expected");
        };
        assert_eq!(drills.len(), 2);
        assert_eq!(drills[0].diameter, 0.8);
        assert!(messages.last().unwrap().is_failure());
    }
}
