//! # geoedit
//!
//! Interactive 2D vector geometry and drill editing engine for CAM
//! workflows.
//!
//! ## Architecture
//!
//! geoedit is organized as a workspace with multiple crates:
//!
//! 1. **geoedit-core** - Error taxonomy, status messages, units, worker queues
//! 2. **geoedit-settings** - Editor settings and their persistence
//! 3. **geoedit-editor** - Shape store, transforms, boolean operations, tools
//!    and the editor sessions
//! 4. **geoedit** - Headless binary replaying event scripts against a session
//!
//! ## Features
//!
//! - **Spatial store**: R-tree vertex index for nearest-vertex queries and snapping
//! - **Drawing tools**: circle, arc, rectangle, polygon, path, text
//! - **Editing tools**: select, move, copy, transform, buffer, paint
//! - **Boolean operations**: union, intersection, subtraction, cut along path
//! - **Drill editor**: per-diameter stores, drill arrays, resize

pub mod script;

pub use geoedit_core::{EditorError, EditorResult, MessageLevel, StatusMessage};
pub use geoedit_editor as editor;
pub use geoedit_editor::{DrillSession, EditorSession, Geometry, GeometryValue};
pub use geoedit_settings::{EditorSettings, SettingsPersistence};
pub use script::{Event, Report, Script};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Pretty formatted output on stderr, keeping stdout for reports
/// - RUST_LOG environment variable support
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_line_number(true)
        .pretty();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
