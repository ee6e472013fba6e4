#[path = "features/drill_session.rs"]
mod drill_session;
#[path = "features/geometry_session.rs"]
mod geometry_session;
#[path = "features/worker.rs"]
mod worker;
