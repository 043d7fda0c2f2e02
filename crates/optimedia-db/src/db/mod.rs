//! Database repositories and migration runner.

pub mod migrations;
pub mod store;
pub mod video;
