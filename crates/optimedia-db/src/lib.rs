//! Persistence for video metadata.
//!
//! `VideoStore` is the seam the HTTP layer depends on; `PgVideoRepository`
//! is the Postgres implementation used in production.

pub mod db;

pub use db::migrations::run_migrations;
pub use db::store::VideoStore;
pub use db::video::PgVideoRepository;
