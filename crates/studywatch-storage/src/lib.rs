pub mod db;
pub mod migrations;
pub mod models;

pub use db::Database;
pub use models::{
    parse_duration_secs, Settings, StoredSessionRecord, DEFAULT_SERVER_HOST, DEFAULT_SERVER_PORT,
};
