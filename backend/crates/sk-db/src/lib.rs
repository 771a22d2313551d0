pub mod connection;
pub mod database;
pub mod error;

pub use connection::sqlite_database::{PoolSettings, SqliteDatabase};
pub use database::{Database, DbStats, ErrorReporter};
pub use error::{DbError, Result};
