pub mod sqlite_database;
