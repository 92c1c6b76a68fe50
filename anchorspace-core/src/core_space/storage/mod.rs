//! SQLite-backed space storage

mod migrations;
mod sql_store;

pub use sql_store::SpaceSqlStore;
