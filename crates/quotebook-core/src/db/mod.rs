//! `SQLite` persistence for Quotebook

mod connection;
mod migrations;

pub use connection::Database;
