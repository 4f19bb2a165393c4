pub mod add;
pub mod common;
pub mod completions;
pub mod config;
pub mod export;
pub mod import;
pub mod list;
pub mod random;
pub mod sync;
