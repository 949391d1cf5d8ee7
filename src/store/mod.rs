pub mod memory;
pub mod repo;
pub mod sqlite;
pub mod state;
