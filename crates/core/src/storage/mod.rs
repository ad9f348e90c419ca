pub mod file;
pub mod format;
pub mod manager;
pub mod memory;
pub mod state;
pub mod traits;
