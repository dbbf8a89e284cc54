//! Persistence gateway implementations.

pub mod json_file;
pub mod memory;

pub use json_file::JsonFileGateway;
pub use memory::MemoryGateway;
