//! Command-line argument parsing and handling.

pub mod definition;
pub mod utils;

// Re-export commonly used items
pub use definition::{Args, Operation, apply_operation, process_args};
pub use utils::determine_log_level;
