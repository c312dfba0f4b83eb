//! Utilities shared by the loader and the binary

pub mod logging;

pub use logging::{log_operation_complete, log_operation_start, log_warning};
