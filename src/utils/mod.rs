pub mod command;
pub mod duplicity;
pub mod locker;
pub mod workspace;

// Trait-based abstraction for testability
pub mod executor;

// Re-export commonly used types and traits (used by test crate)
pub use command::{CommandOutput, Invocation};
pub use executor::{CommandExecutor, RealExecutor};
