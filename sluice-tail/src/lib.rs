//! Sluice Tail
//!
//! Streams a growing log file to an output sink until the process is
//! interrupted or the process that launched it goes away.
//!
//! Architecture:
//! - Configuration: chunk size and polling interval, from environment or defaults
//! - Interrupts: signals are captured into a flag and honored between iterations
//! - Orphan detection: platform-specific checks that the parent is still alive
//! - Tail: the polling loop relaying new bytes to the sink

pub mod config;
pub mod interrupt;
pub mod orphan;
pub mod tail;

pub use config::TailConfig;
pub use interrupt::DeferredInterrupts;
pub use orphan::OrphanCheck;
pub use tail::{TailOutcome, TailSession};
