//! Process-management simulator: admission and ready queues, round-robin
//! time slicing, and an interpreter for a tiny 8-bit accumulator machine.

pub mod config;
pub mod error;
pub mod io;
pub mod kernel;
pub mod logger;
pub mod output;
pub mod shell;
pub mod status;

pub use config::SchedulerConfig;
pub use error::{ShellError, SimulatorError};
pub use kernel::Scheduler;
