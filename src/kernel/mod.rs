mod cpu;
mod long_term_scheduler;
mod process_control_block;
mod process_queue;
mod process_table;
mod short_term_scheduler;

use long_term_scheduler::LongTermScheduler;
use process_table::ProcessTable;
use short_term_scheduler::ShortTermScheduler;

pub mod scheduler;

pub use cpu::Cpu;
pub use process_queue::ProcessQueue;
pub use process_control_block::{ProcessControlBlock, ProcessPriority, ProcessState, StatusFlags, MEMORY_WORDS};
pub use scheduler::Scheduler;
