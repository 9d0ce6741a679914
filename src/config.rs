/// Instructions a running process may execute per time slice.
pub const INSTRUCTIONS_PER_SLICE: usize = 3;

/// Entries the ready queue may hold before admission stalls.
pub const MAX_READY_QUEUE: usize = 5;

/// Process ids available over the lifetime of a scheduler.
pub const MAX_SIMULTANEOUS_PROCESSES: usize = 100;

/// Limits that shape the scheduler. `Default` gives the standard machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerConfig {
    pub instructions_per_slice: usize,
    pub max_ready_queue: usize,
    pub max_processes: usize,
}

impl Default for SchedulerConfig {
    fn default() -> SchedulerConfig {
        SchedulerConfig {
            instructions_per_slice: INSTRUCTIONS_PER_SLICE,
            max_ready_queue: MAX_READY_QUEUE,
            max_processes: MAX_SIMULTANEOUS_PROCESSES,
        }
    }
}
