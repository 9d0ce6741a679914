use super::{ProcessQueue, ProcessTable};

/// Ready queue plus dispatch. Strict FIFO round robin; priority plays no part.
pub(crate) struct ShortTermScheduler {
    ready_queue: ProcessQueue,
    max_ready: usize,
}

impl ShortTermScheduler {
    pub fn new(max_ready: usize) -> ShortTermScheduler {
        ShortTermScheduler {
            ready_queue: ProcessQueue::new(),
            max_ready,
        }
    }

    /// Appends to the tail. Requeues after a slice bypass the capacity check.
    pub fn schedule_process(&mut self, process_id: u32) {
        self.ready_queue.enqueue(process_id);
    }

    /// Counts entries whether or not they are still alive.
    pub fn is_full(&self) -> bool {
        self.ready_queue.len_at_least(self.max_ready)
    }

    pub fn has_processes(&self) -> bool {
        !self.ready_queue.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ready_queue.len()
    }

    /// Pops the next live process, discarding dead entries on the way.
    pub fn schedule_next(&mut self, table: &ProcessTable) -> Option<u32> {
        while !self.ready_queue.is_empty() {
            let process_id = self.ready_queue.dequeue()?;

            if table.is_live(process_id) {
                return Some(process_id);
            }

            log::debug!("skipping dead process {} in ready queue", process_id);
        }

        None
    }
}
