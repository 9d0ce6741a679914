use super::{ProcessQueue, ProcessTable};

/// Admission stage: holds newly created processes until the ready queue has room.
pub(crate) struct LongTermScheduler {
    new_queue: ProcessQueue,
}

impl LongTermScheduler {
    pub fn new() -> LongTermScheduler {
        LongTermScheduler {
            new_queue: ProcessQueue::new(),
        }
    }

    pub fn enqueue_process(&mut self, process_id: u32) {
        self.new_queue.enqueue(process_id);
    }

    pub fn has_processes(&self) -> bool {
        !self.new_queue.is_empty()
    }

    pub fn len(&self) -> usize {
        self.new_queue.len()
    }

    /// Pops the next live process, discarding dead entries on the way.
    pub fn step(&mut self, table: &ProcessTable) -> Option<u32> {
        while !self.new_queue.is_empty() {
            let process_id = self.new_queue.dequeue()?;

            if table.is_live(process_id) {
                return Some(process_id);
            }

            log::debug!("discarding dead process {} from admission queue", process_id);
        }

        None
    }
}
