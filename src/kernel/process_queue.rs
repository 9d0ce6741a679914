use std::collections::VecDeque;

/// FIFO of process ids. The images themselves live in the process table;
/// a queue only ever holds their ids.
#[derive(Debug, Default)]
pub struct ProcessQueue {
    ids: VecDeque<u32>,
}

impl ProcessQueue {
    pub fn new() -> ProcessQueue {
        ProcessQueue {
            ids: VecDeque::new(),
        }
    }

    pub fn enqueue(&mut self, process_id: u32) {
        self.ids.push_back(process_id);
    }

    /// Removes the head of the queue.
    ///
    /// Callers check `is_empty` first; an empty queue yields `None`.
    pub fn dequeue(&mut self) -> Option<u32> {
        self.ids.pop_front()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Bounded length probe: true if the queue holds at least `k` entries.
    pub fn len_at_least(&self, k: usize) -> bool {
        self.ids.iter().take(k).count() == k
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }
}
