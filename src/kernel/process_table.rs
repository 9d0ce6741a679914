use super::ProcessControlBlock;

/// Id-indexed arena that owns every live process image.
///
/// Ids are slot indices handed out in order and never reused, so the
/// capacity bounds the number of processes ever created.
#[derive(Debug)]
pub(crate) struct ProcessTable {
    slots: Vec<Option<ProcessControlBlock>>,
    capacity: usize,
}

impl ProcessTable {
    pub fn new(capacity: usize) -> ProcessTable {
        ProcessTable {
            slots: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn is_full(&self) -> bool {
        self.slots.len() >= self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn next_id(&self) -> u32 {
        self.slots.len() as u32
    }

    /// Stores `pcb` in the slot matching its id, which must be `next_id()`.
    pub fn insert(&mut self, pcb: ProcessControlBlock) -> u32 {
        debug_assert_eq!(pcb.id(), self.next_id());
        let id = pcb.id();
        self.slots.push(Some(pcb));
        id
    }

    pub fn get(&self, process_id: u32) -> Option<&ProcessControlBlock> {
        self.slots.get(process_id as usize)?.as_ref()
    }

    pub fn get_mut(&mut self, process_id: u32) -> Option<&mut ProcessControlBlock> {
        self.slots.get_mut(process_id as usize)?.as_mut()
    }

    pub fn remove(&mut self, process_id: u32) -> Option<ProcessControlBlock> {
        self.slots.get_mut(process_id as usize)?.take()
    }

    /// True for ids whose image is still in the table and not marked dead.
    pub fn is_live(&self, process_id: u32) -> bool {
        self.get(process_id).is_some_and(|pcb| !pcb.is_dead())
    }

    /// Live images in id order.
    pub fn iter(&self) -> impl Iterator<Item = &ProcessControlBlock> {
        self.slots.iter().flatten()
    }

    pub fn live_count(&self) -> usize {
        self.iter().count()
    }
}
