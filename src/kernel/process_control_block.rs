use std::fmt;

use bitflags::bitflags;
use serde::Serialize;

/// Number of words in every process's address space.
pub const MEMORY_WORDS: usize = 32;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum ProcessState {
    New,
    Ready,
    Running,
}

impl ProcessState {
    const ALL: [ProcessState; 3] = [ProcessState::New, ProcessState::Ready, ProcessState::Running];

    /// Maps an ordinal to a state. Out-of-range ordinals fall back to `New`.
    pub fn from_index(index: i64) -> ProcessState {
        usize::try_from(index)
            .ok()
            .and_then(|index| Self::ALL.get(index).copied())
            .unwrap_or(Self::ALL[0])
    }
}

impl fmt::Display for ProcessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessState::New => write!(f, "New"),
            ProcessState::Ready => write!(f, "Ready"),
            ProcessState::Running => write!(f, "Running"),
        }
    }
}

/// Recorded and reported, never used to order a queue.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum ProcessPriority {
    Low,
    Normal,
    High,
}

impl ProcessPriority {
    const ALL: [ProcessPriority; 3] = [ProcessPriority::Low, ProcessPriority::Normal, ProcessPriority::High];

    /// Maps an ordinal to a priority. Out-of-range ordinals fall back to `Low`.
    pub fn from_index(index: i64) -> ProcessPriority {
        usize::try_from(index)
            .ok()
            .and_then(|index| Self::ALL.get(index).copied())
            .unwrap_or(Self::ALL[0])
    }
}

impl fmt::Display for ProcessPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessPriority::Low => write!(f, "Low"),
            ProcessPriority::Normal => write!(f, "Normal"),
            ProcessPriority::High => write!(f, "High"),
        }
    }
}

bitflags! {
    /// Processor status word. Bits only ever accumulate for the lifetime of a process.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct StatusFlags: u8 {
        const ZERO = 0b001;
        const NEGATIVE = 0b010;
        const OVERFLOW = 0b100;
    }
}

/// The per-process image: identity, scheduling state, registers and memory.
#[derive(Debug, Clone)]
pub struct ProcessControlBlock {
    pub state: ProcessState,

    id: u32,
    user_id: i32,
    priority: ProcessPriority,
    name: String,

    program_counter: usize,
    executed_cycles: u32,
    max_cycles: u32,
    accumulator: u8,
    flags: StatusFlags,
    memory: [u8; MEMORY_WORDS],

    is_dead: bool,
}

impl ProcessControlBlock {
    /// Builds a fresh image in the `New` state. Only the first
    /// `MEMORY_WORDS` bytes of `image` are used; the rest of memory stays zero.
    pub fn new(
        id: u32,
        user_id: i32,
        priority: ProcessPriority,
        max_cycles: u32,
        name: impl Into<String>,
        image: &[u8],
    ) -> ProcessControlBlock {
        let mut memory = [0; MEMORY_WORDS];
        let len = image.len().min(MEMORY_WORDS);
        memory[..len].copy_from_slice(&image[..len]);

        ProcessControlBlock {
            state: ProcessState::New,
            id,
            user_id,
            priority,
            name: name.into(),
            program_counter: 0,
            executed_cycles: 0,
            max_cycles,
            accumulator: 0,
            flags: StatusFlags::empty(),
            memory,
            is_dead: false,
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn user_id(&self) -> i32 {
        self.user_id
    }

    pub fn priority(&self) -> ProcessPriority {
        self.priority
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn program_counter(&self) -> usize {
        self.program_counter
    }

    /// Negative targets are clamped to address 0.
    pub fn set_program_counter(&mut self, program_counter: i64) {
        self.program_counter = usize::try_from(program_counter).unwrap_or(0);
    }

    pub fn executed_cycles(&self) -> u32 {
        self.executed_cycles
    }

    pub fn max_cycles(&self) -> u32 {
        self.max_cycles
    }

    pub(crate) fn record_cycle(&mut self) {
        self.executed_cycles = self.executed_cycles.saturating_add(1);
    }

    /// True once the process has run strictly more instructions than its budget.
    pub fn exceeded_cycle_budget(&self) -> bool {
        self.executed_cycles > self.max_cycles
    }

    pub fn accumulator(&self) -> u8 {
        self.accumulator
    }

    pub(crate) fn set_accumulator(&mut self, value: u8) {
        self.accumulator = value;
    }

    pub fn flags(&self) -> StatusFlags {
        self.flags
    }

    /// ORs `flags` into the status word. There is deliberately no way to clear a bit.
    pub(crate) fn raise_flags(&mut self, flags: StatusFlags) {
        self.flags |= flags;
    }

    pub fn memory(&self) -> &[u8; MEMORY_WORDS] {
        &self.memory
    }

    /// Addresses past the end of memory read as zero (a STOP word).
    pub fn read_word(&self, address: usize) -> u8 {
        self.memory.get(address).copied().unwrap_or(0)
    }

    pub(crate) fn write_word(&mut self, address: usize, value: u8) {
        if let Some(word) = self.memory.get_mut(address) {
            *word = value;
        }
    }

    /// Marks the image dead. One-way: a dead image is never dispatched again.
    pub fn kill(&mut self) {
        self.is_dead = true;
    }

    pub fn is_dead(&self) -> bool {
        self.is_dead
    }
}
