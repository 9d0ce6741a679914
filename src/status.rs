use std::fmt;

use serde::Serialize;

use crate::kernel::{ProcessControlBlock, ProcessPriority, ProcessState, MEMORY_WORDS};

/// Point-in-time snapshot of a process, used for `show`, `plist` and core dumps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessStatus {
    pub id: u32,
    pub user_id: i32,
    pub state: ProcessState,
    pub priority: ProcessPriority,
    pub max_cycles: u32,
    pub executed_cycles: u32,
    pub name: String,
    pub program_counter: usize,
    pub accumulator: u8,
    pub flags: u8,
    pub memory: [u8; MEMORY_WORDS],
}

impl From<&ProcessControlBlock> for ProcessStatus {
    fn from(pcb: &ProcessControlBlock) -> ProcessStatus {
        ProcessStatus {
            id: pcb.id(),
            user_id: pcb.user_id(),
            state: pcb.state,
            priority: pcb.priority(),
            max_cycles: pcb.max_cycles(),
            executed_cycles: pcb.executed_cycles(),
            name: pcb.name().to_string(),
            program_counter: pcb.program_counter(),
            accumulator: pcb.accumulator(),
            flags: pcb.flags().bits(),
            memory: *pcb.memory(),
        }
    }
}

/// Detailed multi-line report, ending with the memory dump and a blank line.
impl fmt::Display for ProcessStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "PID = {}", self.id)?;
        writeln!(f, "userID = {}", self.user_id)?;
        writeln!(f, "state = {}", self.state)?;
        writeln!(f, "priority = {}", self.priority)?;
        writeln!(f, "max CPU cycles = {}", self.max_cycles)?;
        writeln!(f, "CPU cycles used = {}", self.executed_cycles)?;
        writeln!(f, "filename = {}", self.name)?;
        writeln!(f, "PC = {}", self.program_counter)?;
        writeln!(f, "AC = {}", self.accumulator)?;

        for row in self.memory.chunks(8) {
            for word in row {
                write!(f, "{:02X} ", word)?;
            }
            writeln!(f)?;
        }

        writeln!(f)
    }
}

/// Renders the one-line-per-process table used by `plist`.
pub fn render_listing<'a>(statuses: impl IntoIterator<Item = &'a ProcessStatus>) -> String {
    let mut output = String::from(
        " PID   userID  state  priority  max CPU  CPU used  filename\n\
         -----  ------  -----  --------  -------  --------  --------\n",
    );

    for status in statuses {
        output.push_str(&format!(
            "{:>5}  {:>6}  {:>5}  {:>8}  {:>7}  {:>8}  {:>8}\n",
            status.id,
            status.user_id,
            status.state.to_string(),
            status.priority.to_string(),
            status.max_cycles,
            status.executed_cycles,
            status.name
        ));
    }

    output
}
