use std::cell::RefCell;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Component, PathBuf};
use std::rc::Rc;

use serde::Serialize;

use crate::status::ProcessStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TerminationReason {
    CompletedNormally,
    CpuTimeLimit,
    Killed,
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TerminationReason::CompletedNormally => write!(f, "Process completed normally"),
            TerminationReason::CpuTimeLimit => write!(f, "Process reached CPU time limit"),
            TerminationReason::Killed => write!(f, "Process killed"),
        }
    }
}

/// Diagnostic record of a terminated process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoreDump {
    pub status: ProcessStatus,
    pub reason: TerminationReason,
}

impl fmt::Display for CoreDump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.status, self.reason)
    }
}

/// Sink for core dumps. Failures are reported but never stop a termination.
pub trait CoreDumpWriter {
    fn write(&mut self, dump: &CoreDump) -> io::Result<()>;
}

/// Writes `<name>.core` for each terminated process, replacing any earlier
/// record. The whole process name is kept so images that share a file name
/// in different directories get separate records.
#[derive(Debug, Clone, Default)]
pub struct FileCoreDumpWriter {
    directory: Option<PathBuf>,
}

impl FileCoreDumpWriter {
    /// Places each record beside the image it was loaded from.
    pub fn next_to_image() -> FileCoreDumpWriter {
        FileCoreDumpWriter { directory: None }
    }

    /// Places records under `directory`, mirroring the layout of the process name.
    pub fn new(directory: impl Into<PathBuf>) -> FileCoreDumpWriter {
        FileCoreDumpWriter {
            directory: Some(directory.into()),
        }
    }

    pub fn path_for(&self, name: &str) -> PathBuf {
        let record = PathBuf::from(format!("{name}.core"));

        match &self.directory {
            None => record,
            Some(directory) => {
                // Roots and drive prefixes are dropped so absolute names stay under `directory`.
                let relative: PathBuf = record
                    .components()
                    .filter(|component| !matches!(component, Component::RootDir | Component::Prefix(_)))
                    .collect();
                directory.join(relative)
            }
        }
    }
}

impl CoreDumpWriter for FileCoreDumpWriter {
    fn write(&mut self, dump: &CoreDump) -> io::Result<()> {
        let path = self.path_for(&dump.status.name);

        if self.directory.is_some() {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
        }

        fs::write(path, dump.to_string())
    }
}

/// Keeps core dumps in memory. Clones share the same record list.
#[derive(Debug, Clone, Default)]
pub struct MemoryCoreDumpWriter {
    records: Rc<RefCell<Vec<CoreDump>>>,
}

impl MemoryCoreDumpWriter {
    pub fn new() -> MemoryCoreDumpWriter {
        MemoryCoreDumpWriter::default()
    }

    pub fn records(&self) -> Vec<CoreDump> {
        self.records.borrow().clone()
    }
}

impl CoreDumpWriter for MemoryCoreDumpWriter {
    fn write(&mut self, dump: &CoreDump) -> io::Result<()> {
        self.records.borrow_mut().push(dump.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::{ProcessControlBlock, ProcessPriority};

    fn dump(name: &str, reason: TerminationReason) -> CoreDump {
        let pcb = ProcessControlBlock::new(1, 2, ProcessPriority::High, 3, name, &[0x21]);
        CoreDump {
            status: ProcessStatus::from(&pcb),
            reason,
        }
    }

    #[test]
    fn test_core_dump_display_ends_with_reason() {
        let text = dump("p", TerminationReason::CpuTimeLimit).to_string();

        assert!(text.starts_with("PID = 1\n"));
        assert!(text.ends_with(" \n\nProcess reached CPU time limit"));
    }

    #[test]
    fn test_file_core_dump_writer_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = FileCoreDumpWriter::new(dir.path());

        writer.write(&dump("prog", TerminationReason::Killed)).unwrap();
        writer.write(&dump("prog", TerminationReason::CompletedNormally)).unwrap();

        let contents = fs::read_to_string(dir.path().join("prog.core")).unwrap();
        assert!(contents.ends_with("Process completed normally"));
        assert!(!contents.contains("Process killed"));
    }

    #[test]
    fn test_file_core_dump_writer_path_keeps_whole_name() {
        let beside = FileCoreDumpWriter::next_to_image();
        assert_eq!(beside.path_for("jobs/prog.bin"), PathBuf::from("jobs/prog.bin.core"));

        let writer = FileCoreDumpWriter::new("/var/cores");
        assert_eq!(writer.path_for("prog.bin"), PathBuf::from("/var/cores/prog.bin.core"));
        assert_eq!(
            writer.path_for("/tmp/jobs/prog.bin"),
            PathBuf::from("/var/cores/tmp/jobs/prog.bin.core")
        );
        assert_ne!(writer.path_for("a/prog.bin"), writer.path_for("b/prog.bin"));
    }

    #[test]
    fn test_file_core_dump_writer_same_file_name_in_different_directories() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = FileCoreDumpWriter::new(dir.path());

        writer.write(&dump("a/prog.bin", TerminationReason::Killed)).unwrap();
        writer.write(&dump("b/prog.bin", TerminationReason::CompletedNormally)).unwrap();

        let first = fs::read_to_string(dir.path().join("a/prog.bin.core")).unwrap();
        let second = fs::read_to_string(dir.path().join("b/prog.bin.core")).unwrap();
        assert!(first.ends_with("Process killed"));
        assert!(second.ends_with("Process completed normally"));
    }

    #[test]
    fn test_file_core_dump_writer_unwritable_directory() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, b"").unwrap();
        let mut writer = FileCoreDumpWriter::new(&blocker);

        assert!(writer.write(&dump("prog", TerminationReason::Killed)).is_err());
    }

    #[test]
    fn test_memory_core_dump_writer_shares_records() {
        let writer = MemoryCoreDumpWriter::new();
        let mut handle = writer.clone();

        handle.write(&dump("a", TerminationReason::Killed)).unwrap();

        assert_eq!(writer.records().len(), 1);
        assert_eq!(writer.records()[0].reason, TerminationReason::Killed);
    }
}
