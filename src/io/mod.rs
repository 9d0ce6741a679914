pub mod core_dump;
pub mod loader;

pub use core_dump::{CoreDump, CoreDumpWriter, FileCoreDumpWriter, MemoryCoreDumpWriter, TerminationReason};
pub use loader::{FileImageLoader, ImageLoader};
