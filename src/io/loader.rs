use std::fs::File;
use std::io::{self, Read};

use crate::kernel::MEMORY_WORDS;

/// Source of process images.
pub trait ImageLoader {
    /// Returns at most `MEMORY_WORDS` bytes of the image named `path`.
    fn load(&self, path: &str) -> io::Result<Vec<u8>>;
}

/// Reads images straight from the filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileImageLoader;

impl ImageLoader for FileImageLoader {
    fn load(&self, path: &str) -> io::Result<Vec<u8>> {
        let file = File::open(path)?;
        let mut image = Vec::with_capacity(MEMORY_WORDS);
        file.take(MEMORY_WORDS as u64).read_to_end(&mut image)?;

        Ok(image)
    }
}
