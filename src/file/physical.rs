use super::Backend;
use crate::{Error::OutOfBounds, Result};

use memmap2::Mmap;
use std::{fs, path::Path};

/// Input backed by a memory-mapped file on disk
#[derive(Debug)]
pub struct Physical {
    data: Mmap,
}

impl Physical {
    /// Map a file from disk
    ///
    /// ## Arguments
    /// * 'path' - The file path to map
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened or mapped
    pub fn new(path: &Path) -> Result<Physical> {
        let file = fs::File::open(path)?;

        // SAFETY: the mapping is read-only; mutation of the underlying file by
        // other processes is outside our correctness contract.
        let mmap = unsafe { Mmap::map(&file)? };

        Ok(Physical { data: mmap })
    }
}

impl Backend for Physical {
    fn data_slice(&self, offset: usize, len: usize) -> Result<&[u8]> {
        let Some(offset_end) = offset.checked_add(len) else {
            return Err(OutOfBounds);
        };

        if offset_end > self.data.len() {
            return Err(OutOfBounds);
        }

        Ok(&self.data[offset..offset_end])
    }

    fn data(&self) -> &[u8] {
        self.data.as_ref()
    }

    fn len(&self) -> usize {
        self.data.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use std::io::Write;

    #[test]
    fn missing_file() {
        let result = Physical::new(Path::new("/nonexistent/path/to/file.dll"));
        match result {
            Err(Error::FileError(io_error)) => {
                assert_eq!(io_error.kind(), std::io::ErrorKind::NotFound);
            }
            _ => panic!("Expected FileError"),
        }
    }

    #[test]
    fn mapped_file_contents() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(&[0x4D, 0x5A, 0x01, 0x02, 0x03]).unwrap();
        tmp.flush().unwrap();

        let physical = Physical::new(tmp.path()).unwrap();
        assert_eq!(physical.len(), 5);
        assert_eq!(physical.data()[0], 0x4D);
        assert_eq!(physical.data_slice(2, 3).unwrap(), &[0x01, 0x02, 0x03]);
        assert!(physical.data_slice(4, 2).is_err());
    }
}
