use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use log::{debug, info};
use thiserror::Error;

/// Value of a byte that has never been written
pub const ERASED: u8 = 0xFF;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("access of {len} bytes at {address} is outside the {size} byte medium")]
    OutOfBounds {
        address: usize,
        len: usize,
        size: usize,
    },
    #[error("storage I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("settings record could not be packed: {0}")]
    Pack(#[from] packed_struct::PackingError),
}

/// Byte-addressable persistent memory with an explicit commit, like the
/// flash-backed EEPROM emulation on small microcontrollers. Writes are only
/// guaranteed to survive a power cycle after `commit` returns.
pub trait Eeprom {
    fn len(&self) -> usize;

    fn read(&self, address: usize, buf: &mut [u8]) -> Result<(), StorageError>;

    fn write(&mut self, address: usize, data: &[u8]) -> Result<(), StorageError>;

    fn commit(&mut self) -> Result<(), StorageError>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn check_bounds(address: usize, len: usize, size: usize) -> Result<(), StorageError> {
    match address.checked_add(len) {
        Some(end) if end <= size => Ok(()),
        _ => Err(StorageError::OutOfBounds { address, len, size }),
    }
}

/// Volatile medium for tests and dry runs
#[derive(Clone, Debug)]
pub struct MemoryEeprom {
    bytes: Vec<u8>,
    commits: usize,
}

impl MemoryEeprom {
    pub fn new(size: usize) -> Self {
        Self {
            bytes: vec![ERASED; size],
            commits: 0,
        }
    }

    pub fn with_contents(bytes: Vec<u8>) -> Self {
        Self { bytes, commits: 0 }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Number of successful commits so far
    pub fn commits(&self) -> usize {
        self.commits
    }
}

impl Eeprom for MemoryEeprom {
    fn len(&self) -> usize {
        self.bytes.len()
    }

    fn read(&self, address: usize, buf: &mut [u8]) -> Result<(), StorageError> {
        check_bounds(address, buf.len(), self.bytes.len())?;
        buf.copy_from_slice(&self.bytes[address..address + buf.len()]);
        Ok(())
    }

    fn write(&mut self, address: usize, data: &[u8]) -> Result<(), StorageError> {
        check_bounds(address, data.len(), self.bytes.len())?;
        self.bytes[address..address + data.len()].copy_from_slice(data);
        Ok(())
    }

    fn commit(&mut self) -> Result<(), StorageError> {
        self.commits += 1;
        Ok(())
    }
}

/// Fixed-size image kept in a file. Reads and writes hit a RAM copy and
/// `commit` flushes the whole image to disk.
pub struct FileEeprom {
    path: PathBuf,
    file: File,
    image: Vec<u8>,
}

impl FileEeprom {
    pub fn open(path: impl AsRef<Path>, size: usize) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;

        let mut image = Vec::with_capacity(size);
        file.read_to_end(&mut image)?;

        if image.len() != size {
            info!(
                "Storage: {} holds {} bytes, resizing to {}",
                path.display(),
                image.len(),
                size
            );
            image.resize(size, ERASED);
        }

        Ok(Self { path, file, image })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Eeprom for FileEeprom {
    fn len(&self) -> usize {
        self.image.len()
    }

    fn read(&self, address: usize, buf: &mut [u8]) -> Result<(), StorageError> {
        check_bounds(address, buf.len(), self.image.len())?;
        buf.copy_from_slice(&self.image[address..address + buf.len()]);
        Ok(())
    }

    fn write(&mut self, address: usize, data: &[u8]) -> Result<(), StorageError> {
        check_bounds(address, data.len(), self.image.len())?;
        self.image[address..address + data.len()].copy_from_slice(data);
        Ok(())
    }

    fn commit(&mut self) -> Result<(), StorageError> {
        self.file.seek(SeekFrom::Start(0))?;
        self.file.write_all(&self.image)?;
        self.file.set_len(self.image.len() as u64)?;
        self.file.sync_all()?;
        debug!("Storage: committed {} bytes to {}", self.image.len(), self.path.display());
        Ok(())
    }
}
