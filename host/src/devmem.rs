//! Mapping of fixed physical regions through `/dev/mem`.

use std::fs::{File, OpenOptions};
use std::num::NonZeroUsize;
use std::os::unix::fs::OpenOptionsExt;
use std::ptr::NonNull;

use nix::sys::mman::{mmap, munmap, MapFlags, ProtFlags};
use thiserror::Error;

pub const DEV_MEM: &str = "/dev/mem";

#[derive(Debug, Error)]
pub enum MapError {
    #[error("cannot open {path}: {source}")]
    Open {
        path: String,
        source: std::io::Error,
    },
    #[error("cannot map {len:#x} bytes at physical {base:#x}: {source}")]
    Map {
        base: u64,
        len: usize,
        source: nix::Error,
    },
    #[error("region length must be nonzero")]
    EmptyRegion,
}

/// One mapped physical region. Accesses are volatile; the mapping is
/// opened with `O_SYNC` so reads and writes bypass the cache.
pub struct PhysMap {
    base: NonNull<libc::c_void>,
    len: usize,
    _file: File,
}

// The mapping is plain device memory; the raw pointer is the only
// reason Send is not derived.
unsafe impl Send for PhysMap {}

impl PhysMap {
    pub fn open(path: &str, phys_base: u64, len: usize) -> Result<PhysMap, MapError> {
        let length = NonZeroUsize::new(len).ok_or(MapError::EmptyRegion)?;
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .custom_flags(libc::O_SYNC)
            .open(path)
            .map_err(|source| MapError::Open {
                path: path.to_string(),
                source,
            })?;

        let base = unsafe {
            mmap(
                None,
                length,
                ProtFlags::PROT_READ | ProtFlags::PROT_WRITE,
                MapFlags::MAP_SHARED,
                &file,
                phys_base as libc::off_t,
            )
        }
        .map_err(|source| MapError::Map {
            base: phys_base,
            len,
            source,
        })?;

        Ok(PhysMap {
            base,
            len,
            _file: file,
        })
    }

    // Offsets come from a validated layout; checked builds still trip
    // on a bad one.
    pub fn read_u32(&self, offset: usize) -> u32 {
        debug_assert!(offset % 4 == 0 && offset + 4 <= self.len);
        unsafe {
            std::ptr::read_volatile(self.base.as_ptr().cast::<u8>().add(offset).cast::<u32>())
        }
    }

    pub fn write_u32(&self, offset: usize, value: u32) {
        debug_assert!(offset % 4 == 0 && offset + 4 <= self.len);
        unsafe {
            std::ptr::write_volatile(
                self.base.as_ptr().cast::<u8>().add(offset).cast::<u32>(),
                value,
            );
        }
    }
}

impl Drop for PhysMap {
    fn drop(&mut self) {
        // Nothing useful to do on failure at teardown.
        let _ = unsafe { munmap(self.base, self.len) };
    }
}
