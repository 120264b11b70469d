//! Unix file handles and POSIX advisory locking (SPEC_FULL §4.4–§4.5),
//! grounded on `original_source/src/os_unix.c`.
//!
//! Three marker bytes at fixed offsets encode a file's lock level across
//! processes: `PENDING_BYTE`, `RESERVED_BYTE`, `SHARED_BYTE`. A
//! [`FileHandle`]'s own `lock_level` tracks what *this* descriptor holds;
//! the descriptor's shared [`InodeInfo`] tracks what the *process* holds,
//! since multiple handles on the same inode must not fight each other with
//! `fcntl` calls that would otherwise silently downgrade one another.

use std::ffi::CString;
use std::os::unix::io::RawFd;

use log::{debug, trace, warn};

use crate::error::{code_from_errno, ErrorCode, FdbError, Result};
use crate::os::inode::{self, FileId, InodeInfo};

const PENDING_BYTE: i64 = 0x4000_0000;
const RESERVED_BYTE: i64 = PENDING_BYTE + 1;
const SHARED_BYTE: i64 = PENDING_BYTE + 2;

const MIN_FILE_DESCRIPTOR: RawFd = 3;
const DEFAULT_FILE_PERMS: libc::mode_t = 0o644;

/// A file's advisory lock level, ordered `No < Shared < Reserved < Pending
/// < Exclusive` as in SQLite's and FabricDB's shared locking protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(i32)]
pub enum LockLevel {
    No = 0,
    Shared = 1,
    Reserved = 2,
    Pending = 3,
    Exclusive = 4,
}

fn last_errno() -> i32 {
    std::io::Error::last_os_error().raw_os_error().unwrap_or(0)
}

fn is_lock_contention(errno: i32) -> bool {
    errno == libc::EACCES || errno == libc::EAGAIN
}

fn set_lock(fd: RawFd, start: i64, lock_type: i16) -> i32 {
    let mut lock: libc::flock = unsafe { std::mem::zeroed() };
    lock.l_whence = libc::SEEK_SET as i16;
    lock.l_start = start as libc::off_t;
    lock.l_len = 1;
    lock.l_type = lock_type;
    unsafe { libc::fcntl(fd, libc::F_SETLK, &lock) }
}

fn unlock_shared_byte(fd: RawFd) -> i32 {
    set_lock(fd, SHARED_BYTE, libc::F_UNLCK as i16)
}
fn readlock_shared_byte(fd: RawFd) -> i32 {
    set_lock(fd, SHARED_BYTE, libc::F_RDLCK as i16)
}
fn writelock_shared_byte(fd: RawFd) -> i32 {
    set_lock(fd, SHARED_BYTE, libc::F_WRLCK as i16)
}
fn unlock_pending_byte(fd: RawFd) -> i32 {
    set_lock(fd, PENDING_BYTE, libc::F_UNLCK as i16)
}
fn readlock_pending_byte(fd: RawFd) -> i32 {
    set_lock(fd, PENDING_BYTE, libc::F_RDLCK as i16)
}
fn writelock_pending_byte(fd: RawFd) -> i32 {
    set_lock(fd, PENDING_BYTE, libc::F_WRLCK as i16)
}
fn unlock_reserved_byte(fd: RawFd) -> i32 {
    set_lock(fd, RESERVED_BYTE, libc::F_UNLCK as i16)
}
fn writelock_reserved_byte(fd: RawFd) -> i32 {
    set_lock(fd, RESERVED_BYTE, libc::F_WRLCK as i16)
}

fn file_id_of(fd: RawFd) -> Result<FileId> {
    let mut st: libc::stat = unsafe { std::mem::zeroed() };
    if unsafe { libc::fstat(fd, &mut st) } == -1 {
        return Err(FdbError::new(code_from_errno(last_errno())));
    }
    Ok(FileId {
        device: st.st_dev as u64,
        inode: st.st_ino as u64,
    })
}

fn open_raw(path: &str, flags: i32) -> Result<RawFd> {
    let c_path = CString::new(path).map_err(|_| {
        FdbError::with_message(ErrorCode::InvalidArgument, "path contains a NUL byte")
    })?;
    loop {
        let fd = unsafe { libc::open(c_path.as_ptr(), flags, DEFAULT_FILE_PERMS as libc::c_int) };
        if fd < 0 {
            let errno = last_errno();
            if errno == libc::EINTR {
                continue;
            }
            return Err(FdbError::new(code_from_errno(errno)));
        }
        return Ok(fd);
    }
}

/// A handle to an open database file.
#[derive(Debug)]
pub struct FileHandle {
    fd: RawFd,
    file_path: String,
    lock_level: LockLevel,
    file_id: FileId,
}

impl FileHandle {
    fn open(path: &str, flags: i32) -> Result<Self> {
        let fd = open_raw(path, flags)?;
        if fd < MIN_FILE_DESCRIPTOR {
            unsafe { libc::close(fd) };
            return Err(FdbError::with_message(
                ErrorCode::InvalidFile,
                "open() returned a reserved low-numbered descriptor",
            ));
        }
        let file_id = match file_id_of(fd) {
            Ok(id) => id,
            Err(e) => {
                unsafe { libc::close(fd) };
                return Err(e);
            }
        };
        inode::add_reference(file_id);
        trace!("opened {path} as fd {fd}");
        Ok(FileHandle {
            fd,
            file_path: path.to_string(),
            lock_level: LockLevel::No,
            file_id,
        })
    }

    /// Open an existing file for reading and writing.
    pub fn open_rdwr(path: &str) -> Result<Self> {
        Self::open(path, libc::O_RDWR)
    }

    /// Open an existing file for reading only.
    pub fn open_rdonly(path: &str) -> Result<Self> {
        Self::open(path, libc::O_RDONLY)
    }

    /// Create a new file, failing with [`ErrorCode::AlreadyExists`] if one
    /// already exists at `path`.
    pub fn create(path: &str) -> Result<Self> {
        Self::open(path, libc::O_RDWR | libc::O_CREAT | libc::O_EXCL)
    }

    /// The path this handle was opened with.
    pub fn path(&self) -> &str {
        &self.file_path
    }

    /// The lock level this handle currently holds.
    pub fn lock_level(&self) -> LockLevel {
        self.lock_level
    }

    /// Truncate the file to exactly `size` bytes.
    pub fn truncate(&self, size: u64) -> Result<()> {
        if unsafe { libc::ftruncate(self.fd, size as libc::off_t) } != 0 {
            return Err(FdbError::new(code_from_errno(last_errno())));
        }
        Ok(())
    }

    /// The file's current size in bytes.
    pub fn file_size(&self) -> Result<u64> {
        let mut st: libc::stat = unsafe { std::mem::zeroed() };
        if unsafe { libc::fstat(self.fd, &mut st) } == -1 {
            return Err(FdbError::new(code_from_errno(last_errno())));
        }
        Ok(st.st_size as u64)
    }

    /// Read exactly `dest.len()` bytes starting at `offset`.
    pub fn read(&self, offset: u64, dest: &mut [u8]) -> Result<()> {
        loop {
            let n = unsafe {
                libc::pread(
                    self.fd,
                    dest.as_mut_ptr() as *mut libc::c_void,
                    dest.len(),
                    offset as libc::off_t,
                )
            };
            if n < 0 {
                let errno = last_errno();
                if errno == libc::EINTR {
                    continue;
                }
                return Err(FdbError::new(code_from_errno(errno)));
            }
            if (n as usize) < dest.len() {
                return Err(FdbError::new(ErrorCode::ShortRead));
            }
            return Ok(());
        }
    }

    /// Write all of `content` starting at `offset`.
    pub fn write(&self, offset: u64, content: &[u8]) -> Result<()> {
        loop {
            let n = unsafe {
                libc::pwrite(
                    self.fd,
                    content.as_ptr() as *const libc::c_void,
                    content.len(),
                    offset as libc::off_t,
                )
            };
            if n < 0 {
                let errno = last_errno();
                if errno == libc::EINTR {
                    continue;
                }
                return Err(FdbError::new(code_from_errno(errno)));
            }
            if (n as usize) < content.len() {
                return Err(FdbError::new(ErrorCode::ShortWrite));
            }
            return Ok(());
        }
    }

    /// Flush the file to stable storage.
    pub fn sync(&self) -> Result<()> {
        loop {
            if unsafe { libc::fsync(self.fd) } == -1 {
                let errno = last_errno();
                if errno == libc::EINTR {
                    continue;
                }
                return Err(FdbError::new(code_from_errno(errno)));
            }
            return Ok(());
        }
    }

    /// Acquire (or confirm already holding) a `SHARED` lock.
    pub fn acquire_shared_lock(&mut self) -> Result<()> {
        if self.lock_level >= LockLevel::Shared {
            return Ok(());
        }

        inode::with_info(self.file_id, |info: &mut InodeInfo| -> Result<()> {
            if info.lock_level >= LockLevel::Pending {
                return Err(FdbError::new(ErrorCode::Busy));
            }

            if info.lock_level == LockLevel::Shared || info.lock_level == LockLevel::Reserved {
                self.lock_level = LockLevel::Shared;
                info.shared_lock_count += 1;
                info.lock_count += 1;
                return Ok(());
            }

            debug_assert_eq!(info.shared_lock_count, 0);
            debug_assert_eq!(info.lock_level, LockLevel::No);

            if readlock_pending_byte(self.fd) == -1 {
                let errno = last_errno();
                return Err(if is_lock_contention(errno) {
                    FdbError::new(ErrorCode::Busy)
                } else {
                    FdbError::new(code_from_errno(errno))
                });
            }

            let mut rc: Result<()> = Ok(());
            if readlock_shared_byte(self.fd) == -1 {
                rc = Err(FdbError::new(code_from_errno(last_errno())));
            }
            if unlock_pending_byte(self.fd) == -1 && rc.is_ok() {
                rc = Err(FdbError::new(code_from_errno(last_errno())));
            }

            if rc.is_ok() {
                info.lock_level = LockLevel::Shared;
                info.lock_count += 1;
                info.shared_lock_count = 1;
                self.lock_level = LockLevel::Shared;
            }
            rc
        })
    }

    /// Acquire (or confirm already holding) a `RESERVED` lock. Requires at
    /// least a `SHARED` lock.
    pub fn acquire_reserved_lock(&mut self) -> Result<()> {
        debug_assert!(self.lock_level >= LockLevel::Shared);
        if self.lock_level >= LockLevel::Reserved {
            return Ok(());
        }

        inode::with_info(self.file_id, |info: &mut InodeInfo| -> Result<()> {
            if info.lock_level >= LockLevel::Reserved {
                return Err(FdbError::new(ErrorCode::Busy));
            }

            if writelock_reserved_byte(self.fd) == -1 {
                let errno = last_errno();
                return Err(if is_lock_contention(errno) {
                    FdbError::new(ErrorCode::Busy)
                } else {
                    FdbError::new(code_from_errno(errno))
                });
            }

            self.lock_level = LockLevel::Reserved;
            info.lock_level = LockLevel::Reserved;
            Ok(())
        })
    }

    /// Acquire (or confirm already holding) an `EXCLUSIVE` lock. Requires
    /// at least a `SHARED` lock.
    pub fn acquire_exclusive_lock(&mut self) -> Result<()> {
        debug_assert!(self.lock_level >= LockLevel::Shared);
        if self.lock_level == LockLevel::Exclusive {
            return Ok(());
        }

        inode::with_info(self.file_id, |info: &mut InodeInfo| -> Result<()> {
            if info.lock_level != self.lock_level && info.lock_level >= LockLevel::Reserved {
                return Err(FdbError::new(ErrorCode::Busy));
            }

            if self.lock_level < LockLevel::Pending {
                if writelock_pending_byte(self.fd) == -1 {
                    let errno = last_errno();
                    return Err(if is_lock_contention(errno) {
                        FdbError::new(ErrorCode::Busy)
                    } else {
                        FdbError::new(code_from_errno(errno))
                    });
                }
            }

            self.lock_level = LockLevel::Pending;
            info.lock_level = LockLevel::Pending;

            if info.shared_lock_count > 1 {
                return Err(FdbError::new(ErrorCode::Busy));
            }

            if writelock_shared_byte(self.fd) == -1 {
                let errno = last_errno();
                return Err(if is_lock_contention(errno) {
                    FdbError::new(ErrorCode::Busy)
                } else {
                    FdbError::new(code_from_errno(errno))
                });
            }

            self.lock_level = LockLevel::Exclusive;
            info.lock_level = LockLevel::Exclusive;
            Ok(())
        })
    }

    /// Drop an `EXCLUSIVE`/`PENDING`/`RESERVED` lock back down to `SHARED`.
    pub fn downgrade_lock(&mut self) -> Result<()> {
        if self.lock_level <= LockLevel::Shared {
            return Ok(());
        }

        inode::with_info(self.file_id, |info: &mut InodeInfo| -> Result<()> {
            debug_assert_eq!(self.lock_level, info.lock_level);

            if readlock_shared_byte(self.fd) == -1
                || unlock_pending_byte(self.fd) == -1
                || unlock_reserved_byte(self.fd) == -1
            {
                return Err(FdbError::new(code_from_errno(last_errno())));
            }

            self.lock_level = LockLevel::Shared;
            info.lock_level = LockLevel::Shared;
            Ok(())
        })
    }

    /// Release every lock this handle holds.
    pub fn unlock(&mut self) -> Result<()> {
        if self.lock_level < LockLevel::Shared {
            return Ok(());
        }

        if self.lock_level > LockLevel::No {
            self.downgrade_lock()?;
        }

        let fd = self.fd;
        let file_id = self.file_id;
        let result = inode::with_info(file_id, |info: &mut InodeInfo| -> Result<()> {
            debug_assert_ne!(info.shared_lock_count, 0);
            info.shared_lock_count -= 1;

            let mut rc = Ok(());
            if info.shared_lock_count == 0 {
                if unlock_shared_byte(fd) == -1 {
                    rc = Err(FdbError::new(code_from_errno(last_errno())));
                }
                info.lock_level = LockLevel::No;
            }

            info.lock_count -= 1;
            if info.lock_count == 0 {
                for unused in info.unused_fds.drain(..) {
                    unsafe { libc::close(unused) };
                }
            }
            rc
        });

        self.lock_level = LockLevel::No;
        result
    }

    /// Close this handle. If the shared inode still has locks outstanding
    /// from another handle, the descriptor is kept open and deferred to
    /// [`InodeInfo::unused_fds`] rather than closed immediately, since
    /// closing any descriptor on an inode releases *all* of that
    /// process's `fcntl` locks on it.
    pub fn close(mut self) -> Result<()> {
        if self.lock_level != LockLevel::No {
            let _ = self.unlock();
        }

        let fd = self.fd;
        let file_id = self.file_id;
        let defer = inode::with_info(file_id, |info: &mut InodeInfo| -> bool {
            if info.lock_count < 1 {
                false
            } else {
                info.unused_fds.push(fd);
                true
            }
        });

        if !defer {
            unsafe { libc::close(fd) };
        }
        inode::remove_reference(file_id);
        debug!("closed {}", self.file_path);
        self.fd = -1;
        Ok(())
    }
}

impl Drop for FileHandle {
    fn drop(&mut self) {
        if self.fd >= 0 {
            warn!(
                "FileHandle for {} dropped without calling close()",
                self.file_path
            );
            unsafe { libc::close(self.fd) };
            inode::remove_reference(self.file_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    fn temp_path(name: &str) -> String {
        let dir = std::env::temp_dir();
        format!(
            "{}/fdb_unix_test_{}_{}",
            dir.display(),
            std::process::id(),
            name
        )
    }

    #[test]
    fn create_then_open_rdwr_then_cleanup() {
        let path = temp_path("create");
        let _ = std::fs::remove_file(&path);
        let fh = FileHandle::create(&path).expect("create should succeed");
        assert_eq!(fh.lock_level(), LockLevel::No);
        fh.close().unwrap();
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn create_twice_is_already_exists() {
        let path = temp_path("twice");
        let _ = std::fs::remove_file(&path);
        let fh = FileHandle::create(&path).unwrap();
        let err = FileHandle::create(&path).unwrap_err();
        assert_eq!(err.code(), ErrorCode::AlreadyExists);
        fh.close().unwrap();
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn open_missing_file_is_not_found() {
        let path = temp_path("missing");
        let _ = std::fs::remove_file(&path);
        let err = FileHandle::open_rdwr(&path).unwrap_err();
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[test]
    fn write_then_read_back() {
        let path = temp_path("rw");
        let _ = std::fs::remove_file(&path);
        let fh = FileHandle::create(&path).unwrap();
        fh.write(0, b"hello").unwrap();
        let mut buf = [0u8; 5];
        fh.read(0, &mut buf).unwrap();
        assert_eq!(&buf, b"hello");
        fh.close().unwrap();
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn shared_lock_round_trip() {
        let path = temp_path("lock");
        let _ = std::fs::remove_file(&path);
        let mut fh = FileHandle::create(&path).unwrap();
        fh.acquire_shared_lock().unwrap();
        assert_eq!(fh.lock_level(), LockLevel::Shared);
        fh.acquire_reserved_lock().unwrap();
        fh.acquire_exclusive_lock().unwrap();
        assert_eq!(fh.lock_level(), LockLevel::Exclusive);
        fh.unlock().unwrap();
        assert_eq!(fh.lock_level(), LockLevel::No);
        fh.close().unwrap();
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn two_handles_share_inode_ref_counting() {
        let path = temp_path("shared");
        let _ = std::fs::remove_file(&path);
        {
            let mut f = std::fs::File::create(&path).unwrap();
            f.write_all(b"x").unwrap();
        }
        let a = FileHandle::open_rdwr(&path).unwrap();
        let b = FileHandle::open_rdwr(&path).unwrap();
        assert_eq!(a.file_id, b.file_id);
        a.close().unwrap();
        b.close().unwrap();
        std::fs::remove_file(&path).unwrap();
    }
}
