//! The pager (SPEC_FULL §4.9), grounded on `original_source/src/pager.h` /
//! `pager.c`. Owns the database `FileHandle`, the optional journal
//! handle, the persisted `DBState`/`Pragma`, the [`PageCache`], and the
//! [`PageTypeCache`].
//!
//! `pager.c` in the source is an unfinished sketch (several functions end
//! mid-statement and its `Pragma` initializer only supplies 9 of the
//! struct's 12 fields); the lifecycle and defaults implemented here follow
//! the authoritative contract instead (SPEC_FULL §4.9).

use log::{debug, trace};

use crate::error::{ErrorCode, FdbError, Result};
use crate::os::unix::FileHandle;
use crate::storage::directory::PageTypeCache;
use crate::storage::page::{Page, PageType};
use crate::storage::pcache::PageCache;

pub const MIN_PAGE_SIZE: u32 = 512;
pub const MAX_PAGE_SIZE: u32 = 65536;
pub const DEFAULT_PAGE_SIZE: u32 = 1024;
pub const DEFAULT_CACHE_SIZE: u32 = 200;

const HEADER_SIZE: usize = 100;
const MAGIC: &[u8; 16] = b"FabricDB vers 01";

const APPLICATION_ID_OFFSET: usize = 16;
const APPLICATION_VERSION_OFFSET: usize = 20;
const PAGE_SIZE_OFFSET: usize = 24;
const FILE_FORMAT_WRITE_VERSION_OFFSET: usize = 28;
const FILE_FORMAT_READ_VERSION_OFFSET: usize = 29;
const BYTES_RESERVED_OFFSET: usize = 30;
const CHANGE_COUNTER_OFFSET: usize = 32;
const PAGE_COUNT_OFFSET: usize = 36;
const FREE_PAGE_COUNT_OFFSET: usize = 40;
const SCHEMA_COOKIE_OFFSET: usize = 44;
const DEF_CACHE_SIZE_OFFSET: usize = 48;
const DEF_AUTO_VACUUM_OFFSET: usize = 52;
const DEF_AUTO_VACUUM_THRESHOLD_OFFSET: usize = 53;

fn valid_page_size(size: u32) -> bool {
    (MIN_PAGE_SIZE..=MAX_PAGE_SIZE).contains(&size)
}

/// Fields tracked about the database that change on every committed
/// write (SPEC_FULL §4.9).
#[derive(Debug, Clone, Copy, Default)]
pub struct DBState {
    pub change_counter: u32,
    pub page_count: u32,
    pub free_page_count: u32,
    pub schema_cookie: u32,
}

/// The 12 pragma fields (SPEC_FULL §4.9): the first 9 are persistent and
/// frozen once the pager is initialized; the last 3 may be changed at any
/// time.
#[derive(Debug, Clone, Copy)]
pub struct Pragma {
    pub application_id: u32,
    pub application_version: u32,
    pub page_size: u32,
    pub file_format_write_version: u8,
    pub file_format_read_version: u8,
    pub bytes_reserved: u8,
    pub def_cache_size: u32,
    pub def_auto_vacuum: u8,
    pub def_auto_vacuum_threshold: u8,

    pub auto_vacuum: u8,
    pub auto_vacuum_threshold: u8,
    pub cache_size: u32,
}

impl Default for Pragma {
    fn default() -> Self {
        Pragma {
            application_id: 0,
            application_version: 0,
            page_size: DEFAULT_PAGE_SIZE,
            file_format_write_version: 1,
            file_format_read_version: 1,
            bytes_reserved: 0,
            def_cache_size: DEFAULT_CACHE_SIZE,
            def_auto_vacuum: 0,
            def_auto_vacuum_threshold: 0,
            auto_vacuum: 0,
            auto_vacuum_threshold: 0,
            cache_size: DEFAULT_CACHE_SIZE,
        }
    }
}

fn write_header_fields(dest: &mut [u8], state: &DBState, pragma: &Pragma) {
    dest[0..16].copy_from_slice(MAGIC);
    dest[APPLICATION_ID_OFFSET..APPLICATION_ID_OFFSET + 4]
        .copy_from_slice(&pragma.application_id.to_le_bytes());
    dest[APPLICATION_VERSION_OFFSET..APPLICATION_VERSION_OFFSET + 4]
        .copy_from_slice(&pragma.application_version.to_le_bytes());
    dest[PAGE_SIZE_OFFSET..PAGE_SIZE_OFFSET + 4].copy_from_slice(&pragma.page_size.to_le_bytes());
    dest[FILE_FORMAT_WRITE_VERSION_OFFSET] = pragma.file_format_write_version;
    dest[FILE_FORMAT_READ_VERSION_OFFSET] = pragma.file_format_read_version;
    dest[BYTES_RESERVED_OFFSET] = pragma.bytes_reserved;
    dest[CHANGE_COUNTER_OFFSET..CHANGE_COUNTER_OFFSET + 4]
        .copy_from_slice(&state.change_counter.to_le_bytes());
    dest[PAGE_COUNT_OFFSET..PAGE_COUNT_OFFSET + 4].copy_from_slice(&state.page_count.to_le_bytes());
    dest[FREE_PAGE_COUNT_OFFSET..FREE_PAGE_COUNT_OFFSET + 4]
        .copy_from_slice(&state.free_page_count.to_le_bytes());
    dest[SCHEMA_COOKIE_OFFSET..SCHEMA_COOKIE_OFFSET + 4]
        .copy_from_slice(&state.schema_cookie.to_le_bytes());
    dest[DEF_CACHE_SIZE_OFFSET..DEF_CACHE_SIZE_OFFSET + 4]
        .copy_from_slice(&pragma.def_cache_size.to_le_bytes());
    dest[DEF_AUTO_VACUUM_OFFSET] = pragma.def_auto_vacuum;
    dest[DEF_AUTO_VACUUM_THRESHOLD_OFFSET] = pragma.def_auto_vacuum_threshold;
}

fn read_header_fields(src: &[u8]) -> (DBState, Pragma) {
    let u32_at = |off: usize| u32::from_le_bytes(src[off..off + 4].try_into().unwrap());
    let state = DBState {
        change_counter: u32_at(CHANGE_COUNTER_OFFSET),
        page_count: u32_at(PAGE_COUNT_OFFSET),
        free_page_count: u32_at(FREE_PAGE_COUNT_OFFSET),
        schema_cookie: u32_at(SCHEMA_COOKIE_OFFSET),
    };
    let def_cache_size = u32_at(DEF_CACHE_SIZE_OFFSET);
    let pragma = Pragma {
        application_id: u32_at(APPLICATION_ID_OFFSET),
        application_version: u32_at(APPLICATION_VERSION_OFFSET),
        page_size: u32_at(PAGE_SIZE_OFFSET),
        file_format_write_version: src[FILE_FORMAT_WRITE_VERSION_OFFSET],
        file_format_read_version: src[FILE_FORMAT_READ_VERSION_OFFSET],
        bytes_reserved: src[BYTES_RESERVED_OFFSET],
        def_cache_size,
        def_auto_vacuum: src[DEF_AUTO_VACUUM_OFFSET],
        def_auto_vacuum_threshold: src[DEF_AUTO_VACUUM_THRESHOLD_OFFSET],
        auto_vacuum: src[DEF_AUTO_VACUUM_OFFSET],
        auto_vacuum_threshold: src[DEF_AUTO_VACUUM_THRESHOLD_OFFSET],
        cache_size: def_cache_size,
    };
    (state, pragma)
}

/// Owns every file, cache, and directory backing one open database
/// (SPEC_FULL §3 Ownership & lifecycle, §4.9).
pub struct Pager {
    file_path: String,
    dbfh: Option<FileHandle>,
    jfh: Option<FileHandle>,
    dbstate: DBState,
    pragma: Pragma,
    cache: PageCache,
    directory: PageTypeCache,
}

macro_rules! persistent_setter {
    ($name:ident, $field:ident, $ty:ty) => {
        pub fn $name(&mut self, value: $ty) -> Result<()> {
            self.reject_if_initialized()?;
            self.pragma.$field = value;
            Ok(())
        }
    };
}

impl Pager {
    /// Construct a pager with default pragmas; no file is opened yet
    /// (SPEC_FULL §4.9 step 1).
    pub fn create(path: &str) -> Result<Pager> {
        Ok(Pager {
            file_path: path.to_string(),
            dbfh: None,
            jfh: None,
            dbstate: DBState::default(),
            pragma: Pragma::default(),
            cache: PageCache::new(DEFAULT_CACHE_SIZE as usize),
            directory: PageTypeCache::new(),
        })
    }

    pub fn path(&self) -> &str {
        &self.file_path
    }

    fn is_initialized(&self) -> bool {
        self.dbfh.is_some()
    }

    fn reject_if_initialized(&self) -> Result<()> {
        if self.is_initialized() {
            Err(FdbError::with_message(
                ErrorCode::MisusePragma,
                "persistent pragma set after the pager was initialized",
            ))
        } else {
            Ok(())
        }
    }

    // -- persistent pragmas: may only be set before init() / init_file() --

    pub fn set_page_size(&mut self, size: u32) -> Result<()> {
        self.reject_if_initialized()?;
        if !valid_page_size(size) {
            return Err(FdbError::with_message(
                ErrorCode::MisusePragma,
                "page size out of range [512, 65536]",
            ));
        }
        self.pragma.page_size = size;
        Ok(())
    }

    pub fn get_page_size(&self) -> u32 {
        self.pragma.page_size
    }

    persistent_setter!(set_application_id, application_id, u32);
    persistent_setter!(set_application_version, application_version, u32);
    persistent_setter!(set_bytes_reserved_space, bytes_reserved, u8);
    persistent_setter!(set_def_cache_size, def_cache_size, u32);
    persistent_setter!(set_def_auto_vacuum, def_auto_vacuum, u8);
    persistent_setter!(
        set_def_auto_vacuum_threshold,
        def_auto_vacuum_threshold,
        u8
    );

    pub fn get_application_id(&self) -> u32 {
        self.pragma.application_id
    }
    pub fn get_application_version(&self) -> u32 {
        self.pragma.application_version
    }
    pub fn get_bytes_reserved_space(&self) -> u8 {
        self.pragma.bytes_reserved
    }
    pub fn get_def_cache_size(&self) -> u32 {
        self.pragma.def_cache_size
    }
    pub fn get_def_auto_vacuum(&self) -> u8 {
        self.pragma.def_auto_vacuum
    }
    pub fn get_def_auto_vacuum_threshold(&self) -> u8 {
        self.pragma.def_auto_vacuum_threshold
    }

    pub fn set_file_format_write_version(&mut self, version: u8) -> Result<()> {
        self.reject_if_initialized()?;
        if version != 1 {
            return Err(FdbError::with_message(
                ErrorCode::MisusePragma,
                "write format version must be 1",
            ));
        }
        self.pragma.file_format_write_version = version;
        Ok(())
    }
    pub fn get_file_format_write_version(&self) -> u8 {
        self.pragma.file_format_write_version
    }

    pub fn set_file_format_read_version(&mut self, version: u8) -> Result<()> {
        self.reject_if_initialized()?;
        if version != 1 {
            return Err(FdbError::with_message(
                ErrorCode::MisusePragma,
                "read format version must be 1",
            ));
        }
        self.pragma.file_format_read_version = version;
        Ok(())
    }
    pub fn get_file_format_read_version(&self) -> u8 {
        self.pragma.file_format_read_version
    }

    // -- non-persistent pragmas: mutable at any time --

    pub fn set_auto_vacuum(&mut self, enabled: u8) {
        self.pragma.auto_vacuum = enabled;
    }
    pub fn get_auto_vacuum(&self) -> u8 {
        self.pragma.auto_vacuum
    }

    pub fn set_auto_vacuum_threshold(&mut self, threshold: u8) {
        self.pragma.auto_vacuum_threshold = threshold;
    }
    pub fn get_auto_vacuum_threshold(&self) -> u8 {
        self.pragma.auto_vacuum_threshold
    }

    pub fn set_cache_size(&mut self, num_pages: u32) {
        self.pragma.cache_size = num_pages;
        self.cache.set_cache_size(num_pages as usize);
    }
    pub fn get_cache_size(&self) -> u32 {
        self.pragma.cache_size
    }

    fn page_span(&self) -> u64 {
        self.pragma.page_size as u64 + self.pragma.bytes_reserved as u64
    }

    /// Create a new database file matching the currently-set pragmas and
    /// fully initialize the pager from it (SPEC_FULL §4.9 step 3).
    pub fn init_file(&mut self) -> Result<()> {
        let fh = FileHandle::create(&self.file_path)?;
        let mut buf = vec![0u8; self.pragma.page_size as usize];
        self.dbstate = DBState {
            change_counter: 0,
            page_count: 1,
            free_page_count: 0,
            schema_cookie: 0,
        };
        write_header_fields(&mut buf, &self.dbstate, &self.pragma);
        buf[HEADER_SIZE] = PageType::Header.as_byte();
        // buf[HEADER_SIZE + 1] is left 0 (== PageType::Unused), terminating
        // the directory after one entry.

        fh.write(0, &buf)?;
        fh.sync()?;
        trace!("{}: wrote {} byte header page", self.file_path, buf.len());

        self.dbfh = Some(fh);
        self.load_from_open_file()
    }

    /// Open an existing database file and fully initialize the pager from
    /// it (SPEC_FULL §4.9 step 4).
    pub fn init(&mut self) -> Result<()> {
        let fh = FileHandle::open_rdwr(&self.file_path)?;
        self.dbfh = Some(fh);
        self.load_from_open_file()
    }

    /// The reader path shared by `init_file` (which just wrote the header)
    /// and `init` (which just opened an existing file): validate, acquire
    /// a SHARED lock, read the header and directory, populate the caches,
    /// then release the lock.
    fn load_from_open_file(&mut self) -> Result<()> {
        let result = self.load_from_open_file_inner();
        if result.is_err() {
            if let Some(mut fh) = self.dbfh.take() {
                let _ = fh.unlock();
                let _ = fh.close();
            }
        }
        result
    }

    fn load_from_open_file_inner(&mut self) -> Result<()> {
        let file_size = self.dbfh.as_ref().unwrap().file_size()?;
        if file_size < MIN_PAGE_SIZE as u64 {
            return Err(FdbError::with_message(
                ErrorCode::InvalidFile,
                "file is smaller than the minimum page size",
            ));
        }

        let mut magic = [0u8; 16];
        self.dbfh.as_ref().unwrap().read(0, &mut magic)?;
        if &magic != MAGIC {
            return Err(FdbError::with_message(
                ErrorCode::InvalidFile,
                "magic header does not match",
            ));
        }

        self.dbfh.as_mut().unwrap().acquire_shared_lock()?;
        let result = self.read_header_and_directory();
        let _ = self.dbfh.as_mut().unwrap().unlock();
        result
    }

    fn read_header_and_directory(&mut self) -> Result<()> {
        let mut size_buf = [0u8; 4];
        self.dbfh
            .as_ref()
            .unwrap()
            .read(PAGE_SIZE_OFFSET as u64, &mut size_buf)?;
        let page_size = u32::from_le_bytes(size_buf);
        if !valid_page_size(page_size) {
            return Err(FdbError::with_message(
                ErrorCode::InvalidFile,
                "page size recorded in the header is out of range",
            ));
        }

        let mut header_page = vec![0u8; page_size as usize];
        self.dbfh.as_ref().unwrap().read(0, &mut header_page)?;

        let (state, pragma) = read_header_fields(&header_page);
        if pragma.file_format_write_version != 1 || pragma.file_format_read_version != 1 {
            return Err(FdbError::with_message(
                ErrorCode::InvalidFile,
                "unsupported file format version",
            ));
        }
        self.dbstate = state;
        self.pragma = pragma;

        self.cache = PageCache::new(self.pragma.cache_size as usize);
        self.directory = PageTypeCache::new();

        let span = self.page_span();
        let page_size_local = self.pragma.page_size;
        let fh = self.dbfh.as_ref().unwrap();
        self.directory.load(&header_page, |continuation_no| {
            let mut buf = vec![0u8; page_size_local as usize];
            let offset = continuation_no as u64 * span;
            let _ = fh.read(offset, &mut buf);
            buf
        });

        let header = Page::from_bytes(
            1,
            self.pragma.page_size,
            self.pragma.bytes_reserved,
            PageType::Header,
            header_page,
        );
        self.cache.put(header)?;

        debug!(
            "{}: initialized, pageSize={} pageCount={}",
            self.file_path, self.pragma.page_size, self.dbstate.page_count
        );
        Ok(())
    }

    /// Fetch the page for `page_no`, reading it from disk on a cache
    /// miss and stamping it with the directory's recorded type
    /// (SPEC_FULL §4.9 step 5).
    pub fn fetch_page(&mut self, page_no: u32) -> Result<&Page> {
        if self.cache.get(page_no).is_none() {
            let page = self.read_page_from_disk(page_no)?;
            self.cache.put(page)?;
        }
        Ok(self.cache.get_mut(page_no).expect("just inserted above"))
    }

    fn read_page_from_disk(&self, page_no: u32) -> Result<Page> {
        let fh = self
            .dbfh
            .as_ref()
            .ok_or_else(|| FdbError::new(ErrorCode::MisuseNullPtr))?;
        let page_size = self.pragma.page_size;
        let offset = (page_no as u64 - 1) * self.page_span();
        let mut data = vec![0u8; page_size as usize];
        fh.read(offset, &mut data)?;
        let page_type = self.directory.type_of(page_no);
        Ok(Page::from_bytes(
            page_no,
            page_size,
            self.pragma.bytes_reserved,
            page_type,
            data,
        ))
    }

    /// Mark an already-resident page dirty; the caller must hold at
    /// least RESERVED before calling this (SPEC_FULL §5).
    pub fn mark_page_dirty(&mut self, page_no: u32) -> Result<()> {
        match self.cache.get_mut(page_no) {
            Some(page) => {
                page.mark_dirty();
                self.directory.mark_dirty();
                Ok(())
            }
            None => Err(FdbError::new(ErrorCode::MisuseNullPtr)),
        }
    }

    /// Begin a write transaction by acquiring RESERVED.
    pub fn begin_write(&mut self) -> Result<()> {
        self.dbfh
            .as_mut()
            .ok_or_else(|| FdbError::new(ErrorCode::MisuseNullPtr))?
            .acquire_reserved_lock()
    }

    /// Commit: acquire EXCLUSIVE, flush dirty pages and the header,
    /// bump the change counter, sync, and downgrade back to SHARED
    /// (SPEC_FULL §4.9 write path; design-level — continuation-page
    /// directory writes are not exercised here since the directory fits
    /// on the header page for every size this pager creates in practice).
    pub fn commit(&mut self) -> Result<()> {
        self.dbfh
            .as_mut()
            .ok_or_else(|| FdbError::new(ErrorCode::MisuseNullPtr))?
            .acquire_exclusive_lock()?;

        self.dbstate.change_counter += 1;
        self.refresh_header_page()?;

        let span = self.page_span();
        let dirty: Vec<(u32, Vec<u8>)> = self
            .cache
            .dirty_pages()
            .map(|p| (p.page_no, p.data.clone()))
            .collect();

        let fh = self.dbfh.as_ref().unwrap();
        for (page_no, data) in &dirty {
            let offset = (*page_no as u64 - 1) * span;
            fh.write(offset, data)?;
        }
        fh.sync()?;

        for (page_no, _) in &dirty {
            if let Some(page) = self.cache.get_mut(*page_no) {
                page.dirty = false;
            }
        }
        self.directory.clear_dirty();

        self.dbfh.as_mut().unwrap().downgrade_lock()?;
        Ok(())
    }

    /// Re-serialize the header fields and (single-page) directory into
    /// the cached page 1, marking it dirty so the next `commit` flushes
    /// it.
    fn refresh_header_page(&mut self) -> Result<()> {
        if self.cache.get(1).is_none() {
            let page = self.read_page_from_disk(1)?;
            self.cache.put(page)?;
        }
        let page_size = self.pragma.page_size as usize;
        let dirs = self.directory.serialize(page_size - HEADER_SIZE, page_size);
        let state = self.dbstate;
        let pragma = self.pragma;
        let page = self.cache.get_mut(1).unwrap();
        write_header_fields(&mut page.data, &state, &pragma);
        if let Some(first) = dirs.first() {
            page.data[HEADER_SIZE..HEADER_SIZE + first.len()].copy_from_slice(first);
        }
        page.mark_dirty();
        Ok(())
    }

    /// Abandon a write transaction: discard every dirty page so the next
    /// `fetch_page` re-reads it from disk, and release the lock back to
    /// whatever level it was before `begin_write`.
    pub fn rollback_to_clean(&mut self) -> Result<()> {
        let dirty_nos: Vec<u32> = self.cache.dirty_pages().map(|p| p.page_no).collect();
        for page_no in dirty_nos {
            self.cache.remove(page_no);
        }
        self.directory.clear_dirty();
        if let Some(fh) = self.dbfh.as_mut() {
            fh.unlock()?;
        }
        Ok(())
    }

    /// Close the database (and journal, if any) file, drop the caches,
    /// and release every resource the pager owns.
    pub fn destroy(mut self) -> Result<()> {
        self.cache.clear();
        if let Some(fh) = self.dbfh.take() {
            fh.close()?;
        }
        if let Some(fh) = self.jfh.take() {
            fh.close()?;
        }
        debug!("{}: destroyed", self.file_path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> String {
        format!(
            "{}/fdb_pager_test_{}_{}",
            std::env::temp_dir().display(),
            std::process::id(),
            name
        )
    }

    #[test]
    fn init_file_writes_exactly_one_page() {
        let path = temp_path("initfile");
        let _ = std::fs::remove_file(&path);

        let mut pager = Pager::create(&path).unwrap();
        pager.init_file().unwrap();

        let size = std::fs::metadata(&path).unwrap().len();
        assert_eq!(size, DEFAULT_PAGE_SIZE as u64);
        assert_eq!(pager.get_page_size(), DEFAULT_PAGE_SIZE);

        pager.destroy().unwrap();
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn create_then_reopen_round_trips_pragmas() {
        let path = temp_path("roundtrip");
        let _ = std::fs::remove_file(&path);

        let mut pager = Pager::create(&path).unwrap();
        pager.set_application_id(77).unwrap();
        pager.set_bytes_reserved_space(0).unwrap();
        pager.init_file().unwrap();
        pager.destroy().unwrap();

        let mut reopened = Pager::create(&path).unwrap();
        reopened.init().unwrap();
        assert_eq!(reopened.get_application_id(), 77);
        assert_eq!(reopened.get_page_size(), DEFAULT_PAGE_SIZE);
        assert_eq!(reopened.get_file_format_write_version(), 1);
        reopened.destroy().unwrap();
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn set_page_size_rejected_after_init() {
        let path = temp_path("misuse");
        let _ = std::fs::remove_file(&path);

        let mut pager = Pager::create(&path).unwrap();
        pager.init_file().unwrap();
        let err = pager.set_page_size(2000).unwrap_err();
        assert_eq!(err.code(), ErrorCode::MisusePragma);

        pager.destroy().unwrap();
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn fetch_page_returns_header_page() {
        let path = temp_path("fetch");
        let _ = std::fs::remove_file(&path);

        let mut pager = Pager::create(&path).unwrap();
        pager.init_file().unwrap();
        let page = pager.fetch_page(1).unwrap();
        assert_eq!(page.page_no, 1);
        assert!(!page.dirty);
        assert_eq!(&page.data[0..16], MAGIC);

        pager.destroy().unwrap();
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn commit_persists_dirty_pages() {
        let path = temp_path("commit");
        let _ = std::fs::remove_file(&path);

        let mut pager = Pager::create(&path).unwrap();
        pager.init_file().unwrap();
        pager.begin_write().unwrap();
        {
            let page = pager.fetch_page(1).unwrap();
            assert_eq!(page.page_no, 1);
        }
        pager.mark_page_dirty(1).unwrap();
        pager.commit().unwrap();

        pager.destroy().unwrap();
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn rollback_discards_dirty_pages() {
        let path = temp_path("rollback");
        let _ = std::fs::remove_file(&path);

        let mut pager = Pager::create(&path).unwrap();
        pager.init_file().unwrap();
        pager.begin_write().unwrap();
        pager.fetch_page(1).unwrap();
        pager.mark_page_dirty(1).unwrap();
        pager.rollback_to_clean().unwrap();

        let page = pager.fetch_page(1).unwrap();
        assert!(!page.dirty);

        pager.destroy().unwrap();
        std::fs::remove_file(&path).unwrap();
    }
}
