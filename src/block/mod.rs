//! Fixed-size blocks in a single backing file, paged through an LRU
//! cache keyed by a monotonic "last use" timestamp.

use fs2::FileExt;

use crate::archive::{BidirArchive, FileArchive, Whence};
use crate::{err_at, Result};

/// Every block on disk is exactly this many bytes.
pub const BLOCK_SIZE: usize = 4096;

const INVALID_BLOCK_NUM: i64 = -1;

struct CachedBlock {
    block_num: i64,
    data: Vec<u8>,
    dirty: bool,
    timestamp: u32,
}

impl CachedBlock {
    fn empty() -> Self {
        CachedBlock { block_num: INVALID_BLOCK_NUM, data: vec![0u8; BLOCK_SIZE], dirty: false, timestamp: 0 }
    }
}

/// Pages `BLOCK_SIZE`-byte blocks of a backing archive through a small
/// fixed-size cache. `N` (the cache size) is chosen at open time and
/// never changes; unused slots start out as empty blocks with a
/// sentinel block number so they're never mistaken for a cached hit.
pub struct BlockFile {
    archive: FileArchive,
    cache: Vec<CachedBlock>,
    timer: u32,
    num_blocks: u64,
}

impl BlockFile {
    /// Create a fresh, empty backing file and open it with `num_pages`
    /// cache slots.
    pub fn create<P: AsRef<std::path::Path>>(path: P, num_pages: usize) -> Result<Self> {
        let archive = FileArchive::create(path)?;
        Self::from_archive(archive, num_pages)
    }

    /// Open an existing backing file with `num_pages` cache slots.
    pub fn open<P: AsRef<std::path::Path>>(path: P, num_pages: usize) -> Result<Self> {
        let archive = FileArchive::open(path)?;
        Self::from_archive(archive, num_pages)
    }

    fn from_archive(mut archive: FileArchive, num_pages: usize) -> Result<Self> {
        if num_pages == 0 {
            return err_at!(InvalidInput, msg: "block file needs at least one cache page");
        }
        let len = archive.length()?;
        if len % (BLOCK_SIZE as u64) != 0 {
            return err_at!(ArchiveFormat, msg: "backing archive length {} not block-aligned", len);
        }
        let mut num_blocks = len / (BLOCK_SIZE as u64);

        let mut bf = BlockFile {
            archive,
            cache: (0..num_pages).map(|_| CachedBlock::empty()).collect(),
            timer: 0,
            num_blocks,
        };

        if num_blocks == 0 {
            bf.create_block()?;
            num_blocks = 1;
            debug_assert_eq!(bf.num_blocks, num_blocks);
        }

        Ok(bf)
    }

    pub fn num_blocks(&self) -> u64 {
        self.num_blocks
    }

    /// Page block `i` into the cache (if not already resident), mark it
    /// most-recently-used, and return its live bytes.
    pub fn get_block(&mut self, i: u64) -> Result<&mut [u8]> {
        if i >= self.num_blocks {
            return err_at!(BadAddress, msg: "block {} out of range ({} total)", i, self.num_blocks);
        }

        self.bump_timer();

        if let Some(slot) = self.cache.iter().position(|b| b.block_num == i as i64) {
            self.cache[slot].timestamp = self.timer;
            return Ok(&mut self.cache[slot].data);
        }

        let victim = self.find_victim();
        if self.cache[victim].dirty {
            log::debug!("evicting dirty block {} to page in block {}", self.cache[victim].block_num, i);
            self.flush_slot(victim)?;
        }

        self.archive.seek(i as i64 * BLOCK_SIZE as i64, Whence::Beginning)?;
        self.archive.read_exact_blob(&mut self.cache[victim].data)?;
        self.cache[victim].block_num = i as i64;
        self.cache[victim].dirty = false;
        self.cache[victim].timestamp = self.timer;

        Ok(&mut self.cache[victim].data)
    }

    pub fn mark_dirty(&mut self, i: u64) -> Result<()> {
        let slot = self.resident_slot(i)?;
        self.cache[slot].dirty = true;
        Ok(())
    }

    /// Grow the backing archive by exactly `BLOCK_SIZE` zero bytes and
    /// page the new block in.
    pub fn create_block(&mut self) -> Result<u64> {
        let new_num = self.num_blocks;
        let zeros = vec![0u8; BLOCK_SIZE];
        self.archive.seek(new_num as i64 * BLOCK_SIZE as i64, Whence::Beginning)?;
        self.archive.write_blob(&zeros)?;
        self.num_blocks += 1;

        let _ = self.get_block(new_num)?;
        Ok(new_num)
    }

    /// Write back every dirty cached block.
    pub fn flush(&mut self) -> Result<()> {
        let _guard = err_at!(IOError, self.archive.file().lock_shared())?;
        let mut flushed = 0;
        for slot in 0..self.cache.len() {
            if self.cache[slot].dirty {
                self.flush_slot(slot)?;
                flushed += 1;
            }
        }
        err_at!(IOError, self.archive.file().unlock())?;
        log::debug!("flushed {} dirty block(s) of {} cached", flushed, self.cache.len());
        Ok(())
    }

    pub fn close(mut self) -> Result<()> {
        self.flush()
    }

    fn resident_slot(&self, i: u64) -> Result<usize> {
        self.cache
            .iter()
            .position(|b| b.block_num == i as i64)
            .ok_or(())
            .or_else(|_| err_at!(BadAddress, msg: "block {} not resident", i))
    }

    fn flush_slot(&mut self, slot: usize) -> Result<()> {
        let block_num = self.cache[slot].block_num;
        debug_assert!(block_num >= 0);
        self.archive.seek(block_num * BLOCK_SIZE as i64, Whence::Beginning)?;
        self.archive.write_blob(&self.cache[slot].data)?;
        self.cache[slot].dirty = false;
        Ok(())
    }

    fn find_victim(&self) -> usize {
        let mut victim = 0;
        for i in 1..self.cache.len() {
            if self.cache[i].timestamp < self.cache[victim].timestamp {
                victim = i;
            }
        }
        victim
    }

    fn bump_timer(&mut self) {
        if self.timer == u32::MAX {
            for b in self.cache.iter_mut() {
                b.timestamp = 0;
            }
            self.timer = 0;
        }
        self.timer += 1;
    }
}
