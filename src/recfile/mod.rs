//! Record file: a [`BlockFile`] plus one [`RecordArray`] per block,
//! giving variable-length records a stable address that survives
//! additions and removals elsewhere in the file.

use crate::block::BlockFile;
use crate::recarr::{RecordArray, MAX_DATA_SIZE};
use crate::{err_at, Result};

/// The address of one stored record: a block number plus the slot it
/// occupies within that block's record array. Grow-only — a record file
/// never shrinks, so an `Addr` stays valid for the lifetime of the record
/// it names.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Addr {
    pub block_num: i64,
    pub index: i32,
}

impl Addr {
    pub fn invalid() -> Self {
        Addr { block_num: -1, index: -1 }
    }

    pub fn is_invalid(&self) -> bool {
        self.block_num < 0 || self.index < 0
    }
}

pub struct RecordFile {
    block_file: BlockFile,
    blocks: Vec<RecordArray>,
    last_added_to: usize,
}

impl RecordFile {
    pub fn create<P: AsRef<std::path::Path>>(path: P, num_pages: usize) -> Result<Self> {
        let mut block_file = BlockFile::create(path, num_pages)?;
        let mut arr = RecordArray::new(0);
        arr.init_new_block(&mut block_file)?;
        Ok(RecordFile { block_file, blocks: vec![arr], last_added_to: 0 })
    }

    pub fn open<P: AsRef<std::path::Path>>(path: P, num_pages: usize) -> Result<Self> {
        let mut block_file = BlockFile::open(path, num_pages)?;
        let n = block_file.num_blocks();
        let mut blocks = Vec::with_capacity(n as usize);
        for i in 0..n {
            let mut arr = RecordArray::new(i);
            arr.init_for_existing_block(&mut block_file)?;
            blocks.push(arr);
        }
        Ok(RecordFile { block_file, blocks, last_added_to: 0 })
    }

    pub fn flush(&mut self) -> Result<()> {
        self.block_file.flush()
    }

    pub fn close(mut self) -> Result<()> {
        self.block_file.flush()
    }

    pub fn add_item(&mut self, data: &[u8]) -> Result<Addr> {
        if data.is_empty() || data.len() > MAX_DATA_SIZE {
            return err_at!(
                InvalidInput, msg: "record of {} bytes does not fit a block (max {})", data.len(), MAX_DATA_SIZE
            );
        }
        let block_idx = self.find_room_for_data(data.len() as i32)?;
        let index = self.blocks[block_idx].add_item(&mut self.block_file, data, 1)?;
        self.last_added_to = block_idx;
        Ok(Addr { block_num: block_idx as i64, index })
    }

    pub fn remove_item(&mut self, addr: Addr) -> Result<()> {
        if !self.is_valid_addr(addr)? {
            return err_at!(BadAddress, msg: "address {:?} is not valid", addr);
        }
        self.blocks[addr.block_num as usize].delete_item(&mut self.block_file, addr.index)
    }

    pub fn is_valid_addr(&mut self, addr: Addr) -> Result<bool> {
        if addr.block_num < 0 || addr.block_num as u64 >= self.block_file.num_blocks() {
            return Ok(false);
        }
        self.blocks[addr.block_num as usize].is_item_valid(&mut self.block_file, addr.index)
    }

    pub fn get_data_for_reading(&mut self, addr: Addr) -> Result<&[u8]> {
        if !self.is_valid_addr(addr)? {
            return err_at!(BadAddress, msg: "address {:?} is not valid", addr);
        }
        self.blocks[addr.block_num as usize].get_data_for_reading(&mut self.block_file, addr.index)
    }

    pub fn get_data_for_writing(&mut self, addr: Addr) -> Result<&mut [u8]> {
        if !self.is_valid_addr(addr)? {
            return err_at!(BadAddress, msg: "address {:?} is not valid", addr);
        }
        self.blocks[addr.block_num as usize].get_data_for_writing(&mut self.block_file, addr.index)
    }

    /// Try `last_added_to` first, then scan the rest of the blocks, then
    /// fall back to creating a fresh block. Mirrors the disk-friendly
    /// "stay where we were" heuristic: most consecutive additions land
    /// near each other.
    fn find_room_for_data(&mut self, data_size: i32) -> Result<usize> {
        if self.blocks[self.last_added_to].available_space() >= data_size {
            return Ok(self.last_added_to);
        }

        for (i, block) in self.blocks.iter().enumerate() {
            if block.available_space() >= data_size {
                return Ok(i);
            }
        }

        let new_num = self.block_file.create_block()?;
        let mut arr = RecordArray::new(new_num);
        arr.init_new_block(&mut self.block_file)?;
        let idx = self.blocks.len();
        self.blocks.push(arr);
        debug_assert_eq!(idx as u64, new_num);
        log::debug!("record file grew to {} block(s) to fit a {}-byte record", self.blocks.len(), data_size);
        Ok(idx)
    }
}

#[cfg(test)]
#[path = "recfile_test.rs"]
mod recfile_test;
