//! Record array: packs variable-length records into one block, indexes
//! growing down from the header and data growing up from the end of the
//! block, meeting somewhere in the middle.

use crate::block::{BlockFile, BLOCK_SIZE};
use crate::{err_at, Result};

const RECORD_INDEX_SIZE: usize = 8; // offset: i32, main_index: i32
const HEADER_SIZE: usize = 8; // space_available: i32, num_items: i32
const MARGIN: i32 = 10;
const INVALID_INDEX: i32 = -1;

/// Upper bound on records a block can hold: every used record needs a
/// record-index entry plus at least one byte of data, rounded up to a
/// 4-byte minimum.
pub const MAX_RECORDS: usize = BLOCK_SIZE / (RECORD_INDEX_SIZE + 4);

/// Largest single record that could ever fit, if it were the only thing
/// in the block.
pub const MAX_DATA_SIZE: usize = BLOCK_SIZE - RECORD_INDEX_SIZE - HEADER_SIZE - MARGIN as usize;

fn get_i32(buf: &[u8], off: usize) -> i32 {
    i32::from_be_bytes(buf[off..off + 4].try_into().unwrap())
}

fn set_i32(buf: &mut [u8], off: usize, v: i32) {
    buf[off..off + 4].copy_from_slice(&v.to_be_bytes());
}

fn index_offset(i: usize) -> usize {
    HEADER_SIZE + i * RECORD_INDEX_SIZE
}

fn record_offset(i: usize) -> usize {
    index_offset(i)
}

fn record_main_index(i: usize) -> usize {
    index_offset(i) + 4
}

const HEADER_SPACE_AVAIL: usize = 0;
const HEADER_NUM_ITEMS: usize = 4;

/// A view onto one block of a [`BlockFile`], treating it as a packed
/// array of variable-length records. Exactly one of
/// [`init_new_block`](RecordArray::init_new_block) or
/// [`init_for_existing_block`](RecordArray::init_for_existing_block) must
/// run before first use; every data method does this lazily anyway.
pub struct RecordArray {
    block_num: u64,
    num_items: i32,
    space_available: i32,
    initialized: bool,
}

impl RecordArray {
    pub fn new(block_num: u64) -> Self {
        RecordArray { block_num, num_items: 0, space_available: -1, initialized: false }
    }

    pub fn num_items(&self) -> i32 {
        self.num_items
    }

    pub fn available_space(&self) -> i32 {
        self.space_available
    }

    /// Zero the block and lay down an empty index array with its guard
    /// entry at slot 0.
    pub fn init_new_block(&mut self, bf: &mut BlockFile) -> Result<()> {
        let buf = bf.get_block(self.block_num)?;
        for b in buf.iter_mut() {
            *b = 0;
        }
        set_i32(buf, record_offset(0), -1);
        set_i32(buf, record_main_index(0), INVALID_INDEX);
        bf.mark_dirty(self.block_num)?;

        self.initialized = true;
        self.num_items = 0;
        self.update_free_space(bf)?;
        self.write_header(bf)?;
        Ok(())
    }

    /// Read the header off a block that was previously set up with
    /// [`init_new_block`](RecordArray::init_new_block).
    pub fn init_for_existing_block(&mut self, bf: &mut BlockFile) -> Result<()> {
        let buf = bf.get_block(self.block_num)?;
        self.num_items = get_i32(buf, HEADER_NUM_ITEMS);
        self.space_available = get_i32(buf, HEADER_SPACE_AVAIL);
        self.initialized = true;
        Ok(())
    }

    fn ensure_init(&mut self, bf: &mut BlockFile) -> Result<()> {
        if !self.initialized {
            self.init_for_existing_block(bf)?;
        }
        Ok(())
    }

    pub fn is_item_valid(&mut self, bf: &mut BlockFile, index: i32) -> Result<bool> {
        self.ensure_init(bf)?;
        if index < 0 || index >= self.num_items {
            return Ok(false);
        }
        let buf = bf.get_block(self.block_num)?;
        Ok(get_i32(buf, record_main_index(index as usize)) != INVALID_INDEX)
    }

    /// Insert `data` under `main_index`, returning the array slot it
    /// landed in. `main_index` is opaque here; the record file uses it to
    /// remember which address an item belongs to.
    pub fn add_item(&mut self, bf: &mut BlockFile, data: &[u8], main_index: i32) -> Result<i32> {
        self.ensure_init(bf)?;

        if main_index == INVALID_INDEX {
            return err_at!(InvalidInput, msg: "main index cannot be the invalid sentinel");
        }
        if data.is_empty() {
            return err_at!(InvalidInput, msg: "cannot add a zero-length item");
        }
        if data.len() as i32 > self.space_available {
            return err_at!(
                OutOfSpace, msg: "need {} bytes, only {} available", data.len(), self.space_available
            );
        }
        if self.num_items as usize + 1 >= MAX_RECORDS {
            return err_at!(OutOfSpace, msg: "record array is full");
        }

        let buf = bf.get_block(self.block_num)?;

        let mut new_index = 0usize;
        while new_index < self.num_items as usize {
            if get_i32(buf, record_main_index(new_index)) == INVALID_INDEX {
                break;
            }
            new_index += 1;
        }

        set_i32(buf, record_main_index(new_index), main_index);

        let prev_offset = if new_index == 0 { 0 } else { get_i32(buf, record_offset(new_index - 1)) };
        let new_offset = prev_offset + data.len() as i32;
        set_i32(buf, record_offset(new_index), new_offset);

        if new_index == self.num_items as usize {
            self.num_items += 1;
            set_i32(buf, record_offset(self.num_items as usize), -1);
            set_i32(buf, record_main_index(self.num_items as usize), INVALID_INDEX);
        } else {
            let top_offset = get_i32(buf, record_offset(self.num_items as usize - 1));
            let amt_to_move = top_offset - prev_offset;
            debug_assert!(amt_to_move >= 0);
            let src_start = BLOCK_SIZE - top_offset as usize;
            let dst_start = src_start - data.len();
            buf.copy_within(src_start..src_start + amt_to_move as usize, dst_start);

            for i in (new_index + 1)..(self.num_items as usize) {
                let off = get_i32(buf, record_offset(i));
                set_i32(buf, record_offset(i), off + data.len() as i32);
            }
        }

        let dest = BLOCK_SIZE - new_offset as usize;
        buf[dest..dest + data.len()].copy_from_slice(data);

        set_i32(buf, record_offset(self.num_items as usize), -1);
        set_i32(buf, record_main_index(self.num_items as usize), INVALID_INDEX);

        bf.mark_dirty(self.block_num)?;
        self.update_free_space(bf)?;
        self.write_header(bf)?;

        Ok(new_index as i32)
    }

    pub fn delete_item(&mut self, bf: &mut BlockFile, index: i32) -> Result<()> {
        self.ensure_init(bf)?;
        if !self.is_item_valid(bf, index)? {
            return err_at!(BadAddress, msg: "index {} is not a valid item", index);
        }
        let idx = index as usize;

        let buf = bf.get_block(self.block_num)?;

        if (idx + 1) == self.num_items as usize {
            self.num_items -= 1;
            while self.num_items > 0
                && get_i32(buf, record_main_index(self.num_items as usize - 1)) == INVALID_INDEX
            {
                self.num_items -= 1;
            }
            set_i32(buf, record_offset(self.num_items as usize), -1);
            set_i32(buf, record_main_index(self.num_items as usize), INVALID_INDEX);
        } else {
            let top_offset = get_i32(buf, record_offset(self.num_items as usize - 1));
            let item_offset = get_i32(buf, record_offset(idx));
            let size_to_shift = top_offset - item_offset;
            let mut dist_to_shift = item_offset;
            if idx > 0 {
                dist_to_shift -= get_i32(buf, record_offset(idx - 1));
            }
            debug_assert!(size_to_shift >= 0 && dist_to_shift >= 0);

            let src_start = BLOCK_SIZE - top_offset as usize;
            buf.copy_within(src_start..src_start + size_to_shift as usize, src_start + dist_to_shift as usize);

            let prev_offset = if idx == 0 { 0 } else { get_i32(buf, record_offset(idx - 1)) };
            set_i32(buf, record_main_index(idx), INVALID_INDEX);
            set_i32(buf, record_offset(idx), prev_offset);

            for i in (idx + 1)..(self.num_items as usize) {
                let off = get_i32(buf, record_offset(i));
                set_i32(buf, record_offset(i), off - dist_to_shift);
            }
        }

        bf.mark_dirty(self.block_num)?;
        self.update_free_space(bf)?;
        self.write_header(bf)?;
        Ok(())
    }

    fn item_bounds(&mut self, bf: &mut BlockFile, index: i32) -> Result<(usize, usize)> {
        if !self.is_item_valid(bf, index)? {
            return err_at!(BadAddress, msg: "index {} is not a valid item", index);
        }
        let buf = bf.get_block(self.block_num)?;
        let offset = get_i32(buf, record_offset(index as usize));
        let prev = if index == 0 { 0 } else { get_i32(buf, record_offset(index as usize - 1)) };
        let start = BLOCK_SIZE - offset as usize;
        let size = (offset - prev) as usize;
        Ok((start, size))
    }

    pub fn get_data_for_reading<'b>(&mut self, bf: &'b mut BlockFile, index: i32) -> Result<&'b [u8]> {
        let (start, size) = self.item_bounds(bf, index)?;
        let buf = bf.get_block(self.block_num)?;
        Ok(&buf[start..start + size])
    }

    pub fn get_data_for_writing<'b>(&mut self, bf: &'b mut BlockFile, index: i32) -> Result<&'b mut [u8]> {
        let (start, size) = self.item_bounds(bf, index)?;
        bf.mark_dirty(self.block_num)?;
        let buf = bf.get_block(self.block_num)?;
        Ok(&mut buf[start..start + size])
    }

    pub fn main_index_of(&mut self, bf: &mut BlockFile, index: i32) -> Result<i32> {
        self.ensure_init(bf)?;
        let buf = bf.get_block(self.block_num)?;
        Ok(get_i32(buf, record_main_index(index as usize)))
    }

    fn update_free_space(&mut self, bf: &mut BlockFile) -> Result<()> {
        let buf = bf.get_block(self.block_num)?;
        let mut avail = BLOCK_SIZE as i32 - HEADER_SIZE as i32 - ((self.num_items + 1) * RECORD_INDEX_SIZE as i32);
        avail -= MARGIN;
        if self.num_items > 0 {
            avail -= get_i32(buf, record_offset(self.num_items as usize - 1));
        }
        self.space_available = avail.max(0);
        Ok(())
    }

    fn write_header(&mut self, bf: &mut BlockFile) -> Result<()> {
        let buf = bf.get_block(self.block_num)?;
        set_i32(buf, HEADER_SPACE_AVAIL, self.space_available);
        set_i32(buf, HEADER_NUM_ITEMS, self.num_items);
        bf.mark_dirty(self.block_num)?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "recarr_test.rs"]
mod recarr_test;
