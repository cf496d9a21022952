//! Name table: interns strings once, links each to its lowercase form,
//! and hands callers a small `NameId` instead of ever exposing an owned
//! copy. Backed by a grow-only arena so names live for as long as the
//! table does and are never individually freed.

use std::collections::HashMap;

const DEFAULT_INITIAL_SIZE: usize = 4096;
const DEFAULT_GROW_BY: usize = 4096;

/// A heap that grows but never shrinks, short of [`clear`](GrowHeap::clear).
/// Bump-allocates out of a sequence of chunks; nothing is ever freed
/// individually.
pub struct GrowHeap {
    initial_size: usize,
    grow_by: usize,
    heaps: Vec<Vec<u8>>,
    cur_off: usize,
}

impl GrowHeap {
    pub fn new(initial_size: usize, grow_by: usize) -> Self {
        GrowHeap { initial_size, grow_by, heaps: Vec::new(), cur_off: 0 }
    }

    /// Bump-allocate `size` bytes, returning `(chunk_index, offset)`. A
    /// request larger than `grow_by` gets a one-off chunk sized to fit,
    /// rather than failing.
    pub fn alloc(&mut self, size: usize) -> (usize, usize) {
        let size = size.max(1);

        if self.heaps.is_empty() {
            self.heaps.push(vec![0u8; self.initial_size]);
            self.cur_off = 0;
        }

        if self.cur_off + size > self.heaps.last().unwrap().len() {
            let chunk_size = size.max(self.grow_by);
            self.heaps.push(vec![0u8; chunk_size]);
            self.cur_off = 0;
        }

        let chunk_index = self.heaps.len() - 1;
        let offset = self.cur_off;
        self.cur_off += size;
        (chunk_index, offset)
    }

    pub fn write(&mut self, chunk_index: usize, offset: usize, data: &[u8]) {
        self.heaps[chunk_index][offset..offset + data.len()].copy_from_slice(data);
    }

    pub fn read(&self, chunk_index: usize, offset: usize, len: usize) -> &[u8] {
        &self.heaps[chunk_index][offset..offset + len]
    }

    /// Total bytes committed to chunks, not counting the unused tail of
    /// the most recent one.
    pub fn total_mem_usage(&self) -> usize {
        let mut usage: usize = self.heaps.iter().map(|h| h.len()).sum();
        if let Some(last) = self.heaps.last() {
            usage -= last.len() - self.cur_off;
        }
        usage
    }

    pub fn clear(&mut self) {
        self.heaps.clear();
        self.cur_off = 0;
    }
}

impl Default for GrowHeap {
    fn default() -> Self {
        GrowHeap::new(DEFAULT_INITIAL_SIZE, DEFAULT_GROW_BY)
    }
}

/// Index into a [`NameTable`]'s arena. Stable for the table's lifetime.
pub type NameId = usize;

struct NameEntry {
    chunk_index: usize,
    offset: usize,
    len: usize,
    lowercase: NameId,
}

/// Maps `string -> canonical entry`, linking every entry to the entry for
/// its lowercase form (itself, if it's already lowercase).
pub struct NameTable {
    heap: GrowHeap,
    entries: Vec<NameEntry>,
    lookup: HashMap<String, NameId>,
}

impl NameTable {
    pub fn new() -> Self {
        NameTable { heap: GrowHeap::default(), entries: Vec::new(), lookup: HashMap::new() }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: NameId) -> &str {
        let e = &self.entries[id];
        std::str::from_utf8(self.heap.read(e.chunk_index, e.offset, e.len))
            .expect("name table entries are only ever written as valid utf8")
    }

    pub fn lowercase_of(&self, id: NameId) -> NameId {
        self.entries[id].lowercase
    }

    pub fn is_own_lowercase(&self, id: NameId) -> bool {
        self.entries[id].lowercase == id
    }

    /// Look up `s`, interning it (and linking its lowercase form) if this
    /// is the first time it's been seen.
    pub fn intern(&mut self, s: &str) -> NameId {
        if let Some(&id) = self.lookup.get(s) {
            return id;
        }

        let id = self.alloc_entry(s);

        let ls = s.to_lowercase();
        let lowercase_id = if ls == s { id } else { self.intern(&ls) };
        self.entries[id].lowercase = lowercase_id;

        id
    }

    fn alloc_entry(&mut self, s: &str) -> NameId {
        let bytes = s.as_bytes();
        let (chunk_index, offset) = self.heap.alloc(bytes.len());
        self.heap.write(chunk_index, offset, bytes);

        let id = self.entries.len();
        self.entries.push(NameEntry { chunk_index, offset, len: bytes.len(), lowercase: id });
        self.lookup.insert(s.to_string(), id);
        id
    }

    pub fn total_mem_usage(&self) -> usize {
        self.heap.total_mem_usage()
    }

    pub fn clear(&mut self) {
        self.heap.clear();
        self.entries.clear();
        self.lookup.clear();
    }
}

impl Default for NameTable {
    fn default() -> Self {
        NameTable::new()
    }
}

#[cfg(test)]
#[path = "names_test.rs"]
mod names_test;
