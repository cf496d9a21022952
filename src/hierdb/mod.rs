//! Hierarchical database: a tree of directories and entries built on top
//! of the record file, with a cursor for walking and mutating it.

use std::cmp::Ordering;

use crate::archive::{Archive, FixedSliceArchive, MemArchive};
use crate::recfile::{Addr as NodeAddr, RecordFile};
use crate::{err_at, Result};

const TAG_ROOT: i32 = 1;
const TAG_ENTRY: i32 = 2;
const TAG_ARRAY_INFO: i32 = 4;

/// Every node body is versioned so a future format change can add fields
/// without reframing existing records; see the typed-serialization
/// registry (`crate::serialize`) for the general form of this convention.
const NODE_VERSION: i16 = 1;

fn check_node_version(kind: &str, version: i16) -> Result<()> {
    if version > NODE_VERSION {
        return err_at!(
            ArchiveFormat, msg: "{} node version {} is newer than supported version {}", kind, version, NODE_VERSION
        );
    }
    Ok(())
}

fn write_addr<A: Archive>(arch: &mut A, addr: NodeAddr) -> Result<()> {
    arch.write_i32(addr.block_num as i32)?;
    arch.write_i32(addr.index)
}

fn read_addr<A: Archive>(arch: &mut A) -> Result<NodeAddr> {
    let block_num = arch.read_i32()? as i64;
    let index = arch.read_i32()?;
    Ok(NodeAddr { block_num, index })
}

#[derive(Clone, Debug)]
struct RootNode {
    case_sensitive: bool,
    delimiter: char,
    root_array_info: NodeAddr,
}

impl RootNode {
    fn encode(&self) -> Result<Vec<u8>> {
        let mut arch = MemArchive::new();
        arch.write_i32(TAG_ROOT)?;
        arch.write_i16(NODE_VERSION)?;
        write_addr(&mut arch, self.root_array_info)?;
        arch.write_i32(if self.case_sensitive { 1 } else { 0 })?;
        arch.write_string(&self.delimiter.to_string())?;
        Ok(arch.into_vec())
    }

    fn decode(bytes: &[u8]) -> Result<Self> {
        let mut arch = MemArchive::from_vec(bytes.to_vec());
        let tag = arch.read_i32()?;
        if tag != TAG_ROOT {
            return err_at!(ArchiveFormat, msg: "expected root node tag {}, got {}", TAG_ROOT, tag);
        }
        check_node_version("root", arch.read_i16()?)?;
        let root_array_info = read_addr(&mut arch)?;
        let case_sensitive = arch.read_i32()? != 0;
        let delim = arch.read_string()?;
        let delimiter =
            delim.chars().next().ok_or(()).or_else(|_| err_at!(ArchiveFormat, msg: "empty delimiter string"))?;
        Ok(RootNode { case_sensitive, delimiter, root_array_info })
    }
}

#[derive(Clone, Debug)]
struct ArrayInfoNode {
    parent: NodeAddr,
    array: NodeAddr,
}

impl ArrayInfoNode {
    fn encode(&self) -> Result<Vec<u8>> {
        let mut arch = MemArchive::new();
        arch.write_i32(TAG_ARRAY_INFO)?;
        arch.write_i16(NODE_VERSION)?;
        write_addr(&mut arch, self.parent)?;
        write_addr(&mut arch, self.array)?;
        Ok(arch.into_vec())
    }

    fn decode(bytes: &[u8]) -> Result<Self> {
        let mut arch = MemArchive::from_vec(bytes.to_vec());
        let tag = arch.read_i32()?;
        if tag != TAG_ARRAY_INFO {
            return err_at!(ArchiveFormat, msg: "expected array-info tag {}, got {}", TAG_ARRAY_INFO, tag);
        }
        check_node_version("array-info", arch.read_i16()?)?;
        let parent = read_addr(&mut arch)?;
        let array = read_addr(&mut arch)?;
        Ok(ArrayInfoNode { parent, array })
    }
}

#[derive(Clone, Debug)]
struct EntryNode {
    name: String,
    child: NodeAddr,
    payload: NodeAddr,
    next: NodeAddr,
}

impl EntryNode {
    fn encode(&self) -> Result<Vec<u8>> {
        let mut arch = MemArchive::new();
        arch.write_i32(TAG_ENTRY)?;
        arch.write_i16(NODE_VERSION)?;
        arch.write_string(&self.name)?;
        write_addr(&mut arch, self.child)?;
        write_addr(&mut arch, self.payload)?;
        write_addr(&mut arch, self.next)?;
        Ok(arch.into_vec())
    }

    fn decode(bytes: &[u8]) -> Result<Self> {
        let mut arch = MemArchive::from_vec(bytes.to_vec());
        let tag = arch.read_i32()?;
        if tag != TAG_ENTRY {
            return err_at!(ArchiveFormat, msg: "expected entry tag {}, got {}", TAG_ENTRY, tag);
        }
        check_node_version("entry", arch.read_i16()?)?;
        let name = arch.read_string()?;
        let child = read_addr(&mut arch)?;
        let payload = read_addr(&mut arch)?;
        let next = read_addr(&mut arch)?;
        Ok(EntryNode { name, child, payload, next })
    }
}

/// A paged, record-backed tree of directories (`ArrayInfo` nodes) and
/// named entries, rooted at block 0.
pub struct HierDb {
    rf: RecordFile,
    case_sensitive: bool,
    delimiter: char,
    root_array_info: NodeAddr,
}

impl HierDb {
    /// Lay down a fresh Root node at `(0,0)` and an empty root ArrayInfo
    /// at `(0,1)`.
    pub fn create<P: AsRef<std::path::Path>>(
        path: P,
        num_pages: usize,
        case_sensitive: bool,
        delimiter: char,
    ) -> Result<Self> {
        let mut rf = RecordFile::create(path, num_pages)?;

        let placeholder = RootNode { case_sensitive, delimiter, root_array_info: NodeAddr::invalid() };
        let root_addr = rf.add_item(&placeholder.encode()?)?;
        debug_assert_eq!(root_addr, NodeAddr { block_num: 0, index: 0 });

        let array_info = ArrayInfoNode { parent: NodeAddr::invalid(), array: NodeAddr::invalid() };
        let array_addr = rf.add_item(&array_info.encode()?)?;
        debug_assert_eq!(array_addr, NodeAddr { block_num: 0, index: 1 });

        let root = RootNode { case_sensitive, delimiter, root_array_info: array_addr };
        {
            let bytes = root.encode()?;
            let buf = rf.get_data_for_writing(root_addr)?;
            let mut fixed = FixedSliceArchive::new(buf);
            fixed.write_blob(&bytes)?;
        }

        log::info!("created hierarchical database, case_sensitive={}, delimiter={:?}", case_sensitive, delimiter);
        Ok(HierDb { rf, case_sensitive, delimiter, root_array_info: array_addr })
    }

    /// Read the Root node at `(0,0)` to recover case-sensitivity, the
    /// delimiter, and the address of the root ArrayInfo.
    pub fn open<P: AsRef<std::path::Path>>(path: P, num_pages: usize) -> Result<Self> {
        let mut rf = RecordFile::open(path, num_pages)?;
        let root_addr = NodeAddr { block_num: 0, index: 0 };
        let bytes = rf.get_data_for_reading(root_addr)?.to_vec();
        let root = RootNode::decode(&bytes)?;
        log::info!("opened hierarchical database, case_sensitive={}, delimiter={:?}", root.case_sensitive, root.delimiter);
        Ok(HierDb {
            rf,
            case_sensitive: root.case_sensitive,
            delimiter: root.delimiter,
            root_array_info: root.root_array_info,
        })
    }

    pub fn is_case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    pub fn delimiter(&self) -> char {
        self.delimiter
    }

    pub fn flush(&mut self) -> Result<()> {
        self.rf.flush()
    }

    pub fn close(self) -> Result<()> {
        log::info!("closing hierarchical database");
        self.rf.close()
    }

    /// Open a cursor positioned at the root directory.
    pub fn cursor(&mut self) -> Result<Cursor<'_>> {
        let root_array_info = self.root_array_info;
        let mut cursor = Cursor {
            db: self,
            info: ArrayInfoNode { parent: NodeAddr::invalid(), array: NodeAddr::invalid() },
            info_addr: NodeAddr::invalid(),
            entries: Vec::new(),
            pos: 0,
            path: Vec::new(),
        };
        cursor.load_array_at(root_array_info)?;
        Ok(cursor)
    }
}

/// Walks one hierarchical database. Holds a snapshot of the current
/// directory's entries; call [`refresh`](Cursor::refresh) after any
/// mutation made through a different cursor on the same database.
pub struct Cursor<'db> {
    db: &'db mut HierDb,
    info: ArrayInfoNode,
    info_addr: NodeAddr,
    entries: Vec<(NodeAddr, EntryNode)>,
    pos: usize,
    path: Vec<String>,
}

impl<'db> Cursor<'db> {
    fn compare(&self, a: &str, b: &str) -> Ordering {
        if self.db.case_sensitive {
            a.cmp(b)
        } else {
            a.to_lowercase().cmp(&b.to_lowercase())
        }
    }

    /// First index `i` such that `entries[i].name` compares greater than
    /// `name` — the same contract as `std::upper_bound`.
    fn upper_bound(&self, name: &str) -> usize {
        self.entries.partition_point(|(_, e)| self.compare(&e.name, name) != Ordering::Greater)
    }

    fn load_array_at(&mut self, addr: NodeAddr) -> Result<()> {
        let bytes = self.db.rf.get_data_for_reading(addr)?.to_vec();
        let info = ArrayInfoNode::decode(&bytes)?;

        let mut entries = Vec::new();
        let mut cur = info.array;
        while !cur.is_invalid() {
            let data = match self.db.rf.get_data_for_reading(cur) {
                Ok(d) => d.to_vec(),
                Err(e) => {
                    log::warn!("failed to read entry at {:?} while loading directory: {}", cur, e);
                    break;
                }
            };
            match EntryNode::decode(&data) {
                Ok(entry) => {
                    let next = entry.next;
                    entries.push((cur, entry));
                    cur = next;
                }
                Err(e) => {
                    log::warn!("corrupt entry at {:?} while loading directory: {}", cur, e);
                    break;
                }
            }
        }

        self.info = info;
        self.info_addr = addr;
        self.entries = entries;
        self.pos = 0;
        Ok(())
    }

    fn rewrite_info(&mut self) -> Result<()> {
        let bytes = self.info.encode()?;
        let buf = self.db.rf.get_data_for_writing(self.info_addr)?;
        let mut fixed = FixedSliceArchive::new(buf);
        fixed.write_blob(&bytes)
    }

    fn rewrite_entry(&mut self, addr: NodeAddr, entry: &EntryNode) -> Result<()> {
        let bytes = entry.encode()?;
        let buf = self.db.rf.get_data_for_writing(addr)?;
        let mut fixed = FixedSliceArchive::new(buf);
        fixed.write_blob(&bytes)
    }

    pub fn at_root(&self) -> bool {
        self.info.parent.is_invalid()
    }

    pub fn can_descend(&self) -> bool {
        !self.done() && !self.entries[self.pos].1.child.is_invalid()
    }

    pub fn descend(&mut self) -> Result<()> {
        if !self.can_descend() {
            return err_at!(InvalidInput, msg: "cannot descend: cursor is done or entry has no child");
        }
        let name = self.entries[self.pos].1.name.clone();
        let child_addr = self.entries[self.pos].1.child;
        self.path.push(name);
        self.load_array_at(child_addr)
    }

    pub fn ascend(&mut self) -> Result<()> {
        if self.at_root() {
            return err_at!(InvalidInput, msg: "already at the root");
        }
        let parent_addr = self.info.parent;
        self.path.pop();
        self.load_array_at(parent_addr)
    }

    pub fn seek_begin(&mut self) {
        self.pos = 0;
    }

    pub fn done(&self) -> bool {
        self.pos >= self.entries.len()
    }

    pub fn next(&mut self) {
        if !self.done() {
            self.pos += 1;
        }
    }

    /// Seeks to the named peer in the current directory; leaves the
    /// cursor past-the-end on a miss.
    pub fn seek_to(&mut self, name: &str) -> bool {
        let ub = self.upper_bound(name);
        if ub > 0 && self.compare(&self.entries[ub - 1].1.name, name) == Ordering::Equal {
            self.pos = ub - 1;
            true
        } else {
            self.pos = self.entries.len();
            false
        }
    }

    pub fn seek_to_root(&mut self) -> Result<()> {
        let root_array_info = self.db.root_array_info;
        self.path.clear();
        self.load_array_at(root_array_info)
    }

    /// Reload the current directory's entries from disk, e.g. after a
    /// mutation made through another cursor.
    pub fn refresh(&mut self) -> Result<()> {
        let addr = self.info_addr;
        self.load_array_at(addr)
    }

    pub fn get_name(&self) -> Option<&str> {
        if self.done() {
            None
        } else {
            Some(&self.entries[self.pos].1.name)
        }
    }

    pub fn get_cwd(&self) -> String {
        let mut s = String::new();
        for p in &self.path {
            s.push(self.db.delimiter);
            s.push_str(p);
        }
        if s.is_empty() {
            s.push(self.db.delimiter);
        }
        s
    }

    /// Insert `name` in sorted order. Inserting a name already present is
    /// a no-op success; the cursor lands on the (possibly pre-existing)
    /// entry either way.
    pub fn create_entry(&mut self, name: &str) -> Result<()> {
        let ub = self.upper_bound(name);
        if ub > 0 && self.compare(&self.entries[ub - 1].1.name, name) == Ordering::Equal {
            self.pos = ub - 1;
            return Ok(());
        }

        let next_addr = if ub < self.entries.len() { self.entries[ub].0 } else { NodeAddr::invalid() };
        let new_entry =
            EntryNode { name: name.to_string(), child: NodeAddr::invalid(), payload: NodeAddr::invalid(), next: next_addr };
        let new_addr = self.db.rf.add_item(&new_entry.encode()?)?;

        if ub == 0 {
            self.info.array = new_addr;
            self.rewrite_info()?;
        } else {
            let (prev_addr, mut prev_entry) = self.entries[ub - 1].clone();
            prev_entry.next = new_addr;
            self.rewrite_entry(prev_addr, &prev_entry)?;
            self.entries[ub - 1].1 = prev_entry;
        }

        self.entries.insert(ub, (new_addr, new_entry));
        self.pos = ub;
        Ok(())
    }

    pub fn create_child_array(&mut self) -> Result<()> {
        if self.done() {
            return err_at!(InvalidInput, msg: "cannot create a child array: cursor is done");
        }
        if !self.entries[self.pos].1.child.is_invalid() {
            return err_at!(Duplicate, msg: "entry already has a child array");
        }

        let new_info = ArrayInfoNode { parent: self.info_addr, array: NodeAddr::invalid() };
        let new_addr = self.db.rf.add_item(&new_info.encode()?)?;

        let (addr, mut entry) = self.entries[self.pos].clone();
        entry.child = new_addr;
        self.rewrite_entry(addr, &entry)?;
        self.entries[self.pos].1 = entry;
        Ok(())
    }

    pub fn has_data(&self) -> bool {
        !self.done() && !self.entries[self.pos].1.payload.is_invalid()
    }

    pub fn get_data(&mut self) -> Result<&[u8]> {
        if self.done() {
            return err_at!(InvalidInput, msg: "cursor is done");
        }
        let payload = self.entries[self.pos].1.payload;
        if payload.is_invalid() {
            return err_at!(InvalidInput, msg: "entry has no data");
        }
        self.db.rf.get_data_for_reading(payload)
    }

    pub fn set_data(&mut self, data: &[u8]) -> Result<()> {
        if self.done() {
            return err_at!(InvalidInput, msg: "cursor is done");
        }
        let (addr, mut entry) = self.entries[self.pos].clone();
        if !entry.payload.is_invalid() {
            self.db.rf.remove_item(entry.payload)?;
        }
        entry.payload = self.db.rf.add_item(data)?;
        self.rewrite_entry(addr, &entry)?;
        self.entries[self.pos].1 = entry;
        Ok(())
    }

    pub fn remove_data(&mut self) -> Result<()> {
        if self.done() {
            return err_at!(InvalidInput, msg: "cursor is done");
        }
        let (addr, mut entry) = self.entries[self.pos].clone();
        if entry.payload.is_invalid() {
            return err_at!(InvalidInput, msg: "entry has no data to remove");
        }
        self.db.rf.remove_item(entry.payload)?;
        entry.payload = NodeAddr::invalid();
        self.rewrite_entry(addr, &entry)?;
        self.entries[self.pos].1 = entry;
        Ok(())
    }

    /// Unlinks and deletes the current entry; requires it have no child
    /// array. The cursor's position then refers to what was the next
    /// entry.
    pub fn delete_entry(&mut self) -> Result<()> {
        if self.done() {
            return err_at!(InvalidInput, msg: "cursor is done");
        }
        let (addr, entry) = self.entries[self.pos].clone();
        if !entry.child.is_invalid() {
            return err_at!(HasChildren, msg: "cannot delete an entry that still has a child array");
        }
        if !entry.payload.is_invalid() {
            self.db.rf.remove_item(entry.payload)?;
        }

        if self.pos == 0 {
            self.info.array = entry.next;
            self.rewrite_info()?;
        } else {
            let (prev_addr, mut prev_entry) = self.entries[self.pos - 1].clone();
            prev_entry.next = entry.next;
            self.rewrite_entry(prev_addr, &prev_entry)?;
            self.entries[self.pos - 1].1 = prev_entry;
        }

        self.db.rf.remove_item(addr)?;
        self.entries.remove(self.pos);
        Ok(())
    }

    pub fn child_array_empty(&mut self) -> Result<bool> {
        if self.done() {
            return err_at!(InvalidInput, msg: "cursor is done");
        }
        let child_addr = self.entries[self.pos].1.child;
        if child_addr.is_invalid() {
            return err_at!(InvalidInput, msg: "entry has no child array");
        }
        let bytes = self.db.rf.get_data_for_reading(child_addr)?.to_vec();
        let info = ArrayInfoNode::decode(&bytes)?;
        Ok(info.array.is_invalid())
    }

    pub fn delete_child_array(&mut self) -> Result<()> {
        if self.done() {
            return err_at!(InvalidInput, msg: "cursor is done");
        }
        if self.entries[self.pos].1.child.is_invalid() {
            return err_at!(InvalidInput, msg: "entry has no child array");
        }
        if !self.child_array_empty()? {
            return err_at!(NotEmpty, msg: "child array is not empty");
        }

        let (addr, mut entry) = self.entries[self.pos].clone();
        self.db.rf.remove_item(entry.child)?;
        entry.child = NodeAddr::invalid();
        self.rewrite_entry(addr, &entry)?;
        self.entries[self.pos].1 = entry;
        Ok(())
    }
}
