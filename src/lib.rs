//! `tripwire_core`: a paged, content-addressable, hierarchical database
//! and streaming signature engine — the storage core behind a
//! file-integrity baseline, independent of any filesystem-walking or
//! policy layer built on top of it.
//!
//! Module map, bottom to top:
//! - [`archive`] — byte-stream abstraction with big-endian typed I/O.
//! - [`sig`] — streaming hashers and the batch signature generator.
//! - [`block`] — fixed-size pages over a backing file, LRU-cached.
//! - [`recarr`] — variable-length records packed within one block.
//! - [`recfile`] — stable record addresses spanning a whole file of blocks.
//! - [`hierdb`] — the directory tree built on top of the record file.
//! - [`names`] — process-scoped string interning for path components.
//! - [`props`] — the polymorphic property-set model attached to entries.
//! - [`serialize`] — the polymorphic type-tag registry.
//! - [`config`] — engine configuration, round-trippable through `toml`.

mod error;
pub use error::{Error, Result};

pub mod archive;
pub mod block;
pub mod config;
pub mod hierdb;
pub mod names;
pub mod props;
pub mod recarr;
pub mod recfile;
pub mod serialize;
pub mod sig;

pub use block::BlockFile;
pub use config::Config;
pub use hierdb::{Cursor, HierDb};
pub use names::{NameId, NameTable};
pub use props::{CompareResult, PropertySet, PropertyValue, PropertyVector};
pub use recfile::{Addr, RecordFile};
pub use sig::{Algorithm, ArchiveSigGen, Digest};
