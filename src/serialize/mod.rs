//! Typed serialization: a global registry of stable type-name tags to
//! factory functions, so a polymorphic object can be written with its own
//! type tag and read back without the caller knowing its concrete type in
//! advance.

use std::collections::HashMap;

use crate::archive::Archive;
use crate::{err_at, Result};

/// A polymorphic, versioned record. `version()` reports the *current*
/// code's format version; `read_body` is handed whatever version was
/// actually found on disk, so older formats can still be decoded.
pub trait Serializable {
    fn type_id(&self) -> &'static str;
    fn version(&self) -> u16;
    fn write_body(&self, arch: &mut dyn Archive) -> Result<()>;
    fn read_body(&mut self, version: u16, arch: &mut dyn Archive) -> Result<()>;
}

type Factory = fn() -> Box<dyn Serializable>;

/// Maps stable type-tag strings to factories producing empty instances.
/// Look up is by the tag recorded on disk, not by any Rust type — the
/// whole point is that the reader doesn't need to know the concrete type
/// ahead of time.
#[derive(Default)]
pub struct Registry {
    factories: HashMap<&'static str, Factory>,
}

impl Registry {
    pub fn new() -> Self {
        Registry { factories: HashMap::new() }
    }

    /// Registers a factory under `type_id`. Re-registering the same tag
    /// replaces the previous factory.
    pub fn register(&mut self, type_id: &'static str, factory: Factory) {
        self.factories.insert(type_id, factory);
    }

    /// Emits `type_id`, the object's own reported version, then its body.
    pub fn write(&self, obj: &dyn Serializable, arch: &mut dyn Archive) -> Result<()> {
        arch.write_string(obj.type_id())?;
        arch.write_i16(obj.version() as i16)?;
        obj.write_body(arch)
    }

    /// Reads a type tag and version, constructs an empty instance from
    /// the registered factory, and invokes its `read_body`. Fails if the
    /// tag is unregistered or the stored version is newer than what the
    /// current factory's instance reports as its own version.
    pub fn read(&self, arch: &mut dyn Archive) -> Result<Box<dyn Serializable>> {
        let type_id = arch.read_string()?;
        let version = arch.read_i16()? as u16;

        let factory = self
            .factories
            .get(type_id.as_str())
            .ok_or(())
            .or_else(|_| err_at!(ArchiveFormat, msg: "unregistered type tag {:?}", type_id))?;

        let mut obj = factory();
        if version > obj.version() {
            return err_at!(
                ArchiveFormat,
                msg: "type {:?} on disk is version {}, newer than supported version {}",
                type_id,
                version,
                obj.version()
            );
        }
        obj.read_body(version, arch)?;
        Ok(obj)
    }
}

#[cfg(test)]
#[path = "serialize_test.rs"]
mod serialize_test;
