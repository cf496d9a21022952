use super::*;
use crate::archive::{MemArchive, Whence};

#[derive(Default)]
struct Widget {
    count: i32,
}

impl Serializable for Widget {
    fn type_id(&self) -> &'static str {
        "widget"
    }

    fn version(&self) -> u16 {
        1
    }

    fn write_body(&self, arch: &mut dyn Archive) -> Result<()> {
        arch.write_i32(self.count)
    }

    fn read_body(&mut self, _version: u16, arch: &mut dyn Archive) -> Result<()> {
        self.count = arch.read_i32()?;
        Ok(())
    }
}

fn make_widget() -> Box<dyn Serializable> {
    Box::new(Widget::default())
}

#[test]
fn test_round_trip_through_registry() {
    let mut reg = Registry::new();
    reg.register("widget", make_widget);

    let w = Widget { count: 42 };
    let mut arch = MemArchive::new();
    reg.write(&w, &mut arch).unwrap();
    arch.seek(0, Whence::Beginning).unwrap();

    let back = reg.read(&mut arch).unwrap();
    assert_eq!(back.type_id(), "widget");
}

#[test]
fn test_unregistered_tag_is_an_error() {
    let reg = Registry::new();
    let mut arch = MemArchive::new();
    arch.write_string("mystery").unwrap();
    arch.write_i16(1).unwrap();
    arch.seek(0, Whence::Beginning).unwrap();

    assert!(reg.read(&mut arch).is_err());
}

#[test]
fn test_newer_version_on_disk_is_fatal() {
    let mut reg = Registry::new();
    reg.register("widget", make_widget);

    let mut arch = MemArchive::new();
    arch.write_string("widget").unwrap();
    arch.write_i16(99).unwrap();
    arch.write_i32(7).unwrap();
    arch.seek(0, Whence::Beginning).unwrap();

    assert!(reg.read(&mut arch).is_err());
}

#[test]
fn test_reregistering_a_tag_replaces_the_factory() {
    let mut reg = Registry::new();
    reg.register("widget", make_widget);
    reg.register("widget", make_widget);
    assert_eq!(reg.factories.len(), 1);
}
