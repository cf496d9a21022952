use super::*;

#[test]
fn test_intern_returns_same_id_for_same_string() {
    let mut t = NameTable::new();
    let a = t.intern("hello");
    let b = t.intern("hello");
    assert_eq!(a, b);
}

#[test]
fn test_intern_distinct_strings_get_distinct_ids() {
    let mut t = NameTable::new();
    let a = t.intern("foo");
    let b = t.intern("bar");
    assert_ne!(a, b);
    assert_eq!(t.get(a), "foo");
    assert_eq!(t.get(b), "bar");
}

#[test]
fn test_uppercase_entry_links_to_lowercase_entry() {
    let mut t = NameTable::new();
    let upper = t.intern("README");
    let lower_id = t.lowercase_of(upper);
    assert_ne!(lower_id, upper);
    assert_eq!(t.get(lower_id), "readme");
    assert!(t.is_own_lowercase(lower_id));
}

#[test]
fn test_already_lowercase_is_its_own_lowercase() {
    let mut t = NameTable::new();
    let id = t.intern("already-lower");
    assert!(t.is_own_lowercase(id));
    assert_eq!(t.lowercase_of(id), id);
}

#[test]
fn test_interning_lowercase_form_separately_reuses_link() {
    let mut t = NameTable::new();
    let upper = t.intern("Mixed");
    let lower = t.intern("mixed");
    assert_eq!(t.lowercase_of(upper), lower);
}

#[test]
fn test_clear_resets_table_and_memory() {
    let mut t = NameTable::new();
    t.intern("one");
    t.intern("two");
    assert!(t.total_mem_usage() > 0);
    t.clear();
    assert_eq!(t.len(), 0);
    assert_eq!(t.total_mem_usage(), 0);
}

#[test]
fn test_growheap_spans_multiple_chunks() {
    let mut h = GrowHeap::new(16, 16);
    let (c0, o0) = h.alloc(10);
    h.write(c0, o0, &[1u8; 10]);
    let (c1, o1) = h.alloc(10);
    h.write(c1, o1, &[2u8; 10]);
    assert_ne!(c0, c1);
    assert_eq!(h.read(c0, o0, 10), &[1u8; 10]);
    assert_eq!(h.read(c1, o1, 10), &[2u8; 10]);
}

#[test]
fn test_growheap_total_mem_usage_excludes_unused_tail() {
    let mut h = GrowHeap::new(64, 64);
    h.alloc(10);
    assert_eq!(h.total_mem_usage(), 10);
}

#[test]
fn test_growheap_oversized_request_gets_its_own_chunk() {
    let mut h = GrowHeap::new(16, 16);
    let (_c, o) = h.alloc(100);
    assert_eq!(o, 0);
}
