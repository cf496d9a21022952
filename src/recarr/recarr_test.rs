use super::*;

fn temp_block_file(tag: &str) -> BlockFile {
    let path = std::env::temp_dir().join(format!("tripwire-recarr-test-{}-{}", tag, std::process::id()));
    let _ = std::fs::remove_file(&path);
    BlockFile::create(&path, 4).unwrap()
}

#[test]
fn test_add_and_read_single_item() {
    let mut bf = temp_block_file("single");
    let mut ra = RecordArray::new(0);
    ra.init_new_block(&mut bf).unwrap();

    let idx = ra.add_item(&mut bf, b"hello", 42).unwrap();
    assert_eq!(idx, 0);
    assert_eq!(ra.num_items(), 1);
    assert_eq!(ra.get_data_for_reading(&mut bf, idx).unwrap(), b"hello");
    assert_eq!(ra.main_index_of(&mut bf, idx).unwrap(), 42);
}

#[test]
fn test_add_multiple_items_preserves_each() {
    let mut bf = temp_block_file("multi");
    let mut ra = RecordArray::new(0);
    ra.init_new_block(&mut bf).unwrap();

    let i0 = ra.add_item(&mut bf, b"aaa", 1).unwrap();
    let i1 = ra.add_item(&mut bf, b"bb", 2).unwrap();
    let i2 = ra.add_item(&mut bf, b"c", 3).unwrap();

    assert_eq!(ra.get_data_for_reading(&mut bf, i0).unwrap(), b"aaa");
    assert_eq!(ra.get_data_for_reading(&mut bf, i1).unwrap(), b"bb");
    assert_eq!(ra.get_data_for_reading(&mut bf, i2).unwrap(), b"c");
    assert_eq!(ra.num_items(), 3);
}

#[test]
fn test_delete_middle_item_shifts_correctly() {
    let mut bf = temp_block_file("delete-middle");
    let mut ra = RecordArray::new(0);
    ra.init_new_block(&mut bf).unwrap();

    let i0 = ra.add_item(&mut bf, b"aaa", 1).unwrap();
    let i1 = ra.add_item(&mut bf, b"bbbb", 2).unwrap();
    let i2 = ra.add_item(&mut bf, b"cc", 3).unwrap();

    ra.delete_item(&mut bf, i1).unwrap();

    assert!(!ra.is_item_valid(&mut bf, i1).unwrap());
    assert_eq!(ra.get_data_for_reading(&mut bf, i0).unwrap(), b"aaa");
    assert_eq!(ra.get_data_for_reading(&mut bf, i2).unwrap(), b"cc");
}

#[test]
fn test_delete_last_item_shrinks_num_items() {
    let mut bf = temp_block_file("delete-last");
    let mut ra = RecordArray::new(0);
    ra.init_new_block(&mut bf).unwrap();

    let i0 = ra.add_item(&mut bf, b"x", 1).unwrap();
    let i1 = ra.add_item(&mut bf, b"y", 2).unwrap();
    ra.delete_item(&mut bf, i1).unwrap();

    assert_eq!(ra.num_items(), 1);
    assert_eq!(ra.get_data_for_reading(&mut bf, i0).unwrap(), b"x");
}

#[test]
fn test_freed_slot_is_reused_by_next_add() {
    let mut bf = temp_block_file("reuse");
    let mut ra = RecordArray::new(0);
    ra.init_new_block(&mut bf).unwrap();

    let i0 = ra.add_item(&mut bf, b"a", 1).unwrap();
    let i1 = ra.add_item(&mut bf, b"b", 2).unwrap();
    let _i2 = ra.add_item(&mut bf, b"c", 3).unwrap();
    ra.delete_item(&mut bf, i1).unwrap();

    let reused = ra.add_item(&mut bf, b"zz", 9).unwrap();
    assert_eq!(reused, i1);
    assert_eq!(ra.get_data_for_reading(&mut bf, reused).unwrap(), b"zz");
    assert_eq!(ra.get_data_for_reading(&mut bf, i0).unwrap(), b"a");
}

#[test]
fn test_get_data_for_writing_mutates_in_place() {
    let mut bf = temp_block_file("write");
    let mut ra = RecordArray::new(0);
    ra.init_new_block(&mut bf).unwrap();

    let idx = ra.add_item(&mut bf, b"abcd", 7).unwrap();
    {
        let data = ra.get_data_for_writing(&mut bf, idx).unwrap();
        data.copy_from_slice(b"ZZZZ");
    }
    assert_eq!(ra.get_data_for_reading(&mut bf, idx).unwrap(), b"ZZZZ");
}

#[test]
fn test_add_item_rejects_oversized_data() {
    let mut bf = temp_block_file("oversized");
    let mut ra = RecordArray::new(0);
    ra.init_new_block(&mut bf).unwrap();

    let huge = vec![0u8; MAX_DATA_SIZE + 1];
    assert!(ra.add_item(&mut bf, &huge, 1).is_err());
}

#[test]
fn test_add_item_rejects_empty_data() {
    let mut bf = temp_block_file("empty-data");
    let mut ra = RecordArray::new(0);
    ra.init_new_block(&mut bf).unwrap();
    assert!(ra.add_item(&mut bf, b"", 1).is_err());
}

#[test]
fn test_reopen_existing_block_recovers_state() {
    let path = std::env::temp_dir().join(format!("tripwire-recarr-test-reopen-{}", std::process::id()));
    let _ = std::fs::remove_file(&path);
    {
        let mut bf = BlockFile::create(&path, 4).unwrap();
        let mut ra = RecordArray::new(0);
        ra.init_new_block(&mut bf).unwrap();
        ra.add_item(&mut bf, b"persisted", 5).unwrap();
        bf.close().unwrap();
    }
    {
        let mut bf = BlockFile::open(&path, 4).unwrap();
        let mut ra = RecordArray::new(0);
        ra.init_for_existing_block(&mut bf).unwrap();
        assert_eq!(ra.num_items(), 1);
        assert_eq!(ra.get_data_for_reading(&mut bf, 0).unwrap(), b"persisted");
    }
    let _ = std::fs::remove_file(&path);
}
