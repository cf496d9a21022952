use super::*;

fn temp_path(tag: &str) -> std::path::PathBuf {
    let p = std::env::temp_dir().join(format!("tripwire-recfile-test-{}-{}", tag, std::process::id()));
    let _ = std::fs::remove_file(&p);
    p
}

#[test]
fn test_add_and_read_round_trip() {
    let path = temp_path("roundtrip");
    let mut rf = RecordFile::create(&path, 4).unwrap();
    let addr = rf.add_item(b"payload").unwrap();
    assert_eq!(rf.get_data_for_reading(addr).unwrap(), b"payload");
    let _ = std::fs::remove_file(&path);
}

#[test]
fn test_grows_new_block_when_current_is_full() {
    let path = temp_path("grow");
    let mut rf = RecordFile::create(&path, 4).unwrap();

    let chunk = vec![0x5Au8; crate::recarr::MAX_DATA_SIZE / 3];
    let mut addrs = Vec::new();
    for _ in 0..6 {
        addrs.push(rf.add_item(&chunk).unwrap());
    }

    assert!(addrs.iter().any(|a| a.block_num > 0));
    for a in addrs {
        assert_eq!(rf.get_data_for_reading(a).unwrap(), chunk.as_slice());
    }
    let _ = std::fs::remove_file(&path);
}

#[test]
fn test_remove_item_invalidates_address() {
    let path = temp_path("remove");
    let mut rf = RecordFile::create(&path, 4).unwrap();
    let addr = rf.add_item(b"gone soon").unwrap();
    rf.remove_item(addr).unwrap();
    assert!(!rf.is_valid_addr(addr).unwrap());
    assert!(rf.get_data_for_reading(addr).is_err());
    let _ = std::fs::remove_file(&path);
}

#[test]
fn test_reject_oversized_record() {
    let path = temp_path("oversized");
    let mut rf = RecordFile::create(&path, 4).unwrap();
    let huge = vec![0u8; crate::recarr::MAX_DATA_SIZE + 1];
    assert!(rf.add_item(&huge).is_err());
    let _ = std::fs::remove_file(&path);
}

#[test]
fn test_survives_close_and_reopen() {
    let path = temp_path("reopen");
    let addr = {
        let mut rf = RecordFile::create(&path, 4).unwrap();
        let addr = rf.add_item(b"durable").unwrap();
        rf.close().unwrap();
        addr
    };
    {
        let mut rf = RecordFile::open(&path, 4).unwrap();
        assert_eq!(rf.get_data_for_reading(addr).unwrap(), b"durable");
    }
    let _ = std::fs::remove_file(&path);
}

#[test]
fn test_get_data_for_writing_mutates_record() {
    let path = temp_path("mutate");
    let mut rf = RecordFile::create(&path, 4).unwrap();
    let addr = rf.add_item(b"0000").unwrap();
    rf.get_data_for_writing(addr).unwrap().copy_from_slice(b"9999");
    assert_eq!(rf.get_data_for_reading(addr).unwrap(), b"9999");
    let _ = std::fs::remove_file(&path);
}
