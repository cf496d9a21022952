use super::*;
use crate::archive::MemArchive;

#[test]
fn test_md5_known_vectors() {
    let mut h = MD5::default();
    h.init();
    assert_eq!(h.finit().to_hex(), "d41d8cd98f00b204e9800998ecf8427e");

    h.init();
    h.update(b"abc");
    assert_eq!(h.finit().to_hex(), "900150983cd24fb0d6963f7d28e17f72");
}

#[test]
fn test_sha1_known_vectors() {
    let mut h = SHA1::default();
    h.init();
    assert_eq!(h.finit().to_hex(), "da39a3ee5e6b4b0d3255bfef95601890afd80709");

    h.init();
    h.update(b"abc");
    assert_eq!(h.finit().to_hex(), "a9993e364706816aba3e25717850c26c9cd0d89d");

    h.init();
    h.update(b"abcdbcdecdefdefgefghfghighijhijkijkljklmklmnlmnomnopnopq");
    assert_eq!(h.finit().to_hex(), "84983e441c3bd26ebaae4aa1f95129e5e54670f1");
}

#[test]
fn test_checksum_is_byte_sum() {
    let mut h = Checksum::default();
    h.init();
    h.update(&[1, 2, 3, 4]);
    match h.finit() {
        Digest::Checksum(b) => assert_eq!(u64::from_be_bytes(b), 10),
        _ => panic!("wrong kind"),
    }
}

#[test]
fn test_update_accepts_chunks_and_zero_length() {
    let mut h = MD5::default();
    h.init();
    h.update(b"");
    h.update(b"a");
    h.update(b"bc");
    assert_eq!(h.finit().to_hex(), "900150983cd24fb0d6963f7d28e17f72");
}

#[test]
fn test_compare_same_kind() {
    let mut a = MD5::default();
    a.init();
    a.update(b"abc");
    let da = a.finit();

    let mut b = MD5::default();
    b.init();
    b.update(b"abc");
    let db = b.finit();

    assert!(da.compare(&db).unwrap());
}

#[test]
fn test_compare_mismatched_kinds_is_sig_mismatch() {
    let mut a = MD5::default();
    a.init();
    let da = a.finit();

    let mut b = SHA1::default();
    b.init();
    let db = b.finit();

    assert!(da.compare(&db).is_err());
}

#[test]
fn test_base64_no_padding_custom_alphabet() {
    assert_eq!(to_base64(b"abc"), "YWJj");
    assert_eq!(to_base64(b"ab"), "YWI");
    assert_eq!(to_base64(b""), "");
}

#[test]
fn test_hex_is_lowercase_no_separator() {
    assert_eq!(to_hex(&[0xDE, 0xAD, 0xBE, 0xEF]), "deadbeef");
}

#[test]
fn test_archive_sig_gen_single_pass_multiple_hashers() {
    let mut arch = MemArchive::from_vec(b"abc".to_vec());
    let mut gen = ArchiveSigGen::new(&[Algorithm::Md5, Algorithm::Sha1]);
    let digests = gen.calculate(&mut arch).unwrap();
    assert_eq!(digests.len(), 2);
    assert_eq!(digests[0].to_hex(), "900150983cd24fb0d6963f7d28e17f72");
    assert_eq!(digests[1].to_hex(), "a9993e364706816aba3e25717850c26c9cd0d89d");
}

#[test]
fn test_archive_sig_gen_spans_multiple_blocks() {
    let data = vec![0x41u8; SUGGESTED_BLOCK_SIZE * 3 + 7];
    let mut arch = MemArchive::from_vec(data.clone());
    let mut gen = ArchiveSigGen::new(&[Algorithm::Md5]);
    let digests = gen.calculate(&mut arch).unwrap();

    let mut direct = MD5::default();
    direct.init();
    direct.update(&data);
    assert_eq!(digests[0], direct.finit());
}
