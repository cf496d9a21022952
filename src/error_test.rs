use super::*;

#[test]
fn test_err_at_from_result() {
    let r: result::Result<(), std::io::Error> =
        Err(std::io::Error::new(std::io::ErrorKind::Other, "boom"));
    let got: Result<()> = err_at!(IOError, r);
    match got {
        Err(Error::IOError(msg)) => assert!(msg.contains("boom")),
        _ => panic!("expected IOError"),
    }
}

#[test]
fn test_err_at_msg() {
    let got: Result<()> = err_at!(Fatal, msg: "bad {} at {}", "thing", 7);
    match got {
        Err(Error::Fatal(msg)) => assert!(msg.contains("bad thing at 7")),
        _ => panic!("expected Fatal"),
    }
}

#[test]
fn test_err_at_with_context() {
    let r: result::Result<(), &str> = Err("nope");
    let got: Result<()> = err_at!(ArchiveIO, r, "reading block {}", 3);
    match got {
        Err(Error::ArchiveIO(msg)) => {
            assert!(msg.contains("reading block 3"));
            assert!(msg.contains("nope"));
        }
        _ => panic!("expected ArchiveIO"),
    }
}

#[test]
fn test_display_includes_kind() {
    let e = Error::BadAddress("src/x.rs:1 oops".to_string());
    assert!(format!("{}", e).starts_with("BadAddress:"));
}
