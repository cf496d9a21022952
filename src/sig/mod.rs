//! Streaming signature engine: a handful of hashers sharing one
//! `init -> update* -> finit -> digest` contract, plus a batch driver
//! that computes all of them in a single pass over an archive.

mod haval;

use md5::{Digest as Md5Digest, Md5};
use sha1::{Digest as Sha1Digest, Sha1};

use crate::archive::BidirArchive;
use crate::{err_at, Result};

/// Block size the batch driver reads at a time. Matches the block-file's
/// own page size, so a full pass over the database and a full pass over
/// a watched file use the same I/O granularity.
pub const SUGGESTED_BLOCK_SIZE: usize = 0x1000;

const B64_ALPHABET: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

/// Render `bytes` as base64 using the legacy alphabet, big-endian
/// bit-packed, with no padding characters.
pub fn to_base64(bytes: &[u8]) -> String {
    let mut out = String::with_capacity((bytes.len() * 4 + 2) / 3);
    let mut acc: u32 = 0;
    let mut bits = 0u32;
    for &b in bytes {
        acc = (acc << 8) | b as u32;
        bits += 8;
        while bits >= 6 {
            bits -= 6;
            let idx = (acc >> bits) & 0x3F;
            out.push(B64_ALPHABET[idx as usize] as char);
        }
    }
    if bits > 0 {
        let idx = (acc << (6 - bits)) & 0x3F;
        out.push(B64_ALPHABET[idx as usize] as char);
    }
    out
}

/// Render `bytes` as lowercase hex, two characters per byte, no
/// separator.
pub fn to_hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for &b in bytes {
        out.push_str(&format!("{:02x}", b));
    }
    out
}

/// A concrete digest algorithm. Every variant carries its finished
/// digest bytes; comparison is only ever equal between the same variant.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Digest {
    Checksum([u8; 8]),
    Crc32([u8; 4]),
    Md5([u8; 16]),
    Sha1([u8; 20]),
    Haval([u8; 16]),
}

impl Digest {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Digest::Checksum(b) => b.as_ref(),
            Digest::Crc32(b) => b.as_ref(),
            Digest::Md5(b) => b.as_ref(),
            Digest::Sha1(b) => b.as_ref(),
            Digest::Haval(b) => b.as_ref(),
        }
    }

    pub fn to_base64(&self) -> String {
        to_base64(self.as_bytes())
    }

    pub fn to_hex(&self) -> String {
        to_hex(self.as_bytes())
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Digest::Checksum(_) => "checksum",
            Digest::Crc32(_) => "crc32",
            Digest::Md5(_) => "md5",
            Digest::Sha1(_) => "sha1",
            Digest::Haval(_) => "haval",
        }
    }

    /// Equal only between digests of the same algorithm; mismatched kinds
    /// surface as `SigMismatch` rather than silently returning false, so
    /// the caller can't mistake "incomparable" for "different."
    pub fn compare(&self, other: &Digest) -> Result<bool> {
        if self.kind() != other.kind() {
            return err_at!(
                SigMismatch, msg: "cannot compare {} against {}", self.kind(), other.kind()
            );
        }
        Ok(self.as_bytes() == other.as_bytes())
    }
}

/// The streaming hasher contract every concrete algorithm implements.
pub trait Signature {
    fn init(&mut self);
    fn update(&mut self, data: &[u8]);
    fn finit(&mut self) -> Digest;
}

#[derive(Default)]
pub struct Checksum {
    sum: u64,
}

impl Signature for Checksum {
    fn init(&mut self) {
        self.sum = 0;
    }

    fn update(&mut self, data: &[u8]) {
        for &b in data {
            self.sum = self.sum.wrapping_add(b as u64);
        }
    }

    fn finit(&mut self) -> Digest {
        let d = Digest::Checksum(self.sum.to_be_bytes());
        self.sum = 0;
        d
    }
}

#[derive(Default)]
pub struct Crc32 {
    hasher: Option<crc32fast::Hasher>,
}

impl Signature for Crc32 {
    fn init(&mut self) {
        self.hasher = Some(crc32fast::Hasher::new());
    }

    fn update(&mut self, data: &[u8]) {
        self.hasher.get_or_insert_with(crc32fast::Hasher::new).update(data);
    }

    fn finit(&mut self) -> Digest {
        let h = self.hasher.take().unwrap_or_default();
        Digest::Crc32(h.finalize().to_be_bytes())
    }
}

#[derive(Default)]
pub struct MD5 {
    hasher: Md5,
}

impl Signature for MD5 {
    fn init(&mut self) {
        self.hasher = Md5::new();
    }

    fn update(&mut self, data: &[u8]) {
        self.hasher.update(data);
    }

    fn finit(&mut self) -> Digest {
        let out = std::mem::take(&mut self.hasher).finalize();
        let mut bytes = [0u8; 16];
        bytes.copy_from_slice(&out);
        Digest::Md5(bytes)
    }
}

#[derive(Default)]
pub struct SHA1 {
    hasher: Sha1,
}

impl Signature for SHA1 {
    fn init(&mut self) {
        self.hasher = Sha1::new();
    }

    fn update(&mut self, data: &[u8]) {
        self.hasher.update(data);
    }

    fn finit(&mut self) -> Digest {
        let out = std::mem::take(&mut self.hasher).finalize();
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&out);
        Digest::Sha1(bytes)
    }
}

#[derive(Default)]
pub struct Haval128 {
    inner: haval::Haval,
}

impl Signature for Haval128 {
    fn init(&mut self) {
        self.inner.init();
    }

    fn update(&mut self, data: &[u8]) {
        self.inner.update(data);
    }

    fn finit(&mut self) -> Digest {
        Digest::Haval(self.inner.finit())
    }
}

/// Which hashers a batch run computes.
#[derive(Clone, Copy, Debug, Eq, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Algorithm {
    Checksum,
    Crc32,
    Md5,
    Sha1,
    Haval,
}

fn make_hasher(algo: &Algorithm) -> Box<dyn Signature> {
    match algo {
        Algorithm::Checksum => Box::new(Checksum::default()),
        Algorithm::Crc32 => Box::new(Crc32::default()),
        Algorithm::Md5 => Box::new(MD5::default()),
        Algorithm::Sha1 => Box::new(SHA1::default()),
        Algorithm::Haval => Box::new(Haval128::default()),
    }
}

/// Drives N hashers over one bidirectional archive in a single sweep,
/// forwarding every block read to every registered hasher.
pub struct ArchiveSigGen {
    hashers: Vec<Box<dyn Signature>>,
}

impl ArchiveSigGen {
    pub fn new(algorithms: &[Algorithm]) -> Self {
        ArchiveSigGen { hashers: algorithms.iter().map(make_hasher).collect() }
    }

    /// Read `archive` from its current position to end in
    /// `SUGGESTED_BLOCK_SIZE` chunks, feeding every hasher, and return
    /// the resulting digests in registration order.
    pub fn calculate<A: BidirArchive>(&mut self, archive: &mut A) -> Result<Vec<Digest>> {
        for h in self.hashers.iter_mut() {
            h.init();
        }

        let mut buf = vec![0u8; SUGGESTED_BLOCK_SIZE];
        loop {
            let n = archive.read_blob(&mut buf)?;
            if n == 0 {
                break;
            }
            for h in self.hashers.iter_mut() {
                h.update(&buf[..n]);
            }
        }

        Ok(self.hashers.iter_mut().map(|h| h.finit()).collect())
    }
}

#[cfg(test)]
#[path = "sig_test.rs"]
mod sig_test;
