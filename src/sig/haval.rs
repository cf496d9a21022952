//! HAVAL, 3-pass / 128-bit output. No public crate implements this
//! algorithm, so it is hand-rolled here, transliterating the original
//! round functions and message/constant schedules into safe Rust.

const INIT: [u32; 8] = [
    0x243F_6A88,
    0x85A3_08D3,
    0x1319_8A2E,
    0x0370_7344,
    0xA409_3822,
    0x299F_31D0,
    0x082E_FA98,
    0xEC4E_6C89,
];

const PASS: u8 = 3;
const HAVAL_VERSION: u8 = 1;
const FPTLEN: u32 = 128;

const PASS2_WORDS: [usize; 32] = [
    5, 14, 26, 18, 11, 28, 7, 16, 0, 23, 20, 22, 1, 10, 4, 8, 30, 3, 21, 9, 17, 24, 29, 6, 19, 12,
    15, 13, 2, 25, 31, 27,
];

const PASS2_CONSTS: [u32; 32] = [
    0x4528_21E6,
    0x38D0_1377,
    0xBE54_66CF,
    0x34E9_0C6C,
    0xC0AC_29B7,
    0xC97C_50DD,
    0x3F84_D5B5,
    0xB547_0917,
    0x9216_D5D9,
    0x8979_FB1B,
    0xD131_0BA6,
    0x98DF_B5AC,
    0x2FFD_72DB,
    0xD01A_DFB7,
    0xB8E1_AFED,
    0x6A26_7E96,
    0xBA7C_9045,
    0xF12C_7F99,
    0x24A1_9947,
    0xB391_6CF7,
    0x0801_F2E2,
    0x858E_FC16,
    0x6369_20D8,
    0x7157_4E69,
    0xA458_FEA3,
    0xF493_3D7E,
    0x0D95_748F,
    0x728E_B658,
    0x718B_CD58,
    0x8215_4AEE,
    0x7B54_A41D,
    0xC25A_59B5,
];

const PASS3_WORDS: [usize; 32] = [
    19, 9, 4, 20, 28, 17, 8, 22, 29, 14, 25, 12, 24, 30, 16, 26, 31, 15, 7, 3, 1, 0, 18, 27, 13,
    6, 21, 10, 23, 11, 5, 2,
];

const PASS3_CONSTS: [u32; 32] = [
    0x9C30_D539,
    0x2AF2_6013,
    0xC5D1_B023,
    0x2860_85F0,
    0xCA41_7918,
    0xB8DB_38EF,
    0x8E79_DCB0,
    0x603A_180E,
    0x6C9E_0E8B,
    0xB01E_8A3E,
    0xD715_77C1,
    0xBD31_4B27,
    0x78AF_2FDA,
    0x5560_5C60,
    0xE655_25F3,
    0xAA55_AB94,
    0x5748_9862,
    0x63E8_1440,
    0x55CA_396A,
    0x2AAB_10B6,
    0xB4CC_5C34,
    0x1141_E8CE,
    0xA154_86AF,
    0x7C72_E993,
    0xB3EE_1411,
    0x636F_BC2A,
    0x2BA9_C55D,
    0x7418_31F6,
    0xCE5C_3E16,
    0x9B87_931E,
    0xAFD6_BA33,
    0x6C24_CF5C,
];

const PADDING_FIRST: u8 = 0x80;

fn f1(x6: u32, x5: u32, x4: u32, x3: u32, x2: u32, x1: u32, x0: u32) -> u32 {
    (x1 & (x0 ^ x4)) ^ (x2 & x5) ^ (x3 & x6) ^ x0
}

fn f2(x6: u32, x5: u32, x4: u32, x3: u32, x2: u32, x1: u32, x0: u32) -> u32 {
    (x2 & ((x1 & !x3) ^ (x4 & x5) ^ x6 ^ x0)) ^ (x4 & (x1 ^ x5)) ^ (x3 & x5) ^ x0
}

fn f3(x6: u32, x5: u32, x4: u32, x3: u32, x2: u32, x1: u32, x0: u32) -> u32 {
    (x3 & ((x1 & x2) ^ x6 ^ x0)) ^ (x1 & x4) ^ (x2 & x5) ^ x0
}

fn phi1(x6: u32, x5: u32, x4: u32, x3: u32, x2: u32, x1: u32, x0: u32) -> u32 {
    f1(x1, x0, x3, x5, x6, x2, x4)
}

fn phi2(x6: u32, x5: u32, x4: u32, x3: u32, x2: u32, x1: u32, x0: u32) -> u32 {
    f2(x4, x2, x1, x0, x5, x3, x6)
}

fn phi3(x6: u32, x5: u32, x4: u32, x3: u32, x2: u32, x1: u32, x0: u32) -> u32 {
    f3(x6, x1, x2, x3, x4, x5, x0)
}

fn ff1(x6: u32, x5: u32, x4: u32, x3: u32, x2: u32, x1: u32, x0: u32, x7: u32, w: u32) -> u32 {
    let temp = phi1(x6, x5, x4, x3, x2, x1, x0);
    temp.rotate_right(7).wrapping_add(x7.rotate_right(11)).wrapping_add(w)
}

fn ff2(
    x6: u32,
    x5: u32,
    x4: u32,
    x3: u32,
    x2: u32,
    x1: u32,
    x0: u32,
    x7: u32,
    w: u32,
    c: u32,
) -> u32 {
    let temp = phi2(x6, x5, x4, x3, x2, x1, x0);
    temp.rotate_right(7).wrapping_add(x7.rotate_right(11)).wrapping_add(w).wrapping_add(c)
}

fn ff3(
    x6: u32,
    x5: u32,
    x4: u32,
    x3: u32,
    x2: u32,
    x1: u32,
    x0: u32,
    x7: u32,
    w: u32,
    c: u32,
) -> u32 {
    let temp = phi3(x6, x5, x4, x3, x2, x1, x0);
    temp.rotate_right(7).wrapping_add(x7.rotate_right(11)).wrapping_add(w).wrapping_add(c)
}

/// The other 7 of the 8 running words, in the order the macros expect:
/// descending from `k - 1` and wrapping around.
fn other7(t: &[u32; 8], k: usize) -> [u32; 7] {
    let mut out = [0u32; 7];
    for (i, slot) in out.iter_mut().enumerate() {
        *slot = t[(k + 8 - 1 - i) % 8];
    }
    out
}

fn hash_block(fingerprint: &mut [u32; 8], w: &[u32; 32]) {
    let mut t = *fingerprint;

    for (s, &word) in w.iter().enumerate() {
        let k = (7 - (s % 8)) % 8;
        let a = other7(&t, k);
        t[k] = ff1(a[0], a[1], a[2], a[3], a[4], a[5], a[6], t[k], word);
    }
    for s in 0..32 {
        let k = (7 - (s % 8)) % 8;
        let a = other7(&t, k);
        t[k] = ff2(a[0], a[1], a[2], a[3], a[4], a[5], a[6], t[k], w[PASS2_WORDS[s]], PASS2_CONSTS[s]);
    }
    for s in 0..32 {
        let k = (7 - (s % 8)) % 8;
        let a = other7(&t, k);
        t[k] = ff3(a[0], a[1], a[2], a[3], a[4], a[5], a[6], t[k], w[PASS3_WORDS[s]], PASS3_CONSTS[s]);
    }

    for i in 0..8 {
        fingerprint[i] = fingerprint[i].wrapping_add(t[i]);
    }
}

fn tailor(fingerprint: &mut [u32; 8]) {
    let f = *fingerprint;
    let temp0 = (f[7] & 0x0000_00FF) | (f[6] & 0xFF00_0000) | (f[5] & 0x00FF_0000) | (f[4] & 0x0000_FF00);
    fingerprint[0] = fingerprint[0].wrapping_add(temp0.rotate_right(8));

    let temp1 = (f[7] & 0x0000_FF00) | (f[6] & 0x0000_00FF) | (f[5] & 0xFF00_0000) | (f[4] & 0x00FF_0000);
    fingerprint[1] = fingerprint[1].wrapping_add(temp1.rotate_right(16));

    let temp2 = (f[7] & 0x00FF_0000) | (f[6] & 0x0000_FF00) | (f[5] & 0x0000_00FF) | (f[4] & 0xFF00_0000);
    fingerprint[2] = fingerprint[2].wrapping_add(temp2.rotate_right(24));

    let temp3 = (f[7] & 0xFF00_0000) | (f[6] & 0x00FF_0000) | (f[5] & 0x0000_FF00) | (f[4] & 0x0000_00FF);
    fingerprint[3] = fingerprint[3].wrapping_add(temp3);
}

/// Streaming HAVAL-3/128 state.
pub struct Haval {
    fingerprint: [u32; 8],
    total_bytes: u64,
    rem: Vec<u8>,
}

impl Haval {
    pub fn new() -> Self {
        let mut h = Haval { fingerprint: INIT, total_bytes: 0, rem: Vec::with_capacity(128) };
        h.init();
        h
    }

    pub fn init(&mut self) {
        self.fingerprint = INIT;
        self.total_bytes = 0;
        self.rem.clear();
    }

    pub fn update(&mut self, data: &[u8]) {
        self.total_bytes += data.len() as u64;
        self.rem.extend_from_slice(data);
        while self.rem.len() >= 128 {
            let mut w = [0u32; 32];
            for i in 0..32 {
                let o = i * 4;
                w[i] = u32::from_le_bytes([self.rem[o], self.rem[o + 1], self.rem[o + 2], self.rem[o + 3]]);
            }
            hash_block(&mut self.fingerprint, &w);
            self.rem.drain(..128);
        }
    }

    pub fn finit(&mut self) -> [u8; 16] {
        let bit_len = self.total_bytes.wrapping_mul(8);
        let rmd_len = (self.rem.len() % 128) as u32;
        let pad_len = if rmd_len < 118 { 118 - rmd_len } else { 246 - rmd_len };

        let mut padding = vec![0u8; pad_len as usize];
        padding[0] = PADDING_FIRST;
        self.update(&padding.clone());
        // undo the byte-count bump from the synthetic padding update: only
        // the original message length is encoded in the tail.
        self.total_bytes -= pad_len as u64;

        let mut tail = [0u8; 10];
        tail[0] = (((FPTLEN & 0x3) as u8) << 6) | ((PASS & 0x7) << 3) | (HAVAL_VERSION & 0x7);
        tail[1] = ((FPTLEN >> 2) & 0xFF) as u8;
        let count0 = (bit_len & 0xFFFF_FFFF) as u32;
        let count1 = (bit_len >> 32) as u32;
        tail[2..6].copy_from_slice(&count0.to_le_bytes());
        tail[6..10].copy_from_slice(&count1.to_le_bytes());
        self.update(&tail.clone());
        self.total_bytes -= 10;

        tailor(&mut self.fingerprint);

        let mut out = [0u8; 16];
        for i in 0..4 {
            out[i * 4..i * 4 + 4].copy_from_slice(&self.fingerprint[i].to_le_bytes());
        }
        out
    }
}

impl Default for Haval {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod haval_unit_test {
    use super::*;

    #[test]
    fn test_empty_and_nonempty_differ() {
        let mut h = Haval::new();
        let d1 = h.finit();
        h.init();
        h.update(b"abc");
        let d2 = h.finit();
        assert_ne!(d1, d2);
    }

    #[test]
    fn test_chunked_update_matches_single_update() {
        let mut h1 = Haval::new();
        h1.update(b"the quick brown fox jumps over the lazy dog");
        let d1 = h1.finit();

        let mut h2 = Haval::new();
        h2.update(b"the quick brown ");
        h2.update(b"fox jumps over ");
        h2.update(b"the lazy dog");
        let d2 = h2.finit();

        assert_eq!(d1, d2);
    }

    #[test]
    fn test_reinit_is_reusable() {
        let mut h = Haval::new();
        h.update(b"first");
        let _ = h.finit();
        h.init();
        h.update(b"first");
        let d1 = h.finit();

        let mut h2 = Haval::new();
        h2.update(b"first");
        let d2 = h2.finit();
        assert_eq!(d1, d2);
    }
}
