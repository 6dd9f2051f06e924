//! The 32-bit rolling hash shared by song ids and the legacy access policy.
//!
//! This hash is *not* a security primitive. It gives stable ids for
//! filenames and preserves the fingerprint format of legacy catalogs.

/// Width of a rendered fingerprint, in hex digits.
pub const FINGERPRINT_WIDTH: usize = 32;

/// `h = h * 31 + unit` over UTF-16 code units, wrapping at signed 32 bits,
/// returning the magnitude of the final value.
pub fn rolling_hash(input: &str) -> u32 {
    let hash = input.encode_utf16().fold(0i32, |h, unit| {
        h.wrapping_shl(5).wrapping_sub(h).wrapping_add(i32::from(unit))
    });
    hash.unsigned_abs()
}

/// Lowercase hex of [`rolling_hash`], left-padded with zeros to 32 digits.
pub fn fingerprint(password: &str) -> String {
    format!("{:0width$x}", rolling_hash(password), width = FINGERPRINT_WIDTH)
}

/// Compare a candidate password against a stored fingerprint.
///
/// The stored value is matched case-insensitively so hand-edited catalogs
/// with uppercase hex still work.
pub fn matches(password: &str, stored: &str) -> bool {
    fingerprint(password).eq_ignore_ascii_case(stored.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_matches_known_catalog_values() {
        assert_eq!(fingerprint("music123"), "000000000000000000000000324be1ed");
        assert_eq!(fingerprint("sunset99"), "00000000000000000000000066667bca");
    }

    #[test]
    fn fingerprint_is_fixed_width() {
        assert_eq!(fingerprint(""), "0".repeat(32));
        assert_eq!(fingerprint("a"), format!("{:0>32}", "61"));
        assert_eq!(fingerprint("a much longer passphrase than usual").len(), 32);
    }

    #[test]
    fn rolling_hash_takes_magnitude_of_negative_values() {
        // Wraps to -1993473881 before the magnitude is taken.
        assert_eq!(rolling_hash("correct horse"), 1_993_473_881);
        assert_eq!(fingerprint("correct horse"), "00000000000000000000000076d1ff59");
        assert_eq!(rolling_hash("song.mp3"), 0x5b71f297);
    }

    #[test]
    fn rolling_hash_uses_utf16_units() {
        // U+1F3B5 is a surrogate pair: two units, not one scalar.
        let single = rolling_hash("\u{1F3B5}");
        let hi = 0xD83Ci32;
        let lo = 0xDFB5i32;
        let expected = hi.wrapping_mul(31).wrapping_add(lo).unsigned_abs();
        assert_eq!(single, expected);
    }

    #[test]
    fn matches_ignores_hex_case_and_whitespace() {
        assert!(matches("music123", "000000000000000000000000324BE1ED "));
        assert!(!matches("music124", "000000000000000000000000324be1ed"));
    }
}
