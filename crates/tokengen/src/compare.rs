//! Constant-time byte comparison.

/// Compares two byte slices without exiting early on the first mismatch.
///
/// Length is not treated as secret: slices of different length compare
/// unequal immediately. For equal lengths every byte pair is inspected, so
/// the running time depends only on the length.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}
