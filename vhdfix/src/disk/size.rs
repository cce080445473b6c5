//! Output size calculation.

use vhdfix_shared::constants::alignment::MB;

/// Compute the output size for an image of `size_bytes`.
///
/// Rounds down to a whole MB and adds one more MB, so the result is always
/// a multiple of 1 MB and strictly larger than the input. An input that is
/// already aligned still grows by a full MB.
///
/// Returns `None` only when the result would not fit in a `u64`.
pub fn checked_target_size(size_bytes: u64) -> Option<u64> {
    (size_bytes / MB).checked_add(1)?.checked_mul(MB)
}

/// Infallible form of [`checked_target_size`].
///
/// # Panics
/// Panics if `size_bytes` is within one MB of `u64::MAX`. The pipeline uses
/// the checked form.
pub fn calc_target_size(size_bytes: u64) -> u64 {
    checked_target_size(size_bytes).expect("target size overflows u64")
}
