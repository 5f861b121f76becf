//! Decaying-split amount policy
//!
//! Each hop forwards a fraction of what it received (the rest is "peeled"
//! off as cash-outs), and a slot may withhold a fee from what it receives.
//! Parallel fan-outs divide the forwarded value with random integer weights.
//! All arithmetic is integer minor units.

use crate::models::FULL_BPS;
use crate::rng::RngManager;

/// Relative weight range used for parallel splits
const SPLIT_WEIGHT_MAX: i64 = 100;

/// Amount forwarded when `bps` of `value` moves on
///
/// Returns `None` when the result would be below one unit.
///
/// # Example
/// ```
/// use scenario_forge_core_rs::synthesis::amounts::forward_amount;
///
/// assert_eq!(forward_amount(10_000, 9_250), Some(9_250));
/// assert_eq!(forward_amount(1, 5_000), None);
/// ```
pub fn forward_amount(value: i64, bps: u32) -> Option<i64> {
    let forwarded = (value as i128 * bps as i128 / FULL_BPS as i128) as i64;
    (forwarded >= 1).then_some(forwarded)
}

/// Fee withheld when `bps` of `gross` is charged, truncated toward zero
///
/// With `bps` below [`FULL_BPS`] the fee never reaches `gross`, so a
/// positive gross always leaves a positive net amount.
pub fn fee_amount(gross: i64, bps: u32) -> i64 {
    (gross as i128 * bps as i128 / FULL_BPS as i128) as i64
}

/// Share of `value` represented by `amount`, in basis points
pub fn share_bps(amount: i64, value: i64) -> u32 {
    if value <= 0 {
        return 0;
    }
    (amount as i128 * FULL_BPS as i128 / value as i128).clamp(0, u32::MAX as i128) as u32
}

/// Split `total` into `parts` positive shares with random weights
///
/// Every share gets one unit first; the rest is distributed by weight and
/// the rounding remainder goes to the heaviest share (first on ties).
/// Returns `None` if `total < parts`.
pub fn split_amount(total: i64, parts: usize, rng: &mut RngManager) -> Option<Vec<i64>> {
    if parts == 0 || total < parts as i64 {
        return None;
    }

    let weights: Vec<i64> = (0..parts).map(|_| rng.range(1, SPLIT_WEIGHT_MAX + 1)).collect();
    let weight_sum: i64 = weights.iter().sum();
    let spare = total - parts as i64;

    let mut shares: Vec<i64> = weights
        .iter()
        .map(|w| 1 + (spare as i128 * *w as i128 / weight_sum as i128) as i64)
        .collect();

    let assigned: i64 = shares.iter().sum();
    let heaviest = weights
        .iter()
        .enumerate()
        .max_by(|(ia, a), (ib, b)| a.cmp(b).then(ib.cmp(ia)))
        .map(|(i, _)| i)
        .unwrap_or(0);
    shares[heaviest] += total - assigned;

    Some(shares)
}
