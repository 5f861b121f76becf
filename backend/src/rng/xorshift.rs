//! xorshift64* random number generator
//!
//! Fast, deterministic PRNG used for every random draw made while
//! synthesizing and labeling a scenario.
//!
//! # Algorithm
//!
//! xorshift64* is a variant of xorshift that passes TestU01's BigCrush
//! statistical tests. It uses 64-bit state and produces 64-bit output.
//!
//! # Determinism
//!
//! Same seed → same sequence of random numbers. Scenarios are regression
//! fixtures, so a `(template, seed)` pair must always rebuild the same graph.

use serde::{Deserialize, Serialize};

/// Deterministic random number generator using xorshift64*
///
/// # Example
/// ```
/// use scenario_forge_core_rs::RngManager;
///
/// let mut rng = RngManager::new(12345);
/// let value = rng.next();
/// let hop_count = rng.range(2, 6); // [2, 6)
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RngManager {
    /// Internal state (64-bit)
    state: u64,
}

impl RngManager {
    /// Create a new RNG with given seed
    ///
    /// A zero seed is remapped to 1 because xorshift never leaves the
    /// all-zero state.
    pub fn new(seed: u64) -> Self {
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Derive an independent stream from a seed.
    ///
    /// The seed is mixed with the stream id through splitmix64 so that
    /// labeling draws never shift the synthesis sequence for the same seed.
    ///
    /// # Example
    /// ```
    /// use scenario_forge_core_rs::RngManager;
    ///
    /// let mut a = RngManager::derive(42, 1);
    /// let mut b = RngManager::derive(42, 2);
    /// assert_ne!(a.next(), b.next());
    /// ```
    pub fn derive(seed: u64, stream: u64) -> Self {
        let mut z = seed ^ stream.wrapping_mul(0x9E37_79B9_7F4A_7C15);
        z = z.wrapping_add(0x9E37_79B9_7F4A_7C15);
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^= z >> 31;
        Self::new(z)
    }

    /// Generate next random u64 value
    pub fn next(&mut self) -> u64 {
        // xorshift64* algorithm
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545F4914F6CDD1D)
    }

    /// Generate random value in range [min, max)
    ///
    /// # Panics
    /// Panics if min >= max
    pub fn range(&mut self, min: i64, max: i64) -> i64 {
        assert!(min < max, "min must be less than max");

        let span = max.wrapping_sub(min) as u64;
        min.wrapping_add((self.next() % span) as i64)
    }

    /// Generate random value in range [min, max]
    ///
    /// Unlike [`range`](Self::range) a degenerate range (`min == max`) is
    /// allowed and returns `min` without consuming a draw. Bounds may reach
    /// `i64::MIN` and `i64::MAX`.
    ///
    /// # Panics
    /// Panics if min > max
    pub fn range_inclusive(&mut self, min: i64, max: i64) -> i64 {
        assert!(min <= max, "min must not exceed max");
        if min == max {
            return min;
        }
        let span = max.wrapping_sub(min) as u64;
        let value = self.next();
        match span.checked_add(1) {
            Some(size) => min.wrapping_add((value % size) as i64),
            // Full i64 domain
            None => value as i64,
        }
    }

    /// Pick an index in `[0, len)`.
    ///
    /// # Panics
    /// Panics if `len == 0`
    pub fn pick_index(&mut self, len: usize) -> usize {
        assert!(len > 0, "cannot pick from an empty collection");
        (self.next() % len as u64) as usize
    }

    /// Lowercase hex string of `len` digits, e.g. for synthetic addresses.
    pub fn hex_string(&mut self, len: usize) -> String {
        let mut out = String::with_capacity(len);
        while out.len() < len {
            let word = self.next();
            for shift in (0..16).rev() {
                if out.len() == len {
                    break;
                }
                let nibble = ((word >> (shift * 4)) & 0xF) as u32;
                // nibble is always < 16
                out.push(std::char::from_digit(nibble, 16).unwrap_or('0'));
            }
        }
        out
    }
}
