/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Defines [Rate], a fixed-point decimal used throughout the reward and slash engines.
//!
//! Rates (network fee, storage cost, upload/vote/timeout slash) are expressed as decimals with a
//! fixed precision of [Rate::PRECISION] digits, represented internally as an integer numerator
//! over a fixed denominator. All multiplications truncate (floor) rather than round, so that
//! every replica derives the exact same integer result from the same inputs.

/// A non-negative fixed-point rate, e.g. `0.025` for a 2.5% fee.
///
/// Internally stored as parts-per-[Rate::DENOM], so `Rate::from_parts(25_000)` represents 2.5%
/// when `DENOM == 1_000_000`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Rate {
    parts: u64,
}

impl Rate {
    /// Denominator backing the fixed-point representation (six decimal digits of precision).
    pub const DENOM: u64 = 1_000_000;

    /// Number of base-10 digits of precision `DENOM` provides.
    pub const PRECISION: u32 = 6;

    /// A rate of exactly zero.
    pub const ZERO: Rate = Rate { parts: 0 };

    /// A rate of exactly one (100%).
    pub const ONE: Rate = Rate { parts: Self::DENOM };

    /// Builds a rate from a raw parts-per-[DENOM](Self::DENOM) value. Callers computing rates
    /// from percentages should multiply accordingly, e.g. `Rate::from_parts(pct as u64 * 10_000)`
    /// for a whole-percentage integer.
    pub const fn from_parts(parts: u64) -> Self {
        Self { parts }
    }

    /// Builds a rate from a whole-number percentage in `[0, 100]`.
    pub const fn from_percent(pct: u8) -> Self {
        Self {
            parts: (pct as u64) * (Self::DENOM / 100),
        }
    }

    /// Returns the raw parts-per-[DENOM](Self::DENOM) value.
    pub const fn parts(&self) -> u64 {
        self.parts
    }

    /// Computes `floor(self * amount)` using 128-bit intermediate precision to avoid overflow.
    pub fn mul_floor(&self, amount: u64) -> u64 {
        ((amount as u128 * self.parts as u128) / Self::DENOM as u128) as u64
    }
}

/// Splits `total` into a named part (`floor(rate * total)`) and a residue (`total - named_part`),
/// always deriving the residue by a single subtraction so rounding loss never silently vanishes;
/// it is attributed to whichever side the caller passes as the residue.
pub fn split_floor(total: u64, rate: Rate) -> (u64, u64) {
    let named = rate.mul_floor(total);
    (named, total.saturating_sub(named))
}
