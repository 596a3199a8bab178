//! Native-coin amounts.
//!
//! Amounts are held as integer lamports (the ledger's smallest unit) so that
//! tolerance comparisons are exact. Conversion to and from the major unit
//! (SOL) happens only at the edges.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lamports in one SOL.
pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

/// An amount of the native coin, in lamports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Lamports(u64);

impl Lamports {
    pub const ZERO: Self = Self(0);

    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(&self) -> u64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Convert a major-unit amount to lamports, rounding to the nearest lamport.
    ///
    /// Returns `None` for zero, negative, non-finite or out-of-range inputs.
    pub fn from_sol(sol: f64) -> Option<Self> {
        if !sol.is_finite() || sol <= 0.0 {
            return None;
        }
        let raw = (sol * LAMPORTS_PER_SOL as f64).round();
        if raw < 1.0 || raw >= u64::MAX as f64 {
            return None;
        }
        Some(Self(raw as u64))
    }

    /// Major-unit value (lossy for very large amounts).
    pub fn as_sol(&self) -> f64 {
        self.0 as f64 / LAMPORTS_PER_SOL as f64
    }

    pub fn abs_diff(self, other: Self) -> Self {
        Self(self.0.abs_diff(other.0))
    }
}

impl fmt::Display for Lamports {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / LAMPORTS_PER_SOL;
        let frac = self.0 % LAMPORTS_PER_SOL;
        if frac == 0 {
            write!(f, "{whole} SOL")
        } else {
            let digits = format!("{frac:09}");
            write!(f, "{whole}.{} SOL", digits.trim_end_matches('0'))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_sol_rounds_to_nearest_lamport() {
        assert_eq!(Lamports::from_sol(1.5), Some(Lamports::new(1_500_000_000)));
        assert_eq!(Lamports::from_sol(0.1), Some(Lamports::new(100_000_000)));
        assert_eq!(Lamports::from_sol(0.000_000_001), Some(Lamports::new(1)));
    }

    #[test]
    fn from_sol_rejects_non_positive() {
        assert_eq!(Lamports::from_sol(0.0), None);
        assert_eq!(Lamports::from_sol(-1.0), None);
        assert_eq!(Lamports::from_sol(f64::NAN), None);
        assert_eq!(Lamports::from_sol(f64::INFINITY), None);
        assert_eq!(Lamports::from_sol(0.000_000_000_1), None);
    }

    #[test]
    fn display_trims_fraction() {
        assert_eq!(Lamports::new(2 * LAMPORTS_PER_SOL).to_string(), "2 SOL");
        assert_eq!(Lamports::new(1_250_000_000).to_string(), "1.25 SOL");
        assert_eq!(Lamports::new(1).to_string(), "0.000000001 SOL");
    }

    #[test]
    fn abs_diff_is_symmetric() {
        let a = Lamports::new(10);
        let b = Lamports::new(25);
        assert_eq!(a.abs_diff(b), Lamports::new(15));
        assert_eq!(b.abs_diff(a), Lamports::new(15));
    }
}
