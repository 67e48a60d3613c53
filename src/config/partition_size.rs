use std::fmt;

use crate::error::{Error, Result};

/// Number of lines per partition, guaranteed to be a power of two
///
/// Keeping the base-2 logarithm next to the value lets the locator split a
/// line number with a shift and a mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartitionSize {
    size: u64,
    shift: u32,
}

impl PartitionSize {
    /// Validates `size` as a positive power of two
    pub fn new(size: u64) -> Result<Self> {
        if !size.is_power_of_two() {
            return Err(Error::Config(format!("Max partition size must be a power of 2, got {}", size)));
        }
        Ok(Self { size, shift: size.trailing_zeros() })
    }

    #[inline]
    pub fn get(self) -> u64 {
        self.size
    }

    /// `log2` of the partition size
    #[inline]
    pub fn shift(self) -> u32 {
        self.shift
    }

    #[inline]
    pub fn mask(self) -> u64 {
        self.size - 1
    }
}

impl fmt::Display for PartitionSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_powers_of_two() {
        for exp in [0u32, 1, 4, 10, 20, 63] {
            let size = PartitionSize::new(1u64 << exp).unwrap();
            assert_eq!(size.get(), 1u64 << exp);
            assert_eq!(size.shift(), exp);
        }
    }

    #[test]
    fn test_rejects_non_powers_of_two() {
        for size in [0u64, 3, 6, 100, 1000, 1023] {
            let err = PartitionSize::new(size).unwrap_err();
            assert!(matches!(err, Error::Config(_)), "{} should be rejected", size);
        }
    }

    #[test]
    fn test_mask() {
        assert_eq!(PartitionSize::new(1024).unwrap().mask(), 1023);
        assert_eq!(PartitionSize::new(1).unwrap().mask(), 0);
    }
}
