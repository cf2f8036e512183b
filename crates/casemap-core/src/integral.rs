use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// A constant value of any supported integral width and signedness,
/// serialized as a plain number.
///
/// Non-negative values are compared by unsigned 64-bit magnitude regardless
/// of the variant that carries them; negative values compare after every
/// non-negative value (so sentinel members like `Invalid = -1` never
/// interleave with the flag-bit sequence).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Integral {
    Unsigned(u64),
    Signed(i64),
}

impl Integral {
    /// The unsigned magnitude, if the value is non-negative.
    pub fn as_unsigned(self) -> Option<u64> {
        match self {
            Self::Unsigned(m) => Some(m),
            Self::Signed(v) if v >= 0 => Some(v as u64),
            Self::Signed(_) => None,
        }
    }

    pub fn is_negative(self) -> bool {
        matches!(self, Self::Signed(v) if v < 0)
    }

    pub fn is_zero(self) -> bool {
        self.as_unsigned() == Some(0)
    }

    /// Zero or an exact power of two. Zero is accepted as a pseudo-power;
    /// callers that care distinguish it with [`Integral::is_zero`].
    pub fn is_flag_candidate(self) -> bool {
        match self.as_unsigned() {
            Some(m) => m & m.wrapping_sub(1) == 0,
            None => false,
        }
    }

    /// Compare an unsigned reference against any integral value. A negative
    /// value is greater than every unsigned reference.
    pub fn compare(reference: u64, value: Integral) -> Ordering {
        (0u8, reference).cmp(&value.sort_key())
    }

    /// Total-order key: non-negatives ascend by magnitude, negatives follow
    /// in ascending signed order.
    fn sort_key(self) -> (u8, u64) {
        match self {
            Self::Unsigned(m) => (0, m),
            Self::Signed(v) if v >= 0 => (0, v as u64),
            Self::Signed(v) => (1, v as u64),
        }
    }
}

// Equality coerces across signedness: an unsigned 64-bit value and a signed
// value are equal whenever they denote the same number. Hash and Ord agree.

impl PartialEq for Integral {
    fn eq(&self, other: &Self) -> bool {
        self.sort_key() == other.sort_key()
    }
}

impl Eq for Integral {}

impl Hash for Integral {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.sort_key().hash(state);
    }
}

impl PartialOrd for Integral {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Integral {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

impl fmt::Display for Integral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unsigned(m) => write!(f, "{m}"),
            Self::Signed(v) => write!(f, "{v}"),
        }
    }
}

impl From<u64> for Integral {
    fn from(value: u64) -> Self {
        Self::Unsigned(value)
    }
}

impl From<i64> for Integral {
    fn from(value: i64) -> Self {
        if value >= 0 {
            Self::Unsigned(value as u64)
        } else {
            Self::Signed(value)
        }
    }
}

impl From<i32> for Integral {
    fn from(value: i32) -> Self {
        Self::from(value as i64)
    }
}
