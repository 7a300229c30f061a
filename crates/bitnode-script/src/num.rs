//! Script numeric

use std::ops::{Add, Neg, Sub};

/// Script number error type.
#[derive(Debug, Clone, Copy, Eq, PartialEq, thiserror::Error)]
pub enum NumError {
    #[error("Script number overflow")]
    Overflow,
    #[error("Non-minimally encoded script number")]
    NotMinimallyEncoded,
}

/// A numeric type used in Bitcoin Script operations.
///
/// Values are encoded as little-endian magnitudes with the sign carried in the
/// high bit of the last byte. Zero is the empty byte string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ScriptNum {
    value: i64,
}

impl<T: Into<i64>> From<T> for ScriptNum {
    fn from(value: T) -> Self {
        Self {
            value: value.into(),
        }
    }
}

impl ScriptNum {
    /// Maximum script number length in bytes for arithmetic operands.
    pub const MAX_NUM_SIZE: usize = 4;

    /// Operand size accepted by CHECKLOCKTIMEVERIFY and CHECKSEQUENCEVERIFY.
    pub const LOCKTIME_NUM_SIZE: usize = 5;

    /// Longest encoding that fits the `i64` value.
    const MAX_DECODE_SIZE: usize = 8;

    /// Construct a [`ScriptNum`] with size validation.
    pub fn from_bytes(
        data: &[u8],
        require_minimal: bool,
        max_size: Option<usize>,
    ) -> Result<Self, NumError> {
        let max_size = max_size
            .unwrap_or(Self::MAX_NUM_SIZE)
            .min(Self::MAX_DECODE_SIZE);

        if data.len() > max_size {
            return Err(NumError::Overflow);
        }

        let Some((&last, _)) = data.split_last() else {
            return Ok(Self { value: 0 });
        };

        if require_minimal && !Self::is_minimally_encoded(data) {
            return Err(NumError::NotMinimallyEncoded);
        }

        let mut result = 0i64;

        // Parse bytes in little-endian order.
        for (i, &byte) in data.iter().enumerate() {
            result |= i64::from(byte).wrapping_shl(8 * i as u32);
        }

        // Clear the sign bit and negate.
        if last & 0x80 != 0 {
            let value = -(result & !(0x80i64.wrapping_shl((8 * (data.len() - 1)) as u32)));
            Ok(Self { value })
        } else {
            Ok(Self { value: result })
        }
    }

    /// Convert the number to a minimally encoded byte vector.
    pub fn to_bytes(&self) -> Vec<u8> {
        if self.value == 0 {
            return Vec::new();
        }

        let negative = self.value < 0;
        let mut abs_value = self.value.unsigned_abs();
        let mut result = Vec::with_capacity(9);

        while abs_value != 0 {
            result.push((abs_value & 0xff) as u8);
            abs_value >>= 8;
        }

        // The most significant byte collides with the sign bit, append a guard byte.
        match result.last_mut() {
            Some(last) if *last & 0x80 != 0 => result.push(if negative { 0x80 } else { 0 }),
            Some(last) if negative => *last |= 0x80,
            _ => {}
        }

        result
    }

    /// Check if the byte array is minimally encoded.
    ///
    /// The most significant byte may only be zero (ignoring the sign bit) when
    /// the next byte has its high bit set.
    pub fn is_minimally_encoded(data: &[u8]) -> bool {
        match data {
            [] => true,
            [.., last] if last & 0x7f != 0 => true,
            [.., prev, _] => prev & 0x80 != 0,
            [_] => false,
        }
    }

    /// Get the underlying value.
    pub fn value(&self) -> i64 {
        self.value
    }

    /// Returns the value saturated to the `i32` range.
    pub fn to_i32(&self) -> i32 {
        self.value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
    }

    pub fn is_zero(&self) -> bool {
        self.value == 0
    }

    pub fn is_negative(&self) -> bool {
        self.value.is_negative()
    }

    pub fn abs(&self) -> Result<Self, NumError> {
        self.value
            .checked_abs()
            .map(|value| Self { value })
            .ok_or(NumError::Overflow)
    }
}

impl Add for ScriptNum {
    type Output = Result<Self, NumError>;

    fn add(self, other: Self) -> Result<Self, NumError> {
        self.value
            .checked_add(other.value)
            .map(|value| Self { value })
            .ok_or(NumError::Overflow)
    }
}

impl Sub for ScriptNum {
    type Output = Result<Self, NumError>;

    fn sub(self, other: Self) -> Result<Self, NumError> {
        self.value
            .checked_sub(other.value)
            .map(|value| Self { value })
            .ok_or(NumError::Overflow)
    }
}

impl Neg for ScriptNum {
    type Output = Result<Self, NumError>;

    fn neg(self) -> Result<Self, NumError> {
        self.value
            .checked_neg()
            .map(|value| Self { value })
            .ok_or(NumError::Overflow)
    }
}
