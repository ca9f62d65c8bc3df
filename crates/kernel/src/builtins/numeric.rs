// Copyright (C) 2025 Ryan Daum <ryan.daum@gmail.com> This program is free
// software: you can redistribute it and/or modify it under the terms of the GNU
// General Public License as published by the Free Software Foundation, version
// 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

//! Arithmetic over the three numeric representations. Integer results that overflow `i64` are
//! promoted to big integers; any float operand makes the result a float.

use funcscript_var::{E_INVALID_PARAMETER, Error, Var, Variant, v_bigint, v_float, v_int};
use num_bigint::BigInt;
use num_traits::{FromPrimitive, Signed, ToPrimitive, Zero};

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Number {
    Int(i64),
    Big(BigInt),
    Float(f64),
}

use Number::{Big, Float, Int};

impl Number {
    pub fn from_var(v: &Var) -> Option<Self> {
        match v.variant() {
            Variant::Int(i) => Some(Int(*i)),
            Variant::BigInt(b) => Some(Big(b.as_ref().clone())),
            Variant::Float(f) => Some(Float(*f)),
            _ => None,
        }
    }

    pub fn into_var(self) -> Var {
        match self {
            Int(i) => v_int(i),
            Big(b) => v_bigint(b),
            Float(f) => v_float(f),
        }
    }

    pub fn to_f64(&self) -> f64 {
        match self {
            Int(i) => *i as f64,
            Big(b) => b.to_f64().unwrap_or(f64::NAN),
            Float(f) => *f,
        }
    }

    fn to_big(&self) -> BigInt {
        match self {
            Int(i) => BigInt::from(*i),
            Big(b) => b.clone(),
            Float(f) => BigInt::from_f64(*f).unwrap_or_default(),
        }
    }

    fn is_zero(&self) -> bool {
        match self {
            Int(i) => *i == 0,
            Big(b) => b.is_zero(),
            Float(f) => *f == 0.0,
        }
    }

    fn combine(
        self,
        other: Number,
        int_op: fn(i64, i64) -> Option<i64>,
        big_op: fn(BigInt, BigInt) -> BigInt,
        float_op: fn(f64, f64) -> f64,
    ) -> Number {
        match (self, other) {
            (Int(a), Int(b)) => match int_op(a, b) {
                Some(r) => Int(r),
                None => Big(big_op(BigInt::from(a), BigInt::from(b))),
            },
            (Float(a), b) => Float(float_op(a, b.to_f64())),
            (a, Float(b)) => Float(float_op(a.to_f64(), b)),
            (a, b) => Big(big_op(a.to_big(), b.to_big())),
        }
    }

    pub fn add(self, other: Number) -> Number {
        self.combine(other, i64::checked_add, |a, b| a + b, |a, b| a + b)
    }

    pub fn sub(self, other: Number) -> Number {
        self.combine(other, i64::checked_sub, |a, b| a - b, |a, b| a - b)
    }

    pub fn mul(self, other: Number) -> Number {
        self.combine(other, i64::checked_mul, |a, b| a * b, |a, b| a * b)
    }

    /// `/`: exact integer quotients stay integers, anything else becomes a float.
    pub fn div(self, other: Number) -> Result<Number, Error> {
        match (&self, &other) {
            (Float(_), _) | (_, Float(_)) => Ok(Float(self.to_f64() / other.to_f64())),
            _ if other.is_zero() => Err(division_by_zero()),
            (Int(a), Int(b)) => match (a.checked_rem(*b), a.checked_div(*b)) {
                (Some(0), Some(q)) => Ok(Int(q)),
                (Some(_), _) => Ok(Float(*a as f64 / *b as f64)),
                _ => Ok(Big(BigInt::from(*a) / BigInt::from(*b))),
            },
            _ => {
                let (a, b) = (self.to_big(), other.to_big());
                if (&a % &b).is_zero() {
                    Ok(Big(a / b))
                } else {
                    Ok(Float(self.to_f64() / other.to_f64()))
                }
            }
        }
    }

    /// `div`: integer quotient, truncated toward zero.
    pub fn int_div(self, other: Number) -> Result<Number, Error> {
        if other.is_zero() {
            return Err(division_by_zero());
        }
        match (self, other) {
            (Float(a), b) => Ok(Float((a / b.to_f64()).trunc())),
            (a, Float(b)) => Ok(Float((a.to_f64() / b).trunc())),
            (Int(a), Int(b)) => Ok(a
                .checked_div(b)
                .map(Int)
                .unwrap_or_else(|| Big(BigInt::from(a) / BigInt::from(b)))),
            (a, b) => Ok(Big(a.to_big() / b.to_big())),
        }
    }

    pub fn rem(self, other: Number) -> Result<Number, Error> {
        match (&self, &other) {
            (Float(_), _) | (_, Float(_)) => Ok(Float(self.to_f64() % other.to_f64())),
            _ if other.is_zero() => Err(division_by_zero()),
            _ => Ok(self.combine(other, i64::checked_rem, |a, b| a % b, |a, b| a % b)),
        }
    }

    /// Integer bases with a non-negative integer exponent stay exact. An exact result wider
    /// than `MAX_POWER_BITS` is refused rather than built.
    pub fn pow(self, exponent: Number) -> Result<Number, Error> {
        let (Int(_) | Big(_), Int(e)) = (&self, &exponent) else {
            return Ok(Float(self.to_f64().powf(exponent.to_f64())));
        };
        let e = *e;
        if e < 0 {
            return Ok(Float(self.to_f64().powf(e as f64)));
        }
        if let (Int(b), Ok(e)) = (&self, u32::try_from(e))
            && let Some(p) = b.checked_pow(e)
        {
            return Ok(Int(p));
        }
        let base = self.to_big();
        let bits = base.bits();
        if bits <= 1 {
            // 0, 1 and -1 repeat with period two.
            let e = if e == 0 { 0 } else { 2 - (e % 2) as u32 };
            return Ok(Big(base.pow(e)));
        }
        match u32::try_from(e) {
            Ok(e) if bits.saturating_mul(u64::from(e)) <= MAX_POWER_BITS => Ok(Big(base.pow(e))),
            _ => Err(E_INVALID_PARAMETER.with_msg(|| format!("^: exponent {e} is too large"))),
        }
    }

    pub fn neg(self) -> Number {
        match self {
            Int(i) => i.checked_neg().map(Int).unwrap_or_else(|| Big(-BigInt::from(i))),
            Big(b) => Big(-b),
            Float(f) => Float(-f),
        }
    }

    pub fn abs(self) -> Number {
        match self {
            Int(i) => i
                .checked_abs()
                .map(Int)
                .unwrap_or_else(|| Big(BigInt::from(i).abs())),
            Big(b) => Big(b.abs()),
            Float(f) => Float(f.abs()),
        }
    }
}

/// Bit width past which `pow` refuses to build an exact result.
const MAX_POWER_BITS: u64 = 1 << 24;

fn division_by_zero() -> Error {
    E_INVALID_PARAMETER.msg("Division by zero")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overflow_promotes_to_big() {
        let r = Int(i64::MAX).add(Int(1));
        assert_eq!(r, Big(BigInt::from(i64::MAX) + 1));
        assert_eq!(Int(i64::MIN).neg(), Big(-BigInt::from(i64::MIN)));
    }

    #[test]
    fn test_division() {
        assert_eq!(Int(6).div(Int(3)), Ok(Int(2)));
        assert_eq!(Int(7).div(Int(2)), Ok(Float(3.5)));
        assert_eq!(Int(7).int_div(Int(2)), Ok(Int(3)));
        assert!(Int(1).div(Int(0)).is_err());
        assert_eq!(Float(1.0).div(Int(4)), Ok(Float(0.25)));
    }

    #[test]
    fn test_pow() {
        assert_eq!(Int(2).pow(Int(10)), Ok(Int(1024)));
        assert_eq!(Int(2).pow(Int(-1)), Ok(Float(0.5)));
        assert_eq!(Int(10).pow(Int(30)), Ok(Big(BigInt::from(10).pow(30))));
    }

    #[test]
    fn test_pow_bounds_exact_results() {
        assert!(Int(2).pow(Int(1 << 40)).is_err());
        assert!(Int(3).pow(Int(100_000_000)).is_err());
        assert_eq!(Int(1).pow(Int(i64::MAX)).map(Number::into_var), Ok(v_int(1)));
        assert_eq!(Int(-1).pow(Int((1 << 40) + 1)).map(Number::into_var), Ok(v_int(-1)));
        assert_eq!(Int(0).pow(Int(0)).map(Number::into_var), Ok(v_int(1)));
    }
}
