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

use crate::variant::Variant;
use crate::{
    ArrayList, Error, ErrorCode, FsList, Function, KeyValueCollection, SimpleKvc, VarType,
};
use arcstr::ArcStr;
use chrono::{DateTime, Utc};
use num_bigint::BigInt;
use num_traits::ToPrimitive;
use std::cmp::Ordering;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Clone)]
pub struct Var(Variant);

impl Debug for Var {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self.variant())
    }
}

impl Var {
    pub fn from_variant(variant: Variant) -> Self {
        Var(variant)
    }

    pub fn mk_integer(i: i64) -> Self {
        Var(Variant::Int(i))
    }

    /// Big integers that fit in an `i64` are normalized down to plain integers.
    pub fn mk_bigint(i: BigInt) -> Self {
        match i.to_i64() {
            Some(small) => Var(Variant::Int(small)),
            None => Var(Variant::BigInt(Arc::new(i))),
        }
    }

    pub fn mk_none() -> Self {
        Var(Variant::None)
    }

    pub fn mk_str(s: &str) -> Self {
        Var(Variant::Str(ArcStr::from(s)))
    }

    pub fn mk_string(s: String) -> Self {
        Var(Variant::Str(ArcStr::from(s)))
    }

    pub fn mk_float(f: f64) -> Self {
        Var(Variant::Float(f))
    }

    pub fn mk_error(e: Error) -> Self {
        Var(Variant::Err(Arc::new(e)))
    }

    pub fn mk_bool(b: bool) -> Self {
        Var(Variant::Bool(b))
    }

    pub fn mk_datetime(d: DateTime<Utc>) -> Self {
        Var(Variant::DateTime(d))
    }

    pub fn mk_guid(g: Uuid) -> Self {
        Var(Variant::Guid(g))
    }

    pub fn mk_bytes(b: &[u8]) -> Self {
        Var(Variant::Bytes(Arc::from(b)))
    }

    pub fn mk_list(values: Vec<Var>) -> Self {
        Var(Variant::List(Arc::new(ArrayList::from(values))))
    }

    pub fn mk_list_of(list: Arc<dyn FsList>) -> Self {
        Var(Variant::List(list))
    }

    pub fn mk_kvc(kvc: Arc<dyn KeyValueCollection>) -> Self {
        Var(Variant::Kvc(kvc))
    }

    pub fn mk_function(f: Arc<dyn Function>) -> Self {
        Var(Variant::Function(f))
    }

    pub fn variant(&self) -> &Variant {
        &self.0
    }

    pub fn type_code(&self) -> VarType {
        match self.variant() {
            Variant::None => VarType::Null,
            Variant::Bool(_) => VarType::Boolean,
            Variant::Int(_) => VarType::Integer,
            Variant::BigInt(_) => VarType::BigInteger,
            Variant::Float(_) => VarType::Float,
            Variant::DateTime(_) => VarType::DateTime,
            Variant::Guid(_) => VarType::Guid,
            Variant::Str(_) => VarType::String,
            Variant::Bytes(_) => VarType::ByteArray,
            Variant::List(_) => VarType::List,
            Variant::Kvc(_) => VarType::KeyValueCollection,
            Variant::Function(_) => VarType::Function,
            Variant::Err(_) => VarType::Error,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self.variant(), Variant::None)
    }

    pub fn is_err(&self) -> bool {
        matches!(self.variant(), Variant::Err(_))
    }

    pub fn as_error(&self) -> Option<&Error> {
        match self.variant() {
            Variant::Err(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self.variant() {
            Variant::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self.variant() {
            Variant::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Any numeric value widened to a float.
    pub fn as_f64(&self) -> Option<f64> {
        match self.variant() {
            Variant::Int(i) => Some(*i as f64),
            Variant::BigInt(i) => i.to_f64(),
            Variant::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self.variant() {
            Variant::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&Arc<dyn FsList>> {
        match self.variant() {
            Variant::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_kvc(&self) -> Option<&Arc<dyn KeyValueCollection>> {
        match self.variant() {
            Variant::Kvc(k) => Some(k),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&Arc<dyn Function>> {
        match self.variant() {
            Variant::Function(func) => Some(func),
            _ => None,
        }
    }

    /// Condition truthiness: booleans are themselves, null is false, anything else is true.
    pub fn is_true(&self) -> bool {
        match self.variant() {
            Variant::None => false,
            Variant::Bool(b) => *b,
            _ => true,
        }
    }

    /// Ordering between values of comparable types. Numbers compare across integer, big integer
    /// and float; strings compare ordinally; date-times chronologically. Anything else is `None`.
    pub fn compare(&self, other: &Var) -> Option<Ordering> {
        match (self.variant(), other.variant()) {
            (Variant::Int(l), Variant::Int(r)) => Some(l.cmp(r)),
            (Variant::BigInt(l), Variant::BigInt(r)) => Some(l.cmp(r)),
            (Variant::Int(l), Variant::BigInt(r)) => Some(BigInt::from(*l).cmp(r)),
            (Variant::BigInt(l), Variant::Int(r)) => Some(l.as_ref().cmp(&BigInt::from(*r))),
            (Variant::Str(l), Variant::Str(r)) => Some(l.as_str().cmp(r.as_str())),
            (Variant::DateTime(l), Variant::DateTime(r)) => Some(l.cmp(r)),
            (Variant::Bool(l), Variant::Bool(r)) => Some(l.cmp(r)),
            _ => {
                let l = self.as_f64()?;
                let r = other.as_f64()?;
                l.partial_cmp(&r)
            }
        }
    }

    /// Value equality as seen by the `=`/`==` operators: numbers compare numerically across
    /// representations, strings ordinally, and everything else structurally.
    pub fn loose_eq(&self, other: &Var) -> bool {
        if self.type_code().is_numeric() && other.type_code().is_numeric() {
            return self.compare(other) == Some(Ordering::Equal);
        }
        self == other
    }

    /// Length of a list, string (in chars), byte array, or collection.
    pub fn len(&self) -> Result<usize, Error> {
        match self.variant() {
            Variant::List(l) => Ok(l.len()),
            Variant::Str(s) => Ok(s.chars().count()),
            Variant::Bytes(b) => Ok(b.len()),
            Variant::Kvc(k) => Ok(k.keys().len()),
            _ => Err(ErrorCode::E_TYPE_MISMATCH
                .with_msg(|| format!("{} has no length", self.type_code()))),
        }
    }

    pub fn is_empty(&self) -> Result<bool, Error> {
        Ok(self.len()? == 0)
    }
}

pub fn v_int(i: i64) -> Var {
    Var::mk_integer(i)
}

pub fn v_bigint(i: BigInt) -> Var {
    Var::mk_bigint(i)
}

pub fn v_bool(b: bool) -> Var {
    Var::mk_bool(b)
}

pub fn v_none() -> Var {
    Var::mk_none()
}

pub fn v_str(s: &str) -> Var {
    Var::mk_str(s)
}

pub fn v_string(s: String) -> Var {
    Var::mk_string(s)
}

pub fn v_list(values: &[Var]) -> Var {
    Var::mk_list(values.to_vec())
}

pub fn v_list_iter<IT: IntoIterator<Item = Var>>(values: IT) -> Var {
    Var::mk_list(values.into_iter().collect())
}

pub fn v_empty_list() -> Var {
    Var::mk_list(vec![])
}

pub fn v_float(f: f64) -> Var {
    Var::mk_float(f)
}

pub fn v_datetime(d: DateTime<Utc>) -> Var {
    Var::mk_datetime(d)
}

pub fn v_guid(g: Uuid) -> Var {
    Var::mk_guid(g)
}

pub fn v_bytes(b: &[u8]) -> Var {
    Var::mk_bytes(b)
}

pub fn v_kvc(kvc: Arc<dyn KeyValueCollection>) -> Var {
    Var::mk_kvc(kvc)
}

/// An eager, parentless collection from `(key, value)` pairs.
pub fn v_kvc_pairs(pairs: &[(&str, Var)]) -> Var {
    let kvc = SimpleKvc::from_pairs(None, pairs.iter().map(|(k, v)| (*k, v.clone())));
    Var::mk_kvc(Arc::new(kvc))
}

pub fn v_fn(f: Arc<dyn Function>) -> Var {
    Var::mk_function(f)
}

pub fn v_err(e: Error) -> Var {
    Var::mk_error(e)
}

pub fn v_error(code: ErrorCode, msg: &str) -> Var {
    Var::mk_error(code.msg(msg))
}

impl From<i64> for Var {
    fn from(i: i64) -> Self {
        Var::mk_integer(i)
    }
}

impl From<f64> for Var {
    fn from(f: f64) -> Self {
        Var::mk_float(f)
    }
}

impl From<bool> for Var {
    fn from(b: bool) -> Self {
        Var::mk_bool(b)
    }
}

impl From<&str> for Var {
    fn from(s: &str) -> Self {
        Var::mk_str(s)
    }
}

impl From<String> for Var {
    fn from(s: String) -> Self {
        Var::mk_string(s)
    }
}

impl From<Error> for Var {
    fn from(e: Error) -> Self {
        Var::mk_error(e)
    }
}

impl PartialEq<Self> for Var {
    fn eq(&self, other: &Self) -> bool {
        self.variant() == other.variant()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::E_TYPE_MISMATCH;

    #[test]
    fn test_int_pack_unpack() {
        let i = Var::mk_integer(42);

        match i.variant() {
            Variant::Int(i) => assert_eq!(*i, 42),
            _ => panic!("Expected integer"),
        }
    }

    #[test]
    fn test_bigint_normalizes_small_values() {
        let small = v_bigint(BigInt::from(7));
        assert_eq!(small.type_code(), VarType::Integer);

        let big = v_bigint(BigInt::from(i64::MAX) * 4);
        assert_eq!(big.type_code(), VarType::BigInteger);
    }

    #[test]
    fn test_numeric_compare_across_types() {
        assert_eq!(v_int(2).compare(&v_float(2.5)), Some(Ordering::Less));
        assert_eq!(v_float(3.0).compare(&v_int(3)), Some(Ordering::Equal));
        assert!(v_int(1).loose_eq(&v_float(1.0)));
        assert_ne!(v_int(1), v_float(1.0));
        assert_eq!(v_str("a").compare(&v_int(1)), None);
    }

    #[test]
    fn test_truthiness() {
        assert!(!v_none().is_true());
        assert!(!v_bool(false).is_true());
        assert!(v_int(0).is_true());
        assert!(v_str("").is_true());
    }

    #[test]
    fn test_collection_equality_ignores_key_case() {
        let a = v_kvc_pairs(&[("Name", v_str("x")), ("n", v_int(1))]);
        let b = v_kvc_pairs(&[("n", v_int(1)), ("name", v_str("x"))]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_len() {
        assert_eq!(v_str("héllo").len().unwrap(), 5);
        assert_eq!(v_list(&[v_int(1), v_int(2)]).len().unwrap(), 2);
        assert_eq!(v_int(1).len().unwrap_err(), E_TYPE_MISMATCH);
    }
}
