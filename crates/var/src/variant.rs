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

use crate::{Error, Function, FsList, KeyValueCollection};
use arcstr::ArcStr;
use chrono::{DateTime, Utc};
use num_bigint::BigInt;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;
use unicase::UniCase;
use uuid::Uuid;

/// Our series of types
#[derive(Clone)]
pub enum Variant {
    None,
    Bool(bool),
    Int(i64),
    BigInt(Arc<BigInt>),
    Float(f64),
    DateTime(DateTime<Utc>),
    Guid(Uuid),
    Str(ArcStr),
    Bytes(Arc<[u8]>),
    List(Arc<dyn FsList>),
    Kvc(Arc<dyn KeyValueCollection>),
    Function(Arc<dyn Function>),
    Err(Arc<Error>),
}

impl Debug for Variant {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Variant::None => write!(f, "None"),
            Variant::Bool(b) => write!(f, "{}", *b),
            Variant::Int(i) => write!(f, "Integer({i})"),
            Variant::BigInt(i) => write!(f, "BigInteger({i})"),
            Variant::Float(fl) => write!(f, "Float({fl})"),
            Variant::DateTime(d) => write!(f, "DateTime({})", d.to_rfc3339()),
            Variant::Guid(g) => write!(f, "Guid({g})"),
            Variant::Str(s) => write!(f, "String({:?})", s.as_str()),
            Variant::Bytes(b) => write!(f, "ByteArray({} bytes)", b.len()),
            Variant::List(l) => {
                // Items...
                let i: Vec<_> = l.iter().collect();
                write!(f, "List([size = {}, items = {:?}])", l.len(), i)
            }
            Variant::Kvc(kvc) => {
                let pairs = kvc.get_all();
                write!(f, "Kvc({{")?;
                for (i, (k, v)) in pairs.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{k}: {v:?}")?;
                }
                write!(f, "}})")
            }
            Variant::Function(func) => write!(f, "Function({})", func.symbol()),
            Variant::Err(e) => write!(f, "Error({e:?})"),
        }
    }
}

/// Structural equality. Collections compare by content, case-insensitively on keys; functions
/// compare by identity.
impl PartialEq<Self> for Variant {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Variant::None, Variant::None) => true,
            (Variant::Bool(s), Variant::Bool(o)) => s == o,
            (Variant::Int(s), Variant::Int(o)) => s == o,
            (Variant::BigInt(s), Variant::BigInt(o)) => s == o,
            (Variant::Float(s), Variant::Float(o)) => s == o,
            (Variant::DateTime(s), Variant::DateTime(o)) => s == o,
            (Variant::Guid(s), Variant::Guid(o)) => s == o,
            (Variant::Str(s), Variant::Str(o)) => s == o,
            (Variant::Bytes(s), Variant::Bytes(o)) => s == o,
            (Variant::List(s), Variant::List(o)) => {
                Arc::ptr_eq(s, o) || (s.len() == o.len() && s.iter().eq(o.iter()))
            }
            (Variant::Kvc(s), Variant::Kvc(o)) => Arc::ptr_eq(s, o) || kvc_eq(s.as_ref(), o.as_ref()),
            (Variant::Function(s), Variant::Function(o)) => {
                std::ptr::addr_eq(Arc::as_ptr(s), Arc::as_ptr(o))
            }
            (Variant::Err(s), Variant::Err(o)) => s == o,
            _ => false,
        }
    }
}

fn kvc_eq(left: &dyn KeyValueCollection, right: &dyn KeyValueCollection) -> bool {
    let left_pairs = left.get_all();
    let right_pairs = right.get_all();
    if left_pairs.len() != right_pairs.len() {
        return false;
    }
    left_pairs.iter().all(|(k, v)| {
        right_pairs
            .iter()
            .find(|(rk, _)| UniCase::new(rk.as_str()) == UniCase::new(k.as_str()))
            .is_some_and(|(_, rv)| rv == v)
    })
}
