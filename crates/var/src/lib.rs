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

//! Values, key/value collections and lists shared by the parser and the evaluator.

mod error;
mod function;
mod kvc;
mod list;
mod span;
#[allow(clippy::module_inception)]
mod var;
mod variant;

pub use error::{Error, ErrorCode, ErrorCode::*};
pub use function::{CallType, Function, HostFunction, ParameterList, SharedParameters};
pub use kvc::{KeyValueCollection, MergedKvc, Scope, SimpleKvc, merge_kvc};
pub use list::{ArrayList, ConcatList, FsList, ListIter};
pub use span::Span;
pub use var::{
    Var, v_bigint, v_bool, v_bytes, v_datetime, v_empty_list, v_err, v_error, v_float, v_fn,
    v_guid, v_int, v_kvc, v_kvc_pairs, v_list, v_list_iter, v_none, v_str, v_string,
};
pub use variant::Variant;

use strum::{Display, EnumString};

/// The data type of a value, as reported by the `type` builtin and in type-mismatch messages.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum VarType {
    Null,
    Boolean,
    Integer,
    BigInteger,
    Float,
    DateTime,
    Guid,
    String,
    ByteArray,
    List,
    KeyValueCollection,
    Function,
    Error,
}

impl VarType {
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            VarType::Integer | VarType::BigInteger | VarType::Float
        )
    }
}
