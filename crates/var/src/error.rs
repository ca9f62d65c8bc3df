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

use crate::{Span, var::Var};
use ErrorCode::*;
use arcstr::ArcStr;
use std::{
    fmt::{Debug, Display, Formatter},
    hash::{Hash, Hasher},
    ops::Deref,
};

/// An evaluation error. Errors are ordinary values: they flow through operators and functions
/// until something inspects or recovers from them.
#[derive(Clone)]
pub struct Error {
    pub err_type: ErrorCode,
    pub msg: Option<Box<String>>,
    pub value: Option<Box<Var>>,
    /// Where in the source the error was produced. Filled in by the evaluator at the first
    /// expression boundary the error crosses, and never overwritten afterwards.
    pub span: Option<Span>,
}

impl Hash for Error {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.err_type.hash(state);
    }
}

impl Error {
    pub fn new(err_type: ErrorCode, msg: Option<String>, value: Option<Var>) -> Self {
        Self {
            err_type,
            msg: msg.map(Box::new),
            value: value.map(Box::new),
            span: None,
        }
    }

    /// Attach `span` unless the error already carries a more precise location.
    #[must_use]
    pub fn located(mut self, span: Span) -> Self {
        if self.span.is_none() {
            self.span = Some(span);
        }
        self
    }
}

impl Debug for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.span {
            Some(span) => write!(f, "{}({:?} @ {span})", self.err_type, self.message()),
            None => write!(f, "{}({:?})", self.err_type, self.message()),
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message(), self.err_type)
    }
}

/// The error taxonomy callers match on. The string codes are stable.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[allow(non_camel_case_types)]
pub enum ErrorCode {
    E_DEFAULT,
    E_TYPE_MISMATCH,
    E_INVALID_PARAMETER,
    E_PARAMETER_COUNT,
    E_SYNTAX,
    E_UNDEFINED,
    E_DEPTH_OVERFLOW,
    /// Raised by user code through `error(message, type)`.
    ErrCustom(ArcStr),
}

impl ErrorCode {
    pub fn parse_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "" => None,
            "DEFAULT" => Some(E_DEFAULT),
            "TYPE_MISMATCH" => Some(E_TYPE_MISMATCH),
            "TYPE_INVALID_PARAMETER" => Some(E_INVALID_PARAMETER),
            "TOO_FEW_PARAMETER" => Some(E_PARAMETER_COUNT),
            "SYNTAX_ERROR" => Some(E_SYNTAX),
            "UNDEFINED" => Some(E_UNDEFINED),
            "EVALUATION_DEPTH_OVERFLOW" => Some(E_DEPTH_OVERFLOW),
            _ => Some(ErrCustom(ArcStr::from(s))),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            E_DEFAULT => "Default",
            E_TYPE_MISMATCH => "TYPE_MISMATCH",
            E_INVALID_PARAMETER => "TYPE_INVALID_PARAMETER",
            E_PARAMETER_COUNT => "TOO_FEW_PARAMETER",
            E_SYNTAX => "SYNTAX_ERROR",
            E_UNDEFINED => "UNDEFINED",
            E_DEPTH_OVERFLOW => "EVALUATION_DEPTH_OVERFLOW",
            ErrCustom(name) => name.as_str(),
        }
    }
}

impl From<ErrorCode> for String {
    fn from(val: ErrorCode) -> Self {
        val.as_str().to_string()
    }
}

impl Display for ErrorCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl ErrorCode {
    pub fn msg<S: ToString>(self, s: S) -> Error {
        Error::new(self, Some(s.to_string()), None)
    }

    pub fn with_msg<F>(self, f: F) -> Error
    where
        F: FnOnce() -> String,
    {
        Error::new(self, Some(f()), None)
    }

    pub fn with_msg_and_value<F>(self, f: F, value: Var) -> Error
    where
        F: FnOnce() -> String,
    {
        Error::new(self, Some(f()), Some(value))
    }
}

impl PartialEq<ErrorCode> for Error {
    fn eq(&self, other: &ErrorCode) -> bool {
        self.err_type == *other
    }
}

impl PartialEq<Error> for Error {
    fn eq(&self, other: &Error) -> bool {
        self.err_type == other.err_type && self.message() == other.message()
    }
}

impl Eq for Error {}

impl From<ErrorCode> for Error {
    fn from(val: ErrorCode) -> Self {
        Error::new(val, None, None)
    }
}

impl std::error::Error for Error {}

impl Error {
    #[must_use]
    pub fn message(&self) -> String {
        if let Some(msg) = &self.msg {
            return msg.deref().clone();
        }
        // Default message if one not provided.
        match &self.err_type {
            E_DEFAULT => "Evaluation failed".into(),
            E_TYPE_MISMATCH => "Type mismatch".into(),
            E_INVALID_PARAMETER => "Invalid parameter".into(),
            E_PARAMETER_COUNT => "Incorrect number of parameters".into(),
            E_SYNTAX => "Syntax error".into(),
            E_UNDEFINED => "Undefined".into(),
            E_DEPTH_OVERFLOW => "Maximum evaluation depth exceeded".into(),
            ErrCustom(name) => format!("Custom error: {name}"),
        }
    }

    pub fn data(&self) -> Option<&Var> {
        self.value.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_round_trip() {
        for code in [
            E_DEFAULT,
            E_TYPE_MISMATCH,
            E_INVALID_PARAMETER,
            E_PARAMETER_COUNT,
            E_SYNTAX,
            E_UNDEFINED,
            E_DEPTH_OVERFLOW,
        ] {
            assert_eq!(ErrorCode::parse_str(code.as_str()), Some(code));
        }
        assert_eq!(
            ErrorCode::parse_str("MY_FAULT"),
            Some(ErrCustom(ArcStr::from("MY_FAULT")))
        );
    }

    #[test]
    fn test_located_keeps_first_span() {
        let e = E_DEFAULT
            .msg("boom")
            .located(Span::new(2, 13))
            .located(Span::new(0, 15));
        assert_eq!(e.span, Some(Span::new(2, 13)));
    }

    #[test]
    fn test_default_messages() {
        let e: Error = E_TYPE_MISMATCH.into();
        assert_eq!(e.message(), "Type mismatch");
        assert_eq!(E_TYPE_MISMATCH.msg("bad").message(), "bad");
    }
}
