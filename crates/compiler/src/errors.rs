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

use funcscript_var::Span;
use itertools::Itertools;
use std::fmt::{Display, Formatter};
use thiserror::Error;

/// A diagnostic recorded while parsing: `(position, length, message)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SyntaxError {
    pub span: Span,
    pub message: String,
}

impl SyntaxError {
    pub fn new(pos: usize, len: usize, message: impl Into<String>) -> Self {
        Self {
            span: Span::new(pos, len),
            message: message.into(),
        }
    }

    pub fn pos(&self) -> usize {
        self.span.pos
    }

    pub fn len(&self) -> usize {
        self.span.len
    }

    pub fn is_empty(&self) -> bool {
        self.span.is_empty()
    }
}

impl Display for SyntaxError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} @ {}", self.message, self.span)
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum CompileError {
    #[error("Failure to parse expression: {}", .0.iter().map(|e| e.to_string()).join("; "))]
    SyntaxErrors(Vec<SyntaxError>),
    #[error("Unexpected input at position {position}")]
    TrailingInput {
        position: usize,
        errors: Vec<SyntaxError>,
    },
}

impl CompileError {
    pub fn errors(&self) -> &[SyntaxError] {
        match self {
            CompileError::SyntaxErrors(errors) => errors,
            CompileError::TrailingInput { errors, .. } => errors,
        }
    }
}
