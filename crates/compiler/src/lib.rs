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

//! The FuncScript compiler: source text in, an executable [`Expr`] tree plus a diagnostic
//! [`ParseNode`] tree out.

mod ast;
mod binding;
mod diagnostics;
mod errors;
mod lexical;
mod parse;
mod parse_node;
mod precedence;

pub use crate::ast::{BindingHandle, Expr, KvcExpr, KvcItem, LambdaExpr};
pub use crate::binding::{CompiledBinding, LanguageBinding, LanguageBindingRegistry};
pub use crate::diagnostics::{
    DiagnosticRenderOptions, DiagnosticVerbosity, emit_compile_error, format_compile_error,
    render_syntax_errors, line_col,
};
pub use crate::errors::{CompileError, SyntaxError};
pub use crate::lexical::KEYWORDS;
pub use crate::parse::{CompileOptions, ParseOutcome, compile, parse};
pub use crate::parse_node::{ParseNode, ParseNodeType};
pub use crate::precedence::{PREFIX_OPERATORS, Precedence};
