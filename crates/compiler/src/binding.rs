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

//! Boundary for foreign-language blocks (```` ```lang ... ``` ````). The compiler resolves the
//! language through a [`LanguageBindingRegistry`] and compiles the block once, at parse time.
//! The evaluator then runs the resulting handle against the scope the block appears in.

use ahash::AHashMap;
use funcscript_var::{Scope, Var};
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

pub trait LanguageBinding: Send + Sync {
    /// Compile `code`. A failure is not a syntax error: the block still parses and evaluates to
    /// an error value carrying the message.
    fn compile(&self, code: &str) -> Result<Arc<dyn CompiledBinding>, String>;
}

pub trait CompiledBinding: Debug + Send + Sync {
    fn evaluate(&self, scope: &Scope) -> Var;
}

/// Case-insensitive map of language identifiers to bindings.
#[derive(Clone, Default)]
pub struct LanguageBindingRegistry {
    bindings: AHashMap<String, Arc<dyn LanguageBinding>>,
}

impl LanguageBindingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, language: &str, binding: Arc<dyn LanguageBinding>) {
        self.bindings
            .insert(language.trim().to_lowercase(), binding);
    }

    pub fn with(mut self, language: &str, binding: Arc<dyn LanguageBinding>) -> Self {
        self.register(language, binding);
        self
    }

    pub fn get(&self, language: &str) -> Option<&Arc<dyn LanguageBinding>> {
        self.bindings.get(&language.trim().to_lowercase())
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl Debug for LanguageBindingRegistry {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut languages: Vec<_> = self.bindings.keys().collect();
        languages.sort();
        f.debug_struct("LanguageBindingRegistry")
            .field("languages", &languages)
            .finish()
    }
}

/// Stands in for a block whose compilation failed.
#[derive(Debug)]
pub(crate) struct FailedBinding {
    pub(crate) language: String,
    pub(crate) message: String,
}

impl CompiledBinding for FailedBinding {
    fn evaluate(&self, _scope: &Scope) -> Var {
        funcscript_var::v_error(
            funcscript_var::E_DEFAULT,
            &format!("[{}] {}", self.language, self.message),
        )
    }
}
