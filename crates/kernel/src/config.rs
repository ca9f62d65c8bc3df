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

//! Evaluation settings. Created by the host and handed to [`crate::EvalContext`]; read-only for
//! the lifetime of an evaluation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How deeply lambda calls and collection members may nest before runaway recursion is cut off.
pub const DEFAULT_MAX_DEPTH: usize = 256;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalOptions {
    /// Nested lambda calls and collection member computations allowed before the result
    /// becomes a depth-overflow error.
    pub max_depth: usize,
    /// Turn panics raised by host functions and language bindings into error values. With this
    /// off they unwind through `evaluate`.
    pub catch_host_faults: bool,
}

impl Default for EvalOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            catch_host_faults: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("max_depth must be at least 1")]
    ZeroDepth,
    #[error("max_depth {0} is larger than the supported limit of {1}")]
    DepthTooLarge(usize, usize),
}

/// Deeper than this, the host stack is at risk before the guard trips.
pub const MAX_SUPPORTED_DEPTH: usize = 1024;

impl EvalOptions {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_depth == 0 {
            return Err(ConfigError::ZeroDepth);
        }
        if self.max_depth > MAX_SUPPORTED_DEPTH {
            return Err(ConfigError::DepthTooLarge(
                self.max_depth,
                MAX_SUPPORTED_DEPTH,
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let options = EvalOptions::default();
        assert_eq!(options.max_depth, DEFAULT_MAX_DEPTH);
        assert!(options.catch_host_faults);
        assert_eq!(options.validate(), Ok(()));
    }

    #[test]
    fn test_depth_bounds() {
        let zero = EvalOptions {
            max_depth: 0,
            ..Default::default()
        };
        assert_eq!(zero.validate(), Err(ConfigError::ZeroDepth));
        let huge = EvalOptions {
            max_depth: MAX_SUPPORTED_DEPTH + 1,
            ..Default::default()
        };
        assert!(matches!(huge.validate(), Err(ConfigError::DepthTooLarge(..))));
    }
}
