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

/// Binary operator tiers, loosest first. Operators within a tier share a binding strength, and a
/// run of the same operator (`a+b+c`) folds into a single n-ary call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum Precedence {
    Logical = 1,        // or and (lowest precedence)
    Equality = 2,       // == = ?? ?! ?.
    Relational = 3,     // >= <= != > < in
    Additive = 4,       // + -
    Multiplicative = 5, // * div / %
    Exponential = 6,    // ^
}

impl Precedence {
    pub const LOOSEST: Precedence = Precedence::Logical;

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// The operator symbols of this tier. Candidates are matched longest first.
    pub fn symbols(self) -> &'static [&'static str] {
        match self {
            Precedence::Logical => &["or", "and"],
            Precedence::Equality => &["==", "=", "??", "?!", "?."],
            Precedence::Relational => &[">=", "<=", "!=", ">", "<", "in"],
            Precedence::Additive => &["+", "-"],
            Precedence::Multiplicative => &["*", "div", "/", "%"],
            Precedence::Exponential => &["^"],
        }
    }

    /// The next tier down, binding one step tighter. `None` below `^`, where operands are
    /// infix function calls.
    pub fn tighter(self) -> Option<Precedence> {
        match self {
            Precedence::Logical => Some(Precedence::Equality),
            Precedence::Equality => Some(Precedence::Relational),
            Precedence::Relational => Some(Precedence::Additive),
            Precedence::Additive => Some(Precedence::Multiplicative),
            Precedence::Multiplicative => Some(Precedence::Exponential),
            Precedence::Exponential => None,
        }
    }
}

/// Prefix operators and the function names they call.
pub const PREFIX_OPERATORS: &[(&str, &str)] = &[("!", "!"), ("not", "not"), ("-", "negate")];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tiers_walk_to_exponent() {
        let mut tier = Precedence::LOOSEST;
        let mut seen = vec![tier];
        while let Some(next) = tier.tighter() {
            assert!(next > tier);
            seen.push(next);
            tier = next;
        }
        assert_eq!(seen.len(), 6);
        assert_eq!(tier.symbols(), &["^"]);
    }
}
