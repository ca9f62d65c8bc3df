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

use std::fmt::{Display, Formatter};
use std::ops::Range;

/// A `(position, length)` window into the source text, in bytes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Span {
    pub pos: usize,
    pub len: usize,
}

impl Span {
    pub fn new(pos: usize, len: usize) -> Self {
        Self { pos, len }
    }

    /// The span covering `start..end`. An inverted range collapses to zero width at `start`.
    pub fn between(start: usize, end: usize) -> Self {
        Self {
            pos: start,
            len: end.saturating_sub(start),
        }
    }

    pub fn end(&self) -> usize {
        self.pos + self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn range(&self) -> Range<usize> {
        self.pos..self.end()
    }

    /// Smallest span containing both.
    pub fn union(&self, other: &Span) -> Span {
        Span::between(self.pos.min(other.pos), self.end().max(other.end()))
    }

    /// The text this span covers, or `None` if it falls outside `source` or off a char boundary.
    pub fn slice<'a>(&self, source: &'a str) -> Option<&'a str> {
        source.get(self.range())
    }
}

impl Display for Span {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}+{}", self.pos, self.len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_union_is_order_independent() {
        let a = Span::new(2, 3);
        let b = Span::new(10, 1);
        assert_eq!(a.union(&b), Span::new(2, 9));
        assert_eq!(b.union(&a), Span::new(2, 9));
    }

    #[test]
    fn test_slice() {
        let src = "1+error(\"boom\")";
        assert_eq!(Span::new(2, 13).slice(src), Some("error(\"boom\")"));
        assert_eq!(Span::new(10, 40).slice(src), None);
    }
}
