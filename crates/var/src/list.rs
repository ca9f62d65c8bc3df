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

use crate::Var;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

/// An ordered sequence of values. Implementations may compute items on demand, but must return
/// the identical value every time the same index is read.
pub trait FsList: Send + Sync {
    fn len(&self) -> usize;

    /// The item at `index`, or `None` past the end.
    fn get(&self, index: usize) -> Option<Var>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl dyn FsList {
    pub fn iter(&self) -> ListIter<'_> {
        ListIter {
            list: self,
            index: 0,
        }
    }

    /// Every item, forcing any that have not been computed yet.
    pub fn to_vec(&self) -> Vec<Var> {
        self.iter().collect()
    }
}

pub struct ListIter<'a> {
    list: &'a dyn FsList,
    index: usize,
}

impl Iterator for ListIter<'_> {
    type Item = Var;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.list.get(self.index)?;
        self.index += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.list.len().saturating_sub(self.index);
        (remaining, Some(remaining))
    }
}

/// An eagerly materialized list.
#[derive(Clone, Default)]
pub struct ArrayList(imbl::Vector<Var>);

impl ArrayList {
    pub fn new() -> Self {
        Self(imbl::Vector::new())
    }

    pub fn iter(&self) -> impl Iterator<Item = Var> + '_ {
        self.0.iter().cloned()
    }
}

impl From<Vec<Var>> for ArrayList {
    fn from(values: Vec<Var>) -> Self {
        Self(imbl::Vector::from(values))
    }
}

impl FromIterator<Var> for ArrayList {
    fn from_iter<T: IntoIterator<Item = Var>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Debug for ArrayList {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

impl FsList for ArrayList {
    fn len(&self) -> usize {
        self.0.len()
    }

    fn get(&self, index: usize) -> Option<Var> {
        self.0.get(index).cloned()
    }
}

/// Several lists viewed end to end without copying. Produced by `+` over lists, so the parts keep
/// whatever laziness they had.
pub struct ConcatList {
    parts: Vec<Arc<dyn FsList>>,
    len: usize,
}

impl ConcatList {
    pub fn new(parts: Vec<Arc<dyn FsList>>) -> Self {
        let len = parts.iter().map(|p| p.len()).sum();
        Self { parts, len }
    }
}

impl FsList for ConcatList {
    fn len(&self) -> usize {
        self.len
    }

    fn get(&self, index: usize) -> Option<Var> {
        let mut remaining = index;
        for part in &self.parts {
            let len = part.len();
            if remaining < len {
                return part.get(remaining);
            }
            remaining -= len;
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{v_int, v_str};

    #[test]
    fn test_concat_indexes_across_parts() {
        let a: Arc<dyn FsList> = Arc::new(ArrayList::from(vec![v_int(1), v_int(2)]));
        let b: Arc<dyn FsList> = Arc::new(ArrayList::new());
        let c: Arc<dyn FsList> = Arc::new(ArrayList::from(vec![v_str("x")]));
        let joined: Arc<dyn FsList> = Arc::new(ConcatList::new(vec![a, b, c]));

        assert_eq!(joined.len(), 3);
        assert_eq!(joined.get(2), Some(v_str("x")));
        assert_eq!(joined.get(3), None);
        assert_eq!(joined.to_vec(), vec![v_int(1), v_int(2), v_str("x")]);
    }
}
