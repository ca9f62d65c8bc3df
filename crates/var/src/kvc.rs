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
use arcstr::ArcStr;
use indexmap::IndexMap;
use std::sync::Arc;
use unicase::UniCase;

/// A scope, or an object value: both are key/value collections.
pub type Scope = Arc<dyn KeyValueCollection>;

/// Ordered, case-insensitive string-keyed mapping with an optional parent used as the lookup
/// fallback. This is the only contract the evaluator relies on for scopes, so hosts hand data in
/// by implementing it.
pub trait KeyValueCollection: Send + Sync {
    /// Value for `key` in this collection only, without consulting the parent.
    fn get_local(&self, key: &str) -> Option<Var>;

    fn contains_local(&self, key: &str) -> bool;

    /// Keys in declaration order, with their original casing.
    fn keys(&self) -> Vec<ArcStr>;

    fn parent(&self) -> Option<&Scope>;

    /// Local lookup first, then the parent chain. `None` means the key is undefined everywhere.
    fn get(&self, key: &str) -> Option<Var> {
        if let Some(v) = self.get_local(key) {
            return Some(v);
        }
        self.parent().and_then(|p| p.get(key))
    }

    fn is_defined(&self, key: &str, hierarchy: bool) -> bool {
        if self.contains_local(key) {
            return true;
        }
        hierarchy && self.parent().is_some_and(|p| p.is_defined(key, true))
    }

    /// All local pairs in key order. For lazy collections this forces every member.
    fn get_all(&self) -> Vec<(ArcStr, Var)> {
        self.keys()
            .into_iter()
            .filter_map(|k| {
                let v = self.get_local(&k)?;
                Some((k, v))
            })
            .collect()
    }
}

/// An eagerly provided collection: builtin tables, host records, merge results.
#[derive(Clone, Default)]
pub struct SimpleKvc {
    entries: IndexMap<UniCase<ArcStr>, Var>,
    parent: Option<Scope>,
}

impl SimpleKvc {
    pub fn new(parent: Option<Scope>) -> Self {
        Self {
            entries: IndexMap::new(),
            parent,
        }
    }

    pub fn from_pairs<K, I>(parent: Option<Scope>, pairs: I) -> Self
    where
        K: Into<ArcStr>,
        I: IntoIterator<Item = (K, Var)>,
    {
        let mut kvc = Self::new(parent);
        for (k, v) in pairs {
            kvc.insert(k, v);
        }
        kvc
    }

    /// Insert or replace. A replaced key keeps its original position.
    pub fn insert<K: Into<ArcStr>>(&mut self, key: K, value: Var) {
        self.entries.insert(UniCase::new(key.into()), value);
    }

    #[must_use]
    pub fn with<K: Into<ArcStr>>(mut self, key: K, value: Var) -> Self {
        self.insert(key, value);
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueCollection for SimpleKvc {
    fn get_local(&self, key: &str) -> Option<Var> {
        self.entries.get(&UniCase::new(ArcStr::from(key))).cloned()
    }

    fn contains_local(&self, key: &str) -> bool {
        self.entries.contains_key(&UniCase::new(ArcStr::from(key)))
    }

    fn keys(&self) -> Vec<ArcStr> {
        self.entries.keys().map(|k| k.clone().into_inner()).collect()
    }

    fn parent(&self) -> Option<&Scope> {
        self.parent.as_ref()
    }
}

/// Deep, right-biased merge of two collections, computed on demand. Neither input is modified.
pub struct MergedKvc {
    left: Scope,
    right: Scope,
}

impl MergedKvc {
    pub fn new(left: Scope, right: Scope) -> Self {
        Self { left, right }
    }
}

/// `left + right` for collections: keys present on both sides merge recursively when both
/// values are collections, otherwise the right-hand value wins.
pub fn merge_kvc(left: Scope, right: Scope) -> Var {
    Var::mk_kvc(Arc::new(MergedKvc::new(left, right)))
}

impl KeyValueCollection for MergedKvc {
    fn get_local(&self, key: &str) -> Option<Var> {
        let right = self.right.get_local(key);
        let Some(right) = right else {
            return self.left.get_local(key);
        };
        if let Some(right_kvc) = right.as_kvc() {
            if let Some(left) = self.left.get_local(key) {
                if let Some(left_kvc) = left.as_kvc() {
                    return Some(merge_kvc(left_kvc.clone(), right_kvc.clone()));
                }
            }
        }
        Some(right)
    }

    fn contains_local(&self, key: &str) -> bool {
        self.right.contains_local(key) || self.left.contains_local(key)
    }

    fn keys(&self) -> Vec<ArcStr> {
        let mut keys = self.left.keys();
        for k in self.right.keys() {
            let exists = keys
                .iter()
                .any(|existing| UniCase::new(existing.as_str()) == UniCase::new(k.as_str()));
            if !exists {
                keys.push(k);
            }
        }
        keys
    }

    fn parent(&self) -> Option<&Scope> {
        self.left.parent()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{v_int, v_kvc_pairs, v_list, v_str};
    use pretty_assertions::assert_eq;

    fn kvc(v: Var) -> Scope {
        v.as_kvc().unwrap().clone()
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let k = SimpleKvc::new(None).with("Name", v_str("x"));
        assert_eq!(k.get("NAME"), Some(v_str("x")));
        assert!(k.is_defined("name", false));
        assert_eq!(k.keys(), vec![ArcStr::from("Name")]);
    }

    #[test]
    fn test_lookup_falls_back_to_parent() {
        let parent: Scope = Arc::new(SimpleKvc::new(None).with("outer", v_int(1)));
        let child = SimpleKvc::new(Some(parent)).with("inner", v_int(2));
        assert_eq!(child.get("outer"), Some(v_int(1)));
        assert_eq!(child.get_local("outer"), None);
        assert!(child.is_defined("outer", true));
        assert!(!child.is_defined("outer", false));
        assert_eq!(child.get("missing"), None);
    }

    #[test]
    fn test_merge_scalar_overrides_collection() {
        let left = v_kvc_pairs(&[("a", v_kvc_pairs(&[("x", v_int(1)), ("y", v_int(2))]))]);
        let right = v_kvc_pairs(&[("a", v_int(5))]);
        let merged = merge_kvc(kvc(left), kvc(right));
        assert_eq!(merged, v_kvc_pairs(&[("a", v_int(5))]));
    }

    #[test]
    fn test_merge_is_deep_and_leaves_inputs_alone() {
        let left = v_kvc_pairs(&[
            (
                "a",
                v_kvc_pairs(&[("x", v_int(1)), ("y", v_kvc_pairs(&[("z", v_int(2))]))]),
            ),
            ("b", v_int(3)),
        ]);
        let right = v_kvc_pairs(&[
            (
                "a",
                v_kvc_pairs(&[("x", v_int(10)), ("y", v_kvc_pairs(&[("w", v_int(4))]))]),
            ),
            ("c", v_int(5)),
        ]);
        let before = format!("{left:?}");
        let merged = merge_kvc(kvc(left.clone()), kvc(right));
        let expected = v_kvc_pairs(&[
            (
                "a",
                v_kvc_pairs(&[
                    ("x", v_int(10)),
                    ("y", v_kvc_pairs(&[("z", v_int(2)), ("w", v_int(4))])),
                ]),
            ),
            ("b", v_int(3)),
            ("c", v_int(5)),
        ]);
        assert_eq!(merged, expected);
        assert_eq!(format!("{left:?}"), before);
    }

    #[test]
    fn test_merge_list_replaced_by_right() {
        let left = v_kvc_pairs(&[("a", v_list(&[v_int(1)]))]);
        let right = v_kvc_pairs(&[("a", v_str("s"))]);
        let merged = merge_kvc(kvc(left), kvc(right));
        assert_eq!(merged.as_kvc().unwrap().get("a"), Some(v_str("s")));
    }
}
