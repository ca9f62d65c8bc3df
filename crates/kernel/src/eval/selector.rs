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

//! `source{ ... }`: projecting a collection, or every collection in a list, through a selector.

use crate::eval::EvalContext;
use arcstr::ArcStr;
use funcscript_compiler::KvcExpr;
use funcscript_var::{E_TYPE_MISMATCH, KeyValueCollection, Scope, Var, Variant, v_err, v_list_iter};
use std::sync::Arc;

/// Names resolve against the selected collection first, then the scope of the selector site.
struct SelectorScope {
    source: Scope,
    site: Scope,
}

impl KeyValueCollection for SelectorScope {
    fn get_local(&self, key: &str) -> Option<Var> {
        self.source.get_local(key)
    }

    fn contains_local(&self, key: &str) -> bool {
        self.source.contains_local(key)
    }

    fn keys(&self) -> Vec<ArcStr> {
        self.source.keys()
    }

    fn parent(&self) -> Option<&Scope> {
        Some(&self.site)
    }
}

pub(crate) fn select(ctx: &Arc<EvalContext>, source: Var, selector: &Arc<KvcExpr>, site: &Scope) -> Var {
    match source.variant() {
        Variant::Kvc(kvc) => {
            let scope: Scope = Arc::new(SelectorScope {
                source: kvc.clone(),
                site: site.clone(),
            });
            ctx.evaluate_kvc(selector, scope)
        }
        Variant::List(list) => {
            v_list_iter(list.iter().map(|item| select(ctx, item, selector, site)))
        }
        Variant::None | Variant::Err(_) => source.clone(),
        _ => v_err(E_TYPE_MISMATCH.with_msg(|| {
            format!("A selector can't be applied to {}", source.type_code())
        })),
    }
}
