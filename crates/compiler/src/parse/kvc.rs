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

//! Collection literals `{k: v; ...}`, the brace-less top-level form, and the selector bodies
//! that reuse the same grammar.

use crate::ast::{Expr, KvcExpr, KvcItem};
use crate::errors::SyntaxError;
use crate::lexical;
use crate::parse::lambda::parameter_lambda;
use crate::parse::{Attempt, ParseContext, Scratch, content_start, get_expression};
use crate::parse_node::{ParseNode, ParseNodeType};
use arcstr::ArcStr;
use funcscript_var::Span;
use std::sync::Arc;

enum Item {
    Pair(KvcItem),
    Return { expr: Expr, eval_mode: bool },
}

/// A braced collection, or with `naked` set, a sequence of items with no braces around them.
pub(crate) fn kvc_collection(ctx: &ParseContext, index: usize, naked: bool) -> Attempt<KvcExpr> {
    let mut sc = Scratch::default();
    let mut current_index = index;
    let mut start = None;
    if !naked {
        let Some((after_open, _)) = sc.token(ctx, index, ParseNodeType::OpenBrace, &["{"]) else {
            return sc.fail(index);
        };
        start = Some(after_open - 1);
        current_index = after_open;
    }

    let mut items = vec![];
    let mut ret: Option<(Expr, bool)> = None;
    let mut end = current_index;
    loop {
        let item_start = content_start(ctx, current_index);
        let Some((after_item, item)) = sc.take(current_index, kvc_item(ctx, current_index, naked))
        else {
            if !sc.errors.is_empty() {
                return sc.fail(index);
            }
            break;
        };
        start.get_or_insert(item_start);
        match item {
            Item::Pair(pair) => items.push(pair),
            Item::Return { expr, eval_mode } => {
                if ret.is_some() {
                    sc.error(SyntaxError::new(
                        item_start,
                        after_item - item_start,
                        "Duplicate return statement",
                    ));
                    return sc.fail(index);
                }
                ret = Some((expr, eval_mode));
            }
        }
        current_index = after_item;
        end = after_item;

        if let Some((after_sep, _)) =
            sc.token(ctx, current_index, ParseNodeType::ListSeparator, &[",", ";"])
        {
            current_index = after_sep;
            continue;
        }
        let next = content_start(ctx, current_index);
        if ctx.at_end(next) || (!naked && ctx.src.as_bytes()[next] == b'}') {
            break;
        }
        if !ctx.src[current_index..next].contains('\n') {
            sc.error(SyntaxError::new(next, 0, "',' or ';' expected"));
            return sc.fail(index);
        }
    }

    if !naked {
        let Some((after_close, _)) =
            sc.token(ctx, current_index, ParseNodeType::CloseBrace, &["}"])
        else {
            let at = content_start(ctx, current_index);
            sc.error(SyntaxError::new(at, 0, "'}' expected"));
            return sc.fail(index);
        };
        current_index = after_close;
        end = after_close;
    } else if items.is_empty() && ret.is_none() {
        return sc.fail(index);
    }

    let (ret, eval_mode) = match ret {
        Some((expr, eval_mode)) => (Some(expr), eval_mode),
        None => (None, false),
    };
    let span = Span::between(start.unwrap_or(index), end);
    let kvc = KvcExpr::new(items, ret, eval_mode, span);
    sc.finish_node(ParseNodeType::KeyValueCollection, current_index, kvc)
}

/// One member. Alternatives, in order: `key: value`, `name(params) => body`,
/// `name {selector}`, `return`/`eval` clause, then a bare name or string meaning `name: name`.
/// The last three forms that need braces around them are not available in the naked form.
fn kvc_item(ctx: &ParseContext, index: usize, naked: bool) -> Attempt<Item> {
    let pair = key_value_pair(ctx, index);
    if pair.matched(index) || !pair.errors.is_empty() {
        return pair.map(Item::Pair);
    }
    let lambda = identifier_lambda_pair(ctx, index);
    if lambda.matched(index) || !lambda.errors.is_empty() {
        return lambda.map(Item::Pair);
    }
    if !naked {
        let selector = identifier_selector_pair(ctx, index);
        if selector.matched(index) || !selector.errors.is_empty() {
            return selector.map(Item::Pair);
        }
    }
    let ret = return_definition(ctx, index);
    if ret.matched(index) || !ret.errors.is_empty() {
        return ret.map(|(expr, eval_mode)| Item::Return { expr, eval_mode });
    }
    if naked {
        return Attempt::no_match(index);
    }
    shorthand_member(ctx, index).map(Item::Pair)
}

/// A key as written: a string or an identifier.
fn key(ctx: &ParseContext, sc: &mut Scratch, index: usize) -> Option<(ArcStr, Span)> {
    let start = sc.space(ctx, index);
    if let Ok(Some((end, text))) = lexical::get_simple_string(ctx.src, start) {
        let span = Span::between(start, end);
        sc.push(ParseNode::leaf(ParseNodeType::Key, span));
        return Some((ArcStr::from(text), span));
    }
    let span = lexical::get_identifier(ctx.src, start)?;
    sc.push(ParseNode::leaf(ParseNodeType::Key, span));
    Some((ArcStr::from(&ctx.src[span.range()]), span))
}

fn key_value_pair(ctx: &ParseContext, index: usize) -> Attempt<KvcItem> {
    let mut sc = Scratch::default();
    let Some((key, key_span)) = key(ctx, &mut sc, index) else {
        return Attempt::no_match(index);
    };
    let Some((after_colon, _)) = sc.token(ctx, key_span.end(), ParseNodeType::Colon, &[":"])
    else {
        return Attempt::no_match(index);
    };
    let Some((after_value, value)) = sc.take(after_colon, get_expression(ctx, after_colon)) else {
        if sc.errors.is_empty() {
            sc.error(SyntaxError::new(
                key_span.pos,
                key_span.len,
                format!("Value expression expected for property '{key}'"),
            ));
        }
        return sc.fail(index);
    };
    sc.finish_node(
        ParseNodeType::KeyValuePair,
        after_value,
        KvcItem { key, value },
    )
}

/// `name(a, b) => body`, sugar for `name: (a, b) => body`.
fn identifier_lambda_pair(ctx: &ParseContext, index: usize) -> Attempt<KvcItem> {
    let mut sc = Scratch::default();
    let Some(ident) = sc.identifier(ctx, index) else {
        return Attempt::no_match(index);
    };
    sc.mark_key(ident.span);
    let after_ident = ident.span.end();
    let lambda = parameter_lambda(ctx, after_ident);
    if !lambda.matched(after_ident) {
        return Attempt {
            next: index,
            value: None,
            nodes: vec![],
            errors: lambda.errors,
        };
    }
    let Some((after, lambda)) = sc.take(after_ident, lambda) else {
        return sc.fail(index);
    };
    sc.finish_node(
        ParseNodeType::KeyValuePair,
        after,
        KvcItem {
            key: ArcStr::from(ident.name),
            value: Expr::Lambda(lambda),
        },
    )
}

/// `name {selector}`, sugar for `name: name {selector}`.
fn identifier_selector_pair(ctx: &ParseContext, index: usize) -> Attempt<KvcItem> {
    let mut sc = Scratch::default();
    let Some(ident) = sc.identifier(ctx, index) else {
        return Attempt::no_match(index);
    };
    sc.mark_key(ident.span);
    let after_ident = ident.span.end();
    let selector = kvc_collection(&ctx.selector(), after_ident, false);
    if !selector.matched(after_ident) {
        return Attempt {
            next: index,
            value: None,
            nodes: vec![],
            errors: selector.errors,
        };
    }
    let Some((after, selector)) = sc.take(after_ident, selector) else {
        return sc.fail(index);
    };
    let value = Expr::Selector {
        source: Box::new(Expr::reference(ident.name, true, ident.span)),
        selector: Arc::new(selector),
        span: Span::between(ident.span.pos, after),
    };
    sc.finish_node(
        ParseNodeType::KeyValuePair,
        after,
        KvcItem {
            key: ArcStr::from(ident.name),
            value,
        },
    )
}

fn return_definition(ctx: &ParseContext, index: usize) -> Attempt<(Expr, bool)> {
    let mut sc = Scratch::default();
    let (after_keyword, eval_mode) = match sc.keyword(ctx, index, "return") {
        Some(after) => (after, false),
        None => match sc.keyword(ctx, index, "eval") {
            Some(after) => (after, true),
            None => return Attempt::no_match(index),
        },
    };
    let Some((after, expr)) = sc.take(after_keyword, get_expression(ctx, after_keyword)) else {
        if sc.errors.is_empty() {
            let at = content_start(ctx, after_keyword);
            sc.error(SyntaxError::new(at, 0, "return/eval expression expected"));
        }
        return sc.fail(index);
    };
    sc.finish_node(ParseNodeType::ExpressionInBrace, after, (expr, eval_mode))
}

/// A bare identifier or string: the member of that name taken from the enclosing scope.
fn shorthand_member(ctx: &ParseContext, index: usize) -> Attempt<KvcItem> {
    let mut sc = Scratch::default();
    let Some((key, span)) = key(ctx, &mut sc, index) else {
        return Attempt::no_match(index);
    };
    let value = Expr::Reference {
        name: key.clone(),
        from_parent: true,
        span,
    };
    sc.finish(span.end(), KvcItem { key, value })
}
