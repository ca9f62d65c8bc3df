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

use crate::ast::Expr;
use crate::errors::SyntaxError;
use crate::parse::kvc::kvc_collection;
use crate::parse::unit::unit;
use crate::parse::{Attempt, ParseContext, Scratch, get_expression};
use crate::parse_node::ParseNodeType;
use funcscript_var::{Span, Var};
use std::sync::Arc;

/// A unit followed by any number of calls `(..)`/`[..]`, member accesses `.x`/`?.x` and
/// selectors `{..}`.
pub(crate) fn call_chain(ctx: &ParseContext, index: usize) -> Attempt<Expr> {
    let mut sc = Scratch::default();
    let Some((mut current_index, mut expr)) = sc.take(index, unit(ctx, index)) else {
        return sc.fail(index);
    };

    loop {
        let start = expr.span().pos;

        let params = call_parameters(ctx, current_index);
        if params.matched(current_index) {
            let Some((after, args)) = sc.take(current_index, params) else {
                break;
            };
            expr = Expr::call(expr, args, Span::between(start, after));
            current_index = after;
            continue;
        }
        if !params.errors.is_empty() {
            sc.errors.extend(params.errors);
            return sc.fail(index);
        }

        let member = member_access(ctx, current_index);
        if member.matched(current_index) {
            let Some((after, (symbol_span, symbol, name))) = sc.take(current_index, member) else {
                break;
            };
            expr = Expr::call(
                ctx.function_literal(symbol, symbol_span),
                vec![expr, name],
                Span::between(start, after),
            );
            current_index = after;
            continue;
        }
        if !member.errors.is_empty() {
            sc.errors.extend(member.errors);
            return sc.fail(index);
        }

        let selector = kvc_collection(&ctx.selector(), current_index, false);
        if selector.matched(current_index) {
            let Some((after, selector)) = sc.take(current_index, selector) else {
                break;
            };
            expr = Expr::Selector {
                source: Box::new(expr),
                selector: Arc::new(selector),
                span: Span::between(start, after),
            };
            current_index = after;
            continue;
        }
        if !selector.errors.is_empty() {
            sc.errors.extend(selector.errors);
            return sc.fail(index);
        }
        break;
    }

    sc.finish(current_index, expr)
}

/// `(a, b, ...)` or `[a, b, ...]` after a callee.
fn call_parameters(ctx: &ParseContext, index: usize) -> Attempt<Vec<Expr>> {
    for (open, close) in [("(", ")"), ("[", "]")] {
        let attempt = delimited_parameters(ctx, index, open, close);
        if attempt.matched(index) || !attempt.errors.is_empty() {
            return attempt;
        }
    }
    Attempt::no_match(index)
}

fn delimited_parameters(
    ctx: &ParseContext,
    index: usize,
    open: &'static str,
    close: &'static str,
) -> Attempt<Vec<Expr>> {
    let mut sc = Scratch::default();
    let Some((mut current_index, _)) = sc.token(ctx, index, ParseNodeType::OpenBrace, &[open])
    else {
        return sc.fail(index);
    };

    let mut params = vec![];
    if let Some((after, first)) = sc.take(current_index, get_expression(ctx, current_index)) {
        params.push(first);
        current_index = after;
        while let Some((after_comma, _)) =
            sc.token(ctx, current_index, ParseNodeType::ListSeparator, &[","])
        {
            match sc.take(after_comma, get_expression(ctx, after_comma)) {
                Some((after, param)) => {
                    params.push(param);
                    current_index = after;
                }
                None => {
                    sc.error(SyntaxError::new(after_comma, 0, "Parameter for call expected"));
                    return sc.fail(index);
                }
            }
        }
    } else if !sc.errors.is_empty() {
        return sc.fail(index);
    }

    let Some((after_close, _)) = sc.token(ctx, current_index, ParseNodeType::CloseBrace, &[close])
    else {
        sc.error(SyntaxError::new(current_index, 0, format!("'{close}' expected")));
        return sc.fail(index);
    };
    sc.finish_node(ParseNodeType::FunctionParameterList, after_close, params)
}

/// `.name` or `?.name`. Yields the operator's span and symbol plus the member name literal.
fn member_access(ctx: &ParseContext, index: usize) -> Attempt<(Span, &'static str, Expr)> {
    let mut sc = Scratch::default();
    let Some((after_op, symbol)) = sc.token(ctx, index, ParseNodeType::Operator, &[".", "?."])
    else {
        return sc.fail(index);
    };
    let symbol_span = Span::between(after_op - symbol.len(), after_op);
    let Some(ident) = sc.identifier(ctx, after_op) else {
        sc.error(SyntaxError::new(after_op, 0, "member identifier expected"));
        return sc.fail(index);
    };
    let name = Expr::literal(Var::mk_str(ident.name), ident.span);
    sc.finish_node(
        ParseNodeType::MemberAccess,
        ident.span.end(),
        (symbol_span, symbol, name),
    )
}
