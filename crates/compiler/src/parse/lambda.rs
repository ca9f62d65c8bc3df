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

use crate::ast::{Expr, LambdaExpr};
use crate::errors::SyntaxError;
use crate::parse::{Attempt, ParseContext, Scratch, content_start, get_expression, wrap_nodes};
use crate::parse_node::ParseNodeType;
use arcstr::ArcStr;
use funcscript_var::Span;
use std::sync::Arc;

/// `(a, b) => body`, `() => body` or `a => body`.
pub(crate) fn lambda_literal(ctx: &ParseContext, index: usize) -> Attempt<Expr> {
    let (attempt, missing_arrow) = lambda(ctx, index, true);
    let Some(at) = missing_arrow else {
        return attempt.map(Expr::Lambda);
    };
    let mut sc = Scratch::default();
    sc.error(SyntaxError::new(at, 0, "'=>' expected"));
    sc.fail(index)
}

/// The parenthesized form only, as used by the `name(a, b) => body` member sugar.
pub(crate) fn parameter_lambda(ctx: &ParseContext, index: usize) -> Attempt<Arc<LambdaExpr>> {
    lambda(ctx, index, false).0
}

/// The second element is where `=>` was expected after a parameter list that can only belong
/// to a lambda. `(a)` alone is left to parse as a parenthesized expression.
fn lambda(
    ctx: &ParseContext,
    index: usize,
    bare_allowed: bool,
) -> (Attempt<Arc<LambdaExpr>>, Option<usize>) {
    let mut sc = Scratch::default();
    let start = content_start(ctx, index);
    let (after_params, params, parenthesized) = match identifier_list(ctx, &mut sc, index) {
        Some((after, params)) => (after, params, true),
        None if bare_allowed => match sc.identifier(ctx, index) {
            Some(ident) => (ident.span.end(), vec![ArcStr::from(ident.name)], false),
            None => return (Attempt::no_match(index), None),
        },
        None => return (Attempt::no_match(index), None),
    };
    let Some((after_arrow, _)) =
        sc.token(ctx, after_params, ParseNodeType::LambdaArrow, &["=>"])
    else {
        let missing = (parenthesized && params.len() != 1).then(|| content_start(ctx, after_params));
        return (Attempt::no_match(index), missing);
    };

    let body_ctx = ctx.lexical();
    let Some((after_body, body)) = sc.take(after_arrow, get_expression(&body_ctx, after_arrow))
    else {
        if sc.errors.is_empty() {
            let at = content_start(ctx, after_arrow);
            sc.error(SyntaxError::new(at, 0, "Lambda body expression expected"));
        }
        return (sc.fail(index), None);
    };
    let lambda = Arc::new(LambdaExpr {
        params,
        body,
        span: Span::between(start, after_body),
    });
    (
        sc.finish_node(ParseNodeType::LambdaExpression, after_body, lambda),
        None,
    )
}

/// `(a, b, ...)`, possibly empty. Anything other than plain identifiers is not a match.
fn identifier_list(
    ctx: &ParseContext,
    sc: &mut Scratch,
    index: usize,
) -> Option<(usize, Vec<ArcStr>)> {
    let mut list_sc = Scratch::default();
    let (mut current_index, _) = list_sc.token(ctx, index, ParseNodeType::OpenBrace, &["("])?;
    let mut params = vec![];
    if let Some(first) = list_sc.identifier(ctx, current_index) {
        params.push(ArcStr::from(first.name));
        current_index = first.span.end();
        while let Some((after_comma, _)) =
            list_sc.token(ctx, current_index, ParseNodeType::ListSeparator, &[","])
        {
            let ident = list_sc.identifier(ctx, after_comma)?;
            params.push(ArcStr::from(ident.name));
            current_index = ident.span.end();
        }
    }
    let (after_close, _) =
        list_sc.token(ctx, current_index, ParseNodeType::CloseBrace, &[")"])?;
    sc.extend(wrap_nodes(ParseNodeType::IdentifierList, list_sc.nodes));
    Some((after_close, params))
}
