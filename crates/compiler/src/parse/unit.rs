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
use crate::lexical;
use crate::parse::kvc::kvc_collection;
use crate::parse::{Attempt, ParseContext, Scratch, binding, control, first_of, lambda, list, template};
use crate::parse_node::{ParseNode, ParseNodeType};
use funcscript_var::{Span, Var, v_bool, v_none};
use std::sync::Arc;

/// The innermost grammar level. Alternatives are tried in order; the first to match wins.
pub(crate) fn unit(ctx: &ParseContext, index: usize) -> Attempt<Expr> {
    first_of(
        ctx,
        index,
        &[
            binding::language_binding,
            template::string_template,
            simple_string,
            number,
            list::list_expression,
            collection,
            control::if_then_else,
            control::case_expression,
            control::switch_expression,
            lambda::lambda_literal,
            keyword_literal,
            control::prefix_operator,
            identifier_reference,
            control::parenthesis,
        ],
    )
}

fn simple_string(ctx: &ParseContext, index: usize) -> Attempt<Expr> {
    let mut sc = Scratch::default();
    let start = sc.space(ctx, index);
    match lexical::get_simple_string(ctx.src, start) {
        Ok(Some((end, text))) => {
            let span = Span::between(start, end);
            sc.push(ParseNode::leaf(ParseNodeType::LiteralString, span));
            sc.finish(end, Expr::literal(Var::mk_string(text), span))
        }
        Ok(None) => Attempt::no_match(index),
        Err(e) => {
            sc.error(e);
            sc.fail(index)
        }
    }
}

fn number(ctx: &ParseContext, index: usize) -> Attempt<Expr> {
    let mut sc = Scratch::default();
    let start = sc.space(ctx, index);
    match lexical::get_number(ctx.src, start) {
        Ok(Some((end, value, kind))) => {
            let span = Span::between(start, end);
            sc.push(ParseNode::leaf(kind, span));
            sc.finish(end, Expr::literal(value, span))
        }
        Ok(None) => Attempt::no_match(index),
        Err(e) => {
            sc.error(e);
            sc.fail(index)
        }
    }
}

fn collection(ctx: &ParseContext, index: usize) -> Attempt<Expr> {
    kvc_collection(ctx, index, false).map(|kvc| Expr::Kvc(Arc::new(kvc)))
}

fn keyword_literal(ctx: &ParseContext, index: usize) -> Attempt<Expr> {
    let (start, space) = lexical::skip_space(ctx.src, index);
    for (keyword, kind) in [
        ("true", ParseNodeType::LiteralBoolean),
        ("false", ParseNodeType::LiteralBoolean),
        ("null", ParseNodeType::LiteralNull),
    ] {
        let Some(end) = lexical::get_keyword(ctx.src, start, keyword) else {
            continue;
        };
        let value = match keyword {
            "true" => v_bool(true),
            "false" => v_bool(false),
            _ => v_none(),
        };
        let span = Span::between(start, end);
        let mut sc = Scratch::default();
        sc.extend(space);
        sc.push(ParseNode::leaf(kind, span));
        return sc.finish(end, Expr::literal(value, span));
    }
    Attempt::no_match(index)
}

fn identifier_reference(ctx: &ParseContext, index: usize) -> Attempt<Expr> {
    let mut sc = Scratch::default();
    let Some(ident) = sc.identifier(ctx, index) else {
        return sc.fail(index);
    };
    let reference = Expr::reference(ident.name, ctx.from_parent, ident.span);
    sc.finish(ident.span.end(), reference)
}
