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
use crate::lexical;
use crate::parse::{Attempt, ParseContext, Scratch, get_expression};
use crate::parse_node::ParseNodeType;
use funcscript_var::Span;

/// `[a, b; c d]`: items separated by `,`, `;` or plain whitespace.
pub(crate) fn list_expression(ctx: &ParseContext, index: usize) -> Attempt<Expr> {
    let mut sc = Scratch::default();
    let Some((after_open, _)) = sc.token(ctx, index, ParseNodeType::OpenBrace, &["["]) else {
        return sc.fail(index);
    };
    let start = after_open - 1;

    let mut items = vec![];
    let mut current_index = after_open;
    if let Some((after, first)) = sc.take(current_index, get_expression(ctx, current_index)) {
        items.push(first);
        current_index = after;
        loop {
            let separated = match sc.token(ctx, current_index, ParseNodeType::ListSeparator, &[",", ";"]) {
                Some((after, _)) => after,
                None => {
                    let (after_space, _) = lexical::skip_space(ctx.src, current_index);
                    if after_space == current_index {
                        break;
                    }
                    current_index
                }
            };
            match sc.take(separated, get_expression(ctx, separated)) {
                Some((after, item)) => {
                    items.push(item);
                    current_index = after;
                }
                None => {
                    if !sc.errors.is_empty() {
                        return sc.fail(index);
                    }
                    current_index = current_index.max(separated);
                    break;
                }
            }
        }
    } else if !sc.errors.is_empty() {
        return sc.fail(index);
    }

    let Some((after_close, _)) = sc.token(ctx, current_index, ParseNodeType::CloseBrace, &["]"])
    else {
        let at = lexical::skip_space(ctx.src, current_index).0;
        sc.error(SyntaxError::new(at, 0, "']' expected"));
        return sc.fail(index);
    };
    let list = Expr::List {
        items: items.into(),
        span: Span::between(start, after_close),
    };
    sc.finish_node(ParseNodeType::List, after_close, list)
}
