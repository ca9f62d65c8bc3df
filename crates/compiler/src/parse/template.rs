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

//! Interpolated strings `f"..{expr}.."` and whole-document `${expr}` templates.

use crate::ast::Expr;
use crate::errors::SyntaxError;
use crate::lexical;
use crate::parse::{Attempt, ParseContext, Scratch, content_start, get_expression};
use crate::parse_node::{ParseNode, ParseNodeType};
use funcscript_var::{Span, Var};

/// Literal runs are coalesced. Each hole becomes a `format` call.
struct Parts<'c, 'a> {
    ctx: &'c ParseContext<'a>,
    parts: Vec<Expr>,
    text: String,
    text_start: usize,
}

impl<'c, 'a> Parts<'c, 'a> {
    fn new(ctx: &'c ParseContext<'a>, start: usize) -> Self {
        Self {
            ctx,
            parts: vec![],
            text: String::new(),
            text_start: start,
        }
    }

    fn flush(&mut self, sc: &mut Scratch, end: usize) {
        if end > self.text_start {
            sc.push(ParseNode::leaf(
                ParseNodeType::LiteralString,
                Span::between(self.text_start, end),
            ));
        }
        if !self.text.is_empty() {
            let text = std::mem::take(&mut self.text);
            self.parts.push(Expr::literal(
                Var::mk_string(text),
                Span::between(self.text_start, end),
            ));
        }
        self.text_start = end;
    }

    fn hole(&mut self, expr: Expr, span: Span) {
        let format = self.ctx.function_literal("format", span);
        self.parts.push(Expr::call(format, vec![expr], span));
    }

    fn into_expr(self, span: Span) -> Expr {
        let mut parts = self.parts;
        match parts.len() {
            0 => Expr::literal(Var::mk_str(""), span),
            1 if matches!(parts[0], Expr::Literal { .. }) => {
                parts.remove(0).with_span(span)
            }
            _ => {
                let merge = self.ctx.function_literal("_templatemerge", span);
                Expr::call(merge, parts, span)
            }
        }
    }
}

/// `{ expr }` starting at the opening brace. Returns the offset after the closing brace.
fn hole(
    ctx: &ParseContext,
    sc: &mut Scratch,
    parts: &mut Parts,
    marker_start: usize,
    open: usize,
) -> Option<usize> {
    let after_open = open + 1;
    let Some((after_expr, expr)) = sc.take(after_open, get_expression(ctx, after_open)) else {
        if sc.errors.is_empty() {
            let at = content_start(ctx, after_open);
            sc.error(SyntaxError::new(at, 0, "expression expected"));
        }
        return None;
    };
    let Some((after_close, _)) = sc.token(ctx, after_expr, ParseNodeType::CloseBrace, &["}"])
    else {
        let at = content_start(ctx, after_expr);
        sc.error(SyntaxError::new(at, 0, "'}' expected"));
        return None;
    };
    parts.hole(expr, Span::between(marker_start, after_close));
    Some(after_close)
}

/// `f"..."`, `f'...'` or `f"""..."""`.
pub(crate) fn string_template(ctx: &ParseContext, index: usize) -> Attempt<Expr> {
    let mut sc = Scratch::default();
    let start = sc.space(ctx, index);
    let Some(after_f) = lexical::match_literal(ctx.src, start, "f") else {
        return Attempt::no_match(index);
    };
    let Some((body_start, delimiter)) =
        lexical::match_token(ctx.src, after_f, &["\"\"\"", "\"", "'"])
    else {
        return Attempt::no_match(index);
    };

    let mut parts = Parts::new(ctx, body_start);
    let mut i = body_start;
    let bytes = ctx.src.as_bytes();
    while i < ctx.src.len() {
        if let Some(end) = lexical::match_literal(ctx.src, i, delimiter) {
            parts.flush(&mut sc, i);
            let span = Span::between(start, end);
            let expr = parts.into_expr(span);
            sc.nodes = vec![ParseNode::new(
                ParseNodeType::StringTemplate,
                span,
                std::mem::take(&mut sc.nodes),
            )];
            return sc.finish(end, expr);
        }
        match bytes[i] {
            b'\\' => {
                let (next, decoded) = lexical::read_escape(ctx.src, i, delimiter, true);
                parts.text.push_str(&decoded);
                i = next;
            }
            b'$' if bytes.get(i + 1) == Some(&b'{') => {
                parts.flush(&mut sc, i);
                let Some(after) = hole(ctx, &mut sc, &mut parts, i, i + 1) else {
                    return sc.fail(index);
                };
                parts.text_start = after;
                i = after;
            }
            b'{' => {
                parts.flush(&mut sc, i);
                let Some(after) = hole(ctx, &mut sc, &mut parts, i, i) else {
                    return sc.fail(index);
                };
                parts.text_start = after;
                i = after;
            }
            _ => {
                let Some(c) = ctx.src[i..].chars().next() else {
                    break;
                };
                parts.text.push(c);
                i += c.len_utf8();
            }
        }
    }
    sc.error(SyntaxError::new(
        ctx.src.len(),
        0,
        format!("'{delimiter}' expected"),
    ));
    sc.fail(index)
}

/// The whole input as literal text with `${expr}` holes. `$${` stands for a literal `${`.
pub(crate) fn fs_template(ctx: &ParseContext, index: usize) -> Attempt<Expr> {
    let mut sc = Scratch::default();
    let mut parts = Parts::new(ctx, index);
    let bytes = ctx.src.as_bytes();
    let mut i = index;
    while i < ctx.src.len() {
        if lexical::match_literal(ctx.src, i, "$${").is_some() {
            parts.text.push_str("${");
            i += 3;
            continue;
        }
        if bytes[i] == b'$' && bytes.get(i + 1) == Some(&b'{') {
            parts.flush(&mut sc, i);
            let Some(after) = hole(ctx, &mut sc, &mut parts, i, i + 1) else {
                return sc.fail(index);
            };
            parts.text_start = after;
            i = after;
            continue;
        }
        let Some(c) = ctx.src[i..].chars().next() else {
            break;
        };
        parts.text.push(c);
        i += c.len_utf8();
    }
    parts.flush(&mut sc, ctx.src.len());
    let span = Span::between(index, ctx.src.len());
    let expr = parts.into_expr(span);
    sc.finish_node(ParseNodeType::StringTemplate, ctx.src.len(), expr)
}
