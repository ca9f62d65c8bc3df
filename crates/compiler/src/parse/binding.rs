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

use crate::ast::{BindingHandle, Expr};
use crate::binding::FailedBinding;
use crate::errors::SyntaxError;
use crate::lexical;
use crate::parse::{Attempt, ParseContext, Scratch};
use crate::parse_node::{ParseNode, ParseNodeType};
use arcstr::ArcStr;
use funcscript_var::Span;
use std::sync::Arc;
use tracing::{debug, warn};

const FENCE: &str = "```";

/// ```` ```lang ```` up to the end of the line, then code up to the closing fence. `` \``` ``
/// inside the code stands for a literal fence.
pub(crate) fn language_binding(ctx: &ParseContext, index: usize) -> Attempt<Expr> {
    let mut sc = Scratch::default();
    let start = sc.space(ctx, index);
    let Some(after_open) = lexical::match_literal(ctx.src, start, FENCE) else {
        return Attempt::no_match(index);
    };
    let line_end = ctx.src[after_open..]
        .find('\n')
        .map_or(ctx.src.len(), |at| after_open + at);
    let raw_language = &ctx.src[after_open..line_end];
    let language = raw_language.trim();
    if language.is_empty() {
        sc.error(SyntaxError::new(after_open, 0, "language identifier expected"));
        return sc.fail(index);
    }
    let language_pos = after_open + (raw_language.len() - raw_language.trim_start().len());
    let language_span = Span::new(language_pos, language.len());

    let mut code = String::new();
    let mut i = (line_end + 1).min(ctx.src.len());
    let end = loop {
        if let Some(after) = lexical::match_literal(ctx.src, i, "\\```") {
            code.push_str(FENCE);
            i = after;
            continue;
        }
        if let Some(after) = lexical::match_literal(ctx.src, i, FENCE) {
            break after;
        }
        let Some(c) = ctx.src.get(i..).and_then(|rest| rest.chars().next()) else {
            sc.error(SyntaxError::new(ctx.src.len(), 0, "closing ``` expected"));
            return sc.fail(index);
        };
        code.push(c);
        i += c.len_utf8();
    };

    let Some(binding) = ctx.options.language_bindings.get(language) else {
        sc.error(SyntaxError::new(
            language_span.pos,
            language_span.len,
            format!("Language binding '{language}' is not registered."),
        ));
        return sc.fail(index);
    };
    let compiled = match binding.compile(&code) {
        Ok(compiled) => compiled,
        Err(message) => {
            warn!(language, %message, "language binding failed to compile");
            Arc::new(FailedBinding {
                language: language.to_string(),
                message,
            })
        }
    };
    debug!(language, len = code.len(), "compiled language binding");

    let span = Span::between(start, end);
    sc.push(ParseNode::leaf(ParseNodeType::LanguageBinding, span));
    sc.finish(
        end,
        Expr::LanguageBinding {
            language: ArcStr::from(language),
            code: ArcStr::from(code),
            handle: BindingHandle(compiled),
            span,
        },
    )
}
