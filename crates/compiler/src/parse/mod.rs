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

//! Hand-written recursive-descent parser. Each grammar rule is a function
//! `(context, index) -> Attempt`, building the AST and the diagnostic parse tree together.
//!
//! A rule that does not match returns an attempt with no value and `next == index`; it never
//! raises. Every attempt owns its diagnostic nodes and error list. The caller either commits
//! them (the rule matched, or it failed with diagnostics and so decides the alternative) or
//! drops them.

mod binding;
mod chain;
mod control;
mod infix;
mod kvc;
mod lambda;
mod list;
mod template;
mod unit;

use crate::ast::Expr;
use crate::binding::LanguageBindingRegistry;
use crate::errors::{CompileError, SyntaxError};
use crate::lexical;
use crate::parse_node::{ParseNode, ParseNodeType};
use funcscript_var::{KeyValueCollection, Span};
use tracing::{debug, trace};

pub(crate) use infix::get_expression;

/// Parser settings.
#[derive(Debug, Clone, Default)]
pub struct CompileOptions {
    /// Languages available to ```` ```lang ``` ```` blocks.
    pub language_bindings: LanguageBindingRegistry,
    /// Treat the whole input as literal text with `${expr}` holes instead of an expression.
    pub fs_template: bool,
}

/// The outcome of parsing a source text.
#[derive(Debug, Clone)]
pub struct ParseOutcome {
    /// The executable tree, absent if any syntax error was reported.
    pub expr: Option<Expr>,
    /// The diagnostic tree, covering the whole consumed input.
    pub node: Option<ParseNode>,
    pub next_index: usize,
    pub errors: Vec<SyntaxError>,
}

impl ParseOutcome {
    pub fn is_ok(&self) -> bool {
        self.expr.is_some() && self.errors.is_empty()
    }
}

#[derive(Clone, Copy)]
pub(crate) struct ParseContext<'a> {
    pub src: &'a str,
    /// Where operator and keyword functions are resolved from.
    pub provider: &'a dyn KeyValueCollection,
    pub options: &'a CompileOptions,
    /// Identifier references skip the innermost collection (selector bodies).
    pub from_parent: bool,
}

impl<'a> ParseContext<'a> {
    pub fn selector(&self) -> Self {
        Self {
            from_parent: true,
            ..*self
        }
    }

    pub fn lexical(&self) -> Self {
        Self {
            from_parent: false,
            ..*self
        }
    }

    /// The function bound to `symbol` in the parse scope as a literal. If the parse scope does
    /// not define it, the name is left for the evaluation scope to resolve.
    pub fn function_literal(&self, symbol: &str, span: Span) -> Expr {
        match self.provider.get(symbol) {
            Some(value) => Expr::literal(value, span),
            None => Expr::reference(symbol, false, span),
        }
    }

    pub fn at_end(&self, index: usize) -> bool {
        index >= self.src.len()
    }
}

/// An identifier as scanned from the source.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Ident<'a> {
    pub name: &'a str,
    pub span: Span,
}

/// The result of trying one rule at one position.
pub(crate) struct Attempt<T> {
    pub next: usize,
    pub value: Option<T>,
    pub nodes: Vec<ParseNode>,
    pub errors: Vec<SyntaxError>,
}

impl<T> Attempt<T> {
    pub fn no_match(index: usize) -> Self {
        Self {
            next: index,
            value: None,
            nodes: vec![],
            errors: vec![],
        }
    }

    pub fn matched(&self, index: usize) -> bool {
        self.value.is_some() && self.next > index
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Attempt<U> {
        Attempt {
            next: self.next,
            value: self.value.map(f),
            nodes: self.nodes,
            errors: self.errors,
        }
    }
}

/// Scratch buffer a rule accumulates into before deciding whether to commit.
#[derive(Default)]
pub(crate) struct Scratch {
    pub nodes: Vec<ParseNode>,
    pub errors: Vec<SyntaxError>,
}

impl Scratch {
    pub fn push(&mut self, node: ParseNode) {
        if node.kind == ParseNodeType::WhiteSpace {
            if let Some(last) = self.nodes.last_mut() {
                if last.kind == ParseNodeType::WhiteSpace {
                    if last.span.end() >= node.span.end() && last.span.pos <= node.span.pos {
                        return;
                    }
                    if last.span.end() >= node.span.pos {
                        last.span = last.span.union(&node.span);
                        return;
                    }
                }
            }
        }
        if node.is_whitespace() && self.nodes.iter().rev().take(2).any(|n| n == &node) {
            return;
        }
        self.nodes.push(node);
    }

    pub fn extend(&mut self, nodes: Vec<ParseNode>) {
        for node in nodes {
            self.push(node);
        }
    }

    pub fn error(&mut self, error: SyntaxError) {
        self.errors.push(error);
    }

    pub fn absorb(&mut self, other: Scratch) {
        self.extend(other.nodes);
        self.errors.extend(other.errors);
    }

    pub fn absorb_errors(&mut self, other: Scratch) {
        self.errors.extend(other.errors);
    }

    /// Commit `attempt` if it matched. Otherwise keep only its diagnostics.
    pub fn take<T>(&mut self, index: usize, attempt: Attempt<T>) -> Option<(usize, T)> {
        if attempt.matched(index) {
            self.extend(attempt.nodes);
            self.errors.extend(attempt.errors);
            let next = attempt.next;
            return attempt.value.map(|v| (next, v));
        }
        self.errors.extend(attempt.errors);
        None
    }

    /// Commit `attempt` if it matched. Otherwise drop it, diagnostics included.
    pub fn probe<T>(&mut self, index: usize, attempt: Attempt<T>) -> Option<(usize, T)> {
        if attempt.matched(index) {
            return self.take(index, attempt);
        }
        None
    }

    pub fn space(&mut self, ctx: &ParseContext, index: usize) -> usize {
        let (next, nodes) = lexical::skip_space(ctx.src, index);
        self.extend(nodes);
        next
    }

    /// Skip space, then match one of `candidates`. Nothing is recorded unless it matches.
    pub fn token<'c>(
        &mut self,
        ctx: &ParseContext,
        index: usize,
        kind: ParseNodeType,
        candidates: &[&'c str],
    ) -> Option<(usize, &'c str)> {
        let (start, space) = lexical::skip_space(ctx.src, index);
        let (end, matched) = lexical::match_token(ctx.src, start, candidates)?;
        self.extend(space);
        self.push(ParseNode::leaf(kind, Span::between(start, end)));
        Some((end, matched))
    }

    pub fn keyword(&mut self, ctx: &ParseContext, index: usize, keyword: &str) -> Option<usize> {
        let (start, space) = lexical::skip_space(ctx.src, index);
        let end = lexical::get_keyword(ctx.src, start, keyword)?;
        self.extend(space);
        self.push(ParseNode::leaf(
            ParseNodeType::KeyWord,
            Span::between(start, end),
        ));
        Some(end)
    }

    pub fn identifier<'a>(&mut self, ctx: &ParseContext<'a>, index: usize) -> Option<Ident<'a>> {
        let (start, space) = lexical::skip_space(ctx.src, index);
        let span = lexical::get_identifier(ctx.src, start)?;
        self.extend(space);
        self.push(ParseNode::leaf(ParseNodeType::Identifier, span));
        Some(Ident {
            name: &ctx.src[span.range()],
            span,
        })
    }

    /// Re-tag the most recent node covering exactly `span` as a key.
    pub fn mark_key(&mut self, span: Span) {
        if let Some(node) = self.nodes.iter_mut().rev().find(|n| {
            n.span == span
                && matches!(
                    n.kind,
                    ParseNodeType::Identifier
                        | ParseNodeType::LiteralString
                        | ParseNodeType::StringTemplate
                )
        }) {
            node.kind = ParseNodeType::Key;
        }
    }

    /// Matched: hand back everything collected so far along with the value.
    pub fn finish<T>(self, next: usize, value: T) -> Attempt<T> {
        Attempt {
            next,
            value: Some(value),
            nodes: self.nodes,
            errors: self.errors,
        }
    }

    /// Did not match. Diagnostics travel with the failure so the caller can surface them.
    pub fn fail<T>(self, index: usize) -> Attempt<T> {
        Attempt {
            next: index,
            value: None,
            nodes: vec![],
            errors: self.errors,
        }
    }

    /// Matched, wrapping the collected nodes into one `kind` node. Leading and trailing
    /// whitespace stays outside so the node's span is the union of its content.
    pub fn finish_node<T>(mut self, kind: ParseNodeType, next: usize, value: T) -> Attempt<T> {
        self.nodes = wrap_nodes(kind, std::mem::take(&mut self.nodes));
        self.finish(next, value)
    }
}

/// Wrap `nodes` into a single `kind` node, hoisting leading and trailing whitespace out.
pub(crate) fn wrap_nodes(kind: ParseNodeType, mut nodes: Vec<ParseNode>) -> Vec<ParseNode> {
    let Some(first) = nodes.iter().position(ParseNode::is_content) else {
        return nodes;
    };
    let last = nodes
        .iter()
        .rposition(ParseNode::is_content)
        .unwrap_or(first);
    let trailing = nodes.split_off(last + 1);
    let content = nodes.split_off(first);
    let span = content[0].span.union(&content[content.len() - 1].span);
    nodes.push(ParseNode::new(kind, span, content));
    nodes.extend(trailing);
    nodes
}

/// Offset of the first non-space character at or after `index`.
pub(crate) fn content_start(ctx: &ParseContext, index: usize) -> usize {
    lexical::skip_space(ctx.src, index).0
}

/// Try `rules` in order at `index`. The first alternative that matches, or that fails with
/// diagnostics, decides. A rule that recognized its form but found it malformed reports errors;
/// one that did not recognize it at all stays silent and the next alternative is tried.
pub(crate) fn first_of<T>(
    ctx: &ParseContext,
    index: usize,
    rules: &[fn(&ParseContext, usize) -> Attempt<T>],
) -> Attempt<T> {
    for rule in rules {
        let attempt = rule(ctx, index);
        if attempt.matched(index) || !attempt.errors.is_empty() {
            return attempt;
        }
    }
    Attempt::no_match(index)
}

/// Parse `source`, resolving operator and keyword functions from `provider`.
pub fn parse(provider: &dyn KeyValueCollection, source: &str, options: &CompileOptions) -> ParseOutcome {
    trace!(len = source.len(), fs_template = options.fs_template, "parse");
    let ctx = ParseContext {
        src: source,
        provider,
        options,
        from_parent: false,
    };
    let outcome = if options.fs_template {
        let attempt = template::fs_template(&ctx, 0);
        if attempt.errors.is_empty() {
            finish_root(&ctx, attempt, source.len())
        } else {
            ParseOutcome {
                expr: None,
                node: None,
                next_index: attempt.next,
                errors: attempt.errors,
            }
        }
    } else {
        root_expression(&ctx)
    };
    debug!(
        len = source.len(),
        next_index = outcome.next_index,
        errors = outcome.errors.len(),
        "parsed expression"
    );
    outcome
}

/// Parse `source` and return its tree, or the diagnostics as a [`CompileError`].
pub fn compile(
    provider: &dyn KeyValueCollection,
    source: &str,
    options: &CompileOptions,
) -> Result<Expr, CompileError> {
    let outcome = parse(provider, source, options);
    if outcome.errors.is_empty() {
        if let Some(expr) = outcome.expr {
            return Ok(expr);
        }
    }
    if outcome.next_index < source.len() && outcome.next_index > 0 {
        return Err(CompileError::TrailingInput {
            position: outcome.next_index,
            errors: outcome.errors,
        });
    }
    Err(CompileError::SyntaxErrors(outcome.errors))
}

fn finish_root(ctx: &ParseContext, attempt: Attempt<Expr>, end: usize) -> ParseOutcome {
    let root = ParseNode::new(
        ParseNodeType::RootExpression,
        Span::between(0, end),
        attempt.nodes,
    );
    let ok = attempt.errors.is_empty();
    ParseOutcome {
        expr: if ok { attempt.value } else { None },
        node: Some(root),
        next_index: if ctx.at_end(end) { ctx.src.len() } else { end },
        errors: attempt.errors,
    }
}

/// Trailing `,`/`;` terminators after the root expression.
fn skip_trailing_terminators(ctx: &ParseContext, sc: &mut Scratch, index: usize) -> usize {
    let mut current = sc.space(ctx, index);
    while let Some((next, _)) = sc.token(ctx, current, ParseNodeType::ListSeparator, &[",", ";"]) {
        current = sc.space(ctx, next);
    }
    current
}

fn root_expression(ctx: &ParseContext) -> ParseOutcome {
    let index = 0;
    let naked = kvc::kvc_collection(ctx, index, true);
    let attempt = if naked.matched(index) {
        naked.map(|kvc| Expr::Kvc(std::sync::Arc::new(kvc)))
    } else {
        get_expression(ctx, index)
    };

    let mut sc = Scratch::default();
    let Some((next, expr)) = sc.take(index, attempt) else {
        if sc.errors.is_empty() {
            let at = content_start(ctx, index);
            sc.error(SyntaxError::new(at, 0, "expression expected"));
        }
        return ParseOutcome {
            expr: None,
            node: None,
            next_index: index,
            errors: sc.errors,
        };
    };

    let end = skip_trailing_terminators(ctx, &mut sc, next);
    if !ctx.at_end(end) {
        let token = ctx.src[end..].chars().next().unwrap_or(' ');
        sc.error(SyntaxError::new(
            end,
            token.len_utf8(),
            format!("Unexpected token '{token}'"),
        ));
        return ParseOutcome {
            expr: None,
            node: None,
            next_index: end,
            errors: sc.errors,
        };
    }
    finish_root(ctx, sc.finish(end, expr), end)
}

#[cfg(test)]
mod tests;
