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

//! Keyword-led forms (`if`, `case`, `switch`), prefix operators and parentheses.

use crate::ast::Expr;
use crate::errors::SyntaxError;
use crate::parse::chain::call_chain;
use crate::parse::{Attempt, ParseContext, Scratch, content_start, get_expression};
use crate::parse_node::ParseNodeType;
use crate::precedence::PREFIX_OPERATORS;
use funcscript_var::Span;

/// `if cond then a else b`. Any missing or malformed part means this is not an `if`
/// expression, leaving `if(c, a, b)` to parse as an ordinary call.
pub(crate) fn if_then_else(ctx: &ParseContext, index: usize) -> Attempt<Expr> {
    let mut sc = Scratch::default();
    let start = content_start(ctx, index);
    let Some(after_if) = sc.keyword(ctx, index, "if") else {
        return Attempt::no_match(index);
    };
    let keyword_span = Span::between(start, after_if);
    let Some((after_cond, condition)) = sc.probe(after_if, get_expression(ctx, after_if)) else {
        return Attempt::no_match(index);
    };
    let Some(after_then) = sc.keyword(ctx, after_cond, "then") else {
        return Attempt::no_match(index);
    };
    let Some((after_true, when_true)) = sc.probe(after_then, get_expression(ctx, after_then))
    else {
        return Attempt::no_match(index);
    };
    let Some(after_else) = sc.keyword(ctx, after_true, "else") else {
        return Attempt::no_match(index);
    };
    let Some((after_false, when_false)) = sc.probe(after_else, get_expression(ctx, after_else))
    else {
        return Attempt::no_match(index);
    };
    let call = Expr::call(
        ctx.function_literal("if", keyword_span),
        vec![condition, when_true, when_false],
        Span::between(start, after_false),
    );
    sc.finish_node(ParseNodeType::IfExpression, after_false, call)
}

/// `case c1: v1, c2: v2, default`.
pub(crate) fn case_expression(ctx: &ParseContext, index: usize) -> Attempt<Expr> {
    let mut sc = Scratch::default();
    let start = content_start(ctx, index);
    let Some(after_case) = sc.keyword(ctx, index, "case") else {
        return Attempt::no_match(index);
    };
    let keyword_span = Span::between(start, after_case);

    let mut args = vec![];
    let mut current_index = after_case;
    loop {
        let Some((after_cond, condition)) =
            sc.take(current_index, get_expression(ctx, current_index))
        else {
            if args.is_empty() && sc.errors.is_empty() {
                let at = content_start(ctx, current_index);
                sc.error(SyntaxError::new(at, 0, "Case condition expected"));
            }
            if !sc.errors.is_empty() {
                return sc.fail(index);
            }
            break;
        };
        current_index = after_cond;
        args.push(condition);

        let Some((after_colon, _)) = sc.token(ctx, current_index, ParseNodeType::Colon, &[":"])
        else {
            // A condition with no value is the default.
            break;
        };
        let Some((after_value, value)) = sc.take(after_colon, get_expression(ctx, after_colon))
        else {
            if sc.errors.is_empty() {
                let at = content_start(ctx, after_colon);
                sc.error(SyntaxError::new(at, 0, "Case value expected"));
            }
            return sc.fail(index);
        };
        current_index = after_value;
        args.push(value);

        let Some((after_sep, _)) =
            sc.token(ctx, current_index, ParseNodeType::ListSeparator, &[",", ";"])
        else {
            break;
        };
        current_index = after_sep;
    }

    let span = Span::between(start, args.last().map_or(after_case, |a| a.span().end()));
    let call = Expr::call(ctx.function_literal("case", keyword_span), args, span);
    sc.finish_node(ParseNodeType::Case, current_index, call)
}

/// `switch selector, m1: r1, m2: r2, default`.
pub(crate) fn switch_expression(ctx: &ParseContext, index: usize) -> Attempt<Expr> {
    let mut sc = Scratch::default();
    let start = content_start(ctx, index);
    let Some(after_switch) = sc.keyword(ctx, index, "switch") else {
        return Attempt::no_match(index);
    };
    let keyword_span = Span::between(start, after_switch);
    let Some((mut current_index, selector)) =
        sc.take(after_switch, get_expression(ctx, after_switch))
    else {
        if sc.errors.is_empty() {
            let at = content_start(ctx, after_switch);
            sc.error(SyntaxError::new(at, 0, "Switch selector expected"));
        }
        return sc.fail(index);
    };

    let mut args = vec![selector];
    while let Some((after_sep, _)) =
        sc.token(ctx, current_index, ParseNodeType::ListSeparator, &[",", ";"])
    {
        let Some((after_match, candidate)) = sc.take(after_sep, get_expression(ctx, after_sep))
        else {
            if !sc.errors.is_empty() {
                return sc.fail(index);
            }
            // A trailing separator ends the switch.
            current_index = after_sep;
            break;
        };
        current_index = after_match;
        args.push(candidate);

        let Some((after_colon, _)) = sc.token(ctx, current_index, ParseNodeType::Colon, &[":"])
        else {
            break;
        };
        let Some((after_result, result)) = sc.take(after_colon, get_expression(ctx, after_colon))
        else {
            if sc.errors.is_empty() {
                let at = content_start(ctx, after_colon);
                sc.error(SyntaxError::new(at, 0, "Selector result expected"));
            }
            return sc.fail(index);
        };
        current_index = after_result;
        args.push(result);
    }

    let span = Span::between(start, args.last().map_or(after_switch, |a| a.span().end()));
    let call = Expr::call(ctx.function_literal("switch", keyword_span), args, span);
    sc.finish_node(ParseNodeType::Switch, current_index, call)
}

/// `!x`, `not x` and `-x`. The operand is a call chain, so `-f(x).y` negates the whole chain.
pub(crate) fn prefix_operator(ctx: &ParseContext, index: usize) -> Attempt<Expr> {
    let mut sc = Scratch::default();
    let symbols: Vec<&str> = PREFIX_OPERATORS.iter().map(|(symbol, _)| *symbol).collect();
    let Some((after_op, symbol)) = sc.token(ctx, index, ParseNodeType::Operator, &symbols) else {
        return Attempt::no_match(index);
    };
    let op_span = Span::between(after_op - symbol.len(), after_op);
    let Some(function_name) = PREFIX_OPERATORS
        .iter()
        .find(|(s, _)| s.eq_ignore_ascii_case(symbol))
        .map(|(_, name)| *name)
    else {
        return Attempt::no_match(index);
    };
    let Some(function) = ctx.provider.get(function_name) else {
        sc.error(SyntaxError::new(
            op_span.pos,
            op_span.len,
            format!("Prefix operator {symbol} not defined"),
        ));
        return sc.fail(index);
    };
    let Some((after_operand, operand)) = sc.take(after_op, call_chain(ctx, after_op)) else {
        if sc.errors.is_empty() {
            let at = content_start(ctx, after_op);
            sc.error(SyntaxError::new(at, 0, format!("Operand for {symbol} expected")));
        }
        return sc.fail(index);
    };
    let call = Expr::call(
        Expr::literal(function, op_span),
        vec![operand],
        Span::between(op_span.pos, after_operand),
    );
    sc.finish_node(ParseNodeType::PrefixOperatorExpression, after_operand, call)
}

/// `( expr )`. The expression's span is widened to include the parentheses.
pub(crate) fn parenthesis(ctx: &ParseContext, index: usize) -> Attempt<Expr> {
    let mut sc = Scratch::default();
    let Some((after_open, _)) = sc.token(ctx, index, ParseNodeType::OpenBrace, &["("]) else {
        return Attempt::no_match(index);
    };
    let start = after_open - 1;
    let Some((after_expr, expr)) = sc.take(after_open, get_expression(ctx, after_open)) else {
        if sc.errors.is_empty() {
            let at = content_start(ctx, after_open);
            sc.error(SyntaxError::new(at, 0, "expression expected"));
        }
        return sc.fail(index);
    };
    let Some((after_close, _)) = sc.token(ctx, after_expr, ParseNodeType::CloseBrace, &[")"])
    else {
        let at = content_start(ctx, after_expr);
        sc.error(SyntaxError::new(at, 0, "')' expected"));
        return sc.fail(index);
    };
    let expr = expr.with_span(Span::between(start, after_close));
    sc.finish_node(ParseNodeType::ExpressionInBrace, after_close, expr)
}
