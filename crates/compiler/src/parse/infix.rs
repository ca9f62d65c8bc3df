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

//! The six-tier operator cascade and the `a F b ~ c` infix call form.

use crate::ast::Expr;
use crate::errors::SyntaxError;
use crate::parse::chain::call_chain;
use crate::parse::{Attempt, ParseContext, Scratch};
use crate::parse_node::ParseNodeType;
use crate::precedence::Precedence;
use funcscript_var::{CallType, Span};

pub(crate) fn get_expression(ctx: &ParseContext, index: usize) -> Attempt<Expr> {
    infix_level(ctx, Precedence::LOOSEST, index)
}

fn operand(ctx: &ParseContext, tier: Precedence, index: usize) -> Attempt<Expr> {
    match tier.tighter() {
        Some(tighter) => infix_level(ctx, tighter, index),
        None => infix_function_call(ctx, index),
    }
}

/// `operand (op operand)*` for the operators of `tier`. Consecutive uses of the same operator
/// collapse into one call with all of the operands.
fn infix_level(ctx: &ParseContext, tier: Precedence, index: usize) -> Attempt<Expr> {
    let mut sc = Scratch::default();
    let Some((mut current_index, mut current)) = sc.take(index, operand(ctx, tier, index)) else {
        return sc.fail(index);
    };
    let mut saw_operator = false;

    loop {
        let mut op_sc = Scratch::default();
        let Some((after_op, symbol)) =
            op_sc.token(ctx, current_index, ParseNodeType::Operator, tier.symbols())
        else {
            break;
        };
        let op_span = Span::between(after_op - symbol.len(), after_op);

        let mut operands = vec![current];
        let mut next_index = after_op;
        loop {
            match op_sc.take(next_index, operand(ctx, tier, next_index)) {
                Some((after, expr)) => {
                    operands.push(expr);
                    next_index = after;
                }
                None => {
                    op_sc.error(SyntaxError::new(
                        next_index,
                        0,
                        format!("Right side operand expected for {symbol}"),
                    ));
                    sc.absorb_errors(op_sc);
                    return sc.fail(index);
                }
            }
            // Only the same operator continues the run. Match against the whole tier so that
            // `=` does not claim the first half of `==`.
            let mut repeat_sc = Scratch::default();
            match repeat_sc.token(ctx, next_index, ParseNodeType::Operator, tier.symbols()) {
                Some((after, repeated)) if repeated == symbol => {
                    op_sc.absorb(repeat_sc);
                    next_index = after;
                }
                _ => break,
            }
        }

        let start = operands[0].span();
        let end = operands[operands.len() - 1].span();
        current = Expr::call(
            ctx.function_literal(symbol, op_span),
            operands,
            start.union(&end),
        );
        sc.absorb(op_sc);
        current_index = next_index;
        saw_operator = true;
    }

    if saw_operator {
        sc.finish_node(ParseNodeType::InfixExpression, current_index, current)
    } else {
        sc.finish(current_index, current)
    }
}

/// `chain (dual chain (~ chain)*)?`, where `dual` names a function whose call type is
/// [`CallType::Dual`] in the parse scope.
fn infix_function_call(ctx: &ParseContext, index: usize) -> Attempt<Expr> {
    let mut sc = Scratch::default();
    let Some((after_first, first)) = sc.take(index, call_chain(ctx, index)) else {
        return sc.fail(index);
    };

    let mut dual_sc = Scratch::default();
    let Some(ident) = dual_sc.identifier(ctx, after_first) else {
        return sc.finish(after_first, first);
    };
    let Some(function) = ctx.provider.get(ident.name) else {
        return sc.finish(after_first, first);
    };
    let is_dual = function
        .as_function()
        .is_some_and(|f| f.call_type() == CallType::Dual);
    if !is_dual {
        return sc.finish(after_first, first);
    }

    let mut operands = vec![first];
    let mut next_index = ident.span.end();
    match dual_sc.take(next_index, call_chain(ctx, next_index)) {
        Some((after, expr)) => {
            operands.push(expr);
            next_index = after;
        }
        None => {
            dual_sc.error(SyntaxError::new(
                next_index,
                0,
                format!("Right side operand expected for {}", ident.name),
            ));
            sc.absorb_errors(dual_sc);
            return sc.fail(index);
        }
    }

    while let Some((after_tilde, _)) = dual_sc.token(
        ctx,
        next_index,
        ParseNodeType::ThirdOperandDelimiter,
        &["~"],
    ) {
        match dual_sc.take(after_tilde, call_chain(ctx, after_tilde)) {
            Some((after, expr)) => {
                operands.push(expr);
                next_index = after;
            }
            None => {
                dual_sc.error(SyntaxError::new(after_tilde, 0, "Operand expected after '~'"));
                sc.absorb_errors(dual_sc);
                return sc.fail(index);
            }
        }
    }

    let span = operands[0]
        .span()
        .union(&operands[operands.len() - 1].span());
    let call = Expr::call(Expr::literal(function, ident.span), operands, span);
    sc.absorb(dual_sc);
    sc.finish_node(ParseNodeType::GeneralInfixExpression, next_index, call)
}
