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

mod common;
use common::{eval, eval_in, eval_text, host_scope, scope, with_big_stack};
use funcscript_compiler::{CompileOptions, Expr, compile};
use funcscript_kernel::{
    EvalContext, EvalOptions, TraceHooks, builtin_provider, evaluate_source_with, format_value,
};
use funcscript_var::{
    E_DEFAULT, E_DEPTH_OVERFLOW, E_UNDEFINED, HostFunction, Span, Var, v_int, v_str,
};
use pretty_assertions::assert_eq;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use test_case::test_case;

fn literal_symbol(expr: &Expr) -> Option<String> {
    match expr {
        Expr::Literal { value, .. } => value.as_function().map(|f| f.symbol().to_string()),
        _ => None,
    }
}

/// An evaluation context that counts entry and exit hook calls.
fn counting_context() -> (Arc<EvalContext>, Arc<AtomicUsize>, Arc<AtomicUsize>) {
    let entries = Arc::new(AtomicUsize::new(0));
    let exits = Arc::new(AtomicUsize::new(0));
    let next_handle = Arc::new(AtomicU64::new(1));
    let (e, x) = (entries.clone(), exits.clone());
    let hooks = TraceHooks::new()
        .on_entry(move |_span| {
            e.fetch_add(1, Ordering::SeqCst);
            next_handle.fetch_add(1, Ordering::SeqCst)
        })
        .on_exit(move |_value, _span, handle| {
            assert!(handle > 0);
            x.fetch_add(1, Ordering::SeqCst);
        });
    let ctx = EvalContext::with_trace_hooks(EvalOptions::default(), hooks);
    (ctx, entries, exits)
}

/// An evaluation context that records the span of every expression it evaluates.
fn recording_context() -> (Arc<EvalContext>, Arc<Mutex<Vec<Span>>>) {
    let spans = Arc::new(Mutex::new(vec![]));
    let seen = spans.clone();
    let hooks = TraceHooks::new().on_entry(move |span| {
        seen.lock().unwrap().push(span);
        0
    });
    (EvalContext::with_trace_hooks(EvalOptions::default(), hooks), spans)
}

fn eval_with(ctx: &Arc<EvalContext>, source: &str) -> Var {
    evaluate_source_with(source, &scope(), &CompileOptions::default(), ctx).unwrap()
}

#[test]
fn test_precedence() {
    assert_eq!(eval("1+2*3"), v_int(7));
    assert_eq!(eval("(1+2)*3"), v_int(9));

    let provider = builtin_provider();
    let expr = compile(provider.as_ref(), "1+2*3", &CompileOptions::default()).unwrap();
    let Expr::Call { function, args, .. } = &expr else {
        panic!("expected a call, got {expr:?}");
    };
    assert_eq!(literal_symbol(function).as_deref(), Some("+"));
    let Expr::Call { function, .. } = &args[1] else {
        panic!("expected the product as the second operand, got {:?}", args[1]);
    };
    assert_eq!(literal_symbol(function).as_deref(), Some("*"));
}

#[test]
fn test_members_are_evaluated_once() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let count = HostFunction::new("count", move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
        v_int(21)
    });
    let scope = host_scope(vec![count], &[]);

    assert_eq!(eval_in(&scope, "{a: count(); b: a + a; return b}"), v_int(42));
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    // A member nobody reads is never evaluated.
    assert_eq!(eval_in(&scope, "{a: count(); return 1}"), v_int(1));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_arguments_are_evaluated_once() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let count = HostFunction::new("count", move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
        v_int(2)
    });
    let scope = host_scope(vec![count], &[]);
    assert_eq!(eval_in(&scope, "{twice: (x) => x + x; return twice(count())}"), v_int(4));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_unused_arguments_are_never_evaluated() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let count = HostFunction::new("count", move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
        v_int(9)
    });
    let scope = host_scope(vec![count], &[]);
    assert_eq!(eval_in(&scope, "{f: (a, b) => a; return f(1, count())}"), v_int(1));
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    // Read later, through a closure that outlived the call.
    assert_eq!(
        eval_in(&scope, "{k: (a, b) => () => b; g: k(1, count()); return g() + g()}"),
        v_int(18)
    );
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_unused_arguments_are_not_traced() {
    let (ctx, spans) = recording_context();
    let source = "{f: (a, b) => a; return f(1, 2 * 3)}";
    assert_eq!(eval_with(&ctx, source), v_int(1));
    let pos = source.find("2 * 3").unwrap();
    let spans = spans.lock().unwrap();
    assert!(!spans.is_empty());
    assert!(
        spans.iter().all(|span| span.pos < pos || span.pos >= pos + 5),
        "unused argument was evaluated: {spans:?}"
    );
}

#[test]
fn test_lazy_list_tracing() {
    let (ctx, entries, exits) = counting_context();
    let list = eval_with(&ctx, "[3, 4]");
    assert_eq!(entries.load(Ordering::SeqCst), 1);

    assert_eq!(format_value(&list), "[3,4]");
    assert_eq!(entries.load(Ordering::SeqCst), 3);

    // Forced items are cached.
    assert_eq!(format_value(&list), "[3,4]");
    assert_eq!(entries.load(Ordering::SeqCst), 3);
    assert_eq!(exits.load(Ordering::SeqCst), 3);
}

#[test]
fn test_collection_members_trace_when_forced() {
    let (ctx, entries, _) = counting_context();
    let kvc = eval_with(&ctx, "{x: [3, 4], y: 2}");
    assert_eq!(entries.load(Ordering::SeqCst), 1);

    assert_eq!(format_value(&kvc), "{x:[3,4],y:2}");
    // The list, its two items, and y.
    assert_eq!(entries.load(Ordering::SeqCst), 5);
}

#[test]
fn test_closures_capture_their_own_arguments() {
    let source = "G: (t) => {Z: 1; H: (s) => t = s}; b1: G(3); b2: G(4); return [b1.H(3), b2.H(3)]";
    assert_eq!(eval_text(source), "[true,false]");
}

#[test]
fn test_closures_outlive_their_defining_call() {
    assert_eq!(
        eval("{mk: (n) => (x) => x + n; add2: mk(2); return add2(5)}"),
        v_int(7)
    );
}

#[test_case("{a: {x: 1, y: 2}; b: a + {y: 3, z: 4}; return [a, b]}", "[{x:1,y:2},{x:1,y:3,z:4}]" ; "shallow")]
#[test_case("{l: {p: {q: 1}}; r: l + {p: {w: 2}}; return [l, r]}", "[{p:{q:1}},{p:{q:1,w:2}}]" ; "nested collections merge")]
#[test_case("{l: {p: [1]}; r: l + {p: \"s\"}; return [l, r]}", "[{p:[1]},{p:\"s\"}]" ; "right side replaces other values")]
#[test_case("{a: {x: 1, y: 2}} + {a: 5}", "{a:5}" ; "scalar overrides collection")]
#[test_case("{l: {a: {x: 1, y: {z: 2}}, b: 3}; return [l + {a: {x: 10, y: {w: 4}}, c: 5}, l]}", "[{a:{x:10,y:{z:2,w:4}},b:3,c:5},{a:{x:1,y:{z:2}},b:3}]" ; "deep merge")]
fn test_merge_leaves_left_operand_alone(source: &str, expected: &str) {
    assert_eq!(eval_text(source), expected);
}

#[test]
fn test_depth_guard() {
    let value = with_big_stack(|| eval("{f: (x) => f(x); return f(1)}"));
    let error = value
        .as_error()
        .unwrap_or_else(|| panic!("expected an error, got {value:?}"));
    assert_eq!(error.err_type, E_DEPTH_OVERFLOW);
    assert!(error.message().contains("maximum evaluation depth"));
    assert!(format_value(&value).contains("maximum evaluation depth"));
}

#[test_case("{f: (n) => if(n <= 0, 0, n + f(n - 1)); return f(100)}", 5050 ; "one hundred deep")]
#[test_case("{f: (n) => if(n <= 0, 0, n + f(n - 1)); return f(200)}", 20100 ; "two hundred deep")]
#[test_case("{f: (n, t) => if(n = 0, t, f(n - 1, t + n)); return f(150, 0)}", 11325 ; "accumulator")]
fn test_finite_recursion_is_not_cut_off(source: &'static str, expected: i64) {
    assert_eq!(with_big_stack(move || eval(source)), v_int(expected));
}

#[test_case("{a: a; return a}" ; "member is its own value")]
#[test_case("{a: a + 1; return a}" ; "member in an operator")]
#[test_case("{x: 5; inner: {x: x}; return inner.x}" ; "nested member of the same name")]
#[test_case("{a: b; b: a; return a}" ; "two members")]
fn test_self_reference_hits_the_depth_guard(source: &'static str) {
    let value = with_big_stack(move || eval(source));
    let error = value
        .as_error()
        .unwrap_or_else(|| panic!("{source:?}: expected an error, got {value:?}"));
    assert_eq!(error.err_type, E_DEPTH_OVERFLOW);
}

#[test]
fn test_depth_guard_respects_options_and_unwinds() {
    let ctx = EvalContext::new(EvalOptions {
        max_depth: 16,
        ..Default::default()
    });
    let value = eval_with(&ctx, "{f: (x) => f(x); return f(1)}");
    let error = value.as_error().unwrap();
    assert_eq!(error.message(), "maximum evaluation depth of 16 exceeded");
    assert_eq!(ctx.depth(), 0);

    // The same context still evaluates shallow expressions.
    assert_eq!(eval_with(&ctx, "1 + 1"), v_int(2));
}

#[test_case("+")]
#[test_case("-")]
#[test_case("*")]
#[test_case("/")]
#[test_case("%")]
#[test_case("div")]
#[test_case("^")]
#[test_case("in")]
#[test_case("<")]
#[test_case(">")]
#[test_case("<=")]
#[test_case(">=")]
#[test_case("=")]
#[test_case("!=")]
fn test_error_is_located_at_the_failing_term(op: &str) {
    let source = format!("1 {op} error(\"boom\")");
    let value = eval(&source);
    let error = value
        .as_error()
        .unwrap_or_else(|| panic!("{source:?}: expected an error, got {value:?}"));
    assert_eq!(error.message(), "boom");
    let pos = source.find("error").unwrap();
    assert_eq!(error.span, Some(Span::new(pos, source.len() - pos)));
}

#[test]
fn test_error_location_survives_enclosing_operators() {
    let value = eval("(1 + error(\"boom\")) * 3");
    let error = value.as_error().unwrap();
    assert_eq!(error.span, Some(Span::new(5, 13)));

    let value = eval("error(\"left\") + error(\"right\")");
    assert_eq!(value.as_error().unwrap().message(), "left");
}

#[test]
fn test_undefined_reference() {
    let value = eval("nope + 1");
    let error = value.as_error().unwrap();
    assert_eq!(error.err_type, E_UNDEFINED);
    assert_eq!(error.message(), "'nope' is not defined");
    assert_eq!(error.span, Some(Span::new(0, 4)));
}

#[test]
fn test_unread_failing_member_is_harmless() {
    assert_eq!(eval("{a: x.y; b: 3; return b}"), v_int(3));
}

#[test]
fn test_host_fault_becomes_error_value() {
    let explode = HostFunction::new("explode", |_| panic!("kaboom"));
    let scope = host_scope(vec![explode], &[]);
    let value = eval_in(&scope, "1 + explode()");
    let error = value
        .as_error()
        .unwrap_or_else(|| panic!("expected an error, got {value:?}"));
    assert_eq!(error.err_type, E_DEFAULT);
    assert_eq!(error.message(), "kaboom");
    assert_eq!(error.span, Some(Span::new(4, 9)));
}

#[test_case("{a: 1; b: a + 1; c: b * 10; return c}", "20" ; "siblings")]
#[test_case("{Total: 5; return total}", "5" ; "keys are case insensitive")]
#[test_case("{x: 1; inner: {y: x + 1}; return inner.y}", "2" ; "enclosing collection")]
#[test_case("{x: 5; inner: {x}; return inner.x}", "5" ; "shorthand member from the enclosing collection")]
#[test_case("{a: 1, b: 2}", "{a:1,b:2}" ; "collection value")]
#[test_case("a: 1; b: a * 3; return b", "3" ; "naked collection")]
#[test_case("{a: 1; eval a + 1}", "2" ; "eval clause")]
fn test_collections(source: &str, expected: &str) {
    assert_eq!(eval_text(source), expected);
}

#[test_case("{p: {name: \"ann\", age: 3, city: \"x\"}; return p{name, age}}", "{name:\"ann\",age:3}" ; "projection")]
#[test_case("{ps: [{n: 1, m: 2}, {n: 3, m: 4}]; return ps{n}}", "[{n:1},{n:3}]" ; "list source")]
#[test_case("{p: null; return p{n}}", "null" ; "null source")]
#[test_case("{k: 10; p: {n: 1}; return p{n, total: n + k}}", "{n:1,total:11}" ; "site scope")]
fn test_selectors(source: &str, expected: &str) {
    assert_eq!(eval_text(source), expected);
}

#[test_case("[10, 20, 30](1)", "20" ; "list index")]
#[test_case("[1, 2](5)", "null" ; "index past end")]
#[test_case("[1, 2](-1)", "null" ; "negative index")]
#[test_case("{k: {a: 1}; return k(\"a\")}", "1" ; "collection key")]
#[test_case("{k: {a: 1}; return k(\"b\")}", "null" ; "missing key")]
fn test_calling_data(source: &str, expected: &str) {
    assert_eq!(eval_text(source), expected);
}

#[test]
fn test_calling_a_number_is_a_type_mismatch() {
    let value = eval("{n: 3; return n(1)}");
    assert!(value.is_err());
    assert_eq!(eval_text("errorType({n: 3; return n(1)})"), "\"TYPE_MISMATCH\"");
}

#[test]
fn test_templates() {
    let scope = host_scope(vec![], &[("name", v_str("Ann"))]);
    assert_eq!(eval_in(&scope, "f\"hi {name}!\""), v_str("hi Ann!"));

    let options = CompileOptions {
        fs_template: true,
        ..Default::default()
    };
    let ctx = EvalContext::new(EvalOptions::default());
    let value = evaluate_source_with("Hello ${name}, ${1 + 2}", &scope, &options, &ctx).unwrap();
    assert_eq!(value, v_str("Hello Ann, 3"));
}

#[test]
fn test_compile_errors_are_not_values() {
    assert!(funcscript_kernel::evaluate_source("1 +", &scope()).is_err());
}
