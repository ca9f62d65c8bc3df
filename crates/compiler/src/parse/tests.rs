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

use crate::ast::{Expr, KvcExpr};
use crate::binding::{CompiledBinding, LanguageBinding, LanguageBindingRegistry};
use crate::parse::{CompileOptions, compile, parse};
use crate::parse_node::ParseNodeType;
use funcscript_var::{
    CallType, HostFunction, Scope, SimpleKvc, Span, Var, VarType, v_fn, v_none, v_str,
};
use itertools::Itertools;
use pretty_assertions::assert_eq;
use std::sync::Arc;
use test_case::test_case;
use unindent::unindent;

fn provider() -> SimpleKvc {
    let mut kvc = SimpleKvc::new(None);
    let symbols = [
        "or", "and", "==", "=", "??", "?!", "?.", ">=", "<=", "!=", ">", "<", "in", "+", "-",
        "*", "div", "/", "%", "^", "!", "not", "negate", ".", "if", "case", "switch", "format",
        "_templatemerge", "fold",
    ];
    for symbol in symbols {
        let call_type = match symbol {
            "in" | "fold" => CallType::Dual,
            s if s.chars().all(|c| c.is_ascii_alphabetic() || c == '_') => CallType::Prefix,
            _ => CallType::Infix,
        };
        let function = HostFunction::new(symbol, |_| v_none()).with_call_type(call_type);
        kvc.insert(symbol, v_fn(Arc::new(function)));
    }
    kvc
}

/// Compact rendering of a tree. Function literals print as `#symbol`, references that skip
/// the innermost collection as `^name`.
fn sexpr(expr: &Expr) -> String {
    match expr {
        Expr::Literal { value, .. } => literal(value),
        Expr::Reference {
            name, from_parent, ..
        } => {
            if *from_parent {
                format!("^{name}")
            } else {
                name.to_string()
            }
        }
        Expr::Call { function, args, .. } => {
            let args = args.iter().map(sexpr).join(" ");
            format!("({} {args})", sexpr(function))
        }
        Expr::List { items, .. } => format!("[{}]", items.iter().map(sexpr).join(" ")),
        Expr::Kvc(kvc) => kvc_sexpr(kvc),
        Expr::Selector {
            source, selector, ..
        } => format!("{}{}", sexpr(source), kvc_sexpr(selector)),
        Expr::Lambda(lambda) => format!("({})=>{}", lambda.params.iter().join(","), sexpr(&lambda.body)),
        Expr::LanguageBinding { language, code, .. } => format!("`{language}`({code:?})"),
    }
}

fn kvc_sexpr(kvc: &KvcExpr) -> String {
    let items = kvc
        .items()
        .iter()
        .map(|item| format!("{}: {}", item.key, sexpr(&item.value)))
        .join(", ");
    let ret = kvc.ret.as_ref().map(|r| {
        let keyword = if kvc.eval_mode { "eval" } else { "return" };
        format!("{keyword} {}", sexpr(r))
    });
    match ret {
        Some(ret) if items.is_empty() => format!("{{{ret}}}"),
        Some(ret) => format!("{{{items}; {ret}}}"),
        None => format!("{{{items}}}"),
    }
}

fn literal(value: &Var) -> String {
    match value.type_code() {
        VarType::Function => value
            .as_function()
            .map(|f| format!("#{}", f.symbol()))
            .unwrap_or_default(),
        VarType::String => format!("{:?}", value.as_str().unwrap_or_default()),
        VarType::Null => "null".to_string(),
        VarType::Boolean => value.as_bool().unwrap_or_default().to_string(),
        _ => value.as_f64().map(|f| f.to_string()).unwrap_or_default(),
    }
}

fn parsed(source: &str) -> String {
    let provider = provider();
    let expr = compile(&provider, source, &CompileOptions::default())
        .unwrap_or_else(|e| panic!("{source:?} failed to parse: {e}"));
    sexpr(&expr)
}

fn error_messages(source: &str) -> Vec<String> {
    let provider = provider();
    let outcome = parse(&provider, source, &CompileOptions::default());
    assert!(outcome.expr.is_none(), "{source:?} unexpectedly parsed");
    outcome.errors.into_iter().map(|e| e.message).collect()
}

#[test_case("1+2*3", "(#+ 1 (#* 2 3))" ; "precedence")]
#[test_case("(1+2)*3", "(#* (#+ 1 2) 3)" ; "parentheses")]
#[test_case("1+2+3", "(#+ 1 2 3)" ; "same operator run is one call")]
#[test_case("1+2-3", "(#- (#+ 1 2) 3)" ; "mixed operators of one tier")]
#[test_case("2^3^2", "(#^ 2 3 2)" ; "exponent run")]
#[test_case("a or b and c", "(#and (#or a b) c)" ; "logical tier")]
#[test_case("x = 1", "(#= x 1)" ; "single equals")]
#[test_case("x == 1", "(#== x 1)" ; "double equals")]
#[test_case("x != 1 and y >= 2", "(#and (#!= x 1) (#>= y 2))" ; "relational under logical")]
#[test_case("a ?? b", "(#?? a b)" ; "null coalescing")]
#[test_case("7 div 2 % 3", "(#% (#div 7 2) 3)" ; "word operator")]
#[test_case("order", "order" ; "word operator prefix is an identifier")]
fn test_infix(source: &str, expected: &str) {
    assert_eq!(parsed(source), expected);
}

#[test_case("-x.y", "(#negate (#. x \"y\"))" ; "negation binds the whole chain")]
#[test_case("not a", "(#not a)" ; "word prefix")]
#[test_case("!a or b", "(#or (#! a) b)" ; "bang")]
#[test_case("f(1, 2)[3]", "((f 1 2) 3)" ; "calls chain")]
#[test_case("f()", "(f )" ; "empty call")]
#[test_case("a?.b.c", "(#. (#?. a \"b\") \"c\")" ; "member access")]
#[test_case("x in [1, 2]", "(#in x [1 2])" ; "dual function")]
#[test_case("a fold b ~ c", "(#fold a b c)" ; "dual function third operand")]
fn test_chains_and_prefix(source: &str, expected: &str) {
    assert_eq!(parsed(source), expected);
}

#[test_case("if a then 1 else 2", "(#if a 1 2)" ; "if then else")]
#[test_case("if(a, 1, 2)", "(if a 1 2)" ; "if as a call")]
#[test_case("case a: 1, b: 2, 3", "(#case a 1 b 2 3)" ; "case with default")]
#[test_case("switch x, 1: \"a\", \"b\"", "(#switch x 1 \"a\" \"b\")" ; "switch with default")]
#[test_case("(a, b) => a + b", "(a,b)=>(#+ a b)" ; "lambda")]
#[test_case("x => x * 2", "(x)=>(#* x 2)" ; "single parameter lambda")]
#[test_case("() => 1", "()=>1" ; "no parameter lambda")]
#[test_case("[1, 2; 3 4]", "[1 2 3 4]" ; "list separators")]
#[test_case("[]", "[]" ; "empty list")]
#[test_case("true", "true" ; "keyword literal")]
#[test_case("null", "null" ; "null literal")]
#[test_case("1.5", "1.5" ; "float literal")]
fn test_units(source: &str, expected: &str) {
    assert_eq!(parsed(source), expected);
}

#[test_case("{a: 1, b: a}", "{a: 1, b: a}" ; "braced")]
#[test_case("{a: a}", "{a: a}" ; "self named value refers to the member itself")]
#[test_case("{x, 'y'}", "{x: ^x, y: ^y}" ; "shorthand members")]
#[test_case("{f(x) => x}", "{f: (x)=>x}" ; "method sugar")]
#[test_case("{p{a}}", "{p: ^p{a: ^a}}" ; "selector sugar")]
#[test_case("{a: 1, a: 2}", "{a: 2}" ; "duplicate keys last wins")]
#[test_case("{a: 1; eval a}", "{a: 1; eval a}" ; "eval clause")]
#[test_case("{}", "{}" ; "empty")]
#[test_case("a: 1, b: 2", "{a: 1, b: 2}" ; "naked")]
#[test_case("a: 1;", "{a: 1}" ; "naked with terminator")]
fn test_collections(source: &str, expected: &str) {
    assert_eq!(parsed(source), expected);
}

#[test]
fn test_naked_collection_with_line_breaks() {
    let source = unindent(
        "
        a: 1
        b: 2 // two
        return a + b
        ",
    );
    assert_eq!(parsed(&source), "{a: 1, b: 2; return (#+ a b)}");
}

#[test_case("p{name, age}", "p{name: ^name, age: ^age}" ; "shorthand")]
#[test_case("p{n: name}", "p{n: ^name}" ; "references resolve against the selected item")]
#[test_case("p{q: {r: name}}", "p{q: {r: ^name}}" ; "nested collections keep the mode")]
#[test_case("p{f: (x) => name}", "p{f: (x)=>name}" ; "lambda bodies are lexical")]
#[test_case("[1, 2]{v}", "[1 2]{v: ^v}" ; "list source")]
fn test_selectors(source: &str, expected: &str) {
    assert_eq!(parsed(source), expected);
}

#[test_case("f\"a{x}b\"", "(#_templatemerge \"a\" (#format x) \"b\")" ; "braces")]
#[test_case("f'${x}!'", "(#_templatemerge (#format x) \"!\")" ; "dollar marker")]
#[test_case("f\"plain\"", "\"plain\"" ; "no holes")]
#[test_case("f\"\"", "\"\"" ; "empty")]
#[test_case("f\"\\{x}\"", "\"{x}\"" ; "escaped brace")]
fn test_string_templates(source: &str, expected: &str) {
    assert_eq!(parsed(source), expected);
}

#[test]
fn test_fs_template() {
    let provider = provider();
    let options = CompileOptions {
        fs_template: true,
        ..Default::default()
    };
    let expr = compile(&provider, "Hello ${name}! {x} $${y}", &options).unwrap();
    assert_eq!(
        sexpr(&expr),
        "(#_templatemerge \"Hello \" (#format name) \"! {x} ${y}\")"
    );

    let outcome = parse(&provider, "oops ${1 +", &options);
    assert!(outcome.expr.is_none());
    assert!(!outcome.errors.is_empty());
}

#[test_case("{return 1; return 2}", "Duplicate return statement" ; "duplicate return")]
#[test_case("{a: 1 b: 2}", "',' or ';' expected" ; "missing separator")]
#[test_case("{a: 1", "'}' expected" ; "unclosed collection")]
#[test_case("{a: }", "Value expression expected for property 'a'" ; "missing value")]
#[test_case("1 +", "Right side operand expected for +" ; "missing right operand")]
#[test_case("(1 + 2", "')' expected" ; "unclosed parenthesis")]
#[test_case("[1, 2", "']' expected" ; "unclosed list")]
#[test_case("f(1,", "Parameter for call expected" ; "missing parameter")]
#[test_case("x.", "member identifier expected" ; "missing member")]
#[test_case("(a) =>", "Lambda body expression expected" ; "missing lambda body")]
#[test_case("(a, b) a", "'=>' expected" ; "missing arrow")]
#[test_case("case", "Case condition expected" ; "empty case")]
#[test_case("switch", "Switch selector expected" ; "empty switch")]
#[test_case("f\"a{1 +}\"", "Right side operand expected for +" ; "bad template hole")]
#[test_case("\"abc", "'\"' expected" ; "unterminated string")]
#[test_case("1 2", "Unexpected token '2'" ; "trailing input")]
#[test_case("", "expression expected" ; "empty input")]
fn test_syntax_errors(source: &str, message: &str) {
    let messages = error_messages(source);
    assert!(
        messages.iter().any(|m| m == message),
        "{source:?}: expected {message:?} in {messages:?}"
    );
}

#[test]
fn test_error_positions() {
    let provider = provider();
    let outcome = parse(&provider, "1 2", &CompileOptions::default());
    assert_eq!(outcome.errors[0].span, Span::new(2, 1));
    assert_eq!(outcome.next_index, 2);

    let outcome = parse(&provider, "   ", &CompileOptions::default());
    assert_eq!(outcome.errors[0].span, Span::new(3, 0));
}

#[test]
fn test_parse_tree_covers_input() {
    let provider = provider();
    let source = "a: 1, // note\nb: [1 2]";
    let outcome = parse(&provider, source, &CompileOptions::default());
    assert!(outcome.is_ok());
    let root = outcome.node.unwrap();
    assert_eq!(root.kind, ParseNodeType::RootExpression);
    assert_eq!(root.span, Span::between(0, source.len()));
    assert_eq!(root.find_comments().len(), 1);
    let keys: Vec<_> = root
        .find_all_nodes()
        .into_iter()
        .filter(|n| n.kind == ParseNodeType::Key)
        .filter_map(|n| n.text(source))
        .collect();
    assert_eq!(keys, vec!["a", "b"]);
}

#[test]
fn test_spans() {
    let provider = provider();
    let expr = compile(&provider, "f( 1 ) + (2)", &CompileOptions::default()).unwrap();
    let Expr::Call { args, span, .. } = &expr else {
        panic!("expected a call, got {expr:?}");
    };
    assert_eq!(*span, Span::between(0, 12));
    assert_eq!(args[0].span(), Span::between(0, 6));
    assert_eq!(args[1].span(), Span::between(9, 12));
}

#[derive(Debug)]
struct Echo(String);

impl CompiledBinding for Echo {
    fn evaluate(&self, _scope: &Scope) -> Var {
        v_str(&self.0)
    }
}

struct EchoLanguage;

impl LanguageBinding for EchoLanguage {
    fn compile(&self, code: &str) -> Result<Arc<dyn CompiledBinding>, String> {
        if code.contains("bad") {
            return Err("bad code".to_string());
        }
        Ok(Arc::new(Echo(code.to_string())))
    }
}

#[test]
fn test_language_bindings() {
    let provider = provider();
    let options = CompileOptions {
        language_bindings: LanguageBindingRegistry::new().with("echo", Arc::new(EchoLanguage)),
        ..Default::default()
    };
    let scope: Scope = Arc::new(SimpleKvc::new(None));

    let expr = compile(&provider, "```echo\nhello \\``` there```", &options).unwrap();
    let Expr::LanguageBinding {
        language, handle, ..
    } = &expr
    else {
        panic!("expected a binding, got {expr:?}");
    };
    assert_eq!(language.as_str(), "echo");
    assert_eq!(handle.binding().evaluate(&scope), v_str("hello ``` there"));

    // Compile failures surface when the block is evaluated, not while parsing.
    let expr = compile(&provider, "```Echo\nbad```", &options).unwrap();
    let Expr::LanguageBinding { handle, .. } = &expr else {
        panic!("expected a binding, got {expr:?}");
    };
    let result = handle.binding().evaluate(&scope);
    let message = result.as_error().and_then(|e| e.msg.as_deref()).cloned();
    assert_eq!(message, Some("[Echo] bad code".to_string()));

    let errors = parse(&provider, "```js\n1```", &options).errors;
    assert!(
        errors
            .iter()
            .any(|e| e.message == "Language binding 'js' is not registered.")
    );
    let errors = parse(&provider, "```echo\nno end", &options).errors;
    assert!(errors.iter().any(|e| e.message == "closing ``` expected"));
}
