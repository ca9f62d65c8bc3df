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
use common::{eval, eval_text};
use funcscript_var::{E_INVALID_PARAMETER, E_PARAMETER_COUNT, E_TYPE_MISMATCH, VarType};
use pretty_assertions::assert_eq;
use test_case::test_case;

#[test_case("1 + 2 + 3", "6" ; "add")]
#[test_case("1 + null", "1" ; "add skips null")]
#[test_case("\"a\" + 1", "\"a1\"" ; "string concatenation")]
#[test_case("1 + \"a\"", "\"1a\"" ; "string on the right")]
#[test_case("[1, 2] + 3", "[1,2,3]" ; "append to list")]
#[test_case("[1] + [2, 3]", "[1,2,3]" ; "list concatenation")]
#[test_case("10 - 2 - 3", "5" ; "subtract folds left")]
#[test_case("null * 2", "null" ; "null operand")]
#[test_case("6 / 3", "2" ; "exact division stays integral")]
#[test_case("7 / 2", "3.5" ; "inexact division")]
#[test_case("10 div 3", "3" ; "integer division")]
#[test_case("7 % 3", "1" ; "remainder")]
#[test_case("2 ^ 3 ^ 2", "64" ; "power folds left")]
#[test_case("2 ^ 64", "18446744073709551616" ; "overflow to big integer")]
#[test_case("1.5 * 2", "3.0" ; "float arithmetic")]
#[test_case("-(3)", "-3" ; "negation")]
fn test_arithmetic(source: &str, expected: &str) {
    assert_eq!(eval_text(source), expected);
}

#[test_case("abs(-3)", "3" ; "abs")]
#[test_case("floor(2.7)", "2.0" ; "floor")]
#[test_case("ceil(2.2)", "3.0" ; "ceil")]
#[test_case("round(2.567, 2)", "2.57" ; "round to digits")]
#[test_case("sqrt(16)", "4.0" ; "sqrt")]
#[test_case("min(4, 2, 8)", "2" ; "min")]
#[test_case("max([4, 2, 8])", "8" ; "max of a list")]
#[test_case("math.max(1, 5)", "5" ; "math collection")]
#[test_case("math.abs(-2.5)", "2.5" ; "math abs")]
fn test_math(source: &str, expected: &str) {
    assert_eq!(eval_text(source), expected);
}

#[test_case("1 < 2.5", "true" ; "mixed numeric ordering")]
#[test_case("\"a\" < \"b\"", "true" ; "string ordering")]
#[test_case("3 >= 3", "true" ; "greater or equal")]
#[test_case("1 = 1.0", "true" ; "numeric equality across types")]
#[test_case("1 == 2", "false" ; "double equals")]
#[test_case("\"x\" != \"y\"", "true" ; "not equals")]
#[test_case("null < 1", "null" ; "null ordering")]
#[test_case("3 in [1, 2, 3]", "true" ; "membership")]
#[test_case("4 in [1, 2]", "false" ; "not a member")]
#[test_case("errorType(\"a\" < 1)", "\"TYPE_MISMATCH\"" ; "incomparable")]
fn test_comparison(source: &str, expected: &str) {
    assert_eq!(eval_text(source), expected);
}

#[test_case("true and false", "false" ; "and")]
#[test_case("false and error(\"x\")", "false" ; "and short circuits")]
#[test_case("true or error(\"x\")", "true" ; "or short circuits")]
#[test_case("not true", "false" ; "not")]
#[test_case("!false", "true" ; "bang")]
#[test_case("if 1 > 2 then \"a\" else \"b\"", "\"b\"" ; "if then else")]
#[test_case("if(null, 1, 2)", "2" ; "null condition is false")]
#[test_case("if(false, 1)", "null" ; "missing else")]
#[test_case("if(true, 1, error(\"x\"))", "1" ; "branch not taken is not evaluated")]
#[test_case("case 1 > 2: \"a\", 2 > 1: \"b\", \"c\"", "\"b\"" ; "case")]
#[test_case("case false: 1, 9", "9" ; "case default")]
#[test_case("switch 2, 1: \"a\", 2: \"b\", \"c\"", "\"b\"" ; "switch")]
#[test_case("switch 5, 1: \"a\", \"z\"", "\"z\"" ; "switch default")]
#[test_case("null ?? 3", "3" ; "coalesce null")]
#[test_case("error(\"x\") ?? 4", "4" ; "coalesce error")]
#[test_case("null ?! 5", "null" ; "evaluate if not null on null")]
#[test_case("2 ?! 5", "5" ; "evaluate if not null")]
#[test_case("{p: null; return p?.x}", "null" ; "safe member on null")]
#[test_case("{p: {x: 1}; return p?.x}", "1" ; "safe member")]
#[test_case("errorType(1 and 2)", "\"TYPE_MISMATCH\"" ; "non boolean operand")]
fn test_logic(source: &str, expected: &str) {
    assert_eq!(eval_text(source), expected);
}

#[test_case("upper(\"abc\")", "\"ABC\"" ; "upper")]
#[test_case("lower(\"ABC\")", "\"abc\"" ; "lower")]
#[test_case("substring(\"hello\", 1, 3)", "\"ell\"" ; "substring")]
#[test_case("substring(\"hello\", 9)", "\"\"" ; "substring past the end")]
#[test_case("isBlank(\"  \")", "true" ; "blank")]
#[test_case("isBlank(null)", "true" ; "null is blank")]
#[test_case("isBlank(\"x\")", "false" ; "not blank")]
#[test_case("join([1, null, \"b\"], \"-\")", "\"1-b\"" ; "join")]
#[test_case("endswith(\"hello\", \"lo\")", "true" ; "endswith")]
#[test_case("startswith(\"hello\", \"lo\")", "false" ; "startswith")]
#[test_case("find(\"hello\", \"l\")", "2" ; "find")]
#[test_case("find(\"hello\", \"l\", 3)", "3" ; "find from")]
#[test_case("find(\"hello\", \"z\")", "-1" ; "find missing")]
#[test_case("regex(\"Hello\", \"^h\", \"i\")", "true" ; "regex ignoring case")]
#[test_case("regex(\"Hello\", \"^h\")", "false" ; "regex")]
#[test_case("format(3.14159, \"0.00\")", "\"3.14\"" ; "number pattern")]
#[test_case("format([1, \"a\"])", "\"[1,\\\"a\\\"]\"" ; "literal text")]
#[test_case("format(\"x\", \"json\")", "\"\\\"x\\\"\"" ; "json")]
#[test_case("len(\"abc\")", "3" ; "string length")]
fn test_strings(source: &str, expected: &str) {
    assert_eq!(eval_text(source), expected);
}

#[test_case("len([1, 2, 3])", "3" ; "len")]
#[test_case("len(null)", "0" ; "len of null")]
#[test_case("len({a: 1, b: 2})", "2" ; "len of collection")]
#[test_case("range(2, 3)", "[2,3,4]" ; "range")]
#[test_case("map([1, 2, 3], (x) => x * 2)", "[2,4,6]" ; "map")]
#[test_case("map([5, 6], (x, i) => i)", "[0,1]" ; "map index")]
#[test_case("filter(range(1, 5), (x) => x % 2 = 0)", "[2,4]" ; "filter")]
#[test_case("reduce([1, 2, 3], (x, t) => t + x, 10)", "16" ; "reduce")]
#[test_case("reduce([1, 2, 3], (x, t) => t + x)", "6" ; "reduce from null")]
#[test_case("first([1, 5, 7], (x) => x > 4)", "5" ; "first")]
#[test_case("first([1], (x) => x > 4)", "null" ; "first none")]
#[test_case("any([1, 2], (x) => x > 5)", "false" ; "any")]
#[test_case("contains([1, 2], 2)", "true" ; "contains item")]
#[test_case("contains(\"hello\", \"ell\")", "true" ; "contains text")]
#[test_case("distinct([1, 2, 1, 3, 2])", "[1,2,3]" ; "distinct")]
#[test_case("sort([3, 1, 2])", "[1,2,3]" ; "sort")]
#[test_case("sort([3, 1, 2], (a, b) => b - a)", "[3,2,1]" ; "sort with comparer")]
#[test_case("reverse([1, 2, 3])", "[3,2,1]" ; "reverse")]
#[test_case("skip([1, 2, 3], 1)", "[2,3]" ; "skip")]
#[test_case("skip([1], 5)", "[]" ; "skip everything")]
#[test_case("take([1, 2, 3], 2)", "[1,2]" ; "take")]
#[test_case("map(null, (x) => x)", "null" ; "null list")]
fn test_lists(source: &str, expected: &str) {
    assert_eq!(eval_text(source), expected);
}

#[test_case("type(1)", "\"Integer\"" ; "integer")]
#[test_case("type(1.5)", "\"Float\"" ; "float")]
#[test_case("type(\"s\")", "\"String\"" ; "string")]
#[test_case("type([1])", "\"List\"" ; "list")]
#[test_case("type({a: 1})", "\"KeyValueCollection\"" ; "collection")]
#[test_case("type(null)", "\"Null\"" ; "null")]
#[test_case("type(error(\"x\"))", "\"Error\"" ; "error values are accepted")]
#[test_case("error(\"my message\")", "error(\"my message\", \"Default\")" ; "error")]
#[test_case("errorType(error(\"x\", \"TYPE_MISMATCH\"))", "\"TYPE_MISMATCH\"" ; "error with a type")]
#[test_case("errorType(1)", "null" ; "errorType of a non error")]
#[test_case("errorType(1 / 0)", "\"TYPE_INVALID_PARAMETER\"" ; "division by zero")]
#[test_case("ticksToDate(621355968000000000)", "\"1970-01-01T00:00:00+00:00\"" ; "ticks")]
#[test_case("date(\"2024-05-06\")", "\"2024-05-06T00:00:00+00:00\"" ; "date")]
#[test_case("date(\"06/05/2024\", \"%d/%m/%Y\")", "\"2024-05-06T00:00:00+00:00\"" ; "date with format")]
#[test_case("guid(\"67e55044-10b1-426f-9247-bb680e5fe0c8\")", "\"67e55044-10b1-426f-9247-bb680e5fe0c8\"" ; "guid")]
fn test_values(source: &str, expected: &str) {
    assert_eq!(eval_text(source), expected);
}

#[test]
fn test_new_guids_differ() {
    assert_eq!(eval("guid() = guid()").as_bool(), Some(false));
    assert_eq!(eval("type(guid())").as_str(), Some(VarType::Guid.to_string().as_str()));
}

#[test_case("ticksToDate(-9223372036854775807)" ; "before the epoch offset")]
#[test_case("2 ^ 100000000" ; "exponent too large")]
fn test_out_of_range_is_invalid_parameter(source: &str) {
    let value = eval(source);
    let error = value
        .as_error()
        .unwrap_or_else(|| panic!("{source:?}: expected an error, got {value:?}"));
    assert_eq!(error.err_type, E_INVALID_PARAMETER);
}

#[test]
fn test_argument_errors() {
    let value = eval("upper(\"a\", \"b\")");
    assert_eq!(value.as_error().map(|e| e.err_type.clone()), Some(E_PARAMETER_COUNT));

    let value = eval("upper(1)");
    assert_eq!(value.as_error().map(|e| e.err_type.clone()), Some(E_TYPE_MISMATCH));

    let value = eval("{n: null; return n.x}");
    let error = value.as_error().unwrap();
    assert_eq!(error.message(), "Can't get member x from null data");
}

#[test]
fn test_errors_inside_lists_propagate() {
    assert!(eval("join([1, error(\"bad\")])").is_err());
    assert!(eval("max(1, error(\"bad\"))").is_err());
    assert!(eval("reduce([1, 2], (x, t) => x / 0)").is_err());
}
