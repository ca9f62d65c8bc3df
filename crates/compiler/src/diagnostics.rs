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

//! Helpers to turn syntax errors into user-facing diagnostics.

use std::io::{self, Write};
use std::ops::Range;

use ariadne::{CharSet, Config, IndexType, Label, Report, ReportKind, Source};
use itertools::Itertools;

use crate::errors::{CompileError, SyntaxError};

/// Verbosity levels for rendering diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticVerbosity {
    /// Single-line summary only.
    Summary,
    /// Summary with source context showing error location.
    SourceContext,
    /// Source context plus hints.
    Detailed,
}

/// Rendering options for compiler diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiagnosticRenderOptions {
    pub verbosity: DiagnosticVerbosity,
    pub use_graphics: bool,
    pub use_color: bool,
}

impl Default for DiagnosticRenderOptions {
    fn default() -> Self {
        Self {
            verbosity: DiagnosticVerbosity::Summary,
            use_graphics: false,
            use_color: false,
        }
    }
}

/// 1-based line and column of byte offset `pos`.
pub fn line_col(source: &str, pos: usize) -> (usize, usize) {
    let pos = pos.min(source.len());
    let before = &source[..pos];
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map_or(0, |at| at + 1);
    (line, before[line_start..].chars().count() + 1)
}

/// Emit a compile error directly to stderr with rich formatting.
pub fn emit_compile_error(error: &CompileError, source: &str, source_name: &str, use_color: bool) {
    let mut stderr = io::stderr().lock();
    if error.errors().is_empty() {
        let _ = writeln!(&mut stderr, "{source_name}: {error}");
        return;
    }
    for syntax_error in error.errors() {
        let span = clamp_span(source, syntax_error);
        let (line, col) = line_col(source, span.start);
        let _ = writeln!(&mut stderr, "{source_name}:{line}:{col}");
        let report = build_report(source, &syntax_error.message, span, use_color);
        let _ = report.write(Source::from(source), &mut stderr);
    }
    let _ = stderr.flush();
}

/// Format a [`CompileError`] according to the requested diagnostic options.
pub fn format_compile_error(
    error: &CompileError,
    source: &str,
    options: DiagnosticRenderOptions,
) -> Vec<String> {
    if error.errors().is_empty() {
        return vec![error.to_string()];
    }
    render_syntax_errors(error.errors(), source, options)
}

/// One block of lines per error, in source order.
pub fn render_syntax_errors(
    errors: &[SyntaxError],
    source: &str,
    options: DiagnosticRenderOptions,
) -> Vec<String> {
    errors
        .iter()
        .sorted_by_key(|e| e.pos())
        .dedup()
        .flat_map(|e| format_syntax_error(e, source, options))
        .collect()
}

fn format_syntax_error(
    error: &SyntaxError,
    source: &str,
    options: DiagnosticRenderOptions,
) -> Vec<String> {
    let (line, col) = line_col(source, error.pos());
    let mut lines = vec![format!(
        "Syntax error @ {line}/{col}: {}",
        error.message
    )];

    if options.verbosity == DiagnosticVerbosity::Summary {
        return lines;
    }

    if options.use_graphics {
        let span = clamp_span(source, error);
        let report = render_report(source, &error.message, span, options.use_color);
        lines.extend(report.lines().map(|line| line.to_string()));
    } else {
        lines.extend(render_plain_context(source, line, col));
    }

    if options.verbosity == DiagnosticVerbosity::Detailed {
        lines.extend(hints(source, error).into_iter().map(|h| format!("help: {h}")));
    }

    lines
}

fn hints(source: &str, error: &SyntaxError) -> Vec<&'static str> {
    let message = error.message.as_str();
    let mut hints = vec![];
    if message.starts_with("',' or ';' expected") {
        hints.push("Separate collection members with `,`, `;` or a line break.");
    }
    if message.starts_with("Right side operand expected") {
        hints.push("Infix operators need an expression on both sides.");
    }
    if message.starts_with("Value expression expected") {
        hints.push("Members are written `name: expression`.");
    }
    if message.starts_with("Duplicate return") {
        hints.push("A collection may contain at most one `return` or `eval` clause.");
    }
    if message.starts_with("Lambda body") || message.starts_with("'=>'") {
        hints.push("Lambdas are written `(a, b) => expression`.");
    }
    if message.starts_with("Language binding") {
        hints.push("Register the language in the compile options before parsing.");
    }
    if error.pos() >= source.len() && !source.ends_with('\n') {
        hints.push("input ends here; is a closing delimiter missing?");
    }
    hints
}

fn clamp_span(source: &str, error: &SyntaxError) -> Range<usize> {
    let start = error.pos().min(source.len());
    let end = (start + error.len().max(1)).min(source.len()).max(start);
    start..end
}

fn render_plain_context(source: &str, line: usize, col: usize) -> Vec<String> {
    let context_line = source.lines().nth(line - 1).unwrap_or("");
    let mut lines = vec![format!("   line {line} column {col}:")];

    // Insert an inline marker at the error position.
    let marker = " ⚠ ";
    let split = context_line
        .char_indices()
        .nth(col - 1)
        .map_or(context_line.len(), |(at, _)| at);
    lines.push(format!(
        "   {}{}{}",
        &context_line[..split],
        marker,
        &context_line[split..]
    ));
    lines
}

fn build_report<'a>(
    source: &str,
    summary: &str,
    span: Range<usize>,
    use_color: bool,
) -> Report<'a, Range<usize>> {
    let label_message = if span.start >= source.len() {
        "input ends here"
    } else {
        "parser stopped here"
    };
    Report::build(ReportKind::Error, span.clone())
        .with_config(
            Config::default()
                .with_color(use_color)
                .with_char_set(CharSet::Unicode)
                .with_index_type(IndexType::Byte),
        )
        .with_message(summary.to_string())
        .with_label(Label::new(span).with_message(label_message))
        .finish()
}

fn render_report(source: &str, summary: &str, span: Range<usize>, use_color: bool) -> String {
    let report = build_report(source, summary, span, use_color);
    let mut buffer = vec![];
    if report.write(Source::from(source), &mut buffer).is_err() {
        return summary.to_string();
    }
    String::from_utf8_lossy(&buffer).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_line_col() {
        let src = "a: 1\nb: (2 +\n";
        assert_eq!(line_col(src, 0), (1, 1));
        assert_eq!(line_col(src, 5), (2, 1));
        assert_eq!(line_col(src, 9), (2, 5));
        assert_eq!(line_col(src, 100), (3, 1));
    }

    #[test]
    fn test_summary_is_one_line() {
        let errors = vec![SyntaxError::new(3, 0, "')' expected")];
        let lines = render_syntax_errors(&errors, "(1 ", DiagnosticRenderOptions::default());
        assert_eq!(lines, vec!["Syntax error @ 1/4: ')' expected".to_string()]);
    }

    #[test]
    fn test_plain_context_marks_position() {
        let errors = vec![SyntaxError::new(2, 1, "Unexpected token ')'")];
        let options = DiagnosticRenderOptions {
            verbosity: DiagnosticVerbosity::Detailed,
            ..Default::default()
        };
        let lines = render_syntax_errors(&errors, "1 )", options);
        assert_eq!(
            lines,
            vec![
                "Syntax error @ 1/3: Unexpected token ')'".to_string(),
                "   line 1 column 3:".to_string(),
                "   1  ⚠ )".to_string(),
            ]
        );
    }

    #[test]
    fn test_detailed_hints_at_end_of_input() {
        let errors = vec![SyntaxError::new(4, 0, "Right side operand expected for +")];
        let options = DiagnosticRenderOptions {
            verbosity: DiagnosticVerbosity::Detailed,
            ..Default::default()
        };
        let lines = render_syntax_errors(&errors, "1 + ", options);
        assert!(lines.contains(&"help: Infix operators need an expression on both sides.".to_string()));
        assert!(lines.contains(&"help: input ends here; is a closing delimiter missing?".to_string()));
    }

    #[test]
    fn test_graphical_report_mentions_message() {
        let errors = vec![SyntaxError::new(0, 1, "Unexpected token '}'")];
        let options = DiagnosticRenderOptions {
            verbosity: DiagnosticVerbosity::SourceContext,
            use_graphics: true,
            use_color: false,
        };
        let lines = render_syntax_errors(&errors, "}", options);
        assert!(lines.len() > 1);
        assert!(lines[1..].iter().any(|l| l.contains("Unexpected token '}'")));
    }
}
