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

mod args;

use crate::args::{Args, Config};
use clap::Parser;
use funcscript_compiler::{
    CompileError, CompileOptions, DiagnosticRenderOptions, emit_compile_error,
    format_compile_error, line_col,
};
use funcscript_kernel::{
    EvalContext, default_scope, evaluate_source_with, format_value, format_value_pretty, to_text,
};
use funcscript_var::{Scope, Var};
use std::io::IsTerminal;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;

fn init_logging(debug: bool) -> Result<(), eyre::Report> {
    let default_level = if debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let main_subscriber = tracing_subscriber::fmt()
        .compact()
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr)
        .with_span_events(FmtSpan::NONE)
        .with_target(false)
        .with_file(false)
        .with_line_number(false)
        .with_thread_names(false)
        .with_env_filter(filter)
        .finish();
    tracing::subscriber::set_global_default(main_subscriber)
        .map_err(|e| eyre::eyre!("Unable to configure logging: {e}"))
}

/// The source text and the name to report it under.
fn read_source(args: &Args) -> Result<(String, String), eyre::Report> {
    if let Some(expression) = &args.expression {
        return Ok(("<expression>".to_string(), expression.clone()));
    }
    if let Some(path) = &args.file {
        let source = std::fs::read_to_string(path)
            .map_err(|e| eyre::eyre!("Unable to read {}: {e}", path.display()))?;
        return Ok((display_name(path), source));
    }
    let source = std::io::read_to_string(std::io::stdin())?;
    Ok(("<stdin>".to_string(), source))
}

fn display_name(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

fn report_compile_error(error: &CompileError, source: &str, source_name: &str, config: &Config) {
    if config.output.detailed_errors {
        emit_compile_error(error, source, source_name, std::io::stderr().is_terminal());
        return;
    }
    for line in format_compile_error(error, source, DiagnosticRenderOptions::default()) {
        eprintln!("{source_name}: {line}");
    }
}

fn report_error_value(value: &Var, source: &str, source_name: &str) {
    let Some(error) = value.as_error() else {
        return;
    };
    match error.span {
        Some(span) => {
            let (line, col) = line_col(source, span.pos);
            let text = span.slice(source).unwrap_or_default();
            eprintln!("{source_name}:{line}:{col}: {error}");
            if !text.is_empty() {
                eprintln!("  in: {text}");
            }
        }
        None => eprintln!("{source_name}: {error}"),
    }
}

fn render(value: &Var, args: &Args, config: &Config) -> String {
    if args.template {
        return to_text(value);
    }
    if config.output.pretty {
        format_value_pretty(value)
    } else {
        format_value(value)
    }
}

fn main() -> Result<(), eyre::Report> {
    color_eyre::install()?;
    let args: Args = Args::parse();
    init_logging(args.debug)?;

    let config = args.load_config()?;
    debug!(?config, "configuration loaded");

    let (source_name, source) = read_source(&args)?;
    let compile_options = CompileOptions {
        fs_template: args.template,
        ..Default::default()
    };
    let scope: Scope = Arc::new(default_scope());
    let ctx = EvalContext::new(config.eval.clone());

    info!(source = %source_name, len = source.len(), template = args.template, "evaluating");
    let value = match evaluate_source_with(&source, &scope, &compile_options, &ctx) {
        Ok(value) => value,
        Err(e) => {
            report_compile_error(&e, &source, &source_name, &config);
            std::process::exit(2);
        }
    };

    if value.is_err() {
        report_error_value(&value, &source, &source_name);
        std::process::exit(1);
    }
    println!("{}", render(&value, &args, &config));
    Ok(())
}
