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

use clap::builder::ValueHint;
use clap_derive::Parser;
use eyre::eyre;
use figment::Figment;
use figment::providers::{Format as ProviderFormat, Serialized, Yaml};
use funcscript_kernel::EvalOptions;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Parser, Debug, Serialize, Deserialize)] // requires `derive` feature
#[command(about = "Evaluate a FuncScript expression or template and print the result")]
pub struct Args {
    #[arg(
        value_name = "expression",
        help = "Expression to evaluate. Read from --file, or stdin, when absent."
    )]
    pub expression: Option<String>,

    #[arg(
        short,
        long,
        value_name = "file",
        help = "Read the source text from this file",
        value_hint = ValueHint::FilePath
    )]
    pub file: Option<PathBuf>,

    #[arg(
        short,
        long,
        help = "Treat the source as literal text with ${expr} holes instead of an expression"
    )]
    pub template: bool,

    #[arg(short, long, help = "Print collections and lists one member per line")]
    pub pretty: Option<bool>,

    #[arg(long, value_name = "depth", help = "Maximum evaluation depth before giving up")]
    pub max_depth: Option<usize>,

    #[arg(
        long,
        help = "Show the source context and hints for syntax errors, not just the summary line"
    )]
    pub detailed_errors: Option<bool>,

    #[arg(
        long,
        value_name = "config",
        help = "Path to configuration (YAML) file to use, if any. If not specified, defaults are used.\
                Configuration file values can be overridden by command line arguments.",
        value_hint = ValueHint::FilePath
    )]
    pub config_file: Option<PathBuf>,

    #[arg(long, help = "Enable debug logging")]
    pub debug: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub pretty: bool,
    pub detailed_errors: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub eval: EvalOptions,
    pub output: OutputConfig,
}

impl Args {
    fn merge_config(&self, mut config: Config) -> Config {
        if let Some(max_depth) = self.max_depth {
            config.eval.max_depth = max_depth;
        }
        if let Some(pretty) = self.pretty {
            config.output.pretty = pretty;
        }
        if let Some(detailed) = self.detailed_errors {
            config.output.detailed_errors = detailed;
        }
        config
    }

    /// Load the configuration file if we have it, then lay the arguments over it.
    pub fn load_config(&self) -> Result<Config, eyre::Report> {
        let config = match &self.config_file {
            Some(config_path) => Figment::new()
                .merge(Serialized::defaults(Config::default()))
                .merge(Yaml::file(config_path))
                .extract::<Config>()
                .map_err(|e| {
                    eyre!(
                        "Failed to parse configuration from {:?}: {}",
                        config_path,
                        e
                    )
                })?,
            None => Config::default(),
        };
        let config = self.merge_config(config);
        config
            .eval
            .validate()
            .map_err(|e| eyre!("Invalid evaluation settings: {e}"))?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_arguments_override_defaults() {
        let args = Args::parse_from(["fsc", "--max-depth", "32", "--pretty", "true", "1 + 1"]);
        let config = args.load_config().unwrap();
        assert_eq!(config.eval.max_depth, 32);
        assert!(config.output.pretty);
        assert!(!config.output.detailed_errors);
        assert_eq!(args.expression.as_deref(), Some("1 + 1"));
    }

    #[test]
    fn test_invalid_depth_is_rejected() {
        let args = Args::parse_from(["fsc", "--max-depth", "0", "1"]);
        assert!(args.load_config().is_err());
    }
}
