//! Rules command - lists the rewrite rules

use anyhow::Result;
use clap::Args;
use loopify_transform::{Method, RuleConfig};
use std::path::PathBuf;

use crate::config;
use crate::OutputFormat;

#[derive(Args, Debug)]
pub struct RulesArgs {
    /// Configuration file used to show which rules are enabled
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// Statement shapes a rule matches.
fn shapes(method: Method) -> &'static str {
    match method {
        Method::ForEach => "statement",
        _ => "assignment, declaration",
    }
}

pub fn run(args: RulesArgs, format: OutputFormat, use_color: bool) -> Result<()> {
    let rules: RuleConfig = config::load(args.config.as_deref(), &PathBuf::from("."))?;

    match format {
        OutputFormat::Text => {
            for method in Method::ALL {
                let state = if rules.is_enabled(method) { "on" } else { "off" };
                let arity = format!("{} argument(s)", method.arity());
                if use_color {
                    let state = if rules.is_enabled(method) {
                        console::style(state).green()
                    } else {
                        console::style(state).dim()
                    };
                    println!(
                        "{:<12} {:<4} {:<16} {}",
                        console::style(method.name()).bold(),
                        state,
                        arity,
                        shapes(method)
                    );
                } else {
                    println!("{:<12} {:<4} {:<16} {}", method.name(), state, arity, shapes(method));
                }
            }
        }
        OutputFormat::Json => {
            let listing: Vec<_> = Method::ALL
                .into_iter()
                .map(|method| {
                    serde_json::json!({
                        "method": method,
                        "config_key": method.config_key(),
                        "enabled": rules.is_enabled(method),
                        "arity": method.arity().to_string(),
                        "shapes": shapes(method),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string(&listing)?);
        }
    }

    Ok(())
}
