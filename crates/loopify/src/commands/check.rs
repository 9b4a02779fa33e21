//! Check command - reports the call sites that would be rewritten

use anyhow::{anyhow, Result};
use clap::Args;
use loopify_transform::{optimize, Method, RuleConfig, Shape};
use serde::Serialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config;
use crate::OutputFormat;

const SOURCE_EXTENSIONS: &[&str] = &["js", "mjs", "cjs", "ts"];

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Input file or directory
    #[arg(default_value = ".")]
    pub input: PathBuf,

    /// Disable the rule for a method (e.g. --skip reduceRight), repeatable
    #[arg(long, value_name = "METHOD")]
    pub skip: Vec<String>,

    /// Configuration file (defaults to loopify.toml in the input directory)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// One call site that would be rewritten.
#[derive(Debug, Serialize)]
struct Finding {
    file: String,
    line: usize,
    column: usize,
    method: Method,
    shape: Shape,
}

#[derive(Debug, Serialize)]
struct FileError {
    file: String,
    message: String,
}

fn is_source_file(path: &Path) -> bool {
    let name = path.to_string_lossy();
    if name.ends_with(".d.ts") {
        return false;
    }
    path.extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| SOURCE_EXTENSIONS.contains(&ext))
}

/// Collect all JavaScript and TypeScript files under `path`
fn collect_source_files(path: &Path) -> Vec<PathBuf> {
    if path.is_file() {
        return if is_source_file(path) {
            vec![path.to_path_buf()]
        } else {
            Vec::new()
        };
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(path)
        .follow_links(true)
        .into_iter()
        .filter_entry(|e| e.file_name() != "node_modules")
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if path.is_file() && is_source_file(path) {
            files.push(path.to_path_buf());
        }
    }
    files.sort();
    files
}

fn resolve_config(args: &CheckArgs, project_root: &Path) -> Result<RuleConfig> {
    let mut rules = config::load(args.config.as_deref(), project_root)?;
    rules
        .skip(args.skip.as_slice())
        .map_err(|unknown| anyhow!("unknown rule(s): {}", unknown.join(", ")))?;
    Ok(rules)
}

/// Parse and rewrite one file, returning where rewrites happened.
fn check_file(path: &Path, rules: &RuleConfig) -> Result<Vec<Finding>> {
    let source = fs::read_to_string(path)?;
    let filename = path.to_string_lossy().to_string();
    let mut parsed = loopify_parser::parse_program(&source, &filename)?;

    let report = optimize(&mut parsed.program, rules);
    log::debug!("{}: {} rewrite(s)", filename, report.len());

    Ok(report
        .iter()
        .map(|rewrite| {
            let (line, column) = parsed.line_col(rewrite.offset);
            Finding {
                file: filename.clone(),
                line,
                column,
                method: rewrite.method,
                shape: rewrite.shape,
            }
        })
        .collect())
}

pub fn run(args: CheckArgs, format: OutputFormat, use_color: bool, quiet: bool) -> Result<()> {
    let project_root = if args.input.is_file() {
        args.input
            .parent()
            .unwrap_or(&args.input)
            .to_path_buf()
    } else {
        args.input.clone()
    };

    let rules = resolve_config(&args, &project_root)?;
    let files = collect_source_files(&args.input);

    if files.is_empty() {
        match format {
            OutputFormat::Text => {
                if !quiet {
                    println!("No JavaScript or TypeScript files found.");
                }
            }
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({
                        "success": true,
                        "files": 0,
                        "rewrites": [],
                        "errors": [],
                    })
                );
            }
        }
        return Ok(());
    }

    if matches!(format, OutputFormat::Text) && !quiet {
        println!("Checking {} file(s)...", files.len());
    }

    let mut findings = Vec::new();
    let mut errors = Vec::new();
    let mut visited = HashSet::new();

    for file in &files {
        let canonical = file.canonicalize().unwrap_or_else(|_| file.clone());
        if !visited.insert(canonical) {
            continue;
        }

        match check_file(file, &rules) {
            Ok(found) => findings.extend(found),
            Err(e) => {
                log::warn!("skipping {}: {}", file.display(), e);
                errors.push(FileError {
                    file: file.to_string_lossy().to_string(),
                    message: e.to_string(),
                });
            }
        }
    }

    match format {
        OutputFormat::Text => print_text(&findings, &errors, visited.len(), use_color, quiet),
        OutputFormat::Json => {
            let summary = serde_json::json!({
                "success": errors.is_empty(),
                "files": visited.len(),
                "rewrites": findings,
                "errors": errors,
            });
            println!("{}", serde_json::to_string(&summary)?);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(anyhow!("{} file(s) could not be parsed", errors.len()))
    }
}

fn print_text(findings: &[Finding], errors: &[FileError], files: usize, use_color: bool, quiet: bool) {
    for error in errors {
        if use_color {
            eprintln!("{}: {}", console::style("error").red().bold(), error.message);
        } else {
            eprintln!("error: {}", error.message);
        }
    }

    if quiet {
        return;
    }

    for finding in findings {
        let location = format!("{}:{}:{}", finding.file, finding.line, finding.column);
        if use_color {
            println!(
                "{}: {} ({})",
                console::style(location).bold(),
                console::style(finding.method).cyan(),
                finding.shape
            );
        } else {
            println!("{}: {} ({})", location, finding.method, finding.shape);
        }
    }

    println!();
    let summary = format!("{} call site(s) in {} file(s)", findings.len(), files);
    if !errors.is_empty() {
        if use_color {
            println!(
                "{}: {}, {} file(s) failed to parse",
                console::style("Check failed").red().bold(),
                summary,
                errors.len()
            );
        } else {
            println!("Check failed: {}, {} file(s) failed to parse", summary, errors.len());
        }
    } else if use_color {
        println!("{} - {}", console::style("Rewritable").green().bold(), summary);
    } else {
        println!("Rewritable - {}", summary);
    }
}
