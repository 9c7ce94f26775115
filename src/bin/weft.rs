//! Command-line interface for weft
//! Parses weft markup files and renders them to HTML, checks them for
//! structural errors, or dumps the finished node tree as JSON.
//!
//! Usage:
//!   weft render `<path>` [--allow `<cond>`]... [--base-url `<url>`]  - Render to HTML on stdout
//!   weft check `<path>`                                          - Parse only; report errors
//!   weft ast `<path>`                                            - Dump the finished tree as JSON

use std::collections::HashSet;

use clap::{Arg, ArgAction, Command};

use weft::weft::brackets;
use weft::weft::render::{escape_attr, escape_text, RenderContext};
use weft::weft::Document;

fn main() {
    let matches = Command::new("weft")
        .version(env!("CARGO_PKG_VERSION"))
        .about("A tool for parsing and rendering weft markup")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("render")
                .about("Render a weft file to HTML")
                .arg(
                    Arg::new("path")
                        .help("Path to the weft file")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("allow")
                        .long("allow")
                        .short('a')
                        .help("Condition strings answered true (repeatable)")
                        .action(ArgAction::Append),
                )
                .arg(
                    Arg::new("base-url")
                        .long("base-url")
                        .help("Prefix for root-relative link targets"),
                ),
        )
        .subcommand(
            Command::new("check")
                .about("Parse a weft file and report structural errors")
                .arg(
                    Arg::new("path")
                        .help("Path to the weft file")
                        .required(true)
                        .index(1),
                ),
        )
        .subcommand(
            Command::new("ast")
                .about("Dump the finished node tree as JSON")
                .arg(
                    Arg::new("path")
                        .help("Path to the weft file")
                        .required(true)
                        .index(1),
                ),
        )
        .get_matches();

    match matches.subcommand() {
        Some(("render", render_matches)) => {
            let path = render_matches.get_one::<String>("path").unwrap();
            let allowed: HashSet<String> = render_matches
                .get_many::<String>("allow")
                .map(|values| values.cloned().collect())
                .unwrap_or_default();
            let base_url = render_matches.get_one::<String>("base-url").cloned();
            handle_render_command(path, allowed, base_url);
        }
        Some(("check", check_matches)) => {
            let path = check_matches.get_one::<String>("path").unwrap();
            handle_check_command(path);
        }
        Some(("ast", ast_matches)) => {
            let path = ast_matches.get_one::<String>("path").unwrap();
            handle_ast_command(path);
        }
        _ => unreachable!(),
    }
}

fn read_source(path: &str) -> String {
    std::fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading file: {}", e);
        std::process::exit(1);
    })
}

/// Handle the render command
fn handle_render_command(path: &str, allowed: HashSet<String>, base_url: Option<String>) {
    let source = read_source(path);
    let mut ctx = CliContext { allowed, base_url };
    let output = match Document::parse(&source) {
        Ok(doc) => doc.render(&mut ctx),
        Err(err) => Document::from_error(&source, &err).render(&mut ctx),
    };
    println!("{}", output);
}

/// Handle the check command
fn handle_check_command(path: &str) {
    let source = read_source(path);
    match Document::parse(&source) {
        Ok(doc) => {
            println!("ok: {} top-level nodes", doc.nodes().len());
        }
        Err(err) => {
            let mut ctx = CliContext::default();
            let report = Document::from_error(&source, &err).render(&mut ctx);
            eprintln!("{}", report);
            std::process::exit(1);
        }
    }
}

/// Handle the ast command
fn handle_ast_command(path: &str) {
    let source = read_source(path);
    let doc = Document::parse(&source).unwrap_or_else(|e| {
        eprintln!("Parse error at offset {}: {}", e.offset(), e);
        std::process::exit(1);
    });
    let json = serde_json::to_string_pretty(doc.nodes()).unwrap_or_else(|e| {
        eprintln!("Serialization error: {}", e);
        std::process::exit(1);
    });
    println!("{}", json);
}

/// Render context for the CLI: conditions come from `--allow` flags,
/// root-relative links get the `--base-url` prefix, and `pagelink`
/// fragments resolve to plain internal links. Other known fragments have no
/// backend here and render a visible placeholder.
#[derive(Default)]
struct CliContext {
    allowed: HashSet<String>,
    base_url: Option<String>,
}

impl RenderContext for CliContext {
    fn check_condition(&mut self, condition: &str) -> bool {
        self.allowed.contains(condition)
    }

    fn run_fragment(&mut self, out: &mut String, name: &str, params: &[(String, String)]) {
        if name == "pagelink" {
            let target = params
                .iter()
                .find(|(key, _)| key == "target")
                .map(|(_, value)| value.as_str())
                .unwrap_or("");
            let href = self.resolve_url(&brackets::normalize_internal(target));
            out.push_str("<a href=\"");
            escape_attr(&href, out);
            out.push_str("\">");
            escape_text(target, out);
            out.push_str("</a>");
            return;
        }
        out.push_str("<span class=\"module-placeholder\">");
        escape_text(name, out);
        out.push_str("</span>");
    }

    fn resolve_url(&self, url: &str) -> String {
        match &self.base_url {
            Some(base) if url.starts_with('/') => format!("{}{}", base.trim_end_matches('/'), url),
            _ => url.to_string(),
        }
    }
}
