//! `modview list` command implementation.

use super::{fail, open_browser, print_json};
use miette::{IntoDiagnostic, Result};
use modview_core::pkg::{DepSource, PackageNode, PassthroughRenderer};
use modview_core::{Config, ModuleList};
use serde::Serialize;
use std::sync::Arc;

/// Module list result for JSON output (locked format: { ok, modules }).
#[derive(Serialize)]
struct ListResult<'a> {
    ok: bool,
    modules: &'a ModuleList,
}

/// Run the list command.
pub fn run(config: &Config, project: Option<&str>, format: &str, json: bool) -> Result<()> {
    let browser =
        open_browser(config, Arc::new(PassthroughRenderer)).unwrap_or_else(|e| fail(&e, json));

    let runtime = tokio::runtime::Runtime::new().into_diagnostic()?;
    let modules = runtime
        .block_on(browser.get_module_list(project))
        .unwrap_or_else(|e| fail(&e, json));

    if json {
        print_json(&ListResult {
            ok: true,
            modules: &modules,
        });
        return Ok(());
    }

    print_header(&modules);
    if modules.dependencies.is_empty() {
        println!("(no dependencies)");
        return Ok(());
    }

    match format {
        "list" => print_list(&modules.dependencies, 0),
        _ => print_tree(&modules.dependencies, ""),
    }
    Ok(())
}

fn print_header(modules: &ModuleList) {
    let licenses = if modules.licenses.is_empty() {
        String::new()
    } else {
        format!(" ({})", modules.licenses.join(", "))
    };
    println!(
        "{}@{}{licenses} [{}]",
        modules.name, modules.version, modules.project_id
    );
}

/// Suffix describing where a node came from, empty for installed primary deps.
fn annotation(node: &PackageNode) -> String {
    let mut tags = Vec::new();
    if node.dep_source != DepSource::Primary {
        tags.push(node.dep_source.as_str());
    }
    if node.not_installed {
        tags.push("not installed");
    }
    if tags.is_empty() {
        String::new()
    } else {
        format!(" ({})", tags.join(", "))
    }
}

/// Print nodes as a flat, indented list.
fn print_list(nodes: &[PackageNode], depth: usize) {
    for node in nodes {
        println!(
            "{:indent$}{}@{}{}",
            "",
            node.name,
            node.version,
            annotation(node),
            indent = depth * 2
        );
        print_list(&node.dependencies, depth + 1);
    }
}

/// Recursively print nodes as a tree.
fn print_tree(nodes: &[PackageNode], prefix: &str) {
    let len = nodes.len();
    for (i, node) in nodes.iter().enumerate() {
        let is_last = i == len - 1;
        let connector = if is_last { "└── " } else { "├── " };
        let next_prefix = if is_last { "    " } else { "│   " };

        println!(
            "{prefix}{connector}{}@{}{}",
            node.name,
            node.version,
            annotation(node)
        );
        print_tree(&node.dependencies, &format!("{prefix}{next_prefix}"));
    }
}
