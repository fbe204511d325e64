//! `modview info` command implementation.

use super::{fail, open_browser, print_json};
use miette::{IntoDiagnostic, Result};
use modview_core::pkg::{Manifest, PassthroughRenderer};
use modview_core::{Config, InfoQuery};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

/// Info result for JSON output (locked format: { ok, info }).
#[derive(Serialize)]
struct InfoResult<'a> {
    ok: bool,
    info: &'a Value,
}

/// Run the info command.
pub fn run(config: &Config, query: &InfoQuery, json: bool) -> Result<()> {
    let browser =
        open_browser(config, Arc::new(PassthroughRenderer)).unwrap_or_else(|e| fail(&e, json));

    let runtime = tokio::runtime::Runtime::new().into_diagnostic()?;
    let info = runtime
        .block_on(browser.get_npm_info(query))
        .unwrap_or_else(|e| fail(&e, json));

    if json {
        print_json(&InfoResult {
            ok: true,
            info: &info,
        });
    } else {
        print_human(&info);
    }
    Ok(())
}

fn field<'a>(info: &'a Value, key: &str) -> Option<&'a str> {
    info.get(key).and_then(Value::as_str)
}

fn print_human(info: &Value) {
    println!(
        "{}@{}",
        field(info, "name").unwrap_or("(unnamed)"),
        field(info, "version").unwrap_or("?")
    );
    if let Some(description) = field(info, "description") {
        println!("{description}");
    }

    let licenses = Manifest::from_value(info.clone())
        .map(|manifest| manifest.licenses())
        .unwrap_or_default();
    if !licenses.is_empty() {
        println!("License: {}", licenses.join(", "));
    }
    if let Some(homepage) = field(info, "homepage") {
        println!("Homepage: {homepage}");
    }

    if let Some(readme) = field(info, "readme") {
        println!();
        println!("{readme}");
    }
}
