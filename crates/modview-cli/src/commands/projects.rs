//! `modview projects` command implementation.

use super::{fail, open_store, print_json};
use miette::Result;
use modview_core::{Config, ProjectRecord};
use serde::Serialize;

/// Projects result for JSON output (locked format: { ok, projects }).
#[derive(Serialize)]
struct ProjectsResult<'a> {
    ok: bool,
    projects: &'a [ProjectRecord],
}

/// Run the projects command.
pub fn run(config: &Config, json: bool) -> Result<()> {
    let store = open_store(config).unwrap_or_else(|e| fail(&e, json));
    let list = store.list();

    if json {
        print_json(&ProjectsResult {
            ok: true,
            projects: list.records(),
        });
        return Ok(());
    }

    println!("Projects ({}):", list.len());
    for project in list.records() {
        println!("  {}  {}", project.id, project.name);
        println!("    {}", project.root_path.display());
    }
    Ok(())
}
