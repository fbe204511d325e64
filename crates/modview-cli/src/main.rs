#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::doc_markdown)]

mod commands;
mod logging;

use clap::Parser;
use modview_core::Config;
use miette::Result;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "modview")]
#[command(author, version, about = "Browse the installed node_modules trees of local projects", long_about = None)]
struct Cli {
    /// Increase logging verbosity (-v for DEBUG, -vv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit JSON formatted output (stable, machine-readable)
    #[arg(long, global = true)]
    json: bool,

    /// Override the working directory
    #[arg(long, global = true, value_name = "PATH")]
    cwd: Option<PathBuf>,

    /// Projects config file (default: modview.json in the working directory)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Print version information
    Version,

    /// List configured projects
    Projects,

    /// Show the installed dependency tree of a project
    List {
        /// Project id (default: first configured project)
        #[arg(long, short)]
        project: Option<String>,

        /// Output format: tree or list
        #[arg(long, default_value = "tree")]
        format: String,
    },

    /// Show the package.json of an installed or published package
    Info {
        /// Project id (default: first configured project)
        #[arg(long, short)]
        project: Option<String>,

        /// Dependency path, e.g. "module1@1.0.0|module3@2.0.0"
        #[arg(long, value_name = "TOKENS")]
        path: Option<String>,

        /// Registry package spec, e.g. "react@18.2.0" (used when --path is absent)
        #[arg(long, value_name = "SPEC")]
        npm: Option<String>,
    },

    /// Serve the browser API over HTTP
    Serve {
        /// Address to bind
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to listen on
        #[arg(long, default_value_t = 4870)]
        port: u16,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Determine working directory
    let cwd = cli
        .cwd
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."));

    let config = Config::new(cwd.clone())
        .with_verbosity(cli.verbose)
        .with_json_logs(cli.json)
        .with_config_path(cli.config);

    let command = match cli.command {
        Some(Commands::Version) | None => return commands::version::run(),
        Some(command) => command,
    };

    logging::init(config.verbosity, config.json_logs);

    match command {
        Commands::Projects => {
            let span = tracing::info_span!("projects", cmd = "projects", cwd = %cwd.display());
            let _guard = span.enter();
            commands::projects::run(&config, cli.json)
        }
        Commands::List { project, format } => {
            let span = tracing::info_span!("list", cmd = "list", cwd = %cwd.display());
            let _guard = span.enter();
            commands::list::run(&config, project.as_deref(), &format, cli.json)
        }
        Commands::Info { project, path, npm } => {
            let span = tracing::info_span!("info", cmd = "info", cwd = %cwd.display());
            let _guard = span.enter();
            let query = modview_core::InfoQuery {
                pid: project,
                modpath: path,
                npmmod: npm,
            };
            commands::info::run(&config, &query, cli.json)
        }
        Commands::Serve { host, port } => commands::serve::run(&config, &host, port),
        Commands::Version => unreachable!(), // Handled above
    }
}
