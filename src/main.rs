//! Cloudloom CLI entrypoint.
//!
//! This is the main entrypoint for the cloudloom command-line tool.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use cloudloom::assembly::AssemblyEngine;
use cloudloom::cli::{Cli, Commands, OutputFormatter};
use cloudloom::context::{EnvironmentContext, CONTEXT_FILE};
use cloudloom::error::Result;

use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Main entrypoint.
fn main() -> ExitCode {
    // Load .env before parsing so env-backed arguments see it.
    dotenvy::dotenv().ok();

    let cli = Cli::parse_args();
    init_logging(cli.verbose);

    let formatter = OutputFormatter::new(cli.output);
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprint!("{}", formatter.format_error(&e));
            ExitCode::FAILURE
        }
    }
}

/// Initializes the logging system.
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Dispatches the parsed command.
fn run(cli: Cli) -> Result<()> {
    let formatter = OutputFormatter::new(cli.output);
    let env = cli.env.as_deref();

    match cli.command {
        Commands::Init { path, force } => cmd_init(&path, force),
        Commands::Validate => cmd_validate(&cli.root, env, &formatter),
        Commands::Assemble { out } => cmd_assemble(&cli.root, env, out.as_deref(), &formatter),
        Commands::Vars => cmd_vars(&cli.root, env, &formatter),
    }
}

/// Initialize a new workspace.
fn cmd_init(path: &PathBuf, force: bool) -> Result<()> {
    info!("Initializing new Cloudloom workspace in: {}", path.display());

    let context_path = path.join(CONTEXT_FILE);
    if !force && context_path.exists() {
        eprintln!("Context file already exists: {}", context_path.display());
        eprintln!("Use --force to overwrite.");
        return Ok(());
    }

    let files: &[(&str, &str)] = &[
        (CONTEXT_FILE, include_str!("../templates/cloudloom.json")),
        (
            "configs/tables/defaults.json",
            include_str!("../templates/table_defaults.json"),
        ),
        (
            "configs/tables/messages.json",
            include_str!("../templates/table_messages.json"),
        ),
        (
            "functions/chat/config.json",
            include_str!("../templates/function_config.json"),
        ),
        (
            "configs/apis/chat-api/api.json",
            include_str!("../templates/api.json"),
        ),
        (
            "configs/apis/chat-api/routes/sendmessage.json",
            include_str!("../templates/route_sendmessage.json"),
        ),
        (
            "configs/policies/manage_connections.json",
            include_str!("../templates/manage_connections.json"),
        ),
        (".env.example", include_str!("../templates/.env.example")),
    ];

    for (relative, content) in files {
        let target = path.join(relative);
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)?;
        }
        if target.exists() && !force {
            debug!("Skipping existing file: {}", target.display());
            continue;
        }
        std::fs::write(&target, content)?;
        eprintln!("Created: {}", target.display());
    }

    eprintln!("\nWorkspace initialized successfully!");
    eprintln!("Next steps:");
    eprintln!("  1. Edit {CONTEXT_FILE} with your account and repository settings");
    eprintln!("  2. Adjust the sample fragments under configs/ and functions/");
    eprintln!("  3. Run 'cloudloom validate' to check the workspace");
    eprintln!("  4. Run 'cloudloom assemble' to build the resource graph");

    Ok(())
}

/// Run a full assembly and report the outcome.
fn cmd_validate(root: &Path, env: Option<&str>, formatter: &OutputFormatter) -> Result<()> {
    info!("Validating workspace: {}", root.display());
    let engine = AssemblyEngine::new(root, env)?;
    let graph = engine.assemble()?;
    print!("{}", formatter.format_validation(&graph));
    Ok(())
}

/// Assemble the resource graph and print or persist it.
fn cmd_assemble(
    root: &Path,
    env: Option<&str>,
    out: Option<&Path>,
    formatter: &OutputFormatter,
) -> Result<()> {
    info!("Assembling workspace: {}", root.display());
    let engine = AssemblyEngine::new(root, env)?;
    let graph = engine.assemble()?;

    print!("{}", formatter.format_graph(&graph));

    if let Some(out_path) = out {
        let json = serde_json::to_string_pretty(&graph)
            .map_err(|e| cloudloom::error::LoomError::internal(e.to_string()))?;
        std::fs::write(out_path, json)?;
        eprintln!("Wrote graph artifact: {}", out_path.display());
    }
    Ok(())
}

/// Print the resolved environment and its placeholder variables.
fn cmd_vars(root: &Path, env: Option<&str>, formatter: &OutputFormatter) -> Result<()> {
    let ctx = EnvironmentContext::resolve(root, env)?;
    print!("{}", formatter.format_vars(&ctx, &ctx.variables()));
    Ok(())
}
