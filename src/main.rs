use anyhow::Result;
use clap::Parser;
use rpcnav::{cache, cli, client, config, locate, navigate, parse};
use std::path::Path;

fn main() -> Result<()> {
    let args = cli::Args::parse();

    let default_level = match args.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    match args.command {
        cli::Command::Resolve {
            repo,
            config: config_path,
            file,
            variable,
            path,
        } => {
            let cfg = config::NavConfig::load(&repo, config_path.as_deref())?;
            let variable = variable.unwrap_or_else(|| cfg.api_variable_name.clone());
            let mut ws = parse::Workspace::new();
            let root = find_root(&mut ws, file.as_deref(), &variable, &cfg);
            match root {
                Some(root) => {
                    let target = navigate::navigate(&mut ws, &root, &path, &variable, &cfg);
                    println!("{}", serde_json::to_string_pretty(&target)?);
                }
                None => println!("null"),
            }
            Ok(())
        }
        cli::Command::Scan {
            repo,
            config: config_path,
            lookup,
        } => {
            let cfg = config::NavConfig::load(&repo, config_path.as_deref())?;
            let mut ws = parse::Workspace::new();
            let Some(root) = find_root(&mut ws, None, &cfg.api_variable_name, &cfg) else {
                println!("null");
                return Ok(());
            };
            let mapping = navigate::build_procedure_map(&mut ws, &root, &cfg);
            let mut cache = cache::NavigationCache::new(cfg.cache_timeout());
            cache.set(mapping, &ws.loaded_paths());
            let Some(mapping) = cache.get() else {
                println!("null");
                return Ok(());
            };
            match lookup {
                Some(path) => match navigate::lookup(mapping, &path) {
                    Some(target) => println!("{}", serde_json::to_string_pretty(target)?),
                    None => println!("null"),
                },
                None => println!("{}", serde_json::to_string_pretty(mapping)?),
            }
            Ok(())
        }
        cli::Command::Hover {
            repo,
            config: config_path,
            line,
            token,
        } => {
            let cfg = config::NavConfig::load(&repo, config_path.as_deref())?;
            match navigate::hover_hint(&line, &token, &cfg) {
                Some(hint) => println!("{hint}"),
                None => println!("null"),
            }
            Ok(())
        }
    }
}

/// Root router lookup for CLI commands: client-type resolution when a
/// usage file is given, falling back to configured location and
/// discovery.
fn find_root(
    ws: &mut parse::Workspace,
    usage_file: Option<&Path>,
    variable: &str,
    cfg: &config::NavConfig,
) -> Option<rpcnav::model::DeclRef> {
    if let Some(file) = usage_file {
        match client::resolve_router_from_client(ws, file, variable, cfg) {
            Ok(info) => return Some(info.decl),
            Err(miss) => {
                tracing::debug!(?miss, "client-type resolution failed, trying static modes");
            }
        }
    }
    locate::locate(ws, cfg).ok()
}
