use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "rpcnav",
    version,
    about = "Router-path navigation for tRPC-style client calls",
    after_help = r#"Examples:
  rpcnav resolve --repo . --path api.billing.claims
  rpcnav resolve --repo . --file src/app.tsx --variable trpc --path trpc.user.me
  rpcnav scan --repo . --lookup api.billing.claims.useQuery
  rpcnav hover --line 'const q = api.billing.claims.useQuery();' --token claims
"#
)]
pub struct Args {
    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Resolve one dotted client path to its declaration site.
    Resolve {
        #[arg(long, default_value = ".")]
        repo: PathBuf,
        /// Explicit config file instead of <repo>/rpcnav.json.
        #[arg(long)]
        config: Option<PathBuf>,
        /// File the client variable is used in; enables resolution
        /// through the variable's generic type argument.
        #[arg(long)]
        file: Option<PathBuf>,
        /// Client variable name; defaults to the configured one.
        #[arg(long)]
        variable: Option<String>,
        /// Dotted path, e.g. api.billing.claims.
        #[arg(long)]
        path: String,
    },
    /// Build the full path-to-declaration mapping and print it.
    Scan {
        #[arg(long, default_value = ".")]
        repo: PathBuf,
        #[arg(long)]
        config: Option<PathBuf>,
        /// Also look up one path in the freshly built mapping.
        #[arg(long)]
        lookup: Option<String>,
    },
    /// Check whether a source line contains a navigable client path.
    Hover {
        #[arg(long, default_value = ".")]
        repo: PathBuf,
        #[arg(long)]
        config: Option<PathBuf>,
        /// The source line text.
        #[arg(long)]
        line: String,
        /// The token under the cursor.
        #[arg(long)]
        token: String,
    },
}
