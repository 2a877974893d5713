use clap::Parser;
use std::io;
use std::path::PathBuf;
use std::process;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

use guide_locale_sync::config::MAX_INDENT;
use guide_locale_sync::{sync, Config, Overrides};

/// Attach translated setup-guide strings to per-language message files
#[derive(Parser, Debug)]
#[command(name = "guide-sync")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Guide bundles: a directory of <lang>.json files, a .zip of them, or one JSON file keyed by language
    #[arg(value_name = "BUNDLES")]
    bundles: Option<PathBuf>,

    /// Directory holding the <lang>.json message files [default: messages]
    #[arg(short, long, value_name = "DIR")]
    messages_dir: Option<PathBuf>,

    /// INI config file [default: guide-sync.cfg if present]
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Top-level key the bundle replaces [default: guide]
    #[arg(short, long)]
    key: Option<String>,

    /// Indentation width of written files [default: 2]
    #[arg(long, value_parser = validate_indent)]
    indent: Option<usize>,

    /// Only update these languages (e.g. "tr,vi,ur")
    #[arg(long, value_delimiter = ',', value_name = "LANGS")]
    only: Vec<String>,

    /// Batch label printed in the summary line
    #[arg(long)]
    label: Option<String>,
}

impl From<Cli> for Overrides {
    fn from(cli: Cli) -> Self {
        Overrides {
            config: cli.config,
            messages_dir: cli.messages_dir,
            bundles: cli.bundles,
            merge_key: cli.key,
            indent: cli.indent,
            only: cli.only,
            label: cli.label,
        }
    }
}

fn validate_indent(s: &str) -> Result<usize, String> {
    let indent: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;
    if indent > MAX_INDENT {
        return Err(format!("indent must be between 0 and {}, got {}", MAX_INDENT, indent));
    }
    Ok(indent)
}

fn main() {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    debug!("{:?}", cli);

    let config = match Config::resolve(cli.into()) {
        Ok(config) => config,
        Err(err) => {
            error!("{}", err);
            process::exit(1);
        }
    };

    let stdout = io::stdout();
    if let Err(err) = sync(&config, &mut stdout.lock()) {
        error!("{}", err);
        process::exit(1);
    }
}
