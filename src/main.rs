//! CLI entry point for `mailtree`.

use std::path::{Path, PathBuf};

use clap::{CommandFactory, Parser, Subcommand};

use mailtree::config::Config;
use mailtree::model::address::{split_address_list, RecipientList};
use mailtree::parser::eml;
use mailtree::render::{render_tree, RenderOptions};
use mailtree::validate::{self, DnsCheck};
use mailtree::MessageTreeBuilder;

#[derive(Parser)]
#[command(
    name = "mailtree",
    version,
    about = "Inspect the MIME structure of email messages and validate addresses"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse an .eml file and print its part tree
    Parse {
        path: PathBuf,
        /// Print JSON instead of the indented tree
        #[arg(long)]
        json: bool,
        /// Override the multipart nesting limit
        #[arg(long, value_name = "N")]
        max_depth: Option<usize>,
    },
    /// Validate one or more addresses (comma-separated lists accepted)
    Validate {
        #[arg(required = true)]
        addresses: Vec<String>,
        /// Also require an MX or A record for each domain
        #[arg(long)]
        dns: bool,
    },
    /// Drop invalid addresses, remove duplicates, and print the rest
    Recipients {
        #[arg(required = true)]
        addresses: Vec<String>,
    },
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
    /// Generate a man page
    Manpage,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = mailtree::config::load_config();

    let log_level = match cli.verbose {
        0 => config.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    setup_logging(log_level, &config);

    match cli.command {
        Commands::Parse {
            path,
            json,
            max_depth,
        } => cmd_parse(&path, json, max_depth, &config),
        Commands::Validate { addresses, dns } => cmd_validate(&addresses, dns, &config),
        Commands::Recipients { addresses } => cmd_recipients(&addresses),
        Commands::Completions { shell } => cmd_completions(shell),
        Commands::Manpage => cmd_manpage(),
    }
}

/// Set up tracing with stderr output and optional file logging.
fn setup_logging(level: &str, config: &Config) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    // Try to set up file logging
    let log_dir = mailtree::config::cache_dir(config);
    if std::fs::create_dir_all(&log_dir).is_ok() {
        let file_appender = tracing_appender::rolling::never(&log_dir, "mailtree.log");
        let file_layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(file_appender);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .with(file_layer)
            .init();
    } else {
        // Fall back to stderr only
        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .init();
    }
}

/// Parse an .eml file and print the tree.
fn cmd_parse(path: &Path, json: bool, max_depth: Option<usize>, config: &Config) -> anyhow::Result<()> {
    let builder = match max_depth {
        Some(depth) => MessageTreeBuilder::with_max_depth(depth),
        None => MessageTreeBuilder::from_config(&config.parser),
    };

    let parsed = eml::parse_eml(path, &builder)?;
    tracing::info!(
        path = %path.display(),
        warnings = parsed.warnings.len(),
        "Parsed message"
    );

    if json || config.output.format == "json" {
        println!("{}", serde_json::to_string_pretty(&parsed)?);
    } else {
        print!("{}", render_tree(&parsed, &RenderOptions::from(&config.output)));
    }
    Ok(())
}

/// Validate each address and report the first failing rule.
fn cmd_validate(addresses: &[String], dns: bool, config: &Config) -> anyhow::Result<()> {
    let resolver = if dns || config.validation.use_dns {
        Some(system_resolver(config)?)
    } else {
        None
    };

    let mut failures = 0usize;
    for address in addresses.iter().flat_map(|raw| split_address_list(raw)) {
        match validate::validate(&address, resolver.as_deref()) {
            Ok(()) => println!("ok       {address}"),
            Err(reason) => {
                failures += 1;
                println!("invalid  {address}: {reason}");
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{failures} invalid address(es)");
    }
    Ok(())
}

#[cfg(feature = "dns")]
fn system_resolver(config: &Config) -> anyhow::Result<Box<dyn DnsCheck>> {
    let timeout = std::time::Duration::from_secs(config.validation.dns_timeout_secs);
    Ok(Box::new(validate::dns::SystemResolver::new(timeout)?))
}

#[cfg(not(feature = "dns"))]
fn system_resolver(_config: &Config) -> anyhow::Result<Box<dyn DnsCheck>> {
    anyhow::bail!("DNS checks need mailtree built with the `dns` feature")
}

/// Apply the skip-invalid and dedup policy to a recipient list.
fn cmd_recipients(addresses: &[String]) -> anyhow::Result<()> {
    let recipients: RecipientList = addresses
        .iter()
        .flat_map(|raw| split_address_list(raw))
        .collect();
    println!("{recipients}");
    Ok(())
}

/// Generate shell completions and print to stdout.
fn cmd_completions(shell: clap_complete::Shell) -> anyhow::Result<()> {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "mailtree", &mut std::io::stdout());
    Ok(())
}

/// Generate a man page and print to stdout.
fn cmd_manpage() -> anyhow::Result<()> {
    let cmd = Cli::command();
    let man = clap_mangen::Man::new(cmd);
    let mut buf = Vec::new();
    man.render(&mut buf)?;
    std::io::Write::write_all(&mut std::io::stdout(), &buf)?;
    Ok(())
}
