use clap::{Parser, Subcommand};
use dirdex::cache::HashCache;
use dirdex::config::{self, Config};
use dirdex::scan::Indexer;
use dirdex::{cleanup, output};
use std::io::Write;
use std::path::PathBuf;

const APP_NAME: &str = "dirdex";

#[derive(Parser)]
#[command(name = "dirdex")]
#[command(about = "Static site generator for browsable file indexes")]
#[command(long_about = "\
Static site generator for browsable file indexes

Walks a directory tree and gives every subdirectory three artifacts: a
self-contained index.html listing its entries, a .meta JSON side-car, and a
.md5 hash manifest. Content hashes are cached across runs by file identity
(name, size, mtime), so re-indexing a large tree only reads what changed.

Artifacts per directory:

  photos/
  ├── index.html          # Browsable listing (refused if present, see --force)
  ├── .meta               # Metadata side-car consumed by other tooling
  ├── .md5                # '<hash>  <name>' per file, sorted
  ├── 2024/
  │   ├── index.html      # Every subdirectory gets the same trio
  │   └── ...
  └── .dirdex.toml        # Optional config (source root only)

Hidden entries (leading '.' or '__'), the assets directory at the source
root, and the artifacts themselves are never indexed. 'cleanup' deletes
everything a previous run generated, keeping any index.html it didn't
write.

Run 'dirdex gen-config' to print a documented .dirdex.toml.")]
#[command(version)]
struct Cli {
    /// Source directory to index
    #[arg(long, default_value = ".", global = true)]
    source: PathBuf,

    /// Output root for artifacts (defaults to the source directory)
    #[arg(long, global = true)]
    output: Option<PathBuf>,

    /// Site name used in page titles and the footer
    #[arg(long, global = true)]
    name: Option<String>,

    /// Heading shown on every index page
    #[arg(long, global = true)]
    display_name: Option<String>,

    /// Display flags, comma separated (show-hidden, hide-generated-by, hide-title)
    #[arg(long = "flag", value_delimiter = ',', global = true)]
    flags: Vec<String>,

    /// Skip confirmation prompts
    #[arg(long, short = 'q', global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Index the source tree and write per-directory artifacts
    Build {
        /// Overwrite index files left by previous runs
        #[arg(long)]
        force: bool,
    },
    /// Walk and aggregate without writing anything
    Check,
    /// Delete artifacts generated by previous runs
    Cleanup,
    /// Print a documented stock .dirdex.toml
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp(None)
        .init();

    let cli = Cli::parse();
    match &cli.command {
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
        Command::Build { force } => {
            let config = resolve_config(&cli, *force)?;
            if !cli.quiet
                && !confirm(&format!(
                    "Continue in '{}' (y/N)? ",
                    config.source.display()
                ))?
            {
                println!("Aborted.");
                return Ok(());
            }
            let cache = HashCache::for_user(APP_NAME);
            let mut indexer = Indexer::new(&config, &cache, true);
            indexer.run()?;
            output::print_build_summary(indexer.summaries());
            println!("Cache: {}", cache.stats());
        }
        Command::Check => {
            let config = resolve_config(&cli, false)?;
            let cache = HashCache::for_user(APP_NAME);
            let mut indexer = Indexer::new(&config, &cache, false);
            indexer.run()?;
            output::print_build_summary(indexer.summaries());
        }
        Command::Cleanup => {
            let config = resolve_config(&cli, false)?;
            let targets = cleanup::collect(&config);
            if targets.is_empty() {
                println!("There is nothing to delete.");
                return Ok(());
            }
            output::print_cleanup_targets(&targets);
            if !cli.quiet
                && !confirm(&format!(
                    "Do you really want to cleanup in '{}' (y/N)? ",
                    config.output.display()
                ))?
            {
                println!("Aborted.");
                return Ok(());
            }
            let report = cleanup::run(&targets, &config);
            output::print_cleanup_report(&report);
            if !report.failures.is_empty() {
                return Err(format!("cleanup failed on {} paths", report.failures.len()).into());
            }
        }
    }
    Ok(())
}

/// Layer CLI arguments over the optional `.dirdex.toml` at the source root.
fn resolve_config(cli: &Cli, force: bool) -> Result<Config, config::ConfigError> {
    let mut site = config::load_config(&cli.source)?;
    if let Some(name) = &cli.name {
        site.name = name.clone();
    }
    if let Some(display_name) = &cli.display_name {
        site.display_name = display_name.clone();
    }
    site.flags.extend(cli.flags.iter().cloned());
    Config::from_site(cli.source.clone(), cli.output.clone(), site, force)
}

/// Ask a y/N question on stdout; only an explicit yes proceeds.
fn confirm(prompt: &str) -> std::io::Result<bool> {
    print!("{prompt}");
    std::io::stdout().flush()?;
    let mut answer = String::new();
    std::io::stdin().read_line(&mut answer)?;
    Ok(matches!(
        answer.trim().to_lowercase().as_str(),
        "y" | "yes"
    ))
}
