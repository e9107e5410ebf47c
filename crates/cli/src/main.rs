use clap::{Args, Parser, Subcommand};
use comfy_table::Table;
use log_adapter::FileLogArchive;
use sqlite_adapter::SqliteStore;
use std::path::PathBuf;
use toolset_core::ports::{SystemClock, UserId};
use toolset_core::purge::purge;
use toolset_core::settings::ScreenOptions;
use toolset_core::utils::split_list;
use toolset_core::{CleanupRequest, CleanupService, Result, ToolsetConfig};
use tracing_subscriber::EnvFilter;

/// Bulk-remove store products by category, with a dry-run preview
#[derive(Parser, Debug)]
#[command(name = "store-toolset", version)]
#[command(about = "Bulk-deletes every product assigned to the selected product categories")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Path to the store SQLite database
    #[arg(long = "db", env = "STORE_TOOLSET_DB", global = true)]
    db: Option<PathBuf>,

    /// Directory where run logs are archived
    #[arg(long = "log-dir", env = "STORE_TOOLSET_LOG_DIR", global = true)]
    log_dir: Option<PathBuf>,

    /// Verbose logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List product categories
    ListCategories,

    /// Run cleanup for selected categories
    Run(RunArgs),

    /// Show the log of the most recent run, if still cached
    LastLog,

    /// Show or change a user's screen options
    ScreenOptions(ScreenOptionsArgs),

    /// Remove the cached log, saved screen options and archived logs
    Purge,
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Comma-separated term IDs
    #[arg(long = "term-id", value_name = "IDS")]
    term_id: Option<String>,

    /// Comma-separated category slugs
    #[arg(long = "category-slug", value_name = "SLUGS")]
    category_slug: Option<String>,

    /// Simulate cleanup (no deletions)
    #[arg(long = "dry-run")]
    dry_run: bool,
}

#[derive(Args, Debug)]
struct ScreenOptionsArgs {
    /// User the options belong to
    #[arg(long)]
    user: UserId,

    /// Comma-separated columns: image, description, slug, count
    #[arg(long)]
    columns: Option<String>,

    /// Categories per page (10-200)
    #[arg(long = "per-page")]
    per_page: Option<String>,
}

fn main() {
    let cli = Cli::parse();

    // Diagnostics go to stderr so stdout only carries command output
    let default_level = if cli.verbose {
        tracing::Level::INFO
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(default_level.into()))
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = execute(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}

fn execute(cli: Cli) -> Result<()> {
    let mut config = ToolsetConfig::default();
    if let Some(db) = cli.db {
        config = config.with_database_path(db);
    }
    if let Some(log_dir) = cli.log_dir {
        config = config.with_log_dir(log_dir);
    }

    // Instantiate concrete implementations of secondary adapters
    let store = SqliteStore::open(&config.database_path)?;
    let archive = FileLogArchive::new(&config.log_dir, &config.log_prefix);
    let clock = SystemClock;

    let service = CleanupService::new(&store, &store, &archive, &store, &clock)
        .with_cache_ttl(config.cache_ttl);

    match cli.command {
        Command::ListCategories => list_categories(&service),
        Command::Run(args) => run_cleanup(&service, &args),
        Command::LastLog => {
            match service.last_log()? {
                Some(log) => println!("{}", log),
                None => println!("No recent run log."),
            }
            Ok(())
        }
        Command::ScreenOptions(args) => screen_options(&store, &args),
        Command::Purge => {
            let archived = archive.list()?.len();
            purge(&store, &store, &archive)?;
            println!(
                "Success: Store toolset data purged ({} archived logs removed).",
                archived
            );
            Ok(())
        }
    }
}

fn list_categories(service: &CleanupService<'_>) -> Result<()> {
    let categories = service.list_categories()?;
    if categories.is_empty() {
        println!("Success: No product categories found.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["term_id", "name", "slug", "count"]);
    for category in categories {
        table.add_row(vec![
            category.term_id.to_string(),
            category.name,
            category.slug,
            category.count.to_string(),
        ]);
    }
    println!("{table}");
    Ok(())
}

fn run_cleanup(service: &CleanupService<'_>, args: &RunArgs) -> Result<()> {
    let term_ids =
        service.resolve_term_ids(args.term_id.as_deref(), args.category_slug.as_deref())?;
    let request = CleanupRequest::new(term_ids, args.dry_run)?;

    let log = service.run(&request)?;

    println!("Success: Cleanup finished.");
    println!("{}", log.text());
    Ok(())
}

fn screen_options(store: &SqliteStore, args: &ScreenOptionsArgs) -> Result<()> {
    let options = if args.columns.is_some() || args.per_page.is_some() {
        let current = ScreenOptions::load(store, args.user)?;
        let columns = match &args.columns {
            Some(raw) => split_list(raw),
            None => current.columns.iter().map(|c| c.key().to_string()).collect(),
        };
        let per_page = args
            .per_page
            .clone()
            .unwrap_or_else(|| current.per_page.to_string());

        let updated = ScreenOptions::from_posted(&columns, Some(&per_page));
        updated.save(store, args.user)?;
        updated
    } else {
        ScreenOptions::load(store, args.user)?
    };

    let columns = if options.columns.is_empty() {
        "(none)".to_string()
    } else {
        options
            .columns
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    };
    println!("Columns: {}", columns);
    println!("Per page: {}", options.per_page);
    Ok(())
}
