//! biotools-utils — registry analysis and maintenance CLI.
//!
//! Usage:
//!   biotools-utils download          Download tool records and derive a table
//!   biotools-utils extract           Extract EDAM terms from a tool dump
//!   biotools-utils count-terms       Print a ranked term frequency report
//!   biotools-utils count-categories  Score tools against yes/maybe term lists
//!   biotools-utils encode            One-hot encode Topics/Operations
//!   biotools-utils cluster           Ward-cluster a one-hot matrix
//!   biotools-utils licenses          Fetch and summarize the SPDX license list
//!   biotools-utils delete            Bulk-delete registry entries

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};
use tracing::{error, info};

use biotools_utils::api::{self, BiotoolsClient};
use biotools_utils::cluster;
use biotools_utils::config;
use biotools_utils::encode::{self, OneHotMatrix};
use biotools_utils::extract;
use biotools_utils::licenses;
use biotools_utils::report::{self, TermColumn};
use biotools_utils::table;
use biotools_utils::types::{Credentials, TermCategories, TermCategory, TermIndex, Tool};

/// Exit code for argument/credential validation failures.
const EXIT_USAGE: i32 = 2;
/// Exit code for authentication failures.
const EXIT_AUTH: i32 = 5;

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(name = "biotools-utils")]
#[command(version = "0.1.0")]
#[command(about = "Analysis and maintenance utilities for the bio.tools registry")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the config file (defaults to ~/.biotools/biotools.toml).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log level (debug, info, warn, error); defaults to the config's
    /// log_level.
    #[arg(long)]
    log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Download tool records for a collection (or all tools).
    Download {
        /// Collection ID to filter on; omit to fetch every tool.
        #[arg(long)]
        collection: Option<String>,

        /// Where to write the raw JSON dump.
        #[arg(long, default_value = "tools.json")]
        json: PathBuf,

        /// Also derive a CSV tool table at this path.
        #[arg(long)]
        table: Option<PathBuf>,
    },

    /// Extract EDAM terms of one category from a tool dump.
    Extract {
        /// Path to a tools.json dump.
        #[arg(long, default_value = "tools.json")]
        tools: PathBuf,

        /// Term category: Topic, Operation, Format, or Data.
        #[arg(long)]
        category: String,

        /// Write the `tool ID -> terms` mapping here instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Print ranked top-N term frequencies for a tool table.
    CountTerms {
        /// Path to the tool table CSV.
        #[arg(long)]
        table: PathBuf,

        /// How many entries to show per column (overrides config).
        #[arg(long)]
        top_n: Option<usize>,

        /// Topic index JSON for resolving names of short topic IDs.
        #[arg(long)]
        topic_index: Option<PathBuf>,

        /// Operation index JSON for resolving names of short operation IDs.
        #[arg(long)]
        operation_index: Option<PathBuf>,
    },

    /// Score each tool against curated yes/maybe term lists.
    CountCategories {
        /// Path to the tool table CSV.
        #[arg(long)]
        table: PathBuf,

        /// Path to the term_categories.json reference file.
        #[arg(long)]
        categories: PathBuf,

        /// Where to write the augmented count table.
        #[arg(long, default_value = "tool_counts.csv")]
        output: PathBuf,
    },

    /// One-hot encode Topics and Operations membership into matrices.
    Encode {
        /// Path to the tool table CSV.
        #[arg(long)]
        table: PathBuf,

        /// Directory for topics_1he.csv / operations_1he.csv (overrides config).
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },

    /// Ward-cluster the rows of a one-hot matrix and print a dendrogram.
    Cluster {
        /// Path to a matrix written by `encode`.
        #[arg(long)]
        matrix: PathBuf,

        /// Report title (e.g. "Topics" or "Operations").
        #[arg(long, default_value = "terms")]
        title: String,

        /// Print the raw merge table instead of the dendrogram.
        #[arg(long)]
        merge_table: bool,
    },

    /// Fetch the SPDX license list and print a summary.
    Licenses,

    /// Bulk-delete registry entries.
    Delete {
        /// JSON file with 'username' and 'password' keys for the account
        /// responsible for the deletion.
        #[arg(long, short)]
        credentials: PathBuf,

        /// Text file with the biotools IDs to delete, one per line.
        #[arg(long, short)]
        ids: PathBuf,
    },
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(config::default_config_path);
    let cfg = config::load_config(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    let log_level = cli.log_level.as_deref().unwrap_or(&cfg.log_level);
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .init();

    match cli.command {
        Commands::Download {
            collection,
            json,
            table,
        } => cmd_download(&cfg, collection.as_deref(), &json, table.as_deref()).await,
        Commands::Extract {
            tools,
            category,
            output,
        } => cmd_extract(&tools, &category, output.as_deref()),
        Commands::CountTerms {
            table,
            top_n,
            topic_index,
            operation_index,
        } => cmd_count_terms(
            &cfg,
            &table,
            top_n,
            topic_index.as_deref(),
            operation_index.as_deref(),
        ),
        Commands::CountCategories {
            table,
            categories,
            output,
        } => cmd_count_categories(&table, &categories, &output),
        Commands::Encode { table, output_dir } => cmd_encode(&cfg, &table, output_dir.as_deref()),
        Commands::Cluster {
            matrix,
            title,
            merge_table,
        } => cmd_cluster(&matrix, &title, merge_table),
        Commands::Licenses => cmd_licenses(&cfg).await,
        Commands::Delete { credentials, ids } => cmd_delete(&cfg, &credentials, &ids).await,
    }
}

// ---------------------------------------------------------------------------
// Command implementations
// ---------------------------------------------------------------------------

async fn cmd_download(
    cfg: &config::BiotoolsConfig,
    collection: Option<&str>,
    json_path: &Path,
    table_path: Option<&Path>,
) -> Result<()> {
    let client = BiotoolsClient::new(&cfg.api_base_url, cfg.page_delay_ms);

    match collection {
        Some(id) => println!(
            "{} Downloading tools in collection '{}'",
            ">>>".green().bold(),
            id
        ),
        None => println!("{} Downloading all tool records", ">>>".green().bold()),
    }

    let tools = client.fetch_tools(collection).await?;

    let dump = serde_json::to_string(&tools).context("Failed to serialize tool dump")?;
    std::fs::write(json_path, dump)
        .with_context(|| format!("Failed to write tool dump {}", json_path.display()))?;
    println!("Saved {} tool records to {}", tools.len(), json_path.display());

    if let Some(path) = table_path {
        let rows = table::rows_from_tools(&tools);
        table::write_table(path, &rows)?;
        println!("Wrote tool table to {}", path.display());
    }

    Ok(())
}

fn cmd_extract(tools_path: &Path, category: &str, output: Option<&Path>) -> Result<()> {
    let category: TermCategory = category.parse()?;
    let tools = load_tools(tools_path)?;

    let terms = extract::extract_terms(&tools, category);
    info!("Extracted {} terms for {} tools", category, terms.len());

    let rendered =
        serde_json::to_string_pretty(&terms).context("Failed to serialize extracted terms")?;
    match output {
        Some(path) => {
            std::fs::write(path, rendered)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Wrote {} terms for {} tools to {}", category, terms.len(), path.display());
        }
        None => println!("{}", rendered),
    }

    Ok(())
}

fn cmd_count_terms(
    cfg: &config::BiotoolsConfig,
    table_path: &Path,
    top_n: Option<usize>,
    topic_index: Option<&Path>,
    operation_index: Option<&Path>,
) -> Result<()> {
    let rows = table::read_table(table_path)?;
    let top_n = top_n.unwrap_or(cfg.top_n);

    // With an index, report regex-extracted short IDs resolved to names;
    // otherwise report the raw term strings.
    for (column, index_path) in [
        (TermColumn::Topics, topic_index),
        (TermColumn::Operations, operation_index),
    ] {
        match load_index(index_path)? {
            Some(index) => {
                let freqs = report::term_id_frequencies(&rows, column);
                report::print_top_terms(&freqs, top_n, column.label(), Some(&index));
            }
            None => {
                let freqs = report::term_frequencies(&rows, column);
                report::print_top_terms(&freqs, top_n, column.label(), None);
            }
        }
    }

    Ok(())
}

fn cmd_count_categories(table_path: &Path, categories_path: &Path, output: &Path) -> Result<()> {
    let rows = table::read_table(table_path)?;

    let contents = std::fs::read_to_string(categories_path)
        .with_context(|| format!("Failed to read {}", categories_path.display()))?;
    let categories: TermCategories =
        serde_json::from_str(&contents).context("Failed to parse term categories JSON")?;

    let counts = report::count_categories(&rows, &categories);
    report::write_count_table(output, &counts)?;
    println!("Wrote category counts for {} tools to {}", counts.len(), output.display());

    Ok(())
}

fn cmd_encode(
    cfg: &config::BiotoolsConfig,
    table_path: &Path,
    output_dir: Option<&Path>,
) -> Result<()> {
    let rows = table::read_table(table_path)?;

    let out_dir = output_dir
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(cfg.resolved_output_dir()));

    let topics = encode::encode(&rows, TermColumn::Topics);
    let topics_path = out_dir.join("topics_1he.csv");
    topics.write_csv(&topics_path)?;
    println!(
        "Encoded {} tools x {} topics -> {}",
        topics.labels.len(),
        topics.terms.len(),
        topics_path.display()
    );

    let operations = encode::encode(&rows, TermColumn::Operations);
    let operations_path = out_dir.join("operations_1he.csv");
    operations.write_csv(&operations_path)?;
    println!(
        "Encoded {} tools x {} operations -> {}",
        operations.labels.len(),
        operations.terms.len(),
        operations_path.display()
    );

    Ok(())
}

fn cmd_cluster(matrix_path: &Path, title: &str, merge_table: bool) -> Result<()> {
    let matrix = OneHotMatrix::read_csv(matrix_path)?;
    let merges = cluster::ward_linkage(&matrix)?;

    println!(
        "{}",
        format!("Dendrogram of tools based on EDAM {}", title).bold()
    );
    if merge_table {
        cluster::print_merge_table(&merges, &matrix.labels);
    } else {
        print!("{}", cluster::render_dendrogram(&merges, &matrix.labels));
    }

    Ok(())
}

async fn cmd_licenses(cfg: &config::BiotoolsConfig) -> Result<()> {
    let data = licenses::fetch_license_list(&cfg.spdx_license_url).await?;

    println!("{}", "=== SPDX license list ===".bold());
    println!("  Licenses:     {}", data.license_ids.len());
    println!("  OSI approved: {}", data.osi_approved.len());
    println!("  FSF libre:    {}", data.fsf_libre.len());
    println!("  Deprecated:   {}", data.deprecated.len());

    Ok(())
}

async fn cmd_delete(
    cfg: &config::BiotoolsConfig,
    credentials_path: &Path,
    ids_path: &Path,
) -> Result<()> {
    let credentials = match read_credentials(credentials_path) {
        Ok(creds) => creds,
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            std::process::exit(EXIT_USAGE);
        }
    };

    let ids = match read_id_list(ids_path) {
        Ok(ids) => ids,
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            std::process::exit(EXIT_USAGE);
        }
    };

    let client = BiotoolsClient::new(&cfg.api_base_url, cfg.page_delay_ms);

    let token = match client.login(&credentials).await {
        Ok(token) => {
            println!("Got the token");
            token
        }
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            std::process::exit(EXIT_AUTH);
        }
    };

    // Partial completion is expected: per-item failures are logged and the
    // loop carries on with the next ID.
    let total = ids.len();
    let pacing = std::time::Duration::from_millis(cfg.page_delay_ms);
    for (idx, tool_id) in ids.iter().enumerate() {
        tokio::time::sleep(pacing).await;

        let result = client.delete_tool(&token, tool_id).await;
        let line = api::delete_report_line(idx, total, tool_id, &result);
        if result.is_err() {
            error!("{}", line);
        } else {
            println!("{}", line);
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn load_tools(path: &Path) -> Result<Vec<Tool>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read tool dump {}", path.display()))?;
    serde_json::from_str(&contents).context("Failed to parse tool dump JSON")
}

fn load_index(path: Option<&Path>) -> Result<Option<TermIndex>> {
    let Some(path) = path else {
        return Ok(None);
    };
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read term index {}", path.display()))?;
    let index: TermIndex =
        serde_json::from_str(&contents).context("Failed to parse term index JSON")?;
    Ok(Some(index))
}

fn read_credentials(path: &Path) -> Result<Credentials> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read credentials file {}", path.display()))?;
    let credentials: Credentials =
        serde_json::from_str(&contents).context("Failed to parse credentials JSON")?;

    if credentials.username.trim().is_empty() {
        anyhow::bail!("No 'username' found in credentials");
    }
    if credentials.password.trim().is_empty() {
        anyhow::bail!("No 'password' found in credentials");
    }
    Ok(credentials)
}

fn read_id_list(path: &Path) -> Result<Vec<String>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read ID list {}", path.display()))?;
    Ok(contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}
