//! Wordboard CLI
//!
//! Command-line interface for Wordboard operations:
//! - Show the current top words
//! - Ingest identifiers from a file
//! - Split identifiers locally
//! - Check server status

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use wordboard::api::dto::IngestResponse;
use wordboard::words::{Language, WordTally};

#[derive(Parser)]
#[command(name = "wordboard-cli")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Client for the Wordboard live word dashboard")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// API server URL
    #[arg(long, default_value = "http://localhost:8086", global = true)]
    pub api_url: String,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the current top words
    Top {
        /// Number of words (default: the dashboard limit)
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Count the words in a file of identifiers, one per line
    Ingest {
        /// Path to identifier file
        path: PathBuf,
        /// Naming convention (python, java)
        #[arg(short, long)]
        language: Language,
        /// Show the tally without sending it
        #[arg(long)]
        dry_run: bool,
    },

    /// Split identifiers into words without contacting the server
    Split {
        /// Identifiers to split
        identifiers: Vec<String>,
        /// Naming convention (python, java)
        #[arg(short, long)]
        language: Language,
    },

    /// Show server status
    Status,

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    match cli.command {
        Commands::Top { limit } => {
            let mut request = client.get(format!("{}/api/v1/words/top", cli.api_url));
            if let Some(limit) = limit {
                request = request.query(&[("limit", limit)]);
            }

            let response = request
                .send()
                .await
                .with_context(|| format!("cannot reach Wordboard API at {}", cli.api_url))?;

            if !response.status().is_success() {
                let status = response.status();
                let text = response.text().await.unwrap_or_default();
                bail!("Query failed ({}): {}", status, text);
            }

            let data: serde_json::Value = response.json().await?;

            if cli.format == "json" {
                println!("{}", serde_json::to_string_pretty(&data)?);
            } else {
                print_words(&data);
            }
        }

        Commands::Ingest {
            path,
            language,
            dry_run,
        } => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("reading identifiers from {:?}", path))?;
            let identifiers: Vec<&str> = content
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('#'))
                .collect();

            if identifiers.is_empty() {
                bail!("No identifiers in {:?}", path);
            }

            if dry_run {
                let tally = WordTally::from_identifiers(language, &identifiers);
                print_tally(&tally);
                println!();
                println!("(Dry run - nothing was sent)");
                return Ok(());
            }

            let body = serde_json::json!({
                "language": language,
                "identifiers": identifiers,
            });

            let response = client
                .post(format!("{}/api/v1/words/ingest", cli.api_url))
                .json(&body)
                .send()
                .await
                .with_context(|| format!("cannot reach Wordboard API at {}", cli.api_url))?;

            if !response.status().is_success() {
                let status = response.status();
                let text = response.text().await.unwrap_or_default();
                bail!("Ingest failed ({}): {}", status, text);
            }

            let result: IngestResponse = response.json().await?;
            println!(
                "Ingested {} identifiers: {} words, {} occurrences",
                identifiers.len() - result.skipped,
                result.words,
                result.occurrences
            );
            if result.skipped > 0 {
                println!("  Skipped (not {}): {}", language, result.skipped);
            }
        }

        Commands::Split {
            identifiers,
            language,
        } => {
            for identifier in &identifiers {
                match language.split(identifier) {
                    Some(words) => println!("{:<30} {}", identifier, words.join(" ")),
                    None => println!("{:<30} (not {} naming)", identifier, language),
                }
            }
        }

        Commands::Status => {
            let response = client
                .get(format!("{}/health", cli.api_url))
                .send()
                .await
                .with_context(|| {
                    format!(
                        "cannot reach Wordboard API at {}; is `wordboard` running?",
                        cli.api_url
                    )
                })?;

            if !response.status().is_success() {
                bail!("API returned error: {}", response.status());
            }

            let health: serde_json::Value = response.json().await?;

            println!("Wordboard v{}", env!("CARGO_PKG_VERSION"));
            println!();
            println!(
                "API Status: {}",
                health["status"].as_str().unwrap_or("unknown")
            );
            println!(
                "Backend:    {} ({})",
                health["backend"].as_str().unwrap_or("unknown"),
                health["project_id"].as_str().unwrap_or("-")
            );
            println!();
            println!("Words:      {}", health["documents"].as_u64().unwrap_or(0));
            println!("Listeners:  {}", health["listeners"].as_u64().unwrap_or(0));
            println!("Dashboards: {}", health["ws_connections"].as_u64().unwrap_or(0));

            if let Some(uptime) = health["uptime_seconds"].as_u64() {
                println!();
                println!("Uptime: {}", format_duration(uptime));
            }
        }

        Commands::Config { output } => {
            let config = wordboard::config::generate_default_config();

            match output {
                Some(path) => {
                    // Create parent directory if needed
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&path, &config)?;
                    println!("Config written to {:?}", path);
                }
                None => {
                    print!("{}", config);
                }
            }
        }
    }

    Ok(())
}

fn format_duration(seconds: u64) -> String {
    if seconds < 60 {
        format!("{}s", seconds)
    } else if seconds < 3600 {
        format!("{}m {}s", seconds / 60, seconds % 60)
    } else if seconds < 86400 {
        format!("{}h {}m", seconds / 3600, (seconds % 3600) / 60)
    } else {
        format!("{}d {}h", seconds / 86400, (seconds % 86400) / 3600)
    }
}

fn print_words(data: &serde_json::Value) {
    let words = match data["words"].as_array() {
        Some(w) if !w.is_empty() => w,
        _ => {
            println!("No words yet.");
            println!();
            println!("Add some with:");
            println!("  wordboard-cli ingest names.txt --language python");
            return;
        }
    };

    println!("{:>4}  {:<24} {:>10} {:>10} {:>10}", "#", "Word", "Value", "Python", "Java");
    println!("{}", "-".repeat(64));

    for (rank, word) in words.iter().enumerate() {
        let label = word["data"]["name"]
            .as_str()
            .or_else(|| word["id"].as_str())
            .unwrap_or("-");
        println!(
            "{:>4}  {:<24} {:>10} {:>10} {:>10}",
            rank + 1,
            label,
            format_count(&word["value"]),
            format_count(&word["data"]["python_value"]),
            format_count(&word["data"]["java_value"]),
        );
    }
}

fn print_tally(tally: &WordTally) {
    let mut counts: Vec<_> = tally.counts.iter().collect();
    counts.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));

    println!("{:<24} {:>10}", "Word", "Count");
    println!("{}", "-".repeat(35));
    for (word, count) in counts {
        println!("{:<24} {:>10}", word, count);
    }
    println!();
    println!(
        "{} words, {} occurrences, {} skipped",
        tally.counts.len(),
        tally.total(),
        tally.skipped
    );
}

fn format_count(value: &serde_json::Value) -> String {
    match value.as_f64() {
        Some(v) if v.fract() == 0.0 => format!("{}", v as i64),
        Some(v) => format!("{:.1}", v),
        None => "-".to_string(),
    }
}
