//! Knowledge command - append to and search the knowledge cache.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use wforge_nucleus::{ConfidenceTier, KnowledgeEntry};

use crate::error::CliError;
use crate::settings::Settings;

#[derive(Args)]
pub struct KnowledgeArgs {
    #[command(subcommand)]
    command: KnowledgeCommand,
}

#[derive(Subcommand)]
enum KnowledgeCommand {
    /// Record a new entry
    Add {
        title: String,

        content: String,

        #[arg(long, default_value = "general")]
        category: String,

        /// Comma-separated tags
        #[arg(long, value_delimiter = ',')]
        tags: Vec<String>,

        /// high, medium or low
        #[arg(long, default_value = "medium")]
        confidence: String,
    },

    /// Search entries by keyword
    Search {
        query: String,

        #[arg(long, default_value_t = 5)]
        limit: usize,
    },
}

pub async fn execute(args: KnowledgeArgs, settings: Settings) -> Result<()> {
    let mut cache = settings.open_knowledge()?;

    match args.command {
        KnowledgeCommand::Add {
            title,
            content,
            category,
            tags,
            confidence,
        } => {
            let tier = ConfidenceTier::parse(&confidence).ok_or_else(|| {
                CliError::InvalidInput(format!("unknown confidence '{}'", confidence))
            })?;
            let entry = KnowledgeEntry::new(title.clone(), content)
                .category(category)
                .provenance("user")
                .confidence(tier)
                .tags(tags.into_iter().filter(|t| !t.trim().is_empty()));
            cache
                .append(entry)
                .with_context(|| format!("Failed to write {}", settings.knowledge_path().display()))?;
            println!("✅ Recorded '{}' ({} entries)", title, cache.len());
        }
        KnowledgeCommand::Search { query, limit } => {
            let found = cache.search(&query, limit);
            if found.is_empty() {
                println!("No entries match '{}'", query);
            }
            for m in found {
                println!("[{:.2}] {} ({})", m.score, m.entry.title, m.entry.category);
                println!("       {}", m.entry.content);
            }
        }
    }

    Ok(())
}
