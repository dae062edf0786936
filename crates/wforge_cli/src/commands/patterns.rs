//! Patterns command - inspect the nucleus.

use anyhow::Result;
use clap::{Args, Subcommand};

use wforge_nucleus::{FixPattern, Provenance};

use crate::error::CliError;
use crate::settings::Settings;

#[derive(Args)]
pub struct PatternsArgs {
    #[command(subcommand)]
    command: PatternsCommand,
}

#[derive(Subcommand)]
enum PatternsCommand {
    /// List fix patterns, most confident first
    List {
        /// Only show patterns with this provenance (builtin, learned, user)
        #[arg(long)]
        provenance: Option<String>,
    },

    /// Show store statistics
    Stats,

    /// Show one pattern as JSON
    Show { id: String },

    /// Find known-good widget templates
    Templates { query: String },

    /// Look up usage notes for an SDK API
    Api { name: String },

    /// List best practices
    Practices {
        #[arg(long)]
        category: Option<String>,
    },
}

pub async fn execute(args: PatternsArgs, settings: Settings) -> Result<()> {
    let nucleus = settings.open_nucleus();

    match args.command {
        PatternsCommand::List { provenance } => {
            let filter = provenance.as_deref().map(parse_provenance).transpose()?;
            let mut patterns: Vec<FixPattern> = nucleus.with(|store| {
                store
                    .patterns()
                    .iter()
                    .filter(|p| filter.map_or(true, |f| p.provenance == f))
                    .cloned()
                    .collect()
            });
            patterns.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

            println!(
                "{:<40} {:<8} {:>5} {:>5} {:>5}  DESCRIPTION",
                "ID", "SOURCE", "CONF", "OK", "FAIL"
            );
            for p in &patterns {
                println!(
                    "{:<40} {:<8} {:>5.2} {:>5} {:>5}  {}",
                    p.id, p.provenance, p.confidence, p.success_count, p.failure_count, p.description
                );
            }
            println!("\n{} pattern(s)", patterns.len());
        }
        PatternsCommand::Stats => {
            let stats = nucleus.stats();
            println!("📊 Nucleus: {}", settings.nucleus_path().display());
            println!("   Patterns:        {}", stats.total_patterns);
            for provenance in [Provenance::Builtin, Provenance::Learned, Provenance::User] {
                println!("     {:<14} {}", provenance, stats.count(provenance));
            }
            println!("   Mean confidence: {:.2}", stats.mean_confidence);
            println!("   Successes:       {}", stats.total_successes);
            println!("   Failures:        {}", stats.total_failures);
            if let Some(id) = &stats.most_used {
                println!("   Most used:       {}", id);
            }
            println!("   Templates:       {}", stats.widget_templates);
            println!("   SDK notes:       {}", stats.sdk_apis);
            println!("   Best practices:  {}", stats.best_practices);
        }
        PatternsCommand::Show { id } => {
            let pattern = nucleus
                .get(&id)
                .ok_or_else(|| CliError::InvalidInput(format!("unknown pattern '{}'", id)))?;
            println!("{}", serde_json::to_string_pretty(&pattern)?);
        }
        PatternsCommand::Templates { query } => {
            let found: Vec<String> = nucleus.with(|store| {
                store
                    .find_widget_templates(&query)
                    .into_iter()
                    .map(|t| format!("{:<20} {:<12} {}", t.id, t.category, t.description))
                    .collect()
            });
            if found.is_empty() {
                println!("No templates match '{}'", query);
            }
            for line in found {
                println!("{}", line);
            }
        }
        PatternsCommand::Api { name } => {
            let note = nucleus
                .with(|store| store.lookup_api(&name).cloned())
                .ok_or_else(|| CliError::InvalidInput(format!("no notes for '{}'", name)))?;
            println!("{} ({})", note.name, note.module);
            println!("   {}", note.usage);
            for line in &note.notes {
                println!("   - {}", line);
            }
        }
        PatternsCommand::Practices { category } => {
            let practices: Vec<String> = nucleus.with(|store| {
                store
                    .best_practices(category.as_deref())
                    .into_iter()
                    .map(|p| format!("[{}] {}: {}", p.category, p.title, p.description))
                    .collect()
            });
            for line in practices {
                println!("{}", line);
            }
        }
    }

    Ok(())
}

fn parse_provenance(s: &str) -> Result<Provenance, CliError> {
    match s.trim().to_lowercase().as_str() {
        "builtin" => Ok(Provenance::Builtin),
        "learned" => Ok(Provenance::Learned),
        "user" => Ok(Provenance::User),
        other => Err(CliError::InvalidInput(format!("unknown provenance '{}'", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_provenance() {
        assert_eq!(parse_provenance("Learned").unwrap(), Provenance::Learned);
        assert!(parse_provenance("imported").is_err());
    }
}
