//! Explain command - describe a saved build failure and the known fixes for it.

use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use wforge_assist::ExplanationSource;

use crate::error::CliError;
use crate::settings::Settings;

#[derive(Args)]
pub struct ExplainArgs {
    /// File holding the build output
    diagnostic_file: PathBuf,

    /// Number of matching fix patterns to show
    #[arg(long, default_value_t = 3)]
    limit: usize,

    /// Use the canned explanations only
    #[arg(long)]
    offline: bool,
}

pub async fn execute(args: ExplainArgs, settings: Settings) -> Result<()> {
    let diagnostic = fs::read_to_string(&args.diagnostic_file).map_err(|e| {
        CliError::InvalidInput(format!("{}: {}", args.diagnostic_file.display(), e))
    })?;
    if diagnostic.trim().is_empty() {
        return Err(CliError::InvalidInput("diagnostic file is empty".to_string()).into());
    }

    let helper = settings.assistant(args.offline);
    let explanation = helper.explain(&diagnostic).await;
    let source = match explanation.source {
        ExplanationSource::Model => "model",
        ExplanationSource::Canned => "built-in",
    };
    println!("💡 Explanation ({})", source);
    println!("{}", explanation.summary);

    let nucleus = settings.open_nucleus();
    let matches: Vec<String> = nucleus.with(|store| {
        store
            .ranked_matches(&diagnostic)
            .into_iter()
            .take(args.limit)
            .map(|m| {
                format!(
                    "{:<36} score {:.2}  conf {:.2}  {}",
                    m.pattern.id, m.score, m.pattern.confidence, m.pattern.description
                )
            })
            .collect()
    });

    println!();
    if matches.is_empty() {
        println!("No known fix patterns match this failure");
    } else {
        println!("🔧 Known fixes:");
        for line in matches {
            println!("   {}", line);
        }
    }

    Ok(())
}
