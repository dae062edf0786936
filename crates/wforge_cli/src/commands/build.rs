//! Build command - generate, build and repair a widget.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use tracing::{debug, info};

use wforge_core::{
    BuildEvent, BuildLoop, BuildOptions, BuildOutcome, CancellationFlag, CoreError, WidgetExecutor,
};
use wforge_fixes::FixChain;
use wforge_runner::{CliRunner, CliRunnerOptions, LogLine, PackageRunner, RunConfig};
use wforge_spec::WidgetReader;

use crate::error::CliError;
use crate::settings::Settings;

#[derive(Args)]
pub struct BuildArgs {
    /// Widget config file (.json, .yaml or .toml)
    config_file: PathBuf,

    /// Folder the widget package is generated into
    #[arg(long)]
    work_folder: Option<PathBuf>,

    /// Maximum build attempts
    #[arg(long)]
    max_attempts: Option<u32>,

    /// Copy the packaged widget here on success
    #[arg(long = "deploy-to")]
    deploy_to: Option<PathBuf>,

    /// Never call a language model
    #[arg(long)]
    offline: bool,

    /// Print package-manager commands instead of running them
    #[arg(long)]
    dry_run: bool,
}

pub async fn execute(args: BuildArgs, settings: Settings) -> Result<()> {
    let config = WidgetReader::read(&args.config_file)
        .map_err(|e| CliError::InvalidInput(format!("{}: {}", args.config_file.display(), e)))?;

    let validation = config.validate();
    for warning in &validation.warnings {
        println!("⚠️  {}", warning);
    }
    if !validation.valid {
        return Err(CliError::InvalidInput(validation.errors.join("; ")).into());
    }

    let options = BuildOptions {
        work_folder: args.work_folder.unwrap_or_else(|| settings.work_folder.clone()),
        max_attempts: args.max_attempts.unwrap_or(settings.max_attempts),
        auto_deploy_target: args.deploy_to.or_else(|| settings.auto_deploy_target.clone()),
    };
    if options.max_attempts == 0 {
        return Err(CliError::InvalidInput("max attempts must be at least 1".to_string()).into());
    }

    info!("Building widget {} from {:?}", config.component_name(), args.config_file);

    let runner_options = CliRunnerOptions {
        preferred: settings.package_manager()?,
        dry_run: args.dry_run,
        ci_mode: false,
    };
    let runner = CliRunner::new(runner_options)
        .await
        .context("No package manager available")?
        .with_log_handler(Arc::new(|line: LogLine| debug!("{}", line.message)));
    let runner: Arc<dyn PackageRunner> = Arc::new(runner);
    let run_config = RunConfig::default()
        .timeout(settings.command_timeout_secs)
        .stream_logs(true);

    let nucleus = settings.open_nucleus();
    let knowledge = settings.open_knowledge()?;
    let assistant = settings.assistant(args.offline);
    if assistant.is_online() {
        println!("🤖 Language model available for generative fixes");
    }

    let chain = FixChain::standard(
        nucleus.clone(),
        Arc::new(knowledge),
        Some(runner.clone()),
        run_config.clone(),
        assistant,
    );
    let executor = WidgetExecutor::new(runner).with_run_config(run_config);
    let build = BuildLoop::new(Arc::new(executor), chain, nucleus)
        .with_progress(Arc::new(|event: &BuildEvent| print_event(event)));

    let cancel = CancellationFlag::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("⏹  Cancelling after the current step...");
            on_signal.cancel();
        }
    });

    let report = build
        .execute(config, &options, &cancel)
        .await
        .map_err(|e| match e {
            CoreError::InvalidConfig(msg) => anyhow::Error::from(CliError::InvalidInput(msg)),
            other => anyhow::Error::from(other),
        })?;

    match &report.outcome {
        BuildOutcome::Succeeded {
            output_dir,
            artifact,
            deployed_to,
        } => {
            println!();
            println!("✅ Widget built in {}", output_dir.display());
            if let Some(artifact) = artifact {
                println!("   Package: {}", artifact.display());
            }
            if let Some(target) = deployed_to {
                println!("   Deployed: {}", target.display());
            }
            if !report.fixes.is_empty() {
                println!("   Repaired with {} fix(es)", report.fixes.len());
            }
            Ok(())
        }
        BuildOutcome::Cancelled => Err(CliError::Cancelled.into()),
        outcome => {
            eprintln!();
            eprintln!("{}", report.summary());
            Err(CliError::BuildFailed(outcome.to_string()).into())
        }
    }
}

fn print_event(event: &BuildEvent) {
    match event {
        BuildEvent::AttemptStarted { .. } => println!("🔨 {}", event),
        BuildEvent::AttemptFailed { .. } => println!("   ❌ {}", event),
        BuildEvent::FixApplied { .. } => println!("   🔧 {}", event),
        BuildEvent::NoFixAvailable { .. } | BuildEvent::Exhausted { .. } => println!("   ⚠️  {}", event),
        BuildEvent::Succeeded { .. } | BuildEvent::Deployed { .. } => println!("   ✅ {}", event),
        BuildEvent::Cancelled { .. } => println!("   ⏹  {}", event),
    }
}
