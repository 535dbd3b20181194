//! pixiv-downloader - CLI entry point.

use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use pixiv_downloader::{
    api::{PixivApi, ReqwestTransport},
    cli::{Args, Command},
    clock::{Clock, SystemClock},
    config::{validate_config, Config},
    download::{run_query, DownloadManager, RateLimiter, RetryPolicy},
    error::{exit_codes, Error, Result},
    fs::ensure_output_root,
    output::{
        create_item_spinner, print_banner, print_error, print_info, print_run_summary,
        print_success, print_summary, print_warning,
    },
    resolver::Resolver,
};

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => ExitCode::from(code as u8),
        Err(e) => {
            print_error(&format!("{}", e));
            let code = match e {
                Error::Config(_)
                | Error::ConfigValidation { .. }
                | Error::InvalidQuery(_)
                | Error::OutputDirectory { .. }
                | Error::TomlParse(_) => exit_codes::CONFIG_ERROR,
                Error::Api(_) | Error::IncompatibleResponse(_) | Error::Http(_) => {
                    exit_codes::API_ERROR
                }
                _ => exit_codes::UNEXPECTED_ERROR,
            };
            ExitCode::from(code as u8)
        }
    }
}

async fn run() -> Result<i32> {
    // Parse CLI arguments
    let args = Args::parse();

    // Set up logging
    let log_level = if args.debug {
        "debug"
    } else if args.quiet {
        "warn"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Load configuration
    let mut config = load_config(&args.config)?;
    args.merge_into_config(&mut config);

    if let Command::Config { generate, show } = &args.command {
        return config_command(&args.config, &config, *generate, *show);
    }

    if !args.quiet {
        print_banner();
    }

    validate_config(&config)?;

    let clock: Arc<dyn Clock> = Arc::new(SystemClock::new());
    let query = args
        .command
        .to_query(&config, clock.today())?
        .ok_or_else(|| Error::InvalidQuery("No download command given".to_string()))?;

    ensure_output_root(&config.download.output_dir).await?;

    if !args.quiet {
        print_run_summary(&query, &config);
    }

    // One limiter for every request of the run
    let limiter = Arc::new(RateLimiter::new(config.delay(), config.jitter(), clock));
    let transport = Arc::new(ReqwestTransport::from_config(&config)?);
    let api = Arc::new(PixivApi::new(transport, limiter)?);

    let policy = RetryPolicy::new(config.download.retry_times, config.delay());
    let resolver = Resolver::new(api.clone(), policy.clone());
    let manager = DownloadManager::new(api, policy, config.download.output_dir.clone());

    let spinner = (!args.quiet).then(|| create_item_spinner("Fetching listing..."));

    let result = tokio::select! {
        result = run_query(&resolver, &manager, &query, spinner.as_ref()) => result,
        // A failed signal registration disables this branch
        Ok(()) = tokio::signal::ctrl_c() => {
            if let Some(spinner) = &spinner {
                spinner.abandon();
            }
            print_warning("Interrupted, stopping. Completed files are kept; re-run to resume.");
            return Ok(exit_codes::ABORT);
        }
    };

    if let Some(spinner) = &spinner {
        spinner.finish_and_clear();
    }

    let report = result?;
    print_summary(&report.summary, &config.download.output_dir);

    if report.summary.failed > 0 {
        print_warning(&format!(
            "{} file(s) failed; re-run the same command to retry them",
            report.summary.failed
        ));
        return Ok(exit_codes::SOME_FILES_FAILED);
    }

    Ok(exit_codes::SUCCESS)
}

/// Load the configuration file, falling back to defaults when it is missing.
fn load_config(path: &Path) -> Result<Config> {
    if path.exists() {
        return Config::load(path);
    }

    tracing::warn!("Configuration file not found: {}", path.display());
    tracing::info!("Using default configuration with CLI arguments");
    Ok(Config::default())
}

/// Handle `config --generate` / `config --show`.
fn config_command(path: &Path, config: &Config, generate: bool, show: bool) -> Result<i32> {
    if generate {
        if path.exists() {
            return Err(Error::Config(format!(
                "{} already exists; remove it first to regenerate",
                path.display()
            )));
        }
        Config::default().save(path)?;
        print_success(&format!("Wrote default configuration to {}", path.display()));
    }

    if show {
        print!("{}", config.to_toml()?);
    }

    if !generate && !show {
        print_info("Nothing to do: pass --generate or --show");
    }

    Ok(exit_codes::SUCCESS)
}
