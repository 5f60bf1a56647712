mod cli;

use std::fs;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::Parser;
use export_logging::{export_error, export_info, LogOptions};
use thiserror::Error;
use wp_export_core::normalize_extra_frontmatter;
use wp_export_engine::{
    discover_api, ensure_output_dir, parse_site_url, ApiError, CachingFetcher, ExportError,
    ExportSummary, Exporter, FetchError, FetchSettings, PersistError, Reporter, ReqwestFetcher,
    ResponseCache,
};

use cli::Cli;

#[derive(Debug, Error)]
enum AppError {
    #[error("I couldn't find the API of the site to export, try with 'wordpress-export <url>' or with --api")]
    NoApi,
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("Failed to read '{path}': {source}")]
    Frontmatter {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to set up HTTP client: {0}")]
    Client(#[from] FetchError),
    #[error("Failed to create cache directory: {0}")]
    Cache(#[from] PersistError),
    #[error("Failed to start runtime: {0}")]
    Runtime(#[source] io::Error),
    #[error(transparent)]
    Export(#[from] ExportError),
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            err.exit()
        }
        Err(err) => {
            let _ = err.print();
            return ExitCode::FAILURE;
        }
    };

    let options = LogOptions {
        terminal_level: cli.terminal_level(),
        log_file: cli.log.clone(),
    };
    if let Err(err) = export_logging::initialize(&options) {
        eprintln!(
            "Failed to open log file {}: {}",
            options.log_file.unwrap_or_default().display(),
            err
        );
        return ExitCode::FAILURE;
    }

    let code = match run(cli) {
        Ok(summary) => {
            export_info!(
                "Exported {} posts ({} missing assets, {} warnings)",
                summary.posts_written.len(),
                summary.missing_assets,
                summary.warnings
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            export_error!("{}", err);
            ExitCode::FAILURE
        }
    };
    export_logging::flush();
    code
}

fn run(cli: Cli) -> Result<ExportSummary, AppError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(AppError::Runtime)?;
    runtime.block_on(export(cli))
}

async fn export(cli: Cli) -> Result<ExportSummary, AppError> {
    let fetcher = ReqwestFetcher::new(FetchSettings {
        user_agent: cli.user_agent.clone(),
        ..FetchSettings::default()
    })?;

    let site = cli.url.as_deref().map(parse_site_url).transpose()?;
    let api_url = match (cli.api.clone(), site) {
        (Some(api), _) => api,
        (None, Some(site)) => discover_api(&fetcher, &site).await?,
        (None, None) => return Err(AppError::NoApi),
    };

    let extra_frontmatter = match &cli.frontmatter {
        Some(path) => {
            let raw = fs::read_to_string(path).map_err(|source| AppError::Frontmatter {
                path: path.clone(),
                source,
            })?;
            normalize_extra_frontmatter(&raw)
        }
        None => String::new(),
    };

    let config = cli.into_config(api_url, extra_frontmatter);
    let cache = match &config.cache_dir {
        Some(dir) => {
            ensure_output_dir(dir)?;
            Some(ResponseCache::new(dir.clone(), config.cache_mode.clone()))
        }
        None => None,
    };
    let fetcher = CachingFetcher::new(fetcher, cache);

    let exporter = Exporter::new(&config, &fetcher)?;
    let mut reporter = Reporter::new(config.verbosity);
    Ok(exporter.run(&mut reporter).await?)
}
