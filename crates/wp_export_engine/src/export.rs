use std::collections::BTreeMap;
use std::path::PathBuf;

use regex::Regex;
use thiserror::Error;
use wp_export_core::{enrich_post, Comment, EnrichError, ExportConfig, Lookups, PermalinkError};

use crate::api::{ApiError, WpApi};
use crate::fetch::Fetcher;
use crate::persist::{ensure_output_dir, AtomicFileWriter, PersistError};
use crate::post::save_post;
use crate::report::Reporter;
use crate::rewrite::RewriteError;

/// An unrecoverable condition. Propagated to the top level, which logs it and exits.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Enrich(#[from] EnrichError),
    #[error(transparent)]
    Permalink(#[from] PermalinkError),
    #[error(transparent)]
    Persist(#[from] PersistError),
    #[error(transparent)]
    Rewrite(#[from] RewriteError),
    #[error("Failed to parse post url '{link}': {message}")]
    InvalidPostUrl { link: String, message: String },
    #[error("Failed to compile filter: {0}")]
    InvalidFilter(#[from] regex::Error),
    #[error("Failed to encode frontmatter for {link}: {source}")]
    Frontmatter {
        link: String,
        #[source]
        source: serde_yaml::Error,
    },
}

/// What a successful run produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportSummary {
    pub posts_written: Vec<PathBuf>,
    pub missing_assets: usize,
    pub warnings: usize,
}

/// Drives one export: collections, metadata, then every selected post.
pub struct Exporter<'a> {
    config: &'a ExportConfig,
    fetcher: &'a dyn Fetcher,
    filter: Regex,
}

impl<'a> Exporter<'a> {
    pub fn new(config: &'a ExportConfig, fetcher: &'a dyn Fetcher) -> Result<Self, ExportError> {
        let filter = Regex::new(&config.post_filter)?;
        Ok(Self {
            config,
            fetcher,
            filter,
        })
    }

    pub async fn run(&self, reporter: &mut Reporter) -> Result<ExportSummary, ExportError> {
        let config = self.config;
        ensure_output_dir(&config.output_dir)?;
        let root = AtomicFileWriter::new(config.output_dir.clone());

        let api = WpApi::new(&config.api_base(), self.fetcher)?;
        reporter.info(&format!("Using API at {}", api.base()));

        let lookups = Lookups {
            users: api.users(reporter).await?,
            categories: api.categories(reporter).await?,
            tags: api.tags(reporter).await?,
        };
        let comments = api.comments(reporter).await?;
        if config.save_meta {
            write_meta(&root, &lookups, &comments)?;
        }

        let posts = api.posts(config.post_limit(), reporter).await?;

        let mut summary = ExportSummary::default();
        for mut post in posts {
            if !self.filter.is_match(&post.link) {
                continue;
            }
            enrich_post(&mut post, &lookups)?;
            let post_comments = comments.get(&post.id).map(Vec::as_slice);
            let path = save_post(&post, post_comments, config, self.fetcher, reporter).await?;
            summary.posts_written.push(path);
        }
        reporter.end_status("Saved all posts");

        reporter.finish(&root)?;
        summary.missing_assets = reporter.errors().missing.len();
        summary.warnings = reporter.errors().warnings.len();
        Ok(summary)
    }
}

fn write_meta(
    root: &AtomicFileWriter,
    lookups: &Lookups,
    comments: &BTreeMap<u64, Vec<Comment>>,
) -> Result<(), PersistError> {
    root.write_json("users.json", &lookups.users)?;
    root.write_json("categories.json", &lookups.categories)?;
    root.write_json("tags.json", &lookups.tags)?;
    root.write_json("comments.json", comments)?;
    Ok(())
}
