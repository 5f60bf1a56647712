use std::path::PathBuf;

use clap::Parser;
use log::LevelFilter;
use wp_export_core::{
    CacheMode, ExportConfig, Verbosity, DEFAULT_CACHE_MAX_AGE, DEFAULT_OUTPUT_DIR,
    DEFAULT_POST_FILENAME, DEFAULT_UPLOADS_PREFIX, DEFAULT_USER_AGENT,
};

/// Export the posts of a WordPress site as markdown files with their attachments.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "wordpress-export", version, about)]
pub struct Cli {
    /// Your blog URL, used to discover the API
    pub url: Option<String>,

    /// Base URL of the REST API, e.g. https://example.com/wp-json/
    #[arg(long)]
    pub api: Option<String>,

    /// Directory to write posts to
    #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR)]
    pub output: PathBuf,

    /// Prefix to strip from post paths
    #[arg(long, default_value = "")]
    pub prefix: String,

    /// Write a log to this file
    #[arg(long)]
    pub log: Option<PathBuf>,

    /// Path prefix of linked files to copy next to each post
    #[arg(long, default_value = DEFAULT_UPLOADS_PREFIX)]
    pub assets: String,

    /// Don't show progress
    #[arg(short, long)]
    pub quiet: bool,

    /// Don't show progress or warnings
    #[arg(long)]
    pub silent: bool,

    /// Only fetch this many posts (0 for all)
    #[arg(long, default_value_t = 0)]
    pub sample: usize,

    /// Only export posts whose URL matches this regex
    #[arg(long, default_value = "")]
    pub filter: String,

    /// Name of the file each post is written to
    #[arg(long, default_value = DEFAULT_POST_FILENAME)]
    pub postfile: String,

    /// File with extra frontmatter to add to every post
    #[arg(long)]
    pub frontmatter: Option<PathBuf>,

    /// Cache HTTP responses in this directory
    #[arg(long)]
    pub cache: Option<PathBuf>,

    /// Never expire cached responses
    #[arg(long)]
    pub stale: bool,

    /// Copy images from other hosts too
    #[arg(long)]
    pub mirror: bool,

    /// User agent to send with every request
    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Also save users, categories, tags and comments as JSON
    #[arg(long)]
    pub meta: bool,
}

impl Cli {
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.quiet, self.silent)
    }

    /// Terminal log level; the log file always records at info.
    pub fn terminal_level(&self) -> LevelFilter {
        match self.verbosity() {
            Verbosity::Normal => LevelFilter::Info,
            Verbosity::Quiet => LevelFilter::Warn,
            Verbosity::Silent => LevelFilter::Error,
        }
    }

    pub fn into_config(self, api_url: String, extra_frontmatter: String) -> ExportConfig {
        let verbosity = self.verbosity();
        let cache_mode = if self.stale {
            CacheMode::Stale
        } else {
            CacheMode::Revalidate {
                max_age: DEFAULT_CACHE_MAX_AGE,
            }
        };
        ExportConfig {
            api_url,
            output_dir: self.output,
            uploads_prefix: self.assets,
            post_filename: self.postfile,
            path_prefix: self.prefix,
            extra_frontmatter,
            sample: self.sample,
            post_filter: self.filter,
            save_meta: self.meta,
            mirror_images: self.mirror,
            cache_dir: self.cache,
            cache_mode,
            user_agent: self.user_agent,
            verbosity,
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::error::ErrorKind;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn defaults_match_export_config() {
        let cli = Cli::try_parse_from(["wordpress-export", "example.com"]).unwrap();
        assert_eq!(cli.url.as_deref(), Some("example.com"));
        let config = cli.into_config("https://example.com/wp-json/".into(), String::new());
        assert_eq!(
            config,
            ExportConfig {
                api_url: "https://example.com/wp-json/".into(),
                ..ExportConfig::default()
            }
        );
    }

    #[test]
    fn flags_map_onto_config() {
        let cli = Cli::try_parse_from([
            "wordpress-export",
            "--api",
            "https://example.com/wp-json",
            "-o",
            "site",
            "--prefix",
            "/blog",
            "--assets",
            "/files/",
            "--sample",
            "5",
            "--filter",
            "2020",
            "--postfile",
            "_index.md",
            "--cache",
            ".cache",
            "--stale",
            "--mirror",
            "--meta",
            "--silent",
        ])
        .unwrap();
        assert_eq!(cli.verbosity(), Verbosity::Silent);
        assert_eq!(cli.terminal_level(), LevelFilter::Error);

        let api = cli.api.clone().unwrap();
        let config = cli.into_config(api, "draft: true\n".into());
        assert_eq!(config.output_dir, PathBuf::from("site"));
        assert_eq!(config.path_prefix, "/blog");
        assert_eq!(config.uploads_prefix, "/files/");
        assert_eq!(config.sample, 5);
        assert_eq!(config.post_filter, "2020");
        assert_eq!(config.post_filename, "_index.md");
        assert_eq!(config.cache_dir, Some(PathBuf::from(".cache")));
        assert_eq!(config.cache_mode, CacheMode::Stale);
        assert!(config.mirror_images);
        assert!(config.save_meta);
        assert_eq!(config.extra_frontmatter, "draft: true\n");
    }

    #[test]
    fn quiet_keeps_warnings() {
        let cli = Cli::try_parse_from(["wordpress-export", "-q", "example.com"]).unwrap();
        assert_eq!(cli.verbosity(), Verbosity::Quiet);
        assert_eq!(cli.terminal_level(), LevelFilter::Warn);
    }

    #[test]
    fn only_one_site_is_accepted() {
        let err = Cli::try_parse_from(["wordpress-export", "a.com", "b.com"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownArgument);
    }
}
