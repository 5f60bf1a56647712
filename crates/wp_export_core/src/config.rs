use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_OUTPUT_DIR: &str = "./output";
pub const DEFAULT_UPLOADS_PREFIX: &str = "/wp-content/uploads/";
pub const DEFAULT_POST_FILENAME: &str = "index.md";
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:60.0) Gecko/20100101 Firefox/81.0";
/// Age after which a cached response is refetched unless the cache is marked stale.
pub const DEFAULT_CACHE_MAX_AGE: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// How much goes to the terminal. The log file is unaffected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    #[default]
    Normal,
    /// No progress lines.
    Quiet,
    /// No progress lines and no warnings.
    Silent,
}

impl Verbosity {
    pub fn from_flags(quiet: bool, silent: bool) -> Self {
        if silent {
            Verbosity::Silent
        } else if quiet {
            Verbosity::Quiet
        } else {
            Verbosity::Normal
        }
    }

    pub fn shows_progress(self) -> bool {
        self == Verbosity::Normal
    }

    pub fn shows_warnings(self) -> bool {
        self != Verbosity::Silent
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheMode {
    /// Entries older than `max_age` are refetched and overwritten.
    Revalidate { max_age: Duration },
    /// Entries never expire.
    Stale,
}

impl Default for CacheMode {
    fn default() -> Self {
        CacheMode::Revalidate {
            max_age: DEFAULT_CACHE_MAX_AGE,
        }
    }
}

/// Everything one export run needs to know.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportConfig {
    /// Base URL of the REST API, e.g. `https://example.com/wp-json/`.
    pub api_url: String,
    pub output_dir: PathBuf,
    /// Path prefix under which linked files are copied next to the post.
    pub uploads_prefix: String,
    pub post_filename: String,
    /// Stripped from post paths before they become directories.
    pub path_prefix: String,
    /// Extra frontmatter appended verbatim before the closing delimiter.
    pub extra_frontmatter: String,
    /// Maximum number of posts to fetch; 0 fetches everything.
    pub sample: usize,
    /// Regex a post's link must match to be exported. Empty matches all.
    pub post_filter: String,
    pub save_meta: bool,
    pub mirror_images: bool,
    pub cache_dir: Option<PathBuf>,
    pub cache_mode: CacheMode,
    pub user_agent: String,
    pub verbosity: Verbosity,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            api_url: String::new(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            uploads_prefix: DEFAULT_UPLOADS_PREFIX.to_string(),
            post_filename: DEFAULT_POST_FILENAME.to_string(),
            path_prefix: String::new(),
            extra_frontmatter: String::new(),
            sample: 0,
            post_filter: String::new(),
            save_meta: false,
            mirror_images: false,
            cache_dir: None,
            cache_mode: CacheMode::default(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            verbosity: Verbosity::Normal,
        }
    }
}

impl ExportConfig {
    /// The API base with a guaranteed trailing slash, ready for `Url::join`.
    pub fn api_base(&self) -> String {
        if self.api_url.ends_with('/') {
            self.api_url.clone()
        } else {
            format!("{}/", self.api_url)
        }
    }

    /// Upper bound on the number of posts to fetch.
    pub fn post_limit(&self) -> usize {
        if self.sample > 0 {
            self.sample
        } else {
            usize::MAX
        }
    }
}

/// Turn the contents of a frontmatter file into the block inserted verbatim.
pub fn normalize_extra_frontmatter(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("{trimmed}\n")
    }
}
