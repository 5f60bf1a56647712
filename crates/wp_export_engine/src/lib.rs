//! Exporter engine: HTTP fetch and cache, pagination, HTML rewriting and output.
mod api;
mod asset;
mod cache;
mod export;
mod fetch;
mod frontmatter;
mod paginate;
mod persist;
mod post;
mod report;
mod rewrite;
mod types;

pub use api::{discover_api, find_api_link, parse_site_url, ApiError, WpApi};
pub use asset::{
    filename_for_content_type, filename_from_url, registrable_domain, resolve_reference, Asset,
    AssetError, AssetMirror,
};
pub use cache::{CacheError, CachedResponse, CachingFetcher, ResponseCache};
pub use export::{ExportError, ExportSummary, Exporter};
pub use fetch::{FetchSettings, Fetcher, HeadOutput, ReqwestFetcher};
pub use frontmatter::{build_post_document, PostFrontmatter, POST_TEMPLATE};
pub use paginate::{fetch_collection, PaginateError, PAGE_SIZE};
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError};
pub use post::{post_output_dir, save_post, COMMENTS_FILENAME};
pub use report::{ProgressEvent, ProgressSink, Reporter, ERRORS_FILENAME};
pub use rewrite::{rewrite_content, RewriteError};
pub use types::{FailureKind, FetchError, FetchOutput};
