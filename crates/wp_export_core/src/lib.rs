//! Exporter core: pure domain records, mapping and enrichment.
mod config;
mod decode;
mod enrich;
mod model;
mod permalink;
mod report;

pub use config::{
    normalize_extra_frontmatter, CacheMode, ExportConfig, Verbosity, DEFAULT_CACHE_MAX_AGE,
    DEFAULT_OUTPUT_DIR, DEFAULT_POST_FILENAME, DEFAULT_UPLOADS_PREFIX, DEFAULT_USER_AGENT,
};
pub use decode::{
    ensure_unique_ids, group_comments, index_by_id, map_records, MapError, Record, RecordKind,
};
pub use enrich::{enrich_post, EnrichError, Lookups};
pub use model::{Category, Comment, Post, Rendered, Tag, User};
pub use permalink::{post_directory, PermalinkError};
pub use report::{ErrorReport, Missing, Warning};
