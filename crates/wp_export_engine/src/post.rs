use std::path::PathBuf;

use chrono::NaiveDateTime;
use url::Url;
use wp_export_core::{post_directory, Comment, ExportConfig, Post};

use crate::asset::AssetMirror;
use crate::export::ExportError;
use crate::fetch::Fetcher;
use crate::frontmatter::{build_post_document, PostFrontmatter};
use crate::persist::{ensure_output_dir, AtomicFileWriter};
use crate::report::{ProgressEvent, ProgressSink, Reporter};
use crate::rewrite::rewrite_content;

pub const COMMENTS_FILENAME: &str = "comments.json";
const DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Output directory of `post`: the configured root plus its permalink path.
pub fn post_output_dir(config: &ExportConfig, post: &Post) -> Result<PathBuf, ExportError> {
    let segments = post_directory(&post.link, &config.path_prefix)?;
    let mut dir = config.output_dir.clone();
    dir.extend(segments);
    Ok(dir)
}

/// Write one enriched post, its localized assets and its comments.
/// Returns the path of the written post file.
pub async fn save_post(
    post: &Post,
    comments: Option<&[Comment]>,
    config: &ExportConfig,
    fetcher: &dyn Fetcher,
    reporter: &mut Reporter,
) -> Result<PathBuf, ExportError> {
    reporter.set_current_page(post.link.as_str());
    let source_url = Url::parse(&post.link).map_err(|err| ExportError::InvalidPostUrl {
        link: post.link.clone(),
        message: err.to_string(),
    })?;
    reporter.emit(ProgressEvent::Processing {
        path: source_url.path().to_string(),
    });

    if let Err(err) = NaiveDateTime::parse_from_str(&post.date_gmt, DATE_FORMAT) {
        reporter.warn(format!(
            "Failed to parse date for {} '{}': {}",
            post.link, post.date_gmt, err
        ));
    }

    let output_dir = post_output_dir(config, post)?;
    ensure_output_dir(&output_dir)?;

    let mirror = AssetMirror::new(
        fetcher,
        source_url,
        output_dir.clone(),
        &config.uploads_prefix,
        config.mirror_images,
    );
    let body = rewrite_content(&post.content.rendered, &mirror, reporter).await?;

    let frontmatter = PostFrontmatter::from_post(post);
    let document = build_post_document(&frontmatter, &config.extra_frontmatter, &body).map_err(
        |source| ExportError::Frontmatter {
            link: post.link.clone(),
            source,
        },
    )?;

    let writer = AtomicFileWriter::new(output_dir);
    let path = writer.write(&config.post_filename, document.as_bytes())?;

    if let Some(comments) = comments.filter(|c| !c.is_empty()) {
        writer.write_json(COMMENTS_FILENAME, comments)?;
    }
    Ok(path)
}
