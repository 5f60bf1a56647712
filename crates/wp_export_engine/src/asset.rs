//! Deciding which referenced URLs become local files, and fetching them.

use std::path::PathBuf;
use std::sync::LazyLock;

use regex::Regex;
use url::{Host, Url};

use crate::fetch::Fetcher;
use crate::persist::{AtomicFileWriter, PersistError};
use crate::report::Reporter;
use crate::FetchError;

static PLAUSIBLE_SUFFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\.(png|jpg|gif|pdf|jpeg|webp)$").expect("valid suffix regex")
});

/// A remote file and the name it gets next to the post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    pub url: Url,
    pub filename: String,
}

#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: FetchError,
    },
    #[error(transparent)]
    Persist(#[from] PersistError),
}

/// Resolve `reference` against the page it appears on.
pub fn resolve_reference(reference: &str, source: &Url) -> Result<Url, url::ParseError> {
    source.join(reference.trim())
}

/// Last path segment of `url`, percent-decoded and safe to use as a file name
/// inside the post directory. Trailing slashes are ignored.
pub fn filename_from_url(url: &Url) -> String {
    let path = url.path().trim_end_matches('/');
    let last = path.rsplit('/').next().unwrap_or_default();
    let bytes = urlencoding::decode_binary(last.as_bytes());
    let decoded = String::from_utf8_lossy(&bytes);

    // Encoded separators (`%2F`) must not reach the filesystem.
    let base = decoded
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default();
    let name: String = base
        .chars()
        .map(|c| if is_forbidden(c) { '_' } else { c })
        .collect();
    match name.as_str() {
        "" | "." | ".." => "index".to_string(),
        _ => name,
    }
}

fn is_forbidden(c: char) -> bool {
    matches!(c,
        '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\0'..='\u{1F}'
    )
}

fn is_web_url(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https")
}

fn same_host(a: &Url, b: &Url) -> bool {
    match (a.host_str(), b.host_str()) {
        (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
        _ => false,
    }
}

/// Effective TLD plus one label, e.g. `example.co.uk` for `cdn.example.co.uk`.
pub fn registrable_domain(host: &str) -> Option<String> {
    let lower = host.to_ascii_lowercase();
    psl::domain_str(&lower).map(str::to_string)
}

/// IP literals never share an organization, whatever `psl` makes of their last labels.
fn same_organization(a: &Url, b: &Url) -> bool {
    match (a.host(), b.host()) {
        (Some(Host::Domain(a)), Some(Host::Domain(b))) => {
            match (registrable_domain(a), registrable_domain(b)) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            }
        }
        _ => false,
    }
}

/// Pick the filename for a fetched asset given the server's content type.
///
/// The name is kept when it already ends in an extension registered for the
/// type; otherwise the type's preferred extension is appended.
pub fn filename_for_content_type(filename: &str, content_type: &str) -> String {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or(content_type)
        .trim()
        .to_ascii_lowercase();
    let Some(extensions) = mime_guess::get_mime_extensions_str(&essence) else {
        return filename.to_string();
    };
    if extensions.is_empty()
        || extensions
            .iter()
            .any(|ext| filename.ends_with(&format!(".{ext}")))
    {
        return filename.to_string();
    }
    let preferred = match essence.as_str() {
        "text/html" => "html",
        "image/jpeg" => "jpg",
        _ => extensions[0],
    };
    format!("{filename}.{preferred}")
}

/// Everything the rewriter needs to localize the references of one post.
pub struct AssetMirror<'a> {
    fetcher: &'a dyn Fetcher,
    source_url: Url,
    writer: AtomicFileWriter,
    uploads_prefix: String,
    mirror_images: bool,
}

impl<'a> AssetMirror<'a> {
    pub fn new(
        fetcher: &'a dyn Fetcher,
        source_url: Url,
        output_dir: PathBuf,
        uploads_prefix: &str,
        mirror_images: bool,
    ) -> Self {
        Self {
            fetcher,
            source_url,
            writer: AtomicFileWriter::new(output_dir),
            uploads_prefix: uploads_prefix.to_ascii_lowercase(),
            mirror_images,
        }
    }

    pub fn source_url(&self) -> &Url {
        &self.source_url
    }

    fn in_uploads(&self, url: &Url) -> bool {
        url.path().to_ascii_lowercase().starts_with(&self.uploads_prefix)
    }

    fn resolve(&self, reference: &str, reporter: &mut Reporter) -> Option<Url> {
        match resolve_reference(reference, &self.source_url) {
            Ok(url) => Some(url),
            Err(err) => {
                reporter.warn(format!("Failed to parse asset url '{reference}': {err}"));
                None
            }
        }
    }

    /// A link is localized only when it points into the uploads path on the
    /// post's own host or another host of the same registrable domain.
    pub fn classify_link(&self, reference: &str, reporter: &mut Reporter) -> Option<Url> {
        let url = self.resolve(reference, reporter)?;
        if !is_web_url(&url) || !self.in_uploads(&url) {
            return None;
        }
        if same_organization(&self.source_url, &url) || same_host(&self.source_url, &url) {
            Some(url)
        } else {
            None
        }
    }

    /// Images are localized from the post's own host, or from anywhere when mirroring.
    pub fn classify_image(&self, reference: &str, reporter: &mut Reporter) -> Option<Url> {
        let url = self.resolve(reference, reporter)?;
        if !is_web_url(&url) {
            return None;
        }
        if self.mirror_images || same_host(&self.source_url, &url) {
            Some(url)
        } else {
            None
        }
    }

    /// Look up the content type of `url` to settle its local filename.
    pub async fn asset(&self, url: Url) -> Result<Asset, AssetError> {
        let mut filename = filename_from_url(&url);
        match self.fetcher.head(url.as_str()).await {
            Ok(head) if head.is_success() => {
                if let Some(content_type) = head.content_type.as_deref() {
                    filename = filename_for_content_type(&filename, content_type);
                }
            }
            Ok(_) => {}
            Err(err) if err.is_fatal() => {
                return Err(AssetError::Fetch {
                    url: url.to_string(),
                    source: err,
                })
            }
            Err(_) => {}
        }
        Ok(Asset { url, filename })
    }

    /// Localize a classified reference and return the new attribute value.
    ///
    /// Page links (outside the uploads path, when not mirroring) become
    /// host-relative paths. Files are fetched next to the post; if that fails
    /// the absolute remote URL is kept.
    pub async fn localize(&self, url: Url, reporter: &mut Reporter) -> Result<String, AssetError> {
        if !self.mirror_images && !self.in_uploads(&url) {
            return Ok(url.path().to_string());
        }

        let asset = self.asset(url).await?;
        if !PLAUSIBLE_SUFFIX_RE.is_match(&asset.filename) {
            reporter.warn(format!("Suspicious filename: {}", asset.filename));
        }

        let output = match self.fetcher.fetch(asset.url.as_str()).await {
            Ok(output) => output,
            Err(err) if err.is_fatal() => {
                return Err(AssetError::Fetch {
                    url: asset.url.to_string(),
                    source: err,
                })
            }
            Err(err) => {
                reporter.warn(format!("Failed to get linked file {}: {}", asset.url, err));
                return Ok(asset.url.to_string());
            }
        };

        if output.status != 200 {
            reporter.missing(asset.url.as_str(), output.status_line);
            return Ok(asset.url.to_string());
        }

        self.writer.write(&asset.filename, &output.body)?;
        Ok(asset.filename)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filename_is_last_decoded_segment() {
        let url = Url::parse("https://example.com/wp-content/uploads/2020/01/my%20doc.pdf").unwrap();
        assert_eq!(filename_from_url(&url), "my doc.pdf");
        let dir = Url::parse("https://example.com/about/team/").unwrap();
        assert_eq!(filename_from_url(&dir), "team");
        let root = Url::parse("https://example.com/").unwrap();
        assert_eq!(filename_from_url(&root), "index");
    }

    #[test]
    fn encoded_separators_cannot_leave_the_post_directory() {
        let cases = [
            ("https://example.com/wp-content/uploads/..%2F..%2Fescaped.png", "escaped.png"),
            ("https://example.com/wp-content/uploads/%2E%2E%2F", "index"),
            ("https://example.com/wp-content/uploads/photo.png%2F", "photo.png"),
            ("https://example.com/wp-content/uploads/a%5Cb.png", "a_b.png"),
            ("https://example.com/wp-content/uploads/nul%00.png", "nul_.png"),
        ];
        for (raw, expected) in cases {
            let url = Url::parse(raw).unwrap();
            assert_eq!(filename_from_url(&url), expected, "{raw}");
        }
    }

    #[test]
    fn ip_hosts_are_not_grouped_by_suffix() {
        let a = Url::parse("http://10.0.0.1/post/").unwrap();
        let b = Url::parse("http://127.0.0.1/wp-content/uploads/x.pdf").unwrap();
        assert!(!same_organization(&a, &b));
        let c = Url::parse("https://www.example.com/").unwrap();
        let d = Url::parse("https://files.example.com/").unwrap();
        assert!(same_organization(&c, &d));
    }

    #[test]
    fn matching_extension_is_kept() {
        assert_eq!(filename_for_content_type("photo.png", "image/png"), "photo.png");
        assert_eq!(filename_for_content_type("photo.jpeg", "image/jpeg"), "photo.jpeg");
        assert_eq!(
            filename_for_content_type("doc.pdf", "application/pdf; charset=binary"),
            "doc.pdf"
        );
    }

    #[test]
    fn preferred_extension_is_appended() {
        assert_eq!(filename_for_content_type("photo", "image/jpeg"), "photo.jpg");
        assert_eq!(filename_for_content_type("page", "text/html; charset=UTF-8"), "page.html");
        assert_eq!(filename_for_content_type("image", "image/png"), "image.png");
    }

    #[test]
    fn unknown_content_type_leaves_name_alone() {
        assert_eq!(
            filename_for_content_type("blob.bin", "application/x-made-up"),
            "blob.bin"
        );
    }

    #[test]
    fn registrable_domain_groups_subdomains() {
        assert_eq!(
            registrable_domain("cdn.Example.co.uk").as_deref(),
            Some("example.co.uk")
        );
        assert_eq!(
            registrable_domain("www.example.com"),
            registrable_domain("i0.example.com")
        );
        assert_ne!(
            registrable_domain("example.com"),
            registrable_domain("example.org")
        );
    }

    #[test]
    fn plausible_suffixes() {
        for name in ["a.png", "a.jpg", "a.gif", "a.pdf", "a.jpeg", "a.webp"] {
            assert!(PLAUSIBLE_SUFFIX_RE.is_match(name), "{name}");
        }
        for name in ["a.html", "a.PNG", "a", "a.png.txt"] {
            assert!(!PLAUSIBLE_SUFFIX_RE.is_match(name), "{name}");
        }
    }
}
