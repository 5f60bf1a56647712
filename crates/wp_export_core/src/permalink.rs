use std::borrow::Cow;

use thiserror::Error;
use url::Url;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("failed to parse url of post '{link}': {message}")]
pub struct PermalinkError {
    pub link: String,
    pub message: String,
}

/// Directory segments for a post, mirroring the site's permalink structure.
///
/// A prefix that matches the start of the link textually is stripped from the
/// whole link; otherwise it is stripped from the start of the link's path.
/// Empty, `.` and `..` segments are dropped.
pub fn post_directory(link: &str, prefix: &str) -> Result<Vec<String>, PermalinkError> {
    let dir: Cow<'_, str> = match link.strip_prefix(prefix).filter(|_| !prefix.is_empty()) {
        Some(rest) => Cow::Borrowed(rest),
        None => {
            let url = Url::parse(link).map_err(|err| PermalinkError {
                link: link.to_string(),
                message: err.to_string(),
            })?;
            let path = url.path();
            let path = path.strip_prefix(prefix).unwrap_or(path);
            let decoded = urlencoding::decode_binary(path.as_bytes());
            Cow::Owned(String::from_utf8_lossy(&decoded).into_owned())
        }
    };

    Ok(dir
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != "." && *segment != "..")
        .map(str::to_string)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::post_directory;

    #[test]
    fn uses_url_path_segments() {
        let segments = post_directory("https://blog.example.com/2020/01/hello-world/", "").unwrap();
        assert_eq!(segments, vec!["2020", "01", "hello-world"]);
    }

    #[test]
    fn strips_textual_prefix_of_link() {
        let segments =
            post_directory("https://blog.example.com/blog/2020/post/", "https://blog.example.com/blog")
                .unwrap();
        assert_eq!(segments, vec!["2020", "post"]);
    }

    #[test]
    fn strips_path_prefix() {
        let segments = post_directory("https://blog.example.com/news/a-post/", "/news").unwrap();
        assert_eq!(segments, vec!["a-post"]);
    }

    #[test]
    fn decodes_percent_escapes() {
        let segments = post_directory("https://example.com/caf%C3%A9/", "").unwrap();
        assert_eq!(segments, vec!["café"]);
    }

    #[test]
    fn query_only_links_map_to_root() {
        let segments = post_directory("https://example.com/?p=12", "").unwrap();
        assert!(segments.is_empty());
    }

    #[test]
    fn unparseable_link_is_an_error() {
        let err = post_directory("not a url", "").unwrap_err();
        assert_eq!(err.link, "not a url");
    }
}
