//! WordPress REST API (`wp/v2`) collections and API discovery.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;
use url::Url;
use wp_export_core::{
    ensure_unique_ids, group_comments, index_by_id, map_records, Category, Comment, MapError,
    Post, Record, Tag, User,
};

use crate::fetch::{Fetcher, ReqwestFetcher};
use crate::paginate::{fetch_collection, PaginateError};
use crate::report::ProgressSink;
use crate::FetchError;

const USER_FIELDS: &str = "id,name,slug";
const CATEGORY_FIELDS: &str = "id,name,slug";
const TAG_FIELDS: &str = "id,name,slug,description,taxonomy";
const COMMENT_FIELDS: &str = "id,author,author_email,author_ip,author_name,author_url,author_user_agent,content,date,date_gmt,link,parent,post,type,author_avatar_urls,meta";
const POST_FIELDS: &str = "id,date_gmt,slug,status,title,content,excerpt,author,categories,tags,link";

static API_LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\s*<([^>]+)>\s*;\s*rel="https://api\.w\.org/""#).expect("valid api link regex")
});

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid api url '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error(transparent)]
    Paginate(#[from] PaginateError),
    #[error(transparent)]
    Map(#[from] MapError),
    #[error("Couldn't fetch {url} while looking for site API: {source}")]
    DiscoveryFetch {
        url: String,
        #[source]
        source: FetchError,
    },
    #[error("Got {status} response while fetching {url}")]
    DiscoveryStatus { url: String, status: String },
    #[error("No Link: headers in response from {url}")]
    NoLinkHeaders { url: String },
    #[error("Unable to discover API for {url} - maybe use the --api flag?")]
    NotDiscovered { url: String },
    #[error("'{input}' doesn't look like a url: {message}")]
    InvalidSiteUrl { input: String, message: String },
}

/// Typed access to the public collections of one site.
pub struct WpApi<'a> {
    base: Url,
    fetcher: &'a dyn Fetcher,
}

impl<'a> WpApi<'a> {
    /// `api_base` is the API root, e.g. `https://example.com/wp-json/`.
    pub fn new(api_base: &str, fetcher: &'a dyn Fetcher) -> Result<Self, ApiError> {
        let normalized = if api_base.ends_with('/') {
            api_base.to_string()
        } else {
            format!("{api_base}/")
        };
        let base = Url::parse(&normalized).map_err(|source| ApiError::InvalidUrl {
            url: normalized.clone(),
            source,
        })?;
        Ok(Self { base, fetcher })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    pub fn endpoint(&self, collection: &str, fields: &str) -> Result<Url, ApiError> {
        let relative = format!("wp/v2/{collection}?context=view&_fields={fields}");
        self.base
            .join(&relative)
            .map_err(|source| ApiError::InvalidUrl {
                url: format!("{}{relative}", self.base),
                source,
            })
    }

    async fn collection<T: Record>(
        &self,
        collection: &str,
        fields: &str,
        limit: usize,
        sink: &mut dyn ProgressSink,
    ) -> Result<Vec<T>, ApiError> {
        let endpoint = self.endpoint(collection, fields)?;
        let raw = fetch_collection(self.fetcher, &endpoint, collection, limit, sink).await?;
        Ok(map_records(raw)?)
    }

    pub async fn users(
        &self,
        sink: &mut dyn ProgressSink,
    ) -> Result<BTreeMap<u64, User>, ApiError> {
        let users = self.collection("users", USER_FIELDS, usize::MAX, sink).await?;
        Ok(index_by_id(users)?)
    }

    pub async fn categories(
        &self,
        sink: &mut dyn ProgressSink,
    ) -> Result<BTreeMap<u64, Category>, ApiError> {
        let categories = self
            .collection("categories", CATEGORY_FIELDS, usize::MAX, sink)
            .await?;
        Ok(index_by_id(categories)?)
    }

    pub async fn tags(&self, sink: &mut dyn ProgressSink) -> Result<BTreeMap<u64, Tag>, ApiError> {
        let tags = self.collection("tags", TAG_FIELDS, usize::MAX, sink).await?;
        Ok(index_by_id(tags)?)
    }

    /// Comments grouped by the post they belong to.
    pub async fn comments(
        &self,
        sink: &mut dyn ProgressSink,
    ) -> Result<BTreeMap<u64, Vec<Comment>>, ApiError> {
        let comments: Vec<Comment> = self
            .collection("comments", COMMENT_FIELDS, usize::MAX, sink)
            .await?;
        Ok(group_comments(comments))
    }

    /// Posts in server order, capped at roughly `limit`.
    pub async fn posts(
        &self,
        limit: usize,
        sink: &mut dyn ProgressSink,
    ) -> Result<Vec<Post>, ApiError> {
        let posts: Vec<Post> = self.collection("posts", POST_FIELDS, limit, sink).await?;
        ensure_unique_ids(&posts)?;
        Ok(posts)
    }
}

/// Parse a user-supplied site address, assuming `http://` when no scheme is given.
pub fn parse_site_url(input: &str) -> Result<Url, ApiError> {
    let invalid = |message: String| ApiError::InvalidSiteUrl {
        input: input.to_string(),
        message,
    };
    match Url::parse(input) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(url),
        Ok(_) | Err(url::ParseError::RelativeUrlWithoutBase) => {
            let url = Url::parse(&format!("http://{input}")).map_err(|err| invalid(err.to_string()))?;
            if url.host_str().is_some() {
                Ok(url)
            } else {
                Err(invalid(format!("invalid URL: '{input}'")))
            }
        }
        Err(err) => Err(invalid(err.to_string())),
    }
}

/// Find the API root advertised in `Link: <...>; rel="https://api.w.org/"` headers.
pub fn find_api_link<'a, I>(links: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    links.into_iter().find_map(|link| {
        API_LINK_RE
            .captures(link)
            .and_then(|captures| captures.get(1))
            .map(|m| m.as_str().to_string())
    })
}

/// Discover the API root of a site with a HEAD request.
pub async fn discover_api(fetcher: &ReqwestFetcher, site: &Url) -> Result<String, ApiError> {
    let head = fetcher
        .head_links(site.as_str())
        .await
        .map_err(|source| ApiError::DiscoveryFetch {
            url: site.to_string(),
            source,
        })?;
    if head.status != 200 {
        return Err(ApiError::DiscoveryStatus {
            url: site.to_string(),
            status: head.status_line,
        });
    }
    if head.links.is_empty() {
        return Err(ApiError::NoLinkHeaders {
            url: site.to_string(),
        });
    }
    find_api_link(head.links.iter().map(String::as_str)).ok_or_else(|| ApiError::NotDiscovered {
        url: site.to_string(),
    })
}
