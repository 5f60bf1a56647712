use serde_json::Value;
use thiserror::Error;
use url::Url;

use crate::fetch::Fetcher;
use crate::report::{ProgressEvent, ProgressSink};
use crate::FetchError;

pub const PAGE_SIZE: usize = 100;

#[derive(Debug, Error)]
pub enum PaginateError {
    #[error("failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: FetchError,
    },
    #[error("failed to fetch {url}: {status}")]
    Status { url: String, status: String },
    #[error("failed to parse response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Fetch every page of a REST collection, in server order.
///
/// Stops after the first page shorter than the page size, or once at least
/// `limit` records have been collected. The last page is never truncated, so
/// the result may exceed `limit` by less than one page.
pub async fn fetch_collection(
    fetcher: &dyn Fetcher,
    endpoint: &Url,
    collection: &str,
    limit: usize,
    sink: &mut dyn ProgressSink,
) -> Result<Vec<Value>, PaginateError> {
    let page_size = PAGE_SIZE.min(limit.max(1));
    let mut records = Vec::new();
    let mut page = 1usize;

    loop {
        let url = page_url(endpoint, page, page_size);
        sink.emit(ProgressEvent::FetchingPage {
            collection: collection.to_string(),
            offset: (page - 1) * page_size,
        });

        let output = fetcher
            .fetch(url.as_str())
            .await
            .map_err(|source| PaginateError::Fetch {
                url: url.to_string(),
                source,
            })?;
        if !output.is_success() {
            return Err(PaginateError::Status {
                url: url.to_string(),
                status: output.status_line,
            });
        }

        let this_page: Vec<Value> =
            serde_json::from_slice(&output.body).map_err(|source| PaginateError::Decode {
                url: url.to_string(),
                source,
            })?;
        let page_len = this_page.len();
        records.extend(this_page);

        if page_len < page_size || records.len() >= limit {
            sink.emit(ProgressEvent::CollectionFetched {
                collection: collection.to_string(),
                count: records.len(),
            });
            return Ok(records);
        }
        page += 1;
    }
}

fn page_url(endpoint: &Url, page: usize, page_size: usize) -> Url {
    let mut url = endpoint.clone();
    url.query_pairs_mut()
        .append_pair("per_page", &page_size.to_string())
        .append_pair("page", &page.to_string());
    url
}
