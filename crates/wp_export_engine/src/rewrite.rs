//! Rewrites `<a href>`, `<img src>` and `<img srcset>` in a post's rendered
//! content so that localized files are referenced by their local names.

use ego_tree::NodeId;
use scraper::node::Node;
use scraper::{ElementRef, Html};
use thiserror::Error;

use crate::asset::{AssetError, AssetMirror};
use crate::report::Reporter;

#[derive(Debug, Error)]
pub enum RewriteError {
    #[error("Failed to find body in {page}")]
    MissingBody { page: String },
    #[error(transparent)]
    Asset(#[from] AssetError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    Anchor,
    Image,
}

/// Rewrite `html` and return the serialized children of its `body`.
pub async fn rewrite_content(
    html: &str,
    mirror: &AssetMirror<'_>,
    reporter: &mut Reporter,
) -> Result<String, RewriteError> {
    let mut document = Html::parse_document(html);

    // Pre-order, so attributes are handled in document order. Rewriting never
    // changes the tree's shape, which keeps the collected ids valid.
    let targets: Vec<(NodeId, Target)> = document
        .tree
        .root()
        .descendants()
        .filter_map(|node| match node.value() {
            Node::Element(element) => match element.name() {
                "a" => Some((node.id(), Target::Anchor)),
                "img" => Some((node.id(), Target::Image)),
                _ => None,
            },
            _ => None,
        })
        .collect();

    for (id, target) in targets {
        match target {
            Target::Anchor => {
                if let Some(href) = attribute(&document, id, "href") {
                    if let Some(url) = mirror.classify_link(&href, reporter) {
                        let value = mirror.localize(url, reporter).await?;
                        set_attribute(&mut document, id, "href", &value);
                    }
                }
            }
            Target::Image => {
                if let Some(src) = attribute(&document, id, "src") {
                    if let Some(url) = mirror.classify_image(&src, reporter) {
                        let value = mirror.localize(url, reporter).await?;
                        set_attribute(&mut document, id, "src", &value);
                    }
                }
                if let Some(srcset) = attribute(&document, id, "srcset") {
                    if let Some(value) = rewrite_srcset(&srcset, mirror, reporter).await? {
                        set_attribute(&mut document, id, "srcset", &value);
                    }
                }
            }
        }
    }

    let body = document
        .tree
        .root()
        .descendants()
        .find(|node| matches!(node.value(), Node::Element(e) if e.name() == "body"))
        .and_then(ElementRef::wrap)
        .ok_or_else(|| RewriteError::MissingBody {
            page: mirror.source_url().to_string(),
        })?;
    Ok(body.inner_html())
}

/// Rewrite each well-formed `URL descriptor` candidate; anything else is kept.
/// `None` when no candidate qualified, so the attribute is left byte-for-byte.
async fn rewrite_srcset(
    srcset: &str,
    mirror: &AssetMirror<'_>,
    reporter: &mut Reporter,
) -> Result<Option<String>, RewriteError> {
    let mut parts = Vec::new();
    let mut localized = false;
    for part in srcset.split(',') {
        let fields: Vec<&str> = part.split_whitespace().collect();
        if fields.len() != 2 {
            parts.push(part.trim().to_string());
            continue;
        }
        let url = match mirror.classify_image(fields[0], reporter) {
            Some(url) => {
                localized = true;
                mirror.localize(url, reporter).await?
            }
            None => fields[0].to_string(),
        };
        parts.push(format!("{url} {}", fields[1]));
    }
    Ok(localized.then(|| parts.join(", ")))
}

fn attribute(document: &Html, id: NodeId, name: &str) -> Option<String> {
    match document.tree.get(id)?.value() {
        Node::Element(element) => element.attr(name).map(str::to_string),
        _ => None,
    }
}

fn set_attribute(document: &mut Html, id: NodeId, name: &str, value: &str) {
    let Some(mut node) = document.tree.get_mut(id) else {
        return;
    };
    if let Node::Element(element) = node.value() {
        for (attr_name, attr_value) in element.attrs.iter_mut() {
            if &*attr_name.local == name {
                *attr_value = value.into();
            }
        }
    }
}
