use std::collections::BTreeMap;

use thiserror::Error;

use crate::model::{Category, Post, Tag, User};

/// ID lookups for the collections a post refers to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Lookups {
    pub users: BTreeMap<u64, User>,
    pub categories: BTreeMap<u64, Category>,
    pub tags: BTreeMap<u64, Tag>,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EnrichError {
    #[error("No such author as {id} in post {link}")]
    MissingAuthor { id: u64, link: String },
    #[error("No such category as {id} in post {link}")]
    MissingCategory { id: u64, link: String },
    #[error("No such tag as {id} in post {link}")]
    MissingTag { id: u64, link: String },
}

/// Resolve author, category and tag names in place.
///
/// Every referenced ID must resolve; names keep the order of the post's ID lists.
pub fn enrich_post(post: &mut Post, lookups: &Lookups) -> Result<(), EnrichError> {
    let author = lookups
        .users
        .get(&post.author)
        .ok_or_else(|| EnrichError::MissingAuthor {
            id: post.author,
            link: post.link.clone(),
        })?;

    let category_names = post
        .categories
        .iter()
        .map(|id| {
            lookups
                .categories
                .get(id)
                .map(|category| category.name.clone())
                .ok_or_else(|| EnrichError::MissingCategory {
                    id: *id,
                    link: post.link.clone(),
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let tag_names = post
        .tags
        .iter()
        .map(|id| {
            lookups
                .tags
                .get(id)
                .map(|tag| tag.name.clone())
                .ok_or_else(|| EnrichError::MissingTag {
                    id: *id,
                    link: post.link.clone(),
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    post.author_name = author.name.clone();
    post.category_names = category_names;
    post.tag_names = tag_names;
    Ok(())
}
