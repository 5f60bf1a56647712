//! Second phase of the two-phase API decode: schema-agnostic JSON values are
//! projected onto typed records, then checked for duplicate identities.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use crate::model::{Category, Comment, Post, Tag, User};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Post,
    Tag,
    Category,
    User,
    Comment,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::Post => write!(f, "post"),
            RecordKind::Tag => write!(f, "tag"),
            RecordKind::Category => write!(f, "category"),
            RecordKind::User => write!(f, "user"),
            RecordKind::Comment => write!(f, "comment"),
        }
    }
}

/// A record fetched from one of the REST collections.
pub trait Record: DeserializeOwned {
    const KIND: RecordKind;

    fn id(&self) -> u64;
}

impl Record for Post {
    const KIND: RecordKind = RecordKind::Post;

    fn id(&self) -> u64 {
        self.id
    }
}

impl Record for Tag {
    const KIND: RecordKind = RecordKind::Tag;

    fn id(&self) -> u64 {
        self.id
    }
}

impl Record for Category {
    const KIND: RecordKind = RecordKind::Category;

    fn id(&self) -> u64 {
        self.id
    }
}

impl Record for User {
    const KIND: RecordKind = RecordKind::User;

    fn id(&self) -> u64 {
        self.id
    }
}

impl Record for Comment {
    const KIND: RecordKind = RecordKind::Comment;

    fn id(&self) -> u64 {
        self.id
    }
}

#[derive(Debug, Error)]
pub enum MapError {
    #[error("failed to parse {kind} record #{index}: {source}")]
    Shape {
        kind: RecordKind,
        index: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("duplicate {kind}: {id}")]
    Duplicate { kind: RecordKind, id: u64 },
}

/// Project raw values onto `T`. Missing fields default and unknown fields are
/// ignored; a field of the wrong shape fails the whole collection.
pub fn map_records<T: Record>(raw: Vec<Value>) -> Result<Vec<T>, MapError> {
    raw.into_iter()
        .enumerate()
        .map(|(index, value)| {
            serde_json::from_value(value).map_err(|source| MapError::Shape {
                kind: T::KIND,
                index,
                source,
            })
        })
        .collect()
}

/// Build the ID lookup used by enrichment. Any repeated ID is an error.
pub fn index_by_id<T: Record>(records: Vec<T>) -> Result<BTreeMap<u64, T>, MapError> {
    let mut index = BTreeMap::new();
    for record in records {
        let id = record.id();
        if index.insert(id, record).is_some() {
            return Err(MapError::Duplicate { kind: T::KIND, id });
        }
    }
    Ok(index)
}

/// Same check as [`index_by_id`] for collections that keep their fetch order.
pub fn ensure_unique_ids<T: Record>(records: &[T]) -> Result<(), MapError> {
    let mut seen = std::collections::HashSet::with_capacity(records.len());
    for record in records {
        if !seen.insert(record.id()) {
            return Err(MapError::Duplicate {
                kind: T::KIND,
                id: record.id(),
            });
        }
    }
    Ok(())
}

/// Group comments by owning post, keeping fetch order within each group.
pub fn group_comments(comments: Vec<Comment>) -> BTreeMap<u64, Vec<Comment>> {
    let mut grouped: BTreeMap<u64, Vec<Comment>> = BTreeMap::new();
    for comment in comments {
        grouped.entry(comment.post).or_default().push(comment);
    }
    grouped
}
