use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A pre-rendered HTML fragment as returned by the REST API (`{"rendered": "..."}`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rendered {
    pub rendered: String,
}

impl Rendered {
    pub fn new(rendered: impl Into<String>) -> Self {
        Self {
            rendered: rendered.into(),
        }
    }

    fn is_empty(&self) -> bool {
        self.rendered.is_empty()
    }
}

/// A published post. The `*_name(s)` fields are filled in by enrichment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Post {
    pub id: u64,
    pub date_gmt: String,
    pub slug: String,
    pub status: String,
    pub title: Rendered,
    pub content: Rendered,
    pub excerpt: Rendered,
    pub author: u64,
    pub categories: Vec<u64>,
    pub tags: Vec<u64>,
    pub link: String,

    #[serde(skip)]
    pub author_name: String,
    #[serde(skip)]
    pub category_names: Vec<String>,
    #[serde(skip)]
    pub tag_names: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tag {
    pub id: u64,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub taxonomy: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Category {
    pub id: u64,
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub slug: String,
}

/// A comment attached to a post. Guests have `author == 0` and carry their
/// identity in the `author_*` strings instead.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Comment {
    pub id: u64,
    #[serde(skip_serializing_if = "is_zero")]
    pub author: u64,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub author_email: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub author_ip: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub author_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub author_url: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub author_user_agent: String,
    #[serde(skip_serializing_if = "Rendered::is_empty")]
    pub content: Rendered,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub date: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub date_gmt: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub link: String,
    #[serde(skip_serializing_if = "is_zero")]
    pub parent: u64,
    #[serde(skip_serializing_if = "is_zero")]
    pub post: u64,
    #[serde(rename = "type", skip_serializing_if = "String::is_empty")]
    pub kind: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub author_avatar_urls: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub meta: Vec<serde_json::Value>,
}

fn is_zero(value: &u64) -> bool {
    *value == 0
}
