use serde::Serialize;
use wp_export_core::Post;

pub const POST_TEMPLATE: &str = "blog-post";

/// Frontmatter keys, serialized in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostFrontmatter<'a> {
    pub template: &'a str,
    pub title: &'a str,
    pub date: &'a str,
    pub excerpt: &'a str,
    pub author: &'a str,
    pub categories: &'a [String],
    pub tags: &'a [String],
}

impl<'a> PostFrontmatter<'a> {
    pub fn from_post(post: &'a Post) -> Self {
        Self {
            template: POST_TEMPLATE,
            title: &post.title.rendered,
            date: &post.date_gmt,
            excerpt: &post.excerpt.rendered,
            author: &post.author_name,
            categories: &post.category_names,
            tags: &post.tag_names,
        }
    }
}

/// Assemble the post file: YAML frontmatter, the verbatim extra block, then the body.
pub fn build_post_document(
    frontmatter: &PostFrontmatter<'_>,
    extra_frontmatter: &str,
    body_html: &str,
) -> Result<String, serde_yaml::Error> {
    let yaml = serde_yaml::to_string(frontmatter)?;
    let mut doc = String::with_capacity(yaml.len() + extra_frontmatter.len() + body_html.len() + 8);
    doc.push_str("---\n");
    doc.push_str(&yaml);
    doc.push_str(extra_frontmatter);
    doc.push_str("---\n");
    doc.push_str(body_html);
    Ok(doc)
}
