use pretty_assertions::assert_eq;
use serde_json::json;
use wp_export_core::{
    ensure_unique_ids, group_comments, index_by_id, map_records, Category, Comment, MapError,
    Post, RecordKind, Rendered, Tag, User,
};

fn init_logging() {
    export_logging::initialize_for_tests();
}

#[test]
fn posts_map_leniently_from_raw_values() {
    init_logging();
    let raw = vec![json!({
        "id": 7,
        "date_gmt": "2020-01-02T03:04:05",
        "title": {"rendered": "Hello &amp; welcome"},
        "content": {"rendered": "<p>Body</p>", "protected": false},
        "author": 2,
        "categories": [3, 1],
        "link": "https://example.com/2020/01/hello/",
        "unexpected": {"nested": true}
    })];

    let posts: Vec<Post> = map_records(raw).unwrap();
    assert_eq!(posts.len(), 1);
    let post = &posts[0];
    assert_eq!(post.id, 7);
    assert_eq!(post.title, Rendered::new("Hello &amp; welcome"));
    assert_eq!(post.content.rendered, "<p>Body</p>");
    assert_eq!(post.excerpt, Rendered::default());
    assert_eq!(post.categories, vec![3, 1]);
    assert!(post.tags.is_empty());
}

#[test]
fn wrong_field_shape_is_rejected_with_record_index() {
    let raw = vec![json!({"id": 1, "name": "ok"}), json!({"id": "two", "name": "bad"})];
    let err = map_records::<User>(raw).unwrap_err();
    match err {
        MapError::Shape { kind, index, .. } => {
            assert_eq!(kind, RecordKind::User);
            assert_eq!(index, 1);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn tags_keep_description_and_taxonomy() {
    let raw = vec![json!({
        "id": 4, "name": "Rust", "slug": "rust",
        "description": "Posts about Rust", "taxonomy": "post_tag"
    })];
    let tags: Vec<Tag> = map_records(raw).unwrap();
    assert_eq!(
        tags[0],
        Tag {
            id: 4,
            name: "Rust".into(),
            slug: "rust".into(),
            description: "Posts about Rust".into(),
            taxonomy: "post_tag".into(),
        }
    );
}

#[test]
fn index_by_id_rejects_duplicates() {
    let categories = vec![
        Category {
            id: 1,
            name: "News".into(),
            slug: "news".into(),
        },
        Category {
            id: 1,
            name: "Again".into(),
            slug: "again".into(),
        },
    ];
    let err = index_by_id(categories).unwrap_err();
    assert_eq!(err.to_string(), "duplicate category: 1");
}

#[test]
fn index_by_id_builds_lookup() {
    let users = vec![
        User {
            id: 2,
            name: "Bea".into(),
            slug: "bea".into(),
        },
        User {
            id: 1,
            name: "Al".into(),
            slug: "al".into(),
        },
    ];
    let index = index_by_id(users).unwrap();
    assert_eq!(index.len(), 2);
    assert_eq!(index[&1].name, "Al");
    assert_eq!(index[&2].slug, "bea");
}

#[test]
fn duplicate_posts_are_detected_without_reordering() {
    let posts = vec![
        Post {
            id: 5,
            ..Post::default()
        },
        Post {
            id: 6,
            ..Post::default()
        },
    ];
    assert!(ensure_unique_ids(&posts).is_ok());

    let mut duplicated = posts.clone();
    duplicated.push(Post {
        id: 5,
        ..Post::default()
    });
    let err = ensure_unique_ids(&duplicated).unwrap_err();
    assert!(matches!(
        err,
        MapError::Duplicate {
            kind: RecordKind::Post,
            id: 5
        }
    ));
}

#[test]
fn comments_are_grouped_by_post_in_fetch_order() {
    let raw = vec![
        json!({"id": 10, "post": 1, "author_name": "Guest", "content": {"rendered": "a"}}),
        json!({"id": 11, "post": 2, "author": 3, "parent": 0}),
        json!({"id": 12, "post": 1, "parent": 10, "meta": []}),
    ];
    let comments: Vec<Comment> = map_records(raw).unwrap();
    let grouped = group_comments(comments);

    assert_eq!(grouped.len(), 2);
    let first: Vec<u64> = grouped[&1].iter().map(|c| c.id).collect();
    assert_eq!(first, vec![10, 12]);
    assert_eq!(grouped[&1][1].parent, 10);
    assert_eq!(grouped[&2][0].author, 3);
}
