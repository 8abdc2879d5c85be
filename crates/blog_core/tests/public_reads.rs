use blog_core::db::open_db_in_memory;
use blog_core::{
    BlogService, CategoryRepository, EntryFields, EntryRepository, EntryStatus, RecordKind,
    RepoError, SqliteCategoryRepository, SqliteEntryRepository, SqliteTagRepository,
    TagRepository, UNCATEGORIZED_ID,
};
use rusqlite::Connection;

fn publish(conn: &Connection, title: &str, category_id: i64, tags: &[&str]) -> i64 {
    let id = SqliteEntryRepository::new(conn)
        .create_entry(
            &EntryFields::new(title, format!("{title} body"), EntryStatus::Published)
                .in_category(category_id),
        )
        .unwrap();
    let tag_repo = SqliteTagRepository::new(conn);
    for tag in tags {
        tag_repo.add_entry_tag(id, tag).unwrap();
    }
    id
}

#[test]
fn empty_store_has_empty_index() {
    let conn = open_db_in_memory().unwrap();
    let blog = BlogService::sqlite(&conn).unwrap();

    assert!(blog.list_published().unwrap().is_empty());
    assert!(blog.list_tags().unwrap().is_empty());
    assert_eq!(blog.list_categories().unwrap().len(), 1);
}

#[test]
fn index_lists_only_published_newest_first() {
    let conn = open_db_in_memory().unwrap();
    let first = publish(&conn, "first", UNCATEGORIZED_ID, &[]);
    SqliteEntryRepository::new(&conn)
        .create_entry(&EntryFields::new("hidden", "", EntryStatus::Draft))
        .unwrap();
    let second = publish(&conn, "second", UNCATEGORIZED_ID, &[]);

    let blog = BlogService::sqlite(&conn).unwrap();
    let ids: Vec<i64> = blog
        .list_published()
        .unwrap()
        .iter()
        .map(|entry| entry.id)
        .collect();
    assert_eq!(ids, vec![second, first]);
}

#[test]
fn view_entry_includes_category_and_tags() {
    let conn = open_db_in_memory().unwrap();
    let category = SqliteCategoryRepository::new(&conn)
        .create_category("notes")
        .unwrap();
    let id = publish(&conn, "hello", category, &["rust", "blog"]);

    let view = BlogService::sqlite(&conn).unwrap().view_entry(id).unwrap();
    assert_eq!(view.entry.title, "hello");
    assert_eq!(view.category.name, "notes");
    assert_eq!(
        view.tags.iter().map(String::as_str).collect::<Vec<_>>(),
        vec!["blog", "rust"]
    );
}

#[test]
fn drafts_and_missing_entries_read_as_not_found() {
    let conn = open_db_in_memory().unwrap();
    let draft = SqliteEntryRepository::new(&conn)
        .create_entry(&EntryFields::new("wip", "", EntryStatus::Draft))
        .unwrap();
    let blog = BlogService::sqlite(&conn).unwrap();

    assert!(matches!(
        blog.view_entry(draft),
        Err(RepoError::NotFound {
            kind: RecordKind::Entry,
            ..
        })
    ));
    assert!(matches!(
        blog.view_entry(draft + 100),
        Err(RepoError::NotFound { .. })
    ));
}

#[test]
fn category_page_lists_published_members() {
    let conn = open_db_in_memory().unwrap();
    let notes = SqliteCategoryRepository::new(&conn)
        .create_category("notes")
        .unwrap();
    let member = publish(&conn, "in", notes, &[]);
    publish(&conn, "out", UNCATEGORIZED_ID, &[]);

    let blog = BlogService::sqlite(&conn).unwrap();
    let page = blog.category_page(notes).unwrap();
    assert_eq!(page.category.name, "notes");
    assert_eq!(page.entries.len(), 1);
    assert_eq!(page.entries[0].id, member);

    assert!(matches!(
        blog.category_page(999),
        Err(RepoError::NotFound {
            kind: RecordKind::Category,
            id: 999
        })
    ));
}

#[test]
fn tag_page_matches_exact_name_and_tolerates_unknown_tags() {
    let conn = open_db_in_memory().unwrap();
    let tagged = publish(&conn, "tagged", UNCATEGORIZED_ID, &["rust"]);
    publish(&conn, "other", UNCATEGORIZED_ID, &["Rust"]);

    let blog = BlogService::sqlite(&conn).unwrap();
    let page = blog.tag_page(" rust ").unwrap();
    assert_eq!(page.name, "rust");
    assert_eq!(page.entries.len(), 1);
    assert_eq!(page.entries[0].id, tagged);

    let empty = blog.tag_page("missing").unwrap();
    assert!(empty.entries.is_empty());
}

#[test]
fn service_requires_initialized_schema() {
    let conn = Connection::open_in_memory().unwrap();
    assert!(matches!(
        BlogService::sqlite(&conn),
        Err(RepoError::MissingRequiredTable(_))
    ));
}
