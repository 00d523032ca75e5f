use docrest_core::{
    validate_save, Author, Book, Document, DocumentMeta, RuleGroup, SaveKind, Validator, Violation,
};

#[test]
fn valid_author_passes_create_and_update_with_id() {
    let validator = Author::validator();
    let mut author = Author::new("Mary", "Shelley");
    author.email = Some("mary@example.org".to_string());

    validate_save(&validator, &author, SaveKind::Create).expect("new author is valid");

    author.set_id("NOT_NULL");
    validate_save(&validator, &author, SaveKind::Update).expect("stored author is valid");
}

#[test]
fn author_rules_report_every_broken_field() {
    let validator = Author::validator();
    let mut author = Author::new(" ", "");
    author.email = Some("mary at example".to_string());

    let violations = validator.validate(&author, RuleGroup::Default);
    assert_eq!(
        violations.into_iter().collect::<Vec<_>>(),
        vec![
            Violation::new("email", "not a well-formed email address"),
            Violation::new("first_name", "may not be empty"),
            Violation::new("last_name", "may not be empty"),
        ]
    );
}

#[test]
fn book_rules_cover_title_isbn_authors_and_year() {
    let validator = Book::validator();
    let mut book = Book::new("", "123");
    book.published_year = Some(-1);

    let err = validate_save(&validator, &book, SaveKind::Create).unwrap_err();
    for path in ["title", "isbn", "author_ids", "published_year"] {
        assert!(err.has_path(path), "missing violation for {path}");
    }
    assert_eq!(err.len(), 4);
}

#[test]
fn valid_book_passes_create() {
    let book = Book::new("Frankenstein", "978-0-14-143947-1").with_author("shelley");
    validate_save(&Book::validator(), &book, SaveKind::Create).expect("book is valid");
}

#[test]
fn validation_error_message_lists_path_and_message() {
    let err = validate_save(&Author::validator(), &Author::new("", "Shelley"), SaveKind::Update)
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "validation failed: first_name may not be empty, id may not be null"
    );
}

#[test]
fn documents_serialize_flat_metadata_and_type_tags() {
    let mut book = Book::new("Dune", "9780441172719").with_author("herbert");
    book.meta = DocumentMeta {
        id: Some("b-1".to_string()),
        created_millis: 1000,
        last_updated_millis: 2000,
    };

    let json = serde_json::to_value(&book).unwrap();
    assert_eq!(json["id"], "b-1");
    assert_eq!(json["created_millis"], 1000);
    assert_eq!(json["last_updated_millis"], 2000);
    assert_eq!(json["author_ids"], serde_json::json!(["herbert"]));
    assert!(json.get("published_year").is_none());

    let decoded: Book = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, book);

    assert_eq!(Author::DOCUMENT_TYPE, "author");
    assert_eq!(Book::DOCUMENT_TYPE, "book");
}
