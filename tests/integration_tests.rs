use reading_diversity::analyzers::{aggregate, classify};
use reading_diversity::identifiers::{build_map, load_isbn_map};
use reading_diversity::services::review_api::RawReview;
use reading_diversity::services::user_ratings::remap_ratings;
use reading_diversity::sources::authors::{Gender, Race, load_authors};
use reading_diversity::sources::books::{canonical_ids, load_books};
use reading_diversity::sources::links::load_links;

#[test]
fn test_full_pipeline() {
    let books = load_books("book_id,language_code\n1,eng\n2,fr\n".as_bytes())
        .expect("Failed to load books")
        .value;
    let authors = load_authors("author_id,race,gender\n10,black,Female\n".as_bytes())
        .expect("Failed to load authors")
        .value;
    let links = load_links("book_id,author_id\n1,10\n".as_bytes())
        .expect("Failed to load links")
        .value;
    let isbn_map = build_map(vec![("X".to_string(), Some("1".to_string()))], None).value;

    let classified = classify(&links, &authors, &books).value;
    let ratings = remap_ratings(
        vec![RawReview {
            book_id: "1".into(),
            isbn: Some("X".into()),
            rating: 5,
        }],
        &isbn_map,
    )
    .value;
    let groups = aggregate(&ratings, &classified).value;

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].race, Race::Black);
    assert_eq!(groups[0].gender, Gender::Female);
    assert_eq!(groups[0].distinct_count, 1);
    assert_eq!(groups[0].percentage, 1.0);
}

#[test]
fn test_pipeline_with_coauthors_and_rereads() {
    let books = load_books(
        "\
book_id,title,language_code,best_book_id
1,Good Omens,eng,1
2,Good Omens (UK),en-GB,1
3,Beloved,eng,3
4,Der Process,ger,4
"
        .as_bytes(),
    )
    .unwrap()
    .value;
    let authors = load_authors(
        "\
author_id,name,race,gender
20,Terry Pratchett,white,male
21,Neil Gaiman,WHITE,MALE
22,Toni Morrison,black,female
23,Anon,,
"
        .as_bytes(),
    )
    .unwrap()
    .value;
    let links = load_links(
        "\
book_id,author_id,role
1,20,
1,21,
2,20,
2,21,
3,22,
"
        .as_bytes(),
    )
    .unwrap()
    .value;

    let allowed = canonical_ids(&books);
    let isbn_map = load_isbn_map(
        "ISBN-OMENS-US,1\nISBN-OMENS-UK,1.0\nISBN-BELOVED,3\nISBN-PROCESS,4\n".as_bytes(),
        Some(&allowed),
    )
    .unwrap();
    assert_eq!(isbn_map.drops.outside_allow_set, 1);

    let classified = classify(&links, &authors, &books).value;
    let raw = vec![
        RawReview {
            book_id: "a".into(),
            isbn: Some("ISBN-OMENS-US".into()),
            rating: 5,
        },
        RawReview {
            book_id: "b".into(),
            isbn: Some("ISBN-OMENS-UK".into()),
            rating: 4,
        },
        RawReview {
            book_id: "c".into(),
            isbn: Some("ISBN-BELOVED".into()),
            rating: 5,
        },
        RawReview {
            book_id: "d".into(),
            isbn: Some("ISBN-PROCESS".into()),
            rating: 3,
        },
    ];
    let ratings = remap_ratings(raw, &isbn_map.value);
    assert_eq!(ratings.value.len(), 3);
    assert_eq!(ratings.drops.unmapped_identifiers, 1);

    let groups = aggregate(&ratings.value, &classified).value;

    assert_eq!(groups.len(), 2);
    assert_eq!((groups[0].race, groups[0].gender), (Race::Black, Gender::Female));
    assert_eq!(groups[0].distinct_count, 1);
    assert_eq!((groups[1].race, groups[1].gender), (Race::White, Gender::Male));
    assert_eq!(groups[1].distinct_count, 2);

    let sum: f64 = groups.iter().map(|g| g.percentage).sum();
    assert!((sum - 1.0).abs() < 1e-9);
}
