use std::collections::HashMap;

use tracing::info;

use crate::analyzers::types::ClassifiedBook;
use crate::sources::authors::Author;
use crate::sources::books::Book;
use crate::sources::links::AuthorBookLink;
use crate::stats::{Cleaned, DropCounts};

/// Joins links to classified authors, then attaches the result to every
/// book in the catalog.
///
/// Links to authors missing from `authors` are dropped. Every book yields one
/// row per classified author, or a single row without author fields when it
/// has none. Book order is preserved.
pub fn classify(
    links: &[AuthorBookLink],
    authors: &[Author],
    books: &[Book],
) -> Cleaned<Vec<ClassifiedBook>> {
    let mut drops = DropCounts::default();

    let mut authors_by_id: HashMap<i64, Vec<&Author>> = HashMap::new();
    for author in authors {
        authors_by_id.entry(author.author_id).or_default().push(author);
    }

    let mut by_book: HashMap<i64, Vec<(&AuthorBookLink, &Author)>> = HashMap::new();
    for link in links {
        match authors_by_id.get(&link.author_id) {
            Some(matches) => by_book
                .entry(link.book_id)
                .or_default()
                .extend(matches.iter().map(|a| (link, *a))),
            None => drops.links_without_author += 1,
        }
    }

    let mut rows = Vec::with_capacity(books.len());
    for book in books {
        match by_book.get(&book.book_id) {
            Some(pairs) => rows.extend(pairs.iter().map(|&pair| row(book, Some(pair)))),
            None => rows.push(row(book, None)),
        }
    }

    info!(
        books = books.len(),
        rows = rows.len(),
        links_without_author = drops.links_without_author,
        "Books classified"
    );
    Cleaned::new(rows, drops)
}

fn row(book: &Book, authorship: Option<(&AuthorBookLink, &Author)>) -> ClassifiedBook {
    let link = authorship.map(|(l, _)| l);
    let author = authorship.map(|(_, a)| a);

    ClassifiedBook {
        book_id: book.book_id,
        title: book.title.clone(),
        isbn: book.isbn.clone(),
        isbn13: book.isbn13.clone(),
        country_code: book.country_code.clone(),
        language_code: book.language_code.clone(),
        description: book.description.clone(),
        work_id: book.work_id.clone(),
        best_book_id: book.best_book_id,
        original_title: book.original_title.clone(),
        author_id: link.map(|l| l.author_id),
        name: link.and_then(|l| l.name.clone()),
        role: link.and_then(|l| l.role.clone()),
        race: author.map(|a| a.race),
        gender: author.map(|a| a.gender),
        image_url: author.and_then(|a| a.image_url.clone()),
        about: author.and_then(|a| a.about.clone()),
        influences: author.and_then(|a| a.influences.clone()),
        works_count: author.and_then(|a| a.works_count.clone()),
        hometown: author.and_then(|a| a.hometown.clone()),
        born_at: author.and_then(|a| a.born_at.clone()),
        died_at: author.and_then(|a| a.died_at.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::authors::{Gender, Race};

    fn book(id: i64) -> Book {
        Book {
            book_id: id,
            title: Some(format!("Book {id}")),
            isbn: None,
            isbn13: None,
            country_code: None,
            language_code: Some("eng".into()),
            description: None,
            work_id: None,
            best_book_id: None,
            original_title: None,
        }
    }

    fn author(id: i64, race: Race, gender: Gender) -> Author {
        Author {
            author_id: id,
            name: Some(format!("Author {id}")),
            race,
            gender,
            image_url: None,
            about: None,
            influences: None,
            works_count: None,
            hometown: Some("Somewhere".into()),
            born_at: None,
            died_at: None,
        }
    }

    fn link(book_id: i64, author_id: i64) -> AuthorBookLink {
        AuthorBookLink {
            book_id,
            author_id,
            name: Some(format!("Author {author_id}")),
            role: None,
        }
    }

    #[test]
    fn test_classify_one_row_per_author() {
        let books = vec![book(1), book(2)];
        let authors = vec![
            author(10, Race::Black, Gender::Female),
            author(11, Race::White, Gender::Male),
        ];
        let links = vec![link(1, 10), link(1, 11), link(2, 11)];

        let rows = classify(&links, &authors, &books).value;

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].book_id, 1);
        assert_eq!(rows[0].author_id, Some(10));
        assert_eq!(rows[0].race, Some(Race::Black));
        assert_eq!(rows[0].hometown.as_deref(), Some("Somewhere"));
        assert_eq!(rows[1].author_id, Some(11));
        assert_eq!(rows[2].book_id, 2);
    }

    #[test]
    fn test_classify_keeps_books_without_classified_author() {
        let books = vec![book(1), book(2)];
        let authors = vec![author(10, Race::Asian, Gender::Male)];
        let links = vec![link(1, 10), link(2, 99)];

        let cleaned = classify(&links, &authors, &books);

        assert_eq!(cleaned.value.len(), 2);
        let orphan = &cleaned.value[1];
        assert_eq!(orphan.book_id, 2);
        assert_eq!(orphan.author_id, None);
        assert_eq!(orphan.race, None);
        assert_eq!(orphan.gender, None);
        assert_eq!(orphan.name, None);
        assert_eq!(cleaned.drops.links_without_author, 1);
    }

    #[test]
    fn test_classify_ignores_links_to_books_outside_catalog() {
        let books = vec![book(1)];
        let authors = vec![author(10, Race::Latino, Gender::Female)];
        let links = vec![link(5, 10)];

        let rows = classify(&links, &authors, &books).value;

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].author_id, None);
    }
}
