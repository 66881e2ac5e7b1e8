// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-memory catalog store.
//!
//! Authors, publishers and books get sequential integer ids starting at 1;
//! libraries get random UUIDs. Every mutating method checks all of its
//! preconditions before changing anything, so a failed call leaves the store
//! untouched.

use std::collections::BTreeMap;

use chrono::Utc;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{
    Author, Book, CreateAuthorRequest, CreateBookRequest, CreateLibraryRequest,
    CreatePublisherRequest, Library, Publisher, UpdateAuthorRequest, UpdateLibraryRequest,
    UpdatePublisherRequest,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("{0} not found.")]
    NotFound(&'static str),
    #[error("{0}")]
    Invalid(String),
    #[error("{0} is still referenced by one or more books.")]
    StillReferenced(&'static str),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Default)]
pub struct InMemoryStore {
    authors: BTreeMap<i32, Author>,
    publishers: BTreeMap<i32, Publisher>,
    libraries: BTreeMap<Uuid, Library>,
    books: BTreeMap<i32, Book>,
    last_author_id: i32,
    last_publisher_id: i32,
    last_book_id: i32,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    // -------------------------------------------------------------------------
    // Authors
    // -------------------------------------------------------------------------

    pub fn list_authors(&self) -> Vec<Author> {
        self.authors.values().cloned().collect()
    }

    pub fn author(&self, id: i32) -> StoreResult<Author> {
        self.authors.get(&id).cloned().ok_or(StoreError::NotFound("Author"))
    }

    pub fn create_author(&mut self, request: CreateAuthorRequest) -> Author {
        self.last_author_id += 1;
        let author = Author {
            id: self.last_author_id,
            name: request.name.trim().to_string(),
            biography: request.biography.trim().to_string(),
            date_created: Utc::now(),
        };
        self.authors.insert(author.id, author.clone());
        author
    }

    pub fn update_author(&mut self, request: UpdateAuthorRequest) -> StoreResult<Author> {
        let Some(author) = self.authors.get_mut(&request.id) else {
            return Err(StoreError::NotFound("Author"));
        };
        author.name = request.name.trim().to_string();
        author.biography = request.biography.trim().to_string();
        Ok(author.clone())
    }

    pub fn delete_author(&mut self, id: i32) -> StoreResult<()> {
        if !self.authors.contains_key(&id) {
            return Err(StoreError::NotFound("Author"));
        }
        if self.books.values().any(|book| book.author_id == id) {
            return Err(StoreError::StillReferenced("Author"));
        }
        self.authors.remove(&id);
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Publishers
    // -------------------------------------------------------------------------

    pub fn list_publishers(&self) -> Vec<Publisher> {
        self.publishers.values().cloned().collect()
    }

    pub fn publisher(&self, id: i32) -> StoreResult<Publisher> {
        self.publishers
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound("Publisher"))
    }

    pub fn create_publisher(&mut self, request: CreatePublisherRequest) -> Publisher {
        self.last_publisher_id += 1;
        let publisher = Publisher {
            id: self.last_publisher_id,
            name: request.name.trim().to_string(),
            address: request.address.trim().to_string(),
            contact_info: request.contact_info.trim().to_string(),
            publish_year: request.publish_year,
        };
        self.publishers.insert(publisher.id, publisher.clone());
        publisher
    }

    pub fn update_publisher(&mut self, request: UpdatePublisherRequest) -> StoreResult<Publisher> {
        let Some(publisher) = self.publishers.get_mut(&request.id) else {
            return Err(StoreError::NotFound("Publisher"));
        };
        publisher.name = request.name.trim().to_string();
        publisher.address = request.address.trim().to_string();
        publisher.contact_info = request.contact_info.trim().to_string();
        publisher.publish_year = request.publish_year;
        Ok(publisher.clone())
    }

    pub fn delete_publisher(&mut self, id: i32) -> StoreResult<()> {
        if !self.publishers.contains_key(&id) {
            return Err(StoreError::NotFound("Publisher"));
        }
        if self.books.values().any(|book| book.publisher_id == id) {
            return Err(StoreError::StillReferenced("Publisher"));
        }
        self.publishers.remove(&id);
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Libraries
    // -------------------------------------------------------------------------

    pub fn list_libraries(&self) -> Vec<Library> {
        self.libraries.values().cloned().collect()
    }

    pub fn library(&self, id: Uuid) -> StoreResult<Library> {
        self.libraries
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound("Library"))
    }

    /// The owner reference is checked by the caller against the identity
    /// store.
    pub fn create_library(&mut self, request: CreateLibraryRequest) -> Library {
        let library = Library {
            id: Uuid::new_v4(),
            library_name: request.library_name.trim().to_string(),
            location: request.location.trim().to_string(),
            contact_no: request.contact_no.trim().to_string(),
            user_id: request.user_id.trim().to_string(),
        };
        self.libraries.insert(library.id, library.clone());
        library
    }

    pub fn update_library(&mut self, request: UpdateLibraryRequest) -> StoreResult<Library> {
        let Some(library) = self.libraries.get_mut(&request.id) else {
            return Err(StoreError::NotFound("Library"));
        };
        library.library_name = request.library_name.trim().to_string();
        library.location = request.location.trim().to_string();
        library.contact_no = request.contact_no.trim().to_string();
        Ok(library.clone())
    }

    pub fn delete_library(&mut self, id: Uuid) -> StoreResult<()> {
        if !self.libraries.contains_key(&id) {
            return Err(StoreError::NotFound("Library"));
        }
        if self.books.values().any(|book| book.library_id == id) {
            return Err(StoreError::StillReferenced("Library"));
        }
        self.libraries.remove(&id);
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Books
    // -------------------------------------------------------------------------

    pub fn list_books(&self) -> Vec<Book> {
        self.books.values().cloned().collect()
    }

    pub fn book(&self, id: i32) -> StoreResult<Book> {
        self.books.get(&id).cloned().ok_or(StoreError::NotFound("Book"))
    }

    pub fn create_book(&mut self, request: CreateBookRequest) -> StoreResult<Book> {
        let book = request.with_id(self.last_book_id + 1);
        self.check_book_references(&book)?;

        self.last_book_id = book.id;
        self.books.insert(book.id, book.clone());
        Ok(book)
    }

    pub fn update_book(&mut self, book: Book) -> StoreResult<Book> {
        if !self.books.contains_key(&book.id) {
            return Err(StoreError::NotFound("Book"));
        }
        self.check_book_references(&book)?;

        self.books.insert(book.id, book.clone());
        Ok(book)
    }

    pub fn delete_book(&mut self, id: i32) -> StoreResult<()> {
        self.books
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound("Book"))
    }

    fn check_book_references(&self, book: &Book) -> StoreResult<()> {
        if !self.authors.contains_key(&book.author_id) {
            return Err(StoreError::Invalid("Author does not exist.".to_string()));
        }
        if !self.publishers.contains_key(&book.publisher_id) {
            return Err(StoreError::Invalid("Publisher does not exist.".to_string()));
        }
        if !self.libraries.contains_key(&book.library_id) {
            return Err(StoreError::Invalid("Library does not exist.".to_string()));
        }
        Ok(())
    }
}
