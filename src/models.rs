// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response bodies for the REST API. Field names are camelCase
//! on the wire. All types derive `ToSchema` for the OpenAPI document.
//!
//! ## Model Categories
//!
//! - **Envelope**: [`ApiResponse`] wraps every successful body
//! - **Users**: login and registration
//! - **Catalog**: authors, publishers, libraries and books
//!
//! Request types implement [`Validate`]; handlers call it before touching
//! the store and turn the first failing rule into a 400.

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

// =============================================================================
// Envelope
// =============================================================================

/// Success envelope.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub status: bool,
    pub data: T,
    #[schema(example = "Fetched successfully.")]
    pub message: String,
    #[schema(example = "SUCCESS-200")]
    pub code: String,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self {
            status: true,
            data,
            message: message.into(),
            code: "SUCCESS-200".to_string(),
        }
    }

    pub fn created(data: T, message: impl Into<String>) -> Self {
        Self {
            code: "SUCCESS-201".to_string(),
            ..Self::ok(data, message)
        }
    }

    pub fn fetched(data: T) -> Self {
        Self::ok(data, "Fetched successfully.")
    }
}

// =============================================================================
// Validation
// =============================================================================

/// Field-level checks on a request body.
pub trait Validate {
    /// Returns the message of the first rule that fails.
    fn validate(&self) -> Result<(), String>;
}

fn required(value: &str, message: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err(message.to_string())
    } else {
        Ok(())
    }
}

fn max_len(value: &str, max: usize, field: &str) -> Result<(), String> {
    if value.trim().chars().count() > max {
        Err(format!("{field} must be {max} characters or fewer."))
    } else {
        Ok(())
    }
}

fn length_between(value: &str, min: usize, max: usize, field: &str) -> Result<(), String> {
    let len = value.trim().chars().count();
    if len < min {
        Err(format!("{field} must be at least {min} characters."))
    } else if len > max {
        Err(format!("{field} must not exceed {max} characters."))
    } else {
        Ok(())
    }
}

fn is_email(value: &str) -> bool {
    match value.trim().split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !domain.contains('@'),
        None => false,
    }
}

const PASSWORD_SPECIALS: &str = "!@#$%^&*(),.?\"{}|<>";

// =============================================================================
// Users
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[schema(example = "reader01")]
    pub username: String,
    pub password: String,
}

impl Validate for LoginRequest {
    fn validate(&self) -> Result<(), String> {
        required(&self.username, "Username is required.")?;
        length_between(&self.username, 6, 30, "Username")?;
        required(&self.password, "Password is required.")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[schema(example = "reader01")]
    pub username: String,
    #[schema(example = "reader@library.test")]
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl Validate for RegisterRequest {
    fn validate(&self) -> Result<(), String> {
        required(&self.email, "Email is required.")?;
        if !is_email(&self.email) {
            return Err("Invalid email format.".to_string());
        }

        required(&self.username, "Username is required.")?;
        length_between(&self.username, 6, 30, "Username")?;

        required(&self.password, "Password is required.")?;
        let len = self.password.chars().count();
        if len < 6 {
            return Err("Password must be at least 6 characters long.".to_string());
        }
        if len > 15 {
            return Err("Password cannot be more than 15 characters long.".to_string());
        }
        if !self.password.starts_with(|c: char| c.is_ascii_uppercase()) {
            return Err("Password must start with an uppercase letter.".to_string());
        }
        if !self.password.contains(|c: char| PASSWORD_SPECIALS.contains(c)) {
            return Err("Password must contain at least one special character.".to_string());
        }

        required(&self.confirm_password, "Confirm Password is required.")?;
        if self.confirm_password != self.password {
            return Err("Password and Confirm Password do not match.".to_string());
        }
        Ok(())
    }
}

// =============================================================================
// Authors
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub id: i32,
    pub name: String,
    pub biography: String,
    pub date_created: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAuthorRequest {
    pub name: String,
    #[serde(default)]
    pub biography: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAuthorRequest {
    pub id: i32,
    pub name: String,
    #[serde(default)]
    pub biography: String,
}

fn validate_author(name: &str, biography: &str) -> Result<(), String> {
    required(name, "Author name is required.")?;
    max_len(name, 100, "Author name")?;
    if biography.trim().chars().count() > 50 {
        return Err("Biography must be under 50 characters.".to_string());
    }
    Ok(())
}

impl Validate for CreateAuthorRequest {
    fn validate(&self) -> Result<(), String> {
        validate_author(&self.name, &self.biography)
    }
}

impl Validate for UpdateAuthorRequest {
    fn validate(&self) -> Result<(), String> {
        validate_author(&self.name, &self.biography)
    }
}

// =============================================================================
// Publishers
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Publisher {
    pub id: i32,
    pub name: String,
    pub address: String,
    pub contact_info: String,
    pub publish_year: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePublisherRequest {
    pub name: String,
    #[serde(default)]
    pub address: String,
    /// Also accepted as `contactNo`.
    #[serde(alias = "contactNo")]
    pub contact_info: String,
    #[schema(example = 1999)]
    pub publish_year: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePublisherRequest {
    pub id: i32,
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(alias = "contactNo")]
    pub contact_info: String,
    pub publish_year: i32,
}

fn validate_publisher(name: &str, address: &str, contact: &str, year: i32) -> Result<(), String> {
    required(name, "Publisher name is required.")?;
    max_len(name, 50, "Publisher name")?;
    max_len(address, 100, "Address")?;
    required(contact, "Contact number is required.")?;
    if !(1500..=Utc::now().year()).contains(&year) {
        return Err("Publish year must be valid.".to_string());
    }
    Ok(())
}

impl Validate for CreatePublisherRequest {
    fn validate(&self) -> Result<(), String> {
        validate_publisher(&self.name, &self.address, &self.contact_info, self.publish_year)
    }
}

impl Validate for UpdatePublisherRequest {
    fn validate(&self) -> Result<(), String> {
        validate_publisher(&self.name, &self.address, &self.contact_info, self.publish_year)
    }
}

// =============================================================================
// Libraries
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Library {
    pub id: Uuid,
    pub library_name: String,
    pub location: String,
    pub contact_no: String,
    /// Account that owns the library.
    pub user_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateLibraryRequest {
    pub library_name: String,
    pub location: String,
    pub contact_no: String,
    pub user_id: String,
}

/// Ownership is fixed at creation; updates leave `userId` untouched.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLibraryRequest {
    pub id: Uuid,
    pub library_name: String,
    pub location: String,
    pub contact_no: String,
}

fn validate_library(name: &str, location: &str, contact: &str) -> Result<(), String> {
    required(name, "Library name is required.")?;
    max_len(name, 30, "Library name")?;
    required(location, "Location is required.")?;
    max_len(location, 100, "Location")?;
    required(contact, "Contact number is required.")
}

impl Validate for CreateLibraryRequest {
    fn validate(&self) -> Result<(), String> {
        validate_library(&self.library_name, &self.location, &self.contact_no)?;
        required(&self.user_id, "UserId is required.")
    }
}

impl Validate for UpdateLibraryRequest {
    fn validate(&self) -> Result<(), String> {
        validate_library(&self.library_name, &self.location, &self.contact_no)
    }
}

// =============================================================================
// Books
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: i32,
    pub book_name: String,
    pub title: String,
    pub language: String,
    pub available_books: i32,
    pub author_id: i32,
    pub publisher_id: i32,
    pub library_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookRequest {
    pub book_name: String,
    pub title: String,
    pub language: String,
    pub available_books: i32,
    pub author_id: i32,
    pub publisher_id: i32,
    pub library_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBookRequest {
    pub id: i32,
    pub book_name: String,
    pub title: String,
    pub language: String,
    pub available_books: i32,
    pub author_id: i32,
    pub publisher_id: i32,
    pub library_id: Uuid,
}

impl CreateBookRequest {
    /// Attach an id, giving the stored shape.
    pub fn with_id(self, id: i32) -> Book {
        Book {
            id,
            book_name: self.book_name.trim().to_string(),
            title: self.title.trim().to_string(),
            language: self.language.trim().to_string(),
            available_books: self.available_books,
            author_id: self.author_id,
            publisher_id: self.publisher_id,
            library_id: self.library_id,
        }
    }
}

impl From<UpdateBookRequest> for Book {
    fn from(request: UpdateBookRequest) -> Self {
        let id = request.id;
        CreateBookRequest {
            book_name: request.book_name,
            title: request.title,
            language: request.language,
            available_books: request.available_books,
            author_id: request.author_id,
            publisher_id: request.publisher_id,
            library_id: request.library_id,
        }
        .with_id(id)
    }
}

fn validate_book(book: &Book) -> Result<(), String> {
    required(&book.book_name, "Book name is required.")?;
    max_len(&book.book_name, 150, "Book name")?;
    required(&book.title, "Title is required.")?;
    max_len(&book.title, 150, "Title")?;
    required(&book.language, "Language is required.")?;
    max_len(&book.language, 50, "Language")?;
    if book.available_books < 0 {
        return Err("Available books must be a positive number.".to_string());
    }
    if book.library_id.is_nil() {
        return Err("LibraryId is required.".to_string());
    }
    if book.author_id <= 0 {
        return Err("AuthorId is required.".to_string());
    }
    if book.publisher_id <= 0 {
        return Err("PublisherId is required.".to_string());
    }
    Ok(())
}

impl Validate for CreateBookRequest {
    fn validate(&self) -> Result<(), String> {
        validate_book(&self.clone().with_id(0))
    }
}

impl Validate for UpdateBookRequest {
    fn validate(&self) -> Result<(), String> {
        validate_book(&Book::from(self.clone()))
    }
}
