//! Book (catalog) endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::{
    error::AppResult,
    models::book::{BookView, CreateBook, UpdateBook},
    AppState,
};

#[derive(Deserialize)]
pub struct FindBookParams {
    pub title: String,
    pub isbn: String,
}

/// Query-string variant of a partial update. The ISBN selects the book and is not changed.
#[derive(Deserialize)]
pub struct ModifyBookParams {
    pub isbn: String,
    pub title: Option<String>,
    #[serde(alias = "type")]
    pub genre: Option<String>,
    pub author: Option<String>,
    pub language: Option<String>,
    pub price: Option<Decimal>,
}

/// Create a book from a JSON body
pub async fn create_book(
    State(state): State<AppState>,
    Json(book): Json<CreateBook>,
) -> AppResult<(StatusCode, Json<BookView>)> {
    let created = state.services.catalog.create_book(book).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Create a book from query parameters
pub async fn create_book_params(
    State(state): State<AppState>,
    Query(book): Query<CreateBook>,
) -> AppResult<(StatusCode, Json<BookView>)> {
    let created = state.services.catalog.create_book(book).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Find a book by title and ISBN
pub async fn find_book(
    State(state): State<AppState>,
    Query(params): Query<FindBookParams>,
) -> AppResult<Json<BookView>> {
    let book = state
        .services
        .catalog
        .find_book(&params.title, &params.isbn)
        .await?;
    Ok(Json(book))
}

/// Get a book by ISBN
pub async fn get_book(
    State(state): State<AppState>,
    Path(isbn): Path<String>,
) -> AppResult<Json<BookView>> {
    let book = state.services.catalog.get_book(&isbn).await?;
    Ok(Json(book))
}

/// Partially update a book from a JSON body
pub async fn update_book(
    State(state): State<AppState>,
    Path(isbn): Path<String>,
    Json(update): Json<UpdateBook>,
) -> AppResult<Json<BookView>> {
    let updated = state.services.catalog.update_book(&isbn, update).await?;
    Ok(Json(updated))
}

/// Partially update a book from query parameters
pub async fn update_book_params(
    State(state): State<AppState>,
    Query(params): Query<ModifyBookParams>,
) -> AppResult<Json<BookView>> {
    let update = UpdateBook {
        isbn: None,
        title: params.title,
        genre: params.genre,
        author: params.author,
        language: params.language,
        price: params.price,
    };
    let updated = state.services.catalog.update_book(&params.isbn, update).await?;
    Ok(Json(updated))
}

/// Delete a book
pub async fn delete_book(
    State(state): State<AppState>,
    Path(isbn): Path<String>,
) -> AppResult<StatusCode> {
    state.services.catalog.delete_book(&isbn).await?;
    Ok(StatusCode::NO_CONTENT)
}
