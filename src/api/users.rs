//! User management and checkout endpoints

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::{
    error::AppResult,
    models::user::{CreateUser, UpdateUser, UserView},
    AppState,
};

#[derive(Deserialize)]
pub struct EmailParams {
    pub email: String,
}

#[derive(Deserialize)]
pub struct ModifyUserParams {
    pub email: String,
    #[serde(alias = "nome")]
    pub name: Option<String>,
    #[serde(alias = "cognome")]
    pub surname: Option<String>,
}

#[derive(Deserialize)]
pub struct CheckoutParams {
    pub email: String,
    pub title: String,
    pub isbn: String,
}

#[derive(Deserialize)]
pub struct ReturnParams {
    pub email: String,
    pub title: String,
    pub isbn: Option<String>,
}

/// Register a user from a JSON body
pub async fn create_user(
    State(state): State<AppState>,
    Json(user): Json<CreateUser>,
) -> AppResult<(StatusCode, Json<UserView>)> {
    let created = state.services.users.create_user(user).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Register a user from query parameters
pub async fn create_user_params(
    State(state): State<AppState>,
    Query(user): Query<CreateUser>,
) -> AppResult<(StatusCode, Json<UserView>)> {
    let created = state.services.users.create_user(user).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Find a user by email
pub async fn find_user(
    State(state): State<AppState>,
    Query(params): Query<EmailParams>,
) -> AppResult<Json<UserView>> {
    let user = state.services.users.find_user(&params.email).await?;
    Ok(Json(user))
}

/// Partially update a user from a JSON body
pub async fn update_user(
    State(state): State<AppState>,
    Query(params): Query<EmailParams>,
    Json(update): Json<UpdateUser>,
) -> AppResult<Json<UserView>> {
    let updated = state.services.users.update_user(&params.email, update).await?;
    Ok(Json(updated))
}

/// Partially update a user's name and surname from query parameters
pub async fn update_user_params(
    State(state): State<AppState>,
    Query(params): Query<ModifyUserParams>,
) -> AppResult<Json<UserView>> {
    let updated = state
        .services
        .users
        .update_user_params(&params.email, params.name, params.surname)
        .await?;
    Ok(Json(updated))
}

/// Delete a user, releasing their books
pub async fn delete_user(
    State(state): State<AppState>,
    Query(params): Query<EmailParams>,
) -> AppResult<StatusCode> {
    state.services.users.delete_user(&params.email).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Check a book out to a user
pub async fn checkout_book(
    State(state): State<AppState>,
    Query(params): Query<CheckoutParams>,
) -> AppResult<Json<UserView>> {
    let user = state
        .services
        .loans
        .checkout(&params.email, &params.title, &params.isbn)
        .await?;
    Ok(Json(user))
}

/// Return a book held by a user
pub async fn return_book(
    State(state): State<AppState>,
    Query(params): Query<ReturnParams>,
) -> AppResult<Json<UserView>> {
    let user = state
        .services
        .loans
        .return_book(&params.email, &params.title, params.isbn.as_deref())
        .await?;
    Ok(Json(user))
}
