//! API handlers for Libris REST endpoints

pub mod books;
pub mod health;
pub mod users;

use axum::{
    routing::{get, patch, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::AppState;

/// Create the application router with all routes
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_v1 = Router::new()
        .route("/health", get(health::health_check))
        // Books
        .route("/books", post(books::create_book))
        .route("/books/create", post(books::create_book_params))
        .route("/books/find", get(books::find_book))
        .route("/books/modify", patch(books::update_book_params))
        .route(
            "/books/:isbn",
            get(books::get_book)
                .patch(books::update_book)
                .delete(books::delete_book),
        )
        // Users
        .route("/users", post(users::create_user))
        .route("/users/create", post(users::create_user_params))
        .route("/users/find", get(users::find_user))
        .route("/users/modify/json", patch(users::update_user))
        .route("/users/modify/param", patch(users::update_user_params))
        .route("/users/delete", axum::routing::delete(users::delete_user))
        // Ownership
        .route("/users/checkout", patch(users::checkout_book))
        .route("/users/return", patch(users::return_book))
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_v1)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
