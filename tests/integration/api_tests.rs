//! API integration tests
//!
//! These run against a live server backed by PostgreSQL:
//! `cargo test --test api_tests -- --ignored`

use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api/v1";

/// Suffix that keeps ISBNs and emails unique across runs
fn unique(prefix: &str) -> String {
    format!("{}-{}", prefix, chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default())
}

async fn create_book(client: &Client, isbn: &str, title: &str) -> reqwest::Response {
    client
        .post(format!("{}/books", BASE_URL))
        .json(&json!({
            "isbn": isbn,
            "title": title,
            "genre": "Fantasy",
            "author": "Tolkien",
            "language": "EN",
            "price": "12.50"
        }))
        .send()
        .await
        .expect("Failed to send request")
}

async fn create_user(client: &Client, email: &str) {
    let response = client
        .post(format!("{}/users", BASE_URL))
        .json(&json!({
            "name": "Bilbo",
            "surname": "Baggins",
            "email": email
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CREATED);
}

async fn checkout(client: &Client, email: &str, title: &str, isbn: &str) -> reqwest::Response {
    client
        .patch(format!("{}/users/checkout", BASE_URL))
        .query(&[("email", email), ("title", title), ("isbn", isbn)])
        .send()
        .await
        .expect("Failed to send request")
}

async fn delete_book(client: &Client, isbn: &str) {
    let _ = client
        .delete(format!("{}/books/{}", BASE_URL, isbn))
        .send()
        .await;
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_create_book_with_invalid_price() {
    let client = Client::new();

    let response = client
        .post(format!("{}/books/create", BASE_URL))
        .query(&[
            ("title", "Zero"),
            ("type", "Essay"),
            ("author", "Nobody"),
            ("language", "EN"),
            ("price", "0"),
        ])
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"], "InvalidPrice");
}

#[tokio::test]
#[ignore]
async fn test_duplicate_isbn_is_rejected() {
    let client = Client::new();
    let isbn = unique("dup");

    assert_eq!(create_book(&client, &isbn, "First").await.status(), StatusCode::CREATED);

    let response = create_book(&client, &isbn, "Second").await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    delete_book(&client, &isbn).await;
}

#[tokio::test]
#[ignore]
async fn test_partial_update_keeps_other_fields() {
    let client = Client::new();
    let isbn = unique("patch");

    let created: Value = create_book(&client, &isbn, "Old title")
        .await
        .json()
        .await
        .expect("Failed to parse response");

    let updated: Value = client
        .patch(format!("{}/books/{}", BASE_URL, isbn))
        .json(&json!({ "title": "New title" }))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");

    assert_eq!(updated["title"], "New title");
    for field in ["isbn", "genre", "author", "language", "price"] {
        assert_eq!(updated[field], created[field], "field {} changed", field);
    }

    delete_book(&client, &isbn).await;
}

#[tokio::test]
#[ignore]
async fn test_sixth_checkout_fails() {
    let client = Client::new();
    let email = format!("{}@shire.me", unique("max"));
    create_user(&client, &email).await;

    let isbns: Vec<String> = (0..6).map(|i| unique(&format!("max{}", i))).collect();
    for isbn in &isbns {
        assert_eq!(create_book(&client, isbn, "Loanable").await.status(), StatusCode::CREATED);
    }

    for isbn in &isbns[..5] {
        assert_eq!(checkout(&client, &email, "Loanable", isbn).await.status(), StatusCode::OK);
    }

    let response = checkout(&client, &email, "Loanable", &isbns[5]).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"], "MaxBooksReached");

    let _ = client
        .delete(format!("{}/users/delete", BASE_URL))
        .query(&[("email", &email)])
        .send()
        .await;
    for isbn in &isbns {
        delete_book(&client, isbn).await;
    }
}

#[tokio::test]
#[ignore]
async fn test_return_book_not_held() {
    let client = Client::new();
    let email = format!("{}@shire.me", unique("ret"));
    create_user(&client, &email).await;

    let response = client
        .patch(format!("{}/users/return", BASE_URL))
        .query(&[("email", email.as_str()), ("title", "Never borrowed")])
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"], "NotInPossession");

    let _ = client
        .delete(format!("{}/users/delete", BASE_URL))
        .query(&[("email", &email)])
        .send()
        .await;
}

#[tokio::test]
#[ignore]
async fn test_delete_user_releases_books() {
    let client = Client::new();
    let email = format!("{}@shire.me", unique("del"));
    create_user(&client, &email).await;

    let isbns = [unique("del0"), unique("del1")];
    for isbn in &isbns {
        create_book(&client, isbn, "Borrowed").await;
        assert_eq!(checkout(&client, &email, "Borrowed", isbn).await.status(), StatusCode::OK);
    }

    let response = client
        .delete(format!("{}/users/delete", BASE_URL))
        .query(&[("email", &email)])
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    for isbn in &isbns {
        let book: Value = client
            .get(format!("{}/books/{}", BASE_URL, isbn))
            .send()
            .await
            .expect("Failed to send request")
            .json()
            .await
            .expect("Failed to parse response");
        assert_eq!(book["owner"], Value::Null);
        delete_book(&client, isbn).await;
    }

    let response = client
        .get(format!("{}/users/find", BASE_URL))
        .query(&[("email", &email)])
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
