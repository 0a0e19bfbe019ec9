//! Remote feed imports against a local HTTP server on an ephemeral port.

use std::net::SocketAddr;
use std::time::Duration;

use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use workforce::{EmployeeRepository, FeedClient, FeedFallback, ImportOptions, ImportPipeline, JobTitle, SourceError};

async fn users() -> Json<Value> {
    Json(json!([
        {
            "id": 1,
            "name": "Leanne Graham",
            "username": "Bret",
            "email": "Sincere@april.biz",
            "company": { "name": "Romaguera-Crona", "catchPhrase": "Multi-layered client-server neural-net" }
        },
        {
            "id": 2,
            "name": "Ervin Howell",
            "email": "Shanna@melissa.tv",
            "company": { "name": "Deckow-Crist" }
        },
        {
            "id": 3,
            "name": "Clementine Bauch",
            "email": "Nathan@yesenia.net"
        },
        {
            "id": 4,
            "name": "Patricia Lebsack",
            "email": "SINCERE@april.biz",
            "company": { "name": "Robel-Corkery" }
        }
    ]))
}

async fn not_a_list() -> Json<Value> {
    Json(json!({ "users": [] }))
}

async fn unavailable() -> StatusCode {
    StatusCode::SERVICE_UNAVAILABLE
}

async fn slow() -> Json<Value> {
    tokio::time::sleep(Duration::from_secs(5)).await;
    Json(json!([]))
}

async fn spawn_feed_server() -> SocketAddr {
    let app = Router::new()
        .route("/users", get(users))
        .route("/object", get(not_a_list))
        .route("/down", get(unavailable))
        .route("/slow", get(slow));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

#[tokio::test]
async fn feed_elements_are_imported_with_fallback() {
    let addr = spawn_feed_server().await;
    let client = FeedClient::new(format!("http://{addr}/users"));

    let mut repository = EmployeeRepository::new();
    let summary = ImportPipeline::new(&mut repository).import_feed(&client).await;

    assert_eq!(summary.imported_count(), 2, "{:?}", summary.errors());
    assert_eq!(summary.errors().len(), 2);
    assert!(summary.errors()[0].starts_with("record 3: malformed record"));
    assert_eq!(summary.errors()[1], "record 4: email 'SINCERE@april.biz' already exists");

    let leanne = repository.find_by_email("sincere@april.biz").unwrap();
    assert_eq!(leanne.first_name, "Leanne");
    assert_eq!(leanne.last_name, "Graham");
    assert_eq!(leanne.company_name, "Romaguera-Crona");
    assert_eq!(leanne.job_title, "Developer");
    assert_eq!(leanne.salary, 8000.0);
}

#[tokio::test]
async fn configured_fallback_is_used() {
    let addr = spawn_feed_server().await;
    let client = FeedClient::new(format!("http://{addr}/users"));

    let mut repository = EmployeeRepository::new();
    let options = ImportOptions {
        fallback: FeedFallback {
            job_title: JobTitle::Intern,
            salary: 3000.0,
        },
        ..ImportOptions::default()
    };
    ImportPipeline::with_options(&mut repository, options)
        .import_feed(&client)
        .await;

    let ervin = repository.find_by_email("shanna@melissa.tv").unwrap();
    assert_eq!(ervin.job_title, "Intern");
    assert_eq!(ervin.salary, 3000.0);
}

#[tokio::test]
async fn non_success_status_fails_the_batch() {
    let addr = spawn_feed_server().await;
    let client = FeedClient::new(format!("http://{addr}/down"));

    assert!(matches!(client.fetch().await, Err(SourceError::Http(503))));

    let mut repository = EmployeeRepository::new();
    let summary = ImportPipeline::new(&mut repository).import_feed(&client).await;
    assert_eq!(summary.imported_count(), 0);
    assert_eq!(summary.errors(), ["feed returned HTTP 503"]);
}

#[tokio::test]
async fn object_body_fails_the_batch() {
    let addr = spawn_feed_server().await;
    let client = FeedClient::new(format!("http://{addr}/object"));

    let mut repository = EmployeeRepository::new();
    let summary = ImportPipeline::new(&mut repository).import_feed(&client).await;
    assert_eq!(summary.imported_count(), 0);
    assert_eq!(summary.errors().len(), 1);
    assert!(summary.errors()[0].starts_with("invalid payload"));
}

#[tokio::test]
async fn timeout_fails_the_batch() {
    let addr = spawn_feed_server().await;
    let client = FeedClient::new(format!("http://{addr}/slow")).with_timeout(Duration::from_secs(1));

    assert!(matches!(client.fetch().await, Err(SourceError::Timeout(1))));
}

#[tokio::test]
async fn unreachable_host_fails_the_batch() {
    // bind then drop to get a port nobody listens on
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = FeedClient::new(format!("http://{addr}/users")).with_timeout(Duration::from_secs(2));
    let mut repository = EmployeeRepository::new();
    let summary = ImportPipeline::new(&mut repository).import_feed(&client).await;

    assert_eq!(summary.imported_count(), 0);
    assert_eq!(summary.errors().len(), 1);
    assert!(repository.is_empty());
}
