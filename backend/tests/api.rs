//! Router tests driven through `tower::ServiceExt::oneshot`.

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;
use workforce::server::{create_router, AppState};
use workforce::{Employee, EmployeeRepository};

fn seeded_state() -> AppState {
    let repository = EmployeeRepository::with_employees(vec![
        Employee::new("Anna", "Nowak", "anna@firmaa.pl", "FirmaA", "Developer", 8000.0),
        Employee::new("Bartek", "Lis", "bartek@firmab.pl", "FirmaB", "Developer", 8000.0),
        Employee::new("Celina", "Wrona", "celina@firmaa.pl", "FirmaA", "Manager", 12000.0),
    ])
    .unwrap();
    AppState::new(repository)
}

fn app() -> Router {
    create_router(seeded_state())
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn with_json(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn upload(uri: &str, file_name: &str, content: &str) -> Request<Body> {
    let boundary = "workforce-test-boundary";
    let body = format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\n\
         Content-Type: application/octet-stream\r\n\r\n\
         {content}\r\n\
         --{boundary}--\r\n"
    );
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn health_reports_employee_count() {
    let (status, body) = send(app(), get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["employees"], 3);
}

#[tokio::test]
async fn list_and_find_employees() {
    let (status, body) = send(app(), get("/api/employees")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 3);
    assert_eq!(body[0]["email"], "anna@firmaa.pl");
    assert_eq!(body[0]["position"], "Developer");

    let (status, body) = send(app(), get("/api/employees/ANNA@firmaa.pl")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["firstName"], "Anna");

    let (status, body) = send(app(), get("/api/employees/nobody@x.pl")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not_found");
}

#[tokio::test]
async fn create_employee_sets_location() {
    let request = with_json(
        Method::POST,
        "/api/employees",
        json!({
            "firstName": "Dawid",
            "lastName": "Kos",
            "email": "dawid@firmab.pl",
            "company": "FirmaB",
            "position": "Intern",
            "salary": 3000
        }),
    );
    let response = app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(
        response.headers()[header::LOCATION],
        "/api/employees/dawid@firmab.pl"
    );
}

#[tokio::test]
async fn create_rejects_duplicates_and_blank_fields() {
    let state = seeded_state();

    let duplicate = with_json(
        Method::POST,
        "/api/employees",
        json!({
            "firstName": "Anna",
            "lastName": "Inna",
            "email": "ANNA@FIRMAA.PL",
            "company": "FirmaA",
            "position": "Intern",
            "salary": 3000
        }),
    );
    let (status, body) = send(create_router(state.clone()), duplicate).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "duplicate_email");

    let blank = with_json(
        Method::POST,
        "/api/employees",
        json!({
            "firstName": " ",
            "lastName": "Kos",
            "email": "kos@firmab.pl",
            "company": "FirmaB",
            "position": "Intern",
            "salary": 3000
        }),
    );
    let (status, body) = send(create_router(state.clone()), blank).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "blank_field");

    assert_eq!(state.repository.read().await.len(), 3);
}

#[tokio::test]
async fn update_and_delete() {
    let state = seeded_state();

    let request = with_json(
        Method::PUT,
        "/api/employees/bartek@firmab.pl",
        json!({ "salary": 9500 }),
    );
    let (status, body) = send(create_router(state.clone()), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["salary"], 9500.0);

    let request = with_json(
        Method::PUT,
        "/api/employees/bartek@firmab.pl",
        json!({ "salary": -1 }),
    );
    let (status, _) = send(create_router(state.clone()), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let request = Request::builder()
        .method(Method::DELETE)
        .uri("/api/employees/bartek@firmab.pl")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(create_router(state.clone()), request).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(create_router(state.clone()), get("/api/employees/bartek@firmab.pl")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let request = Request::builder()
        .method(Method::DELETE)
        .uri("/api/employees/bartek@firmab.pl")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(create_router(state), request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn status_changes_and_counts() {
    let state = seeded_state();

    let request = with_json(
        Method::PATCH,
        "/api/employees/celina@firmaa.pl/status",
        json!({ "status": "on_leave" }),
    );
    let (status, body) = send(create_router(state.clone()), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ON_LEAVE");

    let (_, body) = send(create_router(state.clone()), get("/api/employees/status/ON_LEAVE")).await;
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (_, body) = send(create_router(state.clone()), get("/api/statistics/status")).await;
    assert_eq!(body, json!({ "ACTIVE": 2, "ON_LEAVE": 1, "TERMINATED": 0 }));

    let request = with_json(
        Method::PATCH,
        "/api/employees/celina@firmaa.pl/status",
        json!({ "status": "retired" }),
    );
    let (status, _) = send(create_router(state), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn company_queries_and_statistics() {
    let (_, body) = send(app(), get("/api/employees/company/firmaa")).await;
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["firstName"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["Anna", "Celina"]);

    let (_, body) = send(app(), get("/api/statistics/companies")).await;
    assert_eq!(body["FirmaA"]["employeeCount"], 2);
    assert_eq!(body["FirmaA"]["averageSalary"], 10000.0);
    assert_eq!(body["FirmaA"]["maxSalary"], 12000.0);
    assert_eq!(body["FirmaB"]["employeeCount"], 1);

    let (status, body) = send(app(), get("/api/statistics/company/FirmaB")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["averageSalary"], 8000.0);

    let (status, _) = send(app(), get("/api/statistics/company/FirmaC")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = send(app(), get("/api/statistics/salary/average?company=FirmaA")).await;
    assert_eq!(body["averageSalary"], 10000.0);
    assert_eq!(body["company"], "FirmaA");

    let (_, body) = send(app(), get("/api/statistics/positions")).await;
    assert_eq!(body, json!({ "Developer": 2, "Manager": 1 }));
}

#[tokio::test]
async fn csv_upload_reports_partial_failures() {
    let state = AppState::new(EmployeeRepository::new());
    let content = "firstName,lastName,email,company,jobTitle,salary\n\
                   Jan,Kowalski,jan@firma.com,Firma,Developer,8000\n\
                   Anna,Nowak,anna@firma.com,Firma,CEO,30000";

    let (status, body) = send(
        create_router(state.clone()),
        upload("/api/import/csv", "staff.csv", content),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "warning");
    assert_eq!(body["source"], "staff.csv");
    assert_eq!(body["importedCount"], 1);
    assert_eq!(body["errors"], json!(["record 2: unknown job title 'CEO'"]));
    assert_eq!(body["importedEmployees"][0]["email"], "jan@firma.com");
    assert!(body["jobId"].is_string());

    assert_eq!(state.repository.read().await.len(), 1);
}

#[tokio::test]
async fn xml_upload() {
    let state = AppState::new(EmployeeRepository::new());
    let content = "<employees><employee>\
                   <firstName>Jan</firstName><lastName>Kowalski</lastName>\
                   <email>jan@firma.com</email><company>Firma</company>\
                   <jobTitle>Manager</jobTitle><salary>12000</salary>\
                   </employee></employees>";

    let (status, body) = send(
        create_router(state.clone()),
        upload("/api/import/xml", "staff.xml", content),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
    assert_eq!(body["importedCount"], 1);
}

#[tokio::test]
async fn feed_import_without_url_is_bad_request() {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/import/feed")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(app(), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "bad_request");
}
