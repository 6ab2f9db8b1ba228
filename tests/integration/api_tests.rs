//! API integration tests
//!
//! Each test drives the full router in-process against a fresh in-memory database.

use axum::{
    body::Body,
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tower::ServiceExt;

use lab_inventory_server::{api, config::AppConfig, repository, AppState};

const PASSWORD: &str = "Str0ng!Pass";

async fn test_app() -> Router {
    test_app_with_pool().await.0
}

/// Router plus a handle on its database for tests that need to set up state directly
async fn test_app_with_pool() -> (Router, SqlitePool) {
    let pool = repository::connect_in_memory()
        .await
        .expect("Failed to open in-memory database");
    repository::migrate(&pool).await.expect("Failed to run migrations");

    let mut config = AppConfig::default();
    config.auth.jwt_secret = "integration-test-secret".to_string();
    config.auth.password_hash_memory_kib = 1024;
    config.auth.password_hash_iterations = 1;
    config.rate_limit.enabled = false;

    let state = AppState::new(config, pool.clone()).expect("Failed to build state");
    (api::create_router(state), pool)
}

struct TestResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Value,
}

async fn send(app: &Router, request: Request<Body>) -> TestResponse {
    let response = app.clone().oneshot(request).await.expect("Request failed");
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");

    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };

    TestResponse { status, headers, body }
}

async fn call(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> TestResponse {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("Failed to build request");

    send(app, request).await
}

async fn register(app: &Router, username: &str, email: &str) -> TestResponse {
    call(
        app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({
            "username": username,
            "email": email,
            "full_name": "Test User",
            "password": PASSWORD,
            "confirm_password": PASSWORD
        })),
    )
    .await
}

async fn login(app: &Router, username: &str, password: &str, remember_me: bool) -> TestResponse {
    call(
        app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({
            "username": username,
            "password": password,
            "remember_me": remember_me
        })),
    )
    .await
}

/// Register a fresh account and return a bearer token for it
async fn auth_token(app: &Router) -> String {
    let response = register(app, "labtech", "labtech@example.com").await;
    assert_eq!(response.status, StatusCode::CREATED);
    let response = login(app, "labtech", PASSWORD, false).await;
    assert_eq!(response.status, StatusCode::OK);
    response.body["access_token"]
        .as_str()
        .expect("No token in response")
        .to_string()
}

async fn create_equipment(app: &Router, token: &str, body: Value) -> Value {
    let response = call(app, Method::POST, "/api/equipment", Some(token), Some(body)).await;
    assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
    response.body
}

async fn get_equipment(app: &Router, token: &str, id: i64) -> Value {
    let response = call(app, Method::GET, &format!("/api/equipment/{}", id), Some(token), None).await;
    assert_eq!(response.status, StatusCode::OK);
    response.body
}

async fn upload_csv(app: &Router, token: &str, filename: &str, csv: &str) -> TestResponse {
    let boundary = "labinv-test-boundary";
    let body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{f}\"\r\nContent-Type: text/csv\r\n\r\n{csv}\r\n--{b}--\r\n",
        b = boundary,
        f = filename,
        csv = csv
    );
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/equipment/bulk-upload")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", boundary),
        )
        .body(Body::from(body))
        .expect("Failed to build request");
    send(app, request).await
}

fn remember_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with("remember_token="))
        .map(str::to_string)
}

fn cookie_request(uri: &str, cookie: &str) -> Request<Body> {
    let pair = cookie.split(';').next().unwrap_or_default();
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::COOKIE, pair)
        .body(Body::empty())
        .expect("Failed to build request")
}

#[tokio::test]
async fn test_health_check() {
    let app = test_app().await;
    let response = call(&app, Method::GET, "/api/health", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "healthy");
    assert_eq!(response.body["database"], "ok");
}

#[tokio::test]
async fn test_register_login_and_me() {
    let app = test_app().await;

    let response = register(&app, "alice", "alice@example.com").await;
    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body["user"]["username"], "alice");
    assert!(response.body["user"].get("password_hash").is_none());
    let code = response.body["recovery_code"].as_str().unwrap();
    assert_eq!(code.len(), 4);

    let response = login(&app, "alice", PASSWORD, false).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["token_type"], "bearer");
    assert!(remember_cookie(&response.headers).is_none());
    let token = response.body["access_token"].as_str().unwrap().to_string();

    let response = call(&app, Method::GET, "/api/auth/me", Some(&token), None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["username"], "alice");
    assert_eq!(response.body["email"], "alice@example.com");

    let response = call(&app, Method::GET, "/api/auth/me", None, None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let response = call(&app, Method::GET, "/api/auth/me", Some("garbage"), None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let app = test_app().await;
    register(&app, "alice", "alice@example.com").await;

    let wrong_password = login(&app, "alice", "Wr0ng!Pass", false).await;
    let unknown_user = login(&app, "mallory", PASSWORD, false).await;

    assert_eq!(wrong_password.status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_user.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password.body, unknown_user.body);
    assert_eq!(wrong_password.body["message"], "Invalid credentials");
}

#[tokio::test]
async fn test_inactive_account_is_locked_out() {
    let (app, pool) = test_app_with_pool().await;
    register(&app, "alice", "alice@example.com").await;

    let response = login(&app, "alice", PASSWORD, true).await;
    assert_eq!(response.status, StatusCode::OK);
    let token = response.body["access_token"].as_str().unwrap().to_string();
    let cookie = remember_cookie(&response.headers).expect("No remember-me cookie");

    let wrong_password = login(&app, "alice", "Wr0ng!Pass", false).await;
    assert_eq!(wrong_password.status, StatusCode::UNAUTHORIZED);

    sqlx::query("UPDATE accounts SET is_active = 0 WHERE username = ?")
        .bind("alice")
        .execute(&pool)
        .await
        .unwrap();

    let response = login(&app, "alice", PASSWORD, false).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body, wrong_password.body);

    let response = send(&app, cookie_request("/api/auth/auto-login", &cookie)).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body, wrong_password.body);

    let response = call(&app, Method::GET, "/api/auth/me", Some(&token), None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body, wrong_password.body);
}

#[tokio::test]
async fn test_duplicate_registration_is_rejected() {
    let app = test_app().await;

    let first = register(&app, "alice", "alice@example.com").await;
    assert_eq!(first.status, StatusCode::CREATED);

    let same_username = register(&app, "alice", "other@example.com").await;
    assert_eq!(same_username.status, StatusCode::BAD_REQUEST);

    let same_email = register(&app, "alice2", "alice@example.com").await;
    assert_eq!(same_email.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_weak_password_is_rejected() {
    let app = test_app().await;
    let response = call(
        &app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({
            "username": "weak",
            "email": "weak@example.com",
            "password": "password",
            "confirm_password": "password"
        })),
    )
    .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "BadValue");
}

#[tokio::test]
async fn test_remember_me_cookie_restores_session_until_logout() {
    let app = test_app().await;
    register(&app, "alice", "alice@example.com").await;

    let response = login(&app, "alice", PASSWORD, true).await;
    assert_eq!(response.status, StatusCode::OK);
    let cookie = remember_cookie(&response.headers).expect("No remember-me cookie");
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("SameSite=Lax"));
    assert!(cookie.contains("Max-Age=2592000"));

    let restored = send(&app, cookie_request("/api/auth/auto-login", &cookie)).await;
    assert_eq!(restored.status, StatusCode::OK);
    assert_eq!(restored.body["user"]["username"], "alice");

    // Not rotated: the same cookie works again
    let restored = send(&app, cookie_request("/api/auth/auto-login", &cookie)).await;
    assert_eq!(restored.status, StatusCode::OK);

    let logout = send(&app, cookie_request("/api/auth/logout", &cookie)).await;
    assert_eq!(logout.status, StatusCode::OK);
    let cleared = remember_cookie(&logout.headers).expect("Cookie not cleared");
    assert!(cleared.contains("Max-Age=0"));

    let restored = send(&app, cookie_request("/api/auth/auto-login", &cookie)).await;
    assert_eq!(restored.status, StatusCode::UNAUTHORIZED);

    // Idempotent
    let logout = send(&app, cookie_request("/api/auth/logout", &cookie)).await;
    assert_eq!(logout.status, StatusCode::OK);
}

#[tokio::test]
async fn test_auto_login_without_cookie_fails() {
    let app = test_app().await;
    let response = call(&app, Method::POST, "/api/auth/auto-login", None, None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_forgot_password_does_not_reveal_accounts() {
    let app = test_app().await;
    register(&app, "alice", "alice@example.com").await;

    let known = call(
        &app,
        Method::POST,
        "/api/auth/forgot-password",
        None,
        Some(json!({ "email": "alice@example.com" })),
    )
    .await;
    let unknown = call(
        &app,
        Method::POST,
        "/api/auth/forgot-password",
        None,
        Some(json!({ "email": "nobody@example.com" })),
    )
    .await;

    assert_eq!(known.status, StatusCode::OK);
    assert_eq!(known.status, unknown.status);
    assert_eq!(known.body, unknown.body);
}

#[tokio::test]
async fn test_password_reset_rotates_recovery_code() {
    let app = test_app().await;
    let response = register(&app, "bob", "bob@example.com").await;
    let code = response.body["recovery_code"].as_str().unwrap().to_string();

    let response = call(
        &app,
        Method::POST,
        "/api/auth/verify-recovery-code",
        None,
        Some(json!({ "email": "bob@example.com", "recovery_code": code })),
    )
    .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["valid"], true);

    let reset_body = json!({
        "email": "bob@example.com",
        "recovery_code": code,
        "new_password": "N3w!Password",
        "confirm_new_password": "N3w!Password"
    });
    let response = call(&app, Method::POST, "/api/auth/reset-password", None, Some(reset_body.clone())).await;
    assert_eq!(response.status, StatusCode::OK);

    assert_eq!(login(&app, "bob", PASSWORD, false).await.status, StatusCode::UNAUTHORIZED);
    assert_eq!(login(&app, "bob", "N3w!Password", false).await.status, StatusCode::OK);

    // The used code is gone
    let response = call(
        &app,
        Method::POST,
        "/api/auth/verify-recovery-code",
        None,
        Some(json!({ "email": "bob@example.com", "recovery_code": code })),
    )
    .await;
    assert_eq!(response.body["valid"], false);

    let response = call(&app, Method::POST, "/api/auth/reset-password", None, Some(reset_body)).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let app = test_app().await;
    for uri in ["/api/equipment", "/api/issues", "/api/maintenance", "/api/equipment/export"] {
        let response = call(&app, Method::GET, uri, None, None).await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED, "{}", uri);
    }
}

#[tokio::test]
async fn test_issue_reserves_and_return_releases_stock() {
    let app = test_app().await;
    let token = auth_token(&app).await;

    let item = create_equipment(
        &app,
        &token,
        json!({ "name": "Oscilloscope", "code": "EQ1", "total_qty": 10, "available_qty": 10 }),
    )
    .await;
    let id = item["id"].as_i64().unwrap();

    let response = call(
        &app,
        Method::POST,
        "/api/issues",
        Some(&token),
        Some(json!({ "equipment_id": id, "issued_to": "Student A", "issued_lab": "Physics Lab", "quantity": 4 })),
    )
    .await;
    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body["status"], "issued");
    let issue_id = response.body["id"].as_i64().unwrap();
    assert_eq!(get_equipment(&app, &token, id).await["available_qty"], 6);

    let response = call(
        &app,
        Method::POST,
        "/api/issues",
        Some(&token),
        Some(json!({ "equipment_id": id, "issued_to": "Student B", "issued_lab": "Physics Lab", "quantity": 7 })),
    )
    .await;
    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(response.body["error"], "InsufficientStock");
    assert_eq!(get_equipment(&app, &token, id).await["available_qty"], 6);

    let response = call(
        &app,
        Method::POST,
        &format!("/api/issues/{}/return", issue_id),
        Some(&token),
        Some(json!({ "return_date": "2026-03-10" })),
    )
    .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "returned");
    assert_eq!(response.body["return_date"], "2026-03-10");
    assert_eq!(get_equipment(&app, &token, id).await["available_qty"], 10);

    let response = call(
        &app,
        Method::POST,
        &format!("/api/issues/{}/return", issue_id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_issue_status_patch_and_delete_release_stock() {
    let app = test_app().await;
    let token = auth_token(&app).await;
    let item = create_equipment(
        &app,
        &token,
        json!({ "name": "Multimeter", "code": "MM1", "total_qty": 5 }),
    )
    .await;
    let id = item["id"].as_i64().unwrap();

    let issue = |qty: i64| json!({ "equipment_id": id, "issued_to": "Dr. Rao", "issued_lab": "EE Lab", "quantity": qty });

    let first = call(&app, Method::POST, "/api/issues", Some(&token), Some(issue(2))).await;
    let first_id = first.body["id"].as_i64().unwrap();
    let second = call(&app, Method::POST, "/api/issues", Some(&token), Some(issue(3))).await;
    let second_id = second.body["id"].as_i64().unwrap();
    assert_eq!(get_equipment(&app, &token, id).await["available_qty"], 0);

    let response = call(
        &app,
        Method::PUT,
        &format!("/api/issues/{}", first_id),
        Some(&token),
        Some(json!({ "status": "returned", "issued_lab": "EE Lab 2" })),
    )
    .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["issued_lab"], "EE Lab 2");
    assert_eq!(get_equipment(&app, &token, id).await["available_qty"], 2);

    let response = call(
        &app,
        Method::PUT,
        &format!("/api/issues/{}", first_id),
        Some(&token),
        Some(json!({ "status": "issued" })),
    )
    .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = call(&app, Method::DELETE, &format!("/api/issues/{}", second_id), Some(&token), None).await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);
    assert_eq!(get_equipment(&app, &token, id).await["available_qty"], 5);
}

#[tokio::test]
async fn test_same_code_merges_quantities() {
    let app = test_app().await;
    let token = auth_token(&app).await;

    let first = create_equipment(
        &app,
        &token,
        json!({ "name": "Resistor 10k", "code": "R100", "total_qty": 5, "status": "available" }),
    )
    .await;
    let second = create_equipment(
        &app,
        &token,
        json!({ "name": "Resistor 10k", "code": "R100", "total_qty": 3, "status": "faulty" }),
    )
    .await;

    assert_eq!(first["id"], second["id"]);
    assert_eq!(second["total_qty"], 8);
    assert_eq!(second["available_qty"], 8);
    assert_eq!(second["status"], "faulty");

    let list = call(&app, Method::GET, "/api/equipment", Some(&token), None).await;
    assert_eq!(list.body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_equipment_update_keeps_quantities_consistent() {
    let app = test_app().await;
    let token = auth_token(&app).await;
    let item = create_equipment(&app, &token, json!({ "name": "Soldering iron", "code": "SI1", "total_qty": 4 })).await;
    create_equipment(&app, &token, json!({ "name": "Breadboard", "code": "BB1", "total_qty": 9 })).await;
    let uri = format!("/api/equipment/{}", item["id"]);

    let response = call(&app, Method::PUT, &uri, Some(&token), Some(json!({ "lab": "Workshop" }))).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["lab"], "Workshop");
    assert_eq!(response.body["name"], "Soldering iron");

    let response = call(&app, Method::PUT, &uri, Some(&token), Some(json!({ "available_qty": 5 }))).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = call(&app, Method::PUT, &uri, Some(&token), Some(json!({ "code": "BB1" }))).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = call(&app, Method::PUT, "/api/equipment/9999", Some(&token), Some(json!({ "lab": "X" }))).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_equipment_with_outstanding_issues() {
    let app = test_app().await;
    let token = auth_token(&app).await;
    let item = create_equipment(&app, &token, json!({ "name": "Signal generator", "code": "SG1", "total_qty": 2 })).await;
    let id = item["id"].as_i64().unwrap();
    call(
        &app,
        Method::POST,
        "/api/issues",
        Some(&token),
        Some(json!({ "equipment_id": id, "issued_to": "Student C", "issued_lab": "Comms Lab", "quantity": 1 })),
    )
    .await;

    let uri = format!("/api/equipment/{}", id);
    let response = call(&app, Method::DELETE, &uri, Some(&token), None).await;
    assert_eq!(response.status, StatusCode::CONFLICT);

    let response = call(&app, Method::DELETE, &format!("{}?force=true", uri), Some(&token), None).await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);

    let response = call(&app, Method::DELETE, &uri, Some(&token), None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_bulk_upload_rejects_whole_batch() {
    let app = test_app().await;
    let token = auth_token(&app).await;

    let csv = "name,code,category,lab,total_qty,status\n\
        Resistor 1k,R1,Resistor,Main Lab,50,available\n\
        Resistor 2k,R2,Resistor,Main Lab,40,available\n\
        Capacitor,C1,Capacitor,Main Lab,-5,available\n\
        LED,L1,Diode,Main Lab,100,available\n\
        NE555,IC1,IC,Main Lab,20,available\n\
        Screwdriver,T1,Tool,Workshop,3,available";

    let response = upload_csv(&app, &token, "stock.csv", csv).await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    let details = response.body["details"].as_array().unwrap();
    assert_eq!(details.len(), 1);
    assert!(details[0].as_str().unwrap().starts_with("Line 4:"));

    let list = call(&app, Method::GET, "/api/equipment", Some(&token), None).await;
    assert_eq!(list.body, json!([]));
}

#[tokio::test]
async fn test_bulk_upload_imports_and_merges() {
    let app = test_app().await;
    let token = auth_token(&app).await;
    create_equipment(&app, &token, json!({ "name": "Resistor 1k", "code": "R1", "total_qty": 10 })).await;

    let csv = "Name,Code,Total_Qty,Status\nResistor 1k,R1,5,Available\nJumper wires,JW1,200,\n";
    let response = upload_csv(&app, &token, "stock.CSV", csv).await;
    assert_eq!(response.status, StatusCode::OK, "{}", response.body);
    assert_eq!(response.body["imported"], 2);
    assert_eq!(response.body["created"], 1);
    assert_eq!(response.body["merged"], 1);

    let list = call(&app, Method::GET, "/api/equipment", Some(&token), None).await;
    let items = list.body.as_array().unwrap();
    let jumper = items.iter().find(|i| i["code"] == "JW1").unwrap();
    assert_eq!(jumper["category"], "General");
    assert_eq!(jumper["lab"], "Main Lab");
    let resistor = items.iter().find(|i| i["code"] == "R1").unwrap();
    assert_eq!(resistor["total_qty"], 15);
}

#[tokio::test]
async fn test_bulk_upload_requires_csv_file() {
    let app = test_app().await;
    let token = auth_token(&app).await;
    let response = upload_csv(&app, &token, "stock.xlsx", "name,code,total_qty\nA,A1,1").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_exports_are_csv_attachments() {
    let app = test_app().await;
    let token = auth_token(&app).await;
    let item = create_equipment(
        &app,
        &token,
        json!({ "name": "Power supply", "code": "PS1", "category": "Instrument", "lab": "EE Lab", "total_qty": 3 }),
    )
    .await;

    let response = call(&app, Method::GET, "/api/equipment/export", Some(&token), None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.headers[header::CONTENT_TYPE].to_str().unwrap().starts_with("text/csv"));
    assert!(response.headers[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .contains("equipment.csv"));
    let text = response.body.as_str().unwrap();
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("ID,Name,Code,Category,Lab,Total,Available,Status"));
    assert_eq!(
        lines.next(),
        Some(format!("{},Power supply,PS1,Instrument,EE Lab,3,3,available", item["id"]).as_str())
    );

    let response = call(&app, Method::GET, "/api/issues/export", Some(&token), None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.as_str().unwrap().starts_with("ID,Equipment ID,Issued To,Lab,Quantity"));
}

#[tokio::test]
async fn test_maintenance_lifecycle() {
    let app = test_app().await;
    let token = auth_token(&app).await;
    let item = create_equipment(&app, &token, json!({ "name": "Microscope", "code": "MS1", "total_qty": 1 })).await;

    let response = call(
        &app,
        Method::POST,
        "/api/maintenance",
        Some(&token),
        Some(json!({ "equipment_id": 4242, "fault_description": "Broken lens", "fault_date": "2026-03-02" })),
    )
    .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = call(
        &app,
        Method::POST,
        "/api/maintenance",
        Some(&token),
        Some(json!({ "equipment_id": item["id"], "fault_description": "Broken lens", "fault_date": "2026-03-02" })),
    )
    .await;
    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body["status"], "pending");
    assert_eq!(response.body["cost"], 0.0);
    let uri = format!("/api/maintenance/{}", response.body["id"]);

    let response = call(
        &app,
        Method::PUT,
        &uri,
        Some(&token),
        Some(json!({ "status": "completed", "return_from_repair_date": "2026-03-20", "cost": 45.5 })),
    )
    .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "completed");
    assert_eq!(response.body["fault_description"], "Broken lens");

    let response = call(&app, Method::GET, "/api/maintenance/export", Some(&token), None).await;
    let text = response.body.as_str().unwrap();
    assert!(text.contains("Broken lens,2026-03-02,,2026-03-20,completed,45.50,"));

    let response = call(&app, Method::DELETE, &uri, Some(&token), None).await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);
    let response = call(&app, Method::GET, &uri, Some(&token), None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}
