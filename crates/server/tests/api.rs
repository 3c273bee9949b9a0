use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use jsonwebtoken::{EncodingKey, Header, encode};
use sea_orm::Database;
use serde_json::{Value, json};
use tower::ServiceExt;

use engine::Engine;
use migration::MigratorTrait;
use server::{AuthError, IdentityVerifier, JwtVerifier, ServerState, router, run};

/// Treats the bearer token itself as the user id.
struct PlainVerifier;

impl IdentityVerifier for PlainVerifier {
    fn verify(&self, token: &str) -> Result<String, AuthError> {
        if token.is_empty() {
            return Err(AuthError::InvalidToken);
        }
        Ok(token.to_string())
    }
}

async fn engine() -> Engine {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    Engine::builder().database(db).build().await.unwrap()
}

async fn app() -> Router {
    let app = router(ServerState::new(engine().await, PlainVerifier));
    let (status, _) = call(
        &app,
        "PUT",
        "/users/me",
        Some("alice"),
        Some(json!({"email": "alice@example.com", "name": "Alice"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    app
}

async fn call(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

async fn open_account(app: &Router, name: &str, balance: &str) -> String {
    let (status, body) = call(
        app,
        "POST",
        "/accounts",
        Some("alice"),
        Some(json!({"name": name, "balance": balance, "color": "#fff", "icon": "bank"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_string()
}

async fn balance_of(app: &Router, account_id: &str) -> Value {
    let (status, body) = call(
        app,
        "GET",
        &format!("/accounts/{account_id}"),
        Some("alice"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["balance"].clone()
}

#[tokio::test]
async fn health_needs_no_token() {
    let app = router(ServerState::new(engine().await, PlainVerifier));
    let (status, _) = call(&app, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn protected_routes_require_bearer() {
    let app = app().await;
    let (status, body) = call(&app, "GET", "/accounts", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "missing or invalid authorization header");
}

#[tokio::test]
async fn jwt_verifier_guards_the_router() {
    #[derive(serde::Serialize)]
    struct Claims {
        sub: &'static str,
        exp: u64,
    }

    let app = router(ServerState::new(engine().await, JwtVerifier::new("s3cret")));
    let good = encode(
        &Header::default(),
        &Claims {
            sub: "alice",
            exp: 4_102_444_800,
        },
        &EncodingKey::from_secret(b"s3cret"),
    )
    .unwrap();

    let (status, body) = call(
        &app,
        "PUT",
        "/users/me",
        Some(&good),
        Some(json!({"email": "alice@example.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], "alice");

    let (status, body) = call(&app, "GET", "/accounts", Some("forged"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "invalid token");
}

#[tokio::test]
async fn transactions_keep_balances_in_sync() {
    let app = app().await;
    let checking = open_account(&app, "Checking", "1000.00").await;
    let savings = open_account(&app, "Savings", "0").await;

    let (status, created) = call(
        &app,
        "POST",
        "/transactions",
        Some("alice"),
        Some(json!({
            "amount": "150,50",
            "type": "EXPENSE",
            "accountId": checking,
            "date": "2024-05-01T10:00:00+02:00",
            "description": "Groceries",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["amount"], "150.50");
    assert_eq!(balance_of(&app, &checking).await, "849.50");
    let tx_id = created["id"].as_str().unwrap().to_string();

    let (status, updated) = call(
        &app,
        "PUT",
        &format!("/transactions/{tx_id}"),
        Some("alice"),
        Some(json!({"type": "INCOME", "accountId": savings, "amount": 200})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["type"], "INCOME");
    assert_eq!(updated["description"], "Groceries");
    assert_eq!(balance_of(&app, &checking).await, "1000.00");
    assert_eq!(balance_of(&app, &savings).await, "200.00");

    let (status, _) = call(
        &app,
        "DELETE",
        &format!("/transactions/{tx_id}"),
        Some("alice"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(balance_of(&app, &savings).await, "0.00");

    let (status, _) = call(
        &app,
        "DELETE",
        &format!("/transactions/{tx_id}"),
        Some("alice"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invalid_input_maps_to_client_errors() {
    let app = app().await;
    let checking = open_account(&app, "Checking", "0").await;

    let (status, _) = call(
        &app,
        "POST",
        "/transactions",
        Some("alice"),
        Some(json!({
            "amount": "0",
            "type": "INCOME",
            "accountId": checking,
            "date": "2024-05-01T10:00:00Z",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = call(
        &app,
        "POST",
        "/transactions",
        Some("alice"),
        Some(json!({
            "amount": "10.999",
            "type": "INCOME",
            "accountId": checking,
            "date": "2024-05-01T10:00:00Z",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = call(
        &app,
        "POST",
        "/transactions",
        Some("alice"),
        Some(json!({
            "amount": "10",
            "type": "INCOME",
            "accountId": "00000000-0000-0000-0000-000000000000",
            "date": "2024-05-01T10:00:00Z",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].is_string());

    let (status, _) = call(&app, "GET", "/accounts/not-a-uuid", Some("alice"), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = call(&app, "GET", "/transactions?limit=500", Some("alice"), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert_eq!(balance_of(&app, &checking).await, "0.00");
}

#[tokio::test]
async fn other_users_see_not_found() {
    let app = app().await;
    let checking = open_account(&app, "Checking", "0").await;
    call(
        &app,
        "PUT",
        "/users/me",
        Some("bob"),
        Some(json!({"email": "bob@example.com"})),
    )
    .await;

    let (status, _) = call(
        &app,
        "GET",
        &format!("/accounts/{checking}"),
        Some("bob"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = call(&app, "GET", "/accounts", Some("bob"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn category_id_can_be_kept_or_cleared() {
    let app = app().await;
    let checking = open_account(&app, "Checking", "0").await;
    let (status, food) = call(
        &app,
        "POST",
        "/categories",
        Some("alice"),
        Some(json!({"name": "Food", "type": "EXPENSE"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let food_id = food["id"].as_str().unwrap().to_string();

    let (_, created) = call(
        &app,
        "POST",
        "/transactions",
        Some("alice"),
        Some(json!({
            "amount": "12",
            "type": "EXPENSE",
            "accountId": checking,
            "date": "2024-05-01T10:00:00Z",
            "categoryId": food_id,
        })),
    )
    .await;
    let tx_uri = format!("/transactions/{}", created["id"].as_str().unwrap());

    let (_, kept) = call(
        &app,
        "PUT",
        &tx_uri,
        Some("alice"),
        Some(json!({"description": "Lunch"})),
    )
    .await;
    assert_eq!(kept["categoryId"], json!(food_id));

    let (_, cleared) = call(
        &app,
        "PUT",
        &tx_uri,
        Some("alice"),
        Some(json!({"categoryId": null})),
    )
    .await;
    assert_eq!(cleared["categoryId"], Value::Null);
    assert_eq!(cleared["description"], "Lunch");
}

#[tokio::test]
async fn list_and_summary_report_meta_and_totals() {
    let app = app().await;
    let checking = open_account(&app, "Checking", "100").await;
    let (_, tag) = call(
        &app,
        "POST",
        "/tags",
        Some("alice"),
        Some(json!({"name": "work"})),
    )
    .await;

    for (day, kind, amount) in [(1, "INCOME", "50"), (2, "EXPENSE", "20"), (3, "EXPENSE", "5")] {
        let (status, _) = call(
            &app,
            "POST",
            "/transactions",
            Some("alice"),
            Some(json!({
                "amount": amount,
                "type": kind,
                "accountId": checking,
                "date": format!("2024-05-0{day}T10:00:00Z"),
                "tagIds": [tag["id"]],
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, page) = call(
        &app,
        "GET",
        "/transactions?page=1&limit=2",
        Some("alice"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["meta"], json!({"total": 3, "page": 1, "totalPages": 2}));
    assert_eq!(page["data"].as_array().unwrap().len(), 2);
    assert_eq!(page["data"][0]["account"]["name"], "Checking");
    assert_eq!(page["data"][0]["tags"][0]["name"], "work");

    let (_, expenses) = call(&app, "GET", "/transactions?type=EXPENSE", Some("alice"), None).await;
    assert_eq!(expenses["meta"]["total"], 2);

    let (status, summary) = call(
        &app,
        "GET",
        "/transactions/summary?from=2024-05-02T00:00:00Z",
        Some("alice"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["totalIncome"], "0.00");
    assert_eq!(summary["totalExpense"], "25.00");
    assert_eq!(summary["totalBalance"], "125.00");
    assert_eq!(summary["accounts"][0]["balance"], "125.00");
}

#[tokio::test]
async fn run_reports_a_taken_address() {
    let taken = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = taken.local_addr().unwrap();

    let state = ServerState::new(engine().await, PlainVerifier);
    let err = run(state, addr).await.unwrap_err();
    assert_eq!(err.kind(), std::io::ErrorKind::AddrInUse);
}
