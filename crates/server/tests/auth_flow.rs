use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use migration::MigratorTrait;
use sea_orm::{ConnectOptions, Database};
use serde_json::{json, Value};
use tower::Service;
use tower_http::cors::CorsLayer;
use uuid::Uuid;

use server::routes::{self, auth};
use workflow::auth::domain::Claims;
use workflow::uploads::DiskUploadStore;

const JWT_SECRET: &str = "test-secret";

/// In-process app over a fresh in-memory database. One pooled connection
/// only: each `sqlite::memory:` connection is its own empty database.
async fn build_app() -> anyhow::Result<Router> {
    let mut opts = ConnectOptions::new("sqlite::memory:".to_owned());
    opts.max_connections(1).min_connections(1).sqlx_logging(false);
    let db = Database::connect(opts).await?;
    migration::Migrator::up(&db, None).await?;

    let uploads =
        DiskUploadStore::new(std::env::temp_dir().join(format!("rental-test-{}", Uuid::new_v4())))?;
    let state = auth::ServerState {
        db,
        auth: auth::ServerAuthConfig { jwt_secret: JWT_SECRET.into() },
        uploads,
    };
    Ok(routes::build_router(state, CorsLayer::very_permissive()))
}

fn json_request(method: &str, uri: &str, body: &Value) -> anyhow::Result<Request<Body>> {
    Ok(Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body)?))?)
}

async fn body_json(res: axum::response::Response) -> anyhow::Result<Value> {
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

fn signup_body(username: &str) -> Value {
    json!({
        "email": format!("{username}@example.com"),
        "username": username,
        "password": "Passw0rd",
        "phone_number": "555-0100"
    })
}

#[tokio::test]
async fn test_signup_and_login_flow() -> anyhow::Result<()> {
    let app = build_app().await?;

    let res = app
        .clone()
        .call(json_request("POST", "/auth/signup", &signup_body("alice"))?)
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    assert!(res.headers().get("set-cookie").is_some());
    let body = body_json(res).await?;
    assert_eq!(body["username"], "alice");
    assert_eq!(body["email"], "alice@example.com");
    assert!(body["user_id"].as_str().is_some());
    assert!(body["token"].as_str().is_some());

    let res = app
        .clone()
        .call(json_request(
            "POST",
            "/auth/login",
            &json!({"email": "alice@example.com", "password": "Passw0rd"}),
        )?)
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let cookie = res.headers().get("set-cookie").cloned();
    assert!(cookie.is_some());
    let body = body_json(res).await?;
    let token = body["token"].as_str().map(str::to_owned).unwrap_or_default();
    assert!(!token.is_empty());

    // Bearer header works
    let res = app
        .clone()
        .call(
            Request::builder()
                .uri("/auth/verify")
                .header("authorization", format!("Bearer {token}"))
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = body_json(res).await?;
    assert_eq!(body["username"], "alice");

    // Cookie fallback works too
    let cookie_pair = cookie
        .and_then(|v| v.to_str().ok().map(str::to_owned))
        .and_then(|v| v.split(';').next().map(str::to_owned))
        .unwrap_or_default();
    let res = app
        .clone()
        .call(
            Request::builder()
                .uri("/auth/verify")
                .header("cookie", cookie_pair)
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn test_login_wrong_password() -> anyhow::Result<()> {
    let app = build_app().await?;
    app.clone()
        .call(json_request("POST", "/auth/signup", &signup_body("bob"))?)
        .await?;

    let res = app
        .clone()
        .call(json_request(
            "POST",
            "/auth/login",
            &json!({"email": "bob@example.com", "password": "Wrong0ne"}),
        )?)
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(res).await?;
    assert_eq!(body["type"], "UNAUTHORIZED");
    assert_eq!(body["message"], "Oops! The password you entered is incorrect.");
    assert_eq!(body["status"], 401);
    assert_eq!(body["instance"], "/auth/login");
    Ok(())
}

#[tokio::test]
async fn test_login_unknown_email() -> anyhow::Result<()> {
    let app = build_app().await?;
    let res = app
        .clone()
        .call(json_request(
            "POST",
            "/auth/login",
            &json!({"email": "ghost@example.com", "password": "Passw0rd"}),
        )?)
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(res).await?;
    assert_eq!(
        body["message"],
        "Sorry, the provided email address could not be found in our system."
    );
    Ok(())
}

#[tokio::test]
async fn test_signup_weak_password_lists_problem() -> anyhow::Result<()> {
    let app = build_app().await?;
    let mut body = signup_body("carol");
    body["password"] = json!("short");

    let res = app.clone().call(json_request("POST", "/auth/signup", &body)?).await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = body_json(res).await?;
    assert_eq!(body["type"], "VALIDATION");
    let errors = body["errors"].as_array().cloned().unwrap_or_default();
    assert!(errors.iter().any(|e| {
        e.as_str().is_some_and(|s| s.starts_with("Password must have at least 6 characters"))
    }));
    Ok(())
}

#[tokio::test]
async fn test_signup_missing_fields() -> anyhow::Result<()> {
    let app = build_app().await?;
    let res = app.clone().call(json_request("POST", "/auth/signup", &json!({}))?).await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = body_json(res).await?;
    assert_eq!(body["message"], "All fields are required.");
    Ok(())
}

#[tokio::test]
async fn test_signup_duplicate_is_conflict() -> anyhow::Result<()> {
    let app = build_app().await?;
    app.clone()
        .call(json_request("POST", "/auth/signup", &signup_body("dave"))?)
        .await?;

    // same username, different email
    let mut body = signup_body("dave");
    body["email"] = json!("other@example.com");
    let res = app.clone().call(json_request("POST", "/auth/signup", &body)?).await?;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body = body_json(res).await?;
    assert_eq!(body["message"], "Username or email already exist.");
    Ok(())
}

#[tokio::test]
async fn test_protected_route_rejects_missing_and_expired_tokens() -> anyhow::Result<()> {
    let app = build_app().await?;

    let res = app
        .clone()
        .call(Request::builder().uri("/profile").body(Body::empty())?)
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(res).await?;
    assert_eq!(body["message"], "Invalid or expired token");
    assert_eq!(body["instance"], "/profile");

    // token signed with the right secret but already expired
    let now = Utc::now();
    let claims = Claims {
        sub: Uuid::new_v4(),
        email: "old@example.com".into(),
        iat: (now - Duration::hours(7)).timestamp(),
        exp: (now - Duration::hours(1)).timestamp(),
    };
    let stale = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )?;
    let res = app
        .clone()
        .call(
            Request::builder()
                .uri("/profile")
                .header("authorization", format!("Bearer {stale}"))
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    // garbage is no better
    let res = app
        .clone()
        .call(
            Request::builder()
                .uri("/profile")
                .header("authorization", "Bearer not-a-jwt")
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn test_logout_clears_cookie() -> anyhow::Result<()> {
    let app = build_app().await?;
    let res = app
        .clone()
        .call(Request::builder().method("POST").uri("/auth/logout").body(Body::empty())?)
        .await?;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    let cookie = res
        .headers()
        .get("set-cookie")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    assert!(cookie.starts_with("auth_token="));
    assert!(cookie.contains("Max-Age=0"));
    Ok(())
}

#[tokio::test]
async fn test_unknown_route_shape() -> anyhow::Result<()> {
    let app = build_app().await?;
    let res = app
        .clone()
        .call(Request::builder().uri("/no/such/route").body(Body::empty())?)
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body = body_json(res).await?;
    assert_eq!(body["type"], "NOT_FOUND");
    assert_eq!(body["message"], "This route does not exist");
    assert_eq!(body["instance"], "/no/such/route");
    Ok(())
}

#[tokio::test]
async fn test_health_and_openapi_are_public() -> anyhow::Result<()> {
    let app = build_app().await?;

    let res = app.clone().call(Request::builder().uri("/health").body(Body::empty())?).await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = body_json(res).await?;
    assert_eq!(body["status"], "ok");

    let res = app
        .clone()
        .call(Request::builder().uri("/api-docs/openapi.json").body(Body::empty())?)
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = body_json(res).await?;
    assert!(body["paths"].get("/services").is_some());
    Ok(())
}
