// tests/api_tests.rs

use social_backend::{config::Config, routes, state::AppState};
use sqlx::postgres::PgPoolOptions;

/// Helper function to spawn the app on a random port for testing.
/// Returns the base URL (e.g., "http://127.0.0.1:12345").
async fn spawn_app() -> String {
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect(&database_url)
        .await
        .expect("Failed to connect to Postgres for testing. Make sure DATABASE_URL is set.");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to migrate database");

    let config = Config {
        database_url: database_url.clone(),
        jwt_secret: "test_secret_for_integration_tests".to_string(),
        jwt_expiration: 600,
        refresh_expiration: 3600,
        rust_log: "error".to_string(),
        media_root: "test_media".to_string(),
        admin_email: None,
        admin_password: None,
    };

    let state = AppState::new(pool, config);
    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");

    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    address
}

fn unique_credentials() -> (String, String) {
    let suffix = &uuid::Uuid::new_v4().to_string()[..8];
    (format!("u_{}@example.com", suffix), format!("u_{}", suffix))
}

async fn register(client: &reqwest::Client, address: &str, email: &str, username: &str) {
    let response = client
        .post(format!("{}/api/user/register", address))
        .json(&serde_json::json!({
            "email": email,
            "username": username,
            "password": "password123"
        }))
        .send()
        .await
        .expect("Register failed");
    assert_eq!(response.status().as_u16(), 201);
}

async fn obtain_tokens(
    client: &reqwest::Client,
    address: &str,
    email: &str,
) -> (String, String) {
    let body = client
        .post(format!("{}/api/user/token", address))
        .json(&serde_json::json!({"email": email, "password": "password123"}))
        .send()
        .await
        .expect("Token request failed")
        .json::<serde_json::Value>()
        .await
        .expect("Failed to parse token json");

    (
        body["access"].as_str().expect("access missing").to_string(),
        body["refresh"].as_str().expect("refresh missing").to_string(),
    )
}

#[tokio::test]
async fn health_check_404() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/random_path_that_does_not_exist", address))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn register_works_and_suppresses_payload() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let (email, username) = unique_credentials();

    let response = client
        .post(format!("{}/api/user/register", address))
        .json(&serde_json::json!({
            "email": email,
            "username": username,
            "password": "password123"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 201);
    assert!(response.text().await.unwrap().is_empty());
}

#[tokio::test]
async fn duplicate_email_registration_conflicts() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let (email, username) = unique_credentials();

    register(&client, &address, &email, &username).await;

    let response = client
        .post(format!("{}/api/user/register", address))
        .json(&serde_json::json!({
            "email": email,
            "username": format!("{}_other", username),
            "password": "password123"
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 409);
}

#[tokio::test]
async fn register_fails_validation() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    // Not an email address
    let response = client
        .post(format!("{}/api/user/register", address))
        .json(&serde_json::json!({
            "email": "not-an-email",
            "username": "someone",
            "password": "password123"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn token_and_refresh_flow() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let (email, username) = unique_credentials();

    register(&client, &address, &email, &username).await;
    let (access, refresh) = obtain_tokens(&client, &address, &email).await;

    // Access token opens protected routes
    let response = client
        .get(format!("{}/api/my-posts", address))
        .header("Authorization", format!("Bearer {}", access))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);

    // Refresh yields a fresh access token
    let refreshed = client
        .post(format!("{}/api/user/token/refresh", address))
        .json(&serde_json::json!({"refresh": refresh}))
        .send()
        .await
        .unwrap();
    assert_eq!(refreshed.status().as_u16(), 200);
    let body: serde_json::Value = refreshed.json().await.unwrap();
    assert!(body["access"].is_string());

    // A refresh token is not an access token
    let response = client
        .get(format!("{}/api/my-posts", address))
        .header("Authorization", format!("Bearer {}", refresh))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 401);
}

#[tokio::test]
async fn logout_requires_refresh_token_key() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let (email, username) = unique_credentials();

    register(&client, &address, &email, &username).await;
    let (access, _refresh) = obtain_tokens(&client, &address, &email).await;

    let response = client
        .post(format!("{}/api/user/logout", address))
        .header("Authorization", format!("Bearer {}", access))
        .json(&serde_json::json!({}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["detail"], "'refresh_token' not provided.");
}

#[tokio::test]
async fn logout_rejects_invalid_refresh_token() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let (email, username) = unique_credentials();

    register(&client, &address, &email, &username).await;
    let (access, _refresh) = obtain_tokens(&client, &address, &email).await;

    let response = client
        .post(format!("{}/api/user/logout", address))
        .header("Authorization", format!("Bearer {}", access))
        .json(&serde_json::json!({"refresh_token": "garbage"}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["detail"], "Invalid refresh token.");
}

#[tokio::test]
async fn logout_blacklists_refresh_token() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let (email, username) = unique_credentials();

    register(&client, &address, &email, &username).await;
    let (access, refresh) = obtain_tokens(&client, &address, &email).await;

    let response = client
        .post(format!("{}/api/user/logout", address))
        .header("Authorization", format!("Bearer {}", access))
        .json(&serde_json::json!({"refresh_token": refresh}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);

    // Blacklisted refresh token can no longer mint access tokens
    let refreshed = client
        .post(format!("{}/api/user/token/refresh", address))
        .json(&serde_json::json!({"refresh": refresh}))
        .send()
        .await
        .unwrap();
    assert_eq!(refreshed.status().as_u16(), 401);
}

#[tokio::test]
async fn inactive_user_cannot_obtain_token() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect(&database_url)
        .await
        .unwrap();

    let (email, username) = unique_credentials();
    register(&client, &address, &email, &username).await;

    sqlx::query("UPDATE users SET is_active = FALSE WHERE email = $1")
        .bind(&email)
        .execute(&pool)
        .await
        .unwrap();

    let response = client
        .post(format!("{}/api/user/token", address))
        .json(&serde_json::json!({"email": email, "password": "password123"}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 401);
}

#[tokio::test]
async fn duplicate_profile_rejected() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let (email, username) = unique_credentials();

    register(&client, &address, &email, &username).await;
    let (access, _refresh) = obtain_tokens(&client, &address, &email).await;

    let response = client
        .post(format!("{}/api/my-profile", address))
        .header("Authorization", format!("Bearer {}", access))
        .json(&serde_json::json!({"bio": "first"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 201);

    let response = client
        .post(format!("{}/api/my-profile", address))
        .header("Authorization", format!("Bearer {}", access))
        .json(&serde_json::json!({"bio": "second"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "A profile already exists for this user.");
}
