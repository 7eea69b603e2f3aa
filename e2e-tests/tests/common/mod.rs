//! Shared harness: spawns the full application on an ephemeral port over an
//! in-memory sqlite database and exposes small helpers for the flow tests.

use std::sync::Arc;

use sqlx::sqlite::SqlitePoolOptions;
use tokio::net::TcpListener;
use tokio::sync::RwLock;

use routesaver_api::{build_router, common, AppState};

pub struct TestApp {
    pub base: String,
    pub client: reqwest::Client,
}

pub async fn spawn_app() -> TestApp {
    // A single connection keeps the in-memory database alive for the whole
    // test; more connections would each see their own empty database.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite should connect");

    common::migrations::run_migrations(&pool)
        .await
        .expect("migrations should run");

    let state = AppState {
        db: pool,
        jwt_secret: "e2e-test-secret".to_string(),
        token_ttl_hours: 1,
    };

    let app = build_router(Arc::new(RwLock::new(state)));

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("ephemeral port should bind");
    let addr = listener.local_addr().expect("listener has an address");

    tokio::spawn(async move {
        axum::serve(listener, app.into_make_service())
            .await
            .expect("server should run");
    });

    TestApp {
        base: format!("http://{}", addr),
        client: reqwest::Client::new(),
    }
}

impl TestApp {
    /// Register a fresh user and return their bearer token
    #[allow(dead_code)]
    pub async fn register(&self, name: &str, email: &str, password: &str) -> String {
        let res = self
            .client
            .post(format!("{}/api/auth/register", self.base))
            .json(&serde_json::json!({
                "name": name,
                "email": email,
                "password": password,
            }))
            .send()
            .await
            .expect("register request should succeed");
        assert_eq!(res.status().as_u16(), 201, "registration should return 201");

        let body: serde_json::Value = res.json().await.expect("register body is json");
        body["token"]
            .as_str()
            .expect("register response has a token")
            .to_string()
    }

    /// Create a route for the given token and return its id
    #[allow(dead_code)]
    pub async fn create_route(
        &self,
        token: &str,
        name: &str,
        coordinates: serde_json::Value,
    ) -> String {
        let res = self
            .client
            .post(format!("{}/api/routes", self.base))
            .bearer_auth(token)
            .json(&serde_json::json!({ "name": name, "coordinates": coordinates }))
            .send()
            .await
            .expect("create route request should succeed");
        assert_eq!(res.status().as_u16(), 201, "route creation should return 201");

        let body: serde_json::Value = res.json().await.expect("create body is json");
        body["data"]["id"]
            .as_str()
            .expect("created route has an id")
            .to_string()
    }
}

#[allow(dead_code)]
pub fn two_points() -> serde_json::Value {
    serde_json::json!([
        { "lat": -15.78, "lng": -47.93 },
        { "lat": -15.80, "lng": -47.95 },
    ])
}
