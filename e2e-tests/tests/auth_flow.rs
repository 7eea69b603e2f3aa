mod common;

use common::spawn_app;

#[tokio::test]
async fn test_register_login_me_flow() {
    let app = spawn_app().await;

    // Register
    let res = app
        .client
        .post(format!("{}/api/auth/register", app.base))
        .json(&serde_json::json!({
            "name": "Ana",
            "email": "a@x.com",
            "password": "secret1",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 201);

    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert!(body["token"].as_str().is_some());
    assert_eq!(body["user"]["name"], "Ana");
    assert_eq!(body["user"]["email"], "a@x.com");
    assert!(body["user"]["id"].as_str().unwrap().starts_with("U_"));
    assert!(
        body["user"].get("password_hash").is_none(),
        "hash must never appear in a response"
    );

    // Login with the same credentials
    let res = app
        .client
        .post(format!("{}/api/auth/login", app.base))
        .json(&serde_json::json!({ "email": "a@x.com", "password": "secret1" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 200);

    let body: serde_json::Value = res.json().await.unwrap();
    let token = body["token"].as_str().unwrap().to_string();

    // The token works on a protected endpoint
    let res = app
        .client
        .get(format!("{}/api/auth/me", app.base))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 200);

    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["user"]["email"], "a@x.com");
}

#[tokio::test]
async fn test_duplicate_email_is_conflict() {
    let app = spawn_app().await;
    app.register("Ana", "dupe@x.com", "secret1").await;

    let res = app
        .client
        .post(format!("{}/api/auth/register", app.base))
        .json(&serde_json::json!({
            "name": "Outra Ana",
            "email": "dupe@x.com",
            "password": "secret2",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 409);

    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Email já cadastrado");
}

#[tokio::test]
async fn test_register_validation_errors_joined() {
    let app = spawn_app().await;

    let res = app
        .client
        .post(format!("{}/api/auth/register", app.base))
        .json(&serde_json::json!({ "name": "", "email": "bad", "password": "123" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 400);

    let body: serde_json::Value = res.json().await.unwrap();
    let message = body["message"].as_str().unwrap();
    assert!(
        message.contains(". "),
        "multiple field messages are joined with '. ': {message}"
    );
}

#[tokio::test]
async fn test_bad_credentials_are_indistinguishable() {
    let app = spawn_app().await;
    app.register("Ana", "ana@x.com", "secret1").await;

    let wrong_password = app
        .client
        .post(format!("{}/api/auth/login", app.base))
        .json(&serde_json::json!({ "email": "ana@x.com", "password": "wrong99" }))
        .send()
        .await
        .unwrap();
    let unknown_email = app
        .client
        .post(format!("{}/api/auth/login", app.base))
        .json(&serde_json::json!({ "email": "ghost@x.com", "password": "secret1" }))
        .send()
        .await
        .unwrap();

    assert_eq!(wrong_password.status().as_u16(), 401);
    assert_eq!(unknown_email.status().as_u16(), 401);

    let a: serde_json::Value = wrong_password.json().await.unwrap();
    let b: serde_json::Value = unknown_email.json().await.unwrap();
    assert_eq!(a["message"], b["message"], "identical message for both failures");
    assert_eq!(a["message"], "Credenciais inválidas");
}

#[tokio::test]
async fn test_protected_endpoints_reject_missing_and_bad_tokens() {
    let app = spawn_app().await;

    let res = app
        .client
        .get(format!("{}/api/routes", app.base))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 401);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["message"], "Token não fornecido");

    let res = app
        .client
        .get(format!("{}/api/routes", app.base))
        .bearer_auth("garbage.token.here")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 401);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["message"], "Token inválido ou expirado");
}
