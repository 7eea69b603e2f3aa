mod common;

use common::{spawn_app, two_points};

#[tokio::test]
async fn test_create_then_get_round_trip() {
    let app = spawn_app().await;
    let token = app.register("Ana", "ana@x.com", "secret1").await;

    let id = app.create_route(&token, "Casa-Trabalho", two_points()).await;

    let res = app
        .client
        .get(format!("{}/api/routes/{}", app.base, id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 200);

    let body: serde_json::Value = res.json().await.unwrap();
    let route = &body["data"];
    assert_eq!(route["name"], "Casa-Trabalho");

    let coords = route["coordinates"].as_array().unwrap();
    assert_eq!(coords.len(), 2);
    assert_eq!(coords[0]["lat"], -15.78);
    assert_eq!(coords[0]["lng"], -47.93);
    assert_eq!(coords[1]["lat"], -15.80);
    assert_eq!(coords[1]["lng"], -47.95);
}

#[tokio::test]
async fn test_list_is_newest_first_with_count() {
    let app = spawn_app().await;
    let token = app.register("Ana", "ana@x.com", "secret1").await;

    let first = app.create_route(&token, "Primeira", two_points()).await;
    // created_at has sub-second precision but a small gap keeps ordering
    // deterministic regardless of timer resolution
    tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    let second = app.create_route(&token, "Segunda", two_points()).await;

    let res = app
        .client
        .get(format!("{}/api/routes", app.base))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 200);

    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["count"], 2);
    let data = body["data"].as_array().unwrap();
    assert_eq!(data[0]["id"], second.as_str(), "newest first");
    assert_eq!(data[1]["id"], first.as_str());
}

#[tokio::test]
async fn test_create_requires_name_and_two_points() {
    let app = spawn_app().await;
    let token = app.register("Ana", "ana@x.com", "secret1").await;

    let res = app
        .client
        .post(format!("{}/api/routes", app.base))
        .bearer_auth(&token)
        .json(&serde_json::json!({
            "name": "Só um ponto",
            "coordinates": [{ "lat": -15.78, "lng": -47.93 }],
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 400);

    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "A rota deve ter pelo menos 2 pontos");
}

#[tokio::test]
async fn test_update_replaces_whole_point_sequence() {
    let app = spawn_app().await;
    let token = app.register("Ana", "ana@x.com", "secret1").await;
    let id = app.create_route(&token, "Original", two_points()).await;

    let res = app
        .client
        .put(format!("{}/api/routes/{}", app.base, id))
        .bearer_auth(&token)
        .json(&serde_json::json!({
            "name": "Renomeada",
            "coordinates": [
                { "lat": 1.0, "lng": 2.0 },
                { "lat": 3.0, "lng": 4.0 },
                { "lat": 5.0, "lng": 6.0 },
            ],
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 200);

    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["data"]["name"], "Renomeada");
    assert_eq!(body["data"]["coordinates"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_invalid_update_leaves_route_unchanged() {
    let app = spawn_app().await;
    let token = app.register("Ana", "ana@x.com", "secret1").await;
    let id = app.create_route(&token, "Intacta", two_points()).await;

    let res = app
        .client
        .put(format!("{}/api/routes/{}", app.base, id))
        .bearer_auth(&token)
        .json(&serde_json::json!({
            "name": "Quebrada",
            "coordinates": [{ "lat": 0.0, "lng": 0.0 }],
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 400);

    let res = app
        .client
        .get(format!("{}/api/routes/{}", app.base, id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["data"]["name"], "Intacta", "rejected update must not write");
    assert_eq!(body["data"]["coordinates"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_cross_user_access_is_always_not_found() {
    let app = spawn_app().await;
    let owner = app.register("Ana", "ana@x.com", "secret1").await;
    let intruder = app.register("Beto", "beto@x.com", "secret2").await;

    let id = app.create_route(&owner, "Particular", two_points()).await;

    // Read
    let res = app
        .client
        .get(format!("{}/api/routes/{}", app.base, id))
        .bearer_auth(&intruder)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 404, "404, never 401/403");

    // Update
    let res = app
        .client
        .put(format!("{}/api/routes/{}", app.base, id))
        .bearer_auth(&intruder)
        .json(&serde_json::json!({ "name": "Roubada", "coordinates": two_points() }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 404);

    // Delete
    let res = app
        .client
        .delete(format!("{}/api/routes/{}", app.base, id))
        .bearer_auth(&intruder)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 404);

    // The intruder's own list never shows it
    let res = app
        .client
        .get(format!("{}/api/routes", app.base))
        .bearer_auth(&intruder)
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["count"], 0);

    // And the owner still has it
    let res = app
        .client
        .get(format!("{}/api/routes/{}", app.base, id))
        .bearer_auth(&owner)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 200);
}

#[tokio::test]
async fn test_delete_route_and_delete_missing() {
    let app = spawn_app().await;
    let token = app.register("Ana", "ana@x.com", "secret1").await;
    let id = app.create_route(&token, "Descartável", two_points()).await;

    let res = app
        .client
        .delete(format!("{}/api/routes/{}", app.base, id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 200);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["message"], "Rota excluída com sucesso");

    // Deleting it again (or any unknown id) is a 404 with the exact message
    let res = app
        .client
        .delete(format!("{}/api/routes/{}", app.base, id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 404);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Rota não encontrada");
}
