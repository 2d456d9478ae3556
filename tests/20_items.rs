mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

use common::{read, TestServer};

#[tokio::test]
async fn owner_is_the_creator_even_when_body_claims_otherwise() -> Result<()> {
    let server = TestServer::spawn().await?;
    let alice = server.register("Alice", "alice@example.com", "wonderland").await?;
    let bob = server.register("Bob", "bob@example.com", "builder1").await?;
    let garage = server.create_location(&alice.access_token, "Garage").await?;

    let res = server
        .post(
            "/items",
            Some(&alice.access_token),
            json!({
                "name": "Drill",
                "location_id": garage,
                "owner_id": bob.id,
                "user_id": bob.id,
            }),
        )
        .await?;
    let (status, body) = read(res).await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["owner_id"], alice.id);
    Ok(())
}

#[tokio::test]
async fn other_users_see_not_found() -> Result<()> {
    let server = TestServer::spawn().await?;
    let alice = server.register("Alice", "alice@example.com", "wonderland").await?;
    let bob = server.register("Bob", "bob@example.com", "builder1").await?;
    let garage = server.create_location(&alice.access_token, "Garage").await?;
    let drill = server.create_item(&alice.access_token, "Drill", garage).await?;

    let path = format!("/items/{}", drill);
    let foreign = read(server.get(&path, &bob.access_token).await?).await?;
    let missing = read(server.get("/items/9999", &bob.access_token).await?).await?;
    assert_eq!(foreign.0, StatusCode::NOT_FOUND);
    assert_eq!(foreign, missing);

    let res = server.put(&path, &bob.access_token, json!({ "name": "Mine now" })).await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let res = server.delete(&path, &bob.access_token).await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    // Still intact for the owner.
    let (status, body) = read(server.get(&path, &alice.access_token).await?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Drill");

    let (_, listing) = read(server.get("/items", &bob.access_token).await?).await?;
    assert_eq!(listing["data"]["items"], json!([]));
    Ok(())
}

#[tokio::test]
async fn update_keeps_owner_and_validates_location() -> Result<()> {
    let server = TestServer::spawn().await?;
    let alice = server.register("Alice", "alice@example.com", "wonderland").await?;
    let bob = server.register("Bob", "bob@example.com", "builder1").await?;
    let garage = server.create_location(&alice.access_token, "Garage").await?;
    let shed = server.create_location(&alice.access_token, "Shed").await?;
    let bobs_room = server.create_location(&bob.access_token, "Bob's room").await?;
    let drill = server.create_item(&alice.access_token, "Drill", garage).await?;
    let path = format!("/items/{}", drill);

    let res = server
        .put(&path, &alice.access_token, json!({ "location_id": shed, "owner_id": bob.id }))
        .await?;
    let (status, body) = read(res).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["location_id"], shed);
    assert_eq!(body["data"]["owner_id"], alice.id);
    assert_eq!(body["data"]["name"], "Drill");

    for location_id in [bobs_room, 9999] {
        let res = server
            .put(&path, &alice.access_token, json!({ "location_id": location_id }))
            .await?;
        let (status, body) = read(res).await?;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["field_errors"]["location_id"], "Unknown location");
    }
    Ok(())
}

#[tokio::test]
async fn create_requires_known_location_and_name() -> Result<()> {
    let server = TestServer::spawn().await?;
    let alice = server.register("Alice", "alice@example.com", "wonderland").await?;
    let garage = server.create_location(&alice.access_token, "Garage").await?;

    let res = server
        .post("/items", Some(&alice.access_token), json!({ "name": "Drill", "location_id": 9999 }))
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = server
        .post("/items", Some(&alice.access_token), json!({ "name": "  ", "location_id": garage }))
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn owner_can_delete_item() -> Result<()> {
    let server = TestServer::spawn().await?;
    let alice = server.register("Alice", "alice@example.com", "wonderland").await?;
    let garage = server.create_location(&alice.access_token, "Garage").await?;
    let drill = server.create_item(&alice.access_token, "Drill", garage).await?;
    let path = format!("/items/{}", drill);

    let res = server.delete(&path, &alice.access_token).await?;
    assert_eq!(res.status(), StatusCode::OK);
    let res = server.get(&path, &alice.access_token).await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}
