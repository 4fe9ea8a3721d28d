mod common;

use serde_json::Value;

#[tokio::test]
async fn create_item_round_trips_category_fields() {
    let app = common::spawn_app().await;
    let (user_id, token, _) = common::create_verified_user(&app, "seller").await;

    let resp = app
        .client
        .post(app.url("/items"))
        .bearer_auth(&token)
        .json(&serde_json::json!({
            "title": "Intro to Algorithms",
            "description": "Third edition, light wear",
            "category": "TEXTBOOK",
            "price": 38.5,
            "condition": "GOOD",
            "isbn": "978-0-13-468599-1",
            "courseCode": "CS201",
            "images": ["/uploads/a.jpg", "/uploads/b.jpg"],
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);
    let body: Value = resp.json().await.unwrap();
    let item_id = body["itemId"].as_str().unwrap().to_string();

    let resp = app
        .client
        .get(app.url(&format!("/items/{}", item_id)))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    let data = &body["data"];

    assert_eq!(data["title"], "Intro to Algorithms");
    assert_eq!(data["isbn"], "978-0-13-468599-1");
    assert_eq!(data["courseCode"], "CS201");
    assert_eq!(data["price"], 38.5);
    assert_eq!(data["status"], "AVAILABLE");
    assert_eq!(data["sellerId"], user_id);
    assert_eq!(data["viewCount"], 0);
    assert_eq!(
        data["images"].as_array().unwrap().len(),
        2,
        "images should come back as a real list"
    );
    assert_eq!(data["seller"]["id"], user_id);
    assert_eq!(data["seller"]["memberType"], "STUDENT");
}

#[tokio::test]
async fn category_payload_switches_on_tag() {
    let app = common::spawn_app().await;
    let (_, token, _) = common::create_verified_user(&app, "tagged").await;

    // Electronics fields on a TEXTBOOK listing are dropped by the tag
    let resp = app
        .client
        .post(app.url("/items"))
        .bearer_auth(&token)
        .json(&serde_json::json!({
            "title": "Linear Algebra",
            "category": "TEXTBOOK",
            "price": 20,
            "condition": "LIKE_NEW",
            "isbn": "978-3-16-148410-0",
            "brand": "Apple",
            "model": "MBP-14",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);
    let body: Value = resp.json().await.unwrap();
    let item_id = body["itemId"].as_str().unwrap();

    let resp = app
        .client
        .get(app.url(&format!("/items/{}", item_id)))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    let data = &body["data"];
    assert_eq!(data["isbn"], "978-3-16-148410-0");
    assert!(data.get("brand").is_none());
    assert!(data.get("modelNumber").is_none());
}

#[tokio::test]
async fn model_alias_maps_to_model_number() {
    let app = common::spawn_app().await;
    let (_, token, _) = common::create_verified_user(&app, "alias").await;

    let resp = app
        .client
        .post(app.url("/items"))
        .bearer_auth(&token)
        .json(&serde_json::json!({
            "title": "MacBook Pro 14",
            "category": "ELECTRONICS",
            "price": 900,
            "condition": "GOOD",
            "model": "A2442",
            "purchaseDate": "2022-03-01",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);
    let body: Value = resp.json().await.unwrap();
    let item_id = body["itemId"].as_str().unwrap();

    let resp = app
        .client
        .get(app.url(&format!("/items/{}", item_id)))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["modelNumber"], "A2442");
    assert_eq!(body["data"]["originalPurchaseDate"], "2022-03-01");
}

#[tokio::test]
async fn create_requires_authentication() {
    let app = common::spawn_app().await;

    let resp = app
        .client
        .post(app.url("/items"))
        .json(&serde_json::json!({
            "title": "No auth",
            "category": "SPORTS",
            "price": 5,
            "condition": "FAIR",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
}

#[tokio::test]
async fn seller_comes_from_token_not_body() {
    let app = common::spawn_app().await;
    let (user_id, token, _) = common::create_verified_user(&app, "owner").await;

    let resp = app
        .client
        .post(app.url("/items"))
        .bearer_auth(&token)
        .json(&serde_json::json!({
            "title": "Spoofed seller",
            "category": "SPORTS",
            "price": 10,
            "condition": "GOOD",
            "sellerId": "someone-else",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);
    let body: Value = resp.json().await.unwrap();
    let item_id = body["itemId"].as_str().unwrap();

    let resp = app
        .client
        .get(app.url(&format!("/items/{}", item_id)))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["sellerId"], user_id);
}

#[tokio::test]
async fn invalid_create_is_rejected_before_any_write() {
    let app = common::spawn_app().await;
    let (_, token, _) = common::create_verified_user(&app, "invalid").await;

    // Negative price
    let resp = app
        .client
        .post(app.url("/items"))
        .bearer_auth(&token)
        .json(&serde_json::json!({
            "title": "Bad price",
            "category": "SPORTS",
            "price": -1,
            "condition": "GOOD",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    // Six images
    let resp = app
        .client
        .post(app.url("/items"))
        .bearer_auth(&token)
        .json(&serde_json::json!({
            "title": "Too many images",
            "category": "SPORTS",
            "price": 1,
            "condition": "GOOD",
            "images": ["a", "b", "c", "d", "e", "f"],
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["errors"][0], "A maximum of 5 images is allowed");

    // Nothing was stored
    let resp = app
        .client
        .get(app.url("/items/search"))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["pagination"]["total"], 0);
}

#[tokio::test]
async fn create_collects_every_violation() {
    let app = common::spawn_app().await;
    let (_, token, _) = common::create_verified_user(&app, "collect").await;

    let resp = app
        .client
        .post(app.url("/items"))
        .bearer_auth(&token)
        .json(&serde_json::json!({ "title": "x", "category": "CARS", "condition": "MINT" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    let errors = body["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 4, "title, category, price, condition: {:?}", errors);
}

#[tokio::test]
async fn update_and_delete_enforce_ownership() {
    let app = common::spawn_app().await;
    let (_, owner_token, _) = common::create_verified_user(&app, "owner_a").await;
    let (_, other_token, _) = common::create_verified_user(&app, "other_b").await;

    let item_id = common::create_test_item(&app, &owner_token, "Desk", "FURNITURE", 40.0).await;

    let resp = app
        .client
        .put(app.url(&format!("/items/{}", item_id)))
        .bearer_auth(&other_token)
        .json(&serde_json::json!({ "title": "Hijacked" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 403);

    let resp = app
        .client
        .delete(app.url(&format!("/items/{}", item_id)))
        .bearer_auth(&other_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 403);

    // Unchanged
    let resp = app
        .client
        .get(app.url(&format!("/items/{}", item_id)))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["title"], "Desk");
    assert_eq!(body["data"]["status"], "AVAILABLE");
}

#[tokio::test]
async fn partial_update_changes_only_supplied_fields() {
    let app = common::spawn_app().await;
    let (_, token, _) = common::create_verified_user(&app, "partial").await;
    let item_id = common::create_test_item(&app, &token, "Road bike", "SPORTS", 150.0).await;

    let resp = app
        .client
        .put(app.url(&format!("/items/{}", item_id)))
        .bearer_auth(&token)
        .json(&serde_json::json!({ "price": 120 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let resp = app
        .client
        .get(app.url(&format!("/items/{}", item_id)))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["price"], 120.0);
    assert_eq!(body["data"]["title"], "Road bike");
    assert_eq!(body["data"]["condition"], "GOOD");
}

#[tokio::test]
async fn status_moves_freely_among_live_states_but_not_deleted() {
    let app = common::spawn_app().await;
    let (_, token, _) = common::create_verified_user(&app, "status").await;
    let item_id = common::create_test_item(&app, &token, "Couch", "FURNITURE", 80.0).await;

    for status in ["RESERVED", "SOLD", "AVAILABLE"] {
        let resp = app
            .client
            .put(app.url(&format!("/items/{}", item_id)))
            .bearer_auth(&token)
            .json(&serde_json::json!({ "status": status }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200, "transition to {}", status);
    }

    // DELETED is reserved for the delete operation
    let resp = app
        .client
        .put(app.url(&format!("/items/{}", item_id)))
        .bearer_auth(&token)
        .json(&serde_json::json!({ "status": "DELETED" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn soft_delete_hides_item_everywhere() {
    let app = common::spawn_app().await;
    let (_, token, _) = common::create_verified_user(&app, "deleter").await;
    let item_id = common::create_test_item(&app, &token, "Ghost chair", "FURNITURE", 25.0).await;

    let resp = app
        .client
        .delete(app.url(&format!("/items/{}", item_id)))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    // Excluded from search
    let resp = app
        .client
        .get(app.url("/items/search?keyword=Ghost"))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["pagination"]["total"], 0);

    // Excluded from the plain listing too
    let resp = app.client.get(app.url("/items")).send().await.unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["pagination"]["total"], 0);

    // Detail answers 404 for soft-deleted rows
    let resp = app
        .client
        .get(app.url(&format!("/items/{}", item_id)))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn view_count_increments_exactly_n_times() {
    let app = common::spawn_app().await;
    let (_, token, _) = common::create_verified_user(&app, "views").await;
    let item_id = common::create_test_item(&app, &token, "Lamp", "FURNITURE", 12.0).await;

    for _ in 0..3 {
        let resp = app
            .client
            .post(app.url(&format!("/items/{}/view", item_id)))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
    }

    let resp = app
        .client
        .get(app.url(&format!("/items/{}", item_id)))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["viewCount"], 3);
}

#[tokio::test]
async fn concurrent_view_increments_do_not_lose_updates() {
    let app = common::spawn_app().await;
    let (_, token, _) = common::create_verified_user(&app, "conc").await;
    let item_id = common::create_test_item(&app, &token, "Hot item", "SPORTS", 9.0).await;

    let mut handles = Vec::new();
    for _ in 0..10 {
        let client = app.client.clone();
        let url = app.url(&format!("/items/{}/view", item_id));
        handles.push(tokio::spawn(async move {
            client.post(url).send().await.unwrap().status()
        }));
    }
    for handle in handles {
        assert_eq!(handle.await.unwrap(), 200);
    }

    let resp = app
        .client
        .get(app.url(&format!("/items/{}", item_id)))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["viewCount"], 10);
}

#[tokio::test]
async fn detail_of_unknown_item_is_404() {
    let app = common::spawn_app().await;

    let resp = app
        .client
        .get(app.url("/items/no-such-item"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}
