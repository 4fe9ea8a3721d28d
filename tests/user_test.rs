mod common;

use serde_json::Value;

#[tokio::test]
async fn profile_requires_target_or_auth() {
    let app = common::spawn_app().await;

    let resp = app
        .client
        .get(app.url("/users/profile"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn anonymous_profile_lookup_by_user_id() {
    let app = common::spawn_app().await;
    let (user_id, _, email) = common::create_verified_user(&app, "public").await;

    let resp = app
        .client
        .get(app.url(&format!("/users/profile?userId={}", user_id)))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["id"], user_id);
    assert_eq!(body["data"]["email"], email);
    assert_eq!(body["data"]["profileCompleteness"], 0);
    assert_eq!(body["data"]["ratingCount"], 0);
    assert_eq!(body["data"]["successfulTransactions"], 0);
    assert!(body["data"]["averageRating"].is_null());
}

#[tokio::test]
async fn own_profile_via_token_without_user_id() {
    let app = common::spawn_app().await;
    let (user_id, token, _) = common::create_verified_user(&app, "own").await;

    let resp = app
        .client
        .get(app.url("/users/profile"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["id"], user_id);
}

#[tokio::test]
async fn profile_update_raises_completeness() {
    let app = common::spawn_app().await;
    let (_, token, _) = common::create_verified_user(&app, "complete").await;

    let resp = app
        .client
        .put(app.url("/users/profile"))
        .bearer_auth(&token)
        .json(&serde_json::json!({
            "name": "Alice Chen",
            "bio": "Selling my old textbooks",
            "university": "State University",
            "enrollmentYear": 2023,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let resp = app
        .client
        .get(app.url("/users/profile"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["name"], "Alice Chen");
    assert_eq!(body["data"]["profileCompleteness"], 80);

    // Avatar is the fifth field
    let resp = app
        .client
        .put(app.url("/users/profile"))
        .bearer_auth(&token)
        .json(&serde_json::json!({ "avatar": "/uploads/me.png" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let resp = app
        .client
        .get(app.url("/users/profile"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["profileCompleteness"], 100);
    // Earlier fields were not clobbered by the partial update
    assert_eq!(body["data"]["university"], "State University");
}

#[tokio::test]
async fn empty_name_means_no_change() {
    let app = common::spawn_app().await;
    let (_, token, _) = common::create_verified_user(&app, "noname").await;

    app.client
        .put(app.url("/users/profile"))
        .bearer_auth(&token)
        .json(&serde_json::json!({ "name": "Bob Li" }))
        .send()
        .await
        .unwrap();

    let resp = app
        .client
        .put(app.url("/users/profile"))
        .bearer_auth(&token)
        .json(&serde_json::json!({ "name": "", "bio": "hi" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let resp = app
        .client
        .get(app.url("/users/profile"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["name"], "Bob Li");
    assert_eq!(body["data"]["bio"], "hi");
}

#[tokio::test]
async fn profile_update_validation() {
    let app = common::spawn_app().await;
    let (_, token, _) = common::create_verified_user(&app, "badprofile").await;

    let long_bio = "x".repeat(501);
    let resp = app
        .client
        .put(app.url("/users/profile"))
        .bearer_auth(&token)
        .json(&serde_json::json!({ "bio": long_bio, "enrollmentYear": 1800 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    let errors = body["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 2, "bio length and year range: {:?}", errors);
}

#[tokio::test]
async fn stats_reflect_ratings_and_sales() {
    let app = common::spawn_app().await;
    let (seller_id, seller_token, _) = common::create_verified_user(&app, "stat_seller").await;
    let (_, buyer_token, _) = common::create_verified_user(&app, "stat_buyer").await;

    // One sold listing
    let item_id = common::create_test_item(&app, &seller_token, "Sold book", "TEXTBOOK", 10.0).await;
    app.client
        .put(app.url(&format!("/items/{}", item_id)))
        .bearer_auth(&seller_token)
        .json(&serde_json::json!({ "status": "SOLD" }))
        .send()
        .await
        .unwrap();

    // Two ratings: 5 and 4
    for (rating, with_item) in [(5, true), (4, false)] {
        let mut payload = serde_json::json!({
            "ratedUserId": seller_id,
            "rating": rating,
        });
        if with_item {
            payload["itemId"] = Value::String(item_id.clone());
        }
        let resp = app
            .client
            .post(app.url("/ratings"))
            .bearer_auth(&buyer_token)
            .json(&payload)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 201);
    }

    let resp = app
        .client
        .get(app.url("/users/me"))
        .bearer_auth(&seller_token)
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["ratingCount"], 2);
    assert_eq!(body["data"]["averageRating"], 4.5);
    assert_eq!(body["data"]["successfulTransactions"], 1);
}
