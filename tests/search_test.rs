mod common;

use serde_json::Value;

async fn seed_textbooks(app: &common::TestApp, token: &str) {
    for (title, price) in [
        ("Calculus I", 38.0),
        ("Linear Algebra", 25.0),
        ("Discrete Math", 12.0),
        ("Organic Chemistry", 45.0),
        ("Microeconomics", 7.0),
    ] {
        common::create_test_item(app, token, title, "TEXTBOOK", price).await;
    }
}

#[tokio::test]
async fn category_search_sorts_by_price_and_paginates() {
    let app = common::spawn_app().await;
    let (_, token, _) = common::create_verified_user(&app, "bookseller").await;
    seed_textbooks(&app, &token).await;
    common::create_test_item(&app, &token, "Tennis racket", "SPORTS", 30.0).await;

    let resp = app
        .client
        .get(app.url(
            "/items/search?category=TEXTBOOK&sortBy=price_asc&page=1&pageSize=2",
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();

    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 2);
    assert_eq!(data[0]["price"], 7.0);
    assert_eq!(data[1]["price"], 12.0);

    assert_eq!(body["pagination"]["total"], 5);
    assert_eq!(body["pagination"]["totalPages"], 3);
    assert_eq!(body["pagination"]["page"], 1);
    assert_eq!(body["pagination"]["pageSize"], 2);
}

#[tokio::test]
async fn keyword_matches_title_and_description() {
    let app = common::spawn_app().await;
    let (_, token, _) = common::create_verified_user(&app, "kw").await;

    common::create_test_item(&app, &token, "Ergonomic chair", "FURNITURE", 60.0).await;
    let resp = app
        .client
        .post(app.url("/items"))
        .bearer_auth(&token)
        .json(&serde_json::json!({
            "title": "Office stool",
            "description": "Very ergonomic, barely used",
            "category": "FURNITURE",
            "price": 20,
            "condition": "GOOD",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);

    let resp = app
        .client
        .get(app.url("/items/search?keyword=ergonomic"))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["pagination"]["total"], 2);
}

#[tokio::test]
async fn price_range_is_inclusive() {
    let app = common::spawn_app().await;
    let (_, token, _) = common::create_verified_user(&app, "range").await;
    seed_textbooks(&app, &token).await;

    let resp = app
        .client
        .get(app.url("/items/search?minPrice=12&maxPrice=38"))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    // 12, 25 and 38 are all inside the inclusive range
    assert_eq!(body["pagination"]["total"], 3);
}

#[tokio::test]
async fn comma_separated_category_filter() {
    let app = common::spawn_app().await;
    let (_, token, _) = common::create_verified_user(&app, "multi").await;
    common::create_test_item(&app, &token, "Calculus I", "TEXTBOOK", 38.0).await;
    common::create_test_item(&app, &token, "Tennis racket", "SPORTS", 30.0).await;
    common::create_test_item(&app, &token, "Desk lamp", "FURNITURE", 15.0).await;

    let resp = app
        .client
        .get(app.url("/items/search?category=TEXTBOOK,SPORTS"))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["pagination"]["total"], 2);
}

#[tokio::test]
async fn unknown_category_filter_is_rejected() {
    let app = common::spawn_app().await;

    let resp = app
        .client
        .get(app.url("/items/search?category=VEHICLES"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert!(body["message"].as_str().unwrap().contains("TEXTBOOK"));
}

#[tokio::test]
async fn sort_by_views_uses_view_count() {
    let app = common::spawn_app().await;
    let (_, token, _) = common::create_verified_user(&app, "sortviews").await;
    let quiet = common::create_test_item(&app, &token, "Quiet item", "SPORTS", 10.0).await;
    let popular = common::create_test_item(&app, &token, "Popular item", "SPORTS", 10.0).await;

    for _ in 0..4 {
        app.client
            .post(app.url(&format!("/items/{}/view", popular)))
            .send()
            .await
            .unwrap();
    }
    app.client
        .post(app.url(&format!("/items/{}/view", quiet)))
        .send()
        .await
        .unwrap();

    let resp = app
        .client
        .get(app.url("/items/search?sortBy=views"))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    let data = body["data"].as_array().unwrap();
    assert_eq!(data[0]["id"], popular.as_str());
    assert_eq!(data[0]["viewCount"], 4);
}

#[tokio::test]
async fn listing_filters_by_status_and_seller() {
    let app = common::spawn_app().await;
    let (seller_a, token_a, _) = common::create_verified_user(&app, "lister_a").await;
    let (_, token_b, _) = common::create_verified_user(&app, "lister_b").await;

    let sold = common::create_test_item(&app, &token_a, "Sold bike", "SPORTS", 50.0).await;
    common::create_test_item(&app, &token_a, "Open bike", "SPORTS", 55.0).await;
    common::create_test_item(&app, &token_b, "Other seller", "SPORTS", 60.0).await;

    app.client
        .put(app.url(&format!("/items/{}", sold)))
        .bearer_auth(&token_a)
        .json(&serde_json::json!({ "status": "SOLD" }))
        .send()
        .await
        .unwrap();

    let resp = app
        .client
        .get(app.url(&format!("/items?sellerId={}", seller_a)))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["pagination"]["total"], 2);

    let resp = app
        .client
        .get(app.url(&format!("/items?sellerId={}&status=SOLD", seller_a)))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["pagination"]["total"], 1);
    assert_eq!(body["data"][0]["id"], sold.as_str());

    // The DELETED sentinel is not a filterable status
    let resp = app
        .client
        .get(app.url("/items?status=DELETED"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn featured_returns_available_items_by_views() {
    let app = common::spawn_app().await;
    let (_, token, _) = common::create_verified_user(&app, "featured").await;

    let reserved = common::create_test_item(&app, &token, "Reserved hit", "SPORTS", 5.0).await;
    let hit = common::create_test_item(&app, &token, "Open hit", "SPORTS", 5.0).await;
    let other = common::create_test_item(&app, &token, "Sleeper", "SPORTS", 5.0).await;

    for _ in 0..5 {
        app.client
            .post(app.url(&format!("/items/{}/view", reserved)))
            .send()
            .await
            .unwrap();
    }
    for _ in 0..3 {
        app.client
            .post(app.url(&format!("/items/{}/view", hit)))
            .send()
            .await
            .unwrap();
    }

    app.client
        .put(app.url(&format!("/items/{}", reserved)))
        .bearer_auth(&token)
        .json(&serde_json::json!({ "status": "RESERVED" }))
        .send()
        .await
        .unwrap();

    let resp = app
        .client
        .get(app.url("/items/featured?limit=2"))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 2);
    assert_eq!(data[0]["id"], hit.as_str());
    assert_eq!(data[1]["id"], other.as_str());
}
