mod common;

use serde_json::Value;

fn png_bytes(len: usize) -> Vec<u8> {
    let mut data = vec![0u8; len.max(8)];
    data[..8].copy_from_slice(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]);
    data
}

fn jpeg_bytes(len: usize) -> Vec<u8> {
    let mut data = vec![0u8; len.max(3)];
    data[..3].copy_from_slice(&[0xFF, 0xD8, 0xFF]);
    data
}

fn part(data: Vec<u8>, filename: &str, mime: &str) -> reqwest::multipart::Part {
    reqwest::multipart::Part::bytes(data)
        .file_name(filename.to_string())
        .mime_str(mime)
        .unwrap()
}

#[tokio::test]
async fn upload_single_image() {
    let app = common::spawn_app().await;
    let (_, token, _) = common::create_verified_user(&app, "up_single").await;

    let form = reqwest::multipart::Form::new().part("image", part(png_bytes(128), "photo.png", "image/png"));
    let resp = app
        .client
        .post(app.url("/upload/image"))
        .bearer_auth(&token)
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert!(body["success"].as_bool().unwrap());
    let url = body["data"]["url"].as_str().unwrap();
    assert!(url.starts_with("/uploads/item-"));
    assert!(url.ends_with(".png"));
    assert_eq!(body["data"]["size"], 128);

    // The file landed in the upload directory
    let filename = body["data"]["filename"].as_str().unwrap();
    let on_disk = std::path::Path::new(&app.upload_dir).join(filename);
    assert!(on_disk.exists());
}

#[tokio::test]
async fn oversized_file_answers_413() {
    let app = common::spawn_app().await;
    let (_, token, _) = common::create_verified_user(&app, "up_big").await;

    let form = reqwest::multipart::Form::new().part(
        "image",
        part(jpeg_bytes(6 * 1024 * 1024), "big.jpg", "image/jpeg"),
    );
    let resp = app
        .client
        .post(app.url("/upload/image"))
        .bearer_auth(&token)
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 413);
}

#[tokio::test]
async fn non_image_mime_is_rejected() {
    let app = common::spawn_app().await;
    let (_, token, _) = common::create_verified_user(&app, "up_mime").await;

    // A text file renamed to .jpg still declares a text MIME type
    let form = reqwest::multipart::Form::new().part(
        "image",
        part(b"hello world".to_vec(), "notes.jpg", "text/plain"),
    );
    let resp = app
        .client
        .post(app.url("/upload/image"))
        .bearer_auth(&token)
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert!(body["message"].as_str().unwrap().contains("Unsupported file type"));
}

#[tokio::test]
async fn wrong_extension_is_rejected() {
    let app = common::spawn_app().await;
    let (_, token, _) = common::create_verified_user(&app, "up_ext").await;

    let form = reqwest::multipart::Form::new().part(
        "image",
        part(png_bytes(64), "photo.txt", "image/png"),
    );
    let resp = app
        .client
        .post(app.url("/upload/image"))
        .bearer_auth(&token)
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn mismatched_content_is_rejected() {
    let app = common::spawn_app().await;
    let (_, token, _) = common::create_verified_user(&app, "up_magic").await;

    // Declares image/jpeg but carries no JPEG magic bytes
    let form = reqwest::multipart::Form::new().part(
        "image",
        part(b"plain text pretending".to_vec(), "fake.jpg", "image/jpeg"),
    );
    let resp = app
        .client
        .post(app.url("/upload/image"))
        .bearer_auth(&token)
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("does not match"));
}

#[tokio::test]
async fn multi_upload_stores_each_file() {
    let app = common::spawn_app().await;
    let (_, token, _) = common::create_verified_user(&app, "up_multi").await;

    let form = reqwest::multipart::Form::new()
        .part("images", part(png_bytes(64), "a.png", "image/png"))
        .part("images", part(jpeg_bytes(64), "b.jpg", "image/jpeg"));
    let resp = app
        .client
        .post(app.url("/upload/images"))
        .bearer_auth(&token)
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    let files = body["data"].as_array().unwrap();
    assert_eq!(files.len(), 2);
    assert!(files[0]["url"].as_str().unwrap().ends_with(".png"));
    assert!(files[1]["url"].as_str().unwrap().ends_with(".jpg"));
}

#[tokio::test]
async fn more_than_five_files_are_rejected() {
    let app = common::spawn_app().await;
    let (_, token, _) = common::create_verified_user(&app, "up_six").await;

    let mut form = reqwest::multipart::Form::new();
    for i in 0..6 {
        form = form.part("images", part(png_bytes(32), &format!("f{}.png", i), "image/png"));
    }
    let resp = app
        .client
        .post(app.url("/upload/images"))
        .bearer_auth(&token)
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "A maximum of 5 images is allowed");
}

#[tokio::test]
async fn upload_requires_auth() {
    let app = common::spawn_app().await;

    let form = reqwest::multipart::Form::new().part("image", part(png_bytes(32), "a.png", "image/png"));
    let resp = app
        .client
        .post(app.url("/upload/image"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
}
