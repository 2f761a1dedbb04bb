#![allow(dead_code)]

use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, Database, DatabaseConnection, Set};
use std::path::Path;

use microblog::config::Config;
use microblog::entities::{follows, likes, tweets, users};

pub async fn setup_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to connect to test database");
    microblog::db::migrate(&db)
        .await
        .expect("Failed to run migrations");
    db
}

pub fn test_config(root: &Path) -> Config {
    let static_dir = root.join("static");
    std::fs::create_dir_all(&static_dir).expect("Failed to create static dir");
    std::fs::write(
        static_dir.join("index.html"),
        "<!DOCTYPE html><html><body>microblog</body></html>",
    )
    .expect("Failed to write index.html");

    let media_dir = root.join("media");
    std::fs::create_dir_all(&media_dir).expect("Failed to create media dir");

    Config {
        database_url: "sqlite::memory:".to_string(),
        bind_addr: "127.0.0.1:0".to_string(),
        media_dir,
        static_dir,
        workers: 1,
        db_max_connections: 1,
        max_upload_bytes: 1024,
    }
}

pub async fn user(db: &DatabaseConnection, name: &str, api_key: &str) -> users::Model {
    microblog::users::create_user(db, name, api_key)
        .await
        .expect("Failed to create user")
}

pub async fn tweet_at(
    db: &DatabaseConnection,
    author: &users::Model,
    content: &str,
    created_at: DateTime<Utc>,
) -> tweets::Model {
    tweets::ActiveModel {
        user_id: Set(author.id),
        content: Set(content.to_string()),
        created_at: Set(created_at),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to insert tweet")
}

pub async fn follow(db: &DatabaseConnection, follower: &users::Model, followed: &users::Model) {
    follows::ActiveModel {
        follower_id: Set(follower.id),
        followed_id: Set(followed.id),
    }
    .insert(db)
    .await
    .expect("Failed to insert follow");
}

pub async fn like(db: &DatabaseConnection, user: &users::Model, tweet: &tweets::Model) {
    likes::ActiveModel {
        user_id: Set(user.id),
        tweet_id: Set(tweet.id),
    }
    .insert(db)
    .await
    .expect("Failed to insert like");
}

pub const BOUNDARY: &str = "microblog-test-boundary";

pub fn multipart_body(field: &str, filename: Option<&str>, data: &[u8]) -> Vec<u8> {
    let disposition = match filename {
        Some(filename) => format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
            field, filename
        ),
        None => format!("Content-Disposition: form-data; name=\"{}\"\r\n", field),
    };

    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(disposition.as_bytes());
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub fn multipart_content_type() -> String {
    format!("multipart/form-data; boundary={}", BOUNDARY)
}

/// Builds the full application around `$db` and `$config` the way the server does.
#[macro_export]
macro_rules! init_app {
    ($db:expr, $config:expr) => {{
        let config = $config.clone();
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::Data::new($db.clone()))
                .app_data(actix_web::web::Data::new(config.clone()))
                .configure(|cfg| microblog::configure(cfg, &config)),
        )
        .await
    }};
}
