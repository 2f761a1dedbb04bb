pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod error;
pub mod feed;
pub mod follows;
pub mod handlers;
pub mod likes;
pub mod medias;
pub mod migrations;
pub mod models;
pub mod tweets;
pub mod users;

use actix_files::Files;
use actix_web::web;
use log::warn;

use crate::config::Config;
use crate::error::ApiError;

/// Registers the JSON API under `/api` plus the static and media file routes.
/// `Config` and the `DatabaseConnection` are expected in app data.
pub fn configure(cfg: &mut web::ServiceConfig, config: &Config) {
    let json_config = web::JsonConfig::default()
        .error_handler(|err, _req| ApiError::BadRequest(err.to_string()).into());

    cfg.service(
        web::scope("/api")
            .app_data(json_config)
            .service(handlers::get_me)
            .service(handlers::get_user)
            .service(handlers::follow_user)
            .service(handlers::unfollow_user)
            .service(handlers::get_home_feed)
            .service(handlers::create_tweet)
            .service(handlers::delete_tweet)
            .service(handlers::like_tweet)
            .service(handlers::unlike_tweet)
            .service(handlers::upload_media),
    )
    .service(Files::new(medias::MEDIA_URL_PREFIX, &config.media_dir));

    for asset_dir in ["css", "js"] {
        let path = config.static_dir.join(asset_dir);
        if path.is_dir() {
            cfg.service(Files::new(&format!("/{}", asset_dir), path));
        } else {
            warn!("Static directory {} is missing, not serving it", path.display());
        }
    }

    cfg.route(
        "/favicon.ico",
        web::get().to({
            let favicon = config.static_dir.join("favicon.ico");
            move || {
                let favicon = favicon.clone();
                async move { actix_files::NamedFile::open_async(favicon).await }
            }
        }),
    )
    .service(handlers::index);
}
