use actix_files::NamedFile;
use actix_multipart::Multipart;
use actix_web::{delete, get, post, web, HttpResponse};
use futures::TryStreamExt;
use log::{debug, warn};
use sea_orm::DatabaseConnection;

use crate::auth::CurrentUser;
use crate::config::Config;
use crate::error::ApiError;
use crate::models::{
    CreateTweetRequest, CreateTweetResponse, FeedResponse, MediaResponse, ResultResponse,
    UserResponse,
};
use crate::{feed, follows, likes, medias, tweets, users};

const UPLOAD_FIELD: &str = "file";

fn parse_id(raw: &str, not_found: &str) -> Result<i32, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::NotFound(not_found.to_string()))
}

#[get("/")]
pub async fn index(config: web::Data<Config>) -> Result<NamedFile, ApiError> {
    Ok(NamedFile::open_async(config.static_dir.join("index.html")).await?)
}

#[get("/users/me")]
pub async fn get_me(
    user: CurrentUser,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    let profile = users::profile(db.get_ref(), &user.0).await?;
    Ok(HttpResponse::Ok().json(UserResponse {
        result: true,
        user: profile,
    }))
}

#[get("/users/{user_id}")]
pub async fn get_user(
    _user: CurrentUser,
    db: web::Data<DatabaseConnection>,
    user_id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let user_id = parse_id(&user_id, "User not found")?;
    let profile = users::profile_by_id(db.get_ref(), user_id).await?;
    Ok(HttpResponse::Ok().json(UserResponse {
        result: true,
        user: profile,
    }))
}

#[post("/users/{user_id}/follow")]
pub async fn follow_user(
    user: CurrentUser,
    db: web::Data<DatabaseConnection>,
    user_id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let followed_id = parse_id(&user_id, "User not found")?;
    follows::add_follow(db.get_ref(), user.id(), followed_id).await?;
    Ok(HttpResponse::Ok().json(ResultResponse::ok()))
}

#[delete("/users/{user_id}/follow")]
pub async fn unfollow_user(
    user: CurrentUser,
    db: web::Data<DatabaseConnection>,
    user_id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let followed_id = parse_id(&user_id, "Subscription not found")?;
    follows::remove_follow(db.get_ref(), user.id(), followed_id).await?;
    Ok(HttpResponse::Ok().json(ResultResponse::ok()))
}

#[get("/tweets")]
pub async fn get_home_feed(
    user: CurrentUser,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    let tweets = feed::home_feed(db.get_ref(), &user.0).await?;
    Ok(HttpResponse::Ok().json(FeedResponse {
        result: true,
        tweets,
    }))
}

#[post("/tweets")]
pub async fn create_tweet(
    user: CurrentUser,
    db: web::Data<DatabaseConnection>,
    tweet_data: web::Json<CreateTweetRequest>,
) -> Result<HttpResponse, ApiError> {
    let tweet_id = tweets::create_tweet(
        db.get_ref(),
        &user.0,
        &tweet_data.tweet_data,
        &tweet_data.tweet_media_ids,
    )
    .await?;
    Ok(HttpResponse::Ok().json(CreateTweetResponse {
        result: true,
        tweet_id,
    }))
}

#[delete("/tweets/{tweet_id}")]
pub async fn delete_tweet(
    user: CurrentUser,
    db: web::Data<DatabaseConnection>,
    tweet_id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let tweet_id = parse_id(&tweet_id, "Tweet not found")?;
    tweets::delete_tweet(db.get_ref(), &user.0, tweet_id).await?;
    Ok(HttpResponse::Ok().json(ResultResponse::ok()))
}

#[post("/tweets/{tweet_id}/likes")]
pub async fn like_tweet(
    user: CurrentUser,
    db: web::Data<DatabaseConnection>,
    tweet_id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let tweet_id = parse_id(&tweet_id, "Tweet not found")?;
    likes::add_like(db.get_ref(), user.id(), tweet_id).await?;
    Ok(HttpResponse::Ok().json(ResultResponse::ok()))
}

#[delete("/tweets/{tweet_id}/likes")]
pub async fn unlike_tweet(
    user: CurrentUser,
    db: web::Data<DatabaseConnection>,
    tweet_id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let tweet_id = parse_id(&tweet_id, "Tweet not found")?;
    likes::remove_like(db.get_ref(), user.id(), tweet_id).await?;
    Ok(HttpResponse::Ok().json(ResultResponse::ok()))
}

#[post("/medias")]
pub async fn upload_media(
    user: CurrentUser,
    db: web::Data<DatabaseConnection>,
    config: web::Data<Config>,
    mut payload: Multipart,
) -> Result<HttpResponse, ApiError> {
    let malformed = |e: actix_multipart::MultipartError| {
        warn!("Malformed upload from user {}: {}", user.id(), e);
        ApiError::BadRequest("File is missing".to_string())
    };

    while let Some(mut field) = payload.try_next().await.map_err(malformed)? {
        if field.name() != UPLOAD_FIELD {
            continue;
        }
        let filename = match field.content_disposition().get_filename() {
            Some(name) if !name.is_empty() => name.to_owned(),
            _ => break,
        };

        let mut bytes = Vec::new();
        while let Some(chunk) = field.try_next().await.map_err(malformed)? {
            if bytes.len() + chunk.len() > config.max_upload_bytes {
                warn!(
                    "Upload {} from user {} exceeds {} bytes",
                    filename,
                    user.id(),
                    config.max_upload_bytes
                );
                return Err(ApiError::BadRequest("File is too large".to_string()));
            }
            bytes.extend_from_slice(&chunk);
        }
        debug!("Received {} ({} bytes) from user {}", filename, bytes.len(), user.id());

        let media_id =
            medias::store_media(db.get_ref(), &config.media_dir, &filename, &bytes).await?;
        return Ok(HttpResponse::Ok().json(MediaResponse {
            result: true,
            media_id,
        }));
    }

    Err(ApiError::BadRequest("File is missing".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_numeric_ids_are_not_found() {
        assert_eq!(
            parse_id("{}", "Tweet not found"),
            Err(ApiError::NotFound("Tweet not found".to_string()))
        );
        assert_eq!(parse_id("42", "Tweet not found"), Ok(42));
    }
}
