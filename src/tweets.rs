use chrono::Utc;
use log::{info, warn};
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter,
    Set, TransactionTrait,
};

use crate::entities::{medias, tweets, users};
use crate::error::ApiError;

pub const MAX_CONTENT_CHARS: usize = 280;

pub fn validate_content(content: &str) -> Result<(), ApiError> {
    if content.trim().is_empty() {
        return Err(ApiError::BadRequest("Tweet content is empty".to_string()));
    }
    if content.chars().count() > MAX_CONTENT_CHARS {
        return Err(ApiError::BadRequest(format!(
            "Tweet content exceeds {} characters",
            MAX_CONTENT_CHARS
        )));
    }
    Ok(())
}

/// Stores a tweet by `author` and points every media row in `media_ids` at it,
/// all in one transaction. Returns the new tweet id.
pub async fn create_tweet<C>(
    db: &C,
    author: &users::Model,
    content: &str,
    media_ids: &[i32],
) -> Result<i32, ApiError>
where
    C: ConnectionTrait + TransactionTrait,
{
    validate_content(content)?;

    let txn = db.begin().await?;

    let tweet = tweets::ActiveModel {
        user_id: Set(author.id),
        content: Set(content.to_owned()),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    if !media_ids.is_empty() {
        let attached = medias::Entity::update_many()
            .col_expr(medias::Column::TweetId, Expr::value(tweet.id))
            .filter(medias::Column::Id.is_in(media_ids.iter().copied()))
            .exec(&txn)
            .await?;
        info!(
            "Attached {} of {} media to tweet {}",
            attached.rows_affected,
            media_ids.len(),
            tweet.id
        );
    }

    txn.commit().await?;
    info!("Tweet created successfully: {}", tweet.id);
    Ok(tweet.id)
}

/// Deletes a tweet when the caller's key matches its author's key. Media and
/// likes of the tweet go with it.
pub async fn delete_tweet<C>(db: &C, caller: &users::Model, tweet_id: i32) -> Result<(), ApiError>
where
    C: ConnectionTrait + TransactionTrait,
{
    let txn = db.begin().await?;

    let (tweet, author) = tweets::Entity::find_by_id(tweet_id)
        .find_also_related(users::Entity)
        .one(&txn)
        .await?
        .ok_or_else(|| ApiError::NotFound("Tweet not found".to_string()))?;

    let owned = author.map_or(false, |author| author.api_key == caller.api_key);
    if !owned {
        warn!(
            "User {} tried to delete tweet {} of user {}",
            caller.id, tweet.id, tweet.user_id
        );
        return Err(ApiError::Forbidden(
            "You can only delete your own tweets".to_string(),
        ));
    }

    tweets::Entity::delete_by_id(tweet.id).exec(&txn).await?;
    txn.commit().await?;

    info!("Tweet deleted: {}", tweet_id);
    Ok(())
}
