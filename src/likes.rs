use log::{info, warn};
use sea_orm::{ConnectionTrait, EntityTrait, Set, TransactionTrait};

use crate::entities::{likes, tweets};
use crate::error::{is_unique_violation, ApiError};

async fn ensure_tweet<C: ConnectionTrait>(db: &C, tweet_id: i32) -> Result<(), ApiError> {
    tweets::Entity::find_by_id(tweet_id)
        .one(db)
        .await?
        .map(|_| ())
        .ok_or_else(|| ApiError::NotFound("Tweet not found".to_string()))
}

fn duplicate_like() -> ApiError {
    ApiError::Conflict("Like already exists".to_string())
}

/// Records that `user_id` likes `tweet_id`.
///
/// The composite key on `likes` is what settles concurrent adds: a key
/// violation on insert is the same `Conflict` the pre-check reports.
pub async fn add_like<C>(db: &C, user_id: i32, tweet_id: i32) -> Result<(), ApiError>
where
    C: ConnectionTrait + TransactionTrait,
{
    let txn = db.begin().await?;

    ensure_tweet(&txn, tweet_id).await?;

    if likes::Entity::find_by_id((user_id, tweet_id))
        .one(&txn)
        .await?
        .is_some()
    {
        warn!("Duplicate like by user {} on tweet {}", user_id, tweet_id);
        return Err(duplicate_like());
    }

    let like = likes::ActiveModel {
        user_id: Set(user_id),
        tweet_id: Set(tweet_id),
    };
    match likes::Entity::insert(like).exec_without_returning(&txn).await {
        Ok(_) => {}
        Err(e) if is_unique_violation(&e) => {
            warn!("Concurrent like by user {} on tweet {}", user_id, tweet_id);
            return Err(duplicate_like());
        }
        Err(e) => return Err(e.into()),
    }

    txn.commit().await?;
    info!("Like added: user {} -> tweet {}", user_id, tweet_id);
    Ok(())
}

/// Removes a like. Not idempotent: a second removal reports `NotFound`.
pub async fn remove_like<C>(db: &C, user_id: i32, tweet_id: i32) -> Result<(), ApiError>
where
    C: ConnectionTrait + TransactionTrait,
{
    let txn = db.begin().await?;

    ensure_tweet(&txn, tweet_id).await?;

    let removed = likes::Entity::delete_by_id((user_id, tweet_id))
        .exec(&txn)
        .await?;
    if removed.rows_affected == 0 {
        return Err(ApiError::NotFound("Like already revoked".to_string()));
    }

    txn.commit().await?;
    info!("Like removed: user {} -> tweet {}", user_id, tweet_id);
    Ok(())
}
