use log::{info, warn};
use sea_orm::{ConnectionTrait, EntityTrait, Set, TransactionTrait};

use crate::entities::follows;
use crate::error::{is_foreign_key_violation, is_unique_violation, ApiError};

fn already_made() -> ApiError {
    ApiError::BadRequest("Subscription already made".to_string())
}

/// Adds the edge `follower_id -> followed_id`. Self-follow is allowed; an
/// unknown target is caught by the foreign key and reported as `NotFound`.
pub async fn add_follow<C>(db: &C, follower_id: i32, followed_id: i32) -> Result<(), ApiError>
where
    C: ConnectionTrait + TransactionTrait,
{
    let txn = db.begin().await?;

    if follows::Entity::find_by_id((follower_id, followed_id))
        .one(&txn)
        .await?
        .is_some()
    {
        warn!("User {} already follows {}", follower_id, followed_id);
        return Err(already_made());
    }

    let edge = follows::ActiveModel {
        follower_id: Set(follower_id),
        followed_id: Set(followed_id),
    };
    match follows::Entity::insert(edge).exec_without_returning(&txn).await {
        Ok(_) => {}
        Err(e) if is_unique_violation(&e) => return Err(already_made()),
        Err(e) if is_foreign_key_violation(&e) => {
            return Err(ApiError::NotFound("User not found".to_string()))
        }
        Err(e) => return Err(e.into()),
    }

    txn.commit().await?;
    info!("Follow added: {} -> {}", follower_id, followed_id);
    Ok(())
}

pub async fn remove_follow<C>(db: &C, follower_id: i32, followed_id: i32) -> Result<(), ApiError>
where
    C: ConnectionTrait + TransactionTrait,
{
    let txn = db.begin().await?;

    let removed = follows::Entity::delete_by_id((follower_id, followed_id))
        .exec(&txn)
        .await?;
    if removed.rows_affected == 0 {
        return Err(ApiError::NotFound("Subscription not found".to_string()));
    }

    txn.commit().await?;
    info!("Follow removed: {} -> {}", follower_id, followed_id);
    Ok(())
}
