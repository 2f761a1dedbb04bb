use log::{debug, info};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, FromQueryResult, JoinType,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set, TransactionTrait,
};

use crate::entities::{follows, users};
use crate::error::{is_unique_violation, ApiError};
use crate::models::{UserProfile, UserShort};

#[derive(Debug, FromQueryResult)]
struct UserRow {
    id: i32,
    name: String,
}

impl From<UserRow> for UserShort {
    fn from(row: UserRow) -> Self {
        UserShort {
            id: row.id,
            name: row.name,
        }
    }
}

/// Exact match on the stored key. Returns `None` for unknown keys.
pub async fn find_by_api_key<C: ConnectionTrait>(
    db: &C,
    api_key: &str,
) -> Result<Option<users::Model>, ApiError> {
    let user = users::Entity::find()
        .filter(users::Column::ApiKey.eq(api_key))
        .one(db)
        .await?;
    Ok(user)
}

pub async fn create_user<C: ConnectionTrait>(
    db: &C,
    name: &str,
    api_key: &str,
) -> Result<users::Model, ApiError> {
    let user = users::ActiveModel {
        name: Set(name.to_owned()),
        api_key: Set(api_key.to_owned()),
        ..Default::default()
    };

    match user.insert(db).await {
        Ok(user) => {
            info!("User created: {} ({})", user.name, user.id);
            Ok(user)
        }
        Err(e) if is_unique_violation(&e) => {
            Err(ApiError::Conflict("API key already registered".to_string()))
        }
        Err(e) => Err(e.into()),
    }
}

/// Users following `user_id`.
pub async fn followers<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
) -> Result<Vec<UserShort>, ApiError> {
    let rows = users::Entity::find()
        .select_only()
        .column(users::Column::Id)
        .column(users::Column::Name)
        .join(JoinType::InnerJoin, follows::Relation::Follower.def().rev())
        .filter(follows::Column::FollowedId.eq(user_id))
        .order_by_asc(users::Column::Id)
        .into_model::<UserRow>()
        .all(db)
        .await?;
    Ok(rows.into_iter().map(UserShort::from).collect())
}

/// Users that `user_id` follows.
pub async fn following<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
) -> Result<Vec<UserShort>, ApiError> {
    let rows = users::Entity::find()
        .select_only()
        .column(users::Column::Id)
        .column(users::Column::Name)
        .join(JoinType::InnerJoin, follows::Relation::Followed.def().rev())
        .filter(follows::Column::FollowerId.eq(user_id))
        .order_by_asc(users::Column::Id)
        .into_model::<UserRow>()
        .all(db)
        .await?;
    Ok(rows.into_iter().map(UserShort::from).collect())
}

pub async fn profile<C: ConnectionTrait>(
    db: &C,
    user: &users::Model,
) -> Result<UserProfile, ApiError> {
    let followers = followers(db, user.id).await?;
    let following = following(db, user.id).await?;
    debug!(
        "Profile {}: {} followers, {} following",
        user.id,
        followers.len(),
        following.len()
    );

    Ok(UserProfile {
        id: user.id,
        name: user.name.clone(),
        followers,
        following,
    })
}

pub async fn profile_by_id<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
) -> Result<UserProfile, ApiError> {
    let user = users::Entity::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;
    profile(db, &user).await
}

/// Removes the user; the store cascades to their tweets (and those tweets'
/// media and likes), their likes, and follow edges in both directions.
pub async fn delete_user<C>(db: &C, user_id: i32) -> Result<(), ApiError>
where
    C: ConnectionTrait + TransactionTrait,
{
    let txn = db.begin().await?;

    let user = users::Entity::find_by_id(user_id)
        .one(&txn)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;
    users::Entity::delete_by_id(user.id).exec(&txn).await?;

    txn.commit().await?;
    info!("User deleted: {}", user_id);
    Ok(())
}
