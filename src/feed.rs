use log::debug;
use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, FromQueryResult, JoinType, QueryFilter,
    QueryOrder, QuerySelect, RelationTrait, TransactionTrait,
};
use std::collections::{BTreeSet, HashMap};

use crate::entities::{follows, likes, medias, tweets, users};
use crate::error::ApiError;
use crate::medias::media_url;
use crate::models::{FeedTweet, TweetLike, UserShort};

#[derive(Debug, FromQueryResult)]
struct TweetRow {
    id: i32,
    content: String,
    author_id: i32,
    author_name: String,
}

#[derive(Debug, FromQueryResult)]
struct LikeRow {
    tweet_id: i32,
    user_id: i32,
    name: String,
}

#[derive(Debug, FromQueryResult)]
struct MediaRow {
    tweet_id: i32,
    path_url: String,
}

/// The caller's own id plus everyone they follow.
async fn author_ids<C: ConnectionTrait>(db: &C, user_id: i32) -> Result<Vec<i32>, ApiError> {
    let followed = follows::Entity::find()
        .filter(follows::Column::FollowerId.eq(user_id))
        .all(db)
        .await?;

    let mut ids: BTreeSet<i32> = followed.into_iter().map(|f| f.followed_id).collect();
    ids.insert(user_id);
    Ok(ids.into_iter().collect())
}

/// Tweets by the user and the users they follow, newest first, each with
/// its attachments, author and likes.
pub async fn home_feed<C>(db: &C, user: &users::Model) -> Result<Vec<FeedTweet>, ApiError>
where
    C: ConnectionTrait + TransactionTrait,
{
    let txn = db.begin().await?;

    let authors = author_ids(&txn, user.id).await?;
    debug!("Feed for user {} covers authors {:?}", user.id, authors);

    let rows = tweets::Entity::find()
        .select_only()
        .column(tweets::Column::Id)
        .column(tweets::Column::Content)
        .column_as(users::Column::Id, "author_id")
        .column_as(users::Column::Name, "author_name")
        .join(JoinType::InnerJoin, tweets::Relation::Users.def())
        .filter(tweets::Column::UserId.is_in(authors))
        .order_by_desc(tweets::Column::CreatedAt)
        .order_by_desc(tweets::Column::Id)
        .into_model::<TweetRow>()
        .all(&txn)
        .await?;

    if rows.is_empty() {
        txn.commit().await?;
        return Ok(Vec::new());
    }
    let tweet_ids: Vec<i32> = rows.iter().map(|row| row.id).collect();

    let media_rows = medias::Entity::find()
        .select_only()
        .column(medias::Column::TweetId)
        .column(medias::Column::PathUrl)
        .filter(medias::Column::TweetId.is_in(tweet_ids.clone()))
        .order_by_asc(medias::Column::Id)
        .into_model::<MediaRow>()
        .all(&txn)
        .await?;

    let like_rows = likes::Entity::find()
        .select_only()
        .column(likes::Column::TweetId)
        .column_as(users::Column::Id, "user_id")
        .column(users::Column::Name)
        .join(JoinType::InnerJoin, likes::Relation::Users.def())
        .filter(likes::Column::TweetId.is_in(tweet_ids))
        .order_by_asc(users::Column::Id)
        .into_model::<LikeRow>()
        .all(&txn)
        .await?;

    txn.commit().await?;

    let mut attachments: HashMap<i32, Vec<String>> = HashMap::new();
    for media in media_rows {
        attachments
            .entry(media.tweet_id)
            .or_default()
            .push(media_url(&media.path_url));
    }

    let mut likes_by_tweet: HashMap<i32, Vec<TweetLike>> = HashMap::new();
    for like in like_rows {
        likes_by_tweet.entry(like.tweet_id).or_default().push(TweetLike {
            user_id: like.user_id,
            name: like.name,
        });
    }

    let feed: Vec<FeedTweet> = rows
        .into_iter()
        .map(|row| FeedTweet {
            id: row.id,
            content: row.content,
            attachments: attachments.remove(&row.id).unwrap_or_default(),
            author: UserShort {
                id: row.author_id,
                name: row.author_name,
            },
            likes: likes_by_tweet.remove(&row.id).unwrap_or_default(),
        })
        .collect();

    debug!("Feed for user {} has {} tweets", user.id, feed.len());
    Ok(feed)
}
