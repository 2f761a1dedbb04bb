use log::{info, warn};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use std::path::{Component, Path};

use crate::entities::medias;
use crate::error::{is_unique_violation, ApiError};

/// Public URL prefix under which stored files are served.
pub const MEDIA_URL_PREFIX: &str = "/media";

pub fn media_url(path_url: &str) -> String {
    format!("{}/{}", MEDIA_URL_PREFIX, path_url)
}

/// Accepts only a single plain file name, so the upload cannot land outside
/// the media directory.
pub fn sanitize_filename(raw: &str) -> Result<&str, ApiError> {
    let invalid = || ApiError::BadRequest("Invalid filename".to_string());

    if raw.is_empty() || raw.len() > 255 || raw.contains(['/', '\\', '\0']) {
        return Err(invalid());
    }
    let mut components = Path::new(raw).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(name)), None) if name == raw => Ok(raw),
        _ => Err(invalid()),
    }
}

fn name_in_use() -> ApiError {
    ApiError::Conflict("File name already in use".to_string())
}

/// A recorded name can be handed out again only while no tweet holds it.
fn reusable(media: medias::Model) -> Result<i32, ApiError> {
    match media.tweet_id {
        None => Ok(media.id),
        Some(tweet_id) => {
            warn!(
                "Upload of {} rejected, attached to tweet {}",
                media.path_url, tweet_id
            );
            Err(name_in_use())
        }
    }
}

async fn find_by_path<C: ConnectionTrait>(
    db: &C,
    filename: &str,
) -> Result<Option<medias::Model>, ApiError> {
    let media = medias::Entity::find()
        .filter(medias::Column::PathUrl.eq(filename))
        .one(db)
        .await?;
    Ok(media)
}

/// Returns the id of the unattached row for `filename`, inserting it if
/// needed. The unique key on `path_url` settles concurrent uploads of a new
/// name: the loser re-reads the winner's row.
async fn record_media<C>(db: &C, filename: &str) -> Result<i32, ApiError>
where
    C: ConnectionTrait + TransactionTrait,
{
    let txn = db.begin().await?;

    if let Some(media) = find_by_path(&txn, filename).await? {
        return reusable(media);
    }

    let inserted = medias::ActiveModel {
        tweet_id: Set(None),
        path_url: Set(filename.to_owned()),
        ..Default::default()
    }
    .insert(&txn)
    .await;

    match inserted {
        Ok(media) => {
            txn.commit().await?;
            Ok(media.id)
        }
        Err(e) if is_unique_violation(&e) => {
            txn.rollback().await?;
            let media = find_by_path(db, filename)
                .await?
                .ok_or_else(name_in_use)?;
            reusable(media)
        }
        Err(e) => Err(e.into()),
    }
}

/// Records `filename` as an unattached upload and writes `bytes` to
/// `media_dir/filename`. Re-uploading a name that no tweet holds yet keeps
/// its row and replaces the bytes; a name held by a tweet is a `Conflict`.
pub async fn store_media<C>(
    db: &C,
    media_dir: &Path,
    filename: &str,
    bytes: &[u8],
) -> Result<i32, ApiError>
where
    C: ConnectionTrait + TransactionTrait,
{
    let filename = sanitize_filename(filename)?;

    let media_id = record_media(db, filename).await?;

    tokio::fs::create_dir_all(media_dir).await?;
    tokio::fs::write(media_dir.join(filename), bytes).await?;

    info!(
        "Media stored: {} ({} bytes) as id {}",
        filename,
        bytes.len(),
        media_id
    );
    Ok(media_id)
}
