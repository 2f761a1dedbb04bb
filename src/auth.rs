use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use futures::future::LocalBoxFuture;
use log::{debug, error, warn};
use sea_orm::DatabaseConnection;

use crate::entities::users;
use crate::error::ApiError;
use crate::users::find_by_api_key;

pub const API_KEY_HEADER: &str = "api-key";

/// The user resolved from the `api-key` header.
///
/// A missing or empty header is `Unauthorized`; a key that matches no user is
/// reported as `NotFound`.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub users::Model);

impl CurrentUser {
    pub fn id(&self) -> i32 {
        self.0.id
    }
}

#[derive(Debug, PartialEq, Eq)]
enum ApiKey {
    Missing,
    Present(String),
    /// Sent, but not valid text, so it cannot match any stored key.
    Unreadable,
}

fn header_key(req: &HttpRequest) -> ApiKey {
    match req.headers().get(API_KEY_HEADER) {
        None => ApiKey::Missing,
        Some(value) if value.is_empty() => ApiKey::Missing,
        Some(value) => match value.to_str() {
            Ok(key) => ApiKey::Present(key.to_owned()),
            Err(_) => ApiKey::Unreadable,
        },
    }
}

fn invalid_key() -> ApiError {
    warn!("Unknown API key rejected");
    ApiError::NotFound("Invalid API key".to_string())
}

impl FromRequest for CurrentUser {
    type Error = ApiError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let key = header_key(req);
        let db = req.app_data::<web::Data<DatabaseConnection>>().cloned();

        Box::pin(async move {
            let key = match key {
                ApiKey::Present(key) => key,
                ApiKey::Missing => {
                    warn!("Request without API key rejected");
                    return Err(ApiError::Unauthorized("API key is missing".to_string()));
                }
                ApiKey::Unreadable => return Err(invalid_key()),
            };
            let Some(db) = db else {
                error!("Database connection is not registered in app data");
                return Err(ApiError::Internal("Internal server error".to_string()));
            };

            match find_by_api_key(db.get_ref(), &key).await? {
                Some(user) => {
                    debug!("Resolved user {} ({})", user.id, user.name);
                    Ok(CurrentUser(user))
                }
                None => Err(invalid_key()),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{http::header::HeaderValue, test::TestRequest};

    #[test]
    fn empty_header_counts_as_missing() {
        let req = TestRequest::default()
            .insert_header((API_KEY_HEADER, ""))
            .to_http_request();
        assert_eq!(header_key(&req), ApiKey::Missing);
    }

    #[test]
    fn header_is_taken_verbatim() {
        let req = TestRequest::default()
            .insert_header((API_KEY_HEADER, "Key-42"))
            .to_http_request();
        assert_eq!(header_key(&req), ApiKey::Present("Key-42".to_string()));
    }

    #[actix_web::test]
    async fn undecodable_header_is_an_unknown_key() {
        let (req, mut payload) = TestRequest::default()
            .insert_header((API_KEY_HEADER, HeaderValue::from_bytes(b"k\xff").unwrap()))
            .to_http_parts();
        assert_eq!(header_key(&req), ApiKey::Unreadable);

        let err = CurrentUser::from_request(&req, &mut payload)
            .await
            .unwrap_err();
        assert_eq!(err, ApiError::NotFound("Invalid API key".to_string()));
    }

    #[actix_web::test]
    async fn missing_header_is_unauthorized_before_store_lookup() {
        let (req, mut payload) = TestRequest::default().to_http_parts();
        let err = CurrentUser::from_request(&req, &mut payload)
            .await
            .unwrap_err();
        assert_eq!(err, ApiError::Unauthorized("API key is missing".to_string()));
    }
}
