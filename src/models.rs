use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserShort {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i32,
    pub name: String,
    pub followers: Vec<UserShort>,
    pub following: Vec<UserShort>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub result: bool,
    pub user: UserProfile,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TweetLike {
    pub user_id: i32,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedTweet {
    pub id: i32,
    pub content: String,
    pub attachments: Vec<String>,
    pub author: UserShort,
    pub likes: Vec<TweetLike>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FeedResponse {
    pub result: bool,
    pub tweets: Vec<FeedTweet>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateTweetRequest {
    pub tweet_data: String,
    #[serde(default)]
    pub tweet_media_ids: Vec<i32>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateTweetResponse {
    pub result: bool,
    pub tweet_id: i32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MediaResponse {
    pub result: bool,
    pub media_id: i32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ResultResponse {
    pub result: bool,
}

impl ResultResponse {
    pub fn ok() -> Self {
        Self { result: true }
    }
}
