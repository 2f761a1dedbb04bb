use fake::faker::lorem::en::Sentence;
use fake::faker::name::en::Name;
use fake::Fake;
use rand::seq::SliceRandom;
use std::error::Error;
use uuid::Uuid;

use microblog::entities::users;
use microblog::{config::Config, db, follows, likes, tweets};

const FIRST_USER_KEY: &str = "test";

fn count_from_env(key: &str, default: usize) -> usize {
    std::env::var(key)
        .ok()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(default)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    println!("Starting data seeding...");

    let config = Config::from_env();
    let conn = db::connect(&config).await?;
    db::migrate(&conn).await?;

    let num_users = count_from_env("SEED_USERS", 10);
    let tweets_per_user = count_from_env("SEED_TWEETS", 5);

    let users = seed_users(&conn, num_users).await?;
    let tweet_ids = seed_tweets(&conn, &users, tweets_per_user).await?;
    seed_follows(&conn, &users).await?;
    seed_likes(&conn, &users, &tweet_ids).await?;

    println!("Seeding completed!");
    Ok(())
}

async fn seed_users(
    conn: &sea_orm::DatabaseConnection,
    count: usize,
) -> Result<Vec<users::Model>, Box<dyn Error>> {
    println!("Creating {} users...", count);
    let mut users = Vec::with_capacity(count);

    for i in 0..count {
        let name: String = Name().fake();
        let name: String = name.chars().take(50).collect();
        let api_key = if i == 0 {
            FIRST_USER_KEY.to_string()
        } else {
            Uuid::new_v4().to_string()
        };

        let user = match microblog::users::create_user(conn, &name, &api_key).await {
            Ok(user) => user,
            Err(e) => {
                println!("Skipping user {}/{}: {}", i + 1, count, e);
                continue;
            }
        };
        println!(
            "Created user {}/{}: {} (api-key {})",
            i + 1,
            count,
            user.name,
            api_key
        );
        users.push(user);
    }

    Ok(users)
}

async fn seed_tweets(
    conn: &sea_orm::DatabaseConnection,
    users: &[users::Model],
    tweets_per_user: usize,
) -> Result<Vec<i32>, Box<dyn Error>> {
    println!("Creating {} tweets per user...", tweets_per_user);
    let total_tweets = users.len() * tweets_per_user;
    let mut tweet_ids = Vec::with_capacity(total_tweets);

    for user in users {
        for _ in 0..tweets_per_user {
            let content: String = Sentence(3..10).fake();
            let content: String = content.chars().take(tweets::MAX_CONTENT_CHARS).collect();
            tweet_ids.push(tweets::create_tweet(conn, user, &content, &[]).await?);

            if tweet_ids.len() % 100 == 0 {
                println!("Created {}/{} tweets", tweet_ids.len(), total_tweets);
            }
        }
    }

    Ok(tweet_ids)
}

async fn seed_follows(
    conn: &sea_orm::DatabaseConnection,
    users: &[users::Model],
) -> Result<(), Box<dyn Error>> {
    let per_user = (users.len() / 3).max(1);
    println!("Creating up to {} follows per user...", per_user);

    for user in users {
        let targets: Vec<&users::Model> = users
            .choose_multiple(&mut rand::thread_rng(), per_user)
            .filter(|target| target.id != user.id)
            .collect();
        for target in targets {
            if let Err(e) = follows::add_follow(conn, user.id, target.id).await {
                println!("Skipping follow {} -> {}: {}", user.id, target.id, e);
            }
        }
    }

    Ok(())
}

async fn seed_likes(
    conn: &sea_orm::DatabaseConnection,
    users: &[users::Model],
    tweet_ids: &[i32],
) -> Result<(), Box<dyn Error>> {
    let per_user = (tweet_ids.len() / 10).max(1);
    println!("Creating up to {} likes per user...", per_user);

    for user in users {
        let liked: Vec<i32> = tweet_ids
            .choose_multiple(&mut rand::thread_rng(), per_user)
            .copied()
            .collect();
        for tweet_id in liked {
            if let Err(e) = likes::add_like(conn, user.id, tweet_id).await {
                println!("Skipping like {} -> {}: {}", user.id, tweet_id, e);
            }
        }
    }

    Ok(())
}
