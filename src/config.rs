use log::{info, warn};
use std::{env, fmt::Display, path::PathBuf, str::FromStr};

/// Runtime settings, read once from the environment at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: String,
    pub media_dir: PathBuf,
    pub static_dir: PathBuf,
    pub workers: usize,
    pub db_max_connections: u32,
    pub max_upload_bytes: usize,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: load("DATABASE_URL", "sqlite://microblog.db?mode=rwc".to_string()),
            bind_addr: load("BIND_ADDR", "127.0.0.1:8080".to_string()),
            media_dir: PathBuf::from(load("MEDIA_DIR", "media".to_string())),
            static_dir: PathBuf::from(load("STATIC_DIR", "static".to_string())),
            workers: load("WORKERS", num_cpus::get()),
            db_max_connections: load("DB_MAX_CONNECTIONS", 10),
            max_upload_bytes: load("MAX_UPLOAD_BYTES", 10 * 1024 * 1024),
        }
    }
}

fn load<T>(key: &str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    match env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|e| {
            warn!("Invalid {key} value {raw:?}: {e}, using default: {default}");
            default
        }),
        Err(_) => {
            info!("{key} not set, using default: {default}");
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unparsable_value_falls_back_to_default() {
        env::set_var("MICROBLOG_TEST_WORKERS", "many");
        let workers: usize = load("MICROBLOG_TEST_WORKERS", 4);
        assert_eq!(workers, 4);
        env::remove_var("MICROBLOG_TEST_WORKERS");
    }

    #[test]
    fn set_value_is_parsed() {
        env::set_var("MICROBLOG_TEST_BIND", "0.0.0.0:9000");
        let bind: String = load("MICROBLOG_TEST_BIND", "127.0.0.1:8080".to_string());
        assert_eq!(bind, "0.0.0.0:9000");
        env::remove_var("MICROBLOG_TEST_BIND");
    }
}
