use actix_web::{middleware::Logger, web, App, HttpServer};
use env_logger::{Builder, Env};
use log::info;

use microblog::{config::Config, db};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    Builder::from_env(Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .init();

    info!("Starting microblog backend...");
    let config = Config::from_env();
    std::fs::create_dir_all(&config.media_dir)?;

    let conn = db::connect(&config)
        .await
        .expect("Failed to connect to the database");
    db::migrate(&conn)
        .await
        .expect("Failed to apply database migrations");
    info!("Connected to the database, schema is up to date");

    let bind_addr = config.bind_addr.clone();
    let workers = config.workers;
    let conn = web::Data::new(conn);
    let app_config = web::Data::new(config);

    info!("Listening on {} with {} workers", bind_addr, workers);
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(conn.clone())
            .app_data(app_config.clone())
            .configure(|cfg| microblog::configure(cfg, &app_config))
    })
    .workers(workers)
    .bind(bind_addr)?
    .run()
    .await
}
