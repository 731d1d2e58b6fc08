use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use std::io;

use tasksync::{auth::TokenKeys, config::Config, db, routes, AppError};

fn to_io_error(err: AppError) -> io::Error {
    io::Error::new(io::ErrorKind::Other, err.to_string())
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env().map_err(to_io_error)?;
    log::info!("Loaded configuration: {:?}", config);

    let pool = db::connect(&config).await.map_err(to_io_error)?;
    db::migrate(&pool).await.map_err(to_io_error)?;

    let keys = web::Data::new(TokenKeys::new(&config.jwt_secret, config.token_lifetime));
    let pool = web::Data::new(pool);

    log::info!("Starting tasksync server at {}", config.server_url());
    HttpServer::new(move || {
        App::new()
            .app_data(pool.clone())
            .app_data(keys.clone())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .configure(routes::config)
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}
