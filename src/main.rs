use std::io;
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use env_logger::Env;

use todo_api::auth::{PasswordCipher, TokenService};
use todo_api::config::Config;
use todo_api::routes;
use todo_api::store::{PgStore, Store};

#[actix_web::main]
async fn main() -> io::Result<()> {
    let dotenv_result = dotenv::dotenv();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    if let Err(e) = dotenv_result {
        log::info!("no .env file loaded ({}), using process environment", e);
    }

    let config = Config::from_env();

    let pg = PgStore::connect(&config.database)
        .await
        .map_err(|e| io::Error::other(format!("failed to connect to database: {}", e)))?;
    pg.migrate()
        .await
        .map_err(|e| io::Error::other(e.to_string()))?;

    let store: web::Data<dyn Store> = web::Data::from(Arc::new(pg) as Arc<dyn Store>);
    let cipher = web::Data::new(PasswordCipher::new(&config.jwt_secret));
    let tokens = web::Data::new(TokenService::from_config(&config));

    let (host, port) = config.bind_address();
    log::info!("Starting todo-api server at http://{}:{}", host, port);

    HttpServer::new(move || {
        App::new()
            .app_data(store.clone())
            .app_data(cipher.clone())
            .app_data(tokens.clone())
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
    .bind((host, port))?
    .run()
    .await
}
