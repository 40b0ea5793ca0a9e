use actix_web::{web, App, HttpServer};
use log::{error, info};

use listkeeper::config::Config;
use listkeeper::db::Backend;
use listkeeper::handlers;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            error!("{err}");
            std::process::exit(1);
        }
    };

    let backend = match Backend::init(&config).await {
        Ok(backend) => backend,
        Err(err) => {
            error!("failed to initialize backend: {err}");
            std::process::exit(1);
        }
    };

    let data = web::Data::new(backend.clone());
    info!("listening on 127.0.0.1:8080");
    HttpServer::new(move || {
        App::new()
            .app_data(data.clone())
            .service(handlers::create_mailing_list)
            .service(handlers::delete_mailing_list)
            .service(handlers::get_mailing_list)
            .service(handlers::list_mailing_lists)
            .service(handlers::create_subscriber)
            .service(handlers::delete_subscriber)
            .service(handlers::get_subscriber_lists)
            .service(handlers::subscribe)
            .service(handlers::unsubscribe)
    })
    .bind("127.0.0.1:8080")?
    .run()
    .await?;

    backend.shutdown().await;
    Ok(())
}
