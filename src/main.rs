use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware::Logger, web};
use anyhow::Context;
use log::info;

use pci_service::{config::Config, http, load_service};

#[actix_rt::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env()?;
    let service = web::Data::new(load_service(config.model_path())?);

    let addr = config.bind_addr();
    info!("listening at {}:{}", addr.0, addr.1);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header();

        App::new()
            .wrap(cors)
            .wrap(Logger::default())
            .app_data(service.clone())
            .configure(http::configure)
    })
    .bind(addr)
    .with_context(|| format!("cannot bind {}:{}", addr.0, addr.1))?
    .run()
    .await?;

    Ok(())
}
