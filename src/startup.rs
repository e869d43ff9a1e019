use actix_web::dev::Server;
use actix_web::{web, App, HttpResponse, HttpServer};
use secrecy::Secret;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};
use std::net::TcpListener;
use std::sync::Arc;
use tracing_actix_web::TracingLogger;

use crate::config::{DatabaseSettings, Settings};
use crate::routes::{
    handle_create_subscription, handle_list_subscribers, handle_unsubscribe,
    handle_unsubscribe_link, health_check, ErrorBody,
};
use crate::subscriber_store::{PgSubscriberStore, SubscriberStore};

pub struct Application {
    pub port: u16,
    pub server: Server,
}

/// Secret mixed into every unsubscribe token, shared with the handlers.
pub struct UnsubscribeSecret(pub Secret<String>);

impl Application {
    pub async fn build(config: Settings) -> Result<Self, std::io::Error> {
        let db_pool = get_connection_db_pool(&config.database);
        let store: Arc<dyn SubscriberStore> = Arc::new(PgSubscriberStore::new(db_pool));

        let listener = TcpListener::bind(config.get_address())?;
        let port = listener.local_addr()?.port();

        tracing::info!("Server listening on {}:{}", config.application.get_host(), port);

        let server = run(listener, store, config.get_unsubscribe_secret())?;

        Ok(Self { port, server })
    }

    pub fn get_port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stop(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}

/// Turns body and query extraction failures into the JSON error body every
/// other endpoint answers with.
fn bad_request<E>(err: E) -> actix_web::Error
where
    E: std::fmt::Debug + std::fmt::Display + 'static,
{
    let message = err.to_string();
    let response = HttpResponse::BadRequest().json(ErrorBody { error: &message });

    actix_web::error::InternalError::from_response(err, response).into()
}

pub fn run(
    listener: TcpListener,
    store: Arc<dyn SubscriberStore>,
    unsubscribe_secret: Secret<String>,
) -> Result<Server, std::io::Error> {
    let store: web::Data<dyn SubscriberStore> = web::Data::from(store);
    let unsubscribe_secret = web::Data::new(UnsubscribeSecret(unsubscribe_secret));

    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .app_data(web::JsonConfig::default().error_handler(|err, _req| bad_request(err)))
            .app_data(web::QueryConfig::default().error_handler(|err, _req| bad_request(err)))
            .route("/health_check", web::get().to(health_check))
            .route("/subscribe", web::post().to(handle_create_subscription))
            .route("/subscribe", web::get().to(handle_list_subscribers))
            .route("/unsubscribe", web::post().to(handle_unsubscribe))
            .route("/unsubscribe", web::get().to(handle_unsubscribe_link))
            .app_data(store.clone())
            .app_data(unsubscribe_secret.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}

pub fn get_connection_db_pool(config: &DatabaseSettings) -> Pool<Postgres> {
    PgPoolOptions::new()
        .acquire_timeout(std::time::Duration::from_secs(2))
        .connect_lazy_with(config.get_db_options())
}
