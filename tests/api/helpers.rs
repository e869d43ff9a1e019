use once_cell::sync::Lazy;
use reqwest::Response;
use serde_json::Value;
use sqlx::{migrate, postgres::PgRow, Connection, Executor, PgConnection, PgPool, Row};
use uuid::Uuid;
use wiremock::MockServer;

use newsletter_service::{
    config::{get_configuration, DatabaseSettings, Settings},
    domain::UnsubscribeToken,
    startup::{get_connection_db_pool, Application},
    telemetry::{get_subscriber, init_subscriber},
};

// Logs are discarded unless TEST_LOG is set, e.g. `TEST_LOG=true cargo test | bunyan`
static TRACING: Lazy<()> = Lazy::new(|| {
    if std::env::var("TEST_LOG").is_ok() {
        init_subscriber(get_subscriber("test".into(), "debug".into(), std::io::stdout));
    } else {
        init_subscriber(get_subscriber("test".into(), "debug".into(), std::io::sink));
    }
});

pub struct TestApp {
    pub config: Settings,
    pub address: String,
    pub db_pool: PgPool,
    pub email_server: MockServer,
    client: reqwest::Client,
}

/// A row of the subscribers table as the tests need to inspect it.
#[derive(Debug)]
pub struct StoredSubscriber {
    pub id: Uuid,
    pub email: String,
    pub active: bool,
    pub subscribed_at: chrono::DateTime<chrono::Utc>,
    pub unsubscribed_at: Option<chrono::DateTime<chrono::Utc>>,
    pub unsubscribe_token: String,
    pub source: Option<String>,
}

impl TestApp {
    pub async fn spawn_app() -> TestApp {
        Lazy::force(&TRACING);

        let mut config = get_configuration().expect("Missing configuration file.");
        let db_test_name = format!("db_{}", Uuid::new_v4().to_string().replace('-', "_"));
        let email_server = MockServer::start().await;

        // Port 0 asks the OS for any free port, so tests can run in parallel
        config.set_app_port(0);
        config.set_email_client_base_url(email_server.uri());

        let db_pool = configure_db(&mut config.database, db_test_name).await;

        let application = Application::build(config.clone())
            .await
            .expect("Failed to build application.");

        let address = format!("http://127.0.0.1:{}", application.get_port());

        tokio::spawn(application.run_until_stop());

        TestApp {
            address,
            config,
            db_pool,
            email_server,
            client: reqwest::Client::new(),
        }
    }

    pub fn token_for(&self, email: &str) -> String {
        UnsubscribeToken::generate(email, &self.config.get_unsubscribe_secret()).to_string()
    }

    pub async fn post_subscribe(&self, body: &Value) -> Response {
        self.client
            .post(format!("{}/subscribe", self.address))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn get_subscribers(&self) -> Response {
        self.client
            .get(format!("{}/subscribe", self.address))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn post_unsubscribe(&self, body: &Value) -> Response {
        self.client
            .post(format!("{}/unsubscribe", self.address))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn get_unsubscribe(&self, query: &[(&str, &str)]) -> Response {
        self.client
            .get(format!("{}/unsubscribe", self.address))
            .query(query)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn subscribers(&self) -> Vec<StoredSubscriber> {
        sqlx::query(
            r#"
            SELECT id, email, active, subscribed_at, unsubscribed_at, unsubscribe_token, source
            FROM subscribers
            ORDER BY subscribed_at
            "#,
        )
        .map(|row: PgRow| StoredSubscriber {
            id: row.get("id"),
            email: row.get("email"),
            active: row.get("active"),
            subscribed_at: row.get("subscribed_at"),
            unsubscribed_at: row.get("unsubscribed_at"),
            unsubscribe_token: row.get("unsubscribe_token"),
            source: row.get("source"),
        })
        .fetch_all(&self.db_pool)
        .await
        .expect("Query to fetch subscribers failed.")
    }
}

pub async fn json_body(response: Response) -> Value {
    response
        .json()
        .await
        .expect("Response body is not valid JSON.")
}

async fn configure_db(db_config: &mut DatabaseSettings, db_test_name: String) -> PgPool {
    let mut connection = PgConnection::connect_with(&db_config.get_db_options_without_name())
        .await
        .expect("Failed to connect to Postgres.");

    connection
        .execute(&*format!(r#"CREATE DATABASE "{}";"#, db_test_name))
        .await
        .expect("Failed to create database.");

    connection
        .close()
        .await
        .expect("Failed to close connection.");

    db_config.set_name(db_test_name);

    let db_pool = get_connection_db_pool(db_config);

    migrate!("./migrations")
        .run(&db_pool)
        .await
        .expect("Failed to run migrations.");

    db_pool
}
