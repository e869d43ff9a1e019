use std::path::{Path, PathBuf};
use std::process::ExitCode;

use chrono::Utc;
use clap::Parser;

use newsletter_service::config::{get_configuration, Settings};
use newsletter_service::email_client::EmailClient;
use newsletter_service::generative_ai::GenerativeAiClient;
use newsletter_service::newsletter::{
    deliver_issue, draft_articles, render_issue, write_intro, Article,
};
use newsletter_service::startup::get_connection_db_pool;
use newsletter_service::subscriber_store::{PgSubscriberStore, StoreError};
use newsletter_service::telemetry::{get_subscriber, init_subscriber};
use newsletter_service::utils::error_chain_fmt;

/// Composes this week's digest and mails it to every active subscriber.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// JSON array of `{title, url, content}` articles from the news fetcher
    #[arg(long)]
    articles: PathBuf,

    /// Print the rendered issue instead of sending it
    #[arg(long)]
    dry_run: bool,
}

#[derive(thiserror::Error)]
enum SendNewsletterError {
    #[error("Failed to load the configuration.")]
    Config(#[from] config::ConfigError),
    #[error("Failed to read the articles file.")]
    ReadArticles(#[from] std::io::Error),
    #[error("The articles file is not a JSON array of articles.")]
    ParseArticles(#[from] serde_json::Error),
    #[error("Failed to build an HTTP client.")]
    HttpClient(#[from] reqwest::Error),
    #[error("The configured sender email is not valid: {0}")]
    InvalidSender(String),
    #[error("Failed to load the active subscribers.")]
    Store(#[from] StoreError),
}

impl std::fmt::Debug for SendNewsletterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

fn load_articles(path: &Path) -> Result<Vec<Article>, SendNewsletterError> {
    let raw = std::fs::read_to_string(path)?;

    Ok(serde_json::from_str(&raw)?)
}

async fn send(args: Args, config: Settings) -> Result<ExitCode, SendNewsletterError> {
    let articles = load_articles(&args.articles)?;
    tracing::info!("Loaded {} articles", articles.len());

    let ai_client = GenerativeAiClient::from_settings(&config.generative_ai)?;
    let drafted = draft_articles(&ai_client, articles, config.newsletter.max_articles).await;

    if drafted.is_empty() {
        tracing::error!("No article passed the selection");
        return Ok(ExitCode::FAILURE);
    }
    let intro = write_intro(&ai_client, &config.newsletter.name, &drafted).await;

    let issue = match render_issue(
        &config.newsletter.name,
        &config.newsletter.contact_email,
        Utc::now().date_naive(),
        &intro,
        &drafted,
    ) {
        Some(issue) => issue,
        None => return Ok(ExitCode::FAILURE),
    };

    if args.dry_run {
        println!("Subject: {}\n\n{}", issue.subject, issue.preview_html());
        return Ok(ExitCode::SUCCESS);
    }

    let sender = config
        .get_email_client_sender()
        .map_err(SendNewsletterError::InvalidSender)?;
    let email_client = EmailClient::new(
        config.email_client.get_base_url(),
        sender,
        config.email_client.get_api_key(),
        Some(config.email_client.get_timeout()),
    )?
    .with_sender_name(config.newsletter.name.clone());
    let store = PgSubscriberStore::new(get_connection_db_pool(&config.database));

    let report = deliver_issue(
        &store,
        &email_client,
        &issue,
        &config.get_app_base_url(),
        &config.get_unsubscribe_secret(),
    )
    .await?;

    if !report.succeeded() {
        tracing::error!(
            recipients = report.recipients(),
            "The newsletter was not delivered to any subscriber"
        );
        return Ok(ExitCode::FAILURE);
    }

    Ok(ExitCode::SUCCESS)
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    // stdout is reserved for the dry run output
    let subscriber = get_subscriber(
        String::from("send_newsletter"),
        String::from("info"),
        std::io::stderr,
    );
    init_subscriber(subscriber);

    let result = match get_configuration() {
        Ok(config) => send(args, config).await,
        Err(err) => Err(err.into()),
    };

    match result {
        Ok(code) => code,
        Err(err) => {
            tracing::error!(error.cause_chain = ?err, "Failed to send the newsletter");
            ExitCode::FAILURE
        }
    }
}
