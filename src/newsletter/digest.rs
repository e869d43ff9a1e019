use chrono::{Datelike, NaiveDate};
use htmlescape::encode_minimal;

use super::selection::select_articles;
use crate::generative_ai::GenerativeAiClient;

const FALLBACK_SUMMARY_CHARS: usize = 300;
const MAX_SUMMARY_CHARS: usize = 400;
const PROMPT_CONTENT_CHARS: usize = 3000;
const MAX_TOPICS: usize = 5;
const RENDERED_TOPICS: usize = 3;
const FALLBACK_TOPICS: [&str; 2] = ["AI", "Technology"];
const INTRO_ARTICLES: usize = 5;
const INTRO_TOPICS: usize = 8;
pub const FALLBACK_INTRO: &str = "Welcome to this week's AI news roundup. \
    Here are the latest developments in artificial intelligence and technology.";

/// A news item as produced by the external news fetcher.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct Article {
    pub title: String,
    #[serde(default)]
    pub url: String,
    pub content: String,
}

/// An article after the generative AI pass.
#[derive(Debug, Clone, PartialEq)]
pub struct DigestArticle {
    pub title: String,
    pub url: String,
    pub summary: String,
    pub topics: Vec<String>,
}

/// The rendered issue, identical for every recipient until personalised with
/// that recipient's unsubscribe link.
#[derive(Debug, Clone)]
pub struct NewsletterIssue {
    pub subject: String,
    newsletter_name: String,
    contact_email: String,
    date: NaiveDate,
    content_html: String,
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((index, _)) => format!("{}...", &text[..index]),
        None => text.to_string(),
    }
}

pub fn parse_topics(text: &str) -> Vec<String> {
    text.split(',')
        .map(|topic| topic.trim().to_string())
        .filter(|topic| topic.chars().count() > 2)
        .take(MAX_TOPICS)
        .collect()
}

fn fallback_topics() -> Vec<String> {
    FALLBACK_TOPICS.iter().map(|topic| topic.to_string()).collect()
}

fn summary_prompt(article: &Article) -> String {
    format!(
        "Write a concise, professional summary (100 to 250 words) of the following \
        AI/technology article for AI professionals. Focus on key points and implications.\n\n\
        Title: {}\n\nContent: {}\n\nSummary:",
        article.title,
        truncate_chars(&article.content, PROMPT_CONTENT_CHARS)
    )
}

fn topics_prompt(article: &Article) -> String {
    format!(
        "Extract 3 to 5 topics (technologies, companies, concepts or trends) from the \
        following AI/technology article. Return only a comma-separated list.\n\n\
        Title: {}\n\nContent: {}\n\nTopics:",
        article.title,
        truncate_chars(&article.content, PROMPT_CONTENT_CHARS)
    )
}

#[tracing::instrument(name = "Summarising an article", skip(ai, article), fields(title = %article.title))]
async fn summarize(ai: &GenerativeAiClient, article: &Article) -> String {
    match ai.generate(&summary_prompt(article)).await {
        Ok(summary) => summary,
        Err(err) => {
            tracing::warn!(error.cause_chain = ?err, "Falling back to the article opening");
            let opening: String = article.content.chars().take(FALLBACK_SUMMARY_CHARS).collect();
            format!("{}...", opening)
        }
    }
}

#[tracing::instrument(name = "Extracting article topics", skip(ai, article), fields(title = %article.title))]
async fn extract_topics(ai: &GenerativeAiClient, article: &Article) -> Vec<String> {
    match ai.generate(&topics_prompt(article)).await {
        Ok(text) => {
            let topics = parse_topics(&text);
            if topics.is_empty() {
                fallback_topics()
            } else {
                topics
            }
        }
        Err(err) => {
            tracing::warn!(error.cause_chain = ?err, "Falling back to default topics");
            fallback_topics()
        }
    }
}

/// Selects up to `max_articles` articles and asks the generative AI API for
/// a summary and topics of each, one call at a time.
pub async fn draft_articles(
    ai: &GenerativeAiClient,
    articles: Vec<Article>,
    max_articles: usize,
) -> Vec<DigestArticle> {
    let mut drafted = Vec::new();

    for article in select_articles(articles, max_articles) {
        let summary = summarize(ai, &article).await;
        let topics = extract_topics(ai, &article).await;

        drafted.push(DigestArticle {
            title: article.title,
            url: article.url,
            summary,
            topics,
        });
    }

    drafted
}

fn intro_prompt(newsletter_name: &str, articles: &[DigestArticle]) -> String {
    let mut topics: Vec<&str> = Vec::new();
    let mut headlines = Vec::new();

    for article in articles.iter().take(INTRO_ARTICLES) {
        headlines.push(format!("- {}", article.title));
        for topic in &article.topics {
            if !topics.contains(&topic.as_str()) {
                topics.push(topic);
            }
        }
    }
    topics.truncate(INTRO_TOPICS);

    format!(
        "Write a brief, engaging introduction (under 100 words) for an AI newsletter called \
        \"{}\". Professional but engaging tone. Highlight the most interesting trends instead \
        of listing the articles, and open with a hook about the week in AI.\n\n\
        This week's articles:\n{}\n\nKey topics: {}\n\nIntroduction:",
        newsletter_name,
        headlines.join("\n"),
        topics.join(", ")
    )
}

/// Opening paragraph of the issue, or a fixed welcome text when the
/// generative AI API is unavailable.
#[tracing::instrument(name = "Writing the issue introduction", skip(ai, articles))]
pub async fn write_intro(
    ai: &GenerativeAiClient,
    newsletter_name: &str,
    articles: &[DigestArticle],
) -> String {
    match ai.generate(&intro_prompt(newsletter_name, articles)).await {
        Ok(intro) => intro,
        Err(err) => {
            tracing::warn!(error.cause_chain = ?err, "Falling back to the default introduction");
            FALLBACK_INTRO.to_string()
        }
    }
}

fn render_article(article: &DigestArticle) -> String {
    let title = encode_minimal(&article.title);
    let summary = encode_minimal(&truncate_chars(&article.summary, MAX_SUMMARY_CHARS));

    let (title_html, read_more_html) = if article.url.is_empty() {
        (format!("<h2>{}</h2>", title), String::new())
    } else {
        let url = encode_minimal(&article.url);
        (
            format!(r#"<h2><a href="{}" target="_blank">{}</a></h2>"#, url, title),
            format!(
                r#"<div class="read-more"><a href="{}" target="_blank" class="read-more-btn">Read Full Article</a></div>"#,
                url
            ),
        )
    };

    let topics_html = if article.topics.is_empty() {
        String::new()
    } else {
        let tags: String = article
            .topics
            .iter()
            .take(RENDERED_TOPICS)
            .map(|topic| format!(r#"<span class="topic">{}</span>"#, encode_minimal(topic)))
            .collect();
        format!(r#"<div class="topics">{}</div>"#, tags)
    };

    format!(
        r#"<div class="article">{}<div class="summary">{}</div>{}{}</div>"#,
        title_html, summary, read_more_html, topics_html
    )
}

/// Renders the issue, or `None` when there is nothing worth sending.
pub fn render_issue(
    newsletter_name: &str,
    contact_email: &str,
    date: NaiveDate,
    intro: &str,
    articles: &[DigestArticle],
) -> Option<NewsletterIssue> {
    if articles.is_empty() {
        return None;
    }

    let articles_html: String = articles.iter().map(render_article).collect();
    let content_html = format!(
        r#"<div class="intro"><p>{}</p></div><div class="content"><h3>This Week in AI</h3>{}</div>"#,
        encode_minimal(intro),
        articles_html
    );

    Some(NewsletterIssue {
        subject: format!(
            "{} - AI News Weekly ({})",
            newsletter_name,
            date.format("%B %d, %Y")
        ),
        newsletter_name: newsletter_name.to_string(),
        contact_email: contact_email.to_string(),
        date,
        content_html,
    })
}

impl NewsletterIssue {
    fn document(&self, footer_html: &str) -> String {
        let name = encode_minimal(&self.newsletter_name);

        format!(
            r#"<!DOCTYPE html>
<html>
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>{name} - AI News Weekly</title>
</head>
<body>
<div class="container">
<div class="header"><h1>{name}</h1><p>Your Weekly AI News Digest</p><p>{date}</p></div>
{content}
<div class="footer"><p>Thank you for reading {name}!</p><p>&copy; {year} {name}. All rights reserved.</p></div>
{footer}
</div>
</body>
</html>"#,
            name = name,
            date = self.date.format("%B %d, %Y"),
            content = self.content_html,
            year = self.date.year(),
            footer = footer_html,
        )
    }

    /// The issue without any recipient specific footer.
    pub fn preview_html(&self) -> String {
        self.document("")
    }

    /// The issue as sent to one recipient, ending with their unsubscribe link.
    pub fn personalized_html(&self, unsubscribe_link: &str) -> String {
        let name = encode_minimal(&self.newsletter_name);
        let footer = format!(
            r#"<div class="unsubscribe"><p>You're receiving this email because you subscribed to {name}.<br><a href="{link}">Unsubscribe from future emails</a> | <a href="mailto:{contact}">Contact us</a></p></div>"#,
            name = name,
            link = encode_minimal(unsubscribe_link),
            contact = encode_minimal(&self.contact_email),
        );

        self.document(&footer)
    }
}
