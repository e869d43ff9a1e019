use std::collections::HashSet;

use super::digest::Article;

// Shorter bodies are usually paywalls or cookie banners
const MIN_CONTENT_CHARS: usize = 100;
pub const MIN_RELEVANCE_SCORE: f64 = 0.3;

// Matched as lowercase substrings of the title and content
const AI_KEYWORDS: [&str; 31] = [
    "artificial intelligence",
    "ai",
    "machine learning",
    "ml",
    "deep learning",
    "neural network",
    "algorithm",
    "automation",
    "chatgpt",
    "openai",
    "gemini",
    "llm",
    "large language model",
    "natural language processing",
    "nlp",
    "computer vision",
    "robotics",
    "data science",
    "tensorflow",
    "pytorch",
    "generative ai",
    "gpt",
    "transformer",
    "anthropic",
    "claude",
    "midjourney",
    "stable diffusion",
    "tech",
    "technology",
    "startup",
    "silicon valley",
];

const SPAM_KEYWORDS: [&str; 7] = [
    "click here",
    "buy now",
    "limited time",
    "exclusive offer",
    "advertisement",
    "sponsored content",
    "affiliate",
];

/// Lowercased title stripped of punctuation with collapsed whitespace, joined
/// with the trimmed url.
fn dedup_key(article: &Article) -> String {
    let title: String = article
        .title
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || *c == '_')
        .collect();
    let title = title.split_whitespace().collect::<Vec<_>>().join(" ");

    format!("{}|{}", title, article.url.trim())
}

/// Drops every article whose normalised title and url were already seen,
/// keeping the first occurrence.
pub fn deduplicate(articles: Vec<Article>) -> Vec<Article> {
    let total = articles.len();
    let mut seen = HashSet::new();
    let unique: Vec<Article> = articles
        .into_iter()
        .filter(|article| seen.insert(dedup_key(article)))
        .collect();

    tracing::info!("Deduplicated {} -> {} articles", total, unique.len());

    unique
}

/// Keyword based relevance in `[0.0, 1.0]`.
pub fn relevance_score(article: &Article) -> f64 {
    let title = article.title.to_lowercase();
    let text = format!("{} {}", title, article.content.to_lowercase());

    let keyword_matches = AI_KEYWORDS.iter().filter(|k| text.contains(*k)).count();
    let mut score = keyword_matches as f64 / AI_KEYWORDS.len() as f64 * 0.7;

    if AI_KEYWORDS.iter().any(|k| title.contains(k)) {
        score += 0.2;
    }

    let spam_matches = SPAM_KEYWORDS.iter().filter(|k| text.contains(*k)).count();
    score -= spam_matches as f64 * 0.1;

    let content_chars = article.content.chars().count();
    if content_chars > 1000 {
        score += 0.1;
    } else if content_chars > 500 {
        score += 0.05;
    }

    score.clamp(0.0, 1.0)
}

/// Deduplicates, drops short and off-topic articles, then keeps the
/// `max_articles` most relevant ones. Ties keep their input order.
pub fn select_articles(articles: Vec<Article>, max_articles: usize) -> Vec<Article> {
    let mut scored: Vec<(f64, Article)> = deduplicate(articles)
        .into_iter()
        .filter(|article| article.content.chars().count() > MIN_CONTENT_CHARS)
        .map(|article| (relevance_score(&article), article))
        .filter(|(score, _)| *score >= MIN_RELEVANCE_SCORE)
        .collect();

    scored.sort_by(|(a, _), (b, _)| b.total_cmp(a));

    tracing::info!("{} articles passed the quality filter", scored.len());

    scored
        .into_iter()
        .take(max_articles)
        .map(|(_, article)| article)
        .collect()
}
