//! Weekly digest: pick and summarise fetched articles, render an issue, then
//! mail it to every active subscriber.

pub mod delivery;
pub mod digest;
pub mod selection;

pub use delivery::{deliver_issue, unsubscribe_link, DeliveryReport};
pub use digest::{
    draft_articles, render_issue, write_intro, Article, DigestArticle, NewsletterIssue,
    FALLBACK_INTRO,
};
pub use selection::select_articles;
