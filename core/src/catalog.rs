//! Catalog reference data: services, professionals and blog posts.

use crate::store::Document;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A purchasable service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    /// Document id.
    pub id: String,
    /// Display title.
    pub title: String,
    /// Long description.
    #[serde(default)]
    pub description: String,
    /// Display price, e.g. `"₹1,500"`.
    pub price: String,
    /// Grouping label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Bullet-point features.
    #[serde(default)]
    pub features: Vec<String>,
    /// Fulfilment steps copied into purchased tasks.
    #[serde(default)]
    pub steps: Vec<String>,
    /// Listed publicly and purchasable.
    #[serde(default = "default_true")]
    pub active: bool,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

impl Document for Service {
    const COLLECTION: &'static str = "services";

    fn id(&self) -> &str {
        &self.id
    }
}

/// A team member shown on the public site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Professional {
    /// Document id.
    pub id: String,
    /// Full name.
    pub name: String,
    /// Job title.
    #[serde(default)]
    pub role: String,
    /// Biography.
    #[serde(default)]
    pub bio: String,
    /// Contact email.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Portrait URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    /// Position in listings, ascending.
    #[serde(default)]
    pub display_order: i32,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

impl Document for Professional {
    const COLLECTION: &'static str = "professionals";

    fn id(&self) -> &str {
        &self.id
    }
}

/// A blog article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPost {
    /// Document id.
    pub id: String,
    /// Headline.
    pub title: String,
    /// URL slug.
    pub slug: String,
    /// Teaser text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    /// Body (markdown or HTML).
    pub content: String,
    /// Author display name.
    pub author: String,
    /// Tags.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Visible on the public site.
    #[serde(default)]
    pub published: bool,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

impl Document for BlogPost {
    const COLLECTION: &'static str = "blog_posts";

    fn id(&self) -> &str {
        &self.id
    }
}

const fn default_true() -> bool {
    true
}

/// Lowercase, dash-separated URL slug.
///
/// ```
/// assert_eq!(clientdesk_core::catalog::slugify("Tax Filing: 2024 Guide!"), "tax-filing-2024-guide");
/// ```
#[must_use]
pub fn slugify(title: &str) -> String {
    title
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}
