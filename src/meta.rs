//! Page metadata: document title, description, canonical URL, Open Graph
//! and Twitter card tags.
//!
//! The Open Graph image for a post points at the card the `og` pipeline
//! writes, named by [`og::image_file_name`] from the same slug, so shared
//! links never reference a missing image.

use crate::config::SiteConfig;
use crate::og;
use crate::post::Post;
use maud::{Markup, html};

/// Head metadata for one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageMeta {
    pub title: String,
    pub description: Option<String>,
    /// Canonical absolute URL, also used for `og:url`.
    pub url: String,
    pub image: Option<String>,
    pub site_name: String,
    pub og_type: &'static str,
}

impl PageMeta {
    pub fn for_post(post: &Post, config: &SiteConfig) -> Self {
        let origin = config.site.origin();
        let image = match &post.image {
            Some(image) => absolute_url(origin, image),
            None => format!("{origin}/og/{}", og::image_file_name(&post.slug)),
        };
        Self {
            title: post.title.clone(),
            description: post.excerpt.clone(),
            url: format!("{origin}/blog/{}", post.slug),
            image: Some(image),
            site_name: config.site.name.clone(),
            og_type: "article",
        }
    }

    pub fn twitter_card(&self) -> &'static str {
        if self.image.is_some() {
            "summary_large_image"
        } else {
            "summary"
        }
    }

    /// Head tags. Empty values are omitted.
    pub fn head(&self) -> Markup {
        let description = self.description.as_deref().filter(|d| !d.is_empty());
        html! {
            title { (self.title) }
            @if let Some(description) = description {
                meta name="description" content=(description);
            }
            link rel="canonical" href=(self.url);
            meta property="og:title" content=(self.title);
            @if let Some(description) = description {
                meta property="og:description" content=(description);
            }
            meta property="og:type" content=(self.og_type);
            meta property="og:url" content=(self.url);
            meta property="og:site_name" content=(self.site_name);
            @if let Some(image) = &self.image {
                meta property="og:image" content=(image);
            }
            meta name="twitter:card" content=(self.twitter_card());
            meta name="twitter:title" content=(self.title);
            @if let Some(description) = description {
                meta name="twitter:description" content=(description);
            }
            @if let Some(image) = &self.image {
                meta name="twitter:image" content=(image);
            }
        }
    }
}

/// Resolve a post-supplied image against the site origin.
fn absolute_url(origin: &str, image: &str) -> String {
    if image.starts_with("http://") || image.starts_with("https://") {
        image.to_string()
    } else {
        format!("{origin}/{}", image.trim_start_matches('/'))
    }
}
