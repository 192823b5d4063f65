//! URL template module for Rating-Harvester
//!
//! Listing and rating endpoints are configured as templates with `{page}` and
//! `{id}` placeholders. Rendering substitutes the values and parses the result,
//! so every request goes out with a well-formed absolute URL.

use crate::{UrlError, UrlResult};
use ::url::Url;

/// Placeholder for the 1-based page number
pub const PAGE_PLACEHOLDER: &str = "{page}";

/// Placeholder for the catalog identifier
pub const ID_PLACEHOLDER: &str = "{id}";

/// A URL with `{page}` and optionally `{id}` placeholders
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlTemplate {
    template: String,
}

impl UrlTemplate {
    /// Creates a template for paginated listing pages
    ///
    /// The template must contain `{page}`.
    ///
    /// # Example
    ///
    /// ```
    /// use rating_harvester::url::UrlTemplate;
    ///
    /// let template = UrlTemplate::listing("https://example.com/browse/page/{page}").unwrap();
    /// let url = template.render_listing(3).unwrap();
    /// assert_eq!(url.as_str(), "https://example.com/browse/page/3");
    /// ```
    pub fn listing(template: &str) -> UrlResult<Self> {
        Self::with_placeholders(template, &[PAGE_PLACEHOLDER])
    }

    /// Creates a template for per-identifier rating pages
    ///
    /// The template must contain both `{id}` and `{page}`.
    pub fn rating(template: &str) -> UrlResult<Self> {
        Self::with_placeholders(template, &[ID_PLACEHOLDER, PAGE_PLACEHOLDER])
    }

    fn with_placeholders(template: &str, required: &[&'static str]) -> UrlResult<Self> {
        for placeholder in required {
            if !template.contains(placeholder) {
                return Err(UrlError::MissingPlaceholder {
                    template: template.to_string(),
                    placeholder,
                });
            }
        }

        let template = Self {
            template: template.to_string(),
        };

        // A sample rendering catches malformed hosts and schemes up front
        template.render("1", 1)?;

        Ok(template)
    }

    /// Renders a listing page URL
    pub fn render_listing(&self, page: u32) -> UrlResult<Url> {
        self.render("", page)
    }

    /// Renders a rating page URL for an identifier
    pub fn render_rating(&self, id: &str, page: u32) -> UrlResult<Url> {
        self.render(id, page)
    }

    fn render(&self, id: &str, page: u32) -> UrlResult<Url> {
        let rendered = self
            .template
            .replace(ID_PLACEHOLDER, id)
            .replace(PAGE_PLACEHOLDER, &page.to_string());

        let url = Url::parse(&rendered).map_err(|source| UrlError::Parse {
            url: rendered.clone(),
            source,
        })?;

        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(UrlError::InvalidScheme(other.to_string())),
        }
    }
}
