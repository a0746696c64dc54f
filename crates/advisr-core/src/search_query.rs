//! User search inputs and the query strings derived from them.

use reqwest::Url;

/// Trimmed keyword / filter search inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    pub location: String,
    pub category: String,
    pub keywords: String,
}

impl SearchQuery {
    /// Build a query, trimming every input.
    #[must_use]
    pub fn new(location: &str, category: &str, keywords: &str) -> Self {
        Self {
            location: location.trim().to_owned(),
            category: category.trim().to_owned(),
            keywords: keywords.trim().to_owned(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.location.is_empty() && self.category.is_empty() && self.keywords.is_empty()
    }

    /// Query parameters for the internal `locations/search/` endpoint.
    ///
    /// `q` carries the location name, the keywords, or both joined by a
    /// space; `category` is passed through unchanged.
    #[must_use]
    pub fn internal_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        let q = join_non_empty(&[&self.location, &self.keywords]);
        if !q.is_empty() {
            params.push(("q", q));
        }
        if !self.category.is_empty() {
            params.push(("category", self.category.clone()));
        }
        params
    }

    /// Free-text query for the external places service, `None` when every
    /// input is empty.
    #[must_use]
    pub fn external_text_query(&self) -> Option<String> {
        let q = join_non_empty(&[&self.location, &self.category, &self.keywords]);
        (!q.is_empty()).then_some(q)
    }

    /// Relative navigation target of the search results page, e.g.
    /// `/search/?location=Dhaka&keywords=wifi`.
    #[must_use]
    pub fn navigation_path(&self) -> String {
        // The host is discarded; only path and query are returned.
        let Ok(mut url) = Url::parse("http://localhost/search/") else {
            return "/search/?".to_owned();
        };
        {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in [
                ("location", &self.location),
                ("category", &self.category),
                ("keywords", &self.keywords),
            ] {
                if !value.is_empty() {
                    pairs.append_pair(key, value);
                }
            }
        }
        format!("{}?{}", url.path(), url.query().unwrap_or_default())
    }
}

fn join_non_empty(parts: &[&String]) -> String {
    parts
        .iter()
        .filter(|p| !p.is_empty())
        .map(|p| p.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}
