use std::time::Duration;

use crate::error::PlacesError;
use crate::service::PlacesService;
use crate::types::{Place, TextSearchRequest};

/// The service never returns more than three pages for one query.
pub const SERVICE_MAX_PAGES: usize = 3;

/// Bounds for following `next_page_token`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimits {
    pub max_pages: usize,
    /// Wait before requesting each page after the first. A page token is not
    /// valid until a short while after it is issued.
    pub delay: Duration,
}

impl PageLimits {
    #[must_use]
    pub fn new(max_pages: usize, delay: Duration) -> Self {
        Self {
            max_pages: max_pages.min(SERVICE_MAX_PAGES),
            delay,
        }
    }
}

/// Runs a text search and follows pagination, appending each page's places
/// to `sink` as soon as it arrives.
///
/// Returns the number of pages fetched. On error, places from earlier pages
/// stay in `sink`; if the future is dropped (e.g. by a deadline) the same
/// holds, so callers can keep partial results.
///
/// # Errors
///
/// Returns the first [`PlacesError`] from the service.
pub async fn collect_text_pages<S: PlacesService + ?Sized>(
    service: &S,
    request: &TextSearchRequest,
    limits: PageLimits,
    sink: &mut Vec<Place>,
) -> Result<usize, PlacesError> {
    let mut token: Option<String> = None;
    let mut pages = 0usize;

    while pages < limits.max_pages {
        if pages > 0 && !limits.delay.is_zero() {
            tokio::time::sleep(limits.delay).await;
        }

        let page = service.text_search(request, token.as_deref()).await?;
        pages += 1;
        tracing::debug!(
            query = %request.query,
            page = pages,
            count = page.places.len(),
            "text search page received"
        );
        sink.extend(page.places);

        token = page.next_page_token;
        if token.is_none() {
            break;
        }
    }

    Ok(pages)
}
