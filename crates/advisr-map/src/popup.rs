//! HTML for marker popups and the details panel.
//!
//! All interpolated text is escaped. Details, when present, take precedence
//! over the summary record field by field.

use chrono::Weekday;

use advisr_core::{Location, PlaceDetails, PlaceReview};

use crate::geolocation::Position;

const POPUP_REVIEWS: usize = 1;
const POPUP_REVIEW_CHARS: usize = 120;
const PANEL_REVIEWS: usize = 3;
const PANEL_REVIEW_CHARS: usize = 140;

#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// First `max` characters of `text`, with `…` appended when cut.
#[must_use]
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}…", &text[..idx]),
        None => text.to_owned(),
    }
}

/// Today's line from Monday-first `weekday_text`.
#[must_use]
pub fn todays_hours(weekday_text: &[String], today: Weekday) -> Option<&str> {
    weekday_text
        .get(today.num_days_from_monday() as usize)
        .map(String::as_str)
}

/// Site-relative page for an external place.
#[must_use]
pub fn place_page_path(location: &Location) -> Option<String> {
    match (&location.place_id, location.is_google_place) {
        (Some(place_id), true) => Some(format!("/place/google/{place_id}/")),
        _ => None,
    }
}

#[must_use]
pub fn current_location_popup(position: Position) -> String {
    let (lat, lng) = position.coords.to_fixed6();
    // f64 -> integer metres for display only.
    #[allow(clippy::cast_possible_truncation)]
    let accuracy = position.accuracy_m.round() as i64;
    format!(
        "<div class=\"popup popup-current\"><strong>📍 Your Current Location</strong><br/>\
<small>Lat: {lat}, Lng: {lng}</small><br/><small>Accuracy: {accuracy}m</small></div>"
    )
}

/// Fields shared by the popup and the panel after merging details over the
/// summary record.
struct Merged<'a> {
    name: &'a str,
    category: Option<&'a str>,
    address: Option<&'a str>,
    rating: Option<f64>,
    user_ratings_total: u32,
    photo: Option<&'a str>,
    hours: Option<&'a str>,
    phone: Option<&'a str>,
    website: Option<&'a str>,
    reviews: &'a [PlaceReview],
}

fn merge<'a>(
    location: &'a Location,
    details: Option<&'a PlaceDetails>,
    today: Weekday,
) -> Merged<'a> {
    let non_empty = |s: &'a Option<String>| s.as_deref().filter(|v| !v.is_empty());
    Merged {
        name: details
            .and_then(|d| non_empty(&d.name))
            .unwrap_or(location.name.as_str()),
        category: location.display_category(),
        address: details
            .and_then(|d| non_empty(&d.formatted_address))
            .or_else(|| non_empty(&location.address)),
        rating: details
            .and_then(|d| d.rating)
            .or(location.rating)
            .filter(|r| *r > 0.0),
        user_ratings_total: details
            .and_then(|d| d.user_ratings_total)
            .or(location.user_ratings_total)
            .unwrap_or(0),
        photo: details.and_then(|d| d.photo_urls.first().map(String::as_str)),
        hours: details.and_then(|d| todays_hours(&d.weekday_text, today)),
        phone: details.and_then(|d| non_empty(&d.international_phone_number)),
        website: details.and_then(|d| non_empty(&d.website)),
        reviews: details.map_or(&[][..], |d| d.reviews.as_slice()),
    }
}

fn review_line(review: &PlaceReview, max_chars: usize) -> String {
    let rating = review
        .rating
        .map(|r| format!("⭐ {r}"))
        .unwrap_or_default();
    let author = escape_html(review.author_name.as_deref().unwrap_or(""));
    let text = review
        .text
        .as_deref()
        .map(|t| escape_html(&truncate_chars(t, max_chars)))
        .unwrap_or_default();
    format!("<span class=\"review-rating\">{rating}</span> <span class=\"review-author\">{author}</span><br/>{text}")
}

/// Popup for a result marker. `details` is `None` for internal records and
/// when the details lookup failed.
#[must_use]
pub fn location_popup(
    location: &Location,
    details: Option<&PlaceDetails>,
    today: Weekday,
) -> String {
    let m = merge(location, details, today);
    let name = escape_html(m.name);
    let page = place_page_path(location).map(|p| escape_html(&p));

    let title = match &page {
        Some(href) => format!("<h3><a href=\"{href}\">{name}</a></h3>"),
        None => format!("<h3>{name}</h3>"),
    };
    let phone = m.phone.map(|phone| {
        let tel: String = phone.chars().filter(|c| !c.is_whitespace()).collect();
        format!(
            "<div class=\"popup-phone\">📞 <a href=\"tel:{}\">{}</a></div>",
            escape_html(&tel),
            escape_html(phone)
        )
    });
    let reviews: String = m
        .reviews
        .iter()
        .take(POPUP_REVIEWS)
        .map(|r| {
            format!(
                "<div class=\"popup-review\"><strong>Latest review:</strong><br/>{}</div>",
                review_line(r, POPUP_REVIEW_CHARS)
            )
        })
        .collect();

    let sections = [
        m.photo.map(|photo| {
            format!(
                "<img src=\"{}\" alt=\"{name}\" class=\"popup-photo\"/>",
                escape_html(photo)
            )
        }),
        Some(title),
        m.category
            .map(|c| format!("<div class=\"popup-category\">{}</div>", escape_html(c))),
        m.address
            .map(|a| format!("<div class=\"popup-address\">{}</div>", escape_html(a))),
        m.rating.map(|rating| {
            format!(
                "<div class=\"popup-rating\">⭐ {rating} ({} reviews)</div>",
                m.user_ratings_total
            )
        }),
        m.hours
            .map(|h| format!("<div class=\"popup-hours\">{}</div>", escape_html(h))),
        phone,
        m.website.map(|w| {
            format!(
                "<div class=\"popup-website\">🌐 <a href=\"{}\" target=\"_blank\" rel=\"noopener\">Website</a></div>",
                escape_html(w)
            )
        }),
        Some(reviews),
        page.as_ref().map(|href| {
            format!("<div class=\"popup-link\"><a href=\"{href}\">View full details</a></div>")
        }),
    ];

    let mut html = String::from("<div class=\"popup\">");
    html.extend(sections.into_iter().flatten());
    html.push_str("</div>");
    html
}

/// Side panel with the richer view of one record.
#[must_use]
pub fn details_panel(
    location: &Location,
    details: Option<&PlaceDetails>,
    today: Weekday,
) -> String {
    let m = merge(location, details, today);
    let name = escape_html(m.name);

    let reviews: Vec<String> = m
        .reviews
        .iter()
        .take(PANEL_REVIEWS)
        .map(|r| format!("<li>{}</li>", review_line(r, PANEL_REVIEW_CHARS)))
        .collect();

    let sections = [
        m.photo.map(|photo| {
            format!(
                "<img src=\"{}\" alt=\"{name}\" class=\"details-image\"/>",
                escape_html(photo)
            )
        }),
        Some(format!("<h2>{name}</h2>")),
        m.category
            .map(|c| format!("<div class=\"details-meta\">{}</div>", escape_html(c))),
        m.address
            .map(|a| format!("<div class=\"details-address\">{}</div>", escape_html(a))),
        m.rating.map(|rating| {
            format!(
                "<div class=\"details-rating\">⭐ {rating} ({} reviews)</div>",
                m.user_ratings_total
            )
        }),
        m.hours
            .map(|h| format!("<div class=\"details-meta\">{}</div>", escape_html(h))),
        m.phone
            .map(|p| format!("<div class=\"details-meta\">📞 {}</div>", escape_html(p))),
        m.website.map(|w| {
            format!(
                "<div class=\"details-links\"><a href=\"{}\" target=\"_blank\" rel=\"noopener\">🌐 Website</a></div>",
                escape_html(w)
            )
        }),
        (!reviews.is_empty()).then(|| {
            format!(
                "<div class=\"details-reviews\"><strong>Top reviews</strong><ul>{}</ul></div>",
                reviews.concat()
            )
        }),
    ];

    sections.into_iter().flatten().collect()
}
