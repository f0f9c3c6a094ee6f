//! Display models for the hover tooltip and the detail panel.

use crate::selection::PanelSide;
use chrono::{DateTime, NaiveDate};
use eventmap_core::types::{EventLocation, GeoPoint};
use serde::Serialize;

/// Highlights shown in the panel.
pub const MAX_HIGHLIGHTS: usize = 6;

/// Tooltip shown next to a hovered marker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TooltipView {
    pub position: GeoPoint,
    pub name: String,
    pub place: String,
    pub image: Option<String>,
}

impl TooltipView {
    pub fn for_event(event: &EventLocation) -> Self {
        Self {
            position: event.point(),
            name: event.details.name.clone(),
            place: place_line(event),
            image: first_image(event),
        }
    }
}

/// Content of the detail panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanelView {
    pub open: bool,
    pub side: PanelSide,
    pub width: f64,
    pub title: String,
    pub body: Option<PanelBody>,
}

/// Event-specific part of the panel, absent while closed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanelBody {
    pub image: Option<String>,
    pub date: String,
    pub place: String,
    pub venue: Option<String>,
    pub attendees: Option<String>,
    pub description: String,
    pub highlights: Vec<String>,
    pub speakers: Vec<String>,
    pub website: Option<String>,
}

impl PanelView {
    pub fn new(event: Option<&EventLocation>, side: PanelSide, width: f64) -> Self {
        Self {
            open: event.is_some(),
            side,
            width,
            title: event
                .map(|e| e.details.name.clone())
                .unwrap_or_else(|| "Event".to_string()),
            body: event.map(PanelBody::for_event),
        }
    }
}

impl PanelBody {
    fn for_event(event: &EventLocation) -> Self {
        let details = &event.details;
        Self {
            image: first_image(event),
            date: format_event_date(&details.date),
            place: place_line(event),
            venue: details.venue.clone(),
            attendees: details
                .attendees
                .filter(|n| *n > 0)
                .map(|n| format!("{} attendees", format_thousands(n))),
            description: details.description.clone(),
            highlights: details
                .highlights
                .iter()
                .flatten()
                .take(MAX_HIGHLIGHTS)
                .cloned()
                .collect(),
            speakers: details.speakers.clone().unwrap_or_default(),
            website: details.website.clone(),
        }
    }
}

fn place_line(event: &EventLocation) -> String {
    format!("{}, {}", event.details.city, event.details.country)
}

fn first_image(event: &EventLocation) -> Option<String> {
    event.details.images.as_ref()?.first().cloned()
}

/// Renders an ISO date (`2025-03-15` or RFC 3339) as `Sat Mar 15 2025`.
/// Unparseable input renders as `Invalid Date`.
pub fn format_event_date(date: &str) -> String {
    const FORMAT: &str = "%a %b %d %Y";
    let date = date.trim();
    if let Ok(day) = NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        return day.format(FORMAT).to_string();
    }
    match DateTime::parse_from_rfc3339(date) {
        Ok(at) => at.date_naive().format(FORMAT).to_string(),
        Err(_) => "Invalid Date".to_string(),
    }
}

/// Formats a count with comma thousands separators.
pub fn format_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
