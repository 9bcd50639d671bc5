//! Plain-text rendering of the display panels.

use std::fmt::Write as _;

use shared::{domain::CountryRecord, error::NO_BORDERING_COUNTRIES_MESSAGE};

use crate::ui::display::{BorderingPanel, CountryInfoPanel, DisplayChange, DisplayState};

const BORDERING_HEADER: &str = "Bordering Countries:";
const LOADING_TEXT: &str = "Loading...";

/// Formats with comma digit grouping, e.g. `67,391,582`.
pub fn format_population(population: u64) -> String {
    let digits = population.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}

pub fn render_country(record: &CountryRecord) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", record.common_name);
    let _ = writeln!(
        out,
        "  Capital: {}",
        record.capital.as_deref().unwrap_or("N/A")
    );
    let _ = writeln!(out, "  Population: {}", format_population(record.population));
    let _ = writeln!(out, "  Region: {}", record.region);
    let _ = writeln!(out, "  Flag of {}: {}", record.common_name, record.flag_url);
    out
}

pub fn render_bordering_entry(record: &CountryRecord) -> String {
    format!("  {}: {}", record.common_name, record.flag_url)
}

pub fn render_country_info(panel: &CountryInfoPanel) -> String {
    match panel {
        CountryInfoPanel::Empty => String::new(),
        CountryInfoPanel::Country(record) => render_country(record),
        CountryInfoPanel::Error(message) => format!("{message}\n"),
    }
}

pub fn render_bordering(panel: &BorderingPanel) -> String {
    match panel {
        BorderingPanel::Empty => String::new(),
        BorderingPanel::NoBorders => format!("{NO_BORDERING_COUNTRIES_MESSAGE}\n"),
        BorderingPanel::Listing(listing) => {
            let mut out = format!("{BORDERING_HEADER}\n");
            for entry in &listing.entries {
                let _ = writeln!(out, "{}", render_bordering_entry(entry));
            }
            for error in &listing.errors {
                let _ = writeln!(out, "  {error}");
            }
            out
        }
    }
}

pub fn render_panels(state: &DisplayState) -> String {
    let mut out = String::new();
    if state.loading_visible {
        let _ = writeln!(out, "{LOADING_TEXT}");
    }
    out.push_str(&render_country_info(&state.country_info));
    out.push_str(&render_bordering(&state.bordering));
    out
}

/// One-line rendering of an incremental change for the interactive loop.
pub fn render_change(change: &DisplayChange) -> String {
    match change {
        DisplayChange::Loading { visible: true } => LOADING_TEXT.to_string(),
        DisplayChange::Loading { visible: false } => "Done.".to_string(),
        DisplayChange::CountryInfo(record) => render_country(record).trim_end().to_string(),
        DisplayChange::Error(message) => message.clone(),
        DisplayChange::BorderingHeader => BORDERING_HEADER.to_string(),
        DisplayChange::BorderingEntry(record) => render_bordering_entry(record),
        DisplayChange::NoBorderingCountries => NO_BORDERING_COUNTRIES_MESSAGE.to_string(),
        DisplayChange::BorderingError(message) => format!("  {message}"),
    }
}
