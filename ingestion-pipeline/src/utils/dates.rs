use chrono::{Local, NaiveDate};

const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

pub fn today_iso() -> String {
    Local::now().format(ISO_DATE_FORMAT).to_string()
}

pub fn is_iso_calendar_date(value: &str) -> bool {
    NaiveDate::parse_from_str(value, ISO_DATE_FORMAT).is_ok()
}

/// Absent, empty and the literal `"null"` all count as no value.
pub fn present_value(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("null"))
}
