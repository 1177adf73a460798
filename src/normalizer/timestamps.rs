use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Timelike};

/// Parse a raw timestamp against an ordered list of chrono formats.
///
/// The first format that parses wins; later formats are never consulted for that
/// input even if they would also match. Formats without a zone specifier are read
/// as wall-clock time in `offset`; zoned inputs are converted into `offset`.
/// Sub-second precision is dropped.
pub fn parse_timestamp(
    raw: &str,
    formats: &[String],
    offset: FixedOffset,
) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    formats
        .iter()
        .find_map(|format| parse_with_format(raw, format, offset))
        .and_then(|parsed| parsed.with_nanosecond(0))
}

fn parse_with_format(raw: &str, format: &str, offset: FixedOffset) -> Option<DateTime<FixedOffset>> {
    if has_zone_specifier(format) {
        return DateTime::parse_from_str(raw, format).ok().map(|dt| dt.with_timezone(&offset));
    }
    let naive = NaiveDateTime::parse_from_str(raw, format).ok()?;
    offset.from_local_datetime(&naive).single()
}

fn has_zone_specifier(format: &str) -> bool {
    format.contains("%z") || format.contains("%:z") || format.contains("%#z")
}

/// Diary day for a timestamp: entries before `early_morning_hour` belong to the previous day.
///
/// Returns the logical date and whether the shift applied.
pub fn logical_date(timestamp: &DateTime<FixedOffset>, early_morning_hour: u32) -> (NaiveDate, bool) {
    let date = timestamp.date_naive();
    if timestamp.hour() < early_morning_hour {
        (date.pred_opt().unwrap_or(date), true)
    } else {
        (date, false)
    }
}
