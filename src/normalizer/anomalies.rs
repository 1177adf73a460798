use crate::models::CanonicalEntry;

/// Logical-date gaps longer than this many days are reported
pub const GAP_THRESHOLD_DAYS: i64 = 3;
/// Trailing entries used for the length statistics
pub const SPIKE_WINDOW: usize = 30;
/// Most recent entries checked against the spike threshold
pub const SPIKE_RECENT: usize = 5;
pub const SPIKE_STDDEV_FACTOR: f64 = 2.0;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Detect pipeline-observed anomalies on an ascending-sorted entry sequence
///
/// Gap anomalies come first (in chronological order), then length spikes.
pub fn detect_anomalies(entries: &[CanonicalEntry]) -> Vec<String> {
    let mut anomalies = detect_gaps(entries);
    anomalies.extend(detect_length_spikes(entries));
    anomalies
}

fn detect_gaps(entries: &[CanonicalEntry]) -> Vec<String> {
    entries
        .windows(2)
        .filter_map(|pair| {
            let days = (pair[1].logical_date() - pair[0].logical_date()).num_days();
            (days > GAP_THRESHOLD_DAYS).then(|| {
                format!("{}-day gap before {}", days, pair[1].logical_date().format(DATE_FORMAT))
            })
        })
        .collect()
}

fn detect_length_spikes(entries: &[CanonicalEntry]) -> Vec<String> {
    if entries.len() < SPIKE_WINDOW {
        return Vec::new();
    }

    let window = &entries[entries.len() - SPIKE_WINDOW..];
    let lengths: Vec<f64> = window.iter().map(|e| e.length() as f64).collect();
    let mean = lengths.iter().sum::<f64>() / lengths.len() as f64;
    // Population variance
    let variance =
        lengths.iter().map(|len| (len - mean).powi(2)).sum::<f64>() / lengths.len() as f64;
    let threshold = mean + SPIKE_STDDEV_FACTOR * variance.sqrt();

    entries[entries.len() - SPIKE_RECENT..]
        .iter()
        .filter(|entry| entry.length() as f64 > threshold)
        .map(|entry| {
            format!(
                "Length spike on {}: {} chars",
                entry.logical_date().format(DATE_FORMAT),
                entry.length()
            )
        })
        .collect()
}
