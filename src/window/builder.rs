use tracing::debug;

use crate::models::CanonicalEntry;

/// Default per-entry formatting overhead, in characters
pub const DEFAULT_ENTRY_OVERHEAD: usize = 50;

/// Entries selected for analysis, ascending by timestamp
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Window {
    pub entries: Vec<CanonicalEntry>,
    /// Sum of `length + overhead` over the selected entries
    pub total_chars: usize,
}

/// Select the most recent entries whose combined cost fits `budget`
///
/// Walks newest to oldest and stops before the first entry that would push the
/// total past the budget; that entry and everything older is left out, even if an
/// older, shorter entry would still fit. The result is always a chronological suffix
/// of `entries` and `total_chars <= budget` holds for every input.
///
/// `entries` must already be sorted ascending by timestamp.
pub fn build_window(entries: &[CanonicalEntry], budget: usize, overhead: usize) -> Window {
    let mut total_chars = 0usize;
    let mut start = entries.len();

    for (index, entry) in entries.iter().enumerate().rev() {
        let cost = entry.length().saturating_add(overhead);
        match total_chars.checked_add(cost) {
            Some(next) if next <= budget => {
                total_chars = next;
                start = index;
            }
            _ => break,
        }
    }

    debug!(
        selected = entries.len() - start,
        available = entries.len(),
        total_chars,
        budget,
        "Built analysis window"
    );

    Window { entries: entries[start..].to_vec(), total_chars }
}
