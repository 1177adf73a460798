use crate::models::CanonicalEntry;

pub const SYSTEM_PROMPT: &str = "You are a warm, perceptive journaling companion. \
You read private diary entries and reflect patterns back to the writer without judging them. \
You always answer with a single JSON object and never add any text outside it.";

const INSTRUCTIONS: &str = r#"Read the diary entries below. Each entry starts with its diary date in square brackets.

Return ONLY a JSON object with exactly these keys:
{
  "daily_summaries": [{"date": "YYYY-MM-DD", "summary": "one or two sentences"}],
  "themes": [{"label": "short theme name", "support": <number of entries supporting it>}],
  "reflective_question": "one open question for the writer",
  "anomalies": ["optional: anything unusual compared with the rest"],
  "hidden_signals": ["optional: quiet patterns the writer may not have noticed"],
  "emotional_indicators": [{"date": "YYYY-MM-DD", "emotion": "name", "intensity": 1}]
}

Rules:
- One daily summary per diary date that appears below, in chronological order.
- At most 5 themes, strongest first.
- Write summaries, themes and the question in the same language as the entries.
- Do not wrap the JSON in Markdown. Do not output anything except the JSON object."#;

/// Render entries as `[date]\ntext` blocks separated by blank lines
pub fn render_entries(entries: &[CanonicalEntry]) -> String {
    entries
        .iter()
        .map(|entry| format!("[{}]\n{}", entry.logical_date().format("%Y-%m-%d"), entry.text()))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Full user prompt: fixed instructions followed by the rendered entries
pub fn build_prompt(entries: &[CanonicalEntry]) -> String {
    format!("{}\n\nDiary entries:\n\n{}", INSTRUCTIONS, render_entries(entries))
}

#[cfg(test)]
mod tests {
    use chrono::{FixedOffset, NaiveDate, TimeZone};

    use super::*;

    fn entry(day: u32, hour: u32, text: &str) -> CanonicalEntry {
        let ts = FixedOffset::east_opt(0).unwrap().with_ymd_and_hms(2024, 3, day, hour, 0, 0).unwrap();
        let (date, early) = if hour < 3 {
            (NaiveDate::from_ymd_opt(2024, 3, day - 1).unwrap(), true)
        } else {
            (ts.date_naive(), false)
        };
        CanonicalEntry::new(ts.to_rfc3339(), ts, date, text, early)
    }

    #[test]
    fn test_render_entries_blocks() {
        let rendered = render_entries(&[entry(10, 9, "morning walk"), entry(11, 21, "long call")]);
        assert_eq!(rendered, "[2024-03-10]\nmorning walk\n\n[2024-03-11]\nlong call");
    }

    #[test]
    fn test_render_uses_logical_date() {
        let rendered = render_entries(&[entry(12, 1, "late night")]);
        assert_eq!(rendered, "[2024-03-11]\nlate night");
    }

    #[test]
    fn test_prompt_demands_json_keys() {
        let prompt = build_prompt(&[entry(10, 9, "morning walk")]);
        for key in ["daily_summaries", "themes", "reflective_question", "anomalies", "hidden_signals"] {
            assert!(prompt.contains(key), "prompt should mention {key}");
        }
        assert!(prompt.contains("Do not output anything except the JSON object"));
        assert!(prompt.ends_with("[2024-03-10]\nmorning walk"));
    }
}
