// Utility functions
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use reqwest::Url;

/// Parses a provider date key: `YYYY-MM-DD` (midnight) or `YYYY-MM-DD HH:MM:SS`.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .map(|date| date.and_time(NaiveTime::MIN))
        })
}

/// Formats a timestamp for display. Midnight timestamps print as a bare date.
pub fn format_timestamp(timestamp: &NaiveDateTime) -> String {
    if timestamp.time() == NaiveTime::MIN {
        timestamp.format("%Y-%m-%d").to_string()
    } else {
        timestamp.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

/// Copy of the URL with the `apikey` parameter masked, safe to log.
pub fn redacted_url(url: &Url) -> String {
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(key, value)| {
            let value = if key == "apikey" {
                "***".to_string()
            } else {
                value.into_owned()
            };
            (key.into_owned(), value)
        })
        .collect();
    let mut shown = url.clone();
    shown.query_pairs_mut().clear().extend_pairs(pairs);
    shown.to_string()
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_daily_and_intraday_keys() {
        let daily = parse_timestamp("2024-03-01").unwrap();
        assert_eq!(format_timestamp(&daily), "2024-03-01");

        let intraday = parse_timestamp("2024-03-01 19:55:00").unwrap();
        assert_eq!(format_timestamp(&intraday), "2024-03-01 19:55:00");

        assert!(parse_timestamp("01/03/2024").is_none());
        assert!(parse_timestamp("").is_none());
    }

    #[test]
    fn masks_api_key_in_logged_urls() {
        let url = Url::parse(
            "https://www.alphavantage.co/query?function=TIME_SERIES_DAILY&symbol=IBM&apikey=SECRET",
        )
        .unwrap();
        let shown = redacted_url(&url);
        assert!(!shown.contains("SECRET"));
        assert!(shown.contains("symbol=IBM"));
        assert!(shown.contains("apikey=***") || shown.contains("apikey=%2A%2A%2A"));
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape_html(r#"<b>"A&B's"</b>"#),
            "&lt;b&gt;&quot;A&amp;B&#39;s&quot;&lt;/b&gt;"
        );
    }
}
