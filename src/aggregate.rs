// src/aggregate.rs
//! Merges the unioned collector output for one run: same-URL keyword merge,
//! then a strict same-day filter. Output order is not guaranteed.

use chrono::{FixedOffset, NaiveDate};
use std::collections::HashMap;

use crate::mention::Mention;

/// Group mentions by `url`. The first-encountered mention per URL survives;
/// every later duplicate's `keyword_matched` is appended to it,
/// comma-separated ("found via multiple keywords, same post"). Keywords are
/// accumulated as a list and joined once at the end, so a keyword that
/// itself contains a comma never collides with the joined form. A keyword
/// already accumulated for the URL is not appended twice.
pub fn merge_by_url(mentions: Vec<Mention>) -> Vec<Mention> {
    let mut order: Vec<String> = Vec::new();
    let mut by_url: HashMap<String, (Mention, Vec<String>)> = HashMap::new();

    for m in mentions {
        match by_url.get_mut(&m.url) {
            Some((_, keywords)) => {
                if !keywords.contains(&m.keyword_matched) {
                    keywords.push(m.keyword_matched);
                }
            }
            None => {
                order.push(m.url.clone());
                let first_keyword = m.keyword_matched.clone();
                by_url.insert(m.url.clone(), (m, vec![first_keyword]));
            }
        }
    }

    order
        .into_iter()
        .filter_map(|url| by_url.remove(&url))
        .map(|(mut m, keywords)| {
            m.keyword_matched = keywords.join(", ");
            m
        })
        .collect()
}

/// Strict same-day policy: keep only mentions posted on `day` as observed in
/// the run's zone (`offset`). Anything older is a resurfaced post and
/// dropped. The comparison zone is explicit because `posted_at` is stored in
/// UTC while "today" is the run's local date.
pub fn retain_posted_on(
    mentions: Vec<Mention>,
    day: NaiveDate,
    offset: FixedOffset,
) -> Vec<Mention> {
    mentions
        .into_iter()
        .filter(|m| m.posted_at.with_timezone(&offset).date_naive() == day)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    fn mention(url: &str, kw: &str, posted_at: chrono::DateTime<Utc>) -> Mention {
        Mention {
            source: "blog:test".into(),
            title: "t".into(),
            url: url.to_string(),
            author: "a".into(),
            posted_at,
            content_preview: None,
            keyword_matched: kw.to_string(),
        }
    }

    #[test]
    fn same_url_merge_accumulates_keywords() {
        let ts = Utc.with_ymd_and_hms(2026, 8, 23, 8, 0, 0).unwrap();
        let merged = merge_by_url(vec![
            mention("https://x.test/1", "A", ts),
            mention("https://x.test/1", "B", ts),
            mention("https://x.test/2", "C", ts),
        ]);
        assert_eq!(merged.len(), 2);
        let m1 = merged.iter().find(|m| m.url == "https://x.test/1").unwrap();
        assert_eq!(m1.keyword_matched, "A, B");
        let m2 = merged.iter().find(|m| m.url == "https://x.test/2").unwrap();
        assert_eq!(m2.keyword_matched, "C");
    }

    #[test]
    fn same_keyword_is_not_appended_twice() {
        let ts = Utc.with_ymd_and_hms(2026, 8, 23, 8, 0, 0).unwrap();
        let merged = merge_by_url(vec![
            mention("https://x.test/1", "A", ts),
            mention("https://x.test/1", "A", ts),
        ]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].keyword_matched, "A");
    }

    #[test]
    fn keyword_containing_comma_does_not_swallow_later_keywords() {
        // "A, B" is one configured keyword; the later find via "B" must still
        // be accumulated, not mistaken for an already-listed keyword.
        let ts = Utc.with_ymd_and_hms(2026, 8, 23, 8, 0, 0).unwrap();
        let merged = merge_by_url(vec![
            mention("https://x.test/1", "A, B", ts),
            mention("https://x.test/1", "B", ts),
        ]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].keyword_matched, "A, B, B");
    }

    #[test]
    fn merge_keeps_the_first_encountered_object() {
        let ts = Utc.with_ymd_and_hms(2026, 8, 23, 8, 0, 0).unwrap();
        let mut first = mention("https://x.test/1", "A", ts);
        first.title = "first title".into();
        let mut second = mention("https://x.test/1", "B", ts);
        second.title = "second title".into();
        let merged = merge_by_url(vec![first, second]);
        assert_eq!(merged[0].title, "first title");
    }

    #[test]
    fn date_filter_drops_yesterday_keeps_any_time_today() {
        let today = chrono::NaiveDate::from_ymd_opt(2026, 8, 23).unwrap();
        let morning = Utc.with_ymd_and_hms(2026, 8, 23, 0, 5, 0).unwrap();
        let night = Utc.with_ymd_and_hms(2026, 8, 23, 23, 55, 0).unwrap();
        let yesterday = morning - Duration::days(1);

        let kept = retain_posted_on(
            vec![
                mention("https://x.test/1", "A", morning),
                mention("https://x.test/2", "B", night),
                mention("https://x.test/3", "C", yesterday),
            ],
            today,
            utc(),
        );
        let urls: Vec<&str> = kept.iter().map(|m| m.url.as_str()).collect();
        assert_eq!(urls, vec!["https://x.test/1", "https://x.test/2"]);
    }

    #[test]
    fn date_filter_compares_in_the_runs_zone_not_utc() {
        let today = chrono::NaiveDate::from_ymd_opt(2026, 8, 23).unwrap();
        let kst = FixedOffset::east_opt(9 * 3600).unwrap();
        // 07:15 local on the 23rd in UTC+9 is still the 22nd in UTC.
        let early_local = Utc.with_ymd_and_hms(2026, 8, 22, 22, 15, 0).unwrap();

        let kept = retain_posted_on(vec![mention("https://x.test/1", "A", early_local)], today, kst);
        assert_eq!(kept.len(), 1);

        // The same instant evaluated against a UTC run day is yesterday.
        let kept = retain_posted_on(vec![mention("https://x.test/1", "A", early_local)], today, utc());
        assert!(kept.is_empty());
    }

    #[test]
    fn date_filter_in_negative_offset_zone() {
        let today = chrono::NaiveDate::from_ymd_opt(2026, 8, 23).unwrap();
        let pst = FixedOffset::west_opt(8 * 3600).unwrap();
        // 23:30 local on the 23rd in UTC-8 is already the 24th in UTC.
        let late_local = Utc.with_ymd_and_hms(2026, 8, 24, 7, 30, 0).unwrap();

        let kept = retain_posted_on(vec![mention("https://x.test/1", "A", late_local)], today, pst);
        assert_eq!(kept.len(), 1);
    }
}
