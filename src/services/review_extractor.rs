use std::collections::HashSet;

use regex::Regex;

use crate::domain::review::{normalize, ReviewRecord};

// Fragments at or under this length are UI chrome, not review content.
const MIN_FRAGMENT_CHARS: usize = 50;
const DEDUP_PREFIX_CHARS: usize = 50;
const SECTION_HEADER: &str = "Все отзывы";

/// Builds one record per qualifying fragment, deduplicated on
/// `(date, first 50 chars of text)` within this call. Emission follows
/// fragment encounter order.
pub fn extract_reviews(fragments: &[String]) -> Vec<ReviewRecord> {
    // An id marker or an embedded date is required as a review signal.
    let signal_re = Regex::new(r"#\d+|20\d{2}-\d{2}-\d{2}").unwrap();

    let mut seen = HashSet::new();
    let mut records = Vec::new();

    for fragment in fragments {
        let fragment = fragment.trim();
        if fragment.chars().count() <= MIN_FRAGMENT_CHARS {
            continue;
        }
        if fragment.starts_with(SECTION_HEADER) {
            continue;
        }
        if !signal_re.is_match(fragment) {
            continue;
        }

        let record = normalize(fragment);
        let key = (
            record.date,
            record.text.chars().take(DEDUP_PREFIX_CHARS).collect::<String>(),
        );
        if !seen.insert(key) {
            continue;
        }
        records.push(record);
    }

    records
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::domain::review::Sentiment;

    fn fragments(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|fragment| fragment.to_string()).collect()
    }

    #[test]
    fn extracts_one_record_per_review_fragment() {
        let input = fragments(&[
            "2024-05-01 #12 Положительный Это ложь 12\nGreat teachers here.\nОтветить",
            "2024-06-02 #13 Отрицательный Это ложь 0\nСлишком большие домашние задания.\nОтветить",
        ]);
        let records = extract_reviews(&input);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].date, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        assert_eq!(records[0].rating, Sentiment::Positive);
        assert_eq!(records[0].text, "Great teachers here.");
        assert_eq!(records[1].rating, Sentiment::Negative);
    }

    #[test]
    fn duplicate_fragments_emit_a_single_record() {
        let fragment = "2024-05-01 #12 Положительный Это ложь 12\nGreat teachers here.\nОтветить";
        let input = fragments(&[fragment, fragment, fragment]);

        assert_eq!(extract_reviews(&input).len(), 1);
    }

    #[test]
    fn short_fragment_is_excluded_even_with_a_date() {
        let input = fragments(&["2024-05-01 короткий отзыв"]);

        assert!(extract_reviews(&input).is_empty());
    }

    #[test]
    fn section_header_fragment_is_excluded() {
        let input = fragments(&[
            "Все отзывы о школе за 2024-05-01, отсортированные по дате публикации пользователями",
        ]);

        assert!(extract_reviews(&input).is_empty());
    }

    #[test]
    fn fragment_without_review_signal_is_excluded() {
        let input = fragments(&[
            "Очень длинный рекламный блок без номера и без даты, который не является отзывом",
        ]);

        assert!(extract_reviews(&input).is_empty());
    }

    #[test]
    fn emission_follows_encounter_order() {
        let input = fragments(&[
            "2024-06-02 #2 Это ложь 0\nВторой по дате, но первый на странице отзыв.\nОтветить",
            "2024-05-01 #1 Это ложь 0\nПервый по дате, но второй на странице отзыв.\nОтветить",
        ]);
        let records = extract_reviews(&input);

        assert_eq!(records[0].date, NaiveDate::from_ymd_opt(2024, 6, 2).unwrap());
        assert_eq!(records[1].date, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
    }

    #[test]
    fn same_text_on_different_dates_is_kept() {
        let input = fragments(&[
            "2024-05-01 #1 Это ложь 0\nОтличная школа, рекомендую всем родителям.\nОтветить",
            "2024-06-02 #2 Это ложь 0\nОтличная школа, рекомендую всем родителям.\nОтветить",
        ]);

        assert_eq!(extract_reviews(&input).len(), 2);
    }
}
