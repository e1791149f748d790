use chrono::NaiveDate;
use regex::Regex;

pub const POSITIVE_MARKER: &str = "Положительный";
pub const NEGATIVE_MARKER: &str = "Отрицательный";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Negative => "negative",
            Sentiment::Neutral => "neutral",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewRecord {
    pub date: NaiveDate,
    pub rating: Sentiment,
    pub text: String,
}

// Reviews without a recognizable date are pinned to this constant.
pub fn fallback_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

/// Turns one raw fragment blob into a structured record. Unmatched
/// patterns degrade to fallbacks, never to an error.
pub fn normalize(raw: &str) -> ReviewRecord {
    let date_re = Regex::new(r"\d{4}-\d{2}-\d{2}").unwrap();
    let body_re = Regex::new(r"(?s)Это ложь\s+\d+\s*\n(.*?)(?:Ответить|$)").unwrap();

    let date = date_re
        .find_iter(raw)
        .filter_map(|m| NaiveDate::parse_from_str(m.as_str(), "%Y-%m-%d").ok())
        .next()
        .unwrap_or_else(fallback_date);

    // The positive marker wins when both markers are present.
    let rating = if raw.contains(POSITIVE_MARKER) {
        Sentiment::Positive
    } else if raw.contains(NEGATIVE_MARKER) {
        Sentiment::Negative
    } else {
        Sentiment::Neutral
    };

    // Review body sits between the flag counter and the reply affordance.
    let text = body_re
        .captures(raw)
        .map(|caps| caps[1].trim().to_string())
        .filter(|body| !body.is_empty())
        .unwrap_or_else(|| raw.trim().to_string());

    ReviewRecord { date, rating, text }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_full_fragment() {
        let raw = "2024-05-01 #12 Положительный Это ложь 12\nGreat teachers here.\nОтветить";
        let record = normalize(raw);

        assert_eq!(record.date, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        assert_eq!(record.rating, Sentiment::Positive);
        assert_eq!(record.text, "Great teachers here.");
    }

    #[test]
    fn normalize_without_date_uses_fallback() {
        let record = normalize("#3 Отрицательный Это ложь 0\nШкола не понравилась.\nОтветить");

        assert_eq!(record.date, fallback_date());
        assert_eq!(record.rating, Sentiment::Negative);
        assert_eq!(record.text, "Школа не понравилась.");
    }

    #[test]
    fn normalize_rejects_impossible_date() {
        let record = normalize("2024-13-40 Это ложь 1\nОчень странная дата.\nОтветить");

        assert_eq!(record.date, fallback_date());
    }

    #[test]
    fn positive_marker_wins_over_negative() {
        let record = normalize("2023-09-10 Положительный Отрицательный отзыв о школе");

        assert_eq!(record.rating, Sentiment::Positive);
    }

    #[test]
    fn no_marker_defaults_to_neutral() {
        let record = normalize("2023-09-10 Обычный отзыв о школе без оценки");

        assert_eq!(record.rating, Sentiment::Neutral);
    }

    #[test]
    fn body_falls_back_to_whole_blob() {
        let raw = "2022-03-15 Хорошая школа, сильные учителя";
        let record = normalize(raw);

        assert_eq!(record.text, raw);
    }

    #[test]
    fn body_without_reply_affordance_captures_to_end() {
        let record = normalize("2022-03-15 Это ложь 4\nДетям нравится, советую");

        assert_eq!(record.text, "Детям нравится, советую");
    }
}
