use itertools::Itertools;

use crate::{
    configuration::ScraperSettings,
    domain::{
        review::ReviewRecord,
        search_link::{resolve_review_page, TARGET_DOMAIN},
    },
    services::{browser::BrowserSession, review_extractor::extract_reviews},
};

// Boilerplate organizational phrases stripped from school names before
// searching.
const ORG_BOILERPLATE: &[&str] = &[
    "Государственное бюджетное общеобразовательное учреждение",
    "города Москвы",
];

pub enum ScrapeOutcome {
    Found(Vec<ReviewRecord>),
    NotFound,
    Failed(anyhow::Error),
}

/// End-to-end scrape for one school. Collapses "found nothing" and "broke"
/// into an empty list at this boundary; the distinction is logged.
pub async fn scrape_reviews(school_name: &str, settings: &ScraperSettings) -> Vec<ReviewRecord> {
    match run_scrape(school_name, settings).await {
        ScrapeOutcome::Found(records) => records,
        ScrapeOutcome::NotFound => {
            log::info!("No review page found for {:?}", school_name);
            Vec::new()
        }
        ScrapeOutcome::Failed(e) => {
            log::error!("Scrape failed for {:?}: {:#}", school_name, e);
            Vec::new()
        }
    }
}

async fn run_scrape(school_name: &str, settings: &ScraperSettings) -> ScrapeOutcome {
    let session = match BrowserSession::launch(settings).await {
        Ok(session) => session,
        Err(e) => return ScrapeOutcome::Failed(e),
    };

    let outcome = drive(&session, school_name, settings)
        .await
        .unwrap_or_else(ScrapeOutcome::Failed);

    // Teardown runs on every exit path, success or failure.
    session.close().await;

    outcome
}

async fn drive(
    session: &BrowserSession,
    school_name: &str,
    settings: &ScraperSettings,
) -> anyhow::Result<ScrapeOutcome> {
    let query = build_search_query(school_name);
    log::info!("Searching for {:?}", query);

    let hrefs = session.search_engine_query(&query).await?;
    let Some(url) = resolve_review_page(&hrefs) else {
        return Ok(ScrapeOutcome::NotFound);
    };
    log::info!("Resolved review page {}", url);

    let fragments = session
        .open_and_expand(&url, &settings.fragment_selectors)
        .await?;
    let records = extract_reviews(&fragments);
    log::info!(
        "Extracted {} reviews from {} fragments",
        records.len(),
        fragments.len()
    );

    Ok(ScrapeOutcome::Found(records))
}

pub fn build_search_query(school_name: &str) -> String {
    let mut cleaned = school_name.to_string();
    for phrase in ORG_BOILERPLATE {
        cleaned = cleaned.replace(phrase, "");
    }
    let cleaned = cleaned.split_whitespace().join(" ");

    format!("site:{} {}", TARGET_DOMAIN, cleaned)
}

#[cfg(test)]
mod tests {
    use super::build_search_query;

    #[test]
    fn query_strips_organizational_boilerplate() {
        let query = build_search_query(
            "Государственное бюджетное общеобразовательное учреждение Школа № 1234 города Москвы",
        );

        assert_eq!(query, "site:schoolotzyv.ru Школа № 1234");
    }

    #[test]
    fn query_keeps_plain_names_intact() {
        let query = build_search_query("Лицей Вторая школа");

        assert_eq!(query, "site:schoolotzyv.ru Лицей Вторая школа");
    }
}
