use url::Url;

pub const TARGET_DOMAIN: &str = "schoolotzyv.ru";
pub const SCHOOL_PAGE_MARKER: &str = "schoolotzyv.ru/schools";

const SEARCH_ENGINE_ORIGIN: &str = "https://ya.ru";
const NOISE_MARKERS: &[&str] = &["search", "static", "yabs"];

/// Unwraps one search-result href: target-domain hrefs pass through, redirect
/// wrappers resolve to their percent-decoded `url=` / `u=` parameter.
pub fn extract_target_url(href: &str) -> Option<String> {
    // Relative wrapper hrefs resolve against the search engine origin.
    let base = Url::parse(SEARCH_ENGINE_ORIGIN).unwrap();
    let parsed = Url::options().base_url(Some(&base)).parse(href).ok()?;

    let direct = parsed
        .host_str()
        .is_some_and(|host| host == TARGET_DOMAIN || host.ends_with(&format!(".{}", TARGET_DOMAIN)));
    if direct {
        return Some(href.to_string());
    }

    parsed
        .query_pairs()
        .find(|(key, value)| matches!(key.as_ref(), "url" | "u") && value.contains(TARGET_DOMAIN))
        .map(|(_, value)| value.into_owned())
}

/// Picks the canonical review page from the anchors of a results page:
/// a school-detail subpage first, then any same-domain link that is not a
/// search, static-asset, or ad-tracking one. First match in input order.
pub fn resolve_review_page(hrefs: &[Option<String>]) -> Option<String> {
    let candidates: Vec<(&str, String)> = hrefs
        .iter()
        .flatten()
        .filter_map(|href| extract_target_url(href).map(|target| (href.as_str(), target)))
        .collect();

    candidates
        .iter()
        .find(|(_, target)| target.contains(SCHOOL_PAGE_MARKER))
        .or_else(|| {
            // Noise markers are checked on the wrapper too, so an ad
            // redirect stays rejected after unwrapping.
            candidates.iter().find(|(raw, target)| {
                !NOISE_MARKERS
                    .iter()
                    .any(|marker| raw.contains(marker) || target.contains(marker))
            })
        })
        .map(|(_, target)| target.clone())
}
