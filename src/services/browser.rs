use std::{env, path::PathBuf, process::Stdio, time::Duration};

use anyhow::Context;
use itertools::Itertools;
use rand::Rng;
use scraper::{Html, Selector};
use serde_json::json;
use thirtyfour::{
    ChromiumLikeCapabilities, By, DesiredCapabilities, Key, WebDriver, WebElement,
};
use tokio::process::{Child, Command};

use crate::configuration::ScraperSettings;

const SEARCH_ENGINE_URL: &str = "https://ya.ru";
const SEARCH_INPUT_NAME: &str = "text";

const CHROME_CANDIDATES: &[&str] = &["chromium", "google-chrome", "chromium-browser"];
const CHROME_FALLBACKS: &[&str] = &["/usr/bin/chromium", "/usr/bin/google-chrome"];
const CHROMEDRIVER_CANDIDATES: &[&str] = &["chromedriver"];
const CHROMEDRIVER_FALLBACKS: &[&str] = &["/usr/bin/chromedriver", "/usr/local/bin/chromedriver"];

const DRIVER_READY_ATTEMPTS: u32 = 40;
const DRIVER_READY_POLL: Duration = Duration::from_millis(250);
const ELEMENT_POLL: Duration = Duration::from_millis(500);
const SEARCH_INPUT_TIMEOUT: Duration = Duration::from_secs(10);
const PAGE_LOAD_TIMEOUT: Duration = Duration::from_secs(10);
// Client-side rendering has no reliable readiness signal on either page;
// these settle delays bound it instead.
const RESULTS_SETTLE: Duration = Duration::from_secs(5);
const RENDER_SETTLE: Duration = Duration::from_secs(5);
const SCROLL_SETTLE: Duration = Duration::from_secs(2);

const MIDPOINT_SCROLL: &str = "window.scrollTo(0, document.body.scrollHeight / 2);";
const WEBDRIVER_PROPERTY_PATCH: &str =
    "Object.defineProperty(navigator, 'webdriver', { get: () => undefined })";

/// One launch-to-close lifetime of the automated browser. The session owns
/// its own chromedriver child process, so concurrent invocations never share
/// a driver.
pub struct BrowserSession {
    driver: WebDriver,
    chromedriver: Child,
}

impl BrowserSession {
    pub async fn launch(settings: &ScraperSettings) -> anyhow::Result<Self> {
        let chrome = find_executable(CHROME_CANDIDATES, CHROME_FALLBACKS)
            .context("chrome/chromium binary not found")?;
        let chromedriver_bin = find_executable(CHROMEDRIVER_CANDIDATES, CHROMEDRIVER_FALLBACKS)
            .context("chromedriver not found")?;

        let mut caps = DesiredCapabilities::chrome();
        caps.set_binary(&chrome.to_string_lossy())?;
        if settings.headless {
            caps.add_arg("--headless")?;
        }
        for arg in &settings.extra_args {
            caps.add_arg(arg)?;
        }
        caps.add_arg(&format!("user-agent={}", settings.user_agent))?;
        caps.add_experimental_option("excludeSwitches", json!(["enable-automation"]))?;
        caps.add_experimental_option("useAutomationExtension", json!(false))?;

        let port = rand::thread_rng().gen_range(20000..40000);
        let server_url = format!("http://localhost:{}", port);

        let chromedriver = Command::new(&chromedriver_bin)
            .arg(format!("--port={}", port))
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .context("failed to start chromedriver")?;

        if !driver_ready(&server_url).await {
            anyhow::bail!("chromedriver did not become ready on {}", server_url);
        }

        let driver = WebDriver::new(&server_url, caps)
            .await
            .context("failed to create webdriver session")?;

        if let Err(e) = driver.execute(WEBDRIVER_PROPERTY_PATCH, Vec::new()).await {
            log::warn!("Failed to patch navigator.webdriver: {:?}", e);
        }

        Ok(BrowserSession {
            driver,
            chromedriver,
        })
    }

    /// Opens the search engine, submits the query and returns every anchor
    /// href on the results page, raw and unfiltered. A missing search input
    /// is "no results", not an error.
    pub async fn search_engine_query(&self, query: &str) -> anyhow::Result<Vec<Option<String>>> {
        self.driver.goto(SEARCH_ENGINE_URL).await?;

        let input = match self
            .wait_for(By::Name(SEARCH_INPUT_NAME), SEARCH_INPUT_TIMEOUT)
            .await
        {
            Some(element) => element,
            None => match self.driver.find(By::Css("input[type='text']")).await {
                Ok(element) => element,
                Err(_) => {
                    log::error!("Search input not found on {}", SEARCH_ENGINE_URL);
                    return Ok(Vec::new());
                }
            },
        };

        input.send_keys(query).await?;
        input.send_keys(Key::Enter).await?;
        tokio::time::sleep(RESULTS_SETTLE).await;

        let page_source = self.driver.source().await?;
        Ok(collect_anchor_hrefs(&page_source))
    }

    /// Navigates to a page, scrolls to its midpoint to trigger lazy-loaded
    /// content and returns the text of every fragment-selector match.
    pub async fn open_and_expand(
        &self,
        url: &str,
        fragment_selectors: &[String],
    ) -> anyhow::Result<Vec<String>> {
        self.driver.goto(url).await?;
        self.wait_for(By::Tag("body"), PAGE_LOAD_TIMEOUT).await;
        tokio::time::sleep(RENDER_SETTLE).await;

        self.driver.execute(MIDPOINT_SCROLL, Vec::new()).await?;
        tokio::time::sleep(SCROLL_SETTLE).await;

        let selector = fragment_selectors.iter().join(", ");
        let mut fragments = Vec::new();
        for element in self.driver.find_all(By::Css(selector.as_str())).await? {
            fragments.push(element.text().await?.trim().to_string());
        }

        Ok(fragments)
    }

    pub async fn close(self) {
        let BrowserSession {
            driver,
            mut chromedriver,
        } = self;

        if let Err(e) = driver.quit().await {
            log::warn!("Failed to quit webdriver session: {:?}", e);
        }
        if let Err(e) = chromedriver.kill().await {
            log::warn!("Failed to kill chromedriver: {:?}", e);
        }
    }

    async fn wait_for(&self, by: By, timeout: Duration) -> Option<WebElement> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            if let Ok(element) = self.driver.find(by.clone()).await {
                return Some(element);
            }
            if tokio::time::Instant::now() >= deadline {
                return None;
            }
            tokio::time::sleep(ELEMENT_POLL).await;
        }
    }
}

fn collect_anchor_hrefs(page_source: &str) -> Vec<Option<String>> {
    let a_tag_selector = Selector::parse("a").unwrap();
    let html_document = Html::parse_document(page_source);

    html_document
        .select(&a_tag_selector)
        .map(|tag| tag.value().attr("href").map(|href| href.to_string()))
        .collect()
}

fn find_executable(candidates: &[&str], fallbacks: &[&str]) -> Option<PathBuf> {
    if let Some(paths) = env::var_os("PATH") {
        for dir in env::split_paths(&paths) {
            for name in candidates {
                let path = dir.join(name);
                if path.is_file() {
                    return Some(path);
                }
            }
        }
    }

    fallbacks.iter().map(PathBuf::from).find(|path| path.is_file())
}

async fn driver_ready(server_url: &str) -> bool {
    let client = reqwest::Client::new();
    let status_url = format!("{}/status", server_url);

    for _ in 0..DRIVER_READY_ATTEMPTS {
        if let Ok(response) = client.get(&status_url).send().await {
            if let Ok(body) = response.json::<serde_json::Value>().await {
                if body["value"]["ready"].as_bool().unwrap_or(false) {
                    return true;
                }
            }
        }
        tokio::time::sleep(DRIVER_READY_POLL).await;
    }

    false
}
