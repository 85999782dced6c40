//! Headless Chromium access for sites whose search form needs a real browser.
//!
//! The search page is opened, the form fields are filled in through a small
//! script, the form is submitted and the rendered DOM goes through the same
//! link matcher as the HTTP fetcher.

use crate::config::site::SiteProfile;
use crate::core::matcher::{find_detail_link, page_preview};
use crate::core::{AddressQuery, ConfigProvider, Diagnostics, RecordFetcher};
use crate::utils::error::{LookupError, Result};
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::Page;
use futures_util::StreamExt;
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use url::Url;

const FILL_FORM_SCRIPT: &str = r#"(() => {
  const fields = __FIELDS__;
  const target = document.getElementsByName(fields[0][0])[0];
  if (!target || !target.form) { return false; }
  const form = target.form;
  for (const [name, value] of fields) {
    const el = form.elements.namedItem(name);
    if (el) {
      el.value = value;
    } else {
      const hidden = document.createElement('input');
      hidden.type = 'hidden';
      hidden.name = name;
      hidden.value = value;
      form.appendChild(hidden);
    }
  }
  window.__NJ_LOOKUP_PENDING__ = true;
  const button = form.querySelector('input[type="submit"], button[type="submit"]');
  if (button && form.requestSubmit) { form.requestSubmit(button); } else { form.submit(); }
  return true;
})()"#;

/// True once the submitted form has been replaced by a fully loaded document.
const RESULTS_READY_SCRIPT: &str =
    "window.__NJ_LOOKUP_PENDING__ === undefined && document.readyState === 'complete'";

const DEFAULT_NAVIGATION_TIMEOUT: Duration = Duration::from_secs(30);
const POLL_INTERVAL: Duration = Duration::from_millis(100);

pub struct BrowserRecordFetcher<C: ConfigProvider> {
    config: C,
}

impl<C: ConfigProvider> BrowserRecordFetcher<C> {
    pub fn new(config: C) -> Self {
        Self { config }
    }

    fn browser_config(&self) -> Result<BrowserConfig> {
        let mut builder = BrowserConfig::builder().args(vec![
            "--disable-gpu".to_string(),
            "--no-first-run".to_string(),
            "--no-default-browser-check".to_string(),
            format!("--user-agent={}", self.config.user_agent()),
        ]);
        if let Some(path) = self.config.chromium_path() {
            builder = builder.chrome_executable(path);
        }
        if let Some(timeout) = self.config.timeout() {
            builder = builder.request_timeout(timeout);
        }
        builder
            .build()
            .map_err(browser_error("failed to configure chromium"))
    }

    async fn drive(
        &self,
        browser: &Browser,
        query: &AddressQuery,
        diagnostics: &mut Diagnostics,
    ) -> Result<Option<Url>> {
        let site = self.config.site();

        diagnostics.record("Request", format!("BROWSER {}", site.search_url));
        let page = browser
            .new_page(site.search_url.as_str())
            .await
            .map_err(browser_error("failed to open search page"))?;

        let submitted: bool = page
            .evaluate(fill_form_script(site, query.as_str())?)
            .await
            .map_err(browser_error("failed to fill search form"))?
            .into_value()
            .map_err(browser_error("unexpected form script result"))?;
        if !submitted {
            return Err(LookupError::ParseError {
                message: format!("search form field '{}' not found", site.address_field),
            });
        }

        let limit = self.config.timeout().unwrap_or(DEFAULT_NAVIGATION_TIMEOUT);
        wait_until(limit, || results_ready(&page)).await?;

        let page_url = current_url(&page).await?;
        diagnostics.record("Current URL", page_url.as_str());

        let html = page
            .content()
            .await
            .map_err(browser_error("failed to read rendered page"))?;

        match find_detail_link(&html, &page_url, &site.matcher, query.as_str())? {
            None => {
                diagnostics.record("Page content preview", page_preview(&html));
                Ok(None)
            }
            Some(url) if site.follow_detail => {
                diagnostics.record("Detail Request", format!("BROWSER {}", url));
                page.goto(url.as_str())
                    .await
                    .map_err(browser_error("failed to open detail page"))?;
                let final_url = current_url(&page).await?;
                diagnostics.record("Detail URL", final_url.as_str());
                Ok(Some(final_url))
            }
            Some(url) => Ok(Some(url)),
        }
    }
}

#[async_trait::async_trait]
impl<C: ConfigProvider> RecordFetcher for BrowserRecordFetcher<C> {
    async fn fetch(
        &self,
        query: &AddressQuery,
        diagnostics: &mut Diagnostics,
    ) -> Result<Option<Url>> {
        let (mut browser, mut handler) = Browser::launch(self.browser_config()?)
            .await
            .map_err(browser_error("failed to launch chromium"))?;
        let handler_task = tokio::spawn(async move {
            while let Some(_event) = handler.next().await {}
        });

        let result = self.drive(&browser, query, diagnostics).await;

        if let Err(e) = browser.close().await {
            tracing::warn!("Chromium did not close cleanly: {}", e);
        }
        handler_task.abort();
        result
    }
}

/// Evaluation fails while the old document is being torn down, which counts as not ready.
async fn results_ready(page: &Page) -> bool {
    match page.evaluate(RESULTS_READY_SCRIPT).await {
        Ok(result) => result.into_value::<bool>().unwrap_or(false),
        Err(e) => {
            tracing::trace!("Results page not ready yet: {}", e);
            false
        }
    }
}

async fn wait_until<F, Fut>(limit: Duration, mut ready: F) -> Result<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let polling = async {
        while !ready().await {
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    };
    tokio::time::timeout(limit, polling)
        .await
        .map_err(|_| LookupError::BrowserError {
            message: format!("search results did not load within {:?}", limit),
        })
}

async fn current_url(page: &Page) -> Result<Url> {
    let url = page
        .url()
        .await
        .map_err(browser_error("failed to read page URL"))?
        .ok_or_else(|| LookupError::BrowserError {
            message: "page has no URL".to_string(),
        })?;
    Ok(Url::parse(&url)?)
}

fn fill_form_script(site: &SiteProfile, address: &str) -> Result<String> {
    let fields = serde_json::to_string(&site.form_fields(address))?;
    Ok(FILL_FORM_SCRIPT.replace("__FIELDS__", &fields))
}

fn browser_error<E: Display>(context: &'static str) -> impl FnOnce(E) -> LookupError {
    move |e| LookupError::BrowserError {
        message: format!("{}: {}", context, e),
    }
}
