use crate::config::site::RequestMethod;
use crate::core::matcher::{find_detail_link, page_preview};
use crate::core::{AddressQuery, ConfigProvider, Diagnostics, RecordFetcher};
use crate::utils::error::{LookupError, Result};
use reqwest::{Client, Response};
use url::Url;

/// Emulates the search form with a plain HTTP session.
pub struct HttpRecordFetcher<C: ConfigProvider> {
    pub(crate) config: C,
    pub(crate) client: Client,
}

impl<C: ConfigProvider> HttpRecordFetcher<C> {
    pub fn new(config: C) -> Result<Self> {
        let mut builder = Client::builder()
            .user_agent(config.user_agent())
            .cookie_store(true);
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            config,
        })
    }

    async fn submit_search(
        &self,
        query: &AddressQuery,
        diagnostics: &mut Diagnostics,
    ) -> Result<(Url, String)> {
        let site = self.config.site();
        let fields = site.form_fields(query.as_str());

        let request = match site.method {
            RequestMethod::Get => self.client.get(&site.search_url).query(&fields),
            RequestMethod::Post => self.client.post(&site.search_url).form(&fields),
        };
        diagnostics.record(
            "Request",
            format!("{} {}", site.method.as_str(), site.search_url),
        );

        let response = checked(request.send().await?, "Status", diagnostics)?;
        let page_url = response.url().clone();
        diagnostics.record("Current URL", page_url.as_str());

        let body = response.text().await?;
        tracing::debug!("Search response body: {} bytes", body.len());
        Ok((page_url, body))
    }

    async fn follow_detail(&self, url: Url, diagnostics: &mut Diagnostics) -> Result<Url> {
        diagnostics.record("Detail Request", format!("GET {}", url));
        let response = self.client.get(url).send().await?;
        let status = response.status();
        diagnostics.record("Detail Status", status.to_string());
        if !status.is_success() {
            tracing::warn!("Detail page answered {}; keeping its URL", status);
        }
        let final_url = response.url().clone();
        diagnostics.record("Detail URL", final_url.as_str());
        Ok(final_url)
    }
}

fn checked(response: Response, label: &str, diagnostics: &mut Diagnostics) -> Result<Response> {
    let status = response.status();
    diagnostics.record(label, status.to_string());
    if !status.is_success() {
        return Err(LookupError::UpstreamStatusError {
            status: status.as_u16(),
            url: response.url().to_string(),
        });
    }
    Ok(response)
}

#[async_trait::async_trait]
impl<C: ConfigProvider> RecordFetcher for HttpRecordFetcher<C> {
    async fn fetch(
        &self,
        query: &AddressQuery,
        diagnostics: &mut Diagnostics,
    ) -> Result<Option<Url>> {
        let site = self.config.site();
        let (page_url, body) = self.submit_search(query, diagnostics).await?;

        match find_detail_link(&body, &page_url, &site.matcher, query.as_str())? {
            None => {
                diagnostics.record("Page content preview", page_preview(&body));
                Ok(None)
            }
            Some(url) if site.follow_detail => {
                Ok(Some(self.follow_detail(url, diagnostics).await?))
            }
            Some(url) => Ok(Some(url)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::site::{builtin_sites, LinkMatcher, SiteProfile};
    use crate::config::LookupConfig;
    use httpmock::prelude::*;
    use std::time::Duration;

    const MORE_INFO_PAGE: &str = r#"<html><body>
<table>
  <tr><td>192 OLEAN AVE</td><td><a href="detail.cgi?id=42">More Info</a></td></tr>
</table>
</body></html>"#;

    fn jersey_city_against(server: &MockServer) -> SiteProfile {
        let mut site = builtin_sites().remove(0);
        site.search_url = server.url("/pub/cgi/prc6.cgi?ms_user=ctb09&district=0906&adv=1");
        site
    }

    fn query() -> AddressQuery {
        AddressQuery::parse("192 olean ave").unwrap()
    }

    #[tokio::test]
    async fn test_post_search_follows_more_info_link() {
        let server = MockServer::start();
        let search_mock = server.mock(|when, then| {
            when.method(POST)
                .path("/pub/cgi/prc6.cgi")
                .query_param("ms_user", "ctb09")
                .query_param("district", "0906")
                .x_www_form_urlencoded_tuple("location", "192 OLEAN AVE")
                .x_www_form_urlencoded_tuple("database", "0")
                .x_www_form_urlencoded_tuple("county", "09");
            then.status(200)
                .header("Content-Type", "text/html")
                .body(MORE_INFO_PAGE);
        });
        let detail_mock = server.mock(|when, then| {
            when.method(GET).path("/pub/cgi/detail.cgi").query_param("id", "42");
            then.status(200).body("<html>record</html>");
        });

        let fetcher = HttpRecordFetcher::new(LookupConfig::for_site(jersey_city_against(&server)))
            .unwrap();
        let mut diagnostics = Diagnostics::new();
        let url = fetcher.fetch(&query(), &mut diagnostics).await.unwrap().unwrap();

        search_mock.assert();
        detail_mock.assert();
        assert_eq!(url.as_str(), server.url("/pub/cgi/detail.cgi?id=42"));
        assert_eq!(diagnostics.find("Status"), Some("200 OK"));
        assert!(diagnostics.find("Detail URL").is_some());
    }

    #[tokio::test]
    async fn test_follow_detail_reports_final_url_after_redirect() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/pub/cgi/prc6.cgi");
            then.status(200).body(MORE_INFO_PAGE);
        });
        server.mock(|when, then| {
            when.method(GET).path("/pub/cgi/detail.cgi");
            then.status(302)
                .header("Location", server.url("/pub/cgi/record.cgi?block=1202"));
        });
        let record_mock = server.mock(|when, then| {
            when.method(GET).path("/pub/cgi/record.cgi");
            then.status(200).body("<html>record</html>");
        });

        let fetcher = HttpRecordFetcher::new(LookupConfig::for_site(jersey_city_against(&server)))
            .unwrap();
        let url = fetcher
            .fetch(&query(), &mut Diagnostics::new())
            .await
            .unwrap()
            .unwrap();

        record_mock.assert();
        assert_eq!(url.as_str(), server.url("/pub/cgi/record.cgi?block=1202"));
    }

    #[tokio::test]
    async fn test_follow_detail_keeps_link_when_detail_page_errors() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/pub/cgi/prc6.cgi");
            then.status(200).body(MORE_INFO_PAGE);
        });
        let detail_mock = server.mock(|when, then| {
            when.method(GET).path("/pub/cgi/detail.cgi").query_param("id", "42");
            then.status(404);
        });

        let fetcher = HttpRecordFetcher::new(LookupConfig::for_site(jersey_city_against(&server)))
            .unwrap();
        let mut diagnostics = Diagnostics::new();
        let url = fetcher.fetch(&query(), &mut diagnostics).await.unwrap().unwrap();

        detail_mock.assert();
        assert_eq!(url.as_str(), server.url("/pub/cgi/detail.cgi?id=42"));
        assert!(diagnostics.find("Detail Status").unwrap().starts_with("404"));
    }

    #[tokio::test]
    async fn test_get_search_without_follow_returns_absolute_link() {
        let server = MockServer::start();
        let search_mock = server.mock(|when, then| {
            when.method(GET)
                .path("/search")
                .query_param("q", "192 olean ave")
                .query_param("county", "09");
            then.status(200).body(
                r#"<table><tr><td>192 olean ave</td><td><a href="/records/7">Open</a></td></tr></table>"#,
            );
        });

        let site = SiteProfile {
            name: "rows".to_string(),
            title: None,
            description: None,
            search_url: server.url("/search"),
            method: RequestMethod::Get,
            access: Default::default(),
            address_field: "q".to_string(),
            address_case: Default::default(),
            parameters: vec![("county".to_string(), "09".to_string())],
            matcher: LinkMatcher::RowAddress { marker: None },
            follow_detail: false,
        };

        let fetcher = HttpRecordFetcher::new(LookupConfig::for_site(site)).unwrap();
        let url = fetcher
            .fetch(&query(), &mut Diagnostics::new())
            .await
            .unwrap()
            .unwrap();

        search_mock.assert();
        assert!(url.has_host());
        assert_eq!(url.as_str(), server.url("/records/7"));
    }

    #[tokio::test]
    async fn test_no_matching_anchor_is_absence_with_preview() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/pub/cgi/prc6.cgi");
            then.status(200)
                .body("<html><body><p>No records match your search.</p></body></html>");
        });
        let detail_mock = server.mock(|when, then| {
            when.method(GET).path("/pub/cgi/detail.cgi");
            then.status(200);
        });

        let fetcher = HttpRecordFetcher::new(LookupConfig::for_site(jersey_city_against(&server)))
            .unwrap();
        let mut diagnostics = Diagnostics::new();
        let result = fetcher.fetch(&query(), &mut diagnostics).await.unwrap();

        assert!(result.is_none());
        assert_eq!(detail_mock.hits(), 0);
        assert!(diagnostics
            .find("Page content preview")
            .unwrap()
            .contains("No records match"));
    }

    #[tokio::test]
    async fn test_server_error_is_upstream_failure() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/pub/cgi/prc6.cgi");
            then.status(500);
        });

        let fetcher = HttpRecordFetcher::new(LookupConfig::for_site(jersey_city_against(&server)))
            .unwrap();
        let mut diagnostics = Diagnostics::new();
        let err = fetcher.fetch(&query(), &mut diagnostics).await.unwrap_err();

        assert!(matches!(
            err,
            LookupError::UpstreamStatusError { status: 500, .. }
        ));
        assert!(diagnostics.find("Status").unwrap().starts_with("500"));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_http_error() {
        let mut site = builtin_sites().remove(0);
        site.search_url = "http://127.0.0.1:9/prc6.cgi".to_string();
        let config = LookupConfig::for_site(site).with_timeout(Duration::from_secs(5));

        let fetcher = HttpRecordFetcher::new(config).unwrap();
        let err = fetcher
            .fetch(&query(), &mut Diagnostics::new())
            .await
            .unwrap_err();

        assert!(matches!(err, LookupError::HttpError(_)));
    }
}
