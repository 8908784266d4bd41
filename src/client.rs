//! HTTP access to lesson pages. A thin wrapper over reqwest that joins the
//! resolved relative URL against the current page and checks the status.

use reqwest::Client;
use tracing::debug;
use url::Url;

use crate::NavError;

/// Fetches lesson documents relative to the page being viewed.
#[derive(Debug, Clone)]
pub struct PageClient {
    http: Client,
}

impl PageClient {
    /// No request timeout is configured: the navigator never cancels an
    /// in-flight fetch, it only refuses to start a second one.
    pub fn new() -> Result<Self, NavError> {
        let http = Client::builder()
            .user_agent(concat!("coursenav/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http })
    }

    /// GETs `relative` resolved against `page` and returns the body as text.
    /// Non-success statuses surface as [`NavError::Fetch`].
    pub async fn fetch_page(&self, page: &Url, relative: &str) -> Result<String, NavError> {
        let target = page.join(relative)?;
        debug!(url = %target, "fetching lesson page");
        let response = self.http.get(target).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(NavError::Fetch {
                status: status.as_u16(),
            });
        }
        Ok(response.text().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn fetches_relative_to_the_current_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/curriculum/python/intro.html"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
            .mount(&server)
            .await;

        let page = Url::parse(&format!("{}/curriculum/cpp/loops", server.uri())).unwrap();
        let client = PageClient::new().unwrap();
        let body = client
            .fetch_page(&page, "../python/intro.html")
            .await
            .unwrap();
        assert_eq!(body, "<html></html>");
    }

    #[tokio::test]
    async fn non_success_status_is_a_fetch_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/curriculum/python/missing.html"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let page = Url::parse(&format!("{}/index.html", server.uri())).unwrap();
        let client = PageClient::new().unwrap();
        let err = client
            .fetch_page(&page, "curriculum/python/missing.html")
            .await
            .unwrap_err();
        assert!(matches!(err, NavError::Fetch { status: 404 }));
    }
}
