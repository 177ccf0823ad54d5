use std::future::Future;

use reqwest::{Client, header::CONTENT_TYPE};
use tracing::debug;
use url::Url;

use crate::Result;

/// Content type attached to every action request
pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// Carries one JSON-encoded action to the game page and returns the raw reply body.
///
/// Decoding the reply is left to the caller so that a body which is not JSON can be
/// told apart from one that is.
pub trait Transport: Send + Sync + 'static {
    fn post(&self, body: String) -> impl Future<Output = Result<String>> + Send;
}

/// HTTP transport posting to the game page's own URL
pub struct HttpTransport {
    client: Client,
    game_url: Url,
}

impl HttpTransport {
    /// Create a transport posting to `game_url`
    pub fn new(game_url: Url) -> Self {
        Self {
            client: Client::new(),
            game_url,
        }
    }

    pub fn game_url(&self) -> &Url {
        &self.game_url
    }
}

impl Transport for HttpTransport {
    fn post(&self, body: String) -> impl Future<Output = Result<String>> + Send {
        async move {
            debug!("POST {}: {}", self.game_url, body);

            let response = self
                .client
                .post(self.game_url.clone())
                .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
                .body(body)
                .send()
                .await?;

            // The status code is not inspected; only the body decides success
            let text = response.text().await?;
            debug!("Received {} bytes", text.len());
            Ok(text)
        }
    }
}
