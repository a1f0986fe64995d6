use core::future::Future;

use mosweeper_protocol::{ListingQuery, ListingResponse, ScoreRecord};
use reqwest::Url;
use reqwest::header::CONTENT_TYPE;

use crate::{LeaderboardConfig, LeaderboardError, Result};

/// Remote store of score records.
pub trait ScoreEndpoint {
    /// Sends a record. `Ok` only means the request went out, the endpoint may still drop it.
    fn post_score(&self, record: &ScoreRecord) -> impl Future<Output = Result<()>>;

    fn fetch_listing(&self, query: ListingQuery) -> impl Future<Output = Result<ListingResponse>>;
}

/// [`ScoreEndpoint`] speaking JSON over HTTP.
#[derive(Clone, Debug)]
pub struct HttpEndpoint {
    client: reqwest::Client,
    url: Url,
}

impl HttpEndpoint {
    pub fn new(config: &LeaderboardConfig) -> Result<Self> {
        let endpoint = config.endpoint.trim();
        let url = Url::parse(endpoint)
            .map_err(|err| LeaderboardError::InvalidEndpoint(format!("{endpoint}: {err}")))?;

        let builder = reqwest::Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(config.request_timeout());
        let client = builder.build()?;

        Ok(Self { client, url })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn listing_url(&self, query: ListingQuery) -> Url {
        let mut url = self.url.clone();
        if let Some((key, value)) = query.query_pair() {
            url.query_pairs_mut().append_pair(key, value);
        }
        url
    }
}

impl ScoreEndpoint for HttpEndpoint {
    async fn post_score(&self, record: &ScoreRecord) -> Result<()> {
        let body = serde_json::to_string(record)?;
        let request = self
            .client
            .post(self.url.clone())
            .header(CONTENT_TYPE, "application/json")
            .body(body);

        // the endpoint does not send CORS headers, so the browser hides the response
        #[cfg(target_arch = "wasm32")]
        let request = request.fetch_mode_no_cors();

        // status and body are never inspected, only transport failures count
        request.send().await?;
        log::debug!("Score for {} posted", record.name);
        Ok(())
    }

    async fn fetch_listing(&self, query: ListingQuery) -> Result<ListingResponse> {
        let url = self.listing_url(query);
        log::debug!("Fetching listing {:?} from {}", query, url);

        let body = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(serde_json::from_str(&body)?)
    }
}
