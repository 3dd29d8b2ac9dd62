//! The HTTP side: one shared `reqwest` client, one round trip per call.

use std::{
    fmt::{Display, Formatter},
    time::Instant,
};

use bytes::Bytes;
use reqwest::header::{HeaderValue, AUTHORIZATION};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, info_span, warn, Instrument};

mod config;
mod error;
mod qc;

pub use config::{ClientConfig, API_KEY_VAR, DEFAULT_HOST, HOST_VAR, TOKEN_VAR};
pub use error::ClientError;
pub use qc::{Record, StationData, UploadBatch};

use crate::{
    query::{OutputFormat, QueryRequest},
    response::{ResponseEnvelope, ResultTable},
};

/// What [`QueryClient::query`] returns, depending on the requested format.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutput {
    Json(Value),
    Table(ResultTable),
}

impl QueryOutput {
    pub fn into_table(self) -> Option<ResultTable> {
        match self {
            Self::Table(table) => Some(table),
            Self::Json(_) => None,
        }
    }

    pub fn into_json(self) -> Option<Value> {
        match self {
            Self::Json(json) => Some(json),
            Self::Table(_) => None,
        }
    }
}

impl Display for QueryOutput {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json(json) => match serde_json::to_string_pretty(json) {
                Ok(pretty) => write!(f, "{}", pretty),
                Err(_) => write!(f, "{}", json),
            },
            Self::Table(table) => write!(f, "{}", table),
        }
    }
}

/// A successful response body and the url that produced it.
struct Fetched {
    url: String,
    body: Bytes,
}

impl Fetched {
    fn json<T: DeserializeOwned>(&self) -> Result<T, ClientError> {
        Ok(serde_json::from_slice(&self.body)?)
    }
}

/// Client of the measurement service.
///
/// Cloning is cheap; clones share the connection pool and configuration.
#[derive(Debug, Clone)]
pub struct QueryClient {
    config: ClientConfig,
    http: reqwest::Client,
}

impl QueryClient {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("wsn_client/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { config, http })
    }

    pub fn from_env() -> Result<Self, ClientError> {
        Self::new(ClientConfig::from_env())
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Runs one query against `/api/query/{db}/`.
    ///
    /// Any non-success status fails the whole call; nothing is returned from a
    /// failed request. A missing or unusable `time` column only downgrades the
    /// table to a positional index.
    pub async fn query(&self, request: &QueryRequest) -> Result<QueryOutput, ClientError> {
        let started = Instant::now();
        let params = request.params()?;
        let url = self.config.url(&format!("/api/query/{}/", request.db));

        let fetched = self
            .get(&url, &params.to_pairs(), self.config.token_header()?)
            .instrument(info_span!("query", db = %request.db))
            .await?;

        let output = match request.format {
            OutputFormat::Json => QueryOutput::Json(fetched.json()?),
            OutputFormat::Table => {
                let envelope: ResponseEnvelope = fetched.json()?;
                let mut table = ResultTable::from_envelope(envelope);
                if request.time_index {
                    if let Err(warning) = table.set_time_index() {
                        warn!("{}", warning);
                    }
                }
                QueryOutput::Table(table)
            }
        };

        if request.debug {
            info!(url = %fetched.url, params = ?params, "query");
            info!(
                "Returns {} bytes in {:.2} seconds",
                fetched.body.len(),
                started.elapsed().as_secs_f64()
            );
            info!("\n{}", output);
        }

        Ok(output)
    }

    async fn get(
        &self,
        url: &str,
        pairs: &[(String, String)],
        authorization: Option<HeaderValue>,
    ) -> Result<Fetched, ClientError> {
        let mut builder = self.http.get(url).query(pairs);
        if let Some(authorization) = authorization {
            builder = builder.header(AUTHORIZATION, authorization);
        }
        self.execute(builder).await
    }

    async fn execute(&self, builder: reqwest::RequestBuilder) -> Result<Fetched, ClientError> {
        let request = builder.build()?;
        let url = request.url().to_string();
        debug!(method = %request.method(), url = %url, "sending request");

        let response = self.http.execute(request).await?;
        let status = response.status();

        if response.error_for_status_ref().is_err() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Transport { status, url, body });
        }

        let body = response.bytes().await?;
        debug!(status = %status, bytes = body.len(), "received response");
        Ok(Fetched { url, body })
    }
}
