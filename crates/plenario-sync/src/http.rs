//! HTTP client for the Chamber of Deputies open-data API.
//!
//! The contract exposed to the reconciliation core is deliberately thin:
//! given an id (or a year), return the raw payload or `None` when the
//! resource does not exist. Pagination, retry, and backoff live entirely in
//! here. Year listings are fetched in month windows because year-wide
//! queries overload the API.

use std::time::Duration;

use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use plenario_core::model::{Ballot, Directive, ProposalInfo, ThemeTag, VoteEvent, VoteEventDetail};

/// Public base URL of the open-data API.
pub const DEFAULT_BASE_URL: &str = "https://dadosabertos.camara.leg.br/api/v2";

const ITEMS_PER_PAGE: u32 = 100;
const MAX_ATTEMPTS: u32 = 5;
const RETRY_WAIT: Duration = Duration::from_secs(10);
/// Pause between successive page fetches, to stay under the rate limit.
const PAGE_WAIT: Duration = Duration::from_millis(500);

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status}: {body}")]
    Server { status: u16, body: String },
    #[error("retries exhausted for {url}")]
    RetriesExhausted { url: String },
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// One page of a paginated listing: the `dados` array plus HATEOAS links.
#[derive(Debug, Deserialize)]
struct Page {
    #[serde(default)]
    dados: Vec<Value>,
    #[serde(default)]
    links: Vec<PageLink>,
}

#[derive(Debug, Deserialize)]
struct PageLink {
    #[serde(default)]
    rel: String,
    #[serde(default)]
    href: String,
}

/// The `{"dados": {...}}` envelope around single-object payloads.
#[derive(Debug, Deserialize)]
struct ObjectEnvelope<T> {
    dados: T,
}

/// Shape of `/proposicoes/{id}` — the status text sits one level down.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ProposicaoDados {
    sigla_tipo: Option<String>,
    numero: Option<i64>,
    ano: Option<i64>,
    ementa: Option<String>,
    status_proposicao: Option<StatusProposicao>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct StatusProposicao {
    descricao_situacao: Option<String>,
}

impl From<ProposicaoDados> for ProposalInfo {
    fn from(dados: ProposicaoDados) -> Self {
        ProposalInfo {
            sigla_tipo: dados.sigla_tipo,
            numero: dados.numero,
            ano: dados.ano,
            situacao: dados.status_proposicao.and_then(|s| s.descricao_situacao),
            ementa: dados.ementa,
        }
    }
}

/// HTTP client for the open-data API.
pub struct OpenDataClient {
    client: reqwest::Client,
    base_url: String,
}

impl Default for OpenDataClient {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL.to_string())
    }
}

impl OpenDataClient {
    /// Create a client for the given base URL (no trailing slash).
    pub fn new(base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// List every vote event of a year, month window by month window.
    ///
    /// Malformed listing entries are skipped with a warning rather than
    /// failing the whole year.
    pub async fn vote_events(&self, year: i32) -> Result<Vec<VoteEvent>, SyncError> {
        let mut events = Vec::new();

        for month in 1..=12 {
            let (start, end) = month_window(year, month);
            let url = format!(
                "{}/votacoes?dataInicio={start}&dataFim={end}&itens={ITEMS_PER_PAGE}&pagina=1",
                self.base_url
            );
            let Some(items) = self.fetch_all_pages(&url).await? else {
                continue;
            };
            info!(year, month, items = items.len(), "fetched vote-event window");
            for item in items {
                match serde_json::from_value::<VoteEvent>(item) {
                    Ok(event) if !event.id.is_empty() => events.push(event),
                    Ok(_) => {}
                    Err(err) => warn!(year, month, %err, "skipping malformed vote event"),
                }
            }
        }

        Ok(events)
    }

    /// Extended metadata for one vote event, or `None` when it no longer
    /// exists upstream.
    pub async fn vote_event_detail(
        &self,
        id: &str,
    ) -> Result<Option<VoteEventDetail>, SyncError> {
        let url = format!("{}/votacoes/{id}", self.base_url);
        match self.get_with_retry(&url).await? {
            Some(body) => {
                let envelope: ObjectEnvelope<VoteEventDetail> = serde_json::from_value(body)?;
                Ok(Some(envelope.dados))
            }
            None => Ok(None),
        }
    }

    /// All individual ballots of one vote event.
    pub async fn ballots(&self, id: &str) -> Result<Option<Vec<Ballot>>, SyncError> {
        let url = format!("{}/votacoes/{id}/votos", self.base_url);
        self.fetch_typed_pages(&url).await
    }

    /// All party/bloc directives of one vote event.
    pub async fn directives(&self, id: &str) -> Result<Option<Vec<Directive>>, SyncError> {
        let url = format!("{}/votacoes/{id}/orientacoes", self.base_url);
        self.fetch_typed_pages(&url).await
    }

    /// Thematic tags of one proposição.
    pub async fn proposal_themes(&self, id: &str) -> Result<Option<Vec<ThemeTag>>, SyncError> {
        let url = format!("{}/proposicoes/{id}/temas", self.base_url);
        self.fetch_typed_pages(&url).await
    }

    /// Summary metadata of one proposição.
    pub async fn proposal_info(&self, id: &str) -> Result<Option<ProposalInfo>, SyncError> {
        let url = format!("{}/proposicoes/{id}", self.base_url);
        match self.get_with_retry(&url).await? {
            Some(body) => {
                let envelope: ObjectEnvelope<ProposicaoDados> = serde_json::from_value(body)?;
                Ok(Some(envelope.dados.into()))
            }
            None => Ok(None),
        }
    }

    /// Fetch every page of a listing and deserialise the aggregated `dados`.
    async fn fetch_typed_pages<T>(&self, url: &str) -> Result<Option<Vec<T>>, SyncError>
    where
        T: serde::de::DeserializeOwned,
    {
        let Some(items) = self.fetch_all_pages(url).await? else {
            return Ok(None);
        };
        let mut typed = Vec::with_capacity(items.len());
        for item in items {
            typed.push(serde_json::from_value(item)?);
        }
        Ok(Some(typed))
    }

    /// Follow `rel=next` links, aggregating every page's `dados` array.
    ///
    /// `None` means the resource itself is absent (404), as opposed to an
    /// existing resource with an empty `dados`.
    async fn fetch_all_pages(&self, url: &str) -> Result<Option<Vec<Value>>, SyncError> {
        let Some(body) = self.get_with_retry(url).await? else {
            return Ok(None);
        };
        let mut page: Page = serde_json::from_value(body)?;
        let mut items = std::mem::take(&mut page.dados);

        while let Some(next) = next_href(&page.links).map(String::from) {
            tokio::time::sleep(PAGE_WAIT).await;
            let Some(body) = self.get_with_retry(&next).await? else {
                break;
            };
            page = serde_json::from_value(body)?;
            items.append(&mut page.dados);
        }

        Ok(Some(items))
    }

    /// GET with retry: 429 and 5xx back off and retry with a linearly growing
    /// wait; 404 is the routine absent signal; anything else is an error.
    async fn get_with_retry(&self, url: &str) -> Result<Option<Value>, SyncError> {
        for attempt in 1..=MAX_ATTEMPTS {
            let response = match self
                .client
                .get(url)
                .header("Accept", "application/json")
                .send()
                .await
            {
                Ok(response) => response,
                Err(err) => {
                    warn!(%url, attempt, %err, "connection error");
                    tokio::time::sleep(RETRY_WAIT).await;
                    continue;
                }
            };

            let status = response.status();
            if status.is_success() {
                return Ok(Some(response.json().await?));
            }
            match status.as_u16() {
                404 => return Ok(None),
                429 | 500 | 502 | 503 | 504 => {
                    warn!(%url, attempt, status = status.as_u16(), "server error, backing off");
                    tokio::time::sleep(RETRY_WAIT * attempt).await;
                }
                code => {
                    let body = response.text().await.unwrap_or_default();
                    return Err(SyncError::Server { status: code, body });
                }
            }
        }
        Err(SyncError::RetriesExhausted {
            url: url.to_string(),
        })
    }
}

fn next_href(links: &[PageLink]) -> Option<&str> {
    links
        .iter()
        .find(|link| link.rel == "next" && !link.href.is_empty())
        .map(|link| link.href.as_str())
}

/// First and last day of a month as ISO date strings.
fn month_window(year: i32, month: u32) -> (String, String) {
    let first = NaiveDate::from_ymd_opt(year, month, 1).unwrap_or_default();
    let next_month = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    let last = next_month
        .and_then(|d| d.pred_opt())
        .unwrap_or(first);
    (
        first.format("%Y-%m-%d").to_string(),
        last.format("%Y-%m-%d").to_string(),
    )
}
