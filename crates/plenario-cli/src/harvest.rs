//! Harvest: pull one archive's worth of raw data from the open-data API.
//!
//! Per year: list the vote events month by month, then fetch each event's
//! detail/ballots/directives with a bounded worker pool, then fetch theme and
//! summary data for every proposição the details reference. Results are
//! aggregated into key-based maps, so fetch completion order is irrelevant.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use futures::stream::{self, StreamExt};
use serde_json::Value;
use tracing::{info, warn};

use plenario_core::model::{
    Ballot, DataEnvelope, Directive, ProposalRecord, VoteEventDetail, id_string,
};
use plenario_reconcile::crossref;
use plenario_store::Archive;
use plenario_sync::OpenDataClient;
use plenario_sync::http::DEFAULT_BASE_URL;

#[derive(Args)]
pub struct HarvestArgs {
    /// First year to harvest (inclusive)
    #[arg(long, default_value_t = 2018)]
    pub start: i32,
    /// Last year to harvest (inclusive)
    #[arg(long, default_value_t = 2022)]
    pub end: i32,
    /// Archive directory to write
    #[arg(long, default_value = "dados_coletados")]
    pub out_dir: PathBuf,
    /// Concurrent per-id fetches
    #[arg(long, default_value_t = 4)]
    pub workers: usize,
    /// Base URL of the open-data API
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,
}

pub async fn run(args: HarvestArgs) -> anyhow::Result<()> {
    let archive = Archive::create(&args.out_dir).context("creating archive directory")?;
    let client = OpenDataClient::new(args.base_url.clone());
    let workers = args.workers.max(1);

    for year in args.start..=args.end {
        if let Err(err) = harvest_year(&client, &archive, year, workers).await {
            warn!(year, %err, "year failed, continuing with the next");
        }
    }

    Ok(())
}

/// Everything fetched for one vote-event id.
struct EventPayload {
    id: String,
    detail: Option<VoteEventDetail>,
    ballots: Vec<Ballot>,
    directives: Vec<Directive>,
}

async fn harvest_year(
    client: &OpenDataClient,
    archive: &Archive,
    year: i32,
    workers: usize,
) -> anyhow::Result<()> {
    let events = client
        .vote_events(year)
        .await
        .with_context(|| format!("listing vote events of {year}"))?;
    if events.is_empty() {
        info!(year, "no vote events listed, skipping year");
        return Ok(());
    }
    archive.write_events(year, &events)?;

    // Unique ids in listing order.
    let mut ids: Vec<String> = Vec::new();
    for event in &events {
        if !event.id.is_empty() && !ids.contains(&event.id) {
            ids.push(event.id.clone());
        }
    }
    info!(year, ids = ids.len(), workers, "fetching per-event detail data");

    let payloads: Vec<EventPayload> = stream::iter(ids)
        .map(|id| async move {
            let detail = fetch_or_warn(client.vote_event_detail(&id).await, "detail", &id);
            let ballots = fetch_or_warn(client.ballots(&id).await, "ballots", &id);
            let directives = fetch_or_warn(client.directives(&id).await, "directives", &id);
            EventPayload {
                id,
                detail,
                ballots: ballots.unwrap_or_default(),
                directives: directives.unwrap_or_default(),
            }
        })
        .buffer_unordered(workers)
        .collect()
        .await;

    let mut details: Vec<VoteEventDetail> = Vec::new();
    let mut ballots: BTreeMap<String, DataEnvelope<Ballot>> = BTreeMap::new();
    let mut directives: BTreeMap<String, DataEnvelope<Directive>> = BTreeMap::new();
    for payload in payloads {
        if let Some(detail) = payload.detail {
            details.push(detail);
        }
        // Empty endpoint responses are not archived; absence of the key is
        // the absent signal downstream.
        if !payload.ballots.is_empty() {
            ballots.insert(payload.id.clone(), DataEnvelope { dados: payload.ballots });
        }
        if !payload.directives.is_empty() {
            directives.insert(payload.id, DataEnvelope { dados: payload.directives });
        }
    }
    details.sort_by(|a, b| a.id.cmp(&b.id));

    archive.write_details(year, &details)?;
    archive.write_ballots(year, &ballots)?;
    archive.write_directives(year, &directives)?;

    let proposals = harvest_proposals(client, &details, workers).await;
    archive.write_proposals(year, &proposals)?;

    info!(
        year,
        events = events.len(),
        details = details.len(),
        ballots = ballots.len(),
        directives = directives.len(),
        proposals = proposals.len(),
        "year harvested"
    );
    Ok(())
}

/// Fetch themes and summary metadata for every proposição the details
/// reference.
async fn harvest_proposals(
    client: &OpenDataClient,
    details: &[VoteEventDetail],
    workers: usize,
) -> Vec<ProposalRecord> {
    let mut ids: Vec<String> = Vec::new();
    for detail in details {
        for id in crossref::related_proposals(detail) {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
    }
    info!(proposals = ids.len(), "fetching proposição themes");

    let mut records: Vec<ProposalRecord> = stream::iter(ids)
        .map(|id| async move {
            let temas = fetch_or_warn(client.proposal_themes(&id).await, "themes", &id);
            let info = fetch_or_warn(client.proposal_info(&id).await, "proposição", &id);
            if temas.is_none() && info.is_none() {
                return None;
            }
            Some(ProposalRecord {
                id: Value::String(id),
                temas: temas.unwrap_or_default(),
                informacoes: info.unwrap_or_default(),
            })
        })
        .buffer_unordered(workers)
        .filter_map(|record| async move { record })
        .collect()
        .await;

    records.sort_by_key(|record| {
        id_string(&record.id)
            .and_then(|id| id.parse::<u64>().ok())
            .unwrap_or(u64::MAX)
    });
    records
}

/// Collapse a fetch result: errors degrade to absent with a warning — one
/// failed resource never aborts the year.
fn fetch_or_warn<T>(
    result: Result<Option<T>, plenario_sync::SyncError>,
    what: &str,
    id: &str,
) -> Option<T> {
    match result {
        Ok(value) => value,
        Err(err) => {
            warn!(id, %err, "failed to fetch {what}, degrading to absent");
            None
        }
    }
}
