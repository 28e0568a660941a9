//! Year-level orchestration: index building, key-union iteration, counters.
//!
//! Each year's indices are built from already-fetched data and discarded
//! after the year is reconciled; arrival order of the raw documents never
//! matters because everything is aggregated into key-sorted indices first.
//! Progress counters are plain return values.

use std::collections::{BTreeMap, BTreeSet};

use tracing::info;

use plenario_core::model::{AssembledRecord, VoteEvent, VoteEventDetail, YearData};
use plenario_core::vote_id::resolve_equivalent;

use crate::assemble::{EventBundle, assemble_event};
use crate::ideology::{self, IdeologyTable};
use crate::themes::ProposalIndex;

/// Counters for one reconciled year.
#[derive(Debug, Clone, Default)]
pub struct YearSummary {
    pub year: i32,
    /// Distinct raw vote-event keys walked.
    pub events_seen: usize,
    /// Events that produced records (≥1 ballot).
    pub admissible_events: usize,
    /// Events skipped for having no ballots.
    pub skipped_no_ballots: usize,
    /// Admissible events whose basic metadata was missing (stubbed).
    pub stub_events: usize,
    /// Records emitted.
    pub records: usize,
}

/// The reconciled output of a full run.
#[derive(Debug, Default)]
pub struct RunOutput {
    pub records: Vec<AssembledRecord>,
    pub summaries: Vec<YearSummary>,
}

impl RunOutput {
    pub fn total_records(&self) -> usize {
        self.records.len()
    }
}

/// Reconcile one year of raw data into per-ballot records.
pub fn reconcile_year(data: &YearData) -> (Vec<AssembledRecord>, YearSummary) {
    // First-inserted-wins: when two raw ids collide (or a file repeats an
    // id), the earliest record is authoritative.
    let mut events_index: BTreeMap<String, &VoteEvent> = BTreeMap::new();
    for event in &data.events {
        if !event.id.is_empty() {
            events_index.entry(event.id.clone()).or_insert(event);
        }
    }
    let mut details_index: BTreeMap<String, &VoteEventDetail> = BTreeMap::new();
    for detail in &data.details {
        if !detail.id.is_empty() {
            details_index.entry(detail.id.clone()).or_insert(detail);
        }
    }
    let proposals = ProposalIndex::build(&data.proposals);

    // Key union: every ballots key (map order), then listed event ids not
    // already covered (listing order). Exact-key dedup only — raw ids
    // differing by suffix are distinct vote-event instances.
    let mut seen: BTreeSet<&str> = BTreeSet::new();
    let mut keys: Vec<&str> = Vec::new();
    for key in data.ballots.keys() {
        if seen.insert(key) {
            keys.push(key);
        }
    }
    for event in &data.events {
        let id = event.id.as_str();
        if !id.is_empty() && seen.insert(id) {
            keys.push(id);
        }
    }

    let mut summary = YearSummary {
        year: data.year,
        ..Default::default()
    };
    let mut records = Vec::new();

    for raw_id in keys {
        summary.events_seen += 1;

        // Ballots drive admissibility and are consumed under their own raw
        // key (every ballots key is walked), so this lookup is exact; the
        // metadata joins below fall back to the base id.
        let ballots = data.ballots.get(raw_id).map(Vec::as_slice).unwrap_or(&[]);
        if ballots.is_empty() {
            summary.skipped_no_ballots += 1;
            continue;
        }

        let event = resolve_equivalent(&events_index, raw_id).copied();
        if event.is_none() {
            summary.stub_events += 1;
        }
        let detail = resolve_equivalent(&details_index, raw_id).copied();
        let directives = resolve_equivalent(&data.directives, raw_id)
            .map(Vec::as_slice)
            .unwrap_or(&[]);

        let bundle = EventBundle {
            raw_id,
            event,
            detail,
            ballots,
            directives,
        };
        let mut event_records = assemble_event(&bundle, &proposals);
        summary.admissible_events += 1;
        summary.records += event_records.len();
        records.append(&mut event_records);
    }

    info!(
        year = data.year,
        events = summary.events_seen,
        admissible = summary.admissible_events,
        records = summary.records,
        stubs = summary.stub_events,
        "reconciled year"
    );

    (records, summary)
}

/// Reconcile every year, annotate ideology, and sort the final table.
///
/// A failure to enrich never aborts the run; the only failure the caller
/// needs to surface is an entirely empty result.
pub fn reconcile_years<I>(years: I, ideology_table: Option<&IdeologyTable>) -> RunOutput
where
    I: IntoIterator<Item = YearData>,
{
    let mut output = RunOutput::default();

    for data in years {
        let (mut records, summary) = reconcile_year(&data);
        output.records.append(&mut records);
        output.summaries.push(summary);
    }

    ideology::annotate(&mut output.records, ideology_table);

    // ISO 8601 date strings sort lexicographically; the sort is stable, so
    // ballot order within an event is preserved.
    output
        .records
        .sort_by(|a, b| {
            let left = (a.data.as_deref().unwrap_or(""), a.id_votacao.as_str());
            let right = (b.data.as_deref().unwrap_or(""), b.id_votacao.as_str());
            left.cmp(&right)
        });

    output
}
