//! Theme and representative-proposição resolution for a vote event.

use std::collections::HashMap;

use plenario_core::model::{ProposalRecord, VoteEventDetail, id_string};

use crate::crossref;

/// Proposição theme records indexed by canonical id, built once per year.
///
/// Duplicate ids keep the first-inserted record.
pub struct ProposalIndex<'a> {
    by_id: HashMap<String, &'a ProposalRecord>,
}

impl<'a> ProposalIndex<'a> {
    pub fn build(records: &'a [ProposalRecord]) -> Self {
        let mut by_id = HashMap::new();
        for record in records {
            if let Some(id) = id_string(&record.id) {
                by_id.entry(id).or_insert(record);
            }
        }
        Self { by_id }
    }

    pub fn get(&self, id: &str) -> Option<&'a ProposalRecord> {
        self.by_id.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

/// Themes and representative proposição resolved for one vote event.
#[derive(Default)]
pub struct ResolvedThemes<'a> {
    /// Deduped labels in first-seen order across the priority-ordered
    /// cross-reference sources.
    pub labels: Vec<String>,
    /// First extracted id that matched the index. Its summary fields populate
    /// the final record; later matches contribute themes only.
    pub representative: Option<&'a ProposalRecord>,
}

/// Resolve themes for a detail record against the year's proposição index.
///
/// Extracted ids that miss the index degrade silently — a vote event with no
/// resolvable proposição simply carries no themes.
pub fn resolve<'a>(detail: &VoteEventDetail, index: &ProposalIndex<'a>) -> ResolvedThemes<'a> {
    let mut resolved = ResolvedThemes::default();

    for id in crossref::related_proposals(detail) {
        let Some(record) = index.get(&id) else {
            continue;
        };
        if resolved.representative.is_none() {
            resolved.representative = Some(record);
        }
        for tag in &record.temas {
            if let Some(label) = &tag.tema
                && !resolved.labels.iter().any(|seen| seen == label)
            {
                resolved.labels.push(label.clone());
            }
        }
    }

    resolved
}
