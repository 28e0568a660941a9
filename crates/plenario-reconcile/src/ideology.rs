//! Party→ideology reference table.
//!
//! Built from an external reference CSV read into Arrow batches; joined onto
//! assembled records by trimmed, uppercased party acronym. The table is an
//! optional enrichment — when it is missing, every record gets the explicit
//! unknown marker and the pipeline continues.

use std::collections::HashMap;

use arrow::array::{Array, LargeStringArray, StringArray};
use arrow::record_batch::RecordBatch;

use plenario_core::model::AssembledRecord;

/// Marker for a party with no ideology mapping (or no reference table at all).
pub const UNKNOWN_IDEOLOGY: &str = "desconhecida";

/// Party acronym → ideology label, keyed by trimmed uppercase acronym.
pub struct IdeologyTable {
    by_party: HashMap<String, String>,
}

impl IdeologyTable {
    /// Build from reference batches. Expects `SIGLA` and `IDEOLOGIA` columns;
    /// duplicate acronyms keep the first row.
    pub fn from_reference_batches(batches: &[RecordBatch]) -> anyhow::Result<Self> {
        let mut by_party = HashMap::new();

        for batch in batches {
            let sigla = batch
                .column_by_name("SIGLA")
                .ok_or_else(|| anyhow::anyhow!("missing 'SIGLA' column"))?;
            let ideologia = batch
                .column_by_name("IDEOLOGIA")
                .ok_or_else(|| anyhow::anyhow!("missing 'IDEOLOGIA' column"))?;

            for row in 0..batch.num_rows() {
                if let Some(party) = get_string(sigla.as_ref(), row)
                    && let Some(label) = get_string(ideologia.as_ref(), row)
                {
                    by_party
                        .entry(party.trim().to_uppercase())
                        .or_insert(label);
                }
            }
        }

        Ok(Self { by_party })
    }

    pub fn lookup(&self, party: &str) -> Option<&str> {
        self.by_party
            .get(&party.trim().to_uppercase())
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_party.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_party.is_empty()
    }
}

/// Set every record's ideology field from the table, or to the unknown marker.
pub fn annotate(records: &mut [AssembledRecord], table: Option<&IdeologyTable>) {
    for record in records {
        let label = record
            .partido
            .as_deref()
            .and_then(|party| table.and_then(|t| t.lookup(party)))
            .unwrap_or(UNKNOWN_IDEOLOGY);
        record.ideologia = Some(label.to_string());
    }
}

/// Extract a string value from an Arrow array (handles Utf8 and LargeUtf8).
fn get_string(col: &dyn Array, row: usize) -> Option<String> {
    if col.is_null(row) {
        return None;
    }
    col.as_any()
        .downcast_ref::<StringArray>()
        .map(|arr| arr.value(row).to_string())
        .or_else(|| {
            col.as_any()
                .downcast_ref::<LargeStringArray>()
                .map(|arr| arr.value(row).to_string())
        })
}
