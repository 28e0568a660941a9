//! On-disk archive of harvested JSON: one file per dataset per year.
//!
//! Layout (the harvester writes it, the consolidation step reads it):
//!
//! ```text
//! <root>/dados_votacoes/votacoes_{year}.json        vote-event listing
//! <root>/dados_votacoes/votacoesID_{year}.json      vote-event details
//! <root>/dados_votacoes/proposicaoTema_{year}.json  proposição themes
//! <root>/dados_detalhes/votos/{year}.json           vote-id → {dados: [ballots]}
//! <root>/dados_detalhes/orientacoes/{year}.json     vote-id → {dados: [directives]}
//! ```
//!
//! A missing or unreadable file degrades that one category to empty with a
//! warning; an entirely empty year is the caller's signal to skip it.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{info, warn};

use plenario_core::model::{Ballot, DataEnvelope, Directive, YearData};

use crate::StoreError;

const VOTACOES_DIR: &str = "dados_votacoes";
const DETALHES_DIR: &str = "dados_detalhes";

/// A harvested-data archive rooted at a directory.
pub struct Archive {
    root: PathBuf,
}

impl Archive {
    /// Open an existing archive for reading.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        if !root.is_dir() {
            return Err(StoreError::DataDirNotFound(root));
        }
        Ok(Self { root })
    }

    /// Create the archive directory tree (idempotent), for harvesting.
    pub fn create(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        for dir in [
            root.join(VOTACOES_DIR),
            root.join(DETALHES_DIR).join("votos"),
            root.join(DETALHES_DIR).join("orientacoes"),
        ] {
            std::fs::create_dir_all(&dir).map_err(|e| StoreError::io(&dir, e))?;
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    // ── Per-year file paths ──

    pub fn events_path(&self, year: i32) -> PathBuf {
        self.root
            .join(VOTACOES_DIR)
            .join(format!("votacoes_{year}.json"))
    }

    pub fn details_path(&self, year: i32) -> PathBuf {
        self.root
            .join(VOTACOES_DIR)
            .join(format!("votacoesID_{year}.json"))
    }

    pub fn proposals_path(&self, year: i32) -> PathBuf {
        self.root
            .join(VOTACOES_DIR)
            .join(format!("proposicaoTema_{year}.json"))
    }

    pub fn ballots_path(&self, year: i32) -> PathBuf {
        self.root
            .join(DETALHES_DIR)
            .join("votos")
            .join(format!("{year}.json"))
    }

    pub fn directives_path(&self, year: i32) -> PathBuf {
        self.root
            .join(DETALHES_DIR)
            .join("orientacoes")
            .join(format!("{year}.json"))
    }

    // ── Reading ──

    /// Load every category of one year. Categories degrade independently.
    pub fn load_year(&self, year: i32) -> YearData {
        let mut data = YearData {
            year,
            events: self.load_category(&self.events_path(year)),
            details: self.load_category(&self.details_path(year)),
            proposals: self.load_category(&self.proposals_path(year)),
            ..Default::default()
        };
        data.ballots = unwrap_envelopes(self.load_category(&self.ballots_path(year)));
        data.directives = unwrap_envelopes(self.load_category(&self.directives_path(year)));

        info!(
            year,
            events = data.events.len(),
            details = data.details.len(),
            proposals = data.proposals.len(),
            ballots = data.ballots.len(),
            directives = data.directives.len(),
            "loaded year archive"
        );
        data
    }

    fn load_category<T: DeserializeOwned + Default>(&self, path: &Path) -> T {
        let file = match File::open(path) {
            Ok(file) => file,
            Err(err) => {
                warn!(path = %path.display(), %err, "archive file missing, category degraded");
                return T::default();
            }
        };
        match serde_json::from_reader(BufReader::new(file)) {
            Ok(value) => value,
            Err(err) => {
                warn!(path = %path.display(), %err, "archive file unreadable, category degraded");
                T::default()
            }
        }
    }

    // ── Writing (harvest side) ──

    pub fn write_events(
        &self,
        year: i32,
        events: &[plenario_core::model::VoteEvent],
    ) -> Result<(), StoreError> {
        self.write_json(&self.events_path(year), events)
    }

    pub fn write_details(
        &self,
        year: i32,
        details: &[plenario_core::model::VoteEventDetail],
    ) -> Result<(), StoreError> {
        self.write_json(&self.details_path(year), details)
    }

    pub fn write_proposals(
        &self,
        year: i32,
        proposals: &[plenario_core::model::ProposalRecord],
    ) -> Result<(), StoreError> {
        self.write_json(&self.proposals_path(year), proposals)
    }

    pub fn write_ballots(
        &self,
        year: i32,
        ballots: &BTreeMap<String, DataEnvelope<Ballot>>,
    ) -> Result<(), StoreError> {
        self.write_json(&self.ballots_path(year), ballots)
    }

    pub fn write_directives(
        &self,
        year: i32,
        directives: &BTreeMap<String, DataEnvelope<Directive>>,
    ) -> Result<(), StoreError> {
        self.write_json(&self.directives_path(year), directives)
    }

    fn write_json<T: Serialize + ?Sized>(&self, path: &Path, value: &T) -> Result<(), StoreError> {
        let file = File::create(path).map_err(|e| StoreError::io(path, e))?;
        serde_json::to_writer_pretty(BufWriter::new(file), value).map_err(|e| StoreError::Json {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

/// Strip the `{"dados": [...]}` envelopes, dropping entries whose list is
/// empty — an empty endpoint response carries no information.
fn unwrap_envelopes<T>(raw: BTreeMap<String, DataEnvelope<T>>) -> BTreeMap<String, Vec<T>> {
    raw.into_iter()
        .filter(|(_, envelope)| !envelope.dados.is_empty())
        .map(|(id, envelope)| (id, envelope.dados))
        .collect()
}
