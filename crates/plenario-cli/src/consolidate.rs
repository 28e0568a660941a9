//! Consolidate: reconcile a year archive into the per-ballot table.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use tracing::{info, warn};

use plenario_reconcile::pipeline::{RunOutput, reconcile_years};
use plenario_reconcile::IdeologyTable;
use plenario_store::{Archive, table};

#[derive(Args)]
pub struct ConsolidateArgs {
    /// Archive directory to read
    #[arg(long, default_value = "dados_coletados")]
    pub data_dir: PathBuf,
    /// First year to consolidate (inclusive)
    #[arg(long, default_value_t = 2018)]
    pub start: i32,
    /// Last year to consolidate (inclusive)
    #[arg(long, default_value_t = 2022)]
    pub end: i32,
    /// Party→ideology reference CSV (columns SIGLA, IDEOLOGIA)
    #[arg(long)]
    pub reference: Option<PathBuf>,
    /// Output CSV path
    #[arg(long, default_value = "dados_consolidados.csv")]
    pub out: PathBuf,
    /// Also write the table as Parquet
    #[arg(long)]
    pub parquet: Option<PathBuf>,
}

pub fn run(args: ConsolidateArgs) -> anyhow::Result<()> {
    let archive = Archive::open(&args.data_dir).context("opening archive")?;
    let ideology = load_ideology(args.reference.as_deref());

    let years = (args.start..=args.end).filter_map(|year| {
        let data = archive.load_year(year);
        if data.is_empty() {
            warn!(year, "nothing in the archive for this year, skipping");
            None
        } else {
            Some(data)
        }
    });
    let output = reconcile_years(years, ideology.as_ref());

    if output.total_records() == 0 {
        anyhow::bail!(
            "no admissible records for {}..={} — nothing to write",
            args.start,
            args.end
        );
    }

    table::write_csv(&output.records, &args.out).context("writing consolidated csv")?;
    if let Some(parquet_path) = &args.parquet {
        table::write_parquet(&output.records, parquet_path)
            .context("writing consolidated parquet")?;
    }

    print_summary(&output);
    println!("tabela consolidada: {}", args.out.display());
    Ok(())
}

/// The reference table is an optional enrichment: unavailable or unusable
/// leaves every record's ideology as the unknown marker.
fn load_ideology(path: Option<&Path>) -> Option<IdeologyTable> {
    let path = path?;
    let batches = match table::read_reference_csv(path) {
        Ok(batches) => batches,
        Err(err) => {
            warn!(path = %path.display(), %err, "reference table unavailable, ideology left unknown");
            return None;
        }
    };
    match IdeologyTable::from_reference_batches(&batches) {
        Ok(table) => {
            info!(parties = table.len(), "loaded ideology reference");
            Some(table)
        }
        Err(err) => {
            warn!(path = %path.display(), %err, "reference table unusable, ideology left unknown");
            None
        }
    }
}

fn print_summary(output: &RunOutput) {
    println!("ano   eventos  admissiveis  sem_votos  stubs  registros");
    for summary in &output.summaries {
        println!(
            "{:<5} {:>7} {:>12} {:>10} {:>6} {:>10}",
            summary.year,
            summary.events_seen,
            summary.admissible_events,
            summary.skipped_no_ballots,
            summary.stub_events,
            summary.records,
        );
    }
    println!("total de registros: {}", output.total_records());
}
