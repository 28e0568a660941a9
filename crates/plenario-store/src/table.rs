//! Consolidated table sink and reference-table reader.
//!
//! Assembled records become one Arrow `RecordBatch` in the
//! [`consolidated`] schema, written out as CSV (primary medium) or Parquet
//! (feature-gated). The party→ideology reference CSV comes back in through
//! Arrow's CSV reader with schema inference.

use std::fs::File;
use std::io::Seek;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{ArrayRef, Int64Array, StringArray};
use arrow::record_batch::RecordBatch;
use tracing::info;

use plenario_core::consolidated;
use plenario_core::model::AssembledRecord;

use crate::StoreError;

/// Build the consolidated batch from assembled records, in schema order.
pub fn records_to_batch(records: &[AssembledRecord]) -> Result<RecordBatch, StoreError> {
    let schema = Arc::new(consolidated::table_schema());

    let utf8 = |get: &dyn Fn(&AssembledRecord) -> Option<&str>| -> ArrayRef {
        Arc::new(StringArray::from(
            records.iter().map(get).collect::<Vec<_>>(),
        ))
    };
    let int64 = |get: &dyn Fn(&AssembledRecord) -> Option<i64>| -> ArrayRef {
        Arc::new(Int64Array::from(
            records.iter().map(get).collect::<Vec<_>>(),
        ))
    };

    let columns: Vec<ArrayRef> = vec![
        utf8(&|r| Some(r.id_votacao.as_str())),
        utf8(&|r| r.data.as_deref()),
        utf8(&|r| r.sigla_orgao.as_deref()),
        utf8(&|r| r.descricao.as_deref()),
        int64(&|r| r.aprovacao),
        utf8(&|r| r.proposicao_id.as_deref()),
        utf8(&|r| r.proposicao_sigla_tipo.as_deref()),
        int64(&|r| r.proposicao_numero),
        int64(&|r| r.proposicao_ano),
        utf8(&|r| r.proposicao_situacao.as_deref()),
        utf8(&|r| r.proposicao_ementa.as_deref()),
        utf8(&|r| r.temas.as_deref()),
        int64(&|r| Some(r.quantidade_temas)),
        int64(&|r| r.deputado_id),
        utf8(&|r| r.deputado_nome.as_deref()),
        utf8(&|r| r.partido.as_deref()),
        utf8(&|r| r.uf.as_deref()),
        utf8(&|r| r.voto.as_deref()),
        utf8(&|r| r.data_voto.as_deref()),
        utf8(&|r| r.orientacao_partido.as_deref()),
        utf8(&|r| Some(r.fidelidade.as_str())),
        utf8(&|r| r.ideologia.as_deref()),
    ];

    Ok(RecordBatch::try_new(schema, columns)?)
}

/// Write the consolidated table as CSV with a header row. Returns row count.
pub fn write_csv(records: &[AssembledRecord], path: &Path) -> Result<usize, StoreError> {
    let batch = records_to_batch(records)?;
    let file = File::create(path).map_err(|e| StoreError::io(path, e))?;
    let mut writer = arrow::csv::WriterBuilder::new()
        .with_header(true)
        .build(file);
    writer.write(&batch)?;
    info!(path = %path.display(), rows = batch.num_rows(), "wrote consolidated csv");
    Ok(batch.num_rows())
}

/// Write the consolidated table as Parquet. Returns row count.
#[cfg(feature = "parquet")]
pub fn write_parquet(records: &[AssembledRecord], path: &Path) -> Result<usize, StoreError> {
    let batch = records_to_batch(records)?;
    let file = File::create(path).map_err(|e| StoreError::io(path, e))?;
    let mut writer = parquet::arrow::ArrowWriter::try_new(file, batch.schema(), None)?;
    writer.write(&batch)?;
    writer.close()?;
    info!(path = %path.display(), rows = batch.num_rows(), "wrote consolidated parquet");
    Ok(batch.num_rows())
}

/// Read a reference CSV (header row required) into Arrow batches, inferring
/// the schema from the file itself.
pub fn read_reference_csv(path: &Path) -> Result<Vec<RecordBatch>, StoreError> {
    let mut file = match File::open(path) {
        Ok(file) => file,
        Err(_) => return Err(StoreError::ReferenceNotFound(path.to_path_buf())),
    };

    let format = arrow::csv::reader::Format::default().with_header(true);
    let (schema, _) = format.infer_schema(&mut file, None)?;
    file.rewind().map_err(|e| StoreError::io(path, e))?;

    let reader = arrow::csv::ReaderBuilder::new(Arc::new(schema))
        .with_format(format)
        .build(file)?;
    let batches = reader.collect::<Result<Vec<_>, _>>()?;
    Ok(batches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::Array;
    use plenario_core::model::Fidelity;

    fn sample_records() -> Vec<AssembledRecord> {
        vec![
            AssembledRecord {
                id_votacao: "100-1".to_string(),
                data: Some("2020-04-17".to_string()),
                sigla_orgao: Some("PLEN".to_string()),
                aprovacao: Some(1),
                proposicao_id: Some("500".to_string()),
                temas: Some("Saúde; Economia".to_string()),
                quantidade_temas: 2,
                deputado_id: Some(204554),
                deputado_nome: Some("Teste".to_string()),
                partido: Some("PT".to_string()),
                uf: Some("SP".to_string()),
                voto: Some("Sim".to_string()),
                orientacao_partido: Some("Sim".to_string()),
                fidelidade: Fidelity::Followed,
                ideologia: Some("esquerda".to_string()),
                ..Default::default()
            },
            AssembledRecord {
                id_votacao: "100-1".to_string(),
                voto: Some("Não".to_string()),
                fidelidade: Fidelity::NotApplicable,
                ..Default::default()
            },
        ]
    }

    #[test]
    fn batch_matches_schema() {
        let batch = records_to_batch(&sample_records()).unwrap();
        assert_eq!(batch.num_rows(), 2);
        assert_eq!(batch.num_columns(), 22);

        let fidelidade = batch
            .column_by_name("fidelidade")
            .unwrap()
            .as_any()
            .downcast_ref::<StringArray>()
            .unwrap();
        assert_eq!(fidelidade.value(0), "seguiu");
        assert_eq!(fidelidade.value(1), "nao_aplicavel");

        let orientacao = batch
            .column_by_name("orientacao_partido")
            .unwrap()
            .as_any()
            .downcast_ref::<StringArray>()
            .unwrap();
        assert!(orientacao.is_null(1));
    }

    #[test]
    fn empty_records_make_empty_batch() {
        let batch = records_to_batch(&[]).unwrap();
        assert_eq!(batch.num_rows(), 0);
        assert_eq!(batch.num_columns(), 22);
    }

    #[test]
    fn csv_write_and_read_back() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("consolidado.csv");

        let rows = write_csv(&sample_records(), &path).unwrap();
        assert_eq!(rows, 2);

        let batches = read_reference_csv(&path).unwrap();
        let total: usize = batches.iter().map(|b| b.num_rows()).sum();
        assert_eq!(total, 2);
        assert!(batches[0].schema().field_with_name("id_votacao").is_ok());
    }

    #[test]
    fn reference_csv_reads_party_table() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("partidos.csv");
        std::fs::write(&path, "SIGLA,IDEOLOGIA\nPT,esquerda\nNOVO,direita\n").unwrap();

        let batches = read_reference_csv(&path).unwrap();
        assert_eq!(batches.iter().map(|b| b.num_rows()).sum::<usize>(), 2);
        let sigla = batches[0]
            .column_by_name("SIGLA")
            .unwrap()
            .as_any()
            .downcast_ref::<StringArray>()
            .unwrap();
        assert_eq!(sigla.value(0), "PT");
    }

    #[test]
    fn missing_reference_is_a_typed_error() {
        let result = read_reference_csv(Path::new("/nonexistent/partidos.csv"));
        assert!(matches!(result, Err(StoreError::ReferenceNotFound(_))));
    }

    #[cfg(feature = "parquet")]
    #[test]
    fn parquet_write_roundtrip() {
        use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("consolidado.parquet");

        let rows = write_parquet(&sample_records(), &path).unwrap();
        assert_eq!(rows, 2);

        let file = File::open(&path).unwrap();
        let reader = ParquetRecordBatchReaderBuilder::try_new(file)
            .unwrap()
            .build()
            .unwrap();
        let total: usize = reader.map(|b| b.unwrap().num_rows()).sum();
        assert_eq!(total, 2);
    }
}
