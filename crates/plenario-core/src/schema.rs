/// Arrow schema definitions for the consolidated voting table.
pub mod consolidated {
    use arrow::datatypes::{DataType, Field, Schema};

    /// Schema for the per-ballot consolidated table: one row per
    /// (vote event, legislator ballot) pair.
    ///
    /// Date columns stay `Utf8` — the API delivers ISO 8601 strings and the
    /// table is an export medium, not an analytical store.
    pub fn table_schema() -> Schema {
        Schema::new(vec![
            Field::new("id_votacao", DataType::Utf8, false),
            Field::new("data", DataType::Utf8, true),
            Field::new("sigla_orgao", DataType::Utf8, true),
            Field::new("descricao", DataType::Utf8, true),
            Field::new("aprovacao", DataType::Int64, true),
            Field::new("proposicao_id", DataType::Utf8, true),
            Field::new("proposicao_sigla_tipo", DataType::Utf8, true),
            Field::new("proposicao_numero", DataType::Int64, true),
            Field::new("proposicao_ano", DataType::Int64, true),
            Field::new("proposicao_situacao", DataType::Utf8, true),
            Field::new("proposicao_ementa", DataType::Utf8, true),
            Field::new("temas", DataType::Utf8, true),
            Field::new("quantidade_temas", DataType::Int64, false),
            Field::new("deputado_id", DataType::Int64, true),
            Field::new("deputado_nome", DataType::Utf8, true),
            Field::new("partido", DataType::Utf8, true),
            Field::new("uf", DataType::Utf8, true),
            Field::new("voto", DataType::Utf8, true),
            Field::new("data_voto", DataType::Utf8, true),
            Field::new("orientacao_partido", DataType::Utf8, true),
            Field::new("fidelidade", DataType::Utf8, false),
            Field::new("ideologia", DataType::Utf8, true),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::consolidated;

    #[test]
    fn table_schema_has_expected_fields() {
        let schema = consolidated::table_schema();
        assert_eq!(schema.fields().len(), 22);
        assert!(schema.field_with_name("id_votacao").is_ok());
        assert!(schema.field_with_name("fidelidade").is_ok());
        assert!(schema.field_with_name("ideologia").is_ok());
    }

    #[test]
    fn key_columns_are_non_nullable() {
        let schema = consolidated::table_schema();
        assert!(!schema.field_with_name("id_votacao").unwrap().is_nullable());
        assert!(!schema.field_with_name("fidelidade").unwrap().is_nullable());
        assert!(schema.field_with_name("orientacao_partido").unwrap().is_nullable());
    }
}
