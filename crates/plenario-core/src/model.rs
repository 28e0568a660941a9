//! Payload models for the five raw datasets and the consolidated record.
//!
//! Raw documents are treated as opaque beyond the fields named here; unknown
//! fields are ignored on deserialisation and every named field is optional
//! except the identifiers, because the API omits fields freely.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One recorded vote occurrence from the `/votacoes` year listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VoteEvent {
    pub id: String,
    pub data: Option<String>,
    pub data_hora_registro: Option<String>,
    pub sigla_orgao: Option<String>,
    pub descricao: Option<String>,
    pub aprovacao: Option<i64>,
    pub proposicao_objeto: Option<String>,
}

/// Extended metadata from `/votacoes/{id}`, plus the two fields the harvester
/// attaches after cross-reference collection (`proposicoesRelacionadas` and
/// the inline `temasProposicoes` map).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VoteEventDetail {
    pub id: String,
    pub id_orgao: Option<i64>,
    pub id_evento: Option<i64>,
    pub desc_ultima_abertura_votacao: Option<String>,
    pub data_hora_ultima_abertura_votacao: Option<String>,
    pub ultima_apresentacao_proposicao: Option<ProposalCitation>,
    pub proposicoes_afetadas: Vec<ProposalRef>,
    pub objetos_possiveis: Vec<ProposalRef>,
    /// Entries may be bare id strings, bare URIs, or `{id, uri}` objects.
    pub proposicoes_relacionadas: Vec<Value>,
    /// Keyed by proposição id; the harvester also stores `"{id}_info"`
    /// metadata entries under the same map.
    pub temas_proposicoes: BTreeMap<String, Value>,
}

/// A proposição reference inside a detail record (`proposicoesAfetadas`,
/// `objetosPossiveis`). The id may be a JSON number or string.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProposalRef {
    pub id: Option<Value>,
    pub uri: Option<String>,
}

/// The "last presented proposição" citation inside a detail record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProposalCitation {
    pub uri_proposicao_citada: Option<String>,
}

/// One proposição from the theme dataset (`proposicaoTema_{year}.json`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProposalRecord {
    /// String or number in the wild; canonicalise with [`id_string`].
    pub id: Value,
    pub temas: Vec<ThemeTag>,
    pub informacoes: ProposalInfo,
}

/// One thematic tag on a proposição.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeTag {
    pub tema: Option<String>,
}

/// Summary metadata for a proposição.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProposalInfo {
    pub sigla_tipo: Option<String>,
    pub numero: Option<i64>,
    pub ano: Option<i64>,
    pub situacao: Option<String>,
    pub ementa: Option<String>,
}

/// One legislator's vote from `/votacoes/{id}/votos`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Ballot {
    pub tipo_voto: Option<String>,
    pub data_registro_voto: Option<String>,
    #[serde(rename = "deputado_")]
    pub deputado: Legislator,
}

/// The legislator block nested inside a ballot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Legislator {
    pub id: Option<i64>,
    pub nome: Option<String>,
    pub sigla_partido: Option<String>,
    pub sigla_uf: Option<String>,
}

/// A party or bloc voting directive from `/votacoes/{id}/orientacoes`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Directive {
    pub orientacao_voto: Option<String>,
    /// `"P"` = party-specific, `"B"` = bloc.
    pub cod_tipo_lideranca: Option<String>,
    pub sigla_partido_bloco: Option<String>,
}

/// The `{"dados": [...]}` envelope wrapping per-id detail payloads.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DataEnvelope<T> {
    pub dados: Vec<T>,
}

/// Canonicalise a JSON id value (string or number) into its string form.
///
/// Anything else — null, objects, fractional numbers rendered verbatim — is
/// not an id and yields `None`.
pub fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// One year's raw datasets, already fetched and deserialised.
///
/// Ballot and directive maps are `BTreeMap` so every scan over them is
/// deterministic regardless of arrival order.
#[derive(Debug, Default)]
pub struct YearData {
    pub year: i32,
    pub events: Vec<VoteEvent>,
    pub details: Vec<VoteEventDetail>,
    pub proposals: Vec<ProposalRecord>,
    pub ballots: BTreeMap<String, Vec<Ballot>>,
    pub directives: BTreeMap<String, Vec<Directive>>,
}

impl YearData {
    /// True when every category is empty — the year carries nothing to
    /// reconcile and is skipped.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
            && self.details.is_empty()
            && self.proposals.is_empty()
            && self.ballots.is_empty()
            && self.directives.is_empty()
    }
}

/// Agreement between a ballot and its party's resolved directive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Fidelity {
    /// Ballot matches the directive.
    Followed,
    /// Ballot contradicts the directive.
    Deviated,
    /// No directive, or the directive released the party.
    #[default]
    NotApplicable,
}

impl Fidelity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Followed => "seguiu",
            Self::Deviated => "desviou",
            Self::NotApplicable => "nao_aplicavel",
        }
    }
}

/// The final denormalised row: one per (vote event, ballot) pair.
#[derive(Debug, Clone, Default)]
pub struct AssembledRecord {
    pub id_votacao: String,
    pub data: Option<String>,
    pub sigla_orgao: Option<String>,
    pub descricao: Option<String>,
    pub aprovacao: Option<i64>,
    pub proposicao_id: Option<String>,
    pub proposicao_sigla_tipo: Option<String>,
    pub proposicao_numero: Option<i64>,
    pub proposicao_ano: Option<i64>,
    pub proposicao_situacao: Option<String>,
    pub proposicao_ementa: Option<String>,
    /// Deduped theme labels joined with `"; "`, extraction order.
    pub temas: Option<String>,
    pub quantidade_temas: i64,
    pub deputado_id: Option<i64>,
    pub deputado_nome: Option<String>,
    pub partido: Option<String>,
    pub uf: Option<String>,
    pub voto: Option<String>,
    pub data_voto: Option<String>,
    pub orientacao_partido: Option<String>,
    pub fidelidade: Fidelity,
    pub ideologia: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ballot_deserialises_nested_legislator() {
        let json = r#"{
            "dataRegistroVoto": "2020-04-17T19:32:12",
            "tipoVoto": "Sim",
            "deputado_": {
                "id": 204554,
                "nome": "Acácio Favacho",
                "siglaPartido": "PROS",
                "siglaUf": "AP"
            }
        }"#;
        let ballot: Ballot = serde_json::from_str(json).unwrap();
        assert_eq!(ballot.tipo_voto.as_deref(), Some("Sim"));
        assert_eq!(ballot.deputado.id, Some(204554));
        assert_eq!(ballot.deputado.sigla_partido.as_deref(), Some("PROS"));
    }

    #[test]
    fn directive_roundtrip() {
        let directive = Directive {
            orientacao_voto: Some("Não".into()),
            cod_tipo_lideranca: Some("P".into()),
            sigla_partido_bloco: Some("PT".into()),
        };
        let json = serde_json::to_string(&directive).unwrap();
        let parsed: Directive = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.orientacao_voto.as_deref(), Some("Não"));
        assert_eq!(parsed.cod_tipo_lideranca.as_deref(), Some("P"));
    }

    #[test]
    fn detail_tolerates_missing_crossref_fields() {
        let detail: VoteEventDetail = serde_json::from_str(r#"{"id": "2265603-43"}"#).unwrap();
        assert_eq!(detail.id, "2265603-43");
        assert!(detail.proposicoes_afetadas.is_empty());
        assert!(detail.temas_proposicoes.is_empty());
        assert!(detail.ultima_apresentacao_proposicao.is_none());
    }

    #[test]
    fn proposal_record_accepts_numeric_and_string_ids() {
        let numeric: ProposalRecord = serde_json::from_str(r#"{"id": 2270857}"#).unwrap();
        let string: ProposalRecord = serde_json::from_str(r#"{"id": "2270857"}"#).unwrap();
        assert_eq!(id_string(&numeric.id).as_deref(), Some("2270857"));
        assert_eq!(id_string(&string.id).as_deref(), Some("2270857"));
    }

    #[test]
    fn id_string_rejects_non_ids() {
        assert_eq!(id_string(&Value::Null), None);
        assert_eq!(id_string(&Value::String(String::new())), None);
        assert_eq!(id_string(&serde_json::json!({"id": 1})), None);
    }

    #[test]
    fn envelope_default_is_empty() {
        let env: DataEnvelope<Ballot> = serde_json::from_str("{}").unwrap();
        assert!(env.dados.is_empty());
    }

    #[test]
    fn fidelity_labels() {
        assert_eq!(Fidelity::Followed.as_str(), "seguiu");
        assert_eq!(Fidelity::Deviated.as_str(), "desviou");
        assert_eq!(Fidelity::NotApplicable.as_str(), "nao_aplicavel");
    }
}
