//! Cross-reference extraction: which proposições does a vote event touch?
//!
//! Detail records reference related proposições through five fields of three
//! different shapes — object lists carrying an inline id or a URI, bare
//! string entries, and an id-keyed map. Extraction scans the fields in a
//! fixed priority order and keeps the first appearance of each id.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use plenario_core::model::{VoteEventDetail, id_string};

/// Final run of digits before an optional trailing slash at end of URI.
static URI_ID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"/(\d+)/?$").unwrap());

/// Extract a proposição id from an API URI.
///
/// `".../api/v2/proposicoes/2270857"` → `"2270857"`. URIs without a trailing
/// numeric path segment carry no id and yield `None`.
pub fn id_from_uri(uri: &str) -> Option<String> {
    URI_ID.captures(uri).map(|caps| caps[1].to_string())
}

/// Collect the related proposição ids of a detail record.
///
/// Scan order: `proposicoesAfetadas`, `objetosPossiveis`,
/// `proposicoesRelacionadas`, the keys of the inline `temasProposicoes` map,
/// and finally the `ultimaApresentacaoProposicao` citation URI. Each id is
/// kept once, in first-seen order; references without a parseable id are
/// skipped silently.
pub fn related_proposals(detail: &VoteEventDetail) -> Vec<String> {
    let mut ids = Vec::new();

    for reference in &detail.proposicoes_afetadas {
        push_ref(&mut ids, reference.id.as_ref(), reference.uri.as_deref());
    }
    for reference in &detail.objetos_possiveis {
        push_ref(&mut ids, reference.id.as_ref(), reference.uri.as_deref());
    }
    for entry in &detail.proposicoes_relacionadas {
        push_entry(&mut ids, entry);
    }
    for key in detail.temas_proposicoes.keys() {
        // The harvester stores "{id}_info" metadata entries alongside the
        // per-id theme lists; only all-digit keys are proposição ids.
        if is_digits(key) {
            push_id(&mut ids, key.clone());
        }
    }
    if let Some(citation) = &detail.ultima_apresentacao_proposicao
        && let Some(uri) = citation.uri_proposicao_citada.as_deref()
        && let Some(id) = id_from_uri(uri)
    {
        push_id(&mut ids, id);
    }

    ids
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

fn push_id(ids: &mut Vec<String>, id: String) {
    if !ids.contains(&id) {
        ids.push(id);
    }
}

/// Dual id/URI extraction for object references: inline id wins, URI is the
/// fallback.
fn push_ref(ids: &mut Vec<String>, id: Option<&Value>, uri: Option<&str>) {
    if let Some(id) = id.and_then(id_string) {
        push_id(ids, id);
    } else if let Some(id) = uri.and_then(id_from_uri) {
        push_id(ids, id);
    }
}

/// `proposicoesRelacionadas` entries come in every shape the API has ever
/// produced: bare id strings, bare URIs, numbers, and `{id, uri}` objects.
fn push_entry(ids: &mut Vec<String>, entry: &Value) {
    match entry {
        Value::String(s) if is_digits(s) => push_id(ids, s.clone()),
        Value::String(s) => {
            if let Some(id) = id_from_uri(s) {
                push_id(ids, id);
            }
        }
        Value::Number(n) => push_id(ids, n.to_string()),
        Value::Object(map) => push_ref(
            ids,
            map.get("id"),
            map.get("uri").and_then(Value::as_str),
        ),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn uri_with_trailing_id() {
        assert_eq!(
            id_from_uri("https://dadosabertos.camara.leg.br/api/v2/proposicoes/2270857"),
            Some("2270857".to_string())
        );
    }

    #[test]
    fn uri_with_trailing_slash() {
        assert_eq!(
            id_from_uri("https://dadosabertos.camara.leg.br/api/v2/proposicoes/2270857/"),
            Some("2270857".to_string())
        );
    }

    #[test]
    fn uri_without_numeric_segment_yields_none() {
        assert_eq!(id_from_uri("https://example.org/proposicoes/abc"), None);
        assert_eq!(id_from_uri("https://example.org/2270857/temas"), None);
        assert_eq!(id_from_uri(""), None);
    }

    fn detail(value: serde_json::Value) -> VoteEventDetail {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn priority_order_across_sources() {
        let detail = detail(json!({
            "id": "2265603",
            "proposicoesAfetadas": [{"id": 111}],
            "objetosPossiveis": [{"uri": "https://x/proposicoes/222"}],
            "proposicoesRelacionadas": ["333"],
            "temasProposicoes": {"444": []},
            "ultimaApresentacaoProposicao": {
                "uriProposicaoCitada": "https://x/proposicoes/555"
            }
        }));
        assert_eq!(
            related_proposals(&detail),
            vec!["111", "222", "333", "444", "555"]
        );
    }

    #[test]
    fn dedup_keeps_first_appearance() {
        let detail = detail(json!({
            "id": "1",
            "proposicoesAfetadas": [{"id": "222"}, {"id": "111"}],
            "objetosPossiveis": [{"id": 111}, {"uri": "https://x/proposicoes/222/"}],
            "ultimaApresentacaoProposicao": {
                "uriProposicaoCitada": "https://x/proposicoes/111"
            }
        }));
        assert_eq!(related_proposals(&detail), vec!["222", "111"]);
    }

    #[test]
    fn inline_id_wins_over_uri() {
        let detail = detail(json!({
            "id": "1",
            "proposicoesAfetadas": [{"id": 111, "uri": "https://x/proposicoes/999"}]
        }));
        assert_eq!(related_proposals(&detail), vec!["111"]);
    }

    #[test]
    fn metadata_keys_are_not_ids() {
        let detail = detail(json!({
            "id": "1",
            "temasProposicoes": {"2270857": [], "2270857_info": {"siglaTipo": "PL"}}
        }));
        assert_eq!(related_proposals(&detail), vec!["2270857"]);
    }

    #[test]
    fn related_entries_in_every_shape() {
        let detail = detail(json!({
            "id": "1",
            "proposicoesRelacionadas": [
                "111",
                "https://x/proposicoes/222",
                333,
                {"id": "444"},
                {"uri": "https://x/proposicoes/555"},
                null,
                "not-an-id"
            ]
        }));
        assert_eq!(
            related_proposals(&detail),
            vec!["111", "222", "333", "444", "555"]
        );
    }

    #[test]
    fn malformed_references_are_skipped() {
        let detail = detail(json!({
            "id": "1",
            "proposicoesAfetadas": [{"uri": "https://x/proposicoes/abc"}, {}],
            "ultimaApresentacaoProposicao": {"uriProposicaoCitada": "https://x/nada"}
        }));
        assert!(related_proposals(&detail).is_empty());
    }

    #[test]
    fn empty_detail_yields_empty() {
        let detail = detail(json!({"id": "1"}));
        assert!(related_proposals(&detail).is_empty());
    }
}
