//! Party directive resolution with bloc fallback.
//!
//! A vote event carries directives issued by party leaderships (kind `"P"`)
//! and by bloc leaderships (kind `"B"`). Bloc labels are concatenations of
//! member-party acronyms with no delimiter (`"PsdbPsdPrPrb..."`), so bloc
//! membership can only be tested by substring containment — a party acronym
//! that happens to occur inside an unrelated concatenation will false-positive.
//! That ambiguity is inherent to the upstream data.

use plenario_core::model::Directive;

/// Resolve the directive applicable to `party` for one vote event.
///
/// An exact party-level match (kind `"P"`, case-insensitive label equality)
/// wins immediately and stops the scan. Otherwise the first bloc (kind `"B"`)
/// whose label contains the party acronym is kept as a fallback. Directives
/// without a value never direct and are skipped.
pub fn resolve_directive<'a>(party: &str, directives: &'a [Directive]) -> Option<&'a str> {
    let party = party.trim().to_uppercase();
    if party.is_empty() {
        return None;
    }

    let mut bloc_fallback: Option<&str> = None;

    for directive in directives {
        let Some(value) = directive.orientacao_voto.as_deref() else {
            continue;
        };
        let Some(label) = directive.sigla_partido_bloco.as_deref() else {
            continue;
        };
        let label = label.trim().to_uppercase();

        match directive.cod_tipo_lideranca.as_deref() {
            Some("P") if label == party => return Some(value),
            Some("B") if bloc_fallback.is_none() && label.contains(&party) => {
                bloc_fallback = Some(value);
            }
            _ => {}
        }
    }

    bloc_fallback
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directive(label: &str, kind: &str, value: Option<&str>) -> Directive {
        Directive {
            orientacao_voto: value.map(String::from),
            cod_tipo_lideranca: Some(kind.to_string()),
            sigla_partido_bloco: Some(label.to_string()),
        }
    }

    #[test]
    fn exact_party_match_short_circuits_bloc() {
        let directives = vec![
            directive("PT", "P", Some("Sim")),
            directive("PTPSOL", "B", Some("Não")),
        ];
        assert_eq!(resolve_directive("PT", &directives), Some("Sim"));
    }

    #[test]
    fn bloc_substring_fallback() {
        let directives = vec![directive("PTPSOL", "B", Some("Não"))];
        assert_eq!(resolve_directive("PSOL", &directives), Some("Não"));
    }

    #[test]
    fn later_party_match_overrides_earlier_bloc() {
        let directives = vec![
            directive("PTPSOL", "B", Some("Não")),
            directive("PSOL", "P", Some("Obstrução")),
        ];
        assert_eq!(resolve_directive("PSOL", &directives), Some("Obstrução"));
    }

    #[test]
    fn first_bloc_wins_among_blocs() {
        let directives = vec![
            directive("PTPSOL", "B", Some("Não")),
            directive("PsolPcdob", "B", Some("Sim")),
        ];
        assert_eq!(resolve_directive("PSOL", &directives), Some("Não"));
    }

    #[test]
    fn match_is_case_insensitive() {
        let directives = vec![directive("Novo", "P", Some("Sim"))];
        assert_eq!(resolve_directive("NOVO", &directives), Some("Sim"));

        let directives = vec![directive("PsdbPsdPrPrb", "B", Some("Não"))];
        assert_eq!(resolve_directive("psd", &directives), Some("Não"));
    }

    #[test]
    fn no_match_is_none() {
        let directives = vec![
            directive("PT", "P", Some("Sim")),
            directive("PTPSOL", "B", Some("Não")),
        ];
        assert_eq!(resolve_directive("NOVO", &directives), None);
    }

    #[test]
    fn valueless_directives_are_skipped() {
        let directives = vec![
            directive("PT", "P", None),
            directive("PTPSOL", "B", Some("Não")),
        ];
        assert_eq!(resolve_directive("PT", &directives), Some("Não"));
    }

    #[test]
    fn other_leadership_kinds_are_ignored() {
        // Government / minority leaderships ("G", "M") target no party.
        let directives = vec![
            directive("Governo", "G", Some("Sim")),
            directive("GOVERNO", "P", Some("Não")),
        ];
        assert_eq!(resolve_directive("Governo", &directives), Some("Não"));
    }

    #[test]
    fn empty_party_is_none() {
        let directives = vec![directive("PT", "P", Some("Sim"))];
        assert_eq!(resolve_directive("", &directives), None);
        assert_eq!(resolve_directive("   ", &directives), None);
    }

    #[test]
    fn empty_directive_list_is_none() {
        assert_eq!(resolve_directive("PT", &[]), None);
    }
}
