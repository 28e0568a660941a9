//! Ballot-vs-directive fidelity classification.

use plenario_core::model::Fidelity;

/// Directive value meaning the party released its members to vote freely.
const RELEASED: &str = "Liberada";

/// Classify a ballot against its party's resolved directive.
///
/// Absent either value, or a `"Liberada"` directive, there is nothing to
/// follow or deviate from. Otherwise the comparison is exact over the fixed
/// vote vocabulary, after trimming whitespace.
pub fn evaluate(ballot_value: Option<&str>, directive_value: Option<&str>) -> Fidelity {
    let (Some(vote), Some(directive)) = (ballot_value, directive_value) else {
        return Fidelity::NotApplicable;
    };
    let directive = directive.trim();
    if directive == RELEASED {
        return Fidelity::NotApplicable;
    }
    if vote.trim() == directive {
        Fidelity::Followed
    } else {
        Fidelity::Deviated
    }
}
