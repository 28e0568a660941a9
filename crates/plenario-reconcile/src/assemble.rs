//! Record assembly: one denormalised row per ballot of an admissible event.

use plenario_core::model::{AssembledRecord, Ballot, Directive, VoteEvent, VoteEventDetail};

use crate::directives::resolve_directive;
use crate::fidelity;
use crate::themes::{self, ProposalIndex};

/// Organising body stamped onto synthesised stub events — the Chamber
/// plenary, where nearly every roll-call happens.
pub const STUB_ORGAO: &str = "PLEN";

/// Everything known about one raw vote-event key at assembly time.
pub struct EventBundle<'a> {
    /// The raw key being processed, suffix and all. This is the id the
    /// emitted records carry, so suffix-variant instances stay distinct.
    pub raw_id: &'a str,
    pub event: Option<&'a VoteEvent>,
    pub detail: Option<&'a VoteEventDetail>,
    pub ballots: &'a [Ballot],
    pub directives: &'a [Directive],
}

/// Assemble the records for one vote event.
///
/// An event is admissible only when it has at least one ballot; directives
/// alone admit nothing. Missing basic metadata degrades to a stub (id only,
/// null date, plenary organising body) — ballot data is never dropped just
/// because the listing lost the event.
pub fn assemble_event(
    bundle: &EventBundle<'_>,
    proposals: &ProposalIndex<'_>,
) -> Vec<AssembledRecord> {
    if bundle.ballots.is_empty() {
        return Vec::new();
    }

    let resolved = bundle
        .detail
        .map(|detail| themes::resolve(detail, proposals))
        .unwrap_or_default();

    let temas = if resolved.labels.is_empty() {
        None
    } else {
        Some(resolved.labels.join("; "))
    };

    let mut records = Vec::with_capacity(bundle.ballots.len());
    for ballot in bundle.ballots {
        let directive = ballot
            .deputado
            .sigla_partido
            .as_deref()
            .and_then(|party| resolve_directive(party, bundle.directives));
        let fidelidade = fidelity::evaluate(ballot.tipo_voto.as_deref(), directive);

        let mut record = AssembledRecord {
            id_votacao: bundle.raw_id.to_string(),
            temas: temas.clone(),
            quantidade_temas: resolved.labels.len() as i64,
            deputado_id: ballot.deputado.id,
            deputado_nome: ballot.deputado.nome.clone(),
            partido: ballot.deputado.sigla_partido.clone(),
            uf: ballot.deputado.sigla_uf.clone(),
            voto: ballot.tipo_voto.clone(),
            data_voto: ballot.data_registro_voto.clone(),
            orientacao_partido: directive.map(String::from),
            fidelidade,
            ..Default::default()
        };

        match bundle.event {
            Some(event) => {
                record.data = event.data.clone();
                record.sigla_orgao = event.sigla_orgao.clone();
                record.descricao = event.descricao.clone();
                record.aprovacao = event.aprovacao;
            }
            None => {
                record.sigla_orgao = Some(STUB_ORGAO.to_string());
            }
        }

        if let Some(rep) = resolved.representative {
            record.proposicao_id = plenario_core::model::id_string(&rep.id);
            record.proposicao_sigla_tipo = rep.informacoes.sigla_tipo.clone();
            record.proposicao_numero = rep.informacoes.numero;
            record.proposicao_ano = rep.informacoes.ano;
            record.proposicao_situacao = rep.informacoes.situacao.clone();
            record.proposicao_ementa = rep.informacoes.ementa.clone();
        }

        records.push(record);
    }

    records
}
