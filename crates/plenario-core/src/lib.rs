pub mod model;
pub mod schema;
pub mod vote_id;

pub use model::{
    AssembledRecord, Ballot, DataEnvelope, Directive, Fidelity, Legislator, ProposalRecord,
    VoteEvent, VoteEventDetail, YearData,
};
pub use schema::consolidated;
pub use vote_id::{normalize, resolve_equivalent};
