pub mod badge;
pub mod ledger;
pub mod period;
pub mod rank;
pub mod scoring;
pub mod status;
pub mod streak;

pub use ledger::TransactionReason;
pub use status::{ContestStatus, ContestType, PickType, RaceStatus, VoteStatus};
