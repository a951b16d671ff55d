pub mod badge;
pub mod contest;
pub mod contest_entry;
pub mod contest_race;
pub mod points_transaction;
pub mod profile;
pub mod race;
pub mod race_entry;
pub mod race_result;
pub mod user_badge;
pub mod vote;
pub mod vote_pick;
