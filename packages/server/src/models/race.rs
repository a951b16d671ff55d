use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Result of a settle-race invocation. Per-vote failures are reported here
/// rather than failing the whole run; the affected votes stay pending and
/// are retried on the next invocation.
#[derive(Serialize, utoipa::ToSchema)]
pub struct SettleResponse {
    pub race_id: i32,
    pub votes_settled: u64,
    pub points_distributed: i64,
    pub errors: Vec<VoteSettleFailure>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct VoteSettleFailure {
    pub vote_id: i32,
    pub message: String,
}

// ---------------------------------------------------------------------------
// Popularity backfill
// ---------------------------------------------------------------------------

#[derive(Deserialize, utoipa::ToSchema)]
pub struct PopularityItem {
    pub race_entry_id: i32,
    pub popularity: i32,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct BackfillPopularityRequest {
    pub items: Vec<PopularityItem>,
}

/// Partial-batch result: items that failed are listed, the rest succeeded.
#[derive(Serialize, utoipa::ToSchema)]
pub struct BackfillPopularityResponse {
    pub updated: usize,
    pub failed: Vec<BackfillFailure>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct BackfillFailure {
    pub race_entry_id: i32,
    pub message: String,
}

const MAX_BACKFILL_ITEMS: usize = 64;

pub fn validate_backfill(req: &BackfillPopularityRequest) -> Result<(), AppError> {
    if req.items.is_empty() {
        return Err(AppError::Validation("items must not be empty".into()));
    }
    if req.items.len() > MAX_BACKFILL_ITEMS {
        return Err(AppError::Validation(format!(
            "Too many items: max {MAX_BACKFILL_ITEMS}"
        )));
    }
    let mut seen = std::collections::HashSet::new();
    for item in &req.items {
        if !seen.insert(item.race_entry_id) {
            return Err(AppError::Validation(format!(
                "Duplicate race_entry_id {}",
                item.race_entry_id
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(race_entry_id: i32, popularity: i32) -> PopularityItem {
        PopularityItem {
            race_entry_id,
            popularity,
        }
    }

    #[test]
    fn accepts_a_valid_batch() {
        let req = BackfillPopularityRequest {
            items: vec![item(1, 3), item(2, 1)],
        };
        assert!(validate_backfill(&req).is_ok());
    }

    #[test]
    fn rejects_empty_and_oversized_batches() {
        assert!(validate_backfill(&BackfillPopularityRequest { items: vec![] }).is_err());

        let req = BackfillPopularityRequest {
            items: (0..=MAX_BACKFILL_ITEMS as i32).map(|i| item(i, 1)).collect(),
        };
        assert!(validate_backfill(&req).is_err());
    }

    #[test]
    fn rejects_duplicate_entries() {
        let req = BackfillPopularityRequest {
            items: vec![item(1, 3), item(1, 4)],
        };
        assert!(validate_backfill(&req).is_err());
    }
}
