//! First-admin reconciliation.
//!
//! Runs at startup and after every registration or login. The lowest-id
//! account becomes admin when nobody is, and adopts every movie that has no
//! owner yet. Once an admin exists this is a no-op.

use anyhow::Result;
use serde::Serialize;
use tracing::{debug, info};

use crate::db::Store;
use crate::domain::UserId;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileOutcome {
    /// Set when this pass promoted an account.
    pub promoted: Option<UserId>,
    pub movies_adopted: u64,
}

pub async fn reconcile_admin(store: &Store) -> Result<ReconcileOutcome> {
    let Some(promotion) = store.user_repo().promote_first_admin().await? else {
        debug!("Admin reconciliation: nothing to do");
        return Ok(ReconcileOutcome::default());
    };

    info!(
        user_id = %promotion.account_id,
        movies_adopted = promotion.movies_adopted,
        "Promoted first account to admin"
    );

    Ok(ReconcileOutcome {
        promoted: Some(promotion.account_id),
        movies_adopted: promotion.movies_adopted,
    })
}
