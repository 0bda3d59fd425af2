//! Designated rows the ledger rules depend on.
//!
//! The catch-all category and the income budget type are configured by
//! title and resolved to ids once at startup, so request handling never
//! looks them up by literal.

use pocketbook_shared::LedgerConfig;
use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter};
use tracing::{info, warn};

use crate::entities::{budget_types, categories};

/// Errors resolving sentinel rows.
#[derive(Debug, thiserror::Error)]
pub enum SentinelError {
    /// The configured income budget type does not exist.
    #[error("Income budget type '{0}' does not exist")]
    IncomeTypeMissing(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Resolved sentinel ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerSentinels {
    /// Category receiving the expenses of deleted categories. `None`
    /// disables category deletion.
    pub catch_all_category_id: Option<i32>,
    /// Budget type netted out of monthly totals.
    pub income_budget_type_id: i32,
}

impl LedgerSentinels {
    /// Looks up the configured sentinel rows.
    ///
    /// # Errors
    ///
    /// Fails if the income budget type is missing or the query fails.
    pub async fn resolve(
        db: &DatabaseConnection,
        config: &LedgerConfig,
    ) -> Result<Self, SentinelError> {
        let income = budget_types::Entity::find()
            .filter(budget_types::Column::Title.eq(&config.income_budget_type))
            .one(db)
            .await?
            .ok_or_else(|| SentinelError::IncomeTypeMissing(config.income_budget_type.clone()))?;

        let catch_all = categories::Entity::find()
            .filter(categories::Column::Title.eq(&config.catch_all_category))
            .one(db)
            .await?;

        if catch_all.is_none() {
            warn!(
                title = %config.catch_all_category,
                "Catch-all category missing, category deletion is disabled"
            );
        }

        let sentinels = Self {
            catch_all_category_id: catch_all.map(|c| c.id),
            income_budget_type_id: income.id,
        };
        info!(
            catch_all_category_id = ?sentinels.catch_all_category_id,
            income_budget_type_id = sentinels.income_budget_type_id,
            "Ledger sentinels resolved"
        );
        Ok(sentinels)
    }
}
