use chrono::Utc;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use super::{
    model::{
        ApplySalary, Asset, AssetRow, BalanceChange, BalanceRecord, CreateAsset, DeleteAsset,
        Deleted, EditBalance, EditBalanceByLabel, SalaryEntry, WipeSummary, decimal_to_db,
    },
    repository::AccountRepository,
};
use crate::{
    auth::model::Session,
    constants::{HISTORICAL_ACCOUNT_ID, HISTORICAL_CATEGORY},
    error::CustomError,
    event::{
        model::{Event, EventMetadata, EventSource},
        repository::EventRepository,
    },
};

enum Mutation {
    Unchanged { balance: Decimal },
    Changed { previous: Decimal, event: Event },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalaryReceipt {
    pub message: String,
    pub historical: bool,
    pub new_balance: Option<Decimal>,
    pub event: Event,
}

/// The only code that changes asset balances or writes events.
pub struct AccountService {
    accounts: AccountRepository,
    events: EventRepository,
}

impl AccountService {
    pub fn new(accounts: AccountRepository, events: EventRepository) -> Self {
        AccountService { accounts, events }
    }

    pub async fn balance_record(&self, session: &Session) -> Result<BalanceRecord, CustomError> {
        let updated_at = self
            .accounts
            .record_updated_at(&session.user_id)
            .await?
            .ok_or_else(|| CustomError::NotFound("No balance record for user".to_string()))?;
        let manual_assets = self
            .accounts
            .list_assets(&session.user_id)
            .await?
            .into_iter()
            .map(Asset::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(BalanceRecord {
            user_id: session.user_id.clone(),
            manual_assets,
            updated_at: chrono::DateTime::from_timestamp_millis(updated_at)
                .ok_or_else(|| CustomError::CorruptData(format!("timestamp {updated_at}")))?,
        })
    }

    /// Initial funding is not recorded as an event.
    pub async fn create_asset(&self, session: &Session, input: CreateAsset) -> Result<Asset, CustomError> {
        let new_asset = input.validate()?;
        let now_ms = Utc::now().timestamp_millis();
        let row = AssetRow {
            id: Uuid::now_v7().to_string(),
            user_id: session.user_id.clone(),
            label: new_asset.label,
            category: new_asset.category.as_str().to_string(),
            sub_category: new_asset.sub_category,
            currency: new_asset.currency,
            balance: decimal_to_db(new_asset.balance),
            created_at: now_ms,
        };

        let mut tx = self.accounts.begin().await?;
        self.accounts.touch_record(&mut tx, &session.user_id, now_ms).await?;
        self.accounts.insert_asset(&mut tx, &row).await?;
        tx.commit().await?;

        info!(user_id = %session.user_id, asset_id = %row.id, "asset created");
        Asset::try_from(row)
    }

    pub async fn edit_balance(&self, session: &Session, input: EditBalance) -> Result<BalanceChange, CustomError> {
        let asset_id = input
            .account_id
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| CustomError::Validation("missing required field 'accountId'".to_string()))?;
        let new_balance = input
            .new_balance
            .ok_or_else(|| CustomError::Validation("missing required field 'newBalance'".to_string()))?;

        let mutation = self
            .mutate(session, &asset_id, |_| Some(new_balance), EventSource::Manual, None)
            .await?;

        Ok(match mutation {
            Mutation::Unchanged { balance } => BalanceChange {
                message: "No change in balance".to_string(),
                changed: false,
                previous_balance: balance,
                new_balance: balance,
                delta: Decimal::ZERO,
                event: None,
            },
            Mutation::Changed { previous, event } => BalanceChange {
                message: "Balance manually updated".to_string(),
                changed: true,
                previous_balance: previous,
                new_balance: event.balance_after,
                delta: event.delta,
                event: Some(event),
            },
        })
    }

    pub async fn edit_balance_by_label(
        &self,
        session: &Session,
        input: EditBalanceByLabel,
    ) -> Result<BalanceChange, CustomError> {
        let label = input
            .label
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .ok_or_else(|| CustomError::Validation("missing required field 'label'".to_string()))?;

        let mut ids = self
            .accounts
            .find_asset_ids_by_label(&session.user_id, &label)
            .await?;
        let asset_id = match ids.len() {
            0 => return Err(CustomError::NotFound("Asset not found".to_string())),
            1 => ids.remove(0),
            _ => {
                return Err(CustomError::Validation(format!(
                    "label '{label}' matches several assets, use the asset id"
                )));
            }
        };

        self.edit_balance(
            session,
            EditBalance {
                account_id: Some(asset_id),
                new_balance: input.new_balance,
            },
        )
        .await
    }

    pub async fn apply_salary(&self, session: &Session, input: ApplySalary) -> Result<SalaryReceipt, CustomError> {
        match input.validate()? {
            SalaryEntry::Historical {
                amount,
                month,
                currency,
            } => {
                let event = Event {
                    id: Uuid::now_v7().to_string(),
                    user_id: session.user_id.clone(),
                    account_id: HISTORICAL_ACCOUNT_ID.to_string(),
                    category: HISTORICAL_CATEGORY.to_string(),
                    subcategory: None,
                    source: EventSource::Salary,
                    delta: amount,
                    balance_after: Decimal::ZERO,
                    currency,
                    timestamp: Utc::now(),
                    metadata: Some(EventMetadata {
                        month: Some(month),
                        note: None,
                    }),
                };
                let mut tx = self.accounts.begin().await?;
                self.events.insert(&mut tx, &event).await?;
                tx.commit().await?;

                info!(user_id = %session.user_id, event_id = %event.id, "historical salary logged");
                Ok(SalaryReceipt {
                    message: "Historical salary recorded".to_string(),
                    historical: true,
                    new_balance: None,
                    event,
                })
            }
            SalaryEntry::Applied {
                account_id,
                amount,
                month,
            } => {
                let mutation = self
                    .mutate(
                        session,
                        &account_id,
                        |previous| previous.checked_add(amount),
                        EventSource::Salary,
                        month,
                    )
                    .await?;
                match mutation {
                    Mutation::Changed { event, .. } => Ok(SalaryReceipt {
                        message: "Salary processed successfully".to_string(),
                        historical: false,
                        new_balance: Some(event.balance_after),
                        event,
                    }),
                    Mutation::Unchanged { .. } => {
                        Err(CustomError::Validation("amount must be positive".to_string()))
                    }
                }
            }
        }
    }

    /// Prior events for the asset are left untouched.
    pub async fn delete_asset(&self, session: &Session, input: DeleteAsset) -> Result<Deleted, CustomError> {
        let asset_id = input
            .asset_id
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| CustomError::Validation("missing required field 'assetId'".to_string()))?;

        let mut tx = self.accounts.begin().await?;
        if self.accounts.delete_asset(&mut tx, &session.user_id, &asset_id).await? == 0 {
            tx.rollback().await?;
            return Err(CustomError::NotFound("Asset not found".to_string()));
        }
        self.accounts
            .touch_record(&mut tx, &session.user_id, Utc::now().timestamp_millis())
            .await?;
        tx.commit().await?;

        info!(user_id = %session.user_id, asset_id = %asset_id, "asset deleted");
        Ok(Deleted { id: asset_id })
    }

    /// Drops every event and asset the user owns; the login itself stays.
    pub async fn wipe(&self, session: &Session) -> Result<WipeSummary, CustomError> {
        let mut tx = self.accounts.begin().await?;
        let events_deleted = self.events.delete_all(&mut tx, &session.user_id).await?;
        let assets_deleted = self.accounts.delete_all_assets(&mut tx, &session.user_id).await?;
        self.accounts
            .touch_record(&mut tx, &session.user_id, Utc::now().timestamp_millis())
            .await?;
        tx.commit().await?;

        info!(user_id = %session.user_id, events_deleted, assets_deleted, "user data wiped");
        Ok(WipeSummary {
            events_deleted,
            assets_deleted,
        })
    }

    /// Read, compute, log and store in one transaction. The balance write is
    /// conditional on the value read, so a racing writer makes this fail
    /// with a conflict instead of being silently overwritten.
    async fn mutate<F>(
        &self,
        session: &Session,
        asset_id: &str,
        next_balance: F,
        source: EventSource,
        month: Option<String>,
    ) -> Result<Mutation, CustomError>
    where
        F: FnOnce(Decimal) -> Option<Decimal>,
    {
        let mut tx = self.accounts.begin().await?;
        let row = self
            .accounts
            .find_asset(&mut tx, &session.user_id, asset_id)
            .await?
            .ok_or_else(|| CustomError::NotFound("Asset not found".to_string()))?;
        let stored = row.balance.clone();
        let asset = Asset::try_from(row)?;

        let previous = asset.balance;
        let Some((new_balance, delta)) = next_balance(previous)
            .and_then(|next| next.checked_sub(previous).map(|delta| (next, delta)))
        else {
            tx.rollback().await?;
            return Err(CustomError::Validation("balance out of range".to_string()));
        };
        if delta.is_zero() {
            tx.rollback().await?;
            return Ok(Mutation::Unchanged { balance: previous });
        }

        let event = Event::for_asset(&session.user_id, &asset, source, delta, new_balance, month);
        self.events.insert(&mut tx, &event).await?;

        let updated = self
            .accounts
            .compare_and_set_balance(
                &mut tx,
                &session.user_id,
                &asset.id,
                &stored,
                &decimal_to_db(new_balance),
            )
            .await?;
        if updated == 0 {
            tx.rollback().await?;
            warn!(user_id = %session.user_id, asset_id = %asset.id, "concurrent balance update");
            return Err(CustomError::Conflict(
                "Balance changed concurrently, reload and retry".to_string(),
            ));
        }

        self.accounts
            .touch_record(&mut tx, &session.user_id, event.timestamp.timestamp_millis())
            .await?;
        tx.commit().await?;

        info!(
            user_id = %session.user_id,
            asset_id = %asset.id,
            source = %source,
            delta = %delta,
            "balance updated"
        );
        Ok(Mutation::Changed { previous, event })
    }
}
