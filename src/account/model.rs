use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::{constants::DEFAULT_SUB_CATEGORY, error::CustomError, event::model::Event};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssetCategory {
    Bank,
    Cash,
    Investment,
    RealEstate,
    Other,
}

impl AssetCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetCategory::Bank => "BANK",
            AssetCategory::Cash => "CASH",
            AssetCategory::Investment => "INVESTMENT",
            AssetCategory::RealEstate => "REAL_ESTATE",
            AssetCategory::Other => "OTHER",
        }
    }
}

impl FromStr for AssetCategory {
    type Err = CustomError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().replace([' ', '-'], "_").as_str() {
            "BANK" => Ok(AssetCategory::Bank),
            "CASH" => Ok(AssetCategory::Cash),
            "INVESTMENT" => Ok(AssetCategory::Investment),
            "REAL_ESTATE" => Ok(AssetCategory::RealEstate),
            "OTHER" => Ok(AssetCategory::Other),
            other => Err(CustomError::Validation(format!("unknown category '{other}'"))),
        }
    }
}

impl fmt::Display for AssetCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub id: String,
    pub label: String,
    pub category: AssetCategory,
    pub sub_category: String,
    pub currency: String,
    pub balance: Decimal,
}

/// One per user. Assets are listed in creation order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceRecord {
    pub user_id: String,
    pub manual_assets: Vec<Asset>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
pub struct AssetRow {
    pub id: String,
    pub user_id: String,
    pub label: String,
    pub category: String,
    pub sub_category: String,
    pub currency: String,
    pub balance: String,
    pub created_at: i64,
}

impl AssetRow {
    pub fn balance(&self) -> Result<Decimal, CustomError> {
        parse_decimal(&self.balance)
    }
}

impl TryFrom<AssetRow> for Asset {
    type Error = CustomError;

    fn try_from(row: AssetRow) -> Result<Self, Self::Error> {
        let balance = row.balance()?;
        let category = row
            .category
            .parse()
            .map_err(|_| CustomError::CorruptData(format!("asset category '{}'", row.category)))?;
        Ok(Asset {
            id: row.id,
            label: row.label,
            category,
            sub_category: row.sub_category,
            currency: row.currency,
            balance,
        })
    }
}

pub fn parse_decimal(raw: &str) -> Result<Decimal, CustomError> {
    Decimal::from_str(raw).map_err(|_| CustomError::CorruptData(format!("decimal '{raw}'")))
}

/// Canonical text form used for storage and for compare-and-set.
pub fn decimal_to_db(value: Decimal) -> String {
    value.normalize().to_string()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAsset {
    pub label: Option<String>,
    #[serde(default, deserialize_with = "decimal_input::deserialize_option_decimal")]
    pub balance: Option<Decimal>,
    pub currency: Option<String>,
    pub category: Option<String>,
    pub sub_category: Option<String>,
}

#[derive(Debug, PartialEq)]
pub struct NewAsset {
    pub label: String,
    pub balance: Decimal,
    pub currency: String,
    pub category: AssetCategory,
    pub sub_category: String,
}

impl CreateAsset {
    pub fn validate(self) -> Result<NewAsset, CustomError> {
        let label = self
            .label
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .ok_or_else(|| missing("label"))?;
        let balance = self.balance.ok_or_else(|| missing("balance"))?;
        let currency = validate_currency(self.currency.as_deref().ok_or_else(|| missing("currency"))?)?;
        let category = self
            .category
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| missing("category"))?
            .parse()?;
        let sub_category = self
            .sub_category
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_SUB_CATEGORY.to_string());

        Ok(NewAsset {
            label,
            balance,
            currency,
            category,
            sub_category,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditBalance {
    #[serde(alias = "assetId")]
    pub account_id: Option<String>,
    #[serde(default, deserialize_with = "decimal_input::deserialize_option_decimal")]
    pub new_balance: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditBalanceByLabel {
    pub label: Option<String>,
    #[serde(default, deserialize_with = "decimal_input::deserialize_option_decimal")]
    pub new_balance: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteAsset {
    #[serde(alias = "id", alias = "accountId")]
    pub asset_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplySalary {
    pub account_id: Option<String>,
    #[serde(default, deserialize_with = "decimal_input::deserialize_option_decimal")]
    pub amount: Option<Decimal>,
    #[serde(alias = "date")]
    pub month: Option<String>,
    #[serde(default)]
    pub is_historical: bool,
    pub currency: Option<String>,
}

/// Salary request after validation.
#[derive(Debug, PartialEq)]
pub enum SalaryEntry {
    Historical {
        amount: Decimal,
        month: String,
        currency: String,
    },
    Applied {
        account_id: String,
        amount: Decimal,
        month: Option<String>,
    },
}

impl ApplySalary {
    pub fn validate(self) -> Result<SalaryEntry, CustomError> {
        let amount = self.amount.ok_or_else(|| missing("amount"))?;
        if amount <= Decimal::ZERO {
            return Err(CustomError::Validation("amount must be positive".to_string()));
        }
        let month = self.month.map(|m| validate_month(&m)).transpose()?;

        if self.is_historical {
            let month = month.ok_or_else(|| missing("month"))?;
            let currency = match self.currency.as_deref() {
                Some(c) => validate_currency(c)?,
                None => crate::constants::DEFAULT_SALARY_CURRENCY.to_string(),
            };
            return Ok(SalaryEntry::Historical {
                amount,
                month,
                currency,
            });
        }

        let account_id = self
            .account_id
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| missing("accountId"))?;
        Ok(SalaryEntry::Applied {
            account_id,
            amount,
            month,
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceChange {
    pub message: String,
    pub changed: bool,
    pub previous_balance: Decimal,
    pub new_balance: Decimal,
    pub delta: Decimal,
    pub event: Option<Event>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Deleted {
    pub id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WipeSummary {
    pub events_deleted: u64,
    pub assets_deleted: u64,
}

fn missing(field: &str) -> CustomError {
    CustomError::Validation(format!("missing required field '{field}'"))
}

fn validate_currency(raw: &str) -> Result<String, CustomError> {
    let code = raw.trim().to_uppercase();
    if code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic()) {
        Ok(code)
    } else {
        Err(CustomError::Validation(format!("invalid currency '{raw}'")))
    }
}

fn validate_month(raw: &str) -> Result<String, CustomError> {
    let month = raw.trim();
    match NaiveDate::parse_from_str(&format!("{month}-01"), "%Y-%m-%d") {
        Ok(_) if month.len() == 7 => Ok(month.to_string()),
        _ => Err(CustomError::Validation(format!("month '{raw}' is not YYYY-MM"))),
    }
}

/// Money fields arrive either as JSON numbers or as the raw text of a form
/// input, so both are accepted.
mod decimal_input {
    use rust_decimal::Decimal;
    use serde::{Deserialize, Deserializer};
    use serde_json::Number;
    use std::str::FromStr;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum DecimalInput {
        Text(String),
        Number(Number),
    }

    fn parse(value: &str) -> Result<Decimal, String> {
        let trimmed = value.trim();
        Decimal::from_str(trimmed)
            .or_else(|_| Decimal::from_scientific(trimmed))
            .map_err(|e| format!("invalid decimal '{value}': {e}"))
    }

    pub fn deserialize_option_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<DecimalInput>::deserialize(deserializer)? {
            None => Ok(None),
            Some(DecimalInput::Text(s)) if s.trim().is_empty() => Ok(None),
            Some(DecimalInput::Text(s)) => parse(&s).map(Some).map_err(serde::de::Error::custom),
            Some(DecimalInput::Number(n)) => {
                parse(&n.to_string()).map(Some).map_err(serde::de::Error::custom)
            }
        }
    }
}
