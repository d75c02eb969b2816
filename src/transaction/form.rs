//! The request body and shared state for the endpoints that create and edit transactions.

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use rusqlite::Connection;
use serde::Deserialize;
use time::Date;

use crate::{
    AppState, Error,
    timezone::get_local_today,
    transaction::{Transaction, TransactionBuilder, TransactionKind, core::parse_date},
};

const MISSING_FIELDS_MESSAGE: &str = "Please provide all required fields";
const ZERO_AMOUNT_MESSAGE: &str = "Amount cannot be zero";

/// The state needed by the transaction endpoints.
#[derive(Debug, Clone)]
pub struct TransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Africa/Nairobi".
    pub local_timezone: String,
}

impl FromRef<AppState> for TransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

impl TransactionState {
    /// The current date in the server's local timezone.
    pub fn local_today(&self) -> Result<Date, Error> {
        get_local_today(&self.local_timezone).ok_or_else(|| {
            tracing::error!("Invalid timezone {}", self.local_timezone);
            Error::InvalidTimezoneError(self.local_timezone.clone())
        })
    }
}

/// The JSON body for creating or editing a transaction.
///
/// Every field is optional so that edits can send only what changed; creating
/// a transaction requires `type`, `category`, `amount` and `description`.
/// `amount` may be signed, only its absolute value is stored.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct TransactionForm {
    /// Either "income" or "expense".
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// A free-text label such as "Food & Dining".
    pub category: Option<String>,
    /// The amount of money, its sign is ignored.
    pub amount: Option<f64>,
    /// What the transaction was for.
    pub description: Option<String>,
    /// The date the transaction happened, `YYYY-MM-DD`.
    pub date: Option<String>,
    /// The glyph to show, derived from the category if missing.
    pub icon: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

fn parse_kind(raw_kind: &str) -> Result<TransactionKind, Error> {
    TransactionKind::parse(raw_kind).ok_or_else(|| {
        Error::InvalidInput(format!(
            "\"{raw_kind}\" is not a transaction type, expected \"income\" or \"expense\""
        ))
    })
}

fn parse_amount(amount: f64) -> Result<f64, Error> {
    if amount == 0.0 || !amount.is_finite() {
        Err(Error::InvalidInput(ZERO_AMOUNT_MESSAGE.to_owned()))
    } else {
        Ok(amount.abs())
    }
}

impl TransactionForm {
    /// Validate the form for creating a new transaction.
    ///
    /// The date defaults to `today` when it is missing.
    ///
    /// # Errors
    /// Returns [Error::InvalidInput] if a required field is missing or blank,
    /// the type is not recognised, the amount is zero, or the date is malformed.
    pub fn into_builder(self, today: Date) -> Result<TransactionBuilder, Error> {
        let (Some(kind), Some(category), Some(amount), Some(description)) = (
            non_blank(self.kind),
            non_blank(self.category),
            self.amount,
            non_blank(self.description),
        ) else {
            return Err(Error::InvalidInput(MISSING_FIELDS_MESSAGE.to_owned()));
        };

        let kind = parse_kind(&kind)?;
        let amount = parse_amount(amount)?;
        let date = match non_blank(self.date) {
            Some(date) => parse_date(&date)?,
            None => today,
        };

        Ok(
            Transaction::build(kind, amount, date, &category, &description)
                .icon(non_blank(self.icon)),
        )
    }

    /// Overwrite the fields of `transaction` that are present in the form.
    ///
    /// Missing or blank fields keep their current value. `transaction` is
    /// left unchanged if any field is invalid.
    ///
    /// # Errors
    /// Returns [Error::InvalidInput] if the type is not recognised, the amount
    /// is zero, or the date is malformed.
    pub fn apply_to(self, transaction: &mut Transaction) -> Result<(), Error> {
        let kind = non_blank(self.kind).map(|kind| parse_kind(&kind)).transpose()?;
        let amount = self.amount.map(parse_amount).transpose()?;
        let date = non_blank(self.date).map(|date| parse_date(&date)).transpose()?;

        if let Some(kind) = kind {
            transaction.kind = kind;
        }

        if let Some(category) = non_blank(self.category) {
            transaction.category = category;
        }

        if let Some(amount) = amount {
            transaction.amount = amount;
        }

        if let Some(description) = non_blank(self.description) {
            transaction.description = description;
        }

        if let Some(date) = date {
            transaction.date = date;
        }

        if let Some(icon) = non_blank(self.icon) {
            transaction.icon = icon;
        }

        Ok(())
    }
}
