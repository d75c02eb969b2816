//! Defines the core data models and database queries for transactions.

use rusqlite::{
    Connection, Row, ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::{Date, macros::format_description};

use crate::{Error, auth::UserID, database_id::TransactionId, transaction::icon::icon_for_category};

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

/// Parse a `YYYY-MM-DD` date.
///
/// Anything after a 'T' is ignored so that clients may send a full ISO 8601
/// date-time such as "2025-01-31T00:00:00.000Z".
///
/// # Errors
/// Returns [Error::InvalidInput] if `raw_date` is not a valid calendar date.
pub fn parse_date(raw_date: &str) -> Result<Date, Error> {
    let trimmed = raw_date.trim();
    let date_part = trimmed.split_once('T').map_or(trimmed, |(date, _)| date);

    Date::parse(date_part, format_description!("[year]-[month]-[day]")).map_err(|_| {
        Error::InvalidInput(format!(
            "\"{raw_date}\" is not a valid date, expected YYYY-MM-DD"
        ))
    })
}

// ============================================================================
// MODELS
// ============================================================================

/// Whether money was earned or spent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money earned, counted as positive.
    Income,
    /// Money spent, counted as negative.
    Expense,
}

impl TransactionKind {
    /// The sign applied to a stored amount: `1.0` for income and `-1.0` for expenses.
    pub fn sign(self) -> f64 {
        match self {
            Self::Income => 1.0,
            Self::Expense => -1.0,
        }
    }

    /// The lowercase name used in JSON and the database.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }

    /// Parse a kind, ignoring case and surrounding whitespace.
    pub fn parse(raw_kind: &str) -> Option<Self> {
        match raw_kind.trim().to_lowercase().as_str() {
            "income" => Some(Self::Income),
            "expense" => Some(Self::Expense),
            _ => None,
        }
    }
}

impl ToSql for TransactionKind {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TransactionKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let text = value.as_str()?;
        Self::parse(text).ok_or_else(|| FromSqlError::Other(format!("invalid kind {text}").into()))
    }
}

/// An expense or income, i.e. an event where money was either spent or earned.
///
/// `amount` is always positive; [Transaction::signed_amount] applies the sign
/// implied by `kind`. In JSON the amount is written signed, so expenses appear
/// as negative numbers.
///
/// To create a new `Transaction`, use [Transaction::build].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "TransactionJson", from = "TransactionJson")]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The user that recorded the transaction.
    pub owner: UserID,
    /// Whether the transaction is income or an expense.
    pub kind: TransactionKind,
    /// A free-text label such as "Food & Dining".
    pub category: String,
    /// The unsigned amount of money.
    pub amount: f64,
    /// A text description of what the transaction was for.
    pub description: String,
    /// When the transaction happened.
    pub date: Date,
    /// A glyph shown next to the transaction.
    pub icon: String,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [TransactionBuilder] for discoverability.
    pub fn build(
        kind: TransactionKind,
        amount: f64,
        date: Date,
        category: &str,
        description: &str,
    ) -> TransactionBuilder {
        TransactionBuilder {
            kind,
            amount: amount.abs(),
            date,
            category: category.to_owned(),
            description: description.to_owned(),
            icon: None,
        }
    }

    /// The amount with income positive and expenses negative.
    pub fn signed_amount(&self) -> f64 {
        self.kind.sign() * self.amount
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TransactionJson {
    id: TransactionId,
    user_id: UserID,
    #[serde(rename = "type")]
    kind: TransactionKind,
    category: String,
    amount: f64,
    description: String,
    #[serde(with = "iso_date")]
    date: Date,
    icon: String,
}

impl From<Transaction> for TransactionJson {
    fn from(transaction: Transaction) -> Self {
        Self {
            amount: transaction.signed_amount(),
            id: transaction.id,
            user_id: transaction.owner,
            kind: transaction.kind,
            category: transaction.category,
            description: transaction.description,
            date: transaction.date,
            icon: transaction.icon,
        }
    }
}

impl From<TransactionJson> for Transaction {
    fn from(json: TransactionJson) -> Self {
        Self {
            id: json.id,
            owner: json.user_id,
            kind: json.kind,
            category: json.category,
            amount: json.amount.abs(),
            description: json.description,
            date: json.date,
            icon: json.icon,
        }
    }
}

/// A builder for creating [Transaction] instances.
///
/// The icon is derived from the category unless one is set with
/// [TransactionBuilder::icon].
#[derive(Debug, PartialEq, Clone)]
pub struct TransactionBuilder {
    /// Whether the transaction is income or an expense.
    pub kind: TransactionKind,
    /// The unsigned monetary amount of the transaction.
    pub amount: f64,
    /// When the transaction happened.
    pub date: Date,
    /// A free-text label such as "Food & Dining".
    pub category: String,
    /// What the transaction was for.
    pub description: String,
    /// A glyph shown next to the transaction.
    pub icon: Option<String>,
}

impl TransactionBuilder {
    /// Set the icon for the transaction.
    pub fn icon(mut self, icon: Option<String>) -> Self {
        self.icon = icon;
        self
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

const SELECT_TRANSACTION_COLUMNS: &str =
    "SELECT id, owner_id, kind, category, amount, description, date, icon FROM \"transaction\"";

/// Create a new transaction for `owner` in the database from a builder.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidInput] if the amount is zero or not a finite number,
/// - [Error::NotFound] if `owner` does not refer to a registered user,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_transaction(
    owner: UserID,
    builder: TransactionBuilder,
    connection: &Connection,
) -> Result<Transaction, Error> {
    if builder.amount == 0.0 || !builder.amount.is_finite() {
        return Err(Error::InvalidInput("Amount cannot be zero".to_owned()));
    }

    let icon = builder
        .icon
        .unwrap_or_else(|| icon_for_category(&builder.category).to_owned());

    let transaction = connection
        .prepare(
            "INSERT INTO \"transaction\" (owner_id, kind, category, amount, description, date, icon)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             RETURNING id, owner_id, kind, category, amount, description, date, icon",
        )?
        .query_row(
            (
                owner.as_i64(),
                builder.kind,
                &builder.category,
                builder.amount,
                &builder.description,
                builder.date,
                icon,
            ),
            map_transaction_row,
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
                },
                _,
            ) => Error::NotFound,
            error => error.into(),
        })?;

    Ok(transaction)
}

/// Retrieve the transaction `id` belonging to `owner`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a transaction of `owner`,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_transaction(
    owner: UserID,
    id: TransactionId,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(&format!(
            "{SELECT_TRANSACTION_COLUMNS} WHERE id = :id AND owner_id = :owner_id"
        ))?
        .query_one(
            &[(":id", &id), (":owner_id", &owner.as_i64())],
            map_transaction_row,
        )?;

    Ok(transaction)
}

/// Get all of `owner`'s transactions, newest first.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
pub fn get_transactions(owner: UserID, connection: &Connection) -> Result<Vec<Transaction>, Error> {
    // Sort by date, and then ID to keep transaction order stable after updates
    connection
        .prepare(&format!(
            "{SELECT_TRANSACTION_COLUMNS} WHERE owner_id = ?1 ORDER BY date DESC, id ASC"
        ))?
        .query_map([owner.as_i64()], map_transaction_row)?
        .map(|transaction_result| transaction_result.map_err(Error::SqlError))
        .collect()
}

/// Get `owner`'s transactions of one kind, newest first.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
pub fn get_transactions_by_kind(
    owner: UserID,
    kind: TransactionKind,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(&format!(
            "{SELECT_TRANSACTION_COLUMNS} WHERE owner_id = ?1 AND kind = ?2
             ORDER BY date DESC, id ASC"
        ))?
        .query_map((owner.as_i64(), kind), map_transaction_row)?
        .map(|transaction_result| transaction_result.map_err(Error::SqlError))
        .collect()
}

/// Overwrite the stored fields of `transaction`.
///
/// The row is matched on both `id` and `owner`, so a transaction can never be
/// moved to another user.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidInput] if the amount is zero or not a finite number,
/// - [Error::UpdateMissingTransaction] if the transaction does not exist for its owner,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_transaction(transaction: &Transaction, connection: &Connection) -> Result<(), Error> {
    if transaction.amount == 0.0 || !transaction.amount.is_finite() {
        return Err(Error::InvalidInput("Amount cannot be zero".to_owned()));
    }

    let rows_affected = connection.execute(
        "UPDATE \"transaction\"
         SET kind = ?1, category = ?2, amount = ?3, description = ?4, date = ?5, icon = ?6
         WHERE id = ?7 AND owner_id = ?8",
        (
            transaction.kind,
            &transaction.category,
            transaction.amount,
            &transaction.description,
            transaction.date,
            &transaction.icon,
            transaction.id,
            transaction.owner.as_i64(),
        ),
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingTransaction);
    }

    Ok(())
}

/// Delete the transaction `id` belonging to `owner`.
///
/// # Errors
/// This function will return a:
/// - [Error::DeleteMissingTransaction] if `id` does not refer to a transaction of `owner`,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn delete_transaction(
    owner: UserID,
    id: TransactionId,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM \"transaction\" WHERE id = ?1 AND owner_id = ?2",
        (id, owner.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingTransaction);
    }

    Ok(())
}

/// Delete every transaction of `owner` whose category is exactly `category`.
///
/// Returns the number of deleted transactions, which may be zero.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is some SQL error.
pub fn delete_transactions_by_category(
    owner: UserID,
    category: &str,
    connection: &Connection,
) -> Result<usize, Error> {
    connection
        .execute(
            "DELETE FROM \"transaction\" WHERE owner_id = ?1 AND category = ?2",
            (owner.as_i64(), category),
        )
        .map_err(|error| error.into())
}

/// Get the total number of transactions in the database.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
#[cfg(test)]
pub fn count_transactions(connection: &Connection) -> Result<u32, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM \"transaction\";", [], |row| {
            row.get(0)
        })
        .map_err(|error| error.into())
}

/// Create the transaction table in the database.
///
/// Requires the user table, since deleting a user deletes their transactions.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                owner_id INTEGER NOT NULL,
                kind TEXT NOT NULL CHECK (kind IN ('income', 'expense')),
                category TEXT NOT NULL,
                amount REAL NOT NULL CHECK (amount > 0),
                description TEXT NOT NULL,
                date TEXT NOT NULL,
                icon TEXT NOT NULL,
                FOREIGN KEY(owner_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    // Every query is scoped to one owner and most sort by date.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_owner_date ON \"transaction\"(owner_id, date);",
        (),
    )?;

    Ok(())
}

/// Map a database row to a Transaction.
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let id = row.get(0)?;
    let owner = UserID::new(row.get(1)?);
    let kind = row.get(2)?;
    let category = row.get(3)?;
    let amount = row.get(4)?;
    let description = row.get(5)?;
    let date = row.get(6)?;
    let icon = row.get(7)?;

    Ok(Transaction {
        id,
        owner,
        kind,
        category,
        amount,
        description,
        date,
        icon,
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod model_tests {
    use serde_json::json;
    use time::macros::date;

    use crate::{
        Error, UserID,
        transaction::{Transaction, TransactionKind, core::parse_date},
    };

    #[test]
    fn build_stores_absolute_amount() {
        let builder = Transaction::build(
            TransactionKind::Expense,
            -45.5,
            date!(2025 - 01 - 15),
            "Food & Dining",
            "Lunch",
        );

        assert_eq!(builder.amount, 45.5);
    }

    #[test]
    fn signed_amount_is_negative_for_expenses() {
        let mut transaction = Transaction {
            id: 1,
            owner: UserID::new(1),
            kind: TransactionKind::Expense,
            category: "Rent".to_owned(),
            amount: 100.0,
            description: "March rent".to_owned(),
            date: date!(2025 - 03 - 01),
            icon: "🏠".to_owned(),
        };

        assert_eq!(transaction.signed_amount(), -100.0);

        transaction.kind = TransactionKind::Income;
        assert_eq!(transaction.signed_amount(), 100.0);
    }

    #[test]
    fn serializes_with_signed_amount_and_iso_date() {
        let transaction = Transaction {
            id: 3,
            owner: UserID::new(2),
            kind: TransactionKind::Expense,
            category: "Rent".to_owned(),
            amount: 100.0,
            description: "March rent".to_owned(),
            date: date!(2025 - 03 - 01),
            icon: "🏠".to_owned(),
        };

        let got = serde_json::to_value(&transaction).unwrap();

        assert_eq!(
            got,
            json!({
                "id": 3,
                "userId": 2,
                "type": "expense",
                "category": "Rent",
                "amount": -100.0,
                "description": "March rent",
                "date": "2025-03-01",
                "icon": "🏠",
            })
        );
        let round_trip: Transaction = serde_json::from_value(got).unwrap();
        assert_eq!(round_trip, transaction);
    }

    #[test]
    fn kind_parse_ignores_case() {
        assert_eq!(TransactionKind::parse(" Income "), Some(TransactionKind::Income));
        assert_eq!(TransactionKind::parse("EXPENSE"), Some(TransactionKind::Expense));
        assert_eq!(TransactionKind::parse("transfer"), None);
    }

    #[test]
    fn parse_date_accepts_date_time_suffix() {
        assert_eq!(parse_date("2025-01-31").unwrap(), date!(2025 - 01 - 31));
        assert_eq!(
            parse_date("2025-01-31T23:59:59.000Z").unwrap(),
            date!(2025 - 01 - 31)
        );
    }

    #[test]
    fn parse_date_rejects_malformed_dates() {
        assert!(matches!(parse_date("31/01/2025"), Err(Error::InvalidInput(_))));
        assert!(matches!(parse_date("2025-02-30"), Err(Error::InvalidInput(_))));
        assert!(matches!(parse_date(""), Err(Error::InvalidInput(_))));
    }
}
