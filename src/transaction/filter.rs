//! Selects and orders a user's transactions according to the filters sent by a client.

use std::cmp::Ordering;

use serde::Deserialize;
use time::{Date, Duration};

use crate::{
    Error,
    auth::UserID,
    transaction::{Transaction, core::parse_date},
};

/// The raw query parameters of the transaction list endpoint.
///
/// Every parameter is optional and kept as text so that unrecognised values
/// can fall back to their defaults instead of rejecting the request.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterParams {
    /// One of "all", "week", "month" or "custom".
    pub date_range: Option<String>,
    /// First day of a custom range, `YYYY-MM-DD`.
    pub start_date: Option<String>,
    /// Last day of a custom range, `YYYY-MM-DD`.
    pub end_date: Option<String>,
    /// Exact category label, or "all".
    pub category: Option<String>,
    /// Text to look for in the description or category.
    pub search_query: Option<String>,
    /// One of "date", "amount" or "category".
    pub sort_by: Option<String>,
    /// Either "asc" or "desc".
    pub sort_order: Option<String>,
}

/// Which dates a transaction may fall on to be selected.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum DateRange {
    /// No restriction.
    #[default]
    All,
    /// The seven days before today, and today.
    Week,
    /// From the same day last month up to today.
    Month,
    /// An inclusive range of dates chosen by the client.
    Custom {
        /// The first selected day.
        start: Date,
        /// The last selected day.
        end: Date,
    },
}

impl DateRange {
    /// Parse the `dateRange` parameter, using `start_date` and `end_date` for
    /// custom ranges.
    ///
    /// Unrecognised range names fall back to [DateRange::All].
    ///
    /// # Errors
    /// Returns [Error::InvalidInput] if the range is custom and either date is
    /// missing or not a valid `YYYY-MM-DD` date.
    pub fn parse(
        raw_range: Option<&str>,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> Result<Self, Error> {
        let range = raw_range.map(|range| range.trim().to_lowercase());

        match range.as_deref() {
            None | Some("") | Some("all") => Ok(Self::All),
            Some("week") => Ok(Self::Week),
            Some("month") => Ok(Self::Month),
            Some("custom") => {
                let (Some(start), Some(end)) = (non_blank(start_date), non_blank(end_date)) else {
                    return Err(Error::InvalidInput(
                        "A custom date range needs both a startDate and an endDate".to_owned(),
                    ));
                };

                Ok(Self::Custom {
                    start: parse_date(start)?,
                    end: parse_date(end)?,
                })
            }
            Some(other) => {
                tracing::debug!("unrecognised dateRange {other:?}, showing all dates");
                Ok(Self::All)
            }
        }
    }

    /// The first and last selected day relative to `today`, or `None` if every
    /// date is selected.
    ///
    /// A custom range whose start is after its end selects nothing.
    pub fn bounds(self, today: Date) -> Option<(Date, Date)> {
        match self {
            Self::All => None,
            Self::Week => Some((today.saturating_sub(Duration::days(7)), today)),
            Self::Month => Some((one_month_before(today), today)),
            Self::Custom { start, end } => Some((start, end)),
        }
    }
}

/// The same day in the previous month, or the last day of the previous month
/// if it is shorter, e.g. 31 March gives 28 (or 29) February.
fn one_month_before(date: Date) -> Date {
    let Some(end_of_previous_month) = date
        .replace_day(1)
        .ok()
        .and_then(|first_of_month| first_of_month.previous_day())
    else {
        return Date::MIN;
    };

    end_of_previous_month
        .replace_day(date.day().min(end_of_previous_month.day()))
        .unwrap_or(end_of_previous_month)
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

/// The field used to order transactions.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum SortBy {
    /// The date the transaction happened.
    #[default]
    Date,
    /// The signed amount, so the largest expense sorts lowest.
    Amount,
    /// The category label, compared byte-wise.
    Category,
}

impl SortBy {
    /// Parse the `sortBy` parameter, falling back to [SortBy::Date].
    pub fn parse(raw_sort_by: Option<&str>) -> Self {
        let sort_by = raw_sort_by.map(|sort_by| sort_by.trim().to_lowercase());

        match sort_by.as_deref() {
            None | Some("") | Some("date") => Self::Date,
            Some("amount") => Self::Amount,
            Some("category") => Self::Category,
            Some(other) => {
                tracing::debug!("unrecognised sortBy {other:?}, sorting by date");
                Self::Date
            }
        }
    }
}

/// The direction to sort transactions in.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Sort in order of increasing value.
    Ascending,
    /// Sort in order of decreasing value.
    #[default]
    Descending,
}

impl SortOrder {
    /// Parse the `sortOrder` parameter, falling back to [SortOrder::Descending].
    pub fn parse(raw_sort_order: Option<&str>) -> Self {
        let sort_order = raw_sort_order.map(|sort_order| sort_order.trim().to_lowercase());

        match sort_order.as_deref() {
            None | Some("") | Some("desc") => Self::Descending,
            Some("asc") => Self::Ascending,
            Some(other) => {
                tracing::debug!("unrecognised sortOrder {other:?}, sorting descending");
                Self::Descending
            }
        }
    }
}

/// A parsed and validated set of filters.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TransactionFilter {
    /// The dates a transaction may fall on.
    pub date_range: DateRange,
    /// Only keep transactions with exactly this category.
    pub category: Option<String>,
    /// Lowercase text that must appear in the description or category.
    pub search_query: Option<String>,
    /// The field to order by.
    pub sort_by: SortBy,
    /// The direction to order in.
    pub sort_order: SortOrder,
}

impl TransactionFilter {
    /// Build a filter from the raw query parameters.
    ///
    /// A category of "all" (in any case) or an empty category or search query
    /// disables that filter.
    ///
    /// # Errors
    /// Returns [Error::InvalidInput] if a custom date range is missing a date
    /// or has a malformed one.
    pub fn from_params(params: FilterParams) -> Result<Self, Error> {
        let date_range = DateRange::parse(
            params.date_range.as_deref(),
            params.start_date.as_deref(),
            params.end_date.as_deref(),
        )?;

        let category = params
            .category
            .map(|category| category.trim().to_owned())
            .filter(|category| !category.is_empty() && !category.eq_ignore_ascii_case("all"));

        let search_query = params
            .search_query
            .map(|query| query.trim().to_lowercase())
            .filter(|query| !query.is_empty());

        Ok(Self {
            date_range,
            category,
            search_query,
            sort_by: SortBy::parse(params.sort_by.as_deref()),
            sort_order: SortOrder::parse(params.sort_order.as_deref()),
        })
    }

    /// Whether `transaction` passes every filter.
    ///
    /// `bounds` is the result of [DateRange::bounds] for this filter.
    fn matches(&self, transaction: &Transaction, bounds: Option<(Date, Date)>) -> bool {
        let in_range = bounds
            .is_none_or(|(start, end)| start <= transaction.date && transaction.date <= end);

        let in_category = self
            .category
            .as_ref()
            .is_none_or(|category| transaction.category == *category);

        let matches_search = self.search_query.as_ref().is_none_or(|needle| {
            transaction.description.to_lowercase().contains(needle)
                || transaction.category.to_lowercase().contains(needle)
        });

        in_range && in_category && matches_search
    }

    fn compare(&self, a: &Transaction, b: &Transaction) -> Ordering {
        let ordering = match self.sort_by {
            SortBy::Date => a.date.cmp(&b.date),
            SortBy::Amount => a.signed_amount().total_cmp(&b.signed_amount()),
            SortBy::Category => a.category.cmp(&b.category),
        };

        let ordering = match self.sort_order {
            SortOrder::Ascending => ordering,
            SortOrder::Descending => ordering.reverse(),
        };

        // Break ties by ID so the order is stable across requests.
        ordering.then_with(|| a.id.cmp(&b.id))
    }
}

/// Select the transactions of `owner` that pass `filter` and sort them.
///
/// Relative date ranges are anchored on `today`. Transactions of other users
/// are always dropped, whatever the filter.
pub fn filter_and_sort(
    records: impl IntoIterator<Item = Transaction>,
    owner: UserID,
    filter: &TransactionFilter,
    today: Date,
) -> Vec<Transaction> {
    let bounds = filter.date_range.bounds(today);

    let mut selected: Vec<Transaction> = records
        .into_iter()
        .filter(|transaction| transaction.owner == owner && filter.matches(transaction, bounds))
        .collect();

    selected.sort_by(|a, b| filter.compare(a, b));

    selected
}
