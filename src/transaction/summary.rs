//! Computes totals over a set of transactions.

use std::{collections::HashMap, fmt};

use serde::{
    Deserialize, Deserializer, Serialize, Serializer,
    de::{MapAccess, Visitor},
    ser::SerializeMap,
};
use time::Date;

use crate::transaction::{Transaction, TransactionKind};

/// The number and signed total of the transactions in one category.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CategorySummary {
    /// The number of transactions in the category.
    pub count: usize,
    /// The signed sum of their amounts.
    pub total: f64,
}

/// Per-category summaries in the order each category was first seen.
///
/// Serialized as a JSON object keyed by category label.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CategoryBreakdown(Vec<(String, CategorySummary)>);

impl CategoryBreakdown {
    /// Get the summary for `category`, if any transaction had it.
    pub fn get(&self, category: &str) -> Option<&CategorySummary> {
        self.0
            .iter()
            .find(|(label, _)| label == category)
            .map(|(_, summary)| summary)
    }

    /// Iterate over the categories in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &CategorySummary)> {
        self.0.iter().map(|(label, summary)| (label.as_str(), summary))
    }

    /// The number of distinct categories.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no category was seen.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for CategoryBreakdown {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (label, summary) in &self.0 {
            map.serialize_entry(label, summary)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for CategoryBreakdown {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct BreakdownVisitor;

        impl<'de> Visitor<'de> for BreakdownVisitor {
            type Value = CategoryBreakdown;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a map from category labels to summaries")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some(entry) = access.next_entry::<String, CategorySummary>()? {
                    entries.push(entry);
                }
                Ok(CategoryBreakdown(entries))
            }
        }

        deserializer.deserialize_map(BreakdownVisitor)
    }
}

/// Aggregate statistics over a set of transactions.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryStats {
    /// The signed sum of all amounts.
    pub total: f64,
    /// The number of transactions.
    pub count: usize,
    /// `total / count`, or zero when there are no transactions.
    pub average: f64,
    /// The amount spent today. Income is not counted.
    pub today: f64,
    /// The amount spent in the current calendar month. Income is not counted.
    pub this_month: f64,
    /// Count and total per category.
    pub by_category: CategoryBreakdown,
}

/// Summarize `records` in a single pass.
///
/// `today` decides which expenses count towards [SummaryStats::today] and
/// [SummaryStats::this_month].
pub fn summarize<'a>(
    records: impl IntoIterator<Item = &'a Transaction>,
    today: Date,
) -> SummaryStats {
    let mut stats = SummaryStats::default();
    let mut category_index: HashMap<&str, usize> = HashMap::new();
    let mut categories: Vec<(String, CategorySummary)> = Vec::new();

    for transaction in records {
        let signed_amount = transaction.signed_amount();

        stats.total += signed_amount;
        stats.count += 1;

        if transaction.kind == TransactionKind::Expense {
            if transaction.date == today {
                stats.today += transaction.amount;
            }

            if transaction.date.year() == today.year() && transaction.date.month() == today.month()
            {
                stats.this_month += transaction.amount;
            }
        }

        let index = *category_index
            .entry(transaction.category.as_str())
            .or_insert_with(|| {
                categories.push((transaction.category.clone(), CategorySummary::default()));
                categories.len() - 1
            });

        let summary = &mut categories[index].1;
        summary.count += 1;
        summary.total += signed_amount;
    }

    if stats.count > 0 {
        stats.average = stats.total / stats.count as f64;
    }

    stats.by_category = CategoryBreakdown(categories);

    stats
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use time::{Date, macros::date};

    use crate::{
        UserID,
        transaction::{SummaryStats, Transaction, TransactionKind, summarize},
    };

    const TODAY: Date = date!(2025 - 03 - 15);

    fn transaction(
        id: i64,
        kind: TransactionKind,
        amount: f64,
        date: Date,
        category: &str,
    ) -> Transaction {
        Transaction {
            id,
            owner: UserID::new(1),
            kind,
            category: category.to_owned(),
            amount,
            description: "test".to_owned(),
            date,
            icon: "💰".to_owned(),
        }
    }

    #[track_caller]
    fn assert_close(got: f64, want: f64) {
        assert!((got - want).abs() < 1e-9, "got {got}, want {want}");
    }

    #[test]
    fn empty_input_is_all_zero() {
        let got = summarize(&[], TODAY);

        assert_eq!(got, SummaryStats::default());
        assert_eq!(got.average, 0.0);
        assert!(got.by_category.is_empty());
    }

    #[test]
    fn expense_today_counts_towards_today() {
        let records = [transaction(1, TransactionKind::Expense, 100.0, TODAY, "Food")];

        let got = summarize(&records, TODAY);

        assert_eq!(got.today, 100.0);
        assert_eq!(got.this_month, 100.0);
        assert_eq!(got.total, -100.0);
    }

    #[test]
    fn income_and_expense_net_out() {
        let records = [
            transaction(1, TransactionKind::Income, 50.0, TODAY, "Salary"),
            transaction(2, TransactionKind::Expense, 30.0, TODAY, "Food"),
        ];

        let got = summarize(&records, TODAY);

        assert_eq!(got.total, 20.0);
        assert_eq!(got.count, 2);
        assert_eq!(got.average, 10.0);
        assert_eq!(got.today, 30.0);
    }

    #[test]
    fn this_month_is_calendar_aligned() {
        let records = [
            transaction(1, TransactionKind::Expense, 10.0, date!(2025 - 03 - 01), "Food"),
            transaction(2, TransactionKind::Expense, 20.0, date!(2025 - 02 - 28), "Food"),
            transaction(3, TransactionKind::Expense, 40.0, date!(2024 - 03 - 15), "Food"),
            transaction(4, TransactionKind::Income, 80.0, date!(2025 - 03 - 02), "Salary"),
        ];

        let got = summarize(&records, TODAY);

        assert_eq!(got.this_month, 10.0);
        assert_eq!(got.today, 0.0);
    }

    #[test]
    fn category_totals_add_up_to_total() {
        let records = [
            transaction(1, TransactionKind::Expense, 12.5, TODAY, "Food"),
            transaction(2, TransactionKind::Income, 300.0, TODAY, "Salary"),
            transaction(3, TransactionKind::Expense, 7.25, TODAY, "Food"),
            transaction(4, TransactionKind::Expense, 40.0, TODAY, "Transport"),
        ];

        let got = summarize(&records, TODAY);

        let category_total: f64 = got.by_category.iter().map(|(_, summary)| summary.total).sum();
        assert_close(category_total, got.total);
        assert_close(got.average, got.total / got.count as f64);

        let food = got.by_category.get("Food").unwrap();
        assert_eq!(food.count, 2);
        assert_close(food.total, -19.75);
    }

    #[test]
    fn categories_keep_first_seen_order() {
        let records = [
            transaction(1, TransactionKind::Expense, 1.0, TODAY, "Transport"),
            transaction(2, TransactionKind::Expense, 1.0, TODAY, "Food"),
            transaction(3, TransactionKind::Expense, 1.0, TODAY, "Transport"),
            transaction(4, TransactionKind::Income, 1.0, TODAY, "Salary"),
        ];

        let got = summarize(&records, TODAY);

        let labels: Vec<&str> = got.by_category.iter().map(|(label, _)| label).collect();
        assert_eq!(labels, vec!["Transport", "Food", "Salary"]);

        let json = serde_json::to_string(&got.by_category).unwrap();
        assert_eq!(
            json,
            r#"{"Transport":{"count":2,"total":-2.0},"Food":{"count":1,"total":-1.0},"Salary":{"count":1,"total":1.0}}"#
        );
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let records = [transaction(1, TransactionKind::Expense, 5.0, TODAY, "Food")];

        let got = serde_json::to_value(summarize(&records, TODAY)).unwrap();

        assert_eq!(
            got,
            json!({
                "total": -5.0,
                "count": 1,
                "average": -5.0,
                "today": 5.0,
                "thisMonth": 5.0,
                "byCategory": { "Food": { "count": 1, "total": -5.0 } },
            })
        );
    }

    #[test]
    fn deserializes_into_same_order() {
        let json = r#"{"b":{"count":1,"total":1.0},"a":{"count":2,"total":3.0}}"#;

        let got: crate::transaction::CategoryBreakdown = serde_json::from_str(json).unwrap();

        let labels: Vec<&str> = got.iter().map(|(label, _)| label).collect();
        assert_eq!(labels, vec!["b", "a"]);
    }
}
