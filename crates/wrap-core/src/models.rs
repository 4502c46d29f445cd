//! Domain models for the weekly wrap
//!
//! Amounts follow YNAB's convention: signed integers in milliunits
//! (thousandths of the currency unit). Outflows are negative.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Currency amount in thousandths of the major unit
pub type Milliunits = i64;

/// Format used for the human-readable date range
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A budget as returned by the budgeting service
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    pub id: String,
    pub name: String,
    pub last_modified: Option<DateTime<Utc>>,
}

/// The group a category belongs to
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryGroup {
    pub id: String,
    pub name: String,
    pub hidden: bool,
    pub deleted: bool,
}

/// A budget category with its amounts for the current month
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub category_group_id: String,
    pub category_group: CategoryGroup,
    pub hidden: bool,
    pub deleted: bool,
    /// Amount assigned this month
    pub budgeted: Milliunits,
    /// Net activity this month (negative for spending)
    pub activity: Milliunits,
    /// Remaining available amount, as reported by the service
    pub balance: Milliunits,
}

/// A single account transaction
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    /// Transactions without a date never fall inside a window
    pub date: Option<NaiveDate>,
    pub amount: Milliunits,
    pub memo: String,
    pub cleared: String,
    pub approved: bool,
    pub flag_color: Option<String>,
    pub account_id: String,
    pub account_name: String,
    pub payee_id: Option<String>,
    pub payee_name: String,
    pub category_id: Option<String>,
    /// Category name, used to attribute spending to a category
    pub category_name: String,
    pub transfer_account_id: Option<String>,
    pub import_id: Option<String>,
    pub deleted: bool,
}

impl Transaction {
    /// Whether this transaction counts toward category spending:
    /// not deleted, linked to a category, and an outflow
    pub fn is_categorized_spending(&self) -> bool {
        !self.deleted && self.category_id.is_some() && self.amount < 0
    }

    /// Display label: the memo, or the payee name when the memo is empty
    pub fn label(&self) -> &str {
        if self.memo.is_empty() {
            &self.payee_name
        } else {
            &self.memo
        }
    }
}

/// One week of budget data, as fetched for a single run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeeklyData {
    pub budget: Budget,
    pub categories: Vec<Category>,
    pub transactions: Vec<Transaction>,
    /// First day of the window (inclusive)
    pub week_start: NaiveDate,
    /// Last day of the window (inclusive)
    pub week_end: NaiveDate,
}

impl WeeklyData {
    /// Whether a transaction date falls within [week_start, week_end]
    pub fn in_window(&self, date: Option<NaiveDate>) -> bool {
        match date {
            Some(d) => d >= self.week_start && d <= self.week_end,
            None => false,
        }
    }

    /// "YYYY-MM-DD to YYYY-MM-DD"
    pub fn date_range(&self) -> String {
        format!(
            "{} to {}",
            self.week_start.format(DATE_FORMAT),
            self.week_end.format(DATE_FORMAT)
        )
    }
}

/// Spending for one budgeted category within the window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySpending {
    pub category: Category,
    /// Outflows in the window, as a positive amount
    pub spent: Milliunits,
    pub budgeted: Milliunits,
    /// Taken from the category as reported, not derived from `spent`
    pub balance: Milliunits,
    /// spent / budgeted * 100
    pub percentage: f64,
    /// Contributing transactions, in input order
    pub transactions: Vec<Transaction>,
}

/// Totals across all budgeted categories
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Overview {
    pub total_spent: Milliunits,
    pub total_budgeted: Milliunits,
    pub total_balance: Milliunits,
    /// total_spent / total_budgeted * 100, or 0 with nothing budgeted
    pub health_percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopSpendingCategory {
    pub category: String,
    pub spent: Milliunits,
    pub budgeted: Milliunits,
    pub balance: Milliunits,
    pub percentage: f64,
}

/// A category with money left over
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryWin {
    pub category: String,
    pub balance: Milliunits,
    pub percentage: f64,
}

/// An overspent category with the transactions behind it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryConcern {
    pub category: String,
    pub budgeted: Milliunits,
    pub spent: Milliunits,
    pub balance: Milliunits,
    /// Amount over budget (the negated balance)
    pub over: Milliunits,
    pub percentage: f64,
    pub transactions: Vec<Transaction>,
}

/// Forward-looking guidance for the rest of the month
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AheadFocus {
    /// Categories close to their limit
    pub watch: Vec<String>,
    /// Suggested budget adjustments for categories at or past their limit
    pub adjustments: Vec<String>,
    /// Whole weeks remaining until the end of the window, rounded up
    pub weeks_left: i64,
}

/// Everything derived from one week of data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub overview: Overview,
    pub top_spending: Vec<TopSpendingCategory>,
    pub wins: Vec<CategoryWin>,
    pub concerns: Vec<CategoryConcern>,
    pub ahead_focus: AheadFocus,
    pub date_range: String,
}
