//! Weekly spending analysis
//!
//! Turns one week of categories and transactions into an [`AnalysisResult`]:
//!
//! - per-category spending (budgeted categories only)
//! - overview totals and budget health
//! - top spending categories
//! - wins (categories with the most money left)
//! - concerns (overspent categories, with their transactions)
//! - forward focus (categories to watch, budgets to adjust)
//!
//! Everything here is a pure function of its input except
//! [`Analyzer::analyze`], which reads the clock for `weeks_left`.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use tracing::debug;

use crate::config::ThresholdConfig;
use crate::error::{Error, Result};
use crate::models::{
    AheadFocus, AnalysisResult, Category, CategoryConcern, CategorySpending, CategoryWin,
    Milliunits, Overview, TopSpendingCategory, Transaction, WeeklyData,
};

/// Maximum number of wins reported
pub const MAX_WINS: usize = 3;

/// Percent-of-budget boundaries for forward focus
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FocusThresholds {
    /// Categories at or above this percentage (and below `over_budget_percent`) are watched
    pub at_risk_percent: f64,
    /// Categories at or above this percentage get an adjustment suggestion
    pub over_budget_percent: f64,
}

impl Default for FocusThresholds {
    fn default() -> Self {
        Self {
            at_risk_percent: 75.0,
            over_budget_percent: 100.0,
        }
    }
}

/// Weekly analyzer
///
/// Holds the tunable limits; the analysis itself keeps no state between runs.
#[derive(Debug, Clone, Default)]
pub struct Analyzer {
    /// Number of top spending categories to report (0 = all)
    top_categories_count: usize,
    focus: FocusThresholds,
}

impl Analyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_thresholds(top_categories_count: usize, focus: FocusThresholds) -> Self {
        Self {
            top_categories_count,
            focus,
        }
    }

    pub fn from_config(config: &ThresholdConfig) -> Self {
        Self::with_thresholds(
            config.top_categories_count,
            FocusThresholds {
                at_risk_percent: config.at_risk_percent,
                over_budget_percent: config.over_budget_percent,
            },
        )
    }

    /// Analyze a week of data, measuring `weeks_left` from the current time
    pub fn analyze(&self, data: Option<&WeeklyData>) -> Result<AnalysisResult> {
        self.analyze_at(data, Utc::now())
    }

    /// Analyze a week of data as of `now`
    ///
    /// Fails with `InvalidInput` when no data is given or the window is inverted.
    /// Only transactions dated inside the window are considered.
    pub fn analyze_at(
        &self,
        data: Option<&WeeklyData>,
        now: DateTime<Utc>,
    ) -> Result<AnalysisResult> {
        let data = data.ok_or_else(|| Error::InvalidInput("weekly data is missing".into()))?;

        if data.week_start > data.week_end {
            return Err(Error::InvalidInput(format!(
                "window start {} is after window end {}",
                data.week_start, data.week_end
            )));
        }

        let in_window: Vec<Transaction> = data
            .transactions
            .iter()
            .filter(|tx| data.in_window(tx.date))
            .cloned()
            .collect();

        debug!(
            categories = data.categories.len(),
            transactions = data.transactions.len(),
            in_window = in_window.len(),
            "Analyzing weekly data"
        );

        let spending = category_spending(&data.categories, &in_window);

        Ok(AnalysisResult {
            overview: overview(&spending),
            top_spending: top_spending(&spending, self.top_categories_count),
            wins: wins(&spending),
            concerns: concerns(&spending),
            ahead_focus: ahead_focus(&spending, data.week_end, now, self.focus),
            date_range: data.date_range(),
        })
    }
}

/// Aggregate spending per budgeted category
///
/// Transactions are attributed by category *name*, so two categories sharing
/// a name share their transactions. Categories with nothing budgeted are
/// skipped. Output follows the order of `categories`.
pub fn category_spending(
    categories: &[Category],
    transactions: &[Transaction],
) -> Vec<CategorySpending> {
    let mut by_name: HashMap<&str, (Milliunits, Vec<Transaction>)> = HashMap::new();

    for tx in transactions
        .iter()
        .filter(|tx| tx.is_categorized_spending())
    {
        let entry = by_name.entry(tx.category_name.as_str()).or_default();
        entry.0 += -tx.amount;
        entry.1.push(tx.clone());
    }

    categories
        .iter()
        .filter(|cat| cat.budgeted != 0)
        .map(|cat| {
            let (spent, transactions) = by_name
                .get(cat.name.as_str())
                .cloned()
                .unwrap_or_default();

            CategorySpending {
                category: cat.clone(),
                spent,
                budgeted: cat.budgeted,
                balance: cat.balance,
                percentage: spent as f64 / cat.budgeted as f64 * 100.0,
                transactions,
            }
        })
        .collect()
}

/// Sum spent, budgeted and balance across categories
pub fn overview(spending: &[CategorySpending]) -> Overview {
    let total_spent: Milliunits = spending.iter().map(|s| s.spent).sum();
    let total_budgeted: Milliunits = spending.iter().map(|s| s.budgeted).sum();
    let total_balance: Milliunits = spending.iter().map(|s| s.balance).sum();

    let health_percentage = if total_budgeted != 0 {
        total_spent as f64 / total_budgeted as f64 * 100.0
    } else {
        0.0
    };

    Overview {
        total_spent,
        total_budgeted,
        total_balance,
        health_percentage,
    }
}

/// Categories with any spending, highest first
///
/// `limit` of 0 returns all of them. Equal amounts keep their input order.
pub fn top_spending(spending: &[CategorySpending], limit: usize) -> Vec<TopSpendingCategory> {
    let mut ranked: Vec<&CategorySpending> = spending.iter().filter(|s| s.spent > 0).collect();
    ranked.sort_by(|a, b| b.spent.cmp(&a.spent));

    if limit > 0 {
        ranked.truncate(limit);
    }

    ranked
        .into_iter()
        .map(|s| TopSpendingCategory {
            category: s.category.name.clone(),
            spent: s.spent,
            budgeted: s.budgeted,
            balance: s.balance,
            percentage: s.percentage,
        })
        .collect()
}

/// Up to three categories with the largest positive balance
pub fn wins(spending: &[CategorySpending]) -> Vec<CategoryWin> {
    let mut ranked: Vec<&CategorySpending> = spending.iter().collect();
    ranked.sort_by(|a, b| b.balance.cmp(&a.balance));

    ranked
        .into_iter()
        .take(MAX_WINS)
        .filter(|s| s.balance > 0)
        .map(|s| CategoryWin {
            category: s.category.name.clone(),
            balance: s.balance,
            percentage: s.percentage,
        })
        .collect()
}

/// Every category with a negative balance, most overspent first
pub fn concerns(spending: &[CategorySpending]) -> Vec<CategoryConcern> {
    let mut ranked: Vec<&CategorySpending> = spending.iter().filter(|s| s.balance < 0).collect();
    ranked.sort_by(|a, b| a.balance.cmp(&b.balance));

    ranked
        .into_iter()
        .map(|s| CategoryConcern {
            category: s.category.name.clone(),
            budgeted: s.budgeted,
            spent: s.spent,
            balance: s.balance,
            over: -s.balance,
            percentage: s.percentage,
            transactions: s.transactions.clone(),
        })
        .collect()
}

/// Watch list, adjustment suggestions and weeks remaining until `week_end`
///
/// `week_end` is inclusive, so the window closes at midnight UTC after it.
/// A window that has already closed yields zero or negative weeks.
pub fn ahead_focus(
    spending: &[CategorySpending],
    week_end: NaiveDate,
    now: DateTime<Utc>,
    thresholds: FocusThresholds,
) -> AheadFocus {
    let mut watch = Vec::new();
    let mut adjustments = Vec::new();

    for s in spending {
        if s.percentage >= thresholds.over_budget_percent {
            adjustments.push(format!("Consider reducing {} budget", s.category.name));
        } else if s.percentage >= thresholds.at_risk_percent {
            watch.push(s.category.name.clone());
        }
    }

    let window_close = week_end
        .succ_opt()
        .unwrap_or(week_end)
        .and_time(NaiveTime::MIN)
        .and_utc();
    let hours_left = (window_close - now).num_seconds() as f64 / 3600.0;

    AheadFocus {
        watch,
        adjustments,
        weeks_left: (hours_left / 24.0 / 7.0).ceil() as i64,
    }
}
