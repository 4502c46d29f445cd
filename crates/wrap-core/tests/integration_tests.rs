//! Integration tests for wrap-core
//!
//! These tests exercise the full weekly data → analysis → report workflow
//! through the public API.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use wrap_core::{
    format_weekly_wrap, Analyzer, Category, Error, FocusThresholds, Milliunits, Transaction,
    WeeklyData,
};

fn date(m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, m, d).unwrap()
}

/// Monday morning at the end of the window
fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 11, 9, 0, 0).unwrap()
}

fn category(name: &str, budgeted: Milliunits, balance: Milliunits) -> Category {
    Category {
        id: format!("cat-{}", name.to_lowercase().replace(' ', "-")),
        name: name.to_string(),
        budgeted,
        balance,
        ..Default::default()
    }
}

fn spend(category: &str, day: u32, amount: Milliunits, memo: &str, payee: &str) -> Transaction {
    Transaction {
        id: format!("{}-{}-{}", category, day, amount),
        date: Some(date(3, day)),
        amount,
        memo: memo.to_string(),
        payee_name: payee.to_string(),
        category_id: Some(format!("cat-{}", category.to_lowercase().replace(' ', "-"))),
        category_name: category.to_string(),
        ..Default::default()
    }
}

fn week(categories: Vec<Category>, transactions: Vec<Transaction>) -> WeeklyData {
    WeeklyData {
        categories,
        transactions,
        week_start: date(3, 4),
        week_end: date(3, 11),
        ..Default::default()
    }
}

/// A household week with noise that must not count as spending
fn household_week() -> WeeklyData {
    let mut deleted = spend("Groceries", 6, -60_000, "Duplicate", "Fresh Market");
    deleted.deleted = true;

    let mut transfer = spend("Groceries", 8, -200_000, "To savings", "Transfer : Savings");
    transfer.category_id = None;
    transfer.category_name = String::new();

    week(
        vec![
            category("Groceries", 400_000, 150_000),
            category("Dining Out", 100_000, -25_500),
            category("Fuel", 120_000, 30_000),
            category("Fun Money", 0, 0),
            category("Subscriptions", 50_000, 45_000),
        ],
        vec![
            spend("Groceries", 2, -30_000, "Last week", "Corner Shop"),
            spend("Groceries", 5, -82_340, "", "Fresh Market"),
            spend("Dining Out", 6, -42_000, "Anniversary dinner", "Bistro"),
            deleted,
            spend("Dining Out", 7, -18_500, "", "Taqueria"),
            spend("Fuel", 7, -91_000, "", "Gas Station"),
            spend("Dining Out", 8, -12_000, "Team lunch", "Cafe"),
            transfer,
            spend("Groceries", 9, -45_000, "Weekly shop", "Fresh Market"),
            spend("Fun Money", 9, 2_500_000, "Refund", "Employer"),
            spend("Dining Out", 10, -9_000, "", "Bakery"),
        ],
    )
}

// =============================================================================
// End-to-end report
// =============================================================================

#[test]
fn test_household_week_report() {
    let analysis = Analyzer::new()
        .analyze_at(Some(&household_week()), now())
        .expect("analysis failed");

    let expected = "📊 **Weekly Financial Wrap - 2024-03-04 to 2024-03-11**\n\
                    \n\
                    💰 **Total Spent**: $299.84\n\
                    \n\
                    🏆 **3 Spending Categories**\n\
                    • **Groceries**: Activity: $127.34 | Remaining: $150\n\
                    • **Fuel**: Activity: $91 | Remaining: $30\n\
                    • **Dining Out**: Activity: $81.5 | Remaining: $-25.5\n\
                    \n\
                    ⚠️ **Over Budget Categories**\n\
                    \n\
                    **Dining Out**: Activity: $81.5 | Remaining: $-25.5\n\
                    Transactions:\n\
                    \x20\x20• 03-06: $42 - Anniversary dinner\n\
                    \x20\x20• 03-07: $18.5 - Taqueria\n\
                    \x20\x20• 03-08: $12 - Team lunch\n";

    assert_eq!(format_weekly_wrap(&analysis), expected);
}

#[test]
fn test_household_week_analysis() {
    let analysis = Analyzer::new()
        .analyze_at(Some(&household_week()), now())
        .unwrap();

    assert_eq!(analysis.overview.total_spent, 299_840);
    assert_eq!(analysis.overview.total_budgeted, 670_000);
    assert_eq!(analysis.overview.total_balance, 199_500);

    let wins: Vec<&str> = analysis.wins.iter().map(|w| w.category.as_str()).collect();
    assert_eq!(wins, vec!["Groceries", "Subscriptions", "Fuel"]);

    assert_eq!(analysis.concerns.len(), 1);
    assert_eq!(analysis.concerns[0].over, 25_500);
    assert_eq!(analysis.concerns[0].transactions.len(), 4);

    assert_eq!(analysis.ahead_focus.watch, vec!["Dining Out", "Fuel"]);
    assert!(analysis.ahead_focus.adjustments.is_empty());
    assert_eq!(analysis.ahead_focus.weeks_left, 1);
}

#[test]
fn test_top_categories_limit() {
    let analysis = Analyzer::with_thresholds(2, FocusThresholds::default())
        .analyze_at(Some(&household_week()), now())
        .unwrap();

    let message = format_weekly_wrap(&analysis);
    assert!(message.contains("🏆 **2 Spending Categories**\n"));
    assert!(!message.contains("• **Dining Out**"));
    // Concerns are never limited
    assert!(message.contains("\n**Dining Out**: Activity: $81.5"));
}

#[test]
fn test_analysis_is_idempotent() {
    let data = household_week();
    let analyzer = Analyzer::new();

    let first = analyzer.analyze_at(Some(&data), now()).unwrap();
    let second = analyzer.analyze_at(Some(&data), now()).unwrap();

    assert_eq!(first, second);
    assert_eq!(format_weekly_wrap(&first), format_weekly_wrap(&second));
}

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn test_single_fitness_purchase() {
    let data = week(
        vec![category("Fitness", 50_000, 20_000)],
        vec![spend("Fitness", 6, -30_000, "Gym", "Gym")],
    );

    let analysis = Analyzer::new().analyze_at(Some(&data), now()).unwrap();

    assert_eq!(analysis.top_spending.len(), 1);
    let fitness = &analysis.top_spending[0];
    assert_eq!(fitness.category, "Fitness");
    assert_eq!(fitness.spent, 30_000);
    assert!((fitness.percentage - 60.0).abs() < f64::EPSILON);

    let message = format_weekly_wrap(&analysis);
    assert!(message.contains("🏆 **1 Spending Category**\n"));
    assert!(message.contains("• **Fitness**: Activity: $30 | Remaining: $20\n"));
    assert!(message.contains("• No categories over budget - great job! 🎉\n"));
}

#[test]
fn test_overspent_category_lists_three_transactions() {
    let data = week(
        vec![category("Dining", 50_000, -10_000)],
        vec![
            spend("Dining", 5, -20_000, "Brunch", "Cafe"),
            spend("Dining", 6, -15_000, "", "Pizza Place"),
            spend("Dining", 7, -15_000, "Takeout", "Noodle Bar"),
            spend("Dining", 8, -10_000, "Late snack", "Diner"),
        ],
    );

    let analysis = Analyzer::new().analyze_at(Some(&data), now()).unwrap();
    let concern = &analysis.concerns[0];
    assert_eq!(concern.over, 10_000);
    assert_eq!(concern.spent, 60_000);
    assert_eq!(concern.transactions.len(), 4);

    let message = format_weekly_wrap(&analysis);
    assert_eq!(message.matches("  • ").count(), 3);
    assert!(message.contains("  • 03-05: $20 - Brunch\n"));
    assert!(message.contains("  • 03-06: $15 - Pizza Place\n"));
    assert!(!message.contains("Late snack"));
}

#[test]
fn test_empty_week() {
    let data = week(vec![category("Groceries", 400_000, 400_000)], Vec::new());
    let analysis = Analyzer::new().analyze_at(Some(&data), now()).unwrap();

    let message = format_weekly_wrap(&analysis);
    assert!(message.contains("💰 **Total Spent**: $0\n"));
    assert!(message.contains("🏆 **No Spending Categories**\n"));
    assert_eq!(analysis.wins.len(), 1);
}

#[test]
fn test_budget_adjustment_suggested() {
    let data = week(
        vec![category("Dining", 50_000, -10_000)],
        vec![spend("Dining", 5, -60_000, "Party", "Hall")],
    );

    let analysis = Analyzer::new().analyze_at(Some(&data), now()).unwrap();
    assert_eq!(
        analysis.ahead_focus.adjustments,
        vec!["Consider reducing Dining budget"]
    );
    assert!(analysis.ahead_focus.watch.is_empty());
}

// =============================================================================
// Invalid input
// =============================================================================

#[test]
fn test_missing_data_is_rejected() {
    let err = Analyzer::new().analyze_at(None, now()).unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));
}

#[test]
fn test_inverted_window_is_rejected() {
    let mut data = household_week();
    data.week_start = date(3, 12);

    let err = Analyzer::new().analyze_at(Some(&data), now()).unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));
}

#[test]
fn test_analysis_serializes_to_json() {
    let analysis = Analyzer::new()
        .analyze_at(Some(&household_week()), now())
        .unwrap();

    let json = serde_json::to_value(&analysis).unwrap();
    assert_eq!(json["date_range"], "2024-03-04 to 2024-03-11");
    assert_eq!(json["overview"]["total_spent"], 299_840);
    assert_eq!(json["concerns"][0]["category"], "Dining Out");
}
