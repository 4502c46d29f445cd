//! Weekly wrap message formatting
//!
//! Renders an [`AnalysisResult`] as the Markdown-flavoured text posted to chat.
//! The output is deterministic for a given result.

use std::fmt::Write;

use crate::models::{AnalysisResult, CategoryConcern, Milliunits, Transaction};

/// Transactions listed under each over-budget category
pub const MAX_CONCERN_TRANSACTIONS: usize = 3;

/// Date format for transaction bullets
const TX_DATE_FORMAT: &str = "%m-%d";

/// Format milliunits as a currency amount without the symbol
///
/// Whole amounts print without decimals; otherwise two decimals with
/// trailing zeros (and a bare trailing point) removed:
/// 12000 → "12", 12500 → "12.5", 12340 → "12.34".
pub fn format_currency(milliunits: Milliunits) -> String {
    let value = milliunits as f64 / 1000.0;

    if value == value.trunc() {
        return format!("{:.0}", value);
    }

    let fixed = format!("{:.2}", value);
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');

    // Sub-cent outflows round to "-0"
    if trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

/// "No Spending Categories", "1 Spending Category", "N Spending Categories"
pub fn spending_categories_label(count: usize) -> String {
    match count {
        0 => "No Spending Categories".to_string(),
        1 => "1 Spending Category".to_string(),
        n => format!("{} Spending Categories", n),
    }
}

/// Render the full weekly wrap message
pub fn format_weekly_wrap(analysis: &AnalysisResult) -> String {
    let mut message = String::new();

    // Writing into a String cannot fail
    let _ = writeln!(
        message,
        "📊 **Weekly Financial Wrap - {}**",
        analysis.date_range
    );
    message.push('\n');
    let _ = writeln!(
        message,
        "💰 **Total Spent**: ${}",
        format_currency(analysis.overview.total_spent)
    );
    message.push('\n');

    let _ = writeln!(
        message,
        "🏆 **{}**",
        spending_categories_label(analysis.top_spending.len())
    );
    for category in &analysis.top_spending {
        let _ = writeln!(
            message,
            "• **{}**: Activity: ${} | Remaining: ${}",
            category.category,
            format_currency(category.spent),
            format_currency(category.balance)
        );
    }

    message.push('\n');
    message.push_str("⚠️ **Over Budget Categories**\n");

    if analysis.concerns.is_empty() {
        message.push_str("• No categories over budget - great job! 🎉\n");
    } else {
        for concern in &analysis.concerns {
            write_concern(&mut message, concern);
        }
    }

    message
}

fn write_concern(message: &mut String, concern: &CategoryConcern) {
    let _ = writeln!(
        message,
        "\n**{}**: Activity: ${} | Remaining: ${}",
        concern.category,
        format_currency(concern.spent),
        format_currency(concern.balance)
    );

    if concern.transactions.is_empty() {
        return;
    }

    message.push_str("Transactions:\n");
    for tx in concern.transactions.iter().take(MAX_CONCERN_TRANSACTIONS) {
        write_transaction(message, tx);
    }
}

fn write_transaction(message: &mut String, tx: &Transaction) {
    let date = tx
        .date
        .map(|d| d.format(TX_DATE_FORMAT).to_string())
        .unwrap_or_default();

    let _ = writeln!(
        message,
        "  • {}: ${} - {}",
        date,
        format_currency(-tx.amount),
        tx.label()
    );
}
