//! Analysis output

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use wrap_core::{format_currency, AnalysisResult, Config, Delivery, WeeklyWrap};

/// Analyze the week ending today and print the result
pub async fn cmd_analyze(config: &Config, json: bool) -> Result<()> {
    let analysis = analyze_week(config, Utc::now()).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&analysis)?);
    } else {
        print!("{}", analysis_summary(&analysis));
    }
    Ok(())
}

/// Fetch and analyze the week ending at `now`
pub async fn analyze_week(config: &Config, now: DateTime<Utc>) -> Result<AnalysisResult> {
    config.validate(true).context("Invalid configuration")?;

    WeeklyWrap::from_config(config, Delivery::DryRun)
        .analyze_at(now)
        .await
        .context("Analysis failed")
}

/// Plain-text summary including wins and forward focus
pub fn analysis_summary(analysis: &AnalysisResult) -> String {
    let mut lines = Vec::new();
    let overview = &analysis.overview;

    lines.push(format!("📅 Week: {}", analysis.date_range));
    lines.push(String::new());
    lines.push("💰 Overview".to_string());
    lines.push(format!("  Spent:     ${}", format_currency(overview.total_spent)));
    lines.push(format!("  Budgeted:  ${}", format_currency(overview.total_budgeted)));
    lines.push(format!("  Remaining: ${}", format_currency(overview.total_balance)));
    lines.push(format!("  Health:    {:.1}% of budget spent", overview.health_percentage));

    lines.push(String::new());
    lines.push(format!("🏆 Top Spending ({})", analysis.top_spending.len()));
    if analysis.top_spending.is_empty() {
        lines.push("  (none)".to_string());
    }
    for (i, top) in analysis.top_spending.iter().enumerate() {
        lines.push(format!(
            "  {}. {:<20} ${:>10}  ({:.1}% of ${})",
            i + 1,
            top.category,
            format_currency(top.spent),
            top.percentage,
            format_currency(top.budgeted)
        ));
    }

    lines.push(String::new());
    lines.push("🎉 Wins".to_string());
    if analysis.wins.is_empty() {
        lines.push("  (none)".to_string());
    }
    for win in &analysis.wins {
        lines.push(format!(
            "  • {}: ${} left",
            win.category,
            format_currency(win.balance)
        ));
    }

    lines.push(String::new());
    lines.push("⚠️  Over Budget".to_string());
    if analysis.concerns.is_empty() {
        lines.push("  (none)".to_string());
    }
    for concern in &analysis.concerns {
        lines.push(format!(
            "  • {}: over by ${} ({} transactions)",
            concern.category,
            format_currency(concern.over),
            concern.transactions.len()
        ));
    }

    let focus = &analysis.ahead_focus;
    lines.push(String::new());
    lines.push(format!("🔭 Looking Ahead ({} week(s) left)", focus.weeks_left));
    if !focus.watch.is_empty() {
        lines.push(format!("  Watch: {}", focus.watch.join(", ")));
    }
    for adjustment in &focus.adjustments {
        lines.push(format!("  • {}", adjustment));
    }
    if focus.watch.is_empty() && focus.adjustments.is_empty() {
        lines.push("  Nothing to watch".to_string());
    }

    let mut summary = lines.join("\n");
    summary.push('\n');
    summary
}
