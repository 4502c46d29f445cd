//! Weekly wrap cycles: scheduled, one-shot and dry run

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tracing::info;
use wrap_core::{
    run_scheduler, Config, Delivery, Schedule, TelegramBot, WeeklyWrap, WrapOutcome,
};

/// Run the scheduler until the process is stopped
pub async fn cmd_start(config: &Config) -> Result<()> {
    config.validate(false).context("Invalid configuration")?;

    let schedule = Schedule::from_config(&config.schedule).context("Invalid schedule")?;

    let bot = TelegramBot::new(&config.telegram);
    let me = bot
        .test_connection()
        .await
        .context("Failed to connect to Telegram")?;
    info!(bot = ?me.username, "Connected to Telegram");

    let wrap = WeeklyWrap::from_config(config, Delivery::Send);
    run_scheduler(&schedule, &wrap)
        .await
        .context("Scheduler stopped")?;

    Ok(())
}

/// Run one cycle for the week ending at `now`
///
/// Sending needs the Telegram settings, a dry run only the YNAB ones.
pub async fn run_wrap(
    config: &Config,
    delivery: Delivery,
    now: DateTime<Utc>,
) -> Result<WrapOutcome> {
    config
        .validate(delivery == Delivery::DryRun)
        .context("Invalid configuration")?;

    let wrap = WeeklyWrap::from_config(config, delivery);
    wrap.run_at(now, delivery)
        .await
        .context("Weekly wrap failed")
}

/// Send the wrap for the week ending today
pub async fn cmd_once(config: &Config) -> Result<()> {
    let outcome = run_wrap(config, Delivery::Send, Utc::now()).await?;

    println!(
        "✅ Weekly wrap for {} sent to chat {}",
        outcome.analysis.date_range, config.telegram.chat_id
    );
    Ok(())
}

/// Print the wrap for the week ending today without sending it
pub async fn cmd_dry_run(config: &Config) -> Result<()> {
    let outcome = run_wrap(config, Delivery::DryRun, Utc::now()).await?;

    print!("{}", outcome.message);
    Ok(())
}
