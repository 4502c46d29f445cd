//! Connectivity and schedule checks

use anyhow::{Context, Result};
use chrono::Utc;
use wrap_core::{Config, Schedule, TelegramBot};

/// Verify the bot token with Telegram
pub async fn cmd_ping(config: &Config) -> Result<()> {
    config.validate(false).context("Invalid configuration")?;

    print!("Checking Telegram bot... ");
    let bot = TelegramBot::new(&config.telegram);
    let me = bot
        .test_connection()
        .await
        .context("Telegram connection check failed")?;

    match &me.username {
        Some(username) => println!("✅ Connected as @{} ({})", username, me.id),
        None => println!("✅ Connected as {} ({})", me.first_name, me.id),
    }

    let destination = bot.destination();
    match destination.thread_id {
        Some(topic) => println!("  Chat: {} (topic {})", destination.chat_id, topic),
        None => println!("  Chat: {}", destination.chat_id),
    }
    Ok(())
}

/// Show the next `count` scheduled runs
pub fn cmd_schedule(config: &Config, count: usize) -> Result<()> {
    let schedule = Schedule::from_config(&config.schedule).context("Invalid schedule")?;
    let now = Utc::now();
    let runs = schedule.upcoming(now, count)?;

    println!(
        "📅 Schedule: {} ({})\n",
        schedule.expression(),
        schedule.timezone()
    );

    for run in runs {
        let local = run.with_timezone(&schedule.timezone());
        let until = run - now;
        println!(
            "  {}  (in {}d {}h)",
            local.format("%a %Y-%m-%d %H:%M %Z"),
            until.num_days(),
            until.num_hours() % 24
        );
    }
    Ok(())
}
