//! One weekly wrap cycle: fetch → analyze → format → send
//!
//! Each step short-circuits the rest: a failed fetch never reaches the
//! analyzer and a failed analysis never reaches the chat.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use chrono_tz::Tz;
use tracing::{info, warn};

use crate::analyzer::Analyzer;
use crate::config::Config;
use crate::error::Result;
use crate::models::AnalysisResult;
use crate::report::format_weekly_wrap;
use crate::scheduler::resolve_timezone;
use crate::telegram::{ChatDestination, ChatMessage, Notifier, TelegramBot};
use crate::ynab::{BudgetProvider, YnabClient};

/// Length of the reporting window in days
pub const WINDOW_DAYS: i64 = 7;

/// What to do with the formatted report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Post it to the configured chat
    Send,
    /// Only return it
    DryRun,
}

/// Result of a completed cycle
#[derive(Debug, Clone)]
pub struct WrapOutcome {
    pub analysis: AnalysisResult,
    pub message: String,
    /// Whether the message reached the chat
    pub delivered: bool,
}

pub struct WeeklyWrap {
    provider: Box<dyn BudgetProvider>,
    notifier: Option<(Box<dyn Notifier>, ChatDestination)>,
    analyzer: Analyzer,
    timezone: Tz,
}

impl WeeklyWrap {
    pub fn new(provider: Box<dyn BudgetProvider>, analyzer: Analyzer, timezone: Tz) -> Self {
        Self {
            provider,
            notifier: None,
            analyzer,
            timezone,
        }
    }

    pub fn with_notifier(mut self, notifier: Box<dyn Notifier>, destination: ChatDestination) -> Self {
        self.notifier = Some((notifier, destination));
        self
    }

    /// Wire up the YNAB client, and the Telegram bot when sending
    pub fn from_config(config: &Config, delivery: Delivery) -> Self {
        let wrap = Self::new(
            Box::new(YnabClient::new(&config.ynab)),
            Analyzer::from_config(&config.thresholds),
            resolve_timezone(&config.schedule.timezone),
        );

        match delivery {
            Delivery::Send => {
                let bot = TelegramBot::new(&config.telegram);
                let destination = bot.destination();
                wrap.with_notifier(Box::new(bot), destination)
            }
            Delivery::DryRun => wrap,
        }
    }

    /// The window ending today in the configured zone and starting a week earlier
    pub fn week_window(&self, now: DateTime<Utc>) -> (NaiveDate, NaiveDate) {
        let week_end = now.with_timezone(&self.timezone).date_naive();
        let week_start = week_end - Duration::days(WINDOW_DAYS);
        (week_start, week_end)
    }

    /// Fetch and analyze the week ending at `now`
    pub async fn analyze_at(&self, now: DateTime<Utc>) -> Result<AnalysisResult> {
        let (week_start, week_end) = self.week_window(now);
        let data = self.provider.fetch_weekly_data(week_start, week_end).await?;
        self.analyzer.analyze_at(Some(&data), now)
    }

    pub async fn run(&self, delivery: Delivery) -> Result<WrapOutcome> {
        self.run_at(Utc::now(), delivery).await
    }

    /// Run one full cycle as of `now`
    pub async fn run_at(&self, now: DateTime<Utc>, delivery: Delivery) -> Result<WrapOutcome> {
        let analysis = self.analyze_at(now).await?;
        let message = format_weekly_wrap(&analysis);

        info!(
            date_range = %analysis.date_range,
            total_spent = analysis.overview.total_spent,
            concerns = analysis.concerns.len(),
            "Weekly wrap prepared"
        );

        let delivered = match (delivery, &self.notifier) {
            (Delivery::DryRun, _) => false,
            (Delivery::Send, Some((notifier, destination))) => {
                notifier
                    .send(&ChatMessage {
                        destination: *destination,
                        text: message.clone(),
                        markdown: true,
                    })
                    .await?;
                true
            }
            (Delivery::Send, None) => {
                warn!("No notifier configured, weekly wrap not sent");
                false
            }
        };

        Ok(WrapOutcome {
            analysis,
            message,
            delivered,
        })
    }
}
