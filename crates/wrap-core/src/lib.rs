//! Weekly Wrap Core Library
//!
//! Shared functionality for the weekly budget wrap:
//! - Data model for budgets, categories and transactions (milliunits)
//! - Weekly spending analysis (top spending, wins, concerns, forward focus)
//! - Report formatting for chat
//! - Environment configuration with `.env` support
//! - YNAB API client and Telegram Bot API client
//! - Fetch → analyze → format → send pipeline
//! - Cron scheduler in a configurable time zone

pub mod analyzer;
pub mod config;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod report;
pub mod scheduler;
pub mod telegram;
pub mod ynab;

/// Test utilities including mock YNAB and Telegram server
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use analyzer::{Analyzer, FocusThresholds};
pub use config::{Config, LogFormat, ScheduleConfig, TelegramConfig, ThresholdConfig, YnabConfig};
pub use error::{Error, Result};
pub use models::{
    AheadFocus, AnalysisResult, Budget, Category, CategoryConcern, CategoryGroup,
    CategorySpending, CategoryWin, Milliunits, Overview, TopSpendingCategory, Transaction,
    WeeklyData,
};
pub use pipeline::{Delivery, WeeklyWrap, WrapOutcome};
pub use report::{format_currency, format_weekly_wrap};
pub use scheduler::{resolve_timezone, run_scheduler, Schedule};
pub use telegram::{BotInfo, ChatDestination, ChatMessage, Notifier, TelegramBot};
pub use ynab::{BudgetProvider, YnabClient};
