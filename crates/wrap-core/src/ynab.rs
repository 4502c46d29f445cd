//! YNAB API client
//!
//! Fetches the budget, its categories and recent transactions through the
//! YNAB REST API (v1). All amounts are milliunits, as returned by the API.
//!
//! The client does not trust `since_date` to bound the result; the analyzer
//! restricts transactions to the exact window itself.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, info};

use crate::config::YnabConfig;
use crate::error::{Error, Result};
use crate::models::{
    Budget, Category, CategoryGroup, Milliunits, Transaction, WeeklyData, DATE_FORMAT,
};

/// Source of one week of budget data
#[async_trait]
pub trait BudgetProvider: Send + Sync {
    /// Fetch budget, categories and transactions for [week_start, week_end]
    async fn fetch_weekly_data(
        &self,
        week_start: NaiveDate,
        week_end: NaiveDate,
    ) -> Result<WeeklyData>;
}

/// HTTP client for a single YNAB budget
#[derive(Clone)]
pub struct YnabClient {
    http_client: Client,
    base_url: String,
    api_token: String,
    budget_id: String,
}

impl YnabClient {
    pub fn new(config: &YnabConfig) -> Self {
        Self {
            http_client: Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_token: config.api_token.clone(),
            budget_id: config.budget_id.clone(),
        }
    }

    /// Budget metadata (id, name, last modification)
    pub async fn get_budget(&self) -> Result<Budget> {
        let data: BudgetData = self.get(&format!("budgets/{}", self.budget_id), &[]).await?;

        Ok(Budget {
            id: data.budget.id,
            name: data.budget.name,
            last_modified: data.budget.last_modified_on,
        })
    }

    /// All categories, flattened out of their groups
    pub async fn get_categories(&self) -> Result<Vec<Category>> {
        let data: CategoriesData = self
            .get(&format!("budgets/{}/categories", self.budget_id), &[])
            .await?;

        let categories = data
            .category_groups
            .into_iter()
            .flat_map(|group| {
                let info = CategoryGroup {
                    id: group.id,
                    name: group.name,
                    hidden: group.hidden,
                    deleted: group.deleted,
                };
                group
                    .categories
                    .into_iter()
                    .map(move |cat| cat.into_category(info.clone()))
            })
            .collect();

        Ok(categories)
    }

    /// Transactions dated on or after `since`
    pub async fn get_transactions_since(&self, since: NaiveDate) -> Result<Vec<Transaction>> {
        let since = since.format(DATE_FORMAT).to_string();
        let data: TransactionsData = self
            .get(
                &format!("budgets/{}/transactions", self.budget_id),
                &[("since_date", since)],
            )
            .await?;

        Ok(data
            .transactions
            .into_iter()
            .map(TransactionDto::into_transaction)
            .collect())
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let url = format!("{}/{}", self.base_url, path);
        debug!(%url, "YNAB request");

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(&self.api_token)
            .query(query)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = match serde_json::from_str::<ErrorEnvelope>(&body) {
                Ok(envelope) => format!("{}: {}", envelope.error.name, envelope.error.detail),
                Err(_) => body,
            };
            return Err(Error::Ynab {
                status: status.as_u16(),
                detail,
            });
        }

        let envelope: Envelope<T> = response.json().await?;
        Ok(envelope.data)
    }
}

#[async_trait]
impl BudgetProvider for YnabClient {
    async fn fetch_weekly_data(
        &self,
        week_start: NaiveDate,
        week_end: NaiveDate,
    ) -> Result<WeeklyData> {
        info!(
            budget_id = %self.budget_id,
            from = %week_start,
            to = %week_end,
            "Fetching weekly data"
        );

        let budget = self.get_budget().await?;
        let categories = self.get_categories().await?;
        let transactions = self.get_transactions_since(week_start).await?;

        info!(
            budget = %budget.name,
            categories = categories.len(),
            transactions = transactions.len(),
            "Retrieved weekly data"
        );

        Ok(WeeklyData {
            budget,
            categories,
            transactions,
            week_start,
            week_end,
        })
    }
}

// =============================================================================
// Wire types
// =============================================================================

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    name: String,
    #[serde(default)]
    detail: String,
}

#[derive(Debug, Deserialize)]
struct BudgetData {
    budget: BudgetDto,
}

#[derive(Debug, Deserialize)]
struct BudgetDto {
    id: String,
    name: String,
    #[serde(default)]
    last_modified_on: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct CategoriesData {
    category_groups: Vec<CategoryGroupDto>,
}

#[derive(Debug, Deserialize)]
struct CategoryGroupDto {
    id: String,
    name: String,
    #[serde(default)]
    hidden: bool,
    #[serde(default)]
    deleted: bool,
    #[serde(default)]
    categories: Vec<CategoryDto>,
}

#[derive(Debug, Deserialize)]
struct CategoryDto {
    id: String,
    category_group_id: String,
    name: String,
    #[serde(default)]
    hidden: bool,
    #[serde(default)]
    deleted: bool,
    budgeted: Milliunits,
    activity: Milliunits,
    balance: Milliunits,
}

impl CategoryDto {
    fn into_category(self, group: CategoryGroup) -> Category {
        Category {
            id: self.id,
            name: self.name,
            category_group_id: self.category_group_id,
            category_group: group,
            hidden: self.hidden,
            deleted: self.deleted,
            budgeted: self.budgeted,
            activity: self.activity,
            balance: self.balance,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TransactionsData {
    transactions: Vec<TransactionDto>,
}

#[derive(Debug, Deserialize)]
struct TransactionDto {
    id: String,
    date: Option<NaiveDate>,
    amount: Milliunits,
    memo: Option<String>,
    #[serde(default)]
    cleared: String,
    #[serde(default)]
    approved: bool,
    flag_color: Option<String>,
    #[serde(default)]
    account_id: String,
    #[serde(default)]
    account_name: String,
    payee_id: Option<String>,
    payee_name: Option<String>,
    category_id: Option<String>,
    category_name: Option<String>,
    transfer_account_id: Option<String>,
    import_id: Option<String>,
    #[serde(default)]
    deleted: bool,
}

impl TransactionDto {
    fn into_transaction(self) -> Transaction {
        Transaction {
            id: self.id,
            date: self.date,
            amount: self.amount,
            memo: self.memo.unwrap_or_default(),
            cleared: self.cleared,
            approved: self.approved,
            flag_color: self.flag_color,
            account_id: self.account_id,
            account_name: self.account_name,
            payee_id: self.payee_id,
            payee_name: self.payee_name.unwrap_or_default(),
            category_id: self.category_id,
            category_name: self.category_name.unwrap_or_default(),
            transfer_account_id: self.transfer_account_id,
            import_id: self.import_id,
            deleted: self.deleted,
        }
    }
}
