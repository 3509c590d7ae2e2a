//! HTTP gateway over a PostgREST-style REST datastore.

use api_types::{
    ErrorResponse,
    subscription::SubscriptionStatus,
    transaction::{TransactionNew, TransactionPatch, TransactionRow},
};
use engine::{
    EngineError, EntitlementProvider, LedgerGateway, Money, NewRecord, RecordId, RecordPatch,
    ResultEngine, TransactionKind, TransactionRecord, UserId, normalize_date,
};
use reqwest::{Method, RequestBuilder, Response, Url};

use crate::{
    config::AppConfig,
    error::{AppError, Result},
};

const TRANSACTIONS: &str = "rest/v1/transactions";
const SUBSCRIPTIONS: &str = "rest/v1/subscriptions";

#[derive(Debug)]
pub enum ClientError {
    Unauthorized,
    Forbidden,
    NotFound,
    Conflict(String),
    Validation(String),
    Server(String),
    Decode(String),
    Transport(reqwest::Error),
}

impl From<ClientError> for EngineError {
    fn from(err: ClientError) -> Self {
        let message = match err {
            ClientError::Unauthorized | ClientError::Forbidden => {
                "session expired or access denied".to_string()
            }
            ClientError::NotFound => "resource not found".to_string(),
            ClientError::Conflict(message) => format!("conflict: {message}"),
            ClientError::Validation(message) => format!("rejected by server: {message}"),
            ClientError::Server(message) => format!("server error: {message}"),
            ClientError::Decode(message) => format!("unexpected response: {message}"),
            ClientError::Transport(err) => format!("server unreachable: {err}"),
        };
        EngineError::OperationFailed(message)
    }
}

/// One user's view of the remote datastore.
#[derive(Debug, Clone)]
pub struct Client {
    base_url: Url,
    http: reqwest::Client,
    api_key: String,
    access_token: String,
    user: UserId,
}

impl Client {
    pub fn new(config: &AppConfig, user: UserId) -> Result<Self> {
        let mut base = config.base_url.clone();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base)
            .map_err(|err| AppError::Settings(format!("invalid base_url: {err}")))?;
        Ok(Self {
            base_url,
            http: reqwest::Client::new(),
            api_key: config.api_key.clone(),
            access_token: config.access_token.clone(),
            user,
        })
    }

    /// Authenticated request to `table`, not scoped to any user.
    fn unscoped(
        &self,
        method: Method,
        table: &str,
    ) -> std::result::Result<RequestBuilder, ClientError> {
        let endpoint = self
            .base_url
            .join(table)
            .map_err(|err| ClientError::Server(format!("invalid base_url: {err}")))?;
        Ok(self
            .http
            .request(method, endpoint)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.access_token))
    }

    /// Request to `table` restricted to `user`'s rows.
    fn scoped_to(
        &self,
        method: Method,
        table: &str,
        user: &UserId,
    ) -> std::result::Result<RequestBuilder, ClientError> {
        Ok(self
            .unscoped(method, table)?
            .query(&[("user_id", format!("eq.{user}"))]))
    }

    /// Request to `table` restricted to the signed-in user's rows.
    fn request(
        &self,
        method: Method,
        table: &str,
    ) -> std::result::Result<RequestBuilder, ClientError> {
        self.scoped_to(method, table, &self.user)
    }

    fn subscription_request(
        &self,
        user: &UserId,
    ) -> std::result::Result<RequestBuilder, ClientError> {
        Ok(self
            .scoped_to(Method::GET, SUBSCRIPTIONS, user)?
            .query(&[("select", "active")]))
    }

    async fn send(&self, request: RequestBuilder) -> std::result::Result<Response, ClientError> {
        let res = request
            .header("Prefer", "return=minimal")
            .send()
            .await
            .map_err(ClientError::Transport)?;
        if res.status().is_success() {
            return Ok(res);
        }

        let status = res.status();
        let body = res
            .json::<ErrorResponse>()
            .await
            .ok()
            .and_then(ErrorResponse::into_message)
            .unwrap_or_else(|| "unknown error".to_string());

        let err = match status.as_u16() {
            401 => ClientError::Unauthorized,
            403 => ClientError::Forbidden,
            404 => ClientError::NotFound,
            409 => ClientError::Conflict(body),
            400 | 422 => ClientError::Validation(body),
            _ => ClientError::Server(body),
        };
        Err(err)
    }

    async fn fetch_rows(&self) -> std::result::Result<Vec<TransactionRow>, ClientError> {
        let request = self
            .request(Method::GET, TRANSACTIONS)?
            .query(&[("order", "date.desc,id.desc")]);
        self.send(request)
            .await?
            .json::<Vec<TransactionRow>>()
            .await
            .map_err(|err| ClientError::Decode(err.to_string()))
    }
}

impl LedgerGateway for Client {
    async fn fetch_all(&self) -> ResultEngine<Vec<TransactionRecord>> {
        let rows = self.fetch_rows().await?;
        let fetched = rows.len();
        let records: Vec<TransactionRecord> = rows
            .into_iter()
            .filter_map(|row| {
                let id = row.id;
                record_from_row(row)
                    .map_err(|err| tracing::warn!("skipping row {id}: {err}"))
                    .ok()
            })
            .collect();
        tracing::debug!("fetched {} of {fetched} rows", records.len());
        Ok(records)
    }

    async fn insert(&self, record: &NewRecord) -> ResultEngine<()> {
        let payload = TransactionNew {
            user_id: self.user.to_string(),
            description: record.description.clone(),
            amount: record.amount.to_plain_string(),
            kind: record.kind.as_str().to_string(),
            date: record.date.format("%Y-%m-%d").to_string(),
        };
        // The insert body carries user_id itself, so no scoping filter.
        let request = self.unscoped(Method::POST, TRANSACTIONS)?.json(&payload);
        self.send(request).await?;
        Ok(())
    }

    async fn update(&self, id: RecordId, patch: &RecordPatch) -> ResultEngine<()> {
        let request = self
            .request(Method::PATCH, TRANSACTIONS)?
            .query(&[("id", format!("eq.{id}"))])
            .json(&patch_payload(patch));
        self.send(request).await?;
        Ok(())
    }

    async fn delete_one(&self, id: RecordId) -> ResultEngine<()> {
        let request = self
            .request(Method::DELETE, TRANSACTIONS)?
            .query(&[("id", format!("eq.{id}"))]);
        self.send(request).await?;
        Ok(())
    }

    async fn delete_many(&self, ids: &[RecordId]) -> ResultEngine<()> {
        let request = self
            .request(Method::DELETE, TRANSACTIONS)?
            .query(&[("id", id_list_filter(ids))]);
        self.send(request).await?;
        Ok(())
    }
}

impl EntitlementProvider for Client {
    async fn is_active(&self, user: &UserId) -> bool {
        let request = match self.subscription_request(user) {
            Ok(request) => request,
            Err(err) => {
                tracing::warn!("subscription lookup for {user} failed: {err:?}");
                return false;
            }
        };
        let rows = match self.send(request).await {
            Ok(res) => match res.json::<Vec<SubscriptionStatus>>().await {
                Ok(rows) => Some(rows),
                Err(err) => {
                    tracing::warn!("subscription lookup for {user} failed: {err}");
                    None
                }
            },
            Err(err) => {
                tracing::warn!("subscription lookup for {user} failed: {err:?}");
                None
            }
        };
        rows.and_then(|rows| rows.first().map(|row| row.active))
            .unwrap_or(false)
    }
}

fn record_from_row(row: TransactionRow) -> ResultEngine<TransactionRecord> {
    let amount = match &row.amount {
        serde_json::Value::Number(number) => Money::parse_lenient(&number.to_string()),
        serde_json::Value::String(text) => Money::parse_lenient(text),
        _ => Money::ZERO,
    };
    Ok(TransactionRecord {
        id: RecordId(row.id),
        description: row.description.unwrap_or_default(),
        amount,
        kind: TransactionKind::try_from(row.kind.as_str())?,
        date: normalize_date(&row.date)?,
    })
}

fn patch_payload(patch: &RecordPatch) -> TransactionPatch {
    TransactionPatch {
        description: patch.description.clone(),
        amount: patch.amount.map(Money::to_plain_string),
        kind: patch.kind.map(|kind| kind.as_str().to_string()),
        date: patch.date.map(|date| date.format("%Y-%m-%d").to_string()),
    }
}

/// PostgREST `in` filter: `in.(1,2,3)`.
fn id_list_filter(ids: &[RecordId]) -> String {
    let joined: Vec<String> = ids.iter().map(ToString::to_string).collect();
    format!("in.({})", joined.join(","))
}
