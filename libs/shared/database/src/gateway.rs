use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderValue, CONTENT_TYPE},
    Client, Response, StatusCode,
};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, error};
use uuid::Uuid;

use shared_config::AppConfig;

use crate::client::DatabaseClient;
use crate::error::DatabaseError;
use crate::result_set::{ResultSet, Row};
use crate::statement::Statement;

#[derive(Debug, Deserialize)]
struct QueryResponse {
    columns: Vec<String>,
    #[serde(default)]
    rows: Vec<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
struct ExecuteResponse {
    affected_rows: u64,
}

/// Talks to the SQL gateway in front of the hospital database over HTTP.
pub struct SqlGatewayClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl SqlGatewayClient {
    pub fn new(config: &AppConfig) -> Result<Self, DatabaseError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.db_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.db_gateway_url.trim_end_matches('/').to_string(),
            api_key: config.db_api_key.clone(),
        })
    }

    pub fn get_base_url(&self) -> &str {
        &self.base_url
    }

    fn get_headers(&self, request_id: &Uuid) -> Result<HeaderMap, DatabaseError> {
        let mut headers = HeaderMap::new();

        let api_key = HeaderValue::from_str(&self.api_key)
            .map_err(|e| DatabaseError::Connection(format!("invalid api key header: {}", e)))?;
        headers.insert("apikey", api_key);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let request_id = HeaderValue::from_str(&request_id.to_string())
            .map_err(|e| DatabaseError::Connection(e.to_string()))?;
        headers.insert("x-request-id", request_id);

        Ok(headers)
    }

    async fn post(&self, endpoint: &str, statement: &Statement) -> Result<Response, DatabaseError> {
        let url = format!("{}{}", self.base_url, endpoint);
        let request_id = Uuid::new_v4();
        debug!(%request_id, "Sending statement to {}: {}", url, statement.sql());

        let response = self
            .client
            .post(&url)
            .headers(self.get_headers(&request_id)?)
            .json(statement)
            .send()
            .await?;

        Ok(response)
    }

    async fn check_status(
        response: Response,
        fallback: fn(String) -> DatabaseError,
    ) -> Result<Response, DatabaseError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let error_text = response.text().await?;
        error!("Gateway error ({}): {}", status, error_text);

        Err(match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => DatabaseError::Auth(error_text),
            StatusCode::CONFLICT => DatabaseError::DuplicateKey(error_text),
            _ => fallback(format!("gateway error ({}): {}", status, error_text)),
        })
    }
}

fn cell_to_string(value: Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text,
        other => other.to_string(),
    }
}

#[async_trait]
impl DatabaseClient for SqlGatewayClient {
    async fn query(&self, statement: &Statement) -> Result<ResultSet, DatabaseError> {
        let response = self.post("/query", statement).await?;
        let response = Self::check_status(response, DatabaseError::Query).await?;

        let body: QueryResponse = response.json().await?;
        let records: Vec<Row> = body
            .rows
            .into_iter()
            .map(|row| row.into_iter().map(cell_to_string).collect())
            .collect();

        debug!("Query returned {} rows", records.len());
        Ok(ResultSet::from_parts(body.columns, records))
    }

    async fn execute(&self, statement: &Statement) -> Result<bool, DatabaseError> {
        let response = self.post("/execute", statement).await?;
        let response = Self::check_status(response, DatabaseError::Execution).await?;

        let body: ExecuteResponse = response.json().await?;
        debug!("Statement affected {} rows", body.affected_rows);
        Ok(body.affected_rows > 0)
    }
}
