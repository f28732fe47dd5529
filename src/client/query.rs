use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::RemoteClient;
use crate::error::{ApiErrorBody, DataError};
use crate::filter::{Filter, FilterOp, SortDirection};

/// Fluent single-table request builder.
///
/// Builder steps record into a [`Filter`]; the first invalid identifier
/// poisons the builder and surfaces as `DataError::Validation` at execution
/// time, before any network call.
pub struct TableQuery {
    client: RemoteClient,
    filter: Result<Filter, DataError>,
}

impl TableQuery {
    pub(crate) fn new(client: RemoteClient, table: &str) -> Self {
        let filter = Filter::new(table).map_err(|e| DataError::Validation(e.to_string()));
        Self { client, filter }
    }

    pub fn select(mut self, projection: &str) -> Self {
        self.apply(|f| f.select(projection).map(|_| ()));
        self
    }

    pub fn eq(mut self, column: &str, value: impl AsRef<str>) -> Self {
        self.apply(|f| f.condition(column, FilterOp::Eq, value.as_ref()).map(|_| ()));
        self
    }

    pub fn gte(mut self, column: &str, value: impl AsRef<str>) -> Self {
        self.apply(|f| f.condition(column, FilterOp::Gte, value.as_ref()).map(|_| ()));
        self
    }

    pub fn lte(mut self, column: &str, value: impl AsRef<str>) -> Self {
        self.apply(|f| f.condition(column, FilterOp::Lte, value.as_ref()).map(|_| ()));
        self
    }

    pub fn in_list<I, S>(mut self, column: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.apply(|f| f.condition_in(column, values).map(|_| ()));
        self
    }

    pub fn order(mut self, column: &str, direction: SortDirection) -> Self {
        self.apply(|f| f.order(column, direction).map(|_| ()));
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.apply(|f| f.limit(limit).map(|_| ()));
        self
    }

    fn apply(
        &mut self,
        op: impl FnOnce(&mut Filter) -> Result<(), crate::filter::FilterError>,
    ) {
        if let Ok(filter) = self.filter.as_mut() {
            if let Err(e) = op(filter) {
                self.filter = Err(DataError::Validation(e.to_string()));
            }
        }
    }

    /// Fetch the matching row set. Success is always a concrete vector;
    /// an empty result is an empty vector, never null.
    pub async fn fetch<T: DeserializeOwned>(self) -> Result<Vec<T>, DataError> {
        let response = self.send(Method::GET, None, None).await?;
        let rows: Vec<T> = response
            .json()
            .await
            .map_err(|e| DataError::Decode(e.to_string()))?;
        Ok(rows)
    }

    /// Fetch at most one row (`maybe_single` cardinality).
    pub async fn fetch_maybe_single<T: DeserializeOwned>(self) -> Result<Option<T>, DataError> {
        let mut rows = self.limit(1).fetch::<T>().await?;
        Ok(if rows.is_empty() {
            None
        } else {
            Some(rows.swap_remove(0))
        })
    }

    /// Count matching rows without transferring them: HEAD request with
    /// `Prefer: count=exact`, count read from `Content-Range`.
    pub async fn count(self) -> Result<u64, DataError> {
        let response = self
            .send(Method::HEAD, None, Some("count=exact"))
            .await?;
        let range = response
            .headers()
            .get("content-range")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| DataError::Decode("count response missing Content-Range".to_string()))?;
        parse_content_range(range)
    }

    /// Insert one row and return it in this query's projection
    /// (`single` cardinality).
    pub async fn insert<T: DeserializeOwned>(self, payload: Value) -> Result<T, DataError> {
        let response = self
            .send(Method::POST, Some(payload), Some("return=representation"))
            .await?;
        single_row(response).await
    }

    /// Update the rows matched by this query's filters with the given
    /// payload and return the written row (`single` cardinality).
    pub async fn update<T: DeserializeOwned>(self, payload: Value) -> Result<T, DataError> {
        let response = self
            .send(Method::PATCH, Some(payload), Some("return=representation"))
            .await?;
        single_row(response).await
    }

    async fn send(
        self,
        method: Method,
        body: Option<Value>,
        prefer: Option<&str>,
    ) -> Result<reqwest::Response, DataError> {
        let filter = self.filter?;
        let url = self.client.rest_url(filter.table())?;

        let mut headers = HeaderMap::new();
        headers.insert(
            "apikey",
            HeaderValue::from_str(self.client.anon_key()?)
                .map_err(|_| DataError::Validation("anon key is not header-safe".to_string()))?,
        );
        let bearer = format!("Bearer {}", self.client.bearer()?);
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&bearer)
                .map_err(|_| DataError::Validation("access token is not header-safe".to_string()))?,
        );
        if let Some(prefer) = prefer {
            headers.insert("Prefer", HeaderValue::from_str(prefer).unwrap_or_else(|_| {
                HeaderValue::from_static("return=representation")
            }));
        }
        if body.is_some() {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }

        let mut request = self
            .client
            .http()
            .request(method, url)
            .headers(headers)
            .query(&filter.to_query_pairs())
            .timeout(self.client.config().request_timeout());
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        Err(classify_failure(status, response).await)
    }
}

/// Map a non-2xx backend response into the typed error taxonomy. This is
/// the single place permission denials are recognized.
async fn classify_failure(status: StatusCode, response: reqwest::Response) -> DataError {
    let text = response.text().await.unwrap_or_default();
    let body = serde_json::from_str::<ApiErrorBody>(&text).unwrap_or_else(|_| ApiErrorBody {
        code: None,
        message: if text.is_empty() { None } else { Some(text) },
        details: None,
        hint: None,
    });
    DataError::from_response(status.as_u16(), body)
}

async fn single_row<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, DataError> {
    let mut rows: Vec<T> = response
        .json()
        .await
        .map_err(|e| DataError::Decode(e.to_string()))?;
    match rows.len() {
        1 => Ok(rows.swap_remove(0)),
        n => Err(DataError::Decode(format!(
            "expected exactly one written row, backend returned {}",
            n
        ))),
    }
}

fn parse_content_range(range: &str) -> Result<u64, DataError> {
    // Shape: "0-24/3573" or "*/0" when the set is empty.
    range
        .rsplit('/')
        .next()
        .and_then(|total| total.parse::<u64>().ok())
        .ok_or_else(|| DataError::Decode(format!("unparseable Content-Range: {}", range)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_range_parses_total() {
        assert_eq!(parse_content_range("0-24/3573").unwrap(), 3573);
        assert_eq!(parse_content_range("*/0").unwrap(), 0);
        assert!(parse_content_range("garbage").is_err());
    }

    #[tokio::test]
    async fn invalid_column_fails_as_validation_without_network() {
        let client = RemoteClient::new(
            crate::config::BackendSettings::new("https://db.example.com", "anon"),
            crate::config::QueryConfig::default(),
        );
        let err = client
            .from("guards")
            .eq("bad column", "x")
            .fetch::<Value>()
            .await
            .unwrap_err();
        assert!(matches!(err, DataError::Validation(_)));
    }
}
