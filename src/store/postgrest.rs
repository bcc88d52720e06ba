//! PostgREST (Supabase REST) row store client.
//!
//! Translates a [`Query`] into PostgREST query parameters:
//!
//! | Query term            | Parameter                      |
//! |-----------------------|--------------------------------|
//! | projection            | `select=a,b,c` (or `*`)        |
//! | `eq` / `gte` / `lte`  | `field=eq.value`               |
//! | `ilike`               | `field=ilike.*term*`           |
//! | ordering              | `order=date.desc,nba_id.asc`   |
//! | limit                 | `limit=n`                      |
//! | range `from..=to`     | `offset=from&limit=to-from+1`  |
//!
//! See: <https://postgrest.org/en/stable/references/api/tables_views.html>

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use super::{Query, RowStore, Window};
use crate::{CourtsideError, Result};

/// Request timeout for store calls.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Environment variable holding the store base URL.
pub const URL_ENV_VAR: &str = "SUPABASE_URL";

/// Environment variable holding the anonymous API key.
pub const KEY_ENV_VAR: &str = "SUPABASE_ANON_KEY";

/// Connection settings for a PostgREST endpoint.
#[derive(Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub url: String,
    pub anon_key: String,
}

impl std::fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreConfig")
            .field("url", &self.url)
            .field("anon_key", &"<redacted>")
            .finish()
    }
}

impl StoreConfig {
    /// Build a config, requiring both values to be present and non-blank.
    pub fn resolve(url: Option<String>, anon_key: Option<String>) -> Result<Self> {
        let url = url.filter(|u| !u.trim().is_empty());
        let anon_key = anon_key.filter(|k| !k.trim().is_empty());
        match (url, anon_key) {
            (Some(url), Some(anon_key)) => Ok(Self { url, anon_key }),
            _ => Err(CourtsideError::Configuration(format!(
                "missing store url or anon key (set {URL_ENV_VAR} and {KEY_ENV_VAR})"
            ))),
        }
    }

    /// Resolve from explicit values, falling back to the environment.
    pub fn resolve_with_env(url: Option<String>, anon_key: Option<String>) -> Result<Self> {
        Self::resolve(
            url.or_else(|| std::env::var(URL_ENV_VAR).ok()),
            anon_key.or_else(|| std::env::var(KEY_ENV_VAR).ok()),
        )
    }
}

/// Client for a PostgREST endpoint.
#[derive(Clone)]
pub struct PostgrestClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl PostgrestClient {
    /// Create a client for `{base_url}/rest/v1`.
    pub fn new(config: &StoreConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .user_agent(crate::version::user_agent())
            .build()
            .map_err(|e| CourtsideError::Configuration(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: config.url.trim_end_matches('/').to_owned(),
            api_key: config.anon_key.clone(),
        })
    }

    fn endpoint(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    async fn fetch(&self, query: &Query) -> Result<Vec<Value>> {
        let response = self
            .http
            .get(self.endpoint(&query.table))
            .query(&query_params(query))
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| CourtsideError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CourtsideError::Store {
                status: status.as_u16(),
                message: error_message(&body).unwrap_or_else(|| status.to_string()),
            });
        }

        response
            .json::<Vec<Value>>()
            .await
            .map_err(|e| CourtsideError::DataError(format!("invalid store response: {e}")))
    }
}

#[async_trait]
impl RowStore for PostgrestClient {
    fn name(&self) -> &str {
        "postgrest"
    }

    async fn query(&self, query: &Query) -> Result<Vec<Value>> {
        self.fetch(query).await
    }
}

/// PostgREST error body.
#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

fn error_message(body: &str) -> Option<String> {
    if let Ok(ErrorBody {
        message: Some(message),
    }) = serde_json::from_str(body)
    {
        return Some(message);
    }
    let trimmed = body.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

fn filter_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Render `query` as PostgREST query parameters.
pub(crate) fn query_params(query: &Query) -> Vec<(String, String)> {
    let mut params = Vec::new();

    let select = if query.columns.is_empty() {
        "*".to_owned()
    } else {
        query.columns.join(",")
    };
    params.push(("select".to_owned(), select));

    for filter in &query.filters {
        let mut value = filter_value(&filter.value);
        if filter.op == super::FilterOp::ILike {
            // `*` is PostgREST's URL-safe alias for `%`
            value = value.replace('%', "*");
        }
        params.push((filter.field.clone(), format!("{}.{value}", filter.op.as_str())));
    }

    if !query.order.is_empty() {
        let order = query
            .order
            .iter()
            .map(|o| format!("{}.{}", o.field, if o.ascending { "asc" } else { "desc" }))
            .collect::<Vec<_>>()
            .join(",");
        params.push(("order".to_owned(), order));
    }

    match query.window {
        Some(Window::Limit(n)) => params.push(("limit".to_owned(), n.to_string())),
        Some(Window::Range { from, to }) => {
            params.push(("offset".to_owned(), from.to_string()));
            params.push((
                "limit".to_owned(),
                (to.saturating_sub(from) + 1).to_string(),
            ));
        }
        None => {}
    }

    params
}

#[cfg(test)]
mod tests {
    use super::*;

    fn param<'a>(params: &'a [(String, String)], name: &str) -> Vec<&'a str> {
        params
            .iter()
            .filter(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    #[test]
    fn renders_projection_filters_order_limit() {
        let query = Query::table("darko_shiny_history")
            .select(&["nba_id", "date", "dpm"])
            .eq("active_roster", 1)
            .gte("date", "2024-01-01")
            .lte("date", "2024-01-08")
            .order("date", false)
            .limit(10_000);
        let params = query_params(&query);

        assert_eq!(param(&params, "select"), vec!["nba_id,date,dpm"]);
        assert_eq!(param(&params, "active_roster"), vec!["eq.1"]);
        assert_eq!(param(&params, "date"), vec!["gte.2024-01-01", "lte.2024-01-08"]);
        assert_eq!(param(&params, "order"), vec!["date.desc"]);
        assert_eq!(param(&params, "limit"), vec!["10000"]);
        assert!(param(&params, "offset").is_empty());
    }

    #[test]
    fn renders_range_as_offset_and_limit() {
        let query = Query::table("t").order("date", true).range(2000, 2999);
        let params = query_params(&query);
        assert_eq!(param(&params, "select"), vec!["*"]);
        assert_eq!(param(&params, "offset"), vec!["2000"]);
        assert_eq!(param(&params, "limit"), vec!["1000"]);
        assert_eq!(param(&params, "order"), vec!["date.asc"]);
    }

    #[test]
    fn ilike_uses_star_wildcards() {
        let query = Query::table("t").ilike("player_name", "%lebron%");
        let params = query_params(&query);
        assert_eq!(param(&params, "player_name"), vec!["ilike.*lebron*"]);
    }

    #[test]
    fn error_message_prefers_json_message() {
        assert_eq!(
            error_message(r#"{"code":"42703","message":"column x does not exist"}"#),
            Some("column x does not exist".to_string())
        );
        assert_eq!(error_message("  gateway timeout "), Some("gateway timeout".into()));
        assert_eq!(error_message(""), None);
    }

    #[test]
    fn store_config_requires_both_values() {
        let ok = StoreConfig::resolve(
            Some("https://example.supabase.co".into()),
            Some("anon-public-key".into()),
        )
        .unwrap();
        assert_eq!(ok.url, "https://example.supabase.co");
        assert_eq!(ok.anon_key, "anon-public-key");

        for (url, key) in [
            (None, None),
            (Some("https://example.supabase.co".to_string()), None),
            (None, Some("anon-public-key".to_string())),
            (Some("  ".to_string()), Some("anon-public-key".to_string())),
        ] {
            let err = StoreConfig::resolve(url, key).unwrap_err();
            assert!(err.to_string().contains("missing store url or anon key"));
        }
    }

    #[test]
    fn store_config_debug_redacts_key() {
        let config = StoreConfig {
            url: "https://example.supabase.co".into(),
            anon_key: "secret".into(),
        };
        assert!(!format!("{config:?}").contains("secret"));
    }
}
