//! Smoke checks for the deployed API's CORS and method handling.
//!
//! Each check fetches once and then hands the captured response to a pure
//! `evaluate_*` function, so the verdicts can be tested without a network.

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE, ORIGIN};
use reqwest::Method;
use serde_json::Value;
use std::collections::BTreeMap;

pub const DEFAULT_ORIGIN: &str = "http://localhost:3000";

/// The parts of an HTTP response the checks look at. Header names are lowercase.
#[derive(Debug, Clone, Default)]
pub struct ProbeResponse {
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl ProbeResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn cors_headers(&self) -> impl Iterator<Item = (&String, &String)> {
        self.headers
            .iter()
            .filter(|(name, _)| name.starts_with("access-control"))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CheckResult {
    pub name: &'static str,
    pub passed: bool,
    pub details: Vec<String>,
}

impl CheckResult {
    fn new(name: &'static str, passed: bool, details: Vec<String>) -> Self {
        Self {
            name,
            passed,
            details,
        }
    }
}

pub const PREFLIGHT_CHECK: &str = "CORS Preflight";
pub const LISTING_CHECK: &str = "キャラクター一覧取得";
pub const INVALID_METHOD_CHECK: &str = "無効メソッド";

const REQUIRED_PREFLIGHT_HEADERS: [&str; 2] =
    ["Access-Control-Allow-Origin", "Access-Control-Allow-Methods"];

pub fn evaluate_preflight(response: &ProbeResponse) -> CheckResult {
    let mut details = Vec::new();
    if response.status != 200 {
        details.push(format!(
            "ステータスコード: {} (期待値: 200)",
            response.status
        ));
    }

    let missing: Vec<&str> = REQUIRED_PREFLIGHT_HEADERS
        .iter()
        .copied()
        .filter(|name| response.header(name).is_none())
        .collect();
    if !missing.is_empty() {
        details.push(format!("不足ヘッダー: {}", missing.join(", ")));
    }

    let passed = details.is_empty();
    details.extend(
        response
            .cors_headers()
            .map(|(name, value)| format!("{}: {}", name, value)),
    );
    CheckResult::new(PREFLIGHT_CHECK, passed, details)
}

pub fn evaluate_listing(response: &ProbeResponse) -> CheckResult {
    match response.status {
        200 => match serde_json::from_str::<Value>(&response.body) {
            Ok(Value::Array(characters)) => CheckResult::new(
                LISTING_CHECK,
                true,
                vec![format!("キャラクター数: {}", characters.len())],
            ),
            Ok(other) => CheckResult::new(
                LISTING_CHECK,
                false,
                vec![format!("予期しないデータ形式: {}", other)],
            ),
            Err(err) => CheckResult::new(
                LISTING_CHECK,
                false,
                vec![format!("JSON パースエラー: {}", err)],
            ),
        },
        401 => {
            let message = serde_json::from_str::<Value>(&response.body)
                .ok()
                .and_then(|body| body.get("error").and_then(Value::as_str).map(str::to_string))
                .unwrap_or_else(|| "認証が必要です".to_string());
            CheckResult::new(
                LISTING_CHECK,
                false,
                vec![
                    format!("認証エラー (401): {}", message),
                    "IDトークンが無効または期限切れの可能性があります".to_string(),
                ],
            )
        }
        status => CheckResult::new(
            LISTING_CHECK,
            false,
            vec![
                format!("予期しないステータスコード: {}", status),
                format!("レスポンス: {}", response.body),
            ],
        ),
    }
}

pub fn evaluate_invalid_method(response: &ProbeResponse) -> CheckResult {
    if response.status == 405 {
        CheckResult::new(INVALID_METHOD_CHECK, true, vec!["405 Method Not Allowed".to_string()])
    } else {
        CheckResult::new(
            INVALID_METHOD_CHECK,
            false,
            vec![format!(
                "期待するステータスコード: 405, 実際: {}",
                response.status
            )],
        )
    }
}

/// Runs the checks against `endpoint` (the API base URL, stage included).
pub struct CorsProbe {
    client: reqwest::Client,
    endpoint: String,
    id_token: Option<String>,
    origin: String,
    invalid_method: Method,
}

impl CorsProbe {
    pub fn new(endpoint: &str, id_token: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            id_token,
            origin: DEFAULT_ORIGIN.to_string(),
            invalid_method: Method::PATCH,
        }
    }

    pub fn with_origin(mut self, origin: &str) -> Self {
        self.origin = origin.to_string();
        self
    }

    /// Method sent by the invalid-method check; the endpoint must not serve it.
    pub fn with_invalid_method(mut self, method: Method) -> Self {
        self.invalid_method = method;
        self
    }

    fn default_headers(&self) -> anyhow::Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ORIGIN, HeaderValue::from_str(&self.origin)?);
        if let Some(token) = self.id_token.as_deref() {
            headers.insert(AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {}", token))?);
        }
        Ok(headers)
    }

    async fn fetch(
        &self,
        method: Method,
        path: &str,
        extra: &[(&'static str, &str)],
        body: Option<String>,
    ) -> anyhow::Result<ProbeResponse> {
        let url = format!("{}{}", self.endpoint, path);
        tracing::debug!("{} {}", method, url);

        let mut request = self
            .client
            .request(method, &url)
            .headers(self.default_headers()?);
        for (name, value) in extra {
            request = request.header(*name, *value);
        }
        if let Some(body) = body {
            request = request.body(body);
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_ascii_lowercase(),
                    value.to_str().unwrap_or_default().to_string(),
                )
            })
            .collect();
        let body = response.text().await?;

        Ok(ProbeResponse {
            status,
            headers,
            body,
        })
    }

    pub async fn preflight(&self) -> anyhow::Result<ProbeResponse> {
        self.fetch(
            Method::OPTIONS,
            "/characters",
            &[
                ("Access-Control-Request-Method", "GET"),
                ("Access-Control-Request-Headers", "authorization,content-type"),
            ],
            None,
        )
        .await
    }

    pub async fn list_characters(&self) -> anyhow::Result<ProbeResponse> {
        self.fetch(Method::GET, "/characters", &[], None).await
    }

    pub async fn unsupported_method(&self) -> anyhow::Result<ProbeResponse> {
        self.fetch(
            self.invalid_method.clone(),
            "/characters",
            &[],
            Some(r#"{"test":"data"}"#.to_string()),
        )
        .await
    }

    /// Runs every check in order; transport failures count as failed checks.
    pub async fn run_all(&self) -> Vec<CheckResult> {
        vec![
            settle(PREFLIGHT_CHECK, self.preflight().await, evaluate_preflight),
            settle(LISTING_CHECK, self.list_characters().await, evaluate_listing),
            settle(
                INVALID_METHOD_CHECK,
                self.unsupported_method().await,
                evaluate_invalid_method,
            ),
        ]
    }
}

fn settle(
    name: &'static str,
    response: anyhow::Result<ProbeResponse>,
    evaluate: fn(&ProbeResponse) -> CheckResult,
) -> CheckResult {
    match response {
        Ok(response) => evaluate(&response),
        Err(err) => {
            tracing::warn!("{} request failed: {:#}", name, err);
            CheckResult::new(name, false, vec![format!("リクエストエラー: {:#}", err)])
        }
    }
}

/// Number of passed checks.
pub fn passed_count(results: &[CheckResult]) -> usize {
    results.iter().filter(|result| result.passed).count()
}
