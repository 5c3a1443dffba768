//! Question answering handler
//!
//! `GET /query` reads the question from the query string; every other method
//! reads a JSON body. Either way the question is rendered into the prompt
//! template, sent to the chat endpoint once, and the reply is cleaned up by
//! the answer formatter.

use crate::error::AppError;
use crate::state::AppState;
use axum::{
    body::Bytes,
    extract::{rejection::QueryRejection, Query, State},
    http::Method,
    Json,
};
use ocs_core::{
    parse_answer, render_prompt, ChatPayload, OcsError, QuestionFields, Result as OcsResult,
};
use serde::{Deserialize, Deserializer, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Success message of every answered query
pub const SUCCESS_MESSAGE: &str = "AI回答成功";

/// Usage is not tracked
pub const TIMES_UNTRACKED: i64 = -1;

/// Query string parameters of `GET /query`
#[derive(Debug, Default)]
pub struct QueryParams {
    pub token: Option<String>,
    pub title: Option<String>,
    pub options: Option<String>,
    pub kind: Option<String>,
    pub more: Option<String>,
}

impl QueryParams {
    /// Collect known keys from decoded pairs; the first value of a repeated key wins
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut params = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "token" => &mut params.token,
                "title" => &mut params.title,
                "options" => &mut params.options,
                "type" => &mut params.kind,
                "more" => &mut params.more,
                _ => continue,
            };
            slot.get_or_insert(value);
        }
        params
    }
}

/// A question as submitted by the client
#[derive(Debug, Default, Deserialize)]
pub struct QueryRequest {
    /// Passed through untouched; no authentication is performed
    #[serde(default, deserialize_with = "nullable_string")]
    pub token: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub title: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub options: String,
    #[serde(default, rename = "type", deserialize_with = "nullable_string")]
    pub kind: String,
    /// Malformed values are treated as absent
    #[serde(default, deserialize_with = "lenient_bool")]
    pub more: Option<bool>,
}

impl From<QueryParams> for QueryRequest {
    fn from(params: QueryParams) -> Self {
        Self {
            token: params.token.unwrap_or_default(),
            title: params.title.unwrap_or_default(),
            options: params.options.unwrap_or_default(),
            kind: params.kind.unwrap_or_default(),
            more: params
                .more
                .filter(|s| !s.is_empty())
                .and_then(|s| parse_bool(&s)),
        }
    }
}

impl QueryRequest {
    /// Results are wrapped in an array only when `more` is explicitly true
    pub fn wants_results(&self) -> bool {
        self.more.unwrap_or(false)
    }

    fn fields(&self) -> QuestionFields<'_> {
        QuestionFields {
            title: &self.title,
            options: &self.options,
            kind: &self.kind,
        }
    }
}

/// Boolean spellings accepted for `more`
pub fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

fn nullable_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Bool(b) => Some(b),
        serde_json::Value::String(s) => parse_bool(&s),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(1) => Some(true),
            Some(0) => Some(false),
            _ => None,
        },
        _ => None,
    })
}

/// One answered question
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct QueryResult {
    pub question: String,
    pub answer: String,
}

/// Either a flat answer or a results array
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum QueryData {
    Single(QueryResult),
    Multiple { results: Vec<QueryResult> },
}

/// Successful query response
#[derive(Debug, Serialize)]
pub struct QueryResponse {
    pub code: i32,
    pub message: String,
    pub times: i64,
    pub data: QueryData,
}

impl QueryResponse {
    /// Shape an answer for `request`
    pub fn answered(request: &QueryRequest, answer: String) -> Self {
        let result = QueryResult {
            question: request.title.clone(),
            answer,
        };

        let data = if request.wants_results() {
            QueryData::Multiple {
                results: vec![result],
            }
        } else {
            QueryData::Single(result)
        };

        Self {
            code: 1,
            message: SUCCESS_MESSAGE.to_string(),
            times: TIMES_UNTRACKED,
            data,
        }
    }
}

/// Handle `/query` for any method
#[tracing::instrument(skip_all, fields(request_id = %uuid::Uuid::new_v4(), %method))]
pub async fn query_handler(
    State(state): State<Arc<AppState>>,
    method: Method,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
    body: Bytes,
) -> Result<Json<QueryResponse>, AppError> {
    let request = if method == Method::GET {
        let Query(pairs) = query.map_err(|e| {
            warn!(error = %e, "Failed to decode query string");
            AppError::BadRequest(format!("解析请求失败: {}", e.body_text()))
        })?;
        QueryRequest::from(QueryParams::from_pairs(pairs))
    } else {
        serde_json::from_slice::<QueryRequest>(&body).map_err(|e| {
            warn!(error = %e, "Failed to decode query body");
            AppError::BadRequest(format!("解析请求失败: {e}"))
        })?
    };

    if request.title.trim().is_empty() {
        warn!("Rejected query without title");
        return Err(OcsError::Validation("title".to_string()).into());
    }

    info!(
        title = %request.title,
        options = %request.options,
        kind = %request.kind,
        more = request.wants_results(),
        "Query received"
    );

    let answer = answer_question(&state, &request).await.map_err(|e| {
        warn!(kind = e.kind(), error = %e, "Query failed");
        AppError::from(e)
    })?;

    info!(title = %request.title, answer = %answer, "Query answered");

    Ok(Json(QueryResponse::answered(&request, answer)))
}

/// Render the prompt, call the chat endpoint once and clean up the reply
pub async fn answer_question(state: &AppState, request: &QueryRequest) -> OcsResult<String> {
    let settings = state.config.ai.resolve();
    let prompt = render_prompt(&settings.prompt_template, &request.fields());
    let payload = ChatPayload::new(&settings, prompt);

    info!(
        endpoint = %settings.base_url,
        model = %settings.model,
        "Forwarding question to chat endpoint"
    );

    let raw = state
        .chat_client
        .complete(&settings, &payload)
        .await?
        .into_answer()?;

    let formatted = parse_answer(&raw);
    if !formatted.answer.is_empty() {
        if let Some(analysis) = &formatted.analysis {
            debug!(analysis = %analysis, "Dropped analysis section");
        }
        return Ok(formatted.answer);
    }

    // Nothing precedes the marker, so the text after it is the only answer there is
    Ok(formatted
        .analysis
        .filter(|analysis| !analysis.is_empty())
        .unwrap_or(raw))
}
