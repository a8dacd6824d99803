use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::db::operations::statistics::MistakeCount;
use crate::response::AppError;
use crate::services::accounts;
use crate::services::reconciler::MistakeEntry;
use crate::services::statistics::{self, StatsScope};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/beautifier", get(beautify_query).post(beautify_json))
        .route("/mistakes", get(mistakes))
        .route("/statistics", get(statistics_by_type))
}

#[derive(Debug, Deserialize)]
struct BeautifyRequest {
    text: Option<String>,
    token: Option<String>,
}

#[derive(Serialize)]
struct BeautifyResponse {
    corrected_text: String,
    mistakes: Vec<MistakeEntry>,
    skipped: Vec<usize>,
}

#[derive(Debug, Deserialize)]
struct TokenQuery {
    token: Option<String>,
}

#[derive(Serialize)]
struct MistakesResponse {
    mistakes: Vec<MistakeCount>,
}

#[derive(Debug, Deserialize)]
struct StatisticsQuery {
    #[serde(rename = "type")]
    kind: Option<String>,
}

async fn beautify_query(
    State(state): State<AppState>,
    Query(request): Query<BeautifyRequest>,
) -> Result<Response, AppError> {
    beautify(&state, request).await
}

async fn beautify_json(
    State(state): State<AppState>,
    Json(request): Json<BeautifyRequest>,
) -> Result<Response, AppError> {
    beautify(&state, request).await
}

async fn beautify(state: &AppState, request: BeautifyRequest) -> Result<Response, AppError> {
    let text = request.text.unwrap_or_default();
    state.corrections().check_text(&text)?;

    let user_id = resolve_token(state, request.token.as_deref()).await?;
    let outcome = state.corrections().correct(&text, user_id).await?;

    Ok(Json(BeautifyResponse {
        corrected_text: outcome.corrected_text,
        mistakes: outcome.entries,
        skipped: outcome.skipped,
    })
    .into_response())
}

async fn mistakes(
    State(state): State<AppState>,
    Query(query): Query<TokenQuery>,
) -> Result<Response, AppError> {
    let scope = match resolve_token(&state, query.token.as_deref()).await? {
        Some(user_id) => StatsScope::User(user_id),
        None => StatsScope::Global,
    };
    let mistakes = statistics::mistake_listing(state.store(), scope).await?;
    Ok(Json(MistakesResponse { mistakes }).into_response())
}

async fn statistics_by_type(
    State(state): State<AppState>,
    Query(query): Query<StatisticsQuery>,
) -> Result<Response, AppError> {
    let rows: Vec<(String, i64)> = match query.kind.as_deref() {
        Some("lang") => statistics::stats_by_language(state.store(), StatsScope::Global)
            .await?
            .into_iter()
            .map(|row| (row.language, row.count))
            .collect(),
        Some("age") => statistics::stats_by_age(state.store())
            .await?
            .into_iter()
            .map(|row| (row.age_range, row.count))
            .collect(),
        _ => return Err(AppError::bad_request("Wrong type")),
    };

    Ok(Json(single_key_objects(rows)).into_response())
}

/// `None` for an absent or blank token; 404 for one that matches nobody.
async fn resolve_token(state: &AppState, token: Option<&str>) -> Result<Option<i64>, AppError> {
    let Some(token) = token.map(str::trim).filter(|t| !t.is_empty()) else {
        return Ok(None);
    };
    match accounts::user_for_api_token(state.store(), token).await? {
        Some(user) => Ok(Some(user.id)),
        None => Err(AppError::not_found("Wrong token")),
    }
}

fn single_key_objects(rows: Vec<(String, i64)>) -> Vec<Value> {
    rows.into_iter()
        .map(|(key, count)| {
            let mut object = Map::new();
            object.insert(key, Value::from(count));
            Value::Object(object)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_become_single_key_objects() {
        let values = single_key_objects(vec![("ru".to_string(), 5), ("en".to_string(), 2)]);
        assert_eq!(
            serde_json::to_string(&values).unwrap(),
            r#"[{"ru":5},{"en":2}]"#
        );
    }
}
