use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use brief_core::{Article, Brief};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

const DEFAULT_LIST_LIMIT: usize = 7;
const MAX_LIST_LIMIT: usize = 100;

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub limit: Option<usize>,
}

fn parse_date(raw: &str) -> ApiResult<NaiveDate> {
    raw.parse::<NaiveDate>()
        .map_err(|_| ApiError::BadRequest(format!("expected a YYYY-MM-DD date, got {:?}", raw)))
}

pub async fn list_briefs(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<Vec<Brief>>> {
    let limit = params.limit.unwrap_or(DEFAULT_LIST_LIMIT).min(MAX_LIST_LIMIT);
    // recent_briefs excludes its bound, so start from tomorrow to include today
    let today = Utc::now().date_naive();
    let bound = today.succ_opt().unwrap_or(today);
    Ok(Json(state.storage.recent_briefs(bound, limit).await?))
}

pub async fn get_brief(
    State(state): State<Arc<AppState>>,
    Path(date): Path<String>,
) -> ApiResult<Json<Brief>> {
    let date = parse_date(&date)?;
    state
        .storage
        .get_brief(date)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("no brief for {}", date)))
}

pub async fn synthesize_brief(
    State(state): State<Arc<AppState>>,
    Path(date): Path<String>,
) -> ApiResult<Json<Brief>> {
    let date = parse_date(&date)?;
    let brief = state
        .synthesizer
        .run_for_day(state.storage.as_ref(), date, &state.domain)
        .await?;
    Ok(Json(brief))
}

pub async fn list_articles(
    State(state): State<Arc<AppState>>,
    Path(date): Path<String>,
) -> ApiResult<Json<Vec<Article>>> {
    let date = parse_date(&date)?;
    Ok(Json(state.storage.articles_for_day(date).await?))
}

pub async fn create_article(
    State(state): State<Arc<AppState>>,
    Json(article): Json<Article>,
) -> ApiResult<impl IntoResponse> {
    if article.url.trim().is_empty() || article.title.trim().is_empty() {
        return Err(ApiError::BadRequest("article needs a url and a title".to_string()));
    }
    state.storage.store_article(&article).await?;
    Ok((StatusCode::CREATED, Json(article)))
}
