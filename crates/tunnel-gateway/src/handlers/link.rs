use crate::error::{AppError, Result};
use crate::model::{LinkInfo, NewLinkRequest, NewLinkResponse};
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use tunnel_core::{ShortCode, ShortenParams};

pub async fn create_link_handler(
    State(state): State<AppState>,
    Json(request): Json<NewLinkRequest>,
) -> Result<Json<NewLinkResponse>> {
    let custom = request
        .custom
        .filter(|custom| !custom.is_empty())
        .map(ShortCode::new)
        .transpose()?;

    let params = ShortenParams {
        url: request.url,
        custom,
        ttl_seconds: request.ttl,
    };
    let code = state.shortener().shorten(params).await?;

    Ok(Json(NewLinkResponse {
        short: code.to_url(state.base_url()),
        code: code.to_string(),
    }))
}

pub async fn redirect_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<Response> {
    // lookups of malformed codes simply miss
    let code = ShortCode::new_unchecked(code);
    let target = state
        .shortener()
        .resolve(&code)
        .await?
        .ok_or(AppError::NotFound("link not found"))?;

    Ok((StatusCode::MOVED_PERMANENTLY, [(header::LOCATION, target)]).into_response())
}

pub async fn show_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<LinkInfo>> {
    let code = ShortCode::new_unchecked(code);
    let info = state
        .shortener()
        .inspect(&code)
        .await?
        .ok_or(AppError::NotFound("no such code"))?;

    Ok(Json(info))
}
