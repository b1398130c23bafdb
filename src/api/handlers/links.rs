//! Handlers for link creation and management.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use validator::Validate;

use crate::api::dto::{
    CreateLinkRequest, LimitParams, LinkListResponse, LinkResponse, ListParams, UpdateLinkRequest,
};
use crate::application::services::CreateLink;
use crate::domain::entities::LinkPatch;
use crate::domain::repositories::{LinkOrder, LinkQuery};
use crate::error::AppError;
use crate::state::AppState;

/// Creates a new short link.
///
/// # Endpoint
///
/// `POST /api/links`
///
/// Rate limited per client IP; see the router configuration.
pub async fn create_link_handler(
    State(state): State<AppState>,
    Json(body): Json<CreateLinkRequest>,
) -> Result<impl IntoResponse, AppError> {
    body.validate().map_err(|e| {
        AppError::bad_request("Invalid request body", json!({ "errors": e.to_string() }))
    })?;

    let link = state
        .link_service
        .create_link(CreateLink {
            target_url: body.target_url,
            custom_code: body.custom_code,
            title: body.title,
            description: body.description,
            expires_at: body.expires_at,
        })
        .await?;

    let short_url = state.link_service.short_url(&link.code);
    Ok((
        StatusCode::CREATED,
        Json(LinkResponse::from_link(link, short_url)),
    ))
}

/// Lists links with search, ordering, and pagination.
///
/// # Endpoint
///
/// `GET /api/links?page=&page_size=&search=&order_by=`
pub async fn list_links_handler(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, AppError> {
    let (page, page_size) = params
        .validate()
        .map_err(|msg| AppError::bad_request(msg, json!({})))?;

    let order = params
        .order_by
        .as_deref()
        .map(LinkOrder::parse)
        .unwrap_or_default();

    let query = LinkQuery::new(page, page_size)
        .with_search(params.search)
        .with_order(order);

    let (links, total) = state.link_service.list_links(query).await?;

    let items = links
        .into_iter()
        .map(|link| {
            let short_url = state.link_service.short_url(&link.code);
            LinkResponse::from_link(link, short_url)
        })
        .collect();

    Ok(Json(LinkListResponse {
        items,
        total,
        page,
        page_size,
    }))
}

/// Returns a single link by code.
///
/// # Endpoint
///
/// `GET /api/links/{code}`
pub async fn get_link_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let link = state.link_service.get_link(&code).await?;
    let short_url = state.link_service.short_url(&link.code);
    Ok(Json(LinkResponse::from_link(link, short_url)))
}

/// Partially updates a link. The code itself is immutable.
///
/// # Endpoint
///
/// `PATCH /api/links/{code}`
pub async fn update_link_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
    Json(body): Json<UpdateLinkRequest>,
) -> Result<impl IntoResponse, AppError> {
    let patch = LinkPatch {
        target_url: body.target_url,
        title: body.title,
        description: body.description,
        expires_at: body.expires_at,
        is_active: body.is_active,
    };

    let link = state.link_service.update_link(&code, patch).await?;
    let short_url = state.link_service.short_url(&link.code);
    Ok(Json(LinkResponse::from_link(link, short_url)))
}

/// Soft-deletes a link.
///
/// # Endpoint
///
/// `DELETE /api/links/{code}`
///
/// Returns `204 No Content` on success, `404` if the code is unknown or
/// already inactive. The resolution cache entry is invalidated before the
/// response, so the next resolve observes the deletion.
pub async fn delete_link_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    if state.link_service.soft_delete(&code).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found(
            "Short link not found",
            json!({ "code": code }),
        ))
    }
}

/// Most-clicked active links.
///
/// # Endpoint
///
/// `GET /api/links/popular?limit=N`
pub async fn popular_links_handler(
    State(state): State<AppState>,
    Query(params): Query<LimitParams>,
) -> Result<impl IntoResponse, AppError> {
    let limit = params.limit_or(10, 100);
    let query = LinkQuery::new(1, limit).with_order(LinkOrder::ClicksDesc);
    let (links, _) = state.link_service.list_links(query).await?;

    let items: Vec<LinkResponse> = links
        .into_iter()
        .map(|link| {
            let short_url = state.link_service.short_url(&link.code);
            LinkResponse::from_link(link, short_url)
        })
        .collect();

    Ok(Json(items))
}

/// Most recently created active links.
///
/// # Endpoint
///
/// `GET /api/links/recent?limit=N`
pub async fn recent_links_handler(
    State(state): State<AppState>,
    Query(params): Query<LimitParams>,
) -> Result<impl IntoResponse, AppError> {
    let limit = params.limit_or(10, 100);
    let query = LinkQuery::new(1, limit).with_order(LinkOrder::CreatedAtDesc);
    let (links, _) = state.link_service.list_links(query).await?;

    let items: Vec<LinkResponse> = links
        .into_iter()
        .map(|link| {
            let short_url = state.link_service.short_url(&link.code);
            LinkResponse::from_link(link, short_url)
        })
        .collect();

    Ok(Json(items))
}
