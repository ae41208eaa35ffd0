//! HTTP surface for the inventory service.
//!
//! This module exposes a compact Axum router:
//!
//! - `POST /register` – Multipart registration (`inventory_name`, `description`, `photo`).
//! - `GET /inventory` – List every item.
//! - `GET|PUT|DELETE /inventory/:id` – Fetch, update (`name`/`description` JSON), or delete one item.
//! - `GET|PUT /inventory/:id/photo` – Download or replace the item photo.
//! - `POST /search` – Urlencoded lookup by `id`, optionally linking the photo (`has_photo=on`).
//! - `GET /RegisterForm.html`, `GET /SearchForm.html` – Bundled HTML forms.
//! - `GET /docs`, `GET /docs/catalog.json` – Generated API documentation.
//! - `GET /metrics` – Inventory activity counters.
//! - `GET /uploads/*` – Stored photo files.
//!
//! Handlers only translate between HTTP and [`InventoryApi`]; every rule lives in the service.

use crate::docs::{self, ApiCatalog, RegisterResponse};
use crate::inventory::{
    InventoryApi, InventoryError, Item, ItemPatch, NewItem, PhotoUpload, SearchRequest,
};
use crate::metrics::MetricsSnapshot;
use crate::photos::UPLOADS_ROUTE;
use axum::{
    Form, Json, Router,
    extract::{
        DefaultBodyLimit, Path, State,
        multipart::{Field, Multipart, MultipartError},
        rejection::JsonRejection,
    },
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::{services::ServeDir, trace::TraceLayer};

/// Largest request body accepted, sized for photo uploads.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Build the HTTP router exposing the inventory API surface.
///
/// `uploads_dir` is served read-only under [`UPLOADS_ROUTE`].
pub fn create_router<S>(service: Arc<S>, uploads_dir: impl AsRef<std::path::Path>) -> Router
where
    S: InventoryApi + 'static,
{
    Router::new()
        .route("/register", post(register_item::<S>))
        .route("/inventory", get(list_items::<S>))
        .route(
            "/inventory/:id",
            get(get_item::<S>)
                .put(update_item::<S>)
                .delete(delete_item::<S>),
        )
        .route(
            "/inventory/:id/photo",
            get(get_photo::<S>).put(update_photo::<S>),
        )
        .route("/search", post(search_item::<S>))
        .route("/metrics", get(get_metrics::<S>))
        .route("/RegisterForm.html", get(register_form))
        .route("/SearchForm.html", get(search_form))
        .route("/docs", get(get_docs))
        .route("/docs/catalog.json", get(get_docs_catalog))
        .with_state(service)
        .nest_service(UPLOADS_ROUTE, ServeDir::new(uploads_dir.as_ref()))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
}

/// Register a new item from a multipart form.
async fn register_item<S>(
    State(service): State<Arc<S>>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError>
where
    S: InventoryApi,
{
    let new_item = read_registration(multipart).await?;
    let item = service.register(new_item).await?;
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: format!("Item registered with ID: {}", item.id),
            id: item.id,
        }),
    ))
}

async fn read_registration(mut multipart: Multipart) -> Result<NewItem, AppError> {
    let mut new_item = NewItem::default();
    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "inventory_name" => new_item.name = Some(field.text().await?),
            "description" => new_item.description = Some(field.text().await?),
            "photo" => new_item.photo = Some(read_photo(field).await?),
            other => tracing::debug!(field = other, "Ignoring unknown registration field"),
        }
    }
    Ok(new_item)
}

async fn read_photo(field: Field<'_>) -> Result<PhotoUpload, AppError> {
    let file_name = field.file_name().map(str::to_string);
    let content_type = field.content_type().map(str::to_string);
    let bytes = field.bytes().await?.to_vec();
    Ok(PhotoUpload {
        bytes,
        content_type,
        file_name,
    })
}

async fn list_items<S>(State(service): State<Arc<S>>) -> Json<Vec<Item>>
where
    S: InventoryApi,
{
    Json(service.list().await)
}

async fn get_item<S>(
    State(service): State<Arc<S>>,
    Path(id): Path<String>,
) -> Result<Json<Item>, AppError>
where
    S: InventoryApi,
{
    Ok(Json(service.get(&id).await?))
}

/// Apply a JSON field update; empty strings leave fields as they are.
///
/// An unknown id answers 404 before the body is looked at.
async fn update_item<S>(
    State(service): State<Arc<S>>,
    Path(id): Path<String>,
    patch: Result<Json<ItemPatch>, JsonRejection>,
) -> Result<Json<Item>, AppError>
where
    S: InventoryApi,
{
    service.get(&id).await?;
    let Json(patch) = patch?;
    Ok(Json(service.update_fields(&id, patch).await?))
}

async fn get_photo<S>(
    State(service): State<Arc<S>>,
    Path(id): Path<String>,
) -> Result<Response, AppError>
where
    S: InventoryApi,
{
    let photo = service.get_photo(&id).await?;
    Ok(([(header::CONTENT_TYPE, photo.content_type)], photo.bytes).into_response())
}

/// Replace the photo with the multipart `photo` field, if one was sent.
async fn update_photo<S>(
    State(service): State<Arc<S>>,
    Path(id): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<Item>, AppError>
where
    S: InventoryApi,
{
    let mut photo = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some("photo") {
            photo = Some(read_photo(field).await?);
        }
    }
    Ok(Json(service.update_photo(&id, photo).await?))
}

async fn delete_item<S>(
    State(service): State<Arc<S>>,
    Path(id): Path<String>,
) -> Result<String, AppError>
where
    S: InventoryApi,
{
    let removed = service.delete(&id).await?;
    Ok(format!("Item {} deleted", removed.id))
}

/// Urlencoded body of `POST /search`.
#[derive(Deserialize)]
struct SearchForm {
    /// Identifier to look up.
    #[serde(default)]
    id: String,
    /// Checkbox value; `on` requests a photo link.
    #[serde(default, alias = "includePhoto")]
    has_photo: Option<String>,
}

async fn search_item<S>(
    State(service): State<Arc<S>>,
    Form(form): Form<SearchForm>,
) -> Result<Json<Item>, AppError>
where
    S: InventoryApi,
{
    let request = SearchRequest {
        include_photo: flag_enabled(form.has_photo.as_deref()),
        id: form.id,
    };
    Ok(Json(service.search(request).await?))
}

fn flag_enabled(value: Option<&str>) -> bool {
    value.is_some_and(|value| {
        matches!(
            value.trim().to_ascii_lowercase().as_str(),
            "on" | "true" | "1" | "yes"
        )
    })
}

async fn get_metrics<S>(State(service): State<Arc<S>>) -> Json<MetricsSnapshot>
where
    S: InventoryApi,
{
    Json(service.metrics_snapshot())
}

async fn register_form() -> Html<&'static str> {
    Html(include_str!("../static/RegisterForm.html"))
}

async fn search_form() -> Html<&'static str> {
    Html(include_str!("../static/SearchForm.html"))
}

async fn get_docs() -> Html<String> {
    Html(docs::render_html(&docs::catalog()))
}

async fn get_docs_catalog() -> Json<ApiCatalog> {
    Json(docs::catalog())
}

enum AppError {
    Inventory(InventoryError),
    Multipart(MultipartError),
    Json(JsonRejection),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            Self::Inventory(err) => {
                let status = match &err {
                    InventoryError::Validation(_) => StatusCode::BAD_REQUEST,
                    InventoryError::NotFound(_) => StatusCode::NOT_FOUND,
                    InventoryError::Storage(_) => {
                        tracing::error!(error = %err, "Photo storage failure");
                        StatusCode::INTERNAL_SERVER_ERROR
                    }
                };
                (status, err.to_string()).into_response()
            }
            Self::Multipart(err) => {
                tracing::debug!(error = %err, "Rejected multipart body");
                (err.status(), err.body_text()).into_response()
            }
            Self::Json(rejection) => rejection.into_response(),
        }
    }
}

impl From<InventoryError> for AppError {
    fn from(inner: InventoryError) -> Self {
        Self::Inventory(inner)
    }
}

impl From<JsonRejection> for AppError {
    fn from(inner: JsonRejection) -> Self {
        Self::Json(inner)
    }
}

impl From<MultipartError> for AppError {
    fn from(inner: MultipartError) -> Self {
        Self::Multipart(inner)
    }
}
