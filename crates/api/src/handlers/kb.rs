//! Knowledge base handlers: categories and articles.
//!
//! Any authenticated user may read. Writes need the staff role and deletes
//! need the super admin role.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use deskrelay_core::error::CoreError;
use deskrelay_core::helpdesk::require_text;
use deskrelay_core::types::DbId;
use deskrelay_db::models::helpdesk::{
    CreateKbArticle, CreateKbCategory, KbArticleFilter, UpdateKbArticle, UpdateKbCategory,
};
use deskrelay_db::repositories::{KbArticleRepo, KbCategoryRepo, UserRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::{RequireStaff, RequireSuperAdmin};
use crate::query::PageParams;
use crate::response::{DataResponse, PageResponse};
use crate::state::AppState;

fn article_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "KbArticle",
        id,
    })
}

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

/// GET /api/v1/helpdesk/categories
pub async fn list_categories(
    _auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let categories = KbCategoryRepo::list(&state.pool).await?;

    Ok(Json(DataResponse { data: categories }))
}

/// POST /api/v1/helpdesk/categories
pub async fn create_category(
    RequireStaff(staff): RequireStaff,
    State(state): State<AppState>,
    Json(mut input): Json<CreateKbCategory>,
) -> AppResult<impl IntoResponse> {
    input.name = require_text("name", &input.name)?;

    let category = KbCategoryRepo::create(&state.pool, &input).await?;

    tracing::info!(category_id = category.id, user_id = staff.user_id, "KB category created");

    Ok((StatusCode::CREATED, Json(DataResponse { data: category })))
}

/// PUT /api/v1/helpdesk/categories/{id}
pub async fn update_category(
    RequireStaff(staff): RequireStaff,
    State(state): State<AppState>,
    Path(category_id): Path<DbId>,
    Json(mut input): Json<UpdateKbCategory>,
) -> AppResult<impl IntoResponse> {
    if let Some(name) = &input.name {
        input.name = Some(require_text("name", name)?);
    }

    let category = KbCategoryRepo::update(&state.pool, category_id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "KbCategory",
            id: category_id,
        }))?;

    tracing::info!(category_id, user_id = staff.user_id, "KB category updated");

    Ok(Json(DataResponse { data: category }))
}

/// DELETE /api/v1/helpdesk/categories/{id}
///
/// Articles in the category are kept and become uncategorized.
pub async fn delete_category(
    RequireSuperAdmin(admin): RequireSuperAdmin,
    State(state): State<AppState>,
    Path(category_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    if !KbCategoryRepo::delete(&state.pool, category_id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "KbCategory",
            id: category_id,
        }));
    }

    tracing::info!(category_id, user_id = admin.user_id, "KB category deleted");

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Articles
// ---------------------------------------------------------------------------

/// GET /api/v1/helpdesk/articles
///
/// Paginated, pinned first then newest. Filters: `category_id`, `search`,
/// `pinned`.
pub async fn list_articles(
    _auth: AuthUser,
    State(state): State<AppState>,
    Query(page): Query<PageParams>,
    Query(filter): Query<KbArticleFilter>,
) -> AppResult<impl IntoResponse> {
    let window = page.window();
    let data = KbArticleRepo::list(&state.pool, &filter, window.limit, window.offset).await?;
    let total = KbArticleRepo::count(&state.pool, &filter).await?;

    Ok(Json(PageResponse {
        total,
        current: window.current,
        size: window.size,
        data,
    }))
}

/// GET /api/v1/helpdesk/articles/{id}
pub async fn get_article(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(article_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let article = KbArticleRepo::find_by_id(&state.pool, article_id)
        .await?
        .ok_or_else(|| article_not_found(article_id))?;

    Ok(Json(DataResponse { data: article }))
}

/// POST /api/v1/helpdesk/articles
pub async fn create_article(
    RequireStaff(staff): RequireStaff,
    State(state): State<AppState>,
    Json(mut input): Json<CreateKbArticle>,
) -> AppResult<impl IntoResponse> {
    input.title = require_text("title", &input.title)?;
    input.content = require_text("content", &input.content)?;

    let author_name = UserRepo::find_by_id(&state.pool, staff.user_id)
        .await?
        .map(|u| u.username)
        .unwrap_or_default();

    let article =
        KbArticleRepo::create(&state.pool, &input, staff.user_id, &author_name, None).await?;

    tracing::info!(article_id = article.id, user_id = staff.user_id, "KB article created");

    Ok((StatusCode::CREATED, Json(DataResponse { data: article })))
}

/// PUT /api/v1/helpdesk/articles/{id}
pub async fn update_article(
    RequireStaff(staff): RequireStaff,
    State(state): State<AppState>,
    Path(article_id): Path<DbId>,
    Json(mut input): Json<UpdateKbArticle>,
) -> AppResult<impl IntoResponse> {
    if let Some(title) = &input.title {
        input.title = Some(require_text("title", title)?);
    }
    if let Some(content) = &input.content {
        input.content = Some(require_text("content", content)?);
    }

    let article = KbArticleRepo::update(&state.pool, article_id, &input)
        .await?
        .ok_or_else(|| article_not_found(article_id))?;

    tracing::info!(article_id, user_id = staff.user_id, "KB article updated");

    Ok(Json(DataResponse { data: article }))
}

/// POST /api/v1/helpdesk/articles/{id}/view
pub async fn record_article_view(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(article_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    if !KbArticleRepo::increment_views(&state.pool, article_id).await? {
        return Err(article_not_found(article_id));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/helpdesk/articles/{id}
pub async fn delete_article(
    RequireSuperAdmin(admin): RequireSuperAdmin,
    State(state): State<AppState>,
    Path(article_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    if !KbArticleRepo::delete(&state.pool, article_id).await? {
        return Err(article_not_found(article_id));
    }

    tracing::info!(article_id, user_id = admin.user_id, "KB article deleted");

    Ok(StatusCode::NO_CONTENT)
}
