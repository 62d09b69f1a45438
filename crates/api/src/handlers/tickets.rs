//! Support ticket handlers: tickets, comments, conversion to articles and
//! helpdesk statistics.
//!
//! Users see and comment on their own tickets. Staff see every ticket,
//! including internal comments, and may update, resolve and convert them.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use deskrelay_core::error::CoreError;
use deskrelay_core::helpdesk::{
    article_content_from_ticket, require_text, validate_priority, validate_status,
    ConvertedComment, TOP_ARTICLES,
};
use deskrelay_core::types::DbId;
use deskrelay_db::models::helpdesk::{
    ConvertTicket, CreateKbArticle, CreateTicket, CreateTicketComment, HelpdeskStats, Ticket,
    TicketFilter, UpdateTicket,
};
use deskrelay_db::models::user::User;
use deskrelay_db::repositories::{KbArticleRepo, TicketCommentRepo, TicketRepo, UserRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::{RequireAuth, RequireStaff, RequireSuperAdmin};
use crate::query::PageParams;
use crate::response::{DataResponse, PageResponse};
use crate::state::AppState;

fn ticket_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Ticket",
        id,
    })
}

/// Load a ticket the caller may see: staff see all, users only their own.
async fn visible_ticket(state: &AppState, auth: &AuthUser, ticket_id: DbId) -> AppResult<Ticket> {
    let ticket = TicketRepo::find_by_id(&state.pool, ticket_id)
        .await?
        .ok_or_else(|| ticket_not_found(ticket_id))?;

    if !auth.is_staff() && ticket.creator_id != auth.user_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "You can only access your own tickets".into(),
        )));
    }
    Ok(ticket)
}

async fn author(state: &AppState, auth: &AuthUser) -> AppResult<User> {
    UserRepo::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized("Unknown user".into())))
}

// ---------------------------------------------------------------------------
// Tickets
// ---------------------------------------------------------------------------

/// GET /api/v1/helpdesk/tickets
///
/// Paginated, highest priority first then newest. Filters: `status`,
/// `priority`, and for staff `creator_id`. Users only see their own tickets.
pub async fn list_tickets(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(page): Query<PageParams>,
    Query(mut filter): Query<TicketFilter>,
) -> AppResult<impl IntoResponse> {
    if !auth.is_staff() {
        filter.creator_id = Some(auth.user_id);
    }

    let window = page.window();
    let data = TicketRepo::list(&state.pool, &filter, window.limit, window.offset).await?;
    let total = TicketRepo::count(&state.pool, &filter).await?;

    Ok(Json(PageResponse {
        total,
        current: window.current,
        size: window.size,
        data,
    }))
}

/// GET /api/v1/helpdesk/tickets/{id}
pub async fn get_ticket(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(ticket_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let ticket = visible_ticket(&state, &auth, ticket_id).await?;

    Ok(Json(DataResponse { data: ticket }))
}

/// POST /api/v1/helpdesk/tickets
pub async fn create_ticket(
    RequireAuth(auth): RequireAuth,
    State(state): State<AppState>,
    Json(mut input): Json<CreateTicket>,
) -> AppResult<impl IntoResponse> {
    input.title = require_text("title", &input.title)?;
    input.description = require_text("description", &input.description)?;
    if let Some(priority) = input.priority {
        validate_priority(priority)?;
    }

    let creator = author(&state, &auth).await?;
    let ticket = TicketRepo::create(&state.pool, &input, creator.id, &creator.username).await?;

    tracing::info!(ticket_id = ticket.id, user_id = creator.id, priority = ticket.priority, "Ticket created");

    Ok((StatusCode::CREATED, Json(DataResponse { data: ticket })))
}

/// PUT /api/v1/helpdesk/tickets/{id}
///
/// Change status, priority or assignee.
pub async fn update_ticket(
    RequireStaff(staff): RequireStaff,
    State(state): State<AppState>,
    Path(ticket_id): Path<DbId>,
    Json(input): Json<UpdateTicket>,
) -> AppResult<impl IntoResponse> {
    if let Some(status) = input.status {
        validate_status(status)?;
    }
    if let Some(priority) = input.priority {
        validate_priority(priority)?;
    }

    let ticket = TicketRepo::update(&state.pool, ticket_id, &input)
        .await?
        .ok_or_else(|| ticket_not_found(ticket_id))?;

    tracing::info!(ticket_id, user_id = staff.user_id, status = ticket.status, "Ticket updated");

    Ok(Json(DataResponse { data: ticket }))
}

/// POST /api/v1/helpdesk/tickets/{id}/resolve
pub async fn resolve_ticket(
    RequireStaff(staff): RequireStaff,
    State(state): State<AppState>,
    Path(ticket_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let ticket = TicketRepo::resolve(&state.pool, ticket_id, staff.user_id, Utc::now())
        .await?
        .ok_or_else(|| ticket_not_found(ticket_id))?;

    tracing::info!(ticket_id, user_id = staff.user_id, "Ticket resolved");

    Ok(Json(DataResponse { data: ticket }))
}

/// DELETE /api/v1/helpdesk/tickets/{id}
///
/// Deletes the ticket and its comments in one transaction.
pub async fn delete_ticket(
    RequireSuperAdmin(admin): RequireSuperAdmin,
    State(state): State<AppState>,
    Path(ticket_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    if !TicketRepo::delete_with_comments(&state.pool, ticket_id).await? {
        return Err(ticket_not_found(ticket_id));
    }

    tracing::info!(ticket_id, user_id = admin.user_id, "Ticket deleted");

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Comments
// ---------------------------------------------------------------------------

/// GET /api/v1/helpdesk/tickets/{id}/comments
///
/// Oldest first. Internal comments are only returned to staff.
pub async fn list_comments(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(ticket_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    visible_ticket(&state, &auth, ticket_id).await?;

    let comments =
        TicketCommentRepo::list_by_ticket(&state.pool, ticket_id, auth.is_staff()).await?;

    Ok(Json(DataResponse { data: comments }))
}

/// POST /api/v1/helpdesk/tickets/{id}/comments
///
/// The internal flag is ignored for non-staff authors.
pub async fn add_comment(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(ticket_id): Path<DbId>,
    Json(mut input): Json<CreateTicketComment>,
) -> AppResult<impl IntoResponse> {
    visible_ticket(&state, &auth, ticket_id).await?;
    input.body = require_text("body", &input.body)?;

    let is_internal = input.is_internal && auth.is_staff();
    let commenter = author(&state, &auth).await?;
    let comment = TicketCommentRepo::create(
        &state.pool,
        ticket_id,
        commenter.id,
        &commenter.username,
        &input,
        is_internal,
    )
    .await?;

    tracing::info!(ticket_id, comment_id = comment.id, user_id = commenter.id, is_internal, "Ticket comment added");

    Ok((StatusCode::CREATED, Json(DataResponse { data: comment })))
}

/// DELETE /api/v1/helpdesk/tickets/{id}/comments/{comment_id}
///
/// Allowed for the comment author and for staff.
pub async fn delete_comment(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((ticket_id, comment_id)): Path<(DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    let comment = TicketCommentRepo::find_by_id(&state.pool, comment_id)
        .await?
        .filter(|c| c.ticket_id == ticket_id)
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "TicketComment",
            id: comment_id,
        }))?;

    if comment.user_id != auth.user_id && !auth.is_staff() {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only the author or staff may delete a comment".into(),
        )));
    }

    TicketCommentRepo::delete(&state.pool, comment_id).await?;

    tracing::info!(ticket_id, comment_id, user_id = auth.user_id, "Ticket comment deleted");

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Conversion and statistics
// ---------------------------------------------------------------------------

/// POST /api/v1/helpdesk/tickets/{id}/convert
///
/// Create a knowledge base article from the ticket description and its
/// public comments.
pub async fn convert_ticket(
    RequireStaff(staff): RequireStaff,
    State(state): State<AppState>,
    Path(ticket_id): Path<DbId>,
    Json(input): Json<ConvertTicket>,
) -> AppResult<impl IntoResponse> {
    let ticket = TicketRepo::find_by_id(&state.pool, ticket_id)
        .await?
        .ok_or_else(|| ticket_not_found(ticket_id))?;
    let comments = TicketCommentRepo::list_by_ticket(&state.pool, ticket_id, false).await?;

    let converted: Vec<ConvertedComment<'_>> = comments
        .iter()
        .map(|c| ConvertedComment {
            author: &c.username,
            body: &c.body,
        })
        .collect();

    let title = match input.title.as_deref() {
        Some(title) => require_text("title", title)?,
        None => ticket.title.clone(),
    };
    let article = CreateKbArticle {
        category_id: input.category_id.or(ticket.category_id),
        title,
        content: article_content_from_ticket(&ticket.description, &converted),
        tags: input.tags,
        is_pinned: false,
    };

    let converter = author(&state, &staff).await?;
    let article = KbArticleRepo::create(
        &state.pool,
        &article,
        converter.id,
        &converter.username,
        Some(ticket.id),
    )
    .await?;

    tracing::info!(ticket_id, article_id = article.id, user_id = staff.user_id, "Ticket converted to article");

    Ok((StatusCode::CREATED, Json(DataResponse { data: article })))
}

/// GET /api/v1/helpdesk/stats
pub async fn helpdesk_stats(
    _staff: RequireStaff,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let stats = HelpdeskStats {
        total_articles: KbArticleRepo::count_all(&state.pool).await?,
        tickets_by_status: TicketRepo::count_by_status(&state.pool).await?,
        top_articles: KbArticleRepo::most_viewed(&state.pool, TOP_ARTICLES).await?,
    };

    Ok(Json(DataResponse { data: stats }))
}
