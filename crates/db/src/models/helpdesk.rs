//! Knowledge base and ticket models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use deskrelay_core::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Knowledge base
// ---------------------------------------------------------------------------

/// A row from the `kb_categories` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct KbCategory {
    pub id: DbId,
    pub name: String,
    pub icon: String,
    pub sort_order: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateKbCategory {
    pub name: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub sort_order: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateKbCategory {
    pub name: Option<String>,
    pub icon: Option<String>,
    pub sort_order: Option<i32>,
}

/// A row from the `kb_articles` table. `tags` is a JSON array.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct KbArticle {
    pub id: DbId,
    pub category_id: Option<DbId>,
    pub title: String,
    pub content: String,
    pub tags: String,
    pub is_pinned: bool,
    pub views: i32,
    pub author_id: Option<DbId>,
    pub author_name: String,
    pub from_ticket: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating an article. Tags arrive as a list and are stored as JSON.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateKbArticle {
    pub category_id: Option<DbId>,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_pinned: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateKbArticle {
    pub category_id: Option<DbId>,
    pub title: Option<String>,
    pub content: Option<String>,
    pub tags: Option<Vec<String>>,
    pub is_pinned: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct KbArticleFilter {
    pub category_id: Option<DbId>,
    /// Substring match on title, content or tags.
    pub search: Option<String>,
    pub pinned: Option<bool>,
}

/// Lightweight article entry for the most-viewed list.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct KbArticleViews {
    pub id: DbId,
    pub title: String,
    pub views: i32,
}

// ---------------------------------------------------------------------------
// Tickets
// ---------------------------------------------------------------------------

/// A row from the `tickets` table with its comment count.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Ticket {
    pub id: DbId,
    pub title: String,
    pub description: String,
    pub status: i32,
    pub priority: i32,
    pub category_id: Option<DbId>,
    /// JSON array of attachment paths.
    pub attachments: String,
    pub creator_id: DbId,
    pub creator_name: String,
    pub assigned_to: Option<DbId>,
    pub resolved_by: Option<DbId>,
    pub resolved_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub comment_count: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateTicket {
    pub title: String,
    pub description: String,
    pub priority: Option<i32>,
    pub category_id: Option<DbId>,
    #[serde(default)]
    pub attachments: Vec<String>,
}

/// Staff-only ticket changes.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTicket {
    pub status: Option<i32>,
    pub priority: Option<i32>,
    pub assigned_to: Option<DbId>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TicketFilter {
    pub status: Option<i32>,
    pub priority: Option<i32>,
    /// Restrict to tickets created by this user.
    pub creator_id: Option<DbId>,
}

/// A row from the `ticket_comments` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TicketComment {
    pub id: DbId,
    pub ticket_id: DbId,
    pub user_id: DbId,
    pub username: String,
    pub body: String,
    pub attachments: String,
    pub is_internal: bool,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateTicketComment {
    pub body: String,
    #[serde(default)]
    pub attachments: Vec<String>,
    #[serde(default)]
    pub is_internal: bool,
}

/// Request body for converting a ticket into an article.
#[derive(Debug, Clone, Deserialize)]
pub struct ConvertTicket {
    pub category_id: Option<DbId>,
    /// Defaults to the ticket title.
    pub title: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Ticket count for one status value.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TicketStatusCount {
    pub status: i32,
    pub count: i64,
}

/// Helpdesk dashboard figures.
#[derive(Debug, Clone, Serialize)]
pub struct HelpdeskStats {
    pub total_articles: i64,
    pub tickets_by_status: Vec<TicketStatusCount>,
    pub top_articles: Vec<KbArticleViews>,
}
