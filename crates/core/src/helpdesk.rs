//! Helpdesk rules: ticket lifecycle values, field validation and the
//! ticket-to-article conversion.

use crate::error::CoreError;

pub const TICKET_STATUS_OPEN: i32 = 1;
pub const TICKET_STATUS_IN_PROGRESS: i32 = 2;
pub const TICKET_STATUS_RESOLVED: i32 = 3;

pub const PRIORITY_LOW: i32 = 1;
pub const PRIORITY_MEDIUM: i32 = 2;
pub const PRIORITY_HIGH: i32 = 3;
pub const PRIORITY_CRITICAL: i32 = 4;

pub const DEFAULT_PRIORITY: i32 = PRIORITY_MEDIUM;

/// Number of articles reported in the most-viewed list.
pub const TOP_ARTICLES: i64 = 5;

pub fn validate_status(status: i32) -> Result<(), CoreError> {
    if !(TICKET_STATUS_OPEN..=TICKET_STATUS_RESOLVED).contains(&status) {
        return Err(CoreError::Validation(format!(
            "Status must be between {TICKET_STATUS_OPEN} and {TICKET_STATUS_RESOLVED}"
        )));
    }
    Ok(())
}

pub fn validate_priority(priority: i32) -> Result<(), CoreError> {
    if !(PRIORITY_LOW..=PRIORITY_CRITICAL).contains(&priority) {
        return Err(CoreError::Validation(format!(
            "Priority must be between {PRIORITY_LOW} and {PRIORITY_CRITICAL}"
        )));
    }
    Ok(())
}

/// Require a non-blank text field, returning it trimmed.
pub fn require_text(field: &str, value: &str) -> Result<String, CoreError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}

/// A public comment carried into a converted article.
#[derive(Debug, Clone)]
pub struct ConvertedComment<'a> {
    pub author: &'a str,
    pub body: &'a str,
}

/// Markdown body for an article created from a ticket.
///
/// The ticket description becomes the problem section. Public comments, in
/// the order given, become the solution section, which is omitted when
/// there are none.
pub fn article_content_from_ticket(description: &str, comments: &[ConvertedComment<'_>]) -> String {
    let mut content = format!("## Problem\n\n{description}\n\n");
    if !comments.is_empty() {
        content.push_str("## Solution\n\n");
        for c in comments {
            content.push_str(&format!("**{}:** {}\n\n", c.author, c.body));
        }
    }
    content
}
