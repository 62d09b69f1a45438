//! Helpdesk routes (knowledge base and tickets), mounted at `/helpdesk`.

use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::handlers::{kb, tickets};
use crate::state::AppState;

/// ```text
/// GET    /categories                               -> list_categories
/// POST   /categories                               -> create_category (staff)
/// PUT    /categories/{id}                          -> update_category (staff)
/// DELETE /categories/{id}                          -> delete_category (super admin)
///
/// GET    /articles                                 -> list_articles
/// POST   /articles                                 -> create_article (staff)
/// GET    /articles/{id}                            -> get_article
/// PUT    /articles/{id}                            -> update_article (staff)
/// DELETE /articles/{id}                            -> delete_article (super admin)
/// POST   /articles/{id}/view                       -> record_article_view
///
/// GET    /tickets                                  -> list_tickets
/// POST   /tickets                                  -> create_ticket
/// GET    /tickets/{id}                             -> get_ticket
/// PUT    /tickets/{id}                             -> update_ticket (staff)
/// DELETE /tickets/{id}                             -> delete_ticket (super admin)
/// POST   /tickets/{id}/resolve                     -> resolve_ticket (staff)
/// POST   /tickets/{id}/convert                     -> convert_ticket (staff)
/// GET    /tickets/{id}/comments                    -> list_comments
/// POST   /tickets/{id}/comments                    -> add_comment
/// DELETE /tickets/{id}/comments/{comment_id}       -> delete_comment
///
/// GET    /stats                                    -> helpdesk_stats (staff)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/categories",
            get(kb::list_categories).post(kb::create_category),
        )
        .route(
            "/categories/{id}",
            put(kb::update_category).delete(kb::delete_category),
        )
        .route("/articles", get(kb::list_articles).post(kb::create_article))
        .route(
            "/articles/{id}",
            get(kb::get_article)
                .put(kb::update_article)
                .delete(kb::delete_article),
        )
        .route("/articles/{id}/view", post(kb::record_article_view))
        .route(
            "/tickets",
            get(tickets::list_tickets).post(tickets::create_ticket),
        )
        .route(
            "/tickets/{id}",
            get(tickets::get_ticket)
                .put(tickets::update_ticket)
                .delete(tickets::delete_ticket),
        )
        .route("/tickets/{id}/resolve", post(tickets::resolve_ticket))
        .route("/tickets/{id}/convert", post(tickets::convert_ticket))
        .route(
            "/tickets/{id}/comments",
            get(tickets::list_comments).post(tickets::add_comment),
        )
        .route(
            "/tickets/{id}/comments/{comment_id}",
            delete(tickets::delete_comment),
        )
        .route("/stats", get(tickets::helpdesk_stats))
}
