pub mod show_themes;
pub mod astronomy_shows;
pub mod planetarium_domes;
pub mod reservations;
pub mod show_sessions;
pub mod tickets;
pub mod users;

use axum::Router;
use std::sync::Arc;

pub fn routes() -> Router<Arc<crate::AppState>> {
    Router::new()
        .merge(show_themes::routes())
        .merge(astronomy_shows::routes())
        .merge(planetarium_domes::routes())
        .merge(reservations::routes())
        .merge(show_sessions::routes())
        .merge(tickets::routes())
        .merge(users::routes())
}
