pub mod user;
pub mod show_theme;
pub mod astronomy_show;
pub mod dome;
pub mod show_session;
pub mod reservation;
pub mod ticket;

pub use user::User;
pub use show_theme::ShowTheme;
pub use astronomy_show::AstronomyShowRow;
pub use dome::PlanetariumDome;
pub use show_session::ShowSessionRow;
pub use reservation::Reservation;
pub use ticket::TicketRow;
