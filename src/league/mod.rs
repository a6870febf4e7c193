pub mod retention;
pub mod service;
pub mod standings;

pub use service::LeagueService;
