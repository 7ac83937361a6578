pub mod database;
pub mod session;

pub use database::Database;
pub use session::Session;
