pub mod api_client;
pub mod types;

pub use api_client::{ApiClient, SocialApi};
pub use types::*;
