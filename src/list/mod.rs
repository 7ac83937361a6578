pub mod controller;
pub mod debounce;
pub mod in_flight;
pub mod state;

pub use controller::{ListController, ListQuery, PageSource};
pub use debounce::Debouncer;
pub use in_flight::InFlight;
pub use state::{FetchOutcome, ListSnapshot, LoadPhase, PaginationState};
