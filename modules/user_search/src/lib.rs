// === PUBLIC CONTRACT ===
pub mod contract;

pub use contract::{client, error, model};

// === MODULE WIRING ===
pub mod config;
pub mod module;
pub use config::UserSearchConfig;
pub use module::UserSearch;

// === INTERNAL MODULES ===
// Exposed for the CLI front-end and integration tests; prefer `contract` and
// the coordinator re-exports below.
#[doc(hidden)]
pub mod domain;
#[doc(hidden)]
pub mod gateways;
#[doc(hidden)]
pub mod infra;

pub use domain::coordinator::{RequestSeq, SearchCoordinator, SearchState};
pub use domain::view::{mask_ssn, ResultView, SortOrder};
