//! Sessions: identifiers, snapshots and the remote API contract.

pub mod api;
pub mod model;
pub mod repository;

pub use api::SessionApi;
pub use model::{SessionId, SessionSnapshot};
pub use repository::SessionIdRepository;
