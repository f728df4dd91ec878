pub mod auth;
pub mod cleanup;
pub mod request_id;

pub use auth::*;
pub use cleanup::*;
pub use request_id::*;
