//! Client side of the focus service: wire types, the [`SessionService`]
//! seam, and its HTTP implementation.

pub mod client;
pub mod error;
pub mod http;
pub mod traits;
pub mod types;

pub use client::FocusServiceClient;
pub use error::RemoteError;
pub use traits::SessionService;
pub use types::{parse_stats_body, ActivityKind, TelemetrySample};
