//! Safefeed clients.
//!
//! Both clients are generic over their HTTP backend so they can be tested
//! without a server. Use [`DefaultSafefeedClient`] or
//! [`DefaultSyncSafefeedClient`] in production code.

#[cfg(feature = "aio")]
mod aio;
#[cfg(feature = "blocking")]
mod blocking;

#[cfg(feature = "aio")]
pub use aio::SafefeedClient;
#[cfg(feature = "blocking")]
pub use blocking::SyncSafefeedClient;

// ============================================================================
// Type Aliases
// ============================================================================

/// Async client using the reqwest backend.
#[cfg(feature = "aio")]
pub type DefaultSafefeedClient = SafefeedClient<crate::http::ReqwestBackend>;

/// Blocking client using reqwest's blocking backend.
#[cfg(feature = "blocking")]
pub type DefaultSyncSafefeedClient = SyncSafefeedClient<crate::http::BlockingReqwestBackend>;
