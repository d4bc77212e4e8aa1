//! Best-effort live status probing.
//!
//! There is no authenticated API available to the caller, so every check is a
//! heuristic over scraped HTML, JSON or plain text, usually fetched through a
//! public relay. The crate is layered leaves first:
//!
//! - [`fetcher`]: a single request with a hard deadline.
//! - [`relay`]: ordered relay fallback with linear backoff, built on [`retry`].
//! - [`probes`]: one classification strategy per platform plus the
//!   [`ProbeSet`] registry that dispatches on [`Platform`].
//! - [`avatar`]: profile picture lookup over the same relays.
//! - [`summary`]: short bio text from profile meta tags.
//!
//! Probing never fails: every network, timeout or parse problem degrades to
//! [`LiveSignal::Unknown`].

pub mod avatar;
pub mod error;
pub mod fetcher;
pub mod platform;
pub mod probes;
pub mod relay;
pub mod retry;
pub mod signal;
pub mod summary;
pub mod transport;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use avatar::{fallback_avatar_url, grab_avatar};
pub use error::FetchError;
pub use fetcher::fetch_bounded;
pub use platform::Platform;
pub use probes::{LiveProbe, ProbeConfig, ProbeSet};
pub use relay::{RelayKind, RelayResolver, RelayTemplate};
pub use retry::RetryPolicy;
pub use signal::{LiveSignal, ProbeResult};
pub use summary::{fetch_social_summary, grab_summary};
pub use transport::{FetchResponse, HttpTransport, ReqwestTransport};
