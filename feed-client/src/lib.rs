//! HTTP-шлюз ленты для работы с `feed-server`.
//!
//! [`HttpGateway`] реализует [`feed_core::RemoteGateway`] поверх `reqwest`
//! и подключается к [`feed_core::FeedController`]:
//!
//! ```no_run
//! # async fn demo() -> feed_core::FeedResult<()> {
//! use feed_client::HttpGateway;
//! use feed_core::{FeedConfig, FeedController};
//!
//! let gateway = HttpGateway::new("http://127.0.0.1:5000")?;
//! let feed = FeedController::new(gateway, FeedConfig::default());
//! feed.load_first_page().await?;
//! # Ok(())
//! # }
//! ```
#![warn(missing_docs)]

mod error;
mod http_gateway;

pub use http_gateway::{HttpGateway, HttpTimeouts};
