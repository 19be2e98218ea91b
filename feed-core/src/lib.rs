//! Ядро ленты постов с оптимистичными мутациями.
//!
//! Клиент держит постранично загруженную ленту и применяет изменения
//! (создание, правка, удаление, реакции) локально ещё до ответа сервера:
//! - [`PageStore`] хранит страницы и заменяет их только целиком;
//! - [`RemoteGateway`] описывает удалённый источник постов;
//! - [`FeedController`] снимает снимок, применяет изменение, вызывает шлюз,
//!   при ошибке откатывается к снимку, при успехе сверяется с сервером;
//! - [`compute_next_cursor`] считает смещение следующей страницы.
#![warn(missing_docs)]

mod controller;
mod cursor;
mod error;
mod gateway;
mod ids;
mod models;
mod store;

#[cfg(test)]
mod testing;

pub use controller::{FeedConfig, FeedController, FeedStatus, MutationKind, MutationPhase};
pub use cursor::{compute_next_cursor, has_next_page};
pub use error::{FeedError, FeedResult};
pub use gateway::RemoteGateway;
pub use ids::{CLIENT_ID_FLOOR, ClientIdGenerator, is_client_id};
pub use models::{
    FetchedPage, Item, ItemDraft, ItemPatch, Page, PageCollection, ReactionKind, Reactions,
    image_url_for,
};
pub use store::PageStore;
