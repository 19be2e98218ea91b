use async_trait::async_trait;

use crate::error::FeedResult;
use crate::models::{FetchedPage, Item, ItemDraft, ItemPatch, ReactionKind};

/// Удалённый источник постов.
///
/// Реализация отвечает за таймауты; повторов нет ни здесь, ни в ядре.
#[async_trait]
pub trait RemoteGateway: Send + Sync {
    /// Страница постов со смещения `offset` размером `limit`.
    async fn fetch_page(&self, offset: u32, limit: u32) -> FeedResult<FetchedPage>;

    /// Один пост по id.
    async fn fetch_one(&self, id: i64) -> FeedResult<Item>;

    /// Создаёт пост; финальный id назначает сервер.
    async fn create_remote(&self, draft: ItemDraft) -> FeedResult<Item>;

    /// Частично обновляет пост.
    async fn update_remote(&self, patch: ItemPatch) -> FeedResult<Item>;

    /// Удаляет пост.
    async fn delete_remote(&self, id: i64) -> FeedResult<()>;

    /// Увеличивает счётчик `kind` на 1.
    ///
    /// Не идемпотентно: повторный вызов увеличит счётчик ещё раз.
    async fn react_remote(&self, id: i64, kind: ReactionKind) -> FeedResult<Item>;

    /// Полнотекстовый поиск постов.
    async fn search(&self, query: &str) -> FeedResult<FetchedPage>;

    /// Посты одного автора.
    async fn fetch_by_user(&self, user_id: i64) -> FeedResult<FetchedPage>;
}
