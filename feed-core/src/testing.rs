use std::ops::RangeInclusive;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::error::{FeedError, FeedResult};
use crate::gateway::RemoteGateway;
use crate::models::fixtures::item;
use crate::models::{FetchedPage, Item, ItemDraft, ItemPatch, ReactionKind, Reactions};

/// Шлюз в памяти: держит серверную коллекцию, записывает вызовы мутаций,
/// по запросу отвечает ошибкой или задерживает вызов.
#[derive(Clone, Default)]
pub(crate) struct FakeGateway {
    posts: Arc<Mutex<Vec<Item>>>,
    mutation_calls: Arc<Mutex<Vec<String>>>,
    fail_mutations: Arc<Mutex<Option<FeedError>>>,
    fail_next_mutation: Arc<Mutex<Option<FeedError>>>,
    fail_fetches: Arc<Mutex<Option<FeedError>>>,
    mutation_hold: Arc<Mutex<Option<Arc<Notify>>>>,
    fetch_hold: Arc<Mutex<Option<Arc<Notify>>>>,
    mutation_entered: Arc<Notify>,
    fetch_entered: Arc<Notify>,
}

impl FakeGateway {
    pub(crate) fn with_posts(ids: RangeInclusive<i64>) -> Self {
        let gateway = Self::default();
        *gateway.posts.lock().expect("posts mutex poisoned") =
            ids.map(|id| item(id, 0)).collect();
        gateway
    }

    pub(crate) fn set_likes(&self, id: i64, likes: u32) {
        let mut posts = self.posts.lock().expect("posts mutex poisoned");
        if let Some(post) = posts.iter_mut().find(|post| post.id == id) {
            post.reactions.likes = likes;
        }
    }

    pub(crate) fn fail_mutations(&self, err: FeedError) {
        *self
            .fail_mutations
            .lock()
            .expect("fail_mutations mutex poisoned") = Some(err);
    }

    /// Ошибкой ответит только следующий вызов мутации.
    pub(crate) fn fail_next_mutation(&self, err: FeedError) {
        *self
            .fail_next_mutation
            .lock()
            .expect("fail_next_mutation mutex poisoned") = Some(err);
    }

    pub(crate) fn fail_fetches(&self, err: FeedError) {
        *self.fail_fetches.lock().expect("fail_fetches mutex poisoned") = Some(err);
    }

    /// Следующий вызов мутации ждёт, пока не будет уведомлён возвращённый `Notify`.
    pub(crate) fn hold_next_mutation(&self) -> Arc<Notify> {
        let release = Arc::new(Notify::new());
        *self
            .mutation_hold
            .lock()
            .expect("mutation_hold mutex poisoned") = Some(Arc::clone(&release));
        release
    }

    /// Следующая загрузка страницы ждёт, пока не будет уведомлён возвращённый `Notify`.
    pub(crate) fn hold_next_fetch(&self) -> Arc<Notify> {
        let release = Arc::new(Notify::new());
        *self.fetch_hold.lock().expect("fetch_hold mutex poisoned") = Some(Arc::clone(&release));
        release
    }

    /// Срабатывает, когда задержанный вызов мутации начал ждать.
    pub(crate) fn mutation_entered(&self) -> &Notify {
        &self.mutation_entered
    }

    /// Срабатывает, когда задержанная загрузка страницы начала ждать.
    pub(crate) fn fetch_entered(&self) -> &Notify {
        &self.fetch_entered
    }

    pub(crate) fn mutation_calls(&self) -> Vec<String> {
        self.mutation_calls
            .lock()
            .expect("mutation_calls mutex poisoned")
            .clone()
    }

    async fn enter_mutation(&self, call: String) -> FeedResult<()> {
        self.mutation_calls
            .lock()
            .expect("mutation_calls mutex poisoned")
            .push(call);
        let fail_this = self
            .fail_next_mutation
            .lock()
            .expect("fail_next_mutation mutex poisoned")
            .take();

        let hold = self
            .mutation_hold
            .lock()
            .expect("mutation_hold mutex poisoned")
            .take();
        if let Some(release) = hold {
            self.mutation_entered.notify_one();
            release.notified().await;
        }

        if let Some(err) = fail_this {
            return Err(err);
        }
        match self
            .fail_mutations
            .lock()
            .expect("fail_mutations mutex poisoned")
            .clone()
        {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn not_found(id: i64) -> FeedError {
        FeedError::Network {
            status: 404,
            message: format!("Post with id '{id}' not found"),
        }
    }

    fn page_of(items: Vec<Item>) -> FetchedPage {
        let total = items.len() as u64;
        FetchedPage { items, total }
    }
}

#[async_trait]
impl RemoteGateway for FakeGateway {
    async fn fetch_page(&self, offset: u32, limit: u32) -> FeedResult<FetchedPage> {
        let hold = self.fetch_hold.lock().expect("fetch_hold mutex poisoned").take();
        if let Some(release) = hold {
            self.fetch_entered.notify_one();
            release.notified().await;
        }

        if let Some(err) = self
            .fail_fetches
            .lock()
            .expect("fail_fetches mutex poisoned")
            .clone()
        {
            return Err(err);
        }

        let posts = self.posts.lock().expect("posts mutex poisoned");
        let items = posts
            .iter()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect();
        Ok(FetchedPage {
            items,
            total: posts.len() as u64,
        })
    }

    async fn fetch_one(&self, id: i64) -> FeedResult<Item> {
        self.posts
            .lock()
            .expect("posts mutex poisoned")
            .iter()
            .find(|post| post.id == id)
            .cloned()
            .ok_or_else(|| Self::not_found(id))
    }

    async fn create_remote(&self, draft: ItemDraft) -> FeedResult<Item> {
        self.enter_mutation(format!("create {}", draft.title)).await?;

        let mut posts = self.posts.lock().expect("posts mutex poisoned");
        let id = posts.iter().map(|post| post.id).max().unwrap_or(0) + 1;
        let created = Item {
            id,
            title: draft.title,
            body: draft.body,
            tags: draft.tags,
            user_id: draft.user_id,
            reactions: Reactions::default(),
            views: 0,
            image_url: None,
        };
        posts.insert(0, created.clone());
        Ok(created)
    }

    async fn update_remote(&self, patch: ItemPatch) -> FeedResult<Item> {
        self.enter_mutation(format!("update {}", patch.id)).await?;

        let mut posts = self.posts.lock().expect("posts mutex poisoned");
        let post = posts
            .iter_mut()
            .find(|post| post.id == patch.id)
            .ok_or_else(|| Self::not_found(patch.id))?;
        *post = patch.apply_to(post);
        Ok(post.clone())
    }

    async fn delete_remote(&self, id: i64) -> FeedResult<()> {
        self.enter_mutation(format!("delete {id}")).await?;

        let mut posts = self.posts.lock().expect("posts mutex poisoned");
        let before = posts.len();
        posts.retain(|post| post.id != id);
        if posts.len() == before {
            return Err(Self::not_found(id));
        }
        Ok(())
    }

    async fn react_remote(&self, id: i64, kind: ReactionKind) -> FeedResult<Item> {
        self.enter_mutation(format!("react {id} {kind:?}")).await?;

        let mut posts = self.posts.lock().expect("posts mutex poisoned");
        let post = posts
            .iter_mut()
            .find(|post| post.id == id)
            .ok_or_else(|| Self::not_found(id))?;
        post.reactions = post.reactions.incremented(kind);
        Ok(post.clone())
    }

    async fn search(&self, query: &str) -> FeedResult<FetchedPage> {
        let posts = self.posts.lock().expect("posts mutex poisoned");
        Ok(Self::page_of(
            posts
                .iter()
                .filter(|post| post.title.contains(query) || post.body.contains(query))
                .cloned()
                .collect(),
        ))
    }

    async fn fetch_by_user(&self, user_id: i64) -> FeedResult<FetchedPage> {
        let posts = self.posts.lock().expect("posts mutex poisoned");
        Ok(Self::page_of(
            posts
                .iter()
                .filter(|post| post.user_id == user_id)
                .cloned()
                .collect(),
        ))
    }
}
