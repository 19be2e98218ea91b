use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, info, warn};

use crate::cursor::{compute_next_cursor, has_next_page};
use crate::error::{FeedError, FeedResult};
use crate::gateway::RemoteGateway;
use crate::ids::ClientIdGenerator;
use crate::models::{FetchedPage, Item, ItemDraft, ItemPatch, Page, PageCollection, ReactionKind};
use crate::store::PageStore;

const DEFAULT_PAGE_SIZE: u32 = 10;

#[derive(Debug, Clone)]
/// Настройки контроллера ленты.
pub struct FeedConfig {
    /// Размер страницы при загрузке.
    pub page_size: u32,
    /// Выполнять сверку с сервером сразу после успешной мутации.
    ///
    /// Если `false`, сверку запускает вызывающий код через
    /// [`FeedController::reconcile_if_pending`].
    pub reconcile_after_mutation: bool,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            reconcile_after_mutation: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Состояние загрузки для отображения.
pub struct FeedStatus {
    /// Идёт хотя бы одна загрузка страниц.
    pub loading: bool,
    /// Последняя ошибка загрузки или мутации.
    pub error: Option<String>,
    /// После успешной мутации ещё не было сверки с сервером.
    pub reconcile_pending: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Вид оптимистичной мутации.
pub enum MutationKind {
    /// Создание поста.
    Create,
    /// Частичное обновление поста.
    Update,
    /// Удаление поста.
    Delete,
    /// Реакция на пост.
    React,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Фаза одной мутации.
///
/// `Idle -> SnapshotTaken -> SpeculativeApplied -> {RemoteSucceeded | RemoteFailed} -> Terminal`
pub enum MutationPhase {
    /// Мутация ещё не начата.
    Idle,
    /// Снимок страниц сохранён.
    SnapshotTaken,
    /// Локальное изменение установлено в хранилище.
    SpeculativeApplied,
    /// Шлюз подтвердил изменение.
    RemoteSucceeded,
    /// Шлюз вернул ошибку, снимок восстановлен.
    RemoteFailed,
    /// Вызов завершён.
    Terminal,
}

/// Копия страниц до локального изменения; принадлежит одной мутации.
struct MutationSnapshot {
    pages: PageCollection,
}

/// Счётчик, уменьшаемый при выходе из области видимости.
struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::AcqRel);
        Self(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

/// Контроллер оптимистичных мутаций поверх хранилища страниц.
///
/// Каждая мутация снимает снимок страниц, сразу применяет изменение локально,
/// вызывает удалённый шлюз и при ошибке целиком восстанавливает снимок.
/// После успеха лента сверяется с сервером загрузкой заново с первой страницы.
///
/// Параллельные мутации допустимы: у каждой свой снимок. Две мутации одного
/// и того же элемента гоняются между собой, выигрывает последняя запись.
pub struct FeedController<G: RemoteGateway> {
    gateway: Arc<G>,
    store: Arc<PageStore>,
    config: FeedConfig,
    ids: ClientIdGenerator,
    generation: AtomicU64,
    server_pages: AtomicUsize,
    fetches: AtomicUsize,
    mutations: AtomicUsize,
    reconcile_pending: AtomicBool,
    last_error: Mutex<Option<String>>,
}

impl<G: RemoteGateway> FeedController<G> {
    /// Создаёт контроллер с собственным пустым хранилищем.
    pub fn new(gateway: G, config: FeedConfig) -> Self {
        Self::with_store(gateway, Arc::new(PageStore::new()), config)
    }

    /// Создаёт контроллер поверх переданного хранилища.
    pub fn with_store(gateway: G, store: Arc<PageStore>, config: FeedConfig) -> Self {
        let config = FeedConfig {
            page_size: config.page_size.max(1),
            ..config
        };

        Self {
            gateway: Arc::new(gateway),
            store,
            config,
            ids: ClientIdGenerator::new(),
            generation: AtomicU64::new(0),
            server_pages: AtomicUsize::new(0),
            fetches: AtomicUsize::new(0),
            mutations: AtomicUsize::new(0),
            reconcile_pending: AtomicBool::new(false),
            last_error: Mutex::new(None),
        }
    }

    /// Хранилище, которое читает отображение.
    pub fn store(&self) -> &Arc<PageStore> {
        &self.store
    }

    /// Текущие страницы.
    pub fn pages(&self) -> PageCollection {
        self.store.get_pages()
    }

    /// Плоский список видимых элементов.
    pub fn items(&self) -> Vec<Item> {
        self.store.get_pages().items()
    }

    /// `true`, если у последней страницы есть курсор.
    pub fn has_next_page(&self) -> bool {
        has_next_page(&self.store.get_pages())
    }

    /// Состояние загрузки и последняя ошибка.
    pub fn status(&self) -> FeedStatus {
        FeedStatus {
            loading: self.fetches.load(Ordering::Acquire) > 0,
            error: self
                .last_error
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone(),
            reconcile_pending: self.reconcile_pending.load(Ordering::Acquire),
        }
    }

    /// Загружает первую страницу и заменяет ею всё содержимое хранилища.
    ///
    /// Результат отбрасывается, если загрузку обогнала другая загрузка или
    /// мутация, а также пока хотя бы одна мутация ждёт ответа шлюза.
    pub async fn load_first_page(&self) -> FeedResult<()> {
        let generation = self.start_fetch();
        let _loading = InFlight::enter(&self.fetches);

        let page = self.fetch_page_at(0).await?;
        let installed = self.store.replace_if(|_| {
            self.may_install(generation)
                .then(|| PageCollection::new(vec![page]))
        });
        if !installed {
            debug!(generation, "first page superseded, result ignored");
            return Ok(());
        }

        self.server_pages.store(1, Ordering::Release);
        self.clear_error();
        Ok(())
    }

    /// Догружает следующую страницу по курсору последней страницы.
    ///
    /// При пустом хранилище загружает первую страницу; если страниц больше нет,
    /// ничего не делает.
    pub async fn load_next_page(&self) -> FeedResult<()> {
        let current = self.store.get_pages();
        if current.is_empty() {
            return self.load_first_page().await;
        }
        let Some(cursor) = current.last_cursor() else {
            debug!("no next page");
            return Ok(());
        };

        let generation = self.start_fetch();
        let _loading = InFlight::enter(&self.fetches);

        let page = self.fetch_page_at(cursor).await?;
        let installed = self.store.replace_if(|current| {
            self.may_install(generation)
                .then(|| current.clone().with_appended(page))
        });
        if !installed {
            debug!(generation, cursor, "next page superseded, result ignored");
            return Ok(());
        }

        self.server_pages.fetch_add(1, Ordering::AcqRel);
        self.clear_error();
        Ok(())
    }

    /// Сверяет ленту с сервером: заново загружает с первой страницы столько
    /// страниц, сколько было загружено, и целиком заменяет ими хранилище.
    ///
    /// Результат не устанавливается, если за время загрузки началась мутация
    /// или другая загрузка, или если мутация ещё ждёт ответа шлюза; тогда
    /// сверка остаётся ожидающей. При `reconcile_after_mutation` её выполнит
    /// последняя завершившаяся мутация, в том числе откатившаяся.
    pub async fn reconcile(&self) -> FeedResult<()> {
        let generation = self.start_fetch();
        let _loading = InFlight::enter(&self.fetches);

        let wanted = self.server_pages.load(Ordering::Acquire).max(1);
        let mut collection = PageCollection::default();
        let mut cursor = Some(0);
        let mut fetched = 0;

        while let Some(offset) = cursor {
            if fetched == wanted {
                break;
            }
            let page = self.fetch_page_at(offset).await?;
            cursor = page.next_cursor;
            collection = collection.with_appended(page);
            fetched += 1;
        }

        let items = collection.item_count();
        let installed = self
            .store
            .replace_if(|_| self.may_install(generation).then_some(collection));
        if !installed {
            debug!(generation, "reconciliation superseded, result ignored");
            return Ok(());
        }

        info!(pages = fetched, items, "feed reconciled");
        self.server_pages.store(fetched, Ordering::Release);
        self.reconcile_pending.store(false, Ordering::Release);
        self.clear_error();
        Ok(())
    }

    /// Запускает сверку, только если после успешной мутации её ещё не было.
    pub async fn reconcile_if_pending(&self) -> FeedResult<()> {
        if !self.reconcile_pending.load(Ordering::Acquire) {
            return Ok(());
        }
        self.reconcile().await
    }

    /// Сбрасывает хранилище и отменяет незавершённые загрузки.
    pub fn invalidate(&self) {
        self.store.replace_if(|_| {
            self.start_fetch();
            Some(PageCollection::default())
        });
        self.server_pages.store(0, Ordering::Release);
        self.reconcile_pending.store(false, Ordering::Release);
        self.clear_error();
    }

    /// Создаёт пост.
    ///
    /// Пока шлюз не ответил, пост виден первой страницей с клиентским id
    /// и нулевыми счётчиками. Возвращает пост в версии сервера.
    pub async fn create_item(&self, draft: ItemDraft) -> FeedResult<Item> {
        let draft = draft.validate()?;
        let optimistic = draft.clone().into_optimistic_item(self.ids.next_id());
        debug!(client_id = optimistic.id, "optimistic item prepared");

        self.mutate(
            MutationKind::Create,
            move |pages| {
                let page = Page {
                    items: vec![optimistic],
                    next_cursor: pages.first_cursor(),
                };
                Ok(pages.with_prepended(page))
            },
            || self.gateway.create_remote(draft),
        )
        .await
    }

    /// Частично обновляет пост: поля патча побеждают.
    pub async fn update_item(&self, patch: ItemPatch) -> FeedResult<Item> {
        let patch = patch.validate()?;
        let id = patch.id;
        let local = patch.clone();

        self.mutate(
            MutationKind::Update,
            move |pages| {
                pages
                    .with_item_replaced(id, |item| local.apply_to(item))
                    .ok_or(FeedError::NotFound(id))
            },
            || self.gateway.update_remote(patch),
        )
        .await
    }

    /// Удаляет пост.
    pub async fn delete_item(&self, id: i64) -> FeedResult<()> {
        self.mutate(
            MutationKind::Delete,
            move |pages| pages.without_item(id).ok_or(FeedError::NotFound(id)),
            || self.gateway.delete_remote(id),
        )
        .await
    }

    /// Увеличивает счётчик реакции `kind` на 1.
    pub async fn react_to_item(&self, id: i64, kind: ReactionKind) -> FeedResult<Item> {
        self.mutate(
            MutationKind::React,
            move |pages| {
                pages
                    .with_item_replaced(id, |item| Item {
                        reactions: item.reactions.incremented(kind),
                        ..item.clone()
                    })
                    .ok_or(FeedError::NotFound(id))
            },
            || self.gateway.react_remote(id, kind),
        )
        .await
    }

    /// Поиск постов. Хранилище не меняется.
    pub async fn search(&self, query: &str) -> FeedResult<Vec<Item>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(FeedError::InvalidRequest(
                "search query must not be empty".to_string(),
            ));
        }
        Ok(self.gateway.search(query).await?.items)
    }

    /// Посты одного автора. Хранилище не меняется.
    pub async fn items_by_user(&self, user_id: i64) -> FeedResult<Vec<Item>> {
        Ok(self.gateway.fetch_by_user(user_id).await?.items)
    }

    async fn mutate<T, Fut>(
        &self,
        kind: MutationKind,
        apply: impl FnOnce(&PageCollection) -> FeedResult<PageCollection>,
        remote: impl FnOnce() -> Fut,
    ) -> FeedResult<T>
    where
        Fut: Future<Output = FeedResult<T>>,
    {
        let outcome = {
            let _mutation = InFlight::enter(&self.mutations);

            // снимок, отмена загрузок и локальное изменение под одной блокировкой
            let snapshot = self.store.try_replace(|current| {
                let speculative = apply(current)?;
                self.start_fetch();
                Ok::<_, FeedError>((
                    speculative,
                    MutationSnapshot {
                        pages: current.clone(),
                    },
                ))
            })?;
            trace_phase(kind, MutationPhase::SnapshotTaken);
            trace_phase(kind, MutationPhase::SpeculativeApplied);

            match remote().await {
                Ok(value) => {
                    // загрузки, начатые до подтверждения, видели сервер без этой мутации
                    self.start_fetch();
                    drop(snapshot);
                    trace_phase(kind, MutationPhase::RemoteSucceeded);
                    self.reconcile_pending.store(true, Ordering::Release);
                    Ok(value)
                }
                Err(err) => {
                    self.store.replace_if(|_| {
                        self.start_fetch();
                        Some(snapshot.pages)
                    });
                    trace_phase(kind, MutationPhase::RemoteFailed);
                    warn!(?kind, error = %err, "mutation failed, snapshot restored");
                    Err(err)
                }
            }
        };

        if outcome.is_ok() {
            self.clear_error();
        }

        // откат мог затереть изменения мутаций, завершившихся за это время
        if self.config.reconcile_after_mutation && self.reconcile_pending.load(Ordering::Acquire)
        {
            if let Err(err) = self.reconcile().await {
                warn!(?kind, error = %err, "reconciliation after mutation failed");
                self.record_error(&err);
            }
        }

        if let Err(err) = &outcome {
            self.record_error(err);
        }

        trace_phase(kind, MutationPhase::Terminal);
        outcome
    }

    async fn fetch_page_at(&self, offset: u32) -> FeedResult<Page> {
        let limit = self.config.page_size;
        let FetchedPage { items, total } = self
            .gateway
            .fetch_page(offset, limit)
            .await
            .inspect_err(|err| {
                warn!(offset, limit, error = %err, "page fetch failed");
                self.record_error(err);
            })?;

        debug!(offset, limit, total, count = items.len(), "page fetched");
        Ok(Page {
            items,
            next_cursor: compute_next_cursor(offset, limit, total),
        })
    }

    fn start_fetch(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Результат загрузки можно установить: загрузку не обогнала другая
    /// и нет мутации, ожидающей ответа шлюза.
    fn may_install(&self, generation: u64) -> bool {
        self.generation.load(Ordering::Acquire) == generation
            && self.mutations.load(Ordering::Acquire) == 0
    }

    fn record_error(&self, err: &FeedError) {
        *self
            .last_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(err.to_string());
    }

    fn clear_error(&self) {
        *self
            .last_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = None;
    }
}

fn trace_phase(kind: MutationKind, phase: MutationPhase) {
    debug!(?kind, ?phase, "mutation phase");
}
