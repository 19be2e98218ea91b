use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{FeedError, FeedResult};

const IMAGE_BASE_URL: &str = "https://picsum.photos/seed";

/// Возвращает URL картинки-заглушки для поста с заданным seed.
pub fn image_url_for(seed: i64) -> String {
    format!("{IMAGE_BASE_URL}/{seed}/800/600")
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
/// Счётчики реакций поста.
pub struct Reactions {
    /// Количество лайков.
    pub likes: u32,
    /// Количество дизлайков.
    pub dislikes: u32,
}

impl Reactions {
    /// Возвращает копию с увеличенным на 1 счётчиком `kind`.
    pub fn incremented(self, kind: ReactionKind) -> Self {
        match kind {
            ReactionKind::Like => Self {
                likes: self.likes.saturating_add(1),
                ..self
            },
            ReactionKind::Dislike => Self {
                dislikes: self.dislikes.saturating_add(1),
                ..self
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Вид реакции.
pub enum ReactionKind {
    /// Лайк.
    Like,
    /// Дизлайк.
    Dislike,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Элемент ленты (пост).
pub struct Item {
    /// Идентификатор: серверный или клиентский (см. [`Item::is_client_assigned`]).
    pub id: i64,
    /// Заголовок.
    pub title: String,
    /// Текст поста.
    pub body: String,
    /// Теги в исходном порядке.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Идентификатор автора.
    pub user_id: i64,
    /// Реакции.
    #[serde(default)]
    pub reactions: Reactions,
    /// Количество просмотров.
    #[serde(default)]
    pub views: u32,
    /// URL картинки, который добавляет прокси.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl Item {
    /// `true`, если id выдан клиентом для оптимистичного элемента.
    pub fn is_client_assigned(&self) -> bool {
        crate::ids::is_client_id(self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Черновик нового поста.
pub struct ItemDraft {
    /// Заголовок.
    pub title: String,
    /// Текст поста.
    pub body: String,
    /// Теги.
    pub tags: Vec<String>,
    /// Идентификатор автора.
    pub user_id: i64,
}

impl ItemDraft {
    /// Нормализует поля черновика (trim) и проверяет, что они не пустые.
    pub fn validate(self) -> FeedResult<Self> {
        Ok(Self {
            title: normalize_title(&self.title)?,
            body: normalize_body(&self.body)?,
            tags: normalize_tags(self.tags),
            user_id: self.user_id,
        })
    }

    /// Собирает оптимистичный элемент с клиентским id и нулевыми счётчиками.
    pub fn into_optimistic_item(self, client_id: i64) -> Item {
        Item {
            id: client_id,
            title: self.title,
            body: self.body,
            tags: self.tags,
            user_id: self.user_id,
            reactions: Reactions::default(),
            views: 0,
            image_url: Some(image_url_for(client_id)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Частичное обновление поста. Незаданные поля сохраняют текущие значения.
pub struct ItemPatch {
    /// Идентификатор обновляемого поста.
    pub id: i64,
    /// Новый заголовок.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Новый текст.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    /// Новый набор тегов.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    /// Новый автор.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    /// Новые значения реакций.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reactions: Option<Reactions>,
    /// Новое число просмотров.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub views: Option<u32>,
}

impl ItemPatch {
    /// Создаёт пустой патч для поста `id`.
    pub fn new(id: i64) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    /// `true`, если патч не меняет ни одного поля.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.body.is_none()
            && self.tags.is_none()
            && self.user_id.is_none()
            && self.reactions.is_none()
            && self.views.is_none()
    }

    /// Нормализует заданные текстовые поля и отклоняет пустой патч.
    pub fn validate(self) -> FeedResult<Self> {
        if self.is_empty() {
            return Err(FeedError::InvalidRequest(format!(
                "patch for id={} has no fields",
                self.id
            )));
        }
        Ok(Self {
            title: self.title.as_deref().map(normalize_title).transpose()?,
            body: self.body.as_deref().map(normalize_body).transpose()?,
            tags: self.tags.map(normalize_tags),
            ..self
        })
    }

    /// Накладывает патч на элемент: заданные поля патча побеждают.
    pub fn apply_to(&self, item: &Item) -> Item {
        Item {
            id: item.id,
            title: self.title.clone().unwrap_or_else(|| item.title.clone()),
            body: self.body.clone().unwrap_or_else(|| item.body.clone()),
            tags: self.tags.clone().unwrap_or_else(|| item.tags.clone()),
            user_id: self.user_id.unwrap_or(item.user_id),
            reactions: self.reactions.unwrap_or(item.reactions),
            views: self.views.unwrap_or(item.views),
            image_url: item.image_url.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Одна загруженная страница ленты.
pub struct Page {
    /// Элементы страницы по порядку.
    pub items: Vec<Item>,
    /// Смещение следующей страницы; `None`, если страниц больше нет.
    pub next_cursor: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
/// Ответ удалённого шлюза со страницей постов.
pub struct FetchedPage {
    /// Посты страницы.
    pub items: Vec<Item>,
    /// Полный размер коллекции по данным источника.
    pub total: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Упорядоченный набор страниц: всё, что видит клиент.
///
/// Конкатенация страниц даёт видимую коллекцию; каждый id встречается
/// не более чем в одной странице.
pub struct PageCollection {
    pages: Vec<Page>,
}

impl PageCollection {
    /// Собирает коллекцию из страниц, отбрасывая повторные id.
    pub fn new(pages: Vec<Page>) -> Self {
        pages
            .into_iter()
            .fold(Self::default(), |collection, page| collection.with_appended(page))
    }

    /// Страницы по порядку.
    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    /// `true`, если страниц нет.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Количество элементов во всех страницах.
    pub fn item_count(&self) -> usize {
        self.pages.iter().map(|page| page.items.len()).sum()
    }

    /// Плоский список элементов в порядке страниц.
    pub fn items(&self) -> Vec<Item> {
        self.pages
            .iter()
            .flat_map(|page| page.items.iter().cloned())
            .collect()
    }

    /// Ищет элемент по id.
    pub fn find(&self, id: i64) -> Option<&Item> {
        self.pages
            .iter()
            .flat_map(|page| page.items.iter())
            .find(|item| item.id == id)
    }

    /// `true`, если элемент с таким id есть в одной из страниц.
    pub fn contains(&self, id: i64) -> bool {
        self.find(id).is_some()
    }

    /// Курсор первой страницы.
    pub fn first_cursor(&self) -> Option<u32> {
        self.pages.first().and_then(|page| page.next_cursor)
    }

    /// Курсор последней страницы: откуда грузить следующую.
    pub fn last_cursor(&self) -> Option<u32> {
        self.pages.last().and_then(|page| page.next_cursor)
    }

    /// Новая коллекция со страницей `page` в начале.
    pub fn with_prepended(&self, page: Page) -> Self {
        let ids: HashSet<i64> = page.items.iter().map(|item| item.id).collect();
        let rest = self.pages.iter().map(|existing| Page {
            items: existing
                .items
                .iter()
                .filter(|item| !ids.contains(&item.id))
                .cloned()
                .collect(),
            next_cursor: existing.next_cursor,
        });

        Self {
            pages: std::iter::once(page).chain(rest).collect(),
        }
    }

    /// Новая коллекция со страницей `page` в конце.
    ///
    /// Элементы, уже присутствующие в коллекции, из новой страницы выбрасываются:
    /// смещения на сервере могли сдвинуться после вставки или удаления.
    pub fn with_appended(mut self, page: Page) -> Self {
        let known: HashSet<i64> = self
            .pages
            .iter()
            .flat_map(|existing| existing.items.iter().map(|item| item.id))
            .collect();
        let mut seen = known;
        let items = page
            .items
            .into_iter()
            .filter(|item| seen.insert(item.id))
            .collect();

        self.pages.push(Page {
            items,
            next_cursor: page.next_cursor,
        });
        self
    }

    /// Новая коллекция, где элемент `id` заменён результатом `f`.
    ///
    /// `None`, если элемента нет.
    pub fn with_item_replaced(&self, id: i64, f: impl FnOnce(&Item) -> Item) -> Option<Self> {
        let (page_idx, item_idx) = self.position(id)?;
        let mut pages = self.pages.clone();
        let slot = &mut pages[page_idx].items[item_idx];
        *slot = f(slot);
        Some(Self { pages })
    }

    /// Новая коллекция без элемента `id`. `None`, если элемента нет.
    pub fn without_item(&self, id: i64) -> Option<Self> {
        let (page_idx, item_idx) = self.position(id)?;
        let mut pages = self.pages.clone();
        pages[page_idx].items.remove(item_idx);
        Some(Self { pages })
    }

    fn position(&self, id: i64) -> Option<(usize, usize)> {
        self.pages.iter().enumerate().find_map(|(page_idx, page)| {
            page.items
                .iter()
                .position(|item| item.id == id)
                .map(|item_idx| (page_idx, item_idx))
        })
    }
}

fn normalize_title(title: &str) -> FeedResult<String> {
    let title = title.trim();
    if title.is_empty() || title.chars().count() > 255 {
        return Err(FeedError::InvalidRequest(
            "title must be 1..255 chars".to_string(),
        ));
    }
    Ok(title.to_string())
}

fn normalize_body(body: &str) -> FeedResult<String> {
    let body = body.trim();
    if body.is_empty() {
        return Err(FeedError::InvalidRequest("body must not be empty".to_string()));
    }
    Ok(body.to_string())
}

fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    tags.into_iter()
        .map(|tag| tag.trim().to_string())
        .filter(|tag| !tag.is_empty())
        .collect()
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::{Item, Page, Reactions};

    pub(crate) fn item(id: i64, likes: u32) -> Item {
        Item {
            id,
            title: format!("title {id}"),
            body: format!("body {id}"),
            tags: vec!["history".to_string()],
            user_id: 1,
            reactions: Reactions { likes, dislikes: 0 },
            views: 10,
            image_url: Some(super::image_url_for(id)),
        }
    }

    pub(crate) fn page(ids: &[i64], next_cursor: Option<u32>) -> Page {
        Page {
            items: ids.iter().map(|id| item(*id, 0)).collect(),
            next_cursor,
        }
    }
}
