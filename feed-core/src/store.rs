use std::sync::{PoisonError, RwLock};

use crate::models::PageCollection;

#[derive(Debug, Default)]
/// Хранилище страниц: единственный источник правды для отображения.
///
/// Состояние заменяется только целиком, и откат сводится к установке
/// сохранённого снимка.
pub struct PageStore {
    pages: RwLock<PageCollection>,
}

impl PageStore {
    /// Создаёт пустое хранилище.
    pub fn new() -> Self {
        Self::default()
    }

    /// Возвращает копию текущего набора страниц.
    pub fn get_pages(&self) -> PageCollection {
        self.pages
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Атомарно заменяет набор страниц.
    pub fn set_pages(&self, pages: PageCollection) {
        *self.pages.write().unwrap_or_else(PoisonError::into_inner) = pages;
    }

    /// Под одной блокировкой на запись вычисляет новый набор страниц из текущего
    /// и устанавливает его. `None` оставляет хранилище без изменений.
    ///
    /// Возвращает `true`, если набор был заменён.
    pub fn replace_if(
        &self,
        f: impl FnOnce(&PageCollection) -> Option<PageCollection>,
    ) -> bool {
        let mut pages = self.pages.write().unwrap_or_else(PoisonError::into_inner);
        match f(&*pages) {
            Some(next) => {
                *pages = next;
                true
            }
            None => false,
        }
    }

    /// Как [`PageStore::replace_if`], но замыкание может отказать с ошибкой
    /// и вернуть вместе с новым набором дополнительное значение.
    pub fn try_replace<T, E>(
        &self,
        f: impl FnOnce(&PageCollection) -> Result<(PageCollection, T), E>,
    ) -> Result<T, E> {
        let mut pages = self.pages.write().unwrap_or_else(PoisonError::into_inner);
        let (next, value) = f(&*pages)?;
        *pages = next;
        Ok(value)
    }

    /// Сбрасывает хранилище в пустое состояние.
    pub fn clear(&self) {
        self.set_pages(PageCollection::default());
    }
}
