//! Вычисление курсора следующей страницы.
//!
//! Курсор: смещение (`skip`) следующей страницы в коллекции источника.

use crate::models::PageCollection;

/// Курсор следующей страницы для страницы, загруженной с `offset`
/// размером `limit`, при полном размере коллекции `total`.
///
/// `None`, если дальше страниц нет.
///
/// Примеры:
/// - `offset=0, limit=10, total=25`  -> `Some(10)`
/// - `offset=20, limit=10, total=25` -> `None`
pub fn compute_next_cursor(offset: u32, limit: u32, total: u64) -> Option<u32> {
    if limit == 0 {
        return None;
    }
    let next = offset.checked_add(limit)?;
    (u64::from(next) < total).then_some(next)
}

/// `true`, если у последней загруженной страницы есть курсор.
pub fn has_next_page(pages: &PageCollection) -> bool {
    pages.last_cursor().is_some()
}
