use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;

/// Нижняя граница клиентских id.
///
/// Клиентские id берутся из миллисекунд UTC, а все метки времени после 2001 года
/// больше этой границы. Серверные id коллекции на порядки меньше.
pub const CLIENT_ID_FLOOR: i64 = 1_000_000_000_000;

/// `true`, если id лежит в зарезервированном клиентском диапазоне.
pub fn is_client_id(id: i64) -> bool {
    id >= CLIENT_ID_FLOOR
}

#[derive(Debug, Default)]
/// Генератор временных id для оптимистичных элементов.
///
/// Выдаёт строго возрастающие значения, даже если два создания пришлись
/// на одну миллисекунду.
pub struct ClientIdGenerator {
    last: AtomicI64,
}

impl ClientIdGenerator {
    /// Создаёт генератор.
    pub fn new() -> Self {
        Self::default()
    }

    /// Возвращает следующий клиентский id.
    pub fn next_id(&self) -> i64 {
        let now = Utc::now().timestamp_millis().max(CLIENT_ID_FLOOR);
        let mut last = self.last.load(Ordering::Relaxed);
        loop {
            let candidate = now.max(last + 1);
            match self
                .last
                .compare_exchange_weak(last, candidate, Ordering::AcqRel, Ordering::Relaxed)
            {
                Ok(_) => return candidate,
                Err(actual) => last = actual,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_strictly_increasing_and_reserved() {
        let ids = ClientIdGenerator::new();
        let first = ids.next_id();
        let second = ids.next_id();
        let third = ids.next_id();

        assert!(is_client_id(first));
        assert!(second > first);
        assert!(third > second);
    }

    #[test]
    fn server_ids_are_not_client_ids() {
        assert!(!is_client_id(1));
        assert!(!is_client_id(251));
        assert!(is_client_id(CLIENT_ID_FLOOR));
    }
}
