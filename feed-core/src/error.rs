use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// Ошибки ядра ленты и удалённого шлюза.
pub enum FeedError {
    /// Сервер ответил не-2xx статусом.
    #[error("network error {status}: {message}")]
    Network {
        /// HTTP-статус ответа.
        status: u16,
        /// Сообщение из тела ответа или текст статуса.
        message: String,
    },

    /// Ответ не был получен (соединение, таймаут).
    #[error("transport error: {0}")]
    Transport(String),

    /// Цель мутации отсутствует в текущем наборе страниц.
    ///
    /// Локальная ошибка предусловия: запрос в сеть не отправляется.
    #[error("item not found: id={0}")]
    NotFound(i64),

    /// Тело ответа не удалось разобрать.
    #[error("decode error: {0}")]
    Decode(String),

    /// Некорректные входные данные.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// Результат операций ядра ленты.
pub type FeedResult<T> = Result<T, FeedError>;

impl FeedError {
    /// `true`, если ошибка пришла от удалённого шлюза (и вызвала откат).
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            Self::Network { .. } | Self::Transport(_) | Self::Decode(_)
        )
    }
}
