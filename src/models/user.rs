use serde::{Deserialize, Serialize};

/// Текущий пользователь сессии. Передаётся явно в каждый вызов сервиса,
/// глобального состояния сессии нет.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: String,
    pub username: String,
    pub email: String,
}
