//! InMemory Session Repository 実装
//!
//! ドメイン層が定義する SessionRepository trait の具体的な実装。
//! `tokio::sync::Mutex` で保護された `SessionState` をインメモリ DB として使用します。
//!
//! プロセス再起動をまたいだ永続化は行いません。

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{SessionGuard, SessionRepository, SessionState};

/// インメモリ Session Repository 実装
pub struct InMemorySessionRepository {
    /// セッション集約（単一のロックで全ての更新を直列化する）
    state: Arc<Mutex<SessionState>>,
}

impl InMemorySessionRepository {
    /// 新しい InMemorySessionRepository を作成
    pub fn new(state: SessionState) -> Self {
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }
}

impl Default for InMemorySessionRepository {
    fn default() -> Self {
        Self::new(SessionState::new())
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn lock(&self) -> SessionGuard {
        self.state.clone().lock_owned().await
    }

    async fn snapshot(&self) -> SessionState {
        self.state.lock().await.clone()
    }
}
