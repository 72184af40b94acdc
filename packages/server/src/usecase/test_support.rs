//! UseCase テスト用のヘルパー
//!
//! 発行されたイベントを宛先付きで記録する Publisher と、
//! セッションへの参加者登録を簡略化する関数を提供します。

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::{
    domain::{
        ClassroomEvent, ConnectionId, EventPublisher, SessionRepository, Student, Teacher,
        Timestamp, Username,
    },
    infrastructure::repository::InMemorySessionRepository,
};

/// 記録された 1 件の配信
#[derive(Debug, Clone)]
pub struct Delivery {
    /// 宛先（None はブロードキャスト）
    pub target: Option<ConnectionId>,
    pub event: ClassroomEvent,
}

impl Delivery {
    /// `"c1:join-success"` や `"*:students-updated"` 形式のラベル
    pub fn label(&self) -> String {
        let target = self
            .target
            .as_ref()
            .map(|id| id.as_str().to_string())
            .unwrap_or_else(|| "*".to_string());
        format!("{}:{}", target, self.event.name())
    }
}

/// 発行されたイベントを順番に記録する Publisher
#[derive(Default)]
pub struct RecordingPublisher {
    deliveries: Mutex<Vec<Delivery>>,
}

impl RecordingPublisher {
    pub fn deliveries(&self) -> Vec<Delivery> {
        self.deliveries.lock().unwrap().clone()
    }

    pub fn labels(&self) -> Vec<String> {
        self.deliveries().iter().map(Delivery::label).collect()
    }

    pub fn clear(&self) {
        self.deliveries.lock().unwrap().clear();
    }
}

#[async_trait]
impl EventPublisher for RecordingPublisher {
    async fn send_to(&self, connection_id: ConnectionId, event: ClassroomEvent) {
        self.deliveries.lock().unwrap().push(Delivery {
            target: Some(connection_id),
            event,
        });
    }

    async fn broadcast(&self, event: ClassroomEvent) {
        self.deliveries
            .lock()
            .unwrap()
            .push(Delivery {
                target: None,
                event,
            });
    }
}

pub fn connection(id: &str) -> ConnectionId {
    ConnectionId::new(id.to_string()).unwrap()
}

pub fn repository() -> Arc<InMemorySessionRepository> {
    Arc::new(InMemorySessionRepository::default())
}

/// 生徒をセッションに直接登録する（イベントは発行しない）
pub async fn seed_student(repository: &InMemorySessionRepository, id: &str, name: &str) {
    let mut session = repository.lock().await;
    session
        .join_student(Student::new(
            connection(id),
            Username::new(name.to_string()).unwrap(),
            Timestamp::new(0),
        ))
        .unwrap();
}

/// 教師をセッションに直接登録する（イベントは発行しない）
pub async fn seed_teacher(repository: &InMemorySessionRepository, id: &str) {
    let mut session = repository.lock().await;
    session.join_teacher(Teacher::new(
        connection(id),
        Username::teacher_or_default(None),
        Timestamp::new(0),
    ));
}
