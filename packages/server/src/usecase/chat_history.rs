//! UseCase: チャット履歴の取得処理

use std::sync::Arc;

use crate::domain::{ClassroomEvent, ConnectionId, EventPublisher, SessionRepository};

/// チャット履歴取得のユースケース
pub struct ChatHistoryUseCase {
    repository: Arc<dyn SessionRepository>,
    publisher: Arc<dyn EventPublisher>,
}

impl ChatHistoryUseCase {
    pub fn new(repository: Arc<dyn SessionRepository>, publisher: Arc<dyn EventPublisher>) -> Self {
        Self {
            repository,
            publisher,
        }
    }

    /// 共有ログ全体を要求元にのみ送る（chat-history）
    pub async fn send_history(&self, requester: ConnectionId) {
        let session = self.repository.lock().await;
        let messages = session.chat_log();
        tracing::debug!("Sending {} message(s) to '{}'", messages.len(), requester);
        self.publisher
            .send_to(requester, ClassroomEvent::ChatHistory(messages))
            .await;
    }

    /// 要求元と相手の 1 対 1 の会話を要求元にのみ送る（private-conversation）
    ///
    /// 会話が存在しない場合は空の一覧を送ります。
    pub async fn send_private_conversation(&self, requester: ConnectionId, other: ConnectionId) {
        let session = self.repository.lock().await;
        let messages = session.private_conversation(&requester, &other);
        self.publisher
            .send_to(
                requester,
                ClassroomEvent::PrivateConversation {
                    participant_id: other,
                    messages,
                },
            )
            .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::MessageKind,
        usecase::{
            SendMessageUseCase,
            test_support::{RecordingPublisher, connection, repository, seed_student},
        },
    };

    #[tokio::test]
    async fn test_send_history_to_requester_only() {
        // テスト項目: chat-history は要求元にのみ共有ログ全体を送る
        // given (前提条件):
        let repository = repository();
        seed_student(&repository, "c1", "alice").await;
        let publisher = Arc::new(RecordingPublisher::default());
        let sender = SendMessageUseCase::new(repository.clone(), publisher.clone());
        for text in ["one", "two"] {
            sender
                .execute(connection("c1"), text.to_string(), MessageKind::Public, None)
                .await;
        }
        publisher.clear();
        let usecase = ChatHistoryUseCase::new(repository.clone(), publisher.clone());

        // when (操作):
        usecase.send_history(connection("c2")).await;

        // then (期待する結果):
        let deliveries = publisher.deliveries();
        assert_eq!(publisher.labels(), vec!["c2:chat-history"]);
        let ClassroomEvent::ChatHistory(messages) = &deliveries[0].event else {
            panic!("expected chat-history");
        };
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].content.as_str(), "one");
    }

    #[tokio::test]
    async fn test_private_conversation_from_either_side() {
        // テスト項目: どちらの参加者から要求しても同じ会話が返る
        // given (前提条件):
        let repository = repository();
        seed_student(&repository, "c1", "alice").await;
        seed_student(&repository, "c2", "bob").await;
        let publisher = Arc::new(RecordingPublisher::default());
        let sender = SendMessageUseCase::new(repository.clone(), publisher.clone());
        sender
            .execute(
                connection("c1"),
                "hi bob".to_string(),
                MessageKind::Private,
                Some(connection("c2")),
            )
            .await;
        sender
            .execute(
                connection("c2"),
                "hi alice".to_string(),
                MessageKind::Private,
                Some(connection("c1")),
            )
            .await;
        publisher.clear();
        let usecase = ChatHistoryUseCase::new(repository.clone(), publisher.clone());

        // when (操作):
        usecase
            .send_private_conversation(connection("c2"), connection("c1"))
            .await;

        // then (期待する結果):
        let deliveries = publisher.deliveries();
        let ClassroomEvent::PrivateConversation {
            participant_id,
            messages,
        } = &deliveries[0].event
        else {
            panic!("expected private-conversation");
        };
        assert_eq!(participant_id.as_str(), "c1");
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].content.as_str(), "hi alice");
    }

    #[tokio::test]
    async fn test_private_conversation_empty_when_none() {
        // テスト項目: 会話が存在しない場合は空の一覧を返す
        // given (前提条件):
        let publisher = Arc::new(RecordingPublisher::default());
        let usecase = ChatHistoryUseCase::new(repository(), publisher.clone());

        // when (操作):
        usecase
            .send_private_conversation(connection("c1"), connection("c2"))
            .await;

        // then (期待する結果):
        let deliveries = publisher.deliveries();
        assert!(matches!(
            &deliveries[0].event,
            ClassroomEvent::PrivateConversation { messages, .. } if messages.is_empty()
        ));
    }
}
