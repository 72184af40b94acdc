//! UseCase: メッセージ送信処理
//!
//! 公開メッセージ・質問は共有ログ（最大 100 件）に追加して全員にブロードキャストし、
//! 宛先付きの private メッセージは 1 対 1 の会話に保存して送信者と受信者にのみ届けます。

use std::sync::Arc;

use crate::domain::{
    ChatMessage, ClassroomEvent, ConnectionId, EventPublisher, MessageContent, MessageIdFactory,
    MessageKind, SessionRepository, Timestamp,
};

/// メッセージ送信のユースケース
pub struct SendMessageUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn SessionRepository>,
    /// イベント配信
    publisher: Arc<dyn EventPublisher>,
}

impl SendMessageUseCase {
    /// 新しい SendMessageUseCase を作成
    pub fn new(repository: Arc<dyn SessionRepository>, publisher: Arc<dyn EventPublisher>) -> Self {
        Self {
            repository,
            publisher,
        }
    }

    /// メッセージ送信を実行
    ///
    /// # Arguments
    ///
    /// * `sender_id` - 送信者の接続 ID（参加済みである必要がある）
    /// * `text` - メッセージ本文（前後の空白は取り除かれる）
    /// * `kind` - メッセージ種別
    /// * `recipient_id` - private メッセージの宛先
    ///
    /// # Returns
    ///
    /// * `Some(ChatMessage)` - 保存・配信されたメッセージ
    /// * `None` - 送信者が未参加、または本文が空のため何もしなかった
    pub async fn execute(
        &self,
        sender_id: ConnectionId,
        text: String,
        kind: MessageKind,
        recipient_id: Option<ConnectionId>,
    ) -> Option<ChatMessage> {
        let mut session = self.repository.lock().await;

        let Some(sender) = session.participant(&sender_id) else {
            tracing::debug!("send-message ignored: '{}' has not joined", sender_id);
            return None;
        };
        let sender_name = sender.username().clone();

        let content = match MessageContent::new(text) {
            Ok(content) => content,
            Err(e) => {
                tracing::debug!("send-message from '{}' ignored: {}", sender_id, e);
                return None;
            }
        };

        match (kind, recipient_id) {
            (MessageKind::Private, Some(recipient_id)) => {
                let message = ChatMessage::new(
                    MessageIdFactory::generate(),
                    sender_id.clone(),
                    sender_name,
                    content,
                    MessageKind::Private,
                    Some(recipient_id.clone()),
                    Timestamp::now(),
                );
                session.push_private_message(&recipient_id, message.clone());
                tracing::debug!(
                    "Private message from '{}' to '{}'",
                    sender_id,
                    recipient_id
                );

                self.publisher
                    .send_to(
                        sender_id.clone(),
                        ClassroomEvent::PrivateMessage(message.clone()),
                    )
                    .await;
                if recipient_id != sender_id {
                    self.publisher
                        .send_to(recipient_id, ClassroomEvent::PrivateMessage(message.clone()))
                        .await;
                }
                Some(message)
            }
            (kind, _) => {
                // private without a recipient and client-sent notifications land in the public log
                let kind = match kind {
                    MessageKind::Question => MessageKind::Question,
                    _ => MessageKind::Public,
                };
                let message = ChatMessage::new(
                    MessageIdFactory::generate(),
                    sender_id.clone(),
                    sender_name,
                    content,
                    kind,
                    None,
                    Timestamp::now(),
                );
                session.push_public_message(message.clone());
                tracing::debug!("Message from '{}' added to the chat log", sender_id);

                self.publisher
                    .broadcast(ClassroomEvent::NewMessage(message.clone()))
                    .await;
                Some(message)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{MockEventPublisher, session::DEFAULT_CHAT_LOG_CAPACITY},
        usecase::test_support::{
            RecordingPublisher, connection, repository, seed_student, seed_teacher,
        },
    };

    #[tokio::test]
    async fn test_public_message_is_logged_and_broadcast() {
        // テスト項目: 公開メッセージは共有ログに追加され全員にブロードキャストされる
        // given (前提条件):
        let repository = repository();
        seed_student(&repository, "c1", "alice").await;
        let publisher = Arc::new(RecordingPublisher::default());
        let usecase = SendMessageUseCase::new(repository.clone(), publisher.clone());

        // when (操作):
        let message = usecase
            .execute(
                connection("c1"),
                "  Hello!  ".to_string(),
                MessageKind::Public,
                None,
            )
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(message.content.as_str(), "Hello!");
        assert_eq!(message.sender_name.as_str(), "alice");
        assert_eq!(publisher.labels(), vec!["*:new-message"]);
        assert_eq!(repository.snapshot().await.chat_log().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_sender_or_blank_text_is_noop_with_mock() {
        // テスト項目: 未参加の送信者や空白のみの本文は何もしない
        // given (前提条件):
        let repository = repository();
        seed_student(&repository, "c1", "alice").await;
        let mut publisher = MockEventPublisher::new();
        publisher.expect_send_to().never();
        publisher.expect_broadcast().never();
        let usecase = SendMessageUseCase::new(repository.clone(), Arc::new(publisher));

        // when (操作):
        let unknown = usecase
            .execute(connection("c9"), "hi".to_string(), MessageKind::Public, None)
            .await;
        let blank = usecase
            .execute(connection("c1"), " \n\t ".to_string(), MessageKind::Public, None)
            .await;

        // then (期待する結果):
        assert!(unknown.is_none());
        assert!(blank.is_none());
        assert!(repository.snapshot().await.chat_log().is_empty());
    }

    #[tokio::test]
    async fn test_private_message_to_disconnected_recipient() {
        // テスト項目: 未接続の宛先への private メッセージは会話に保存され、送信者にのみ届く
        // given (前提条件):
        let repository = repository();
        seed_teacher(&repository, "t1").await;
        let publisher = Arc::new(RecordingPublisher::default());
        let usecase = SendMessageUseCase::new(repository.clone(), publisher.clone());

        // when (操作):
        let message = usecase
            .execute(
                connection("t1"),
                "See me after class".to_string(),
                MessageKind::Private,
                Some(connection("a-student")),
            )
            .await;

        // then (期待する結果):
        assert!(message.is_some());
        let deliveries = publisher.deliveries();
        assert!(deliveries.iter().all(|d| d.target.is_some()));
        assert_eq!(publisher.labels()[0], "t1:private-message");
        let snapshot = repository.snapshot().await;
        assert!(snapshot.chat_log().is_empty());
        // 会話キーは 2 者の順序に依存しない
        assert_eq!(
            snapshot
                .private_conversation(&connection("a-student"), &connection("t1"))
                .len(),
            1
        );
    }

    #[tokio::test]
    async fn test_private_message_to_self_delivered_once() {
        // テスト項目: 自分宛ての private メッセージは 1 回だけ届く
        // given (前提条件):
        let repository = repository();
        seed_student(&repository, "c1", "alice").await;
        let publisher = Arc::new(RecordingPublisher::default());
        let usecase = SendMessageUseCase::new(repository.clone(), publisher.clone());

        // when (操作):
        usecase
            .execute(
                connection("c1"),
                "note to self".to_string(),
                MessageKind::Private,
                Some(connection("c1")),
            )
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(publisher.labels(), vec!["c1:private-message"]);
    }

    #[tokio::test]
    async fn test_private_without_recipient_goes_public() {
        // テスト項目: 宛先のない private メッセージは公開メッセージとして扱われる
        // given (前提条件):
        let repository = repository();
        seed_student(&repository, "c1", "alice").await;
        let publisher = Arc::new(RecordingPublisher::default());
        let usecase = SendMessageUseCase::new(repository.clone(), publisher.clone());

        // when (操作):
        let message = usecase
            .execute(
                connection("c1"),
                "hello?".to_string(),
                MessageKind::Private,
                None,
            )
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(message.kind, MessageKind::Public);
        assert_eq!(publisher.labels(), vec!["*:new-message"]);
    }

    #[tokio::test]
    async fn test_question_keeps_kind() {
        // テスト項目: 質問メッセージは種別を保ったまま共有ログに入る
        // given (前提条件):
        let repository = repository();
        seed_student(&repository, "c1", "alice").await;
        let usecase = SendMessageUseCase::new(
            repository.clone(),
            Arc::new(RecordingPublisher::default()),
        );

        // when (操作):
        usecase
            .execute(
                connection("c1"),
                "What is 2+2?".to_string(),
                MessageKind::Question,
                None,
            )
            .await
            .unwrap();

        // then (期待する結果):
        let log = repository.snapshot().await.chat_log();
        assert_eq!(log[0].kind, MessageKind::Question);
    }

    #[tokio::test]
    async fn test_chat_log_is_capped() {
        // テスト項目: 共有ログは上限件数を超えると古いものから削除される
        // given (前提条件):
        let repository = repository();
        seed_student(&repository, "c1", "alice").await;
        let usecase = SendMessageUseCase::new(
            repository.clone(),
            Arc::new(RecordingPublisher::default()),
        );

        // when (操作):
        for i in 0..DEFAULT_CHAT_LOG_CAPACITY + 5 {
            usecase
                .execute(connection("c1"), format!("m{i}"), MessageKind::Public, None)
                .await
                .unwrap();
        }

        // then (期待する結果):
        let log = repository.snapshot().await.chat_log();
        assert_eq!(log.len(), DEFAULT_CHAT_LOG_CAPACITY);
        assert_eq!(log[0].content.as_str(), "m5");
    }
}
