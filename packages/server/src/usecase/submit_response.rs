//! UseCase: 投票への回答処理
//!
//! 生徒 1 人につき、開始中の投票サイクルごとに最初の 1 回の回答のみを受け付けます。
//! 拒否された回答はセッションを一切変更しません。

use std::sync::Arc;

use crate::domain::{
    ClassroomEvent, ConnectionId, EventPublisher, ResponseAccepted, ResponseError,
    SessionRepository,
};

/// 回答送信のユースケース
pub struct SubmitResponseUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn SessionRepository>,
    /// イベント配信
    publisher: Arc<dyn EventPublisher>,
}

impl SubmitResponseUseCase {
    /// 新しい SubmitResponseUseCase を作成
    pub fn new(repository: Arc<dyn SessionRepository>, publisher: Arc<dyn EventPublisher>) -> Self {
        Self {
            repository,
            publisher,
        }
    }

    /// 回答送信を実行
    ///
    /// 受け付けた場合は全員に poll-updated と students-updated をブロードキャストし、
    /// 回答者にのみ response-success を送ります。
    ///
    /// # Errors
    ///
    /// 投票がない・開始されていない・生徒でない・回答済み・選択肢が範囲外の場合は
    /// 回答者にのみ response-error を送り、`ResponseError` を返します。
    pub async fn execute(
        &self,
        connection_id: ConnectionId,
        option_index: usize,
    ) -> Result<ResponseAccepted, ResponseError> {
        let mut session = self.repository.lock().await;

        let accepted = match session.submit_response(&connection_id, option_index) {
            Ok(accepted) => accepted,
            Err(e) => {
                tracing::warn!("Rejected response from '{}': {}", connection_id, e);
                self.publisher
                    .send_to(
                        connection_id,
                        ClassroomEvent::ResponseError {
                            message: e.to_string(),
                        },
                    )
                    .await;
                return Err(e);
            }
        };

        tracing::info!(
            "Response from '{}' recorded (option {}, correct: {})",
            connection_id,
            option_index,
            accepted.is_correct
        );

        self.publisher
            .broadcast(ClassroomEvent::PollUpdated(accepted.poll.clone()))
            .await;
        self.publisher
            .broadcast(ClassroomEvent::StudentsUpdated(
                session.participants().to_vec(),
            ))
            .await;
        self.publisher
            .send_to(
                connection_id,
                ClassroomEvent::ResponseSuccess {
                    poll: accepted.poll.clone(),
                    is_correct: accepted.is_correct,
                },
            )
            .await;

        Ok(accepted)
    }
}
