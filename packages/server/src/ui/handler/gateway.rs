//! Inbound event dispatch.
//!
//! Maps each parsed client message to the use case that owns it. Rejections
//! are reported to the client by the use cases themselves; the gateway only
//! drops commands that fail boundary validation.

use crate::{
    domain::ConnectionId,
    infrastructure::dto::websocket::ClientMessage,
    ui::state::AppState,
};

/// Parse a text frame into a client message
pub fn parse_frame(text: &str) -> Result<ClientMessage, serde_json::Error> {
    serde_json::from_str(text)
}

/// Run the command carried by `message` on behalf of `connection_id`
pub async fn dispatch(state: &AppState, connection_id: &ConnectionId, message: ClientMessage) {
    match message {
        ClientMessage::JoinStudent { username } => {
            // join-error already sent on failure
            let _ = state
                .registry
                .join_student(connection_id.clone(), username)
                .await;
        }
        ClientMessage::JoinTeacher { teacher_name } => {
            state
                .registry
                .join_teacher(connection_id.clone(), teacher_name)
                .await;
        }
        ClientMessage::CreatePoll(payload) => {
            if let Err(e) = payload.validate() {
                tracing::warn!("Dropping invalid create-poll from '{}': {}", connection_id, e);
                return;
            }
            state
                .poll_lifecycle
                .create_poll(
                    payload.question,
                    payload.options,
                    payload.duration,
                    payload.correct_answers.into_iter().collect(),
                )
                .await;
        }
        ClientMessage::StartPoll => {
            state.poll_lifecycle.start_poll().await;
        }
        ClientMessage::StopPoll => {
            state.poll_lifecycle.stop_poll().await;
        }
        ClientMessage::SubmitResponse { option_index } => {
            // response-error already sent on failure
            let _ = state
                .submit_response
                .execute(connection_id.clone(), option_index)
                .await;
        }
        ClientMessage::RemoveStudent { student_id } => match ConnectionId::new(student_id) {
            Ok(student_id) => {
                state.registry.remove_student(student_id).await;
            }
            Err(e) => {
                tracing::warn!("Dropping remove-student from '{}': {}", connection_id, e);
            }
        },
        ClientMessage::GetStudents => {
            state
                .registry
                .send_participants(connection_id.clone())
                .await;
        }
        ClientMessage::SendMessage {
            message,
            kind,
            recipient_id,
        } => {
            let recipient_id = recipient_id.and_then(|id| ConnectionId::new(id).ok());
            state
                .send_message
                .execute(connection_id.clone(), message, kind, recipient_id)
                .await;
        }
        ClientMessage::GetChatHistory => {
            state
                .chat_history
                .send_history(connection_id.clone())
                .await;
        }
        ClientMessage::GetPrivateConversation { participant_id } => {
            match ConnectionId::new(participant_id) {
                Ok(participant_id) => {
                    state
                        .chat_history
                        .send_private_conversation(connection_id.clone(), participant_id)
                        .await;
                }
                Err(e) => {
                    tracing::warn!(
                        "Dropping get-private-conversation from '{}': {}",
                        connection_id,
                        e
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::EventPublisher;

    fn id(value: &str) -> ConnectionId {
        ConnectionId::new(value.to_string()).unwrap()
    }

    async fn send(state: &AppState, connection_id: &ConnectionId, frame: &str) {
        let message = parse_frame(frame).unwrap();
        dispatch(state, connection_id, message).await;
    }

    #[tokio::test]
    async fn test_invalid_create_poll_is_dropped() {
        // テスト項目: 検証に失敗した create-poll は投票を作成しない
        // given (前提条件):
        let state = AppState::in_memory();
        let teacher = id("t1");

        // when (操作):
        send(
            &state,
            &teacher,
            r#"{"event":"create-poll","question":"Q","options":["only one"],"duration":10}"#,
        )
        .await;

        // then (期待する結果):
        assert!(state.repository.snapshot().await.current_poll().is_none());
    }

    #[tokio::test]
    async fn test_scenario_a_through_gateway() {
        // テスト項目: 作成 → 開始 → 正解の回答で集計が更新される
        // given (前提条件):
        let state = AppState::in_memory();
        let teacher = id("t1");
        let student = id("s1");
        let mut student_rx = state.hub.register(student.clone()).await;
        send(&state, &teacher, r#"{"event":"join-teacher"}"#).await;
        send(&state, &student, r#"{"event":"join-student","username":"S1"}"#).await;

        // when (操作):
        send(
            &state,
            &teacher,
            r#"{"event":"create-poll","question":"Q","options":["A","B"],"duration":10,"correctAnswers":[0]}"#,
        )
        .await;
        send(&state, &teacher, r#"{"event":"start-poll"}"#).await;
        send(&state, &student, r#"{"event":"submit-response","optionIndex":0}"#).await;

        // then (期待する結果):
        let snapshot = state.repository.snapshot().await;
        let poll = snapshot.current_poll().unwrap();
        assert_eq!(poll.responses[&0], 1);
        assert_eq!(poll.total_responses, 1);

        let mut success = None;
        while let Ok(frame) = student_rx.try_recv() {
            let value: serde_json::Value = serde_json::from_str(&frame).unwrap();
            if value["event"] == "response-success" {
                success = Some(value);
            }
        }
        let success = success.expect("response-success frame");
        assert_eq!(success["data"]["isCorrect"], true);

        state.poll_lifecycle.stop_poll().await;
    }

    #[tokio::test]
    async fn test_get_private_conversation_reaches_requester() {
        // テスト項目: get-private-conversation の応答は要求元に届く
        // given (前提条件):
        let state = AppState::in_memory();
        let requester = id("c1");
        let mut rx = state.hub.register(requester.clone()).await;

        // when (操作):
        send(
            &state,
            &requester,
            r#"{"event":"get-private-conversation","participantId":"c2"}"#,
        )
        .await;

        // then (期待する結果):
        let value: serde_json::Value = serde_json::from_str(&rx.try_recv().unwrap()).unwrap();
        assert_eq!(value["event"], "private-conversation");
        assert_eq!(value["data"]["participantId"], "c2");
        assert_eq!(value["data"]["messages"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_hub_is_the_publisher() {
        // テスト項目: AppState のユースケースは BroadcastHub 経由で配信する
        // given (前提条件):
        let state = AppState::in_memory();
        let mut rx = state.hub.register(id("c1")).await;

        // when (操作):
        state
            .hub
            .broadcast(crate::domain::ClassroomEvent::CurrentPoll(None))
            .await;
        send(&state, &id("c1"), r#"{"event":"get-students"}"#).await;

        // then (期待する結果):
        assert!(rx.try_recv().unwrap().contains("current-poll"));
        assert!(rx.try_recv().unwrap().contains("students-updated"));
    }
}
