//! UseCase 層
//!
//! ビジネスロジックを実装するレイヤー。
//! UI 層から呼び出され、Domain 層を操作し、結果を EventPublisher 経由で配信します。
//!
//! 各ユースケースはセッションのロックを保持したまま更新とイベント発行を行うため、
//! 全てのクライアントは同じ順序で状態変化を観測します。

pub mod chat_history;
pub mod participant_registry;
pub mod poll_lifecycle;
pub mod send_message;
pub mod submit_response;

#[cfg(test)]
pub(crate) mod test_support;

pub use chat_history::ChatHistoryUseCase;
pub use participant_registry::{KICKED_OUT_MESSAGE, ParticipantRegistryUseCase};
pub use poll_lifecycle::{NOTIFICATION_THRESHOLD_SECS, PollLifecycleUseCase};
pub use send_message::SendMessageUseCase;
pub use submit_response::SubmitResponseUseCase;
