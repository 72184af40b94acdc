//! UseCase: 参加者の登録・削除処理
//!
//! 生徒・教師の参加、教師による生徒の削除、切断時の後始末を扱います。
//! 参加者一覧（students-updated）は生徒と教師を登録順に含みます。

use std::sync::Arc;

use crate::domain::{
    ClassroomEvent, ConnectionId, EventPublisher, JoinError, Participant, SessionRepository,
    SessionState, Student, Teacher, Timestamp, Username,
};

/// kicked-out イベントで生徒に通知するメッセージ
pub const KICKED_OUT_MESSAGE: &str = "You have been removed from the classroom by the teacher.";

/// 参加者登録のユースケース
pub struct ParticipantRegistryUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn SessionRepository>,
    /// イベント配信
    publisher: Arc<dyn EventPublisher>,
}

impl ParticipantRegistryUseCase {
    /// 新しい ParticipantRegistryUseCase を作成
    pub fn new(repository: Arc<dyn SessionRepository>, publisher: Arc<dyn EventPublisher>) -> Self {
        Self {
            repository,
            publisher,
        }
    }

    /// 生徒の参加を実行
    ///
    /// 成功時は参加者本人に current-poll を送り、全員に students-updated を
    /// ブロードキャストしたあと、本人に join-success を送ります。
    /// 失敗時は本人にのみ join-error を送ります。
    ///
    /// # Errors
    ///
    /// * `JoinError::InvalidUsername` - ユーザー名が空白のみ
    /// * `JoinError::DuplicateUsername` - 他の生徒が同じユーザー名を使用中
    pub async fn join_student(
        &self,
        connection_id: ConnectionId,
        username: String,
    ) -> Result<Participant, JoinError> {
        let mut session = self.repository.lock().await;

        let participant = match register_student(&mut session, &connection_id, username) {
            Ok(participant) => participant,
            Err(e) => {
                tracing::warn!("Rejected join-student from '{}': {}", connection_id, e);
                self.publisher
                    .send_to(
                        connection_id,
                        ClassroomEvent::JoinError {
                            message: e.to_string(),
                        },
                    )
                    .await;
                return Err(e);
            }
        };

        tracing::info!(
            "Student '{}' joined as '{}'",
            connection_id,
            participant.username()
        );

        self.publisher
            .send_to(
                connection_id.clone(),
                ClassroomEvent::CurrentPoll(session.current_poll().cloned()),
            )
            .await;
        self.publisher
            .broadcast(ClassroomEvent::StudentsUpdated(
                session.participants().to_vec(),
            ))
            .await;
        self.publisher
            .send_to(connection_id, ClassroomEvent::JoinSuccess(participant.clone()))
            .await;

        Ok(participant)
    }

    /// 教師の参加を実行
    ///
    /// 名前が空の場合は "Teacher" になります。ユーザー名の重複チェックは行いません。
    pub async fn join_teacher(
        &self,
        connection_id: ConnectionId,
        teacher_name: Option<String>,
    ) -> Participant {
        let mut session = self.repository.lock().await;

        let teacher = Teacher::new(
            connection_id.clone(),
            Username::teacher_or_default(teacher_name),
            Timestamp::now(),
        );
        session.join_teacher(teacher.clone());
        let participant = Participant::Teacher(teacher);

        tracing::info!(
            "Teacher '{}' joined as '{}'",
            connection_id,
            participant.username()
        );

        self.publisher
            .send_to(connection_id, ClassroomEvent::JoinSuccess(participant.clone()))
            .await;
        self.publisher
            .broadcast(ClassroomEvent::StudentsUpdated(
                session.participants().to_vec(),
            ))
            .await;

        participant
    }

    /// 生徒の削除を実行
    ///
    /// 対象の接続には kicked-out を送りますが、接続そのものは閉じません。
    /// 存在しない ID の場合は何もしません。
    pub async fn remove_student(&self, student_id: ConnectionId) -> Option<Student> {
        let mut session = self.repository.lock().await;

        if session.student(&student_id).is_none() {
            tracing::debug!("remove-student ignored: '{}' is not a student", student_id);
            return None;
        }

        self.publisher
            .send_to(
                student_id.clone(),
                ClassroomEvent::KickedOut {
                    message: KICKED_OUT_MESSAGE.to_string(),
                },
            )
            .await;
        let removed = session.remove_student(&student_id);
        tracing::info!("Student '{}' removed from the session", student_id);

        self.publisher
            .broadcast(ClassroomEvent::StudentsUpdated(
                session.participants().to_vec(),
            ))
            .await;

        removed
    }

    /// 切断処理を実行
    ///
    /// 参加者が登録されていた場合のみ students-updated をブロードキャストします。
    pub async fn disconnect(&self, connection_id: &ConnectionId) -> Option<Participant> {
        let mut session = self.repository.lock().await;

        let removed = session.remove_participant(connection_id)?;
        tracing::info!(
            "Participant '{}' ({}) left the session",
            connection_id,
            removed.username()
        );

        self.publisher
            .broadcast(ClassroomEvent::StudentsUpdated(
                session.participants().to_vec(),
            ))
            .await;

        Some(removed)
    }

    /// 現在の参加者一覧（登録順）
    pub async fn list_participants(&self) -> Vec<Participant> {
        let session = self.repository.lock().await;
        session.participants().to_vec()
    }

    /// 要求元にのみ参加者一覧を送る（get-students）
    pub async fn send_participants(&self, requester: ConnectionId) {
        let session = self.repository.lock().await;
        self.publisher
            .send_to(
                requester,
                ClassroomEvent::StudentsUpdated(session.participants().to_vec()),
            )
            .await;
    }
}

fn register_student(
    session: &mut SessionState,
    connection_id: &ConnectionId,
    username: String,
) -> Result<Participant, JoinError> {
    let username = Username::new(username)?;
    let student = Student::new(connection_id.clone(), username, Timestamp::now());
    session.join_student(student.clone())?;
    Ok(Participant::Student(student))
}
