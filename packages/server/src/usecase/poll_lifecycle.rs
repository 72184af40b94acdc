//! UseCase: 投票のライフサイクル処理
//!
//! 投票の作成・開始・停止と、開始中の投票のカウントダウンを扱います。
//!
//! カウントダウンは投票ごとに 1 つの `tokio` タスクとして実行され、その
//! `AbortHandle` を投票 ID と一緒に保持します。停止・再開始・置き換えの際は
//! セッションのロックを保持したままタスクを中断するため、中断後の tick が
//! 停止済みの投票を観測することはありません。
//!
//! ロックの取得順序は常に「セッション → カウントダウン」です。

use std::{collections::BTreeSet, sync::Arc, time::Duration};

use tokio::{sync::Mutex, task::AbortHandle, time::Instant};

use crate::domain::{
    ChatMessage, ClassroomEvent, CountdownTick, EventPublisher, MessageContent, MessageIdFactory,
    Poll, PollId, PollIdFactory, SessionRepository, SessionState, Timestamp,
};

/// 残り秒数がこの値になった時点でシステム通知を送る
pub const NOTIFICATION_THRESHOLD_SECS: u32 = 10;

const TICK_PERIOD: Duration = Duration::from_secs(1);

/// 実行中のカウントダウン
struct Countdown {
    poll_id: PollId,
    handle: AbortHandle,
}

/// 投票ライフサイクルのユースケース
#[derive(Clone)]
pub struct PollLifecycleUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn SessionRepository>,
    /// イベント配信
    publisher: Arc<dyn EventPublisher>,
    /// 実行中のカウントダウン（最大 1 つ）
    countdown: Arc<Mutex<Option<Countdown>>>,
}

impl PollLifecycleUseCase {
    /// 新しい PollLifecycleUseCase を作成
    pub fn new(repository: Arc<dyn SessionRepository>, publisher: Arc<dyn EventPublisher>) -> Self {
        Self {
            repository,
            publisher,
            countdown: Arc::new(Mutex::new(None)),
        }
    }

    /// 投票を作成し、現在の投票を置き換える
    ///
    /// 入力の検証は呼び出し側の責務です。置き換えられた投票は履歴に残らず、
    /// そのカウントダウンは中断されます。
    pub async fn create_poll(
        &self,
        question: String,
        options: Vec<String>,
        duration: u32,
        correct_answers: BTreeSet<usize>,
    ) -> Poll {
        let mut session = self.repository.lock().await;
        self.cancel_countdown().await;

        let poll = Poll::new(
            PollIdFactory::generate(),
            question,
            options,
            duration,
            correct_answers,
            Timestamp::now(),
        );
        if let Some(replaced) = session.replace_poll(poll.clone()) {
            tracing::info!("Poll '{}' replaced by '{}'", replaced.id, poll.id);
        }
        tracing::info!(
            "Poll '{}' created ({} options, {}s)",
            poll.id,
            poll.options.len(),
            poll.duration
        );

        self.publisher
            .broadcast(ClassroomEvent::PollCreated(poll.clone()))
            .await;
        self.publisher
            .broadcast(ClassroomEvent::StudentsUpdated(
                session.participants().to_vec(),
            ))
            .await;

        poll
    }

    /// 現在の投票を開始し、カウントダウンを起動する
    ///
    /// 投票がない場合は何もしません。開始中の投票に対して呼ばれた場合は
    /// 既存のカウントダウンを中断してから最初からやり直します。
    pub async fn start_poll(&self) -> Option<Poll> {
        let mut session = self.repository.lock().await;

        let Some(poll) = session.start_poll(Timestamp::now()).cloned() else {
            tracing::debug!("start-poll ignored: no current poll");
            return None;
        };
        {
            let mut countdown = self.countdown.lock().await;
            if let Some(previous) = countdown.take() {
                previous.handle.abort();
                tracing::debug!("Countdown for poll '{}' restarted", previous.poll_id);
            }
            // no await between spawn and store
            *countdown = Some(Countdown {
                poll_id: poll.id.clone(),
                handle: self.spawn_countdown(poll.id.clone()),
            });
        }
        tracing::info!("Poll '{}' started ({}s)", poll.id, poll.duration);

        self.publisher
            .broadcast(ClassroomEvent::PollStarted(poll.clone()))
            .await;
        self.publisher
            .broadcast(ClassroomEvent::StudentsUpdated(
                session.participants().to_vec(),
            ))
            .await;

        Some(poll)
    }

    /// 現在の投票を停止する
    ///
    /// 開始前の投票も停止して履歴に追加します。投票がない、または既に
    /// 終了している場合は何もしません。
    pub async fn stop_poll(&self) -> Option<Poll> {
        let mut session = self.repository.lock().await;
        self.cancel_countdown().await;
        self.finish_poll(&mut session).await
    }

    /// 手動停止と時間切れで共通の停止処理
    async fn finish_poll(&self, session: &mut SessionState) -> Option<Poll> {
        let Some(poll) = session.stop_poll(Timestamp::now()).cloned() else {
            tracing::debug!("stop-poll ignored: no poll to stop");
            return None;
        };
        tracing::info!(
            "Poll '{}' stopped with {} response(s)",
            poll.id,
            poll.total_responses
        );

        self.publisher
            .broadcast(ClassroomEvent::PollStopped(poll.clone()))
            .await;
        self.publisher
            .broadcast(ClassroomEvent::PollHistoryUpdated(session.poll_history()))
            .await;

        Some(poll)
    }

    fn spawn_countdown(&self, poll_id: PollId) -> AbortHandle {
        let engine = self.clone();
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + TICK_PERIOD, TICK_PERIOD);
            loop {
                ticker.tick().await;
                if !engine.tick(&poll_id).await {
                    break;
                }
            }
            tracing::debug!("Countdown for poll '{}' finished", poll_id);
        });
        task.abort_handle()
    }

    /// 1 秒分のカウントダウンを進める。続行する場合は true を返す
    async fn tick(&self, poll_id: &PollId) -> bool {
        let mut session = self.repository.lock().await;

        match session.tick_countdown(poll_id) {
            CountdownTick::Inactive => {
                self.release_countdown(poll_id).await;
                false
            }
            CountdownTick::Running { time_remaining } => {
                tracing::debug!("Poll '{}': {}s remaining", poll_id, time_remaining);
                if time_remaining == NOTIFICATION_THRESHOLD_SECS {
                    self.notify_time_running_out(&mut session).await;
                }
                self.publisher
                    .broadcast(ClassroomEvent::PollTimerUpdate { time_remaining })
                    .await;
                true
            }
            CountdownTick::Expired => {
                self.release_countdown(poll_id).await;
                tracing::info!("Poll '{}' timed out", poll_id);
                self.finish_poll(&mut session).await;
                false
            }
        }
    }

    async fn notify_time_running_out(&self, session: &mut SessionState) {
        let Some(poll) = session.current_poll() else {
            return;
        };
        let text = format!(
            "Only {} seconds remaining for poll \"{}\"! Submit your response quickly!",
            NOTIFICATION_THRESHOLD_SECS, poll.question
        );
        let message = ChatMessage::notification(
            MessageIdFactory::generate(),
            MessageContent::system(text),
            Timestamp::now(),
        );
        session.push_public_message(message.clone());
        self.publisher
            .broadcast(ClassroomEvent::NewMessage(message))
            .await;
    }

    /// 実行中のカウントダウンを中断する（セッションのロック保持中に呼ぶこと）
    async fn cancel_countdown(&self) {
        if let Some(countdown) = self.countdown.lock().await.take() {
            countdown.handle.abort();
            tracing::debug!("Countdown for poll '{}' cancelled", countdown.poll_id);
        }
    }

    /// カウントダウンタスク自身が終了する際にハンドルを手放す
    async fn release_countdown(&self, poll_id: &PollId) {
        self.countdown
            .lock()
            .await
            .take_if(|countdown| &countdown.poll_id == poll_id);
    }
}
