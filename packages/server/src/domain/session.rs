//! Session aggregate: the authoritative state of one classroom.
//!
//! Holds the participants, the current poll, the poll history, the public
//! chat log and the private conversations. Every mutation goes through a
//! method here; callers obtain `&mut SessionState` only through
//! [`SessionRepository::lock`](super::SessionRepository::lock), so each
//! method call runs inside one locked step.

use std::collections::{HashMap, VecDeque};

use super::{
    entity::{ChatMessage, Participant, Poll, Student, Teacher},
    error::{JoinError, ResponseError},
    value_object::{ConnectionId, ConversationKey, PollId, Timestamp},
};

/// Default maximum number of ended polls kept in history
pub const DEFAULT_POLL_HISTORY_CAPACITY: usize = 10;

/// Default maximum number of messages kept in the shared chat log
pub const DEFAULT_CHAT_LOG_CAPACITY: usize = 100;

/// Outcome of one countdown tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownTick {
    /// The poll is gone, replaced or no longer active
    Inactive,
    /// The poll keeps running with this many seconds left
    Running { time_remaining: u32 },
    /// The clock reached zero; the poll must be stopped
    Expired,
}

/// Accepted poll response
#[derive(Debug, Clone)]
pub struct ResponseAccepted {
    /// Poll state after the response was counted
    pub poll: Poll,
    pub is_correct: bool,
}

#[derive(Debug, Clone)]
pub struct SessionState {
    participants: Vec<Participant>,
    current_poll: Option<Poll>,
    /// Ended polls, newest first
    poll_history: VecDeque<Poll>,
    /// Public, question and notification messages, oldest first
    chat_log: VecDeque<ChatMessage>,
    private_conversations: HashMap<ConversationKey, Vec<ChatMessage>>,
    poll_history_capacity: usize,
    chat_log_capacity: usize,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionState {
    /// Create an empty session with default capacities
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_POLL_HISTORY_CAPACITY, DEFAULT_CHAT_LOG_CAPACITY)
    }

    /// Create an empty session with custom capacities
    pub fn with_capacity(poll_history_capacity: usize, chat_log_capacity: usize) -> Self {
        Self {
            participants: Vec::new(),
            current_poll: None,
            poll_history: VecDeque::new(),
            chat_log: VecDeque::new(),
            private_conversations: HashMap::new(),
            poll_history_capacity,
            chat_log_capacity,
        }
    }

    // ----------------------------------------------------------------------
    // Participants
    // ----------------------------------------------------------------------

    /// Participants in join order
    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    pub fn participant(&self, id: &ConnectionId) -> Option<&Participant> {
        self.participants.iter().find(|p| p.id() == id)
    }

    pub fn student(&self, id: &ConnectionId) -> Option<&Student> {
        self.participant(id).and_then(Participant::as_student)
    }

    fn student_mut(&mut self, id: &ConnectionId) -> Option<&mut Student> {
        self.participants.iter_mut().find_map(|p| match p {
            Participant::Student(student) if &student.id == id => Some(student),
            _ => None,
        })
    }

    /// Register a student
    ///
    /// # Errors
    ///
    /// Returns `JoinError::DuplicateUsername` if another student already uses
    /// the same username (exact, case-sensitive match). The caller's own
    /// entry, if it joined before, does not count.
    pub fn join_student(&mut self, student: Student) -> Result<(), JoinError> {
        let taken = self.participants.iter().any(|p| match p {
            Participant::Student(other) => {
                other.id != student.id && other.username == student.username
            }
            Participant::Teacher(_) => false,
        });
        if taken {
            return Err(JoinError::DuplicateUsername(
                student.username.as_str().to_string(),
            ));
        }
        self.upsert_participant(Participant::Student(student));
        Ok(())
    }

    /// Register a teacher (no uniqueness check)
    pub fn join_teacher(&mut self, teacher: Teacher) {
        self.upsert_participant(Participant::Teacher(teacher));
    }

    /// Replace the entry of the same connection in place, or append
    fn upsert_participant(&mut self, participant: Participant) {
        match self
            .participants
            .iter_mut()
            .find(|p| p.id() == participant.id())
        {
            Some(existing) => *existing = participant,
            None => self.participants.push(participant),
        }
    }

    /// Remove a student by ID; teachers are left untouched
    pub fn remove_student(&mut self, id: &ConnectionId) -> Option<Student> {
        let position = self
            .participants
            .iter()
            .position(|p| matches!(p, Participant::Student(s) if &s.id == id))?;
        match self.participants.remove(position) {
            Participant::Student(student) => Some(student),
            Participant::Teacher(_) => None,
        }
    }

    /// Remove whichever participant is registered under the connection
    pub fn remove_participant(&mut self, id: &ConnectionId) -> Option<Participant> {
        let position = self.participants.iter().position(|p| p.id() == id)?;
        Some(self.participants.remove(position))
    }

    fn reset_student_responses(&mut self) {
        for participant in &mut self.participants {
            if let Participant::Student(student) = participant {
                student.reset_response();
            }
        }
    }

    // ----------------------------------------------------------------------
    // Poll lifecycle
    // ----------------------------------------------------------------------

    pub fn current_poll(&self) -> Option<&Poll> {
        self.current_poll.as_ref()
    }

    /// Make `poll` the current poll and reset every student.
    ///
    /// Returns the poll it replaced, if any. The replaced poll is dropped, not
    /// archived.
    pub fn replace_poll(&mut self, poll: Poll) -> Option<Poll> {
        self.reset_student_responses();
        self.current_poll.replace(poll)
    }

    /// Activate the current poll and reset every student.
    ///
    /// Returns `None` if there is no current poll.
    pub fn start_poll(&mut self, now: Timestamp) -> Option<&Poll> {
        let poll = self.current_poll.as_mut()?;
        poll.start(now);
        self.reset_student_responses();
        self.current_poll.as_ref()
    }

    /// End the current poll and archive a snapshot at the front of history.
    ///
    /// A created poll that was never started can be stopped too. Returns
    /// `None` (and changes nothing) if there is no current poll or it has
    /// already ended.
    pub fn stop_poll(&mut self, now: Timestamp) -> Option<&Poll> {
        let poll = self.current_poll.as_mut().filter(|p| p.ended_at.is_none())?;
        poll.end(now);
        self.poll_history.push_front(poll.clone());
        self.poll_history.truncate(self.poll_history_capacity);
        self.current_poll.as_ref()
    }

    /// Advance the countdown of poll `poll_id` by one second
    pub fn tick_countdown(&mut self, poll_id: &PollId) -> CountdownTick {
        let Some(poll) = self
            .current_poll
            .as_mut()
            .filter(|p| &p.id == poll_id && p.is_active)
        else {
            return CountdownTick::Inactive;
        };
        poll.time_remaining = poll.time_remaining.saturating_sub(1);
        if poll.time_remaining == 0 {
            CountdownTick::Expired
        } else {
            CountdownTick::Running {
                time_remaining: poll.time_remaining,
            }
        }
    }

    /// Ended polls, newest first
    pub fn poll_history(&self) -> Vec<Poll> {
        self.poll_history.iter().cloned().collect()
    }

    // ----------------------------------------------------------------------
    // Responses
    // ----------------------------------------------------------------------

    /// Record a student's answer to the active poll.
    ///
    /// # Errors
    ///
    /// Rejects, without mutating anything, when there is no poll, the poll is
    /// not active, the connection is not a student, the student already
    /// answered in this cycle, or the option does not exist.
    pub fn submit_response(
        &mut self,
        id: &ConnectionId,
        option_index: usize,
    ) -> Result<ResponseAccepted, ResponseError> {
        let poll = self.current_poll.as_ref().ok_or(ResponseError::NoPoll)?;
        if !poll.is_active {
            return Err(ResponseError::PollNotActive);
        }
        let student = self.student(id).ok_or(ResponseError::NotAStudent)?;
        if student.has_responded {
            return Err(ResponseError::AlreadyResponded);
        }
        if option_index >= poll.options.len() {
            return Err(ResponseError::InvalidOption {
                index: option_index,
            });
        }
        let is_correct = poll.is_correct(option_index);

        if let Some(student) = self.student_mut(id) {
            student.record_response(option_index, is_correct);
        }
        let poll = self.current_poll.as_mut().ok_or(ResponseError::NoPoll)?;
        poll.record_response(option_index);

        Ok(ResponseAccepted {
            poll: poll.clone(),
            is_correct,
        })
    }

    // ----------------------------------------------------------------------
    // Chat
    // ----------------------------------------------------------------------

    /// Append to the shared log, evicting the oldest message when full
    pub fn push_public_message(&mut self, message: ChatMessage) {
        self.chat_log.push_back(message);
        while self.chat_log.len() > self.chat_log_capacity {
            self.chat_log.pop_front();
        }
    }

    /// Append to the conversation between the sender and `recipient`
    pub fn push_private_message(&mut self, recipient: &ConnectionId, message: ChatMessage) {
        let key = ConversationKey::new(&message.sender_id, recipient);
        self.private_conversations
            .entry(key)
            .or_default()
            .push(message);
    }

    /// Shared log, oldest first
    pub fn chat_log(&self) -> Vec<ChatMessage> {
        self.chat_log.iter().cloned().collect()
    }

    /// Messages exchanged between `a` and `b`, oldest first
    pub fn private_conversation(&self, a: &ConnectionId, b: &ConnectionId) -> Vec<ChatMessage> {
        self.private_conversations
            .get(&ConversationKey::new(a, b))
            .cloned()
            .unwrap_or_default()
    }
}
