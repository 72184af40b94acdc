//! Core domain models for the classroom session.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::value_object::{ConnectionId, MessageContent, MessageId, PollId, Timestamp, Username};

/// A connected participant: either a student or a teacher
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Participant {
    Student(Student),
    Teacher(Teacher),
}

impl Participant {
    /// Connection identifier of the participant
    pub fn id(&self) -> &ConnectionId {
        match self {
            Participant::Student(student) => &student.id,
            Participant::Teacher(teacher) => &teacher.id,
        }
    }

    /// Display name of the participant
    pub fn username(&self) -> &Username {
        match self {
            Participant::Student(student) => &student.username,
            Participant::Teacher(teacher) => &teacher.username,
        }
    }

    pub fn as_student(&self) -> Option<&Student> {
        match self {
            Participant::Student(student) => Some(student),
            Participant::Teacher(_) => None,
        }
    }

    pub fn is_teacher(&self) -> bool {
        matches!(self, Participant::Teacher(_))
    }
}

/// A student and their response state for the current poll
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Student {
    /// Connection identifier
    pub id: ConnectionId,
    /// Display name, unique among students
    pub username: Username,
    pub is_online: bool,
    /// Timestamp when the student joined
    pub joined_at: Timestamp,
    /// Whether the student answered in the current poll cycle
    pub has_responded: bool,
    /// Option the student picked, if any
    pub selected_option: Option<usize>,
    /// Whether the picked option was correct, if answered
    pub answered_correctly: Option<bool>,
}

impl Student {
    /// Create a new online student with no response recorded
    pub fn new(id: ConnectionId, username: Username, joined_at: Timestamp) -> Self {
        Self {
            id,
            username,
            is_online: true,
            joined_at,
            has_responded: false,
            selected_option: None,
            answered_correctly: None,
        }
    }

    /// Clear the response fields before a new poll cycle
    pub fn reset_response(&mut self) {
        self.has_responded = false;
        self.selected_option = None;
        self.answered_correctly = None;
    }

    /// Record an accepted response
    pub fn record_response(&mut self, option_index: usize, is_correct: bool) {
        self.has_responded = true;
        self.selected_option = Some(option_index);
        self.answered_correctly = Some(is_correct);
    }
}

/// A teacher connection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Teacher {
    /// Connection identifier
    pub id: ConnectionId,
    /// Display name (defaults to "Teacher")
    pub username: Username,
    pub is_online: bool,
    /// Timestamp when the teacher joined
    pub joined_at: Timestamp,
}

impl Teacher {
    pub fn new(id: ConnectionId, username: Username, joined_at: Timestamp) -> Self {
        Self {
            id,
            username,
            is_online: true,
            joined_at,
        }
    }
}

/// A timed multiple-choice poll
///
/// `question`, `options`, `correct_answers` and `duration` are fixed at
/// creation. Only the lifecycle and tally fields change afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Poll {
    pub id: PollId,
    pub question: String,
    pub options: Vec<String>,
    /// Indices of the options counted as correct
    pub correct_answers: BTreeSet<usize>,
    /// Duration of the poll in seconds
    pub duration: u32,
    pub is_active: bool,
    /// Number of responses per option index
    pub responses: BTreeMap<usize, u32>,
    pub total_responses: u32,
    /// Seconds left while the poll is active
    pub time_remaining: u32,
    pub created_at: Timestamp,
    pub started_at: Option<Timestamp>,
    pub ended_at: Option<Timestamp>,
}

impl Poll {
    /// Create a new inactive poll
    pub fn new(
        id: PollId,
        question: String,
        options: Vec<String>,
        duration: u32,
        correct_answers: BTreeSet<usize>,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id,
            question,
            options,
            correct_answers,
            duration,
            is_active: false,
            responses: BTreeMap::new(),
            total_responses: 0,
            time_remaining: duration,
            created_at,
            started_at: None,
            ended_at: None,
        }
    }

    /// Activate the poll and restart its clock and tallies
    pub fn start(&mut self, now: Timestamp) {
        self.is_active = true;
        self.time_remaining = self.duration;
        self.responses.clear();
        self.total_responses = 0;
        self.started_at = Some(now);
        self.ended_at = None;
    }

    /// Deactivate the poll
    pub fn end(&mut self, now: Timestamp) {
        self.is_active = false;
        self.time_remaining = 0;
        self.ended_at = Some(now);
    }

    pub fn is_correct(&self, option_index: usize) -> bool {
        self.correct_answers.contains(&option_index)
    }

    /// Count one response for `option_index`
    pub fn record_response(&mut self, option_index: usize) {
        *self.responses.entry(option_index).or_insert(0) += 1;
        self.total_responses += 1;
    }
}

/// Kind of a chat message
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    #[default]
    Public,
    Private,
    Question,
    Notification,
}

/// A chat message in the domain model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: MessageId,
    /// Sender's connection id ("system" for notifications)
    pub sender_id: ConnectionId,
    pub sender_name: Username,
    pub content: MessageContent,
    pub kind: MessageKind,
    /// Recipient of a private message
    pub recipient_id: Option<ConnectionId>,
    /// Timestamp when the message was sent
    pub timestamp: Timestamp,
}

impl ChatMessage {
    /// Create a new chat message
    pub fn new(
        id: MessageId,
        sender_id: ConnectionId,
        sender_name: Username,
        content: MessageContent,
        kind: MessageKind,
        recipient_id: Option<ConnectionId>,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            id,
            sender_id,
            sender_name,
            content,
            kind,
            recipient_id,
            timestamp,
        }
    }

    /// Create a system notification
    pub fn notification(id: MessageId, content: MessageContent, timestamp: Timestamp) -> Self {
        Self::new(
            id,
            ConnectionId::system(),
            Username::system(),
            content,
            MessageKind::Notification,
            None,
            timestamp,
        )
    }

    /// Whether this message goes to a 1:1 conversation instead of the shared log
    pub fn is_private(&self) -> bool {
        self.kind == MessageKind::Private && self.recipient_id.is_some()
    }
}
