//! Value Objects for domain models.
//!
//! Value Objects are immutable objects that represent values in the domain.
//! They are compared by their value, not by identity.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::error::ValueObjectError;

/// Maximum length of a connection identifier
const CONNECTION_ID_MAX_LEN: usize = 100;

/// Maximum length of a chat message (in characters)
const MESSAGE_CONTENT_MAX_LEN: usize = 10000;

/// Connection identifier value object.
///
/// Identifies one transport connection. Participants are keyed by it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ConnectionId(String);

impl ConnectionId {
    /// Create a new ConnectionId.
    ///
    /// # Errors
    ///
    /// Returns an error if the id is empty or longer than 100 bytes.
    pub fn new(id: String) -> Result<Self, ValueObjectError> {
        if id.is_empty() {
            return Err(ValueObjectError::ConnectionIdEmpty);
        }
        let len = id.len();
        if len > CONNECTION_ID_MAX_LEN {
            return Err(ValueObjectError::ConnectionIdTooLong {
                max: CONNECTION_ID_MAX_LEN,
                actual: len,
            });
        }
        Ok(Self(id))
    }

    /// Create a ConnectionId from a UUID.
    pub fn from_uuid(uuid: uuid::Uuid) -> Self {
        Self(uuid.to_string())
    }

    /// Reserved sender identity for messages generated by the server.
    pub fn system() -> Self {
        Self("system".to_string())
    }

    /// Get the inner string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Convert to owned String.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for ConnectionId {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Display name of a participant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Username(String);

impl Username {
    /// Create a new Username.
    ///
    /// The name is kept as given (no trimming) so that uniqueness stays an
    /// exact, case-sensitive comparison.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is blank.
    pub fn new(name: String) -> Result<Self, ValueObjectError> {
        if name.trim().is_empty() {
            return Err(ValueObjectError::UsernameEmpty);
        }
        Ok(Self(name))
    }

    /// Teacher display name, falling back to `"Teacher"` when blank.
    pub fn teacher_or_default(name: Option<String>) -> Self {
        name.and_then(|n| Self::new(n).ok())
            .unwrap_or_else(|| Self("Teacher".to_string()))
    }

    /// Display name of the system sender.
    pub fn system() -> Self {
        Self("System".to_string())
    }

    /// Get the inner string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Username {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Poll identifier value object (UUID v4 string).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PollId(String);

impl PollId {
    /// Create a PollId from a UUID.
    pub fn from_uuid(uuid: uuid::Uuid) -> Self {
        Self(uuid.to_string())
    }

    /// Get the inner string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PollId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Chat message identifier value object (UUID v4 string).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(String);

impl MessageId {
    /// Create a MessageId from a UUID.
    pub fn from_uuid(uuid: uuid::Uuid) -> Self {
        Self(uuid.to_string())
    }

    /// Get the inner string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Message content value object.
///
/// Represents the trimmed content of a chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageContent(String);

impl MessageContent {
    /// Create a new MessageContent.
    ///
    /// Leading and trailing whitespace is removed before validation.
    ///
    /// # Errors
    ///
    /// Returns an error if the trimmed content is empty or longer than
    /// 10000 characters.
    pub fn new(content: String) -> Result<Self, ValueObjectError> {
        let trimmed = content.trim();
        if trimmed.is_empty() {
            return Err(ValueObjectError::MessageContentEmpty);
        }
        let len = trimmed.chars().count();
        if len > MESSAGE_CONTENT_MAX_LEN {
            return Err(ValueObjectError::MessageContentTooLong {
                max: MESSAGE_CONTENT_MAX_LEN,
                actual: len,
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Server-authored text. Trimmed but not length-checked, since it may
    /// quote user input such as a poll question.
    pub fn system(content: String) -> Self {
        Self(content.trim().to_string())
    }

    /// Get the inner string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Convert to owned String.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for MessageContent {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for MessageContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Timestamp value object.
///
/// Represents a Unix timestamp in milliseconds (UTC).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(i64);

impl Timestamp {
    /// Create a new Timestamp from Unix milliseconds.
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// Current time.
    pub fn now() -> Self {
        Self(kyoshitsu_shared::time::get_utc_timestamp())
    }

    /// Get the inner i64 value.
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Key of a private 1:1 conversation.
///
/// Built from the two participant ids in sorted order, so both sides of a
/// conversation map to the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConversationKey(ConnectionId, ConnectionId);

impl ConversationKey {
    pub fn new(a: &ConnectionId, b: &ConnectionId) -> Self {
        if a <= b {
            Self(a.clone(), b.clone())
        } else {
            Self(b.clone(), a.clone())
        }
    }
}

impl fmt::Display for ConversationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.0, self.1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_id_new_success() {
        // テスト項目: 有効な接続 ID を作成できる
        // given (前提条件):
        let id = "c0ffee".to_string();

        // when (操作):
        let result = ConnectionId::new(id);

        // then (期待する結果):
        assert!(result.is_ok());
        assert_eq!(result.unwrap().as_str(), "c0ffee");
    }

    #[test]
    fn test_connection_id_new_empty_fails() {
        // テスト項目: 空の接続 ID は作成できない
        // when (操作):
        let result = ConnectionId::new(String::new());

        // then (期待する結果):
        assert_eq!(result.unwrap_err(), ValueObjectError::ConnectionIdEmpty);
    }

    #[test]
    fn test_connection_id_new_too_long_fails() {
        // テスト項目: 101 文字以上の接続 ID は作成できない
        // given (前提条件):
        let id = "a".repeat(101);

        // when (操作):
        let result = ConnectionId::new(id);

        // then (期待する結果):
        assert_eq!(
            result.unwrap_err(),
            ValueObjectError::ConnectionIdTooLong {
                max: 100,
                actual: 101
            }
        );
    }

    #[test]
    fn test_username_keeps_case_and_spacing() {
        // テスト項目: ユーザー名は大文字小文字・空白を保持する（完全一致比較のため）
        // when (操作):
        let alice = Username::new("Alice".to_string()).unwrap();
        let alice_lower = Username::new("alice".to_string()).unwrap();

        // then (期待する結果):
        assert_eq!(alice.as_str(), "Alice");
        assert_ne!(alice, alice_lower);
    }

    #[test]
    fn test_username_blank_fails() {
        // テスト項目: 空白のみのユーザー名は作成できない
        // when (操作):
        let result = Username::new("   ".to_string());

        // then (期待する結果):
        assert_eq!(result.unwrap_err(), ValueObjectError::UsernameEmpty);
    }

    #[test]
    fn test_long_username_is_accepted() {
        // テスト項目: ユーザー名に長さの上限はない
        // when (操作):
        let result = Username::new("a".repeat(51));

        // then (期待する結果):
        assert_eq!(result.unwrap().as_str().chars().count(), 51);
    }

    #[test]
    fn test_teacher_username_defaults_when_blank() {
        // テスト項目: 教師名が未指定・空白の場合は "Teacher" になる
        // then (期待する結果):
        assert_eq!(Username::teacher_or_default(None).as_str(), "Teacher");
        assert_eq!(
            Username::teacher_or_default(Some("  ".to_string())).as_str(),
            "Teacher"
        );
        assert_eq!(
            Username::teacher_or_default(Some("Ms. Sato".to_string())).as_str(),
            "Ms. Sato"
        );
        let long_name = format!("Professor {}", "b".repeat(50));
        assert_eq!(
            Username::teacher_or_default(Some(long_name.clone())).as_str(),
            long_name
        );
    }

    #[test]
    fn test_message_content_is_trimmed() {
        // テスト項目: メッセージ内容は前後の空白が取り除かれる
        // when (操作):
        let content = MessageContent::new("  Hello, class!  ".to_string()).unwrap();

        // then (期待する結果):
        assert_eq!(content.as_str(), "Hello, class!");
    }

    #[test]
    fn test_message_content_whitespace_only_fails() {
        // テスト項目: 空白のみのメッセージ内容は作成できない
        // when (操作):
        let result = MessageContent::new(" \n\t ".to_string());

        // then (期待する結果):
        assert_eq!(result.unwrap_err(), ValueObjectError::MessageContentEmpty);
    }

    #[test]
    fn test_message_content_new_too_long_fails() {
        // テスト項目: 10001 文字以上のメッセージ内容は作成できない
        // when (操作):
        let result = MessageContent::new("a".repeat(10001));

        // then (期待する結果):
        assert_eq!(
            result.unwrap_err(),
            ValueObjectError::MessageContentTooLong {
                max: 10000,
                actual: 10001
            }
        );
    }

    #[test]
    fn test_system_message_content_has_no_length_limit() {
        // テスト項目: システムが作るメッセージ内容は長さの上限を受けない
        // when (操作):
        let content = MessageContent::system(format!(" {} ", "a".repeat(10001)));

        // then (期待する結果):
        assert_eq!(content.as_str().chars().count(), 10001);
    }

    #[test]
    fn test_conversation_key_is_order_independent() {
        // テスト項目: 会話キーは 2 つの ID の順序に依存しない
        // given (前提条件):
        let alice = ConnectionId::new("alice-conn".to_string()).unwrap();
        let bob = ConnectionId::new("bob-conn".to_string()).unwrap();

        // when (操作):
        let forward = ConversationKey::new(&alice, &bob);
        let backward = ConversationKey::new(&bob, &alice);

        // then (期待する結果):
        assert_eq!(forward, backward);
        assert_eq!(forward.to_string(), "alice-conn:bob-conn");
    }

    #[test]
    fn test_timestamp_ordering() {
        // テスト項目: タイムスタンプは順序付けできる
        // given (前提条件):
        let ts1 = Timestamp::new(1000);
        let ts2 = Timestamp::new(2000);

        // then (期待する結果):
        assert!(ts1 < ts2);
        assert_eq!(ts2.value(), 2000);
    }
}
