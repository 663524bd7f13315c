//! # Event Types and Subjects
//!
//! Static, exhaustive mapping between event types and NATS subjects.
//!
//! The subject naming convention is `domain.action` (e.g. `answer.submitted`).
//! The canonical scheme is dot-separated throughout; `answer.submission.failed`
//! is the canonical failure subject. Mapping is a compile-checked `match`, so
//! an unmapped event type cannot exist at runtime; [`verify_subject_table`]
//! additionally validates the table shape at startup.

use serde::{Deserialize, Serialize};

/// All event types published or consumed by the quiz platform services
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    #[serde(rename = "answer.submitted")]
    AnswerSubmitted,
    #[serde(rename = "answer.submission.failed")]
    AnswerSubmissionFailed,
    #[serde(rename = "achievement.check")]
    AchievementCheck,
    #[serde(rename = "achievement.unlocked")]
    AchievementUnlocked,
    #[serde(rename = "leaderboard.update")]
    LeaderboardUpdate,
}

impl EventType {
    /// Every event type, for table verification and contract tests
    pub const ALL: [EventType; 5] = [
        EventType::AnswerSubmitted,
        EventType::AnswerSubmissionFailed,
        EventType::AchievementCheck,
        EventType::AchievementUnlocked,
        EventType::LeaderboardUpdate,
    ];

    /// The NATS subject this event type is published to
    pub fn subject(&self) -> &'static str {
        match self {
            EventType::AnswerSubmitted => "answer.submitted",
            EventType::AnswerSubmissionFailed => "answer.submission.failed",
            EventType::AchievementCheck => "achievement.check",
            EventType::AchievementUnlocked => "achievement.unlocked",
            EventType::LeaderboardUpdate => "leaderboard.update",
        }
    }

    /// The aggregate type events of this type refer to
    pub fn aggregate_type(&self) -> &'static str {
        match self {
            EventType::AnswerSubmitted | EventType::AnswerSubmissionFailed => "answer",
            EventType::AchievementCheck | EventType::AchievementUnlocked => "achievement",
            EventType::LeaderboardUpdate => "leaderboard",
        }
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.subject())
    }
}

/// Subject namespace reserved for saga compensation acknowledgments
///
/// Downstream reactors publish to `compensation.<correlationId>` when they
/// need to acknowledge (or reject) processing of a saga step. The coordinator
/// does not consume these yet.
pub fn compensation_subject(correlation_id: &str) -> String {
    format!("compensation.{}", correlation_id)
}

/// Verify the subject table at startup
///
/// Checks that every subject is well-formed (`domain.action` tokens, lowercase,
/// no wildcards) and that no two event types share a subject. Called from
/// service `main` before anything is published; a broken table aborts startup
/// instead of producing undefined subjects at runtime.
pub fn verify_subject_table() -> Result<(), String> {
    let mut seen = std::collections::HashSet::new();

    for event_type in EventType::ALL {
        let subject = event_type.subject();

        let tokens: Vec<&str> = subject.split('.').collect();
        if tokens.len() < 2 {
            return Err(format!(
                "subject '{}' must have at least two dot-separated tokens",
                subject
            ));
        }
        for token in &tokens {
            if token.is_empty()
                || !token
                    .chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
            {
                return Err(format!("subject '{}' has invalid token '{}'", subject, token));
            }
        }

        if !seen.insert(subject) {
            return Err(format!("duplicate subject '{}' in table", subject));
        }
    }

    Ok(())
}
