//! Validation logic for answer submissions
//!
//! Submissions are rejected here before any durable write happens.

use crate::saga::AnswerSubmission;
use thiserror::Error;

/// Validation errors for answer submissions
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("userId must be a positive integer, got {0}")]
    InvalidUserId(i64),

    #[error("questionId must be a positive integer, got {0}")]
    InvalidQuestionId(i64),

    #[error("selectedChoiceId must be a positive integer, got {0}")]
    InvalidChoiceId(i64),

    #[error("quizModeId cannot be empty when present")]
    EmptyQuizModeId,
}

/// Validate an answer submission
///
/// # Validation Rules
///
/// - `userId`: must be positive
/// - `questionId`: must be positive
/// - `selectedChoiceId`: if present, must be positive
/// - `quizModeId`: if present, must be non-empty
///
/// # Errors
///
/// Returns `ValidationError` if any rule is violated
pub fn validate_submission(submission: &AnswerSubmission) -> Result<(), ValidationError> {
    if submission.user_id <= 0 {
        return Err(ValidationError::InvalidUserId(submission.user_id));
    }

    if submission.question_id <= 0 {
        return Err(ValidationError::InvalidQuestionId(submission.question_id));
    }

    if let Some(choice_id) = submission.selected_choice_id {
        if choice_id <= 0 {
            return Err(ValidationError::InvalidChoiceId(choice_id));
        }
    }

    if let Some(ref quiz_mode_id) = submission.quiz_mode_id {
        if quiz_mode_id.is_empty() {
            return Err(ValidationError::EmptyQuizModeId);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_valid_submission() -> AnswerSubmission {
        AnswerSubmission {
            user_id: 7,
            question_id: 42,
            selected_choice_id: Some(3),
            quiz_mode_id: Some("practice".to_string()),
            is_correct: true,
            question_type: None,
            practical: None,
            difficulty: None,
        }
    }

    #[test]
    fn test_valid_submission() {
        assert!(validate_submission(&create_valid_submission()).is_ok());
    }

    #[test]
    fn test_zero_user_id() {
        let mut submission = create_valid_submission();
        submission.user_id = 0;
        assert_eq!(
            validate_submission(&submission),
            Err(ValidationError::InvalidUserId(0))
        );
    }

    #[test]
    fn test_negative_user_id() {
        let mut submission = create_valid_submission();
        submission.user_id = -3;
        assert_eq!(
            validate_submission(&submission),
            Err(ValidationError::InvalidUserId(-3))
        );
    }

    #[test]
    fn test_zero_question_id() {
        let mut submission = create_valid_submission();
        submission.question_id = 0;
        assert_eq!(
            validate_submission(&submission),
            Err(ValidationError::InvalidQuestionId(0))
        );
    }

    #[test]
    fn test_invalid_choice_id() {
        let mut submission = create_valid_submission();
        submission.selected_choice_id = Some(-1);
        assert_eq!(
            validate_submission(&submission),
            Err(ValidationError::InvalidChoiceId(-1))
        );
    }

    #[test]
    fn test_missing_choice_id_is_allowed() {
        let mut submission = create_valid_submission();
        submission.selected_choice_id = None;
        assert!(validate_submission(&submission).is_ok());
    }

    #[test]
    fn test_empty_quiz_mode_id() {
        let mut submission = create_valid_submission();
        submission.quiz_mode_id = Some(String::new());
        assert_eq!(
            validate_submission(&submission),
            Err(ValidationError::EmptyQuizModeId)
        );
    }
}
