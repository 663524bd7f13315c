//! Achievement award rules
//!
//! Threshold rules evaluated against the per-user answer projection after
//! each correct answer. Rule IDs match the seeded `achievements` rows.

use crate::models::AnswerProjection;

/// One award rule: achievement identity plus its qualifying predicate
pub struct AchievementRule {
    pub id: i64,
    pub title: &'static str,
    check: fn(&AnswerProjection) -> bool,
}

impl AchievementRule {
    pub fn qualifies(&self, projection: &AnswerProjection) -> bool {
        (self.check)(projection)
    }
}

/// All award rules, in award-priority order
pub const RULES: [AchievementRule; 4] = [
    AchievementRule {
        id: 1,
        title: "First Steps",
        check: |p| p.correct_answers >= 1,
    },
    AchievementRule {
        id: 2,
        title: "Ten in a Row of Right",
        check: |p| p.correct_answers >= 10,
    },
    AchievementRule {
        id: 3,
        title: "Half Century",
        check: |p| p.correct_answers >= 50,
    },
    AchievementRule {
        id: 4,
        title: "Hands On",
        check: |p| p.practical_correct >= 10,
    },
];

/// Rules the user currently qualifies for
pub fn qualifying_rules(projection: &AnswerProjection) -> Vec<&'static AchievementRule> {
    RULES.iter().filter(|r| r.qualifies(projection)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn projection(total: i64, correct: i64, practical: i64) -> AnswerProjection {
        AnswerProjection {
            user_id: 7,
            total_answers: total,
            correct_answers: correct,
            practical_correct: practical,
        }
    }

    #[test]
    fn test_no_rules_qualify_on_empty_projection() {
        assert!(qualifying_rules(&projection(0, 0, 0)).is_empty());
    }

    #[test]
    fn test_first_correct_answer_qualifies_first_steps() {
        let qualified = qualifying_rules(&projection(3, 1, 0));
        assert_eq!(qualified.len(), 1);
        assert_eq!(qualified[0].id, 1);
    }

    #[test]
    fn test_ten_correct_qualifies_two_rules() {
        let qualified = qualifying_rules(&projection(15, 10, 0));
        let ids: Vec<i64> = qualified.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_practical_threshold() {
        let qualified = qualifying_rules(&projection(20, 12, 10));
        let ids: Vec<i64> = qualified.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2, 4]);
    }

    #[test]
    fn test_incorrect_answers_do_not_count() {
        // Lots of attempts, none correct
        assert!(qualifying_rules(&projection(100, 0, 0)).is_empty());
    }
}
