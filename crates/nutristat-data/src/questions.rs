//! Classification of survey questions by which end of the scale is better.

/// Questions where a lower percentage is the better outcome.
pub const QUESTIONS_BEST_IS_MIN: [&str; 5] = [
    "Percent of adults aged 18 years and older who have an overweight classification",
    "Percent of adults aged 18 years and older who have obesity",
    "Percent of adults who engage in no leisure-time physical activity",
    "Percent of adults who report consuming fruit less than one time daily",
    "Percent of adults who report consuming vegetables less than one time daily",
];

/// Questions where a higher percentage is the better outcome.
///
/// The third entry's irregular spacing matches the dataset text.
pub const QUESTIONS_BEST_IS_MAX: [&str; 4] = [
    "Percent of adults who achieve at least 150 minutes a week of moderate-intensity aerobic physical activity or 75 minutes a week of vigorous-intensity aerobic activity (or an equivalent combination)",
    "Percent of adults who achieve at least 150 minutes a week of moderate-intensity aerobic physical activity or 75 minutes a week of vigorous-intensity aerobic physical activity and engage in muscle-strengthening activities on 2 or more days a week",
    "Percent     of adults who achieve at least 300 minutes a week of moderate-intensity aerobic physical activity or 150 minutes a week of vigorous-intensity aerobic activity (or an equivalent combination)",
    "Percent of adults who engage in muscle-strengthening activities on 2 or more days a week",
];

/// Which end of the scale is the better outcome for a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    LowerIsBetter,
    HigherIsBetter,
}

impl Direction {
    /// Classifies a question against both lists.
    ///
    /// Questions in neither list fall back to [`Direction::HigherIsBetter`].
    pub fn of(question: &str) -> Self {
        Self::classify(question).unwrap_or(Direction::HigherIsBetter)
    }

    /// Classifies a question, or `None` when it is in neither list.
    pub fn classify(question: &str) -> Option<Self> {
        if QUESTIONS_BEST_IS_MIN.contains(&question) {
            Some(Direction::LowerIsBetter)
        } else if QUESTIONS_BEST_IS_MAX.contains(&question) {
            Some(Direction::HigherIsBetter)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_of_known_questions() {
        for q in QUESTIONS_BEST_IS_MIN {
            assert_eq!(Direction::of(q), Direction::LowerIsBetter);
        }
        for q in QUESTIONS_BEST_IS_MAX {
            assert_eq!(Direction::of(q), Direction::HigherIsBetter);
        }
    }

    #[test]
    fn test_unlisted_question_prefers_high() {
        assert_eq!(Direction::classify("Something else"), None);
        assert_eq!(Direction::of("Something else"), Direction::HigherIsBetter);
    }

    #[test]
    fn test_max_list_is_classified_explicitly() {
        for q in QUESTIONS_BEST_IS_MAX {
            assert_eq!(Direction::classify(q), Some(Direction::HigherIsBetter));
        }
        for q in QUESTIONS_BEST_IS_MIN {
            assert_eq!(Direction::classify(q), Some(Direction::LowerIsBetter));
        }
    }
}
