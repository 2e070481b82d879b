pub mod interactive;
pub mod report;
pub mod score;
pub mod wizard;

use crate::assessment::error::{ConfigError, ScoreError};
use crate::assessment::{Answers, Assessment};
use crate::core::score::HealthStatus;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SectionScore {
    pub name: String,
    pub score: u32,
    pub max: u32,
}

impl SectionScore {
    pub fn percentage(&self) -> u32 {
        score::percentage(self.score, self.max)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AssessmentResult {
    pub sections: Vec<SectionScore>,
    pub total: u32,
    pub max_possible_total: u32,
    pub percentage: u32,
    pub health_status: HealthStatus,
}

impl AssessmentResult {
    /// Sections scoring strictly below `threshold` percent, in section order.
    pub fn weak_sections(&self, threshold: u32) -> Vec<&SectionScore> {
        self.sections
            .iter()
            .filter(|section| section.percentage() < threshold)
            .collect()
    }
}

/// Reduces `answers` against `assessment` into a score breakdown.
///
/// Unanswered questions and yes/no items contribute zero. A question whose
/// section is missing from the maxima table is a configuration error.
pub fn score(assessment: &Assessment, answers: &Answers) -> Result<AssessmentResult, ScoreError> {
    let mut sections: Vec<SectionScore> = assessment
        .sections
        .iter()
        .map(|section| SectionScore {
            name: section.name.clone(),
            score: 0,
            max: section.max,
        })
        .collect();

    for question in &assessment.questions {
        let Some(section) = sections
            .iter_mut()
            .find(|section| section.name == question.section)
        else {
            return Err(ConfigError::UnknownSection {
                question: question.id.clone(),
                section: question.section.clone(),
            }
            .into());
        };
        section.score = section.score.saturating_add(question.points_from(answers));
    }

    let total = sections
        .iter()
        .fold(0u32, |total, section| total.saturating_add(section.score));
    let percentage = score::percentage(total, assessment.max_possible_total);
    let health_status = score::health_for_percentage(percentage);

    debug!(
        assessment = %assessment.id,
        answered = answers.len(),
        total,
        percentage,
        %health_status,
        "scored assessment"
    );

    Ok(AssessmentResult {
        sections,
        total,
        max_possible_total: assessment.max_possible_total,
        percentage,
        health_status,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assessment::tests::{group_assessment, two_question_assessment};
    use crate::assessment::{Answer, NO, QuestionKind, YES, builtin};

    fn extreme_answers(assessment: &Assessment, highest: bool) -> Answers {
        let mut answers = Answers::new();
        for question in &assessment.questions {
            match &question.kind {
                QuestionKind::SingleChoice { options } => {
                    let option = if highest {
                        options.iter().max_by_key(|option| option.points)
                    } else {
                        options.iter().min_by_key(|option| option.points)
                    }
                    .unwrap();
                    answers.insert(
                        question.id.clone(),
                        Answer::new(option.value.clone(), option.points),
                    );
                }
                QuestionKind::YesNoGroup { items, .. } => {
                    let value = if highest { YES } else { NO };
                    for item in items {
                        answers.insert(
                            item.id.clone(),
                            assessment.resolve(&item.id, value).unwrap(),
                        );
                    }
                }
            }
        }
        answers
    }

    #[test]
    fn two_question_scenario() {
        let assessment = two_question_assessment();
        let mut answers = Answers::new();
        answers.insert("q1".to_string(), assessment.resolve("q1", "mid").unwrap());
        answers.insert("q2".to_string(), assessment.resolve("q2", "some").unwrap());

        let result = score(&assessment, &answers).unwrap();
        assert_eq!(
            result.sections,
            vec![
                SectionScore {
                    name: "A".to_string(),
                    score: 7,
                    max: 10,
                },
                SectionScore {
                    name: "B".to_string(),
                    score: 3,
                    max: 10,
                },
            ]
        );
        assert_eq!(result.total, 10);
        assert_eq!(result.max_possible_total, 20);
        assert_eq!(result.percentage, 50);
        assert_eq!(result.health_status, HealthStatus::Struggling);
    }

    #[test]
    fn unanswered_assessment_is_urgent() {
        let result = score(&two_question_assessment(), &Answers::new()).unwrap();
        assert_eq!(result.total, 0);
        assert_eq!(result.percentage, 0);
        assert_eq!(result.health_status, HealthStatus::Urgent);
    }

    #[test]
    fn yes_no_group_counts_each_item() {
        let assessment = group_assessment();

        let all_yes = extreme_answers(&assessment, true);
        let result = score(&assessment, &all_yes).unwrap();
        assert_eq!(result.sections[0].score, 4 * 3);
        assert_eq!(result.percentage, 100);

        let all_no = extreme_answers(&assessment, false);
        assert_eq!(score(&assessment, &all_no).unwrap().total, 0);

        let mut partial = Answers::new();
        partial.insert("sys_sales".to_string(), Answer::new(YES, 3));
        partial.insert("sys_hiring".to_string(), Answer::new(YES, 3));
        partial.insert("systems".to_string(), Answer::new(YES, 99));
        assert_eq!(score(&assessment, &partial).unwrap().total, 6);
    }

    #[test]
    fn builtin_extremes_hit_bounds() {
        for assessment in builtin::all().unwrap() {
            let lowest = score(&assessment, &extreme_answers(&assessment, false)).unwrap();
            let expected_min: u32 = assessment
                .questions
                .iter()
                .map(|question| question.min_points())
                .sum();
            assert_eq!(lowest.total, expected_min, "{}", assessment.id);

            let highest = score(&assessment, &extreme_answers(&assessment, true)).unwrap();
            assert_eq!(highest.total, assessment.max_possible_total, "{}", assessment.id);
            assert_eq!(highest.percentage, 100, "{}", assessment.id);
            assert_eq!(highest.health_status, HealthStatus::Thriving);
        }
    }

    #[test]
    fn unknown_section_fails_fast() {
        let mut assessment = two_question_assessment();
        assessment.questions[0].section = "Missing".to_string();

        let err = score(&assessment, &Answers::new()).unwrap_err();
        assert_eq!(
            err,
            ScoreError::Config(ConfigError::UnknownSection {
                question: "q1".to_string(),
                section: "Missing".to_string(),
            })
        );
    }

    #[test]
    fn hand_built_answers_saturate_instead_of_wrapping() {
        let assessment = two_question_assessment();
        let mut answers = Answers::new();
        answers.insert("q1".to_string(), Answer::new("x", u32::MAX));
        answers.insert("q2".to_string(), Answer::new("x", u32::MAX));

        let result = score(&assessment, &answers).unwrap();
        assert_eq!(result.total, u32::MAX);
        assert_eq!(result.health_status, HealthStatus::Thriving);
    }

    #[test]
    fn weak_sections_use_section_percentage() {
        let assessment = two_question_assessment();
        let mut answers = Answers::new();
        answers.insert("q1".to_string(), Answer::new("mid", 7));
        answers.insert("q2".to_string(), Answer::new("some", 3));

        let result = score(&assessment, &answers).unwrap();
        let weak: Vec<&str> = result
            .weak_sections(60)
            .into_iter()
            .map(|section| section.name.as_str())
            .collect();
        assert_eq!(weak, vec!["B"]);
    }
}
