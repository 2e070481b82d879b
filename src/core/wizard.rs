use crate::assessment::error::{AnswerError, ScoreError};
use crate::assessment::{Answers, Assessment, Question, SubmitRequires};
use crate::core::{AssessmentResult, score};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum WizardError {
    #[error("assessment already submitted; retake it to answer again")]
    AlreadySubmitted,
    #[error("assessment has no questions")]
    Empty,
    #[error("question {0} is not answered yet")]
    CurrentUnanswered(String),
    #[error("{} question(s) still unanswered: {}", .0.len(), .0.join(", "))]
    Incomplete(Vec<String>),
    #[error(transparent)]
    Answer(#[from] AnswerError),
    #[error(transparent)]
    Score(#[from] ScoreError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Collecting,
    Submitted(AssessmentResult),
}

/// One pass through an assessment: answers are upserted while collecting and
/// reduced exactly once on submit.
#[derive(Debug)]
pub struct Session<'a> {
    assessment: &'a Assessment,
    answers: Answers,
    cursor: usize,
    state: SessionState,
}

impl<'a> Session<'a> {
    pub fn new(assessment: &'a Assessment) -> Self {
        Self {
            assessment,
            answers: Answers::new(),
            cursor: 0,
            state: SessionState::Collecting,
        }
    }

    pub fn assessment(&self) -> &'a Assessment {
        self.assessment
    }

    pub fn answers(&self) -> &Answers {
        &self.answers
    }

    pub fn result(&self) -> Option<&AssessmentResult> {
        match &self.state {
            SessionState::Submitted(result) => Some(result),
            SessionState::Collecting => None,
        }
    }

    pub fn position(&self) -> usize {
        self.cursor
    }

    pub fn current(&self) -> Option<&'a Question> {
        self.assessment.questions.get(self.cursor)
    }

    pub fn is_last(&self) -> bool {
        self.cursor + 1 >= self.assessment.questions.len()
    }

    /// Records or replaces the answer for a question or yes/no item.
    pub fn answer(&mut self, id: &str, value: &str) -> Result<(), WizardError> {
        if self.result().is_some() {
            return Err(WizardError::AlreadySubmitted);
        }

        let answer = self.assessment.resolve(id, value)?;
        debug!(id, value = %answer.value, points = answer.points, "recorded answer");
        self.answers.insert(id.to_string(), answer);
        Ok(())
    }

    pub fn next(&mut self) -> bool {
        if self.is_last() {
            return false;
        }
        self.cursor += 1;
        true
    }

    pub fn back(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        true
    }

    pub fn unanswered(&self) -> Vec<&'a str> {
        self.assessment
            .questions
            .iter()
            .filter(|question| !question.is_answered(&self.answers))
            .map(|question| question.id.as_str())
            .collect()
    }

    pub fn all_answered(&self) -> bool {
        self.unanswered().is_empty()
    }

    /// Moves the cursor to the first unanswered question, if any.
    pub fn go_to_first_unanswered(&mut self) -> bool {
        let Some(index) = self
            .assessment
            .questions
            .iter()
            .position(|question| !question.is_answered(&self.answers))
        else {
            return false;
        };
        self.cursor = index;
        true
    }

    pub fn submit(&mut self) -> Result<AssessmentResult, WizardError> {
        if self.result().is_some() {
            return Err(WizardError::AlreadySubmitted);
        }

        let current = self.current().ok_or(WizardError::Empty)?;
        if !current.is_answered(&self.answers) {
            return Err(WizardError::CurrentUnanswered(current.id.clone()));
        }

        if self.assessment.submit_requires == SubmitRequires::All && !self.all_answered() {
            return Err(WizardError::Incomplete(
                self.unanswered().into_iter().map(str::to_string).collect(),
            ));
        }

        let result = score(self.assessment, &self.answers)?;
        info!(
            assessment = %self.assessment.id,
            percentage = result.percentage,
            status = %result.health_status,
            "assessment submitted"
        );
        self.state = SessionState::Submitted(result.clone());
        Ok(result)
    }

    /// Discards answers and any result and starts again from the first
    /// question.
    pub fn retake(&mut self) {
        self.answers.clear();
        self.cursor = 0;
        self.state = SessionState::Collecting;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assessment::tests::{group_assessment, two_question_assessment};
    use crate::core::score::HealthStatus;

    #[test]
    fn navigates_and_upserts() {
        let assessment = two_question_assessment();
        let mut session = Session::new(&assessment);

        assert!(!session.back());
        assert_eq!(session.current().unwrap().id, "q1");
        session.answer("q1", "low").unwrap();
        session.answer("q1", "high").unwrap();
        assert_eq!(session.answers().len(), 1);
        assert_eq!(session.answers()["q1"].points, 10);

        assert!(session.next());
        assert!(session.is_last());
        assert!(!session.next());
        assert!(session.back());
        assert_eq!(session.position(), 0);
    }

    #[test]
    fn current_only_policy_allows_partial_submit() {
        let assessment = two_question_assessment();
        let mut session = Session::new(&assessment);

        session.next();
        assert!(matches!(
            session.submit(),
            Err(WizardError::CurrentUnanswered(id)) if id == "q2"
        ));

        session.answer("q2", "some").unwrap();
        let result = session.submit().unwrap();
        assert_eq!(result.total, 3);
        assert_eq!(result.health_status, HealthStatus::Urgent);
        assert_eq!(session.result(), Some(&result));
    }

    #[test]
    fn all_policy_requires_every_group_item() {
        let assessment = group_assessment();
        let mut session = Session::new(&assessment);

        session.answer("sys_sales", "yes").unwrap();
        session.answer("sys_delivery", "no").unwrap();
        session.answer("sys_hiring", "yes").unwrap();
        assert!(!session.all_answered());
        assert!(matches!(
            session.submit(),
            Err(WizardError::CurrentUnanswered(_))
        ));

        session.answer("sys_finance", "yes").unwrap();
        assert!(session.all_answered());
        let result = session.submit().unwrap();
        assert_eq!(result.total, 9);
        assert_eq!(result.percentage, 75);
    }

    #[test]
    fn all_policy_reports_missing_questions() {
        let mut assessment = two_question_assessment();
        assessment.submit_requires = SubmitRequires::All;
        let mut session = Session::new(&assessment);

        session.answer("q1", "mid").unwrap();
        let Err(WizardError::Incomplete(missing)) = session.submit() else {
            panic!("expected incomplete error");
        };
        assert_eq!(missing, vec!["q2".to_string()]);

        assert!(session.go_to_first_unanswered());
        assert_eq!(session.current().unwrap().id, "q2");
    }

    #[test]
    fn submitted_session_is_terminal_until_retake() {
        let assessment = two_question_assessment();
        let mut session = Session::new(&assessment);

        session.answer("q1", "mid").unwrap();
        session.submit().unwrap();
        assert!(matches!(
            session.answer("q2", "some"),
            Err(WizardError::AlreadySubmitted)
        ));
        assert!(matches!(session.submit(), Err(WizardError::AlreadySubmitted)));

        session.retake();
        assert!(session.result().is_none());
        assert!(session.answers().is_empty());
        assert_eq!(session.position(), 0);
    }

    #[test]
    fn rejects_unknown_options() {
        let assessment = two_question_assessment();
        let mut session = Session::new(&assessment);
        assert!(matches!(
            session.answer("q1", "maybe"),
            Err(WizardError::Answer(AnswerError::InvalidOption { .. }))
        ));
        assert!(session.answers().is_empty());
    }
}
