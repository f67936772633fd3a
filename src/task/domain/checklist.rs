//! Checklist forms attached to workshop tasks.

use super::TaskDomainError;
use serde::{Deserialize, Serialize};

/// One question of an attached checklist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistQuestion {
    /// Stable key of the question within its checklist.
    pub key: String,
    /// Question text.
    pub prompt: String,
    /// Whether the question must be answered before completion.
    pub required: bool,
    /// Recorded answer, if any.
    #[serde(default)]
    pub answer: Option<String>,
}

impl ChecklistQuestion {
    /// Creates an unanswered question.
    #[must_use]
    pub fn new(key: impl Into<String>, prompt: impl Into<String>, required: bool) -> Self {
        Self {
            key: key.into(),
            prompt: prompt.into(),
            required,
            answer: None,
        }
    }

    /// Returns `true` when the question has a non-blank answer.
    #[must_use]
    pub fn is_answered(&self) -> bool {
        self.answer
            .as_deref()
            .is_some_and(|answer| !answer.trim().is_empty())
    }
}

/// Checklist form attached to a task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Checklist {
    questions: Vec<ChecklistQuestion>,
}

impl Checklist {
    /// Creates a checklist from its questions.
    #[must_use]
    pub const fn new(questions: Vec<ChecklistQuestion>) -> Self {
        Self { questions }
    }

    /// Returns the questions in form order.
    #[must_use]
    pub fn questions(&self) -> &[ChecklistQuestion] {
        &self.questions
    }

    /// Records an answer.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::UnknownChecklistQuestion`] when no question
    /// has the given key.
    pub fn answer(
        &mut self,
        key: &str,
        answer: impl Into<String>,
    ) -> Result<(), TaskDomainError> {
        let question = self
            .questions
            .iter_mut()
            .find(|candidate| candidate.key == key)
            .ok_or_else(|| TaskDomainError::UnknownChecklistQuestion(key.to_owned()))?;
        question.answer = Some(answer.into());
        Ok(())
    }

    /// Returns the keys of required questions without an answer.
    #[must_use]
    pub fn unanswered_required(&self) -> Vec<String> {
        self.questions
            .iter()
            .filter(|question| question.required && !question.is_answered())
            .map(|question| question.key.clone())
            .collect()
    }
}
