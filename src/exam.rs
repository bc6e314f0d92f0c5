//! Exam sessions: NotStarted -> InProgress(index) -> Completed.
//!
//! A session snapshots the questions of its set when it starts, so later edits
//! to the bank never change an exam in flight or a recorded attempt. Completing a
//! session consumes it; the engine then holds the attempt in its history and the
//! per-question review for the latest exam only.

use crate::grading::is_correct;
use crate::models::{ExamAttempt, Question, create_id};
use crate::question_bank::QuestionBank;
use crate::stats::ExamStats;
use chrono::Local;
use tracing::{debug, info};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExamPhase {
    NotStarted,
    InProgress { index: usize, total: usize },
}

/// Result of moving forward through an exam
#[derive(Clone, Debug, PartialEq)]
pub enum Advance {
    Moved(usize),
    Finished(ExamAttempt),
}

/// How one question was answered in the latest exam
#[derive(Clone, Debug, PartialEq)]
pub struct AnswerReview {
    pub question_id: u64,
    pub prompt: String,
    pub expected: String,
    pub received: String,
    pub correct: bool,
}

/// The latest finished exam with its per-question breakdown. Never persisted.
#[derive(Clone, Debug, PartialEq)]
pub struct ExamReview {
    pub attempt: ExamAttempt,
    pub answers: Vec<AnswerReview>,
}

#[derive(Clone, Debug)]
struct ExamSession {
    set_id: u64,
    set_name: String,
    questions: Vec<Question>,
    index: usize,
    // One slot per question, by position in the session
    answers: Vec<String>,
    draft: String,
}

impl ExamSession {
    fn current(&self) -> &Question {
        &self.questions[self.index]
    }

    fn is_last(&self) -> bool {
        self.index + 1 >= self.questions.len()
    }

    fn store_answer(&mut self, text: &str) {
        let answer = text.trim().to_string();
        self.answers[self.index] = answer.clone();
        self.draft = answer;
    }

    fn commit_draft(&mut self) {
        let draft = std::mem::take(&mut self.draft);
        self.store_answer(&draft);
    }

    fn move_to(&mut self, index: usize) {
        self.index = index;
        self.draft = self.answers[index].clone();
    }

    fn complete(self) -> ExamReview {
        let answers: Vec<AnswerReview> = self
            .questions
            .iter()
            .zip(self.answers)
            .map(|(question, received)| AnswerReview {
                question_id: question.id,
                prompt: question.prompt.clone(),
                expected: question.expected_answer.clone(),
                correct: is_correct(&question.expected_answer, &received),
                received,
            })
            .collect();

        let total_questions = answers.len();
        let correct_count = answers.iter().filter(|a| a.correct).count();

        let attempt = ExamAttempt {
            id: create_id("exam"),
            set_id: self.set_id,
            set_name: self.set_name,
            score: score_percent(correct_count, total_questions),
            correct_count,
            total_questions,
            completed_at: Local::now(),
        };

        ExamReview { attempt, answers }
    }
}

/// Percentage of correct answers rounded to the nearest integer, 0 for an empty exam
pub fn score_percent(correct_count: usize, total_questions: usize) -> u8 {
    if total_questions == 0 {
        return 0;
    }
    let ratio = correct_count.min(total_questions) as f64 / total_questions as f64;
    (ratio * 100.0).round() as u8
}

/// Drives exam sessions and owns the attempt history (newest first)
#[derive(Debug, Default)]
pub struct ExamEngine {
    session: Option<ExamSession>,
    attempts: Vec<ExamAttempt>,
    latest_review: Option<ExamReview>,
}

impl ExamEngine {
    pub fn new(attempts: Vec<ExamAttempt>) -> Self {
        Self {
            session: None,
            attempts,
            latest_review: None,
        }
    }

    /// Begin an exam over every question in `set_id`.
    ///
    /// Returns false and changes nothing when the set has no questions.
    pub fn start_exam(&mut self, bank: &QuestionBank, set_id: u64) -> bool {
        let questions: Vec<Question> = bank.questions_in_set(set_id).into_iter().cloned().collect();
        if questions.is_empty() {
            debug!(set_id, "exam not started: set has no questions");
            return false;
        }

        if self.session.is_some() {
            debug!("replacing unfinished exam session");
        }

        info!(set_id, questions = questions.len(), "exam started");
        self.session = Some(ExamSession {
            set_id,
            set_name: bank.set_name(set_id).to_string(),
            answers: vec![String::new(); questions.len()],
            questions,
            index: 0,
            draft: String::new(),
        });
        true
    }

    /// Update the unsaved answer text for the current question
    pub fn set_draft(&mut self, text: &str) {
        if let Some(session) = self.session.as_mut() {
            session.draft = text.to_string();
        }
    }

    /// Store the trimmed answer for the current question without moving
    pub fn answer_current(&mut self, text: &str) {
        if let Some(session) = self.session.as_mut() {
            session.store_answer(text);
        }
    }

    /// Save the draft, then go to the next question or finish on the last one
    pub fn advance(&mut self) -> Option<Advance> {
        let session = self.session.as_mut()?;
        session.commit_draft();

        if session.is_last() {
            return self.finalize().map(Advance::Finished);
        }

        let next = session.index + 1;
        session.move_to(next);
        Some(Advance::Moved(next))
    }

    /// Save the draft and step back one question. No move at the first question.
    pub fn retreat(&mut self) -> bool {
        let Some(session) = self.session.as_mut() else {
            return false;
        };
        session.commit_draft();

        if session.index == 0 {
            return false;
        }
        let previous = session.index - 1;
        session.move_to(previous);
        true
    }

    /// Grade the running session, record the attempt and return to NotStarted
    pub fn finalize(&mut self) -> Option<ExamAttempt> {
        let session = self.session.take()?;
        let review = session.complete();
        let attempt = review.attempt.clone();

        info!(
            set_id = attempt.set_id,
            score = attempt.score,
            correct = attempt.correct_count,
            total = attempt.total_questions,
            "exam completed"
        );

        self.attempts.insert(0, attempt.clone());
        self.latest_review = Some(review);
        Some(attempt)
    }

    /// Drop the running session without recording anything
    pub fn abandon(&mut self) {
        if self.session.take().is_some() {
            debug!("exam abandoned");
        }
    }

    pub fn phase(&self) -> ExamPhase {
        match &self.session {
            Some(session) => ExamPhase::InProgress {
                index: session.index,
                total: session.questions.len(),
            },
            None => ExamPhase::NotStarted,
        }
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.session.as_ref().map(ExamSession::current)
    }

    pub fn current_set_name(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.set_name.as_str())
    }

    pub fn draft(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.draft.as_str())
    }

    /// Number of questions with a non-empty stored answer
    pub fn answered_count(&self) -> usize {
        self.session
            .as_ref()
            .map(|s| s.answers.iter().filter(|a| !a.is_empty()).count())
            .unwrap_or(0)
    }

    pub fn attempts(&self) -> &[ExamAttempt] {
        &self.attempts
    }

    pub fn latest_review(&self) -> Option<&ExamReview> {
        self.latest_review.as_ref()
    }

    pub fn stats(&self) -> ExamStats {
        ExamStats::from_attempts(&self.attempts)
    }

    /// Swap in a new history, e.g. from a backup. Clears the latest review.
    pub fn replace_attempts(&mut self, attempts: Vec<ExamAttempt>) {
        self.attempts = attempts;
        self.latest_review = None;
    }
}
