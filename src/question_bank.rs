use crate::models::{Difficulty, Question, QuestionSet, non_blank};
use serde::{Deserialize, Serialize};

const DEFAULT_SET_DESCRIPTION: &str = "No description yet";
const UNCATEGORIZED: &str = "Uncategorized";

/// Fields a caller supplies when adding or editing a question
#[derive(Clone, Debug)]
pub struct NewQuestion {
    pub set_id: u64,
    pub prompt: String,
    pub answer: String,
    pub difficulty: Difficulty,
}

/// Which sets a listing should cover
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SetFilter {
    All,
    Only(u64),
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct QuestionBank {
    pub sets: Vec<QuestionSet>,
    pub questions: Vec<Question>,
}

impl Default for QuestionBank {
    fn default() -> Self {
        Self {
            sets: vec![
                QuestionSet {
                    id: 1,
                    name: "React Basics".to_string(),
                    description: "Core React concepts and hooks".to_string(),
                },
                QuestionSet {
                    id: 2,
                    name: "JavaScript Logic".to_string(),
                    description: "Functions, scopes, and async thinking".to_string(),
                },
            ],
            questions: vec![
                Question {
                    id: 1,
                    set_id: 1,
                    prompt: "What problem does `useEffect` solve in React?".to_string(),
                    expected_answer:
                        "It handles side effects after render like fetches, subscriptions, and DOM updates."
                            .to_string(),
                    difficulty: Difficulty::Medium,
                },
                Question {
                    id: 2,
                    set_id: 2,
                    prompt: "What is a closure in JavaScript?".to_string(),
                    expected_answer:
                        "A closure is a function that keeps access to variables from its outer scope."
                            .to_string(),
                    difficulty: Difficulty::Easy,
                },
            ],
        }
    }
}

impl QuestionBank {
    pub fn new(sets: Vec<QuestionSet>, questions: Vec<Question>) -> Self {
        Self { sets, questions }
    }

    pub fn set(&self, set_id: u64) -> Option<&QuestionSet> {
        self.sets.iter().find(|set| set.id == set_id)
    }

    pub fn set_name(&self, set_id: u64) -> &str {
        self.set(set_id)
            .map(|set| set.name.as_str())
            .unwrap_or(UNCATEGORIZED)
    }

    pub fn questions_in_set(&self, set_id: u64) -> Vec<&Question> {
        self.questions
            .iter()
            .filter(|question| question.set_id == set_id)
            .collect()
    }

    /// Create a set and return its id. Blank names are rejected.
    pub fn create_set(&mut self, name: &str, description: &str) -> Option<u64> {
        let name = non_blank(name)?;
        let description =
            non_blank(description).unwrap_or_else(|| DEFAULT_SET_DESCRIPTION.to_string());
        let id = self.sets.iter().map(|set| set.id).max().unwrap_or(0) + 1;
        self.sets.push(QuestionSet {
            id,
            name,
            description,
        });
        Some(id)
    }

    /// Add a question and return its id. Needs a prompt, an answer and an existing set.
    pub fn add_question(&mut self, draft: NewQuestion) -> Option<u64> {
        let (prompt, answer) = self.validate(&draft)?;
        let id = self.questions.iter().map(|q| q.id).max().unwrap_or(0) + 1;
        self.questions.push(Question {
            id,
            set_id: draft.set_id,
            prompt,
            expected_answer: answer,
            difficulty: draft.difficulty,
        });
        Some(id)
    }

    pub fn update_question(&mut self, question_id: u64, draft: NewQuestion) -> bool {
        let Some((prompt, answer)) = self.validate(&draft) else {
            return false;
        };
        match self.questions.iter_mut().find(|q| q.id == question_id) {
            Some(question) => {
                question.set_id = draft.set_id;
                question.prompt = prompt;
                question.expected_answer = answer;
                question.difficulty = draft.difficulty;
                true
            }
            None => false,
        }
    }

    pub fn delete_question(&mut self, question_id: u64) -> bool {
        let before = self.questions.len();
        self.questions.retain(|q| q.id != question_id);
        self.questions.len() != before
    }

    /// Questions in `filter` whose prompt or answer contains `search`, case-insensitively
    pub fn filter(&self, filter: SetFilter, search: &str) -> Vec<&Question> {
        let needle = search.trim().to_lowercase();
        self.questions
            .iter()
            .filter(|q| match filter {
                SetFilter::All => true,
                SetFilter::Only(set_id) => q.set_id == set_id,
            })
            .filter(|q| {
                needle.is_empty()
                    || q.prompt.to_lowercase().contains(&needle)
                    || q.expected_answer.to_lowercase().contains(&needle)
            })
            .collect()
    }

    fn validate(&self, draft: &NewQuestion) -> Option<(String, String)> {
        let prompt = non_blank(&draft.prompt)?;
        let answer = non_blank(&draft.answer)?;
        self.set(draft.set_id)?;
        Some((prompt, answer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(set_id: u64, prompt: &str, answer: &str) -> NewQuestion {
        NewQuestion {
            set_id,
            prompt: prompt.to_string(),
            answer: answer.to_string(),
            difficulty: Difficulty::Hard,
        }
    }

    #[test]
    fn test_default_bank() {
        let bank = QuestionBank::default();
        assert_eq!(bank.sets.len(), 2);
        assert_eq!(bank.questions_in_set(1).len(), 1);
        assert_eq!(bank.set_name(2), "JavaScript Logic");
        assert_eq!(bank.set_name(99), "Uncategorized");
    }

    #[test]
    fn test_create_set_assigns_next_id() {
        let mut bank = QuestionBank::default();
        assert_eq!(bank.create_set("  Biology Midterm ", ""), Some(3));
        let set = bank.set(3).unwrap();
        assert_eq!(set.name, "Biology Midterm");
        assert_eq!(set.description, "No description yet");

        assert_eq!(bank.create_set("   ", "ignored"), None);
        assert_eq!(bank.sets.len(), 3);

        let mut empty = QuestionBank::new(Vec::new(), Vec::new());
        assert_eq!(empty.create_set("First", "desc"), Some(1));
    }

    #[test]
    fn test_add_question_validates_input() {
        let mut bank = QuestionBank::default();
        assert_eq!(bank.add_question(draft(1, " What is JSX? ", " Syntax sugar ")), Some(3));
        let added = bank.questions.last().unwrap();
        assert_eq!(added.prompt, "What is JSX?");
        assert_eq!(added.expected_answer, "Syntax sugar");

        assert_eq!(bank.add_question(draft(1, "", "answer")), None);
        assert_eq!(bank.add_question(draft(1, "prompt", "  ")), None);
        assert_eq!(bank.add_question(draft(42, "prompt", "answer")), None);
        assert_eq!(bank.questions.len(), 3);
    }

    #[test]
    fn test_update_and_delete_question() {
        let mut bank = QuestionBank::default();
        assert!(bank.update_question(1, draft(2, "New prompt", "New answer")));
        let q = &bank.questions[0];
        assert_eq!(q.set_id, 2);
        assert_eq!(q.prompt, "New prompt");
        assert_eq!(q.difficulty, Difficulty::Hard);

        assert!(!bank.update_question(1, draft(2, " ", "x")));
        assert!(!bank.update_question(77, draft(2, "p", "a")));

        assert!(bank.delete_question(1));
        assert!(!bank.delete_question(1));
        assert_eq!(bank.questions.len(), 1);
    }

    #[test]
    fn test_filter_by_set_and_search() {
        let bank = QuestionBank::default();
        assert_eq!(bank.filter(SetFilter::All, "").len(), 2);
        assert_eq!(bank.filter(SetFilter::Only(2), "").len(), 1);
        assert_eq!(bank.filter(SetFilter::All, "CLOSURE").len(), 1);
        assert_eq!(bank.filter(SetFilter::All, "subscriptions").len(), 1);
        assert!(bank.filter(SetFilter::Only(1), "closure").is_empty());
    }
}
