use serde::{Deserialize, Serialize};

/// One question of a quiz submission, as returned by the quiz submission
/// questions endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuizSubmissionQuestion {
    pub id: Option<u64>,
    pub flagged: Option<bool>,
    pub answer: Option<serde_json::Value>,
    pub answers: Option<Vec<serde_json::Value>>,
}

/// Canvas answers with an object holding a one-element list of questions
/// rather than a bare list or object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuizSubmissionQuestionWrapper {
    #[serde(default)]
    pub quiz_submission_questions: Vec<QuizSubmissionQuestion>,
}

impl QuizSubmissionQuestionWrapper {
    pub fn into_questions(self) -> Vec<QuizSubmissionQuestion> {
        self.quiz_submission_questions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unwraps_single_item_list() {
        let wrapper: QuizSubmissionQuestionWrapper = serde_json::from_value(json!({
            "quiz_submission_questions": [
                {"id": 1, "flagged": false, "answer": 2405}
            ]
        }))
        .unwrap();
        let questions = wrapper.into_questions();
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].id, Some(1));
        assert_eq!(questions[0].answer, Some(json!(2405)));
    }

    #[test]
    fn missing_list_is_empty() {
        let wrapper: QuizSubmissionQuestionWrapper = serde_json::from_value(json!({})).unwrap();
        assert!(wrapper.into_questions().is_empty());
    }
}
