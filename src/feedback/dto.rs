use serde::{Deserialize, Serialize};

use crate::feedback::repo_types::Feedback;
use crate::forms::{max_chars, required, FieldErrors};

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FeedbackForm {
    pub title: String,
    pub content: String,
    #[serde(skip_serializing)]
    pub csrf_token: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackInput {
    pub title: String,
    pub content: String,
}

impl FeedbackForm {
    pub fn validate(&self) -> Result<FeedbackInput, FieldErrors> {
        let mut errors = FieldErrors::new();
        if required(&mut errors, "title", &self.title, "Please enter a title") {
            max_chars(
                &mut errors,
                "title",
                &self.title,
                100,
                "Title cannot be more than 100 characters",
            );
        }
        required(&mut errors, "content", &self.content, "Please enter your feedback");
        errors.finish(FeedbackInput {
            title: self.title.clone(),
            content: self.content.clone(),
        })
    }
}

impl From<&Feedback> for FeedbackForm {
    fn from(f: &Feedback) -> Self {
        Self {
            title: f.title.clone(),
            content: f.content.clone(),
            csrf_token: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_is_required_and_bounded() {
        let empty = FeedbackForm::default().validate().unwrap_err();
        assert_eq!(empty.get("title"), ["Please enter a title".to_string()]);
        assert_eq!(empty.get("content"), ["Please enter your feedback".to_string()]);

        let long = FeedbackForm {
            title: "t".repeat(101),
            content: "body".into(),
            ..Default::default()
        }
        .validate()
        .unwrap_err();
        assert_eq!(long.get("title"), ["Title cannot be more than 100 characters".to_string()]);
    }

    #[test]
    fn content_length_is_unbounded() {
        let input = FeedbackForm {
            title: "t".repeat(100),
            content: "c".repeat(10_000),
            ..Default::default()
        }
        .validate()
        .expect("valid");
        assert_eq!(input.content.len(), 10_000);
    }
}
