//! Dynamic per-section forms.
//!
//! Fields are derived from the questionnaire schema at request time, so one
//! pair of handlers serves every section of every framework. Validation is
//! split: cheap structural rules run locally, everything content-level comes
//! back from the data API as a `{field: code}` map and is translated here.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde::Serialize;
use serde_json::Value;

use content::{Question, QuestionType, Section};
use models::ServiceDocument;

/// Suffix of the companion radio group for assurance composites.
pub const ASSURANCE_SUFFIX: &str = "--assurance";

/// File extensions accepted for document questions.
const OPEN_FORMATS: [&str; 6] = ["pdf", "odt", "ods", "odp", "csv", "zip"];

static DEFAULT_ERROR_MESSAGES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("answer_required", "You need to answer this question."),
        ("invalid_format", "There was a problem with the answer to this question."),
        ("file_not_open_format", "Your document is not in an open format."),
    ])
});

const GENERIC_ERROR_MESSAGE: &str = "There was a problem with the answer to this question.";

/// Decoded `application/x-www-form-urlencoded` body. Keys repeat for
/// checkbox groups, so this is a multimap, not a plain map.
#[derive(Debug, Clone, Default)]
pub struct SubmittedForm {
    pairs: Vec<(String, String)>,
}

impl SubmittedForm {
    pub fn parse(body: &[u8]) -> Self {
        let pairs = form_urlencoded::parse(body)
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        Self { pairs }
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            pairs: pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.pairs.iter().any(|(k, _)| k == key)
    }

    pub fn values(&self, key: &str) -> Vec<&str> {
        self.pairs
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    pub fn first(&self, key: &str) -> Option<&str> {
        self.pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    /// Trimmed, non-empty values for a key.
    pub fn filled_values(&self, key: &str) -> Vec<String> {
        self.values(key)
            .into_iter()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(String::from)
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// One rendered field of a section form.
#[derive(Debug, Clone, Serialize)]
pub struct FormField {
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub options: Vec<String>,
    pub values: Vec<String>,
    pub assurance_options: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assurance: Option<String>,
    pub optional: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// A section form ready for rendering, prefilled from a document or from a
/// rejected submission.
#[derive(Debug, Clone, Serialize)]
pub struct SectionForm {
    pub slug: String,
    pub name: String,
    pub fields: Vec<FormField>,
}

/// A per-field validation failure, in section question order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    pub question_id: String,
    pub label: String,
    pub message: String,
}

fn answer_values(value: &Value) -> Vec<String> {
    match value {
        Value::Null => vec![],
        Value::String(s) => vec![s.clone()],
        Value::Bool(b) => vec![b.to_string()],
        Value::Number(n) => vec![n.to_string()],
        Value::Array(items) => items.iter().flat_map(answer_values).collect(),
        Value::Object(map) => map.get("value").map(answer_values).unwrap_or_default(),
    }
}

fn answer_assurance(value: &Value) -> Option<String> {
    value
        .get("assurance")
        .and_then(Value::as_str)
        .map(String::from)
}

fn build_field(question: &Question, values: Vec<String>, assurance: Option<String>) -> FormField {
    let mut values = values;
    // list fields always render one spare input slot
    if question.question_type == QuestionType::List {
        values.push(String::new());
    }
    FormField {
        id: question.id.clone(),
        label: question.label().to_string(),
        question_type: question.question_type,
        options: question.options.clone(),
        values,
        assurance_options: question
            .assurance
            .as_ref()
            .map(|a| a.options.clone())
            .unwrap_or_default(),
        assurance,
        optional: question.optional,
        error: None,
    }
}

impl SectionForm {
    /// GET path: prefill every leaf question from the live document.
    pub fn from_document(section: &Section, doc: &ServiceDocument) -> Self {
        let fields = section
            .questions_flat()
            .into_iter()
            .map(|q| {
                let answer = doc.get(&q.id);
                build_field(
                    q,
                    answer.map(answer_values).unwrap_or_default(),
                    answer.and_then(answer_assurance),
                )
            })
            .collect();
        Self {
            slug: section.slug.clone(),
            name: section.name.clone(),
            fields,
        }
    }

    /// Re-render path: prefill from the rejected submission so nothing the
    /// user typed is lost, and attach per-field messages.
    pub fn from_submission(
        section: &Section,
        submitted: &SubmittedForm,
        errors: &[FieldError],
    ) -> Self {
        let fields = section
            .questions_flat()
            .into_iter()
            .map(|q| {
                let mut field = build_field(
                    q,
                    submitted.values(&q.id).into_iter().map(String::from).collect(),
                    submitted
                        .first(&format!("{}{}", q.id, ASSURANCE_SUFFIX))
                        .map(String::from),
                );
                field.error = errors
                    .iter()
                    .find(|e| e.question_id == q.id)
                    .map(|e| e.message.clone());
                field
            })
            .collect();
        Self {
            slug: section.slug.clone(),
            name: section.name.clone(),
            fields,
        }
    }
}

/// Structural validation that must not reach the API: option membership,
/// boolean shape, document formats.
pub fn validate(section: &Section, submitted: &SubmittedForm) -> Vec<FieldError> {
    let mut errors = Vec::new();
    for question in section.questions_flat() {
        let values = submitted.filled_values(&question.id);
        let error = match question.question_type {
            QuestionType::Checkboxes | QuestionType::Radios => values
                .iter()
                .find(|v| !question.options.contains(*v))
                .map(|_| "You must choose one of the provided options.".to_string()),
            QuestionType::Boolean => values
                .first()
                .filter(|v| v.as_str() != "true" && v.as_str() != "false")
                .map(|_| "You must answer yes or no.".to_string()),
            QuestionType::Upload => values
                .first()
                .filter(|v| !has_open_format_extension(v))
                .map(|_| message_for(question, "file_not_open_format")),
            _ => None,
        };
        if let Some(message) = error {
            errors.push(FieldError {
                question_id: question.id.clone(),
                label: question.label().to_string(),
                message,
            });
        }
    }
    errors
}

fn has_open_format_extension(name: &str) -> bool {
    name.rsplit('.')
        .next()
        .map(|ext| OPEN_FORMATS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Translate the API's `{field: code}` rejection into ordered per-field
/// messages, preferring the question's own message table.
pub fn api_errors(
    section: &Section,
    field_codes: &std::collections::BTreeMap<String, String>,
) -> Vec<FieldError> {
    section
        .questions_flat()
        .into_iter()
        .filter_map(|q| {
            field_codes.get(&q.id).map(|code| FieldError {
                question_id: q.id.clone(),
                label: q.label().to_string(),
                message: message_for(q, code),
            })
        })
        .collect()
}

fn message_for(question: &Question, code: &str) -> String {
    question
        .error_messages
        .get(code)
        .cloned()
        .unwrap_or_else(|| {
            DEFAULT_ERROR_MESSAGES
                .get(code)
                .copied()
                .unwrap_or(GENERIC_ERROR_MESSAGE)
                .to_string()
        })
}
