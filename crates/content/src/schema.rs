use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// How a question is asked and how its answer is shaped on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionType {
    /// Single-line text; wire value is a string.
    Text,
    /// Multi-line text; wire value is a string.
    Textbox,
    /// Repeated free-text entries; wire value is a list of strings.
    List,
    /// Fixed options, many selectable; wire value is a list of strings.
    Checkboxes,
    /// Fixed options, one selectable; wire value is a string.
    Radios,
    /// Yes/no; wire value is a bool.
    Boolean,
    /// Document reference; wire value is a URL string.
    Upload,
    /// Group of child questions edited on one page.
    Multiquestion,
}

/// Assurance companion: a `<id>--assurance` radio group declaring the level
/// of evidence behind the answer. Presence turns the wire value into a
/// `{value, assurance}` composite.
#[derive(Debug, Clone, Deserialize)]
pub struct AssuranceApproach {
    pub options: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Question {
    pub id: String,
    #[serde(default)]
    pub label: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub assurance: Option<AssuranceApproach>,
    /// API validation code -> human message overrides for this question.
    #[serde(default)]
    pub error_messages: HashMap<String, String>,
    /// Children of a multiquestion; empty otherwise.
    #[serde(default, rename = "question")]
    pub questions: Vec<Question>,
}

impl Question {
    /// URL slug for addressing a question inside a multiquestion section:
    /// `businessAnalyst` -> `business-analyst`.
    pub fn slug(&self) -> String {
        let mut out = String::with_capacity(self.id.len() + 4);
        for ch in self.id.chars() {
            if ch.is_ascii_uppercase() {
                out.push('-');
                out.push(ch.to_ascii_lowercase());
            } else {
                out.push(ch);
            }
        }
        out
    }

    pub fn label(&self) -> &str {
        if self.label.is_empty() {
            &self.id
        } else {
            &self.label
        }
    }

    /// This question and, for multiquestions, every descendant leaf.
    pub fn leaves(&self) -> Vec<&Question> {
        if self.questions.is_empty() {
            vec![self]
        } else {
            self.questions.iter().flat_map(|q| q.leaves()).collect()
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Section {
    pub slug: String,
    pub name: String,
    #[serde(default = "default_true")]
    pub editable: bool,
    /// Lots the section applies to; empty means every lot.
    #[serde(default)]
    pub lots: Vec<String>,
    #[serde(default, rename = "question")]
    pub questions: Vec<Question>,
}

fn default_true() -> bool {
    true
}

impl Section {
    /// Lot names reach us in mixed case ("IaaS", "iaas"); compare folded.
    pub fn applies_to(&self, lot: &str) -> bool {
        self.lots.is_empty()
            || self
                .lots
                .iter()
                .any(|l| l.eq_ignore_ascii_case(lot))
    }

    /// Leaf questions in declaration order, descending into multiquestions.
    pub fn questions_flat(&self) -> Vec<&Question> {
        self.questions.iter().flat_map(|q| q.leaves()).collect()
    }

    /// Find a top-level question by its URL slug.
    pub fn question_by_slug(&self, slug: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.slug() == slug)
    }

    /// A one-question view of this section, for editing a single
    /// multiquestion entry on its own page.
    pub fn subsection_for(&self, question_slug: &str) -> Option<Section> {
        let question = self.question_by_slug(question_slug)?;
        Some(Section {
            slug: self.slug.clone(),
            name: question.label().to_string(),
            editable: self.editable,
            lots: self.lots.clone(),
            questions: vec![question.clone()],
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FrameworkContent {
    #[serde(default)]
    pub slug: String,
    #[serde(default, rename = "section")]
    pub sections: Vec<Section>,
}

impl FrameworkContent {
    pub fn from_toml_str(slug: &str, raw: &str) -> Result<Self, toml::de::Error> {
        let mut parsed: FrameworkContent = toml::from_str(raw)?;
        parsed.slug = slug.to_string();
        Ok(parsed)
    }

    pub fn sections_for_lot(&self, lot: &str) -> Vec<&Section> {
        self.sections.iter().filter(|s| s.applies_to(lot)).collect()
    }

    pub fn section(&self, lot: &str, slug: &str) -> Option<&Section> {
        self.sections_for_lot(lot)
            .into_iter()
            .find(|s| s.slug == slug)
    }
}
