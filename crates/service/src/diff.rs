//! Human-readable differences between two revisions of a service document,
//! ordered by the questionnaire schema.

use serde::Serialize;
use serde_json::Value;

use content::Section;
use models::ServiceDocument;

/// One changed question. `removed`/`added` hold the display lines present
/// on only one side of the edit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestionDiff {
    pub section_slug: String,
    pub section_name: String,
    pub question_id: String,
    pub question_label: String,
    pub removed: Vec<String>,
    pub added: Vec<String>,
}

/// Render an answer to display lines. Composites contribute their inner
/// value only; an assurance-level change alone is not a visible edit.
fn display_lines(value: Option<&Value>) -> Vec<String> {
    fn lines(value: &Value, out: &mut Vec<String>) {
        match value {
            Value::Null => {}
            Value::String(s) => out.extend(
                s.lines()
                    .map(str::trim)
                    .filter(|l| !l.is_empty())
                    .map(String::from),
            ),
            Value::Bool(b) => out.push(if *b { "Yes" } else { "No" }.to_string()),
            Value::Number(n) => out.push(n.to_string()),
            Value::Array(items) => items.iter().for_each(|v| lines(v, out)),
            Value::Object(map) => {
                if let Some(inner) = map.get("value") {
                    lines(inner, out);
                }
            }
        }
    }
    let mut out = Vec::new();
    if let Some(value) = value {
        lines(value, &mut out);
    }
    out
}

/// Multiset difference preserving order: lines of `a` not matched in `b`.
fn unmatched(a: &[String], b: &[String]) -> Vec<String> {
    let mut pool: Vec<&String> = b.iter().collect();
    a.iter()
        .filter(|line| {
            if let Some(pos) = pool.iter().position(|other| other == line) {
                pool.swap_remove(pos);
                false
            } else {
                true
            }
        })
        .cloned()
        .collect()
}

/// Walk the sections' questions in declaration order and emit a row for
/// every question whose rendered answer differs between the revisions. An
/// empty result for a non-empty edit trail means every change was reversed.
pub fn service_diffs(
    sections: &[&Section],
    old: &ServiceDocument,
    new: &ServiceDocument,
) -> Vec<QuestionDiff> {
    let mut diffs = Vec::new();
    for section in sections {
        for question in section.questions_flat() {
            let old_lines = display_lines(old.get(&question.id));
            let new_lines = display_lines(new.get(&question.id));
            if old_lines == new_lines {
                continue;
            }
            diffs.push(QuestionDiff {
                section_slug: section.slug.clone(),
                section_name: section.name.clone(),
                question_id: question.id.clone(),
                question_label: question.label().to_string(),
                removed: unmatched(&old_lines, &new_lines),
                added: unmatched(&new_lines, &old_lines),
            });
        }
    }
    diffs
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sections() -> Vec<Section> {
        content::FrameworkContent::from_toml_str(
            "g-cloud-9",
            r#"
            [[section]]
            slug = "service-description"
            name = "Service description"

            [[section.question]]
            id = "serviceName"
            label = "Service name"
            type = "text"

            [[section.question]]
            id = "serviceFeatures"
            label = "Service features"
            type = "list"

            [[section.question]]
            id = "deviceAccessMethod"
            label = "Device access method"
            type = "checkboxes"
            options = ["Corporate/enterprise devices", "Unknown devices"]
            [section.question.assurance]
            options = ["Independent validation of assertion"]
            "#,
        )
        .unwrap()
        .sections
    }

    fn doc(v: serde_json::Value) -> ServiceDocument {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn emits_rows_only_for_changed_questions() {
        let old = doc(json!({
            "serviceName": "Melonflavoured soap",
            "serviceFeatures": ["Dovecote", "Rabbitry and fowlrun"],
        }));
        let new = doc(json!({
            "serviceName": "Lemonflavoured soap",
            "serviceFeatures": ["Dovecote", "Rabbitry and fowlrun"],
        }));
        let sections = sections();
        let refs: Vec<&Section> = sections.iter().collect();
        let diffs = service_diffs(&refs, &old, &new);

        assert_eq!(diffs.len(), 1);
        assert_eq!(diffs[0].question_id, "serviceName");
        assert_eq!(diffs[0].removed, vec!["Melonflavoured soap"]);
        assert_eq!(diffs[0].added, vec!["Lemonflavoured soap"]);
    }

    #[test]
    fn identical_documents_produce_no_rows() {
        let a = doc(json!({"serviceName": "Lemonflavoured soap"}));
        let sections = sections();
        let refs: Vec<&Section> = sections.iter().collect();
        assert!(service_diffs(&refs, &a, &a.clone()).is_empty());
    }

    #[test]
    fn keys_outside_the_schema_are_ignored() {
        let old = doc(json!({"somethingIrrelevant": "Soiled personal linen"}));
        let new = doc(json!({"somethingIrrelevant": "wrong side up with care"}));
        let sections = sections();
        let refs: Vec<&Section> = sections.iter().collect();
        assert!(service_diffs(&refs, &old, &new).is_empty());
    }

    #[test]
    fn list_edits_report_per_line_changes() {
        let old = doc(json!({"serviceFeatures": ["Dovecote", "Botanical conservatory"]}));
        let new = doc(json!({"serviceFeatures": ["Dovecote", "Fowlrun"]}));
        let sections = sections();
        let refs: Vec<&Section> = sections.iter().collect();
        let diffs = service_diffs(&refs, &old, &new);
        assert_eq!(diffs[0].removed, vec!["Botanical conservatory"]);
        assert_eq!(diffs[0].added, vec!["Fowlrun"]);
    }

    #[test]
    fn assurance_only_changes_are_not_edits() {
        let old = doc(json!({
            "deviceAccessMethod": {
                "value": ["Unknown devices"],
                "assurance": "Independent validation of assertion",
            }
        }));
        let new = doc(json!({
            "deviceAccessMethod": {"value": ["Unknown devices"]}
        }));
        let sections = sections();
        let refs: Vec<&Section> = sections.iter().collect();
        assert!(service_diffs(&refs, &old, &new).is_empty());
    }

    #[test]
    fn answers_appearing_or_disappearing_diff_against_nothing() {
        let old = doc(json!({}));
        let new = doc(json!({"deviceAccessMethod": {"value": ["Unknown devices"]}}));
        let sections = sections();
        let refs: Vec<&Section> = sections.iter().collect();
        let diffs = service_diffs(&refs, &old, &new);
        assert_eq!(diffs[0].removed, Vec::<String>::new());
        assert_eq!(diffs[0].added, vec!["Unknown devices"]);
    }

    #[test]
    fn booleans_render_yes_no() {
        let old = doc(json!({"serviceName": true}));
        let new = doc(json!({"serviceName": false}));
        let sections = sections();
        let refs: Vec<&Section> = sections.iter().collect();
        let diffs = service_diffs(&refs, &old, &new);
        assert_eq!(diffs[0].removed, vec!["Yes"]);
        assert_eq!(diffs[0].added, vec!["No"]);
    }
}
