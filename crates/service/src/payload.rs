//! Translation of a submitted section form into the data API's update body.
//!
//! The rules mirror the API's document shapes:
//! - list questions post as repeated keys and land as JSON arrays;
//! - boolean questions land as JSON bools;
//! - questions with an assurance approach land as `{value, assurance}`
//!   composites, either half of which may be absent;
//! - document fields that were left blank are omitted entirely.
//!
//! A key that was not submitted at all contributes nothing, so posting an
//! empty form yields an empty payload and the caller skips the API call.

use serde_json::{Map, Value};

use content::{QuestionType, Section};

use crate::forms::{SubmittedForm, ASSURANCE_SUFFIX};

pub fn translate(section: &Section, submitted: &SubmittedForm) -> Map<String, Value> {
    let mut payload = Map::new();
    for question in section.questions_flat() {
        let value = question_value(question.question_type, &question.id, submitted);

        if question.assurance.is_some() {
            let mut composite = Map::new();
            if let Some(value) = value {
                composite.insert("value".to_string(), value);
            }
            if let Some(assurance) =
                submitted.first(&format!("{}{}", question.id, ASSURANCE_SUFFIX))
            {
                let assurance = assurance.trim();
                if !assurance.is_empty() {
                    composite.insert("assurance".to_string(), assurance.into());
                }
            }
            if !composite.is_empty() {
                payload.insert(question.id.clone(), Value::Object(composite));
            }
        } else if let Some(value) = value {
            payload.insert(question.id.clone(), value);
        }
    }
    payload
}

fn question_value(
    question_type: QuestionType,
    key: &str,
    submitted: &SubmittedForm,
) -> Option<Value> {
    match question_type {
        QuestionType::List | QuestionType::Checkboxes => {
            let values = submitted.filled_values(key);
            if values.is_empty() {
                None
            } else {
                Some(Value::Array(values.into_iter().map(Value::from).collect()))
            }
        }
        QuestionType::Boolean => match submitted.first(key)?.trim() {
            "true" => Some(Value::Bool(true)),
            "false" => Some(Value::Bool(false)),
            _ => None,
        },
        QuestionType::Upload => {
            let value = submitted.first(key)?.trim();
            if value.is_empty() {
                None
            } else {
                Some(Value::String(value.to_string()))
            }
        }
        QuestionType::Radios => {
            let value = submitted.first(key)?.trim();
            if value.is_empty() {
                None
            } else {
                Some(Value::String(value.to_string()))
            }
        }
        QuestionType::Text | QuestionType::Textbox => {
            submitted.first(key).map(|v| Value::String(v.trim().to_string()))
        }
        QuestionType::Multiquestion => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn section(declaration: &str) -> Section {
        content::FrameworkContent::from_toml_str("g-cloud-8", declaration)
            .unwrap()
            .sections
            .remove(0)
    }

    fn features_and_benefits() -> Section {
        section(
            r#"
            [[section]]
            slug = "features-and-benefits"
            name = "Features and benefits"

            [[section.question]]
            id = "serviceFeatures"
            label = "Service features"
            type = "list"

            [[section.question]]
            id = "serviceBenefits"
            label = "Service benefits"
            type = "list"
            "#,
        )
    }

    fn assurance_section() -> Section {
        section(
            r#"
            [[section]]
            slug = "external-interface-protection"
            name = "External interface protection"

            [[section.question]]
            id = "onboardingGuidance"
            label = "Onboarding guidance"
            type = "boolean"
            [section.question.assurance]
            options = ["Service provider assertion", "Independent validation of assertion"]

            [[section.question]]
            id = "interconnectionMethods"
            label = "Interconnection methods"
            type = "checkboxes"
            options = ["PSN assured service", "Private WAN"]
            [section.question.assurance]
            options = ["Service provider assertion"]
            "#,
        )
    }

    #[test]
    fn single_list_value_becomes_one_element_array() {
        let submitted = SubmittedForm::from_pairs([
            ("serviceFeatures", "baz"),
            ("serviceBenefits", "foo"),
        ]);
        let payload = translate(&features_and_benefits(), &submitted);
        assert_eq!(
            Value::Object(payload),
            json!({"serviceFeatures": ["baz"], "serviceBenefits": ["foo"]})
        );
    }

    #[test]
    fn empty_submission_produces_empty_payload() {
        let payload = translate(&features_and_benefits(), &SubmittedForm::default());
        assert!(payload.is_empty());
    }

    #[test]
    fn composites_reassemble_value_and_assurance() {
        let submitted = SubmittedForm::from_pairs([
            ("onboardingGuidance", "false"),
            ("onboardingGuidance--assurance", "Service provider assertion"),
            ("interconnectionMethods", "Private WAN"),
            ("interconnectionMethods--assurance", "Service provider assertion"),
        ]);
        let payload = translate(&assurance_section(), &submitted);
        assert_eq!(
            Value::Object(payload),
            json!({
                "onboardingGuidance": {
                    "value": false,
                    "assurance": "Service provider assertion",
                },
                "interconnectionMethods": {
                    "value": ["Private WAN"],
                    "assurance": "Service provider assertion",
                },
            })
        );
    }

    #[test]
    fn assurance_without_value_still_posts_the_composite() {
        let submitted = SubmittedForm::from_pairs([(
            "interconnectionMethods--assurance",
            "Service provider assertion",
        )]);
        let payload = translate(&assurance_section(), &submitted);
        assert_eq!(
            Value::Object(payload),
            json!({
                "interconnectionMethods": {"assurance": "Service provider assertion"},
            })
        );
    }

    #[test]
    fn multi_valued_checkboxes_keep_every_selection() {
        let submitted = SubmittedForm::from_pairs([
            ("interconnectionMethods", "PSN assured service"),
            ("interconnectionMethods", "Private WAN"),
            ("interconnectionMethods--assurance", "Service provider assertion"),
        ]);
        let payload = translate(&assurance_section(), &submitted);
        assert_eq!(
            payload["interconnectionMethods"]["value"],
            json!(["PSN assured service", "Private WAN"])
        );
    }

    #[test]
    fn blank_documents_are_omitted() {
        let documents = section(
            r#"
            [[section]]
            slug = "documents"
            name = "Documents"

            [[section.question]]
            id = "pricingDocumentURL"
            label = "Pricing document"
            type = "upload"

            [[section.question]]
            id = "sfiaRateDocumentURL"
            label = "SFIA rate card"
            type = "upload"

            [[section.question]]
            id = "termsAndConditionsDocumentURL"
            label = "Terms and conditions"
            type = "upload"
            "#,
        );
        let submitted = SubmittedForm::from_pairs([
            ("pricingDocumentURL", "https://assets.example.com/1-pricing.pdf"),
            ("sfiaRateDocumentURL", "   "),
            ("termsAndConditionsDocumentURL", ""),
        ]);
        let payload = translate(&documents, &submitted);
        assert_eq!(
            Value::Object(payload),
            json!({"pricingDocumentURL": "https://assets.example.com/1-pricing.pdf"})
        );
    }

    #[test]
    fn text_fields_post_trimmed_values_even_when_cleared() {
        let description = section(
            r#"
            [[section]]
            slug = "description"
            name = "Description"

            [[section.question]]
            id = "serviceSummary"
            label = "Service summary"
            type = "textbox"
            "#,
        );
        let submitted = SubmittedForm::from_pairs([("serviceSummary", "  trimmed  ")]);
        let payload = translate(&description, &submitted);
        assert_eq!(payload["serviceSummary"], json!("trimmed"));

        let cleared = SubmittedForm::from_pairs([("serviceSummary", "")]);
        let payload = translate(&description, &cleared);
        assert_eq!(payload["serviceSummary"], json!(""));
    }
}
