//! Import of quiz fixtures exported as `quiz.question` / `quiz.choice` rows.
//!
//! ```json
//! [
//!   {"model": "quiz.question", "pk": 1, "fields": {"order": 1, "text": "...", "explanation_correct": "..."}},
//!   {"model": "quiz.choice", "pk": 7, "fields": {"question": 1, "label": "A", "text": "...", "is_correct": true}}
//! ]
//! ```

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;

use super::{TrainingError, TrainingResult};
use crate::model::{
    ModelManager,
    entity::{Choice, ChoiceCreate, Question, QuestionCreate},
};

#[derive(Debug, Deserialize)]
struct Row {
    model: String,
    #[serde(default)]
    pk: Value,
    #[serde(default)]
    fields: Value,
}

#[derive(Debug, Deserialize)]
struct QuestionFields {
    order: Option<i32>,
    #[serde(default)]
    text: String,
    #[serde(default, alias = "explanation")]
    explanation_correct: String,
}

#[derive(Debug, Deserialize)]
struct ChoiceFields {
    #[serde(default)]
    question: Value,
    #[serde(default)]
    label: String,
    #[serde(default)]
    text: String,
    #[serde(default)]
    is_correct: bool,
    #[serde(default)]
    explanation_if_chosen: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FixtureChoice {
    pub label: String,
    pub text: String,
    pub is_correct: bool,
    pub explanation_if_chosen: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FixtureQuestion {
    pub order: i32,
    pub text: String,
    pub explanation: String,
    pub choices: Vec<FixtureChoice>,
}

/// Parsed fixture. Choices are attached to their question by the fixture's pk.
#[derive(Debug, Default)]
pub struct Fixture {
    pub questions: Vec<FixtureQuestion>,
    pub skipped_choices: usize,
}

fn key_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub fn parse_fixture(text: &str) -> TrainingResult<Fixture> {
    let rows: Vec<Row> = serde_json::from_str(text)?;

    let (question_rows, choice_rows): (Vec<_>, Vec<_>) = rows
        .into_iter()
        .filter(|r| r.model == "quiz.question" || r.model == "quiz.choice")
        .partition(|r| r.model == "quiz.question");

    if question_rows.is_empty() || choice_rows.is_empty() {
        return Err(TrainingError::FixtureIncomplete);
    }

    let mut questions = Vec::with_capacity(question_rows.len());
    let mut index_by_pk = HashMap::new();
    for row in question_rows {
        let fields: QuestionFields = serde_json::from_value(row.fields)?;
        let order = fields
            .order
            .ok_or_else(|| TrainingError::FixtureQuestionWithoutOrder { pk: key_of(&row.pk) })?;

        index_by_pk.insert(key_of(&row.pk), questions.len());
        questions.push(FixtureQuestion {
            order,
            text: fields.text,
            explanation: fields.explanation_correct,
            choices: Vec::new(),
        });
    }

    let mut skipped_choices = 0;
    for row in choice_rows {
        let fields: ChoiceFields = serde_json::from_value(row.fields)?;
        let target = index_by_pk.get(&key_of(&fields.question));

        match target {
            Some(&index) if !fields.label.trim().is_empty() => {
                questions[index].choices.push(FixtureChoice {
                    label: fields.label.trim().to_string(),
                    text: fields.text,
                    is_correct: fields.is_correct,
                    explanation_if_chosen: fields.explanation_if_chosen,
                });
            }
            _ => skipped_choices += 1,
        }
    }

    questions.sort_by_key(|q| q.order);
    Ok(Fixture {
        questions,
        skipped_choices,
    })
}

#[derive(Debug, Default)]
pub struct ImportReport {
    pub deleted_questions: u64,
    pub questions: usize,
    pub choices: usize,
    pub skipped_choices: usize,
}

/// Loads `fixture` into the module in one transaction. With `replace`, the
/// module's current questions (and their choices) are deleted first;
/// otherwise rows are upserted by (module, order) and (question, label).
#[tracing::instrument(skip(mm, fixture))]
pub async fn import_fixture(
    mm: &ModelManager,
    module_slug: &str,
    fixture: Fixture,
    replace: bool,
) -> TrainingResult<ImportReport> {
    let module = crate::model::entity::TrainingModule::find_by_slug(mm, module_slug)
        .await?
        .ok_or_else(|| TrainingError::ModuleNotFound(module_slug.to_string()))?;

    let mut report = ImportReport {
        skipped_choices: fixture.skipped_choices,
        ..Default::default()
    };

    let mut tx = mm.begin().await?;
    if replace {
        report.deleted_questions = Question::delete_for_module(&mut *tx, module.id()).await?;
    }

    for item in fixture.questions {
        let question = Question::upsert(
            &mut *tx,
            &QuestionCreate {
                module_id: module.id(),
                order: item.order,
                text: item.text,
                explanation: item.explanation,
            },
        )
        .await?;
        report.questions += 1;

        for choice in item.choices {
            Choice::upsert(
                &mut *tx,
                &ChoiceCreate {
                    question_id: question.id(),
                    label: choice.label,
                    text: choice.text,
                    is_correct: choice.is_correct,
                    explanation_if_chosen: choice.explanation_if_chosen,
                },
            )
            .await?;
            report.choices += 1;
        }
    }
    tx.commit().await?;

    tracing::info!(
        questions = report.questions,
        choices = report.choices,
        "quiz fixture imported into {module_slug}"
    );
    Ok(report)
}

#[cfg(test)]
mod test {
    use super::*;

    const FIXTURE: &str = r#"[
        {"model": "quiz.question", "pk": 2, "fields": {"order": 2, "text": "Segunda", "explanation_correct": "Porque sí"}},
        {"model": "quiz.question", "pk": 1, "fields": {"order": 1, "text": "Primera"}},
        {"model": "quiz.choice", "pk": 10, "fields": {"question": 1, "label": "A", "text": "Sí", "is_correct": true}},
        {"model": "quiz.choice", "pk": 11, "fields": {"question": 1, "label": "B", "text": "No", "explanation_if_chosen": "Revisá el video"}},
        {"model": "quiz.choice", "pk": 12, "fields": {"question": 99, "label": "A", "text": "Huérfana"}},
        {"model": "quiz.choice", "pk": 13, "fields": {"question": 2, "label": "", "text": "Sin etiqueta"}},
        {"model": "training.trainingmodule", "pk": 1, "fields": {}}
    ]"#;

    #[test]
    fn parses_and_orders_questions() {
        let fixture = parse_fixture(FIXTURE).unwrap();

        assert_eq!(fixture.questions.len(), 2);
        assert_eq!(fixture.questions[0].order, 1);
        assert_eq!(fixture.questions[0].choices.len(), 2);
        assert!(fixture.questions[0].choices[0].is_correct);
        assert_eq!(fixture.questions[1].explanation, "Porque sí");
        assert_eq!(fixture.skipped_choices, 2);
    }

    #[test]
    fn rejects_fixture_without_choices() {
        let err = parse_fixture(r#"[{"model": "quiz.question", "pk": 1, "fields": {"order": 1}}]"#)
            .unwrap_err();
        assert!(matches!(err, TrainingError::FixtureIncomplete));
    }

    #[test]
    fn rejects_question_without_order() {
        let text = r#"[
            {"model": "quiz.question", "pk": "q1", "fields": {"text": "?"}},
            {"model": "quiz.choice", "pk": 1, "fields": {"question": "q1", "label": "A"}}
        ]"#;
        assert!(matches!(
            parse_fixture(text).unwrap_err(),
            TrainingError::FixtureQuestionWithoutOrder { .. }
        ));
    }

    #[test]
    fn rejects_invalid_json() {
        assert!(matches!(
            parse_fixture("{not json").unwrap_err(),
            TrainingError::FixtureJsonError(_)
        ));
    }
}
