use serde::Serialize;
use serde_json::Value;

use crate::error::{AppError, Result};
use crate::quote::Quote;

pub const EXISTING_QUOTES_FIELD: &str = "existingQuotes";

/// Body sent by the client application.
#[derive(Serialize)]
pub struct GenerateRequest<'a> {
    #[serde(rename = "existingQuotes")]
    pub existing_quotes: &'a [Quote],
}

/// Pulls the Latin text of every known quote out of a request body.
///
/// Only `latin` is read from each entry; entries without a string `latin`
/// are skipped rather than rejected.
pub fn existing_latin(body: &Value) -> Result<Vec<String>> {
    let quotes = body
        .get(EXISTING_QUOTES_FIELD)
        .and_then(Value::as_array)
        .ok_or_else(|| AppError::InvalidInput(format!("{} must be an array.", EXISTING_QUOTES_FIELD)))?;

    Ok(quotes
        .iter()
        .filter_map(|quote| quote.get("latin").and_then(Value::as_str))
        .map(str::to_string)
        .collect())
}

/// Trims the raw model output and parses it as JSON.
pub fn parse_model_output(raw: &str) -> Result<Value> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AppError::EmptyModelOutput);
    }
    Ok(serde_json::from_str(trimmed)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn collects_latin_text_only() {
        let body = json!({
            "existingQuotes": [
                { "id": 1, "latin": "Alea iacta est.", "author": { "it": "Giulio Cesare" } },
                { "id": 2 },
                { "latin": 7 },
                { "latin": "Cogito, ergo sum." }
            ]
        });
        assert_eq!(existing_latin(&body).unwrap(), vec!["Alea iacta est.", "Cogito, ergo sum."]);
    }

    #[test]
    fn rejects_missing_or_non_array_field() {
        for body in [json!({}), json!({ "existingQuotes": "Alea" }), json!({ "existingQuotes": null }), json!([])] {
            assert!(matches!(existing_latin(&body), Err(AppError::InvalidInput(_))));
        }
    }

    #[test]
    fn parses_trimmed_output() {
        let value = parse_model_output("\n  {\"latin\": \"Carpe diem.\"}  \n").unwrap();
        assert_eq!(value, json!({ "latin": "Carpe diem." }));
    }

    #[test]
    fn whitespace_only_output_is_empty_not_unparseable() {
        assert!(matches!(parse_model_output(" \n\t "), Err(AppError::EmptyModelOutput)));
    }

    #[test]
    fn wrapped_output_is_a_parse_error() {
        let err = parse_model_output("```json\n{\"latin\": \"Carpe diem.\"}\n```").unwrap_err();
        assert!(matches!(err, AppError::ParseError(_)));
    }
}
