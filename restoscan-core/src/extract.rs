//! Prompt construction and parsing of the model's reply.
//!
//! The model is asked for a single JSON object holding the nine field keys
//! and a `confidence` object with a 0-100 score per key. Replies are free
//! text, so the object is located by taking everything from the first `{`
//! to the last `}`. The object is then checked against the expected shape:
//! field values must be strings (null, missing or blank count as not found)
//! and `confidence`, when present, must be an object.

use crate::error::{AnalysisError, Result};
use crate::model::{AnalysisResult, Field, FieldReport, NOT_FOUND};
use restoscan_model::TextGenerator;
use restoscan_scanner::ScanResult;
use serde_json::{Map, Value};
use tracing::{debug, info};

pub const NO_INFORMATION_SUMMARY: &str = "No restaurant information found by webscan";

pub fn build_prompt(page: &ScanResult) -> String {
    format!(
        r#"
You are an expert at analyzing restaurant websites and extracting key business information.
Analyze the following website content and extract restaurant information with confidence scores.

Website URL: {url}
Website Content:
{content}

Extract the following information and provide a confidence score (0-100) for each field:

1. Business name
2. Business type (should be "Restaurant" if this is a restaurant)
3. Cuisine type (e.g., Italian, Chinese, Mexican, etc.)
4. Food concept - A short description of the restaurant's culinary approach and dining experience, in your own words. Describe style rather than copying text from the site. Examples:
   - "Traditional Italian techniques with contemporary touches, focusing on heritage recipes and quality ingredients"
   - "Fresh coastal cuisine featuring locally-sourced seafood with Mediterranean influences and approachable presentation"
   - "Family-style comfort food using authentic recipes and local ingredients in a warm, welcoming atmosphere"
5. Parent company (if any)
6. Parent company website (if any)
7. Owner name (if mentioned)
8. Chef name (if mentioned)
9. Restaurant address (full address if available)

Respond with a single JSON object in the following format:
{{
  "businessName": "extracted name or '{nf}'",
  "businessType": "Restaurant or other type or '{nf}'",
  "cuisineType": "cuisine type or '{nf}'",
  "foodConcept": "concept description or '{nf}'",
  "parentCompany": "parent company or '{nf}'",
  "parentCompanyWebsite": "parent website or '{nf}'",
  "ownerName": "owner name or '{nf}'",
  "chefName": "chef name or '{nf}'",
  "restaurantAddress": "full address or '{nf}'",
  "confidence": {{
    "businessName": 0-100,
    "businessType": 0-100,
    "cuisineType": 0-100,
    "foodConcept": 0-100,
    "parentCompany": 0-100,
    "parentCompanyWebsite": 0-100,
    "ownerName": 0-100,
    "chefName": 0-100,
    "restaurantAddress": 0-100
  }}
}}

Rules:
- If information is not found in the website content, use "{nf}"
- For food concept: use clear, descriptive language that captures the restaurant's style and approach, without overly poetic flourishes
- Confidence scores must be integers from 0 to 100 reflecting how certain you are about the extracted information
- Base confidence on clarity of information, context, and how explicitly it is stated
- Do not make up or infer information that isn't clearly present in the content
"#,
        url = page.url,
        content = page.content,
        nf = NOT_FOUND,
    )
}

/// Slice from the first `{` through the last `}`, if both exist in that order.
pub fn locate_json(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}

fn field_value(object: &Map<String, Value>, field: Field) -> Result<String> {
    match object.get(field.key()) {
        None | Some(Value::Null) => Ok(NOT_FOUND.to_string()),
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(NOT_FOUND) {
                Ok(NOT_FOUND.to_string())
            } else {
                Ok(trimmed.to_string())
            }
        }
        Some(other) => Err(AnalysisError::Schema(format!(
            "field '{}' must be a string, got {}",
            field.key(),
            other
        ))),
    }
}

/// Turn raw model output into an [`AnalysisResult`] for `url`.
pub fn parse_model_response(text: &str, url: &str) -> Result<AnalysisResult> {
    let json = locate_json(text)
        .ok_or_else(|| AnalysisError::Parse("No JSON found in model response".to_string()))?;

    let parsed: Value =
        serde_json::from_str(json).map_err(|e| AnalysisError::Parse(e.to_string()))?;
    let Value::Object(object) = parsed else {
        return Err(AnalysisError::Schema("expected a JSON object".to_string()));
    };

    let empty = Map::new();
    let scores = match object.get("confidence") {
        None | Some(Value::Null) => &empty,
        Some(Value::Object(map)) => map,
        Some(other) => {
            return Err(AnalysisError::Schema(format!(
                "'confidence' must be an object, got {}",
                other
            )));
        }
    };

    let mut values = Vec::with_capacity(Field::ALL.len());
    for field in Field::ALL {
        values.push(field_value(&object, field)?);
    }

    Ok(AnalysisResult::assemble(url, |field| {
        let value = std::mem::take(&mut values[field as usize]);
        let raw = scores.get(field.key()).and_then(Value::as_f64);
        (value, raw)
    }))
}

/// One-line summary listing every found field.
pub fn summarize(url: &str, fields: &[FieldReport]) -> String {
    let found: Vec<String> = fields
        .iter()
        .filter(|f| f.is_found())
        .map(|f| format!("{}: {}", f.field.key(), f.value))
        .collect();

    if found.is_empty() {
        return NO_INFORMATION_SUMMARY.to_string();
    }
    format!("Restaurant analysis for {}: {}", url, found.join(", "))
}

/// Ask the model to extract the restaurant fields from gathered content.
pub async fn request_extraction<M>(model: &M, page: &ScanResult) -> Result<AnalysisResult>
where
    M: TextGenerator + ?Sized,
{
    let prompt = build_prompt(page);
    info!("Requesting field extraction ({} bytes of content)", page.content.len());

    let reply = model.generate(&prompt).await?;
    debug!("Model reply: {}", reply);

    parse_model_response(&reply, &page.url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Confidence;

    const FULL_REPLY: &str = r#"{
        "businessName": "Luigi's Trattoria",
        "businessType": "Restaurant",
        "cuisineType": "Italian",
        "foodConcept": "Rustic Roman cooking with seasonal produce",
        "parentCompany": "not found by webscan",
        "parentCompanyWebsite": "not found by webscan",
        "ownerName": "Luigi Bianchi",
        "chefName": "Maria Conti",
        "restaurantAddress": "12 Via Roma, Springfield",
        "confidence": {
            "businessName": 95,
            "businessType": 90,
            "cuisineType": 85,
            "foodConcept": 70,
            "parentCompany": 10,
            "parentCompanyWebsite": 10,
            "ownerName": 60,
            "chefName": 65,
            "restaurantAddress": 88
        }
    }"#;

    #[test]
    fn test_locate_json_with_surrounding_prose() {
        let text = "Sure! Here is the data:\n```json\n{\"a\": {\"b\": 1}}\n```\nHope this helps.";
        assert_eq!(locate_json(text), Some("{\"a\": {\"b\": 1}}"));
    }

    #[test]
    fn test_locate_json_missing() {
        assert_eq!(locate_json("no braces here"), None);
        assert_eq!(locate_json("} backwards {"), None);
        assert_eq!(locate_json("only open {"), None);
    }

    #[test]
    fn test_parse_full_reply() {
        let result = parse_model_response(FULL_REPLY, "https://luigis.example").unwrap();

        assert_eq!(result.value(Field::BusinessName), "Luigi's Trattoria");
        assert_eq!(result.confidence(Field::BusinessName), Confidence::Score(95));
        assert_eq!(result.value(Field::ParentCompany), NOT_FOUND);
        assert_eq!(
            result.confidence(Field::ParentCompany),
            Confidence::NotApplicable
        );
        // (95 + 90 + 85 + 70 + 60 + 65 + 88) / 7 = 79
        assert_eq!(result.overall(), 79);
    }

    #[test]
    fn test_parse_ignores_prose_around_object() {
        let text = format!("Here is my analysis:\n{}\nLet me know if you need more.", FULL_REPLY);
        let result = parse_model_response(&text, "https://luigis.example").unwrap();
        assert_eq!(result.value(Field::CuisineType), "Italian");
    }

    #[test]
    fn test_missing_fields_become_not_found() {
        let text = r#"{"businessName": "Luigi's", "confidence": {"businessName": 80, "chefName": 90}}"#;
        let result = parse_model_response(text, "https://luigis.example").unwrap();

        assert_eq!(result.value(Field::ChefName), NOT_FOUND);
        assert_eq!(result.confidence(Field::ChefName), Confidence::NotApplicable);
        assert_eq!(result.overall(), 80);
    }

    #[test]
    fn test_blank_and_null_values_become_not_found() {
        let text = r#"{"businessName": "  ", "cuisineType": null, "ownerName": "Not Found By Webscan"}"#;
        let result = parse_model_response(text, "https://x.example").unwrap();

        assert_eq!(result.value(Field::BusinessName), NOT_FOUND);
        assert_eq!(result.value(Field::CuisineType), NOT_FOUND);
        assert_eq!(result.value(Field::OwnerName), NOT_FOUND);
    }

    #[test]
    fn test_no_json_is_parse_error() {
        let err = parse_model_response("I could not analyze this site.", "https://x.example")
            .unwrap_err();
        assert!(matches!(err, AnalysisError::Parse(_)));
        assert!(err.to_string().contains("No JSON found"));
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let err = parse_model_response("{\"businessName\": \"Luigi's\",}", "https://x.example")
            .unwrap_err();
        assert!(matches!(err, AnalysisError::Parse(_)));
    }

    #[test]
    fn test_non_string_field_is_schema_error() {
        let err = parse_model_response(r#"{"businessName": 42}"#, "https://x.example").unwrap_err();
        assert!(matches!(err, AnalysisError::Schema(ref msg) if msg.contains("businessName")));
    }

    #[test]
    fn test_non_object_confidence_is_schema_error() {
        let err = parse_model_response(
            r#"{"businessName": "Luigi's", "confidence": [90]}"#,
            "https://x.example",
        )
        .unwrap_err();
        assert!(matches!(err, AnalysisError::Schema(_)));
    }

    #[test]
    fn test_summary_lists_found_fields_in_order() {
        let text = r#"{"businessName": "Luigi's", "chefName": "Maria Conti", "cuisineType": "Italian"}"#;
        let result = parse_model_response(text, "https://luigis.example").unwrap();
        assert_eq!(
            result.summary(),
            "Restaurant analysis for https://luigis.example: businessName: Luigi's, cuisineType: Italian, chefName: Maria Conti"
        );
    }

    #[test]
    fn test_summary_all_not_found() {
        let result = parse_model_response("{}", "https://x.example").unwrap();
        assert_eq!(result.summary(), NO_INFORMATION_SUMMARY);
        assert_eq!(result.overall(), 0);
    }

    #[test]
    fn test_prompt_embeds_url_content_and_contract() {
        let page = ScanResult::new("https://luigis.example", "Welcome to Luigi's");
        let prompt = build_prompt(&page);

        assert!(prompt.contains("Website URL: https://luigis.example"));
        assert!(prompt.contains("Welcome to Luigi's"));
        assert!(prompt.contains("\"confidence\": {"));
        assert!(prompt.contains("Do not make up"));
        for field in Field::ALL {
            assert!(prompt.contains(&format!("\"{}\"", field.key())), "{}", field.key());
        }
    }
}
