// Report rendering for analysis results

use crate::confidence::confidence_label;
use crate::model::{AnalysisResult, Confidence, Field};
use serde_json::{Map, Value, json};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Text,
    Json,
}

impl ReportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" => Some(ReportFormat::Text),
            "json" => Some(ReportFormat::Json),
            _ => None,
        }
    }
}

/// `85% (High)` or `N/A`.
pub fn format_confidence(confidence: Confidence) -> String {
    match confidence {
        Confidence::Score(score) => format!("{}% ({})", score, confidence_label(score)),
        Confidence::NotApplicable => "N/A".to_string(),
    }
}

/// Plain-text report. Field order is fixed so output can be compared line by line.
pub fn generate_text_report(result: &AnalysisResult) -> String {
    let mut report = String::new();
    report.push_str("=== RESTAURANT ANALYSIS RESULTS ===\n\n");

    for field in result.fields() {
        report.push_str(&format!("{}: {}\n", field.field.label(), field.value));
        report.push_str(&format!(
            "  Confidence: {}\n\n",
            format_confidence(field.confidence)
        ));

        if field.field == Field::BusinessName {
            report.push_str(&format!("URL: {}\n\n", result.url()));
        }
    }

    report.push_str(&format!("Summary: {}\n\n", result.summary()));
    report.push_str(&format!(
        "OVERALL CONFIDENCE: {}% ({})\n",
        result.overall(),
        confidence_label(result.overall())
    ));
    report
}

pub fn report_json(result: &AnalysisResult) -> Value {
    let mut object = Map::new();
    let mut confidence = Map::new();

    object.insert("url".to_string(), json!(result.url()));
    for field in result.fields() {
        object.insert(field.field.key().to_string(), json!(field.value));
        confidence.insert(field.field.key().to_string(), json!(field.confidence));
    }
    confidence.insert("overall".to_string(), json!(result.overall()));

    object.insert("summary".to_string(), json!(result.summary()));
    object.insert("confidence".to_string(), Value::Object(confidence));
    Value::Object(object)
}

pub fn generate_json_report(result: &AnalysisResult) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&report_json(result))
}

pub fn generate_report(result: &AnalysisResult, format: ReportFormat) -> serde_json::Result<String> {
    match format {
        ReportFormat::Text => Ok(generate_text_report(result)),
        ReportFormat::Json => generate_json_report(result),
    }
}
