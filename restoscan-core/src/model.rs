// Restaurant analysis data model

use crate::confidence::{normalize_confidence, overall_confidence};
use crate::extract::summarize;
use serde::{Serialize, Serializer};
use std::fmt;

/// Value reported for a field the model could not find in the page content.
pub const NOT_FOUND: &str = "not found by webscan";

/// Business attributes extracted from a restaurant website, in report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    BusinessName,
    BusinessType,
    CuisineType,
    FoodConcept,
    ParentCompany,
    ParentCompanyWebsite,
    OwnerName,
    ChefName,
    RestaurantAddress,
}

impl Field {
    pub const ALL: [Field; 9] = [
        Field::BusinessName,
        Field::BusinessType,
        Field::CuisineType,
        Field::FoodConcept,
        Field::ParentCompany,
        Field::ParentCompanyWebsite,
        Field::OwnerName,
        Field::ChefName,
        Field::RestaurantAddress,
    ];

    /// JSON key used in the model contract.
    pub fn key(&self) -> &'static str {
        match self {
            Field::BusinessName => "businessName",
            Field::BusinessType => "businessType",
            Field::CuisineType => "cuisineType",
            Field::FoodConcept => "foodConcept",
            Field::ParentCompany => "parentCompany",
            Field::ParentCompanyWebsite => "parentCompanyWebsite",
            Field::OwnerName => "ownerName",
            Field::ChefName => "chefName",
            Field::RestaurantAddress => "restaurantAddress",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Field::BusinessName => "Business Name",
            Field::BusinessType => "Business Type",
            Field::CuisineType => "Cuisine Type",
            Field::FoodConcept => "Food Concept",
            Field::ParentCompany => "Parent Company",
            Field::ParentCompanyWebsite => "Parent Company Website",
            Field::OwnerName => "Owner Name",
            Field::ChefName => "Chef Name",
            Field::RestaurantAddress => "Restaurant Address",
        }
    }
}

/// Per-field confidence: a 0-100 score, or N/A for fields that were not found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confidence {
    Score(u8),
    NotApplicable,
}

impl Confidence {
    pub fn score(&self) -> Option<u8> {
        match self {
            Confidence::Score(s) => Some(*s),
            Confidence::NotApplicable => None,
        }
    }

    pub fn is_applicable(&self) -> bool {
        matches!(self, Confidence::Score(_))
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Confidence::Score(s) => write!(f, "{}", s),
            Confidence::NotApplicable => f.write_str("N/A"),
        }
    }
}

impl Serialize for Confidence {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Confidence::Score(s) => serializer.serialize_u8(*s),
            Confidence::NotApplicable => serializer.serialize_str("N/A"),
        }
    }
}

/// One extracted field with its normalized confidence.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldReport {
    pub field: Field,
    pub value: String,
    pub confidence: Confidence,
}

impl FieldReport {
    pub fn is_found(&self) -> bool {
        self.value != NOT_FOUND
    }
}

/// Outcome of one analysis run. Built once by [`AnalysisResult::assemble`].
#[derive(Debug, Clone)]
pub struct AnalysisResult {
    url: String,
    fields: Vec<FieldReport>,
    summary: String,
    overall: u8,
}

impl AnalysisResult {
    /// Build a result from the extracted value and raw model confidence of each
    /// field. `extracted` is called once per field, in [`Field::ALL`] order.
    pub fn assemble(url: &str, mut extracted: impl FnMut(Field) -> (String, Option<f64>)) -> Self {
        let fields: Vec<FieldReport> = Field::ALL
            .iter()
            .map(|&field| {
                let (value, raw) = extracted(field);
                let confidence = normalize_confidence(field, &value, raw);
                FieldReport {
                    field,
                    value,
                    confidence,
                }
            })
            .collect();

        let confidences: Vec<Confidence> = fields.iter().map(|f| f.confidence).collect();
        let overall = overall_confidence(&confidences);
        let summary = summarize(url, &fields);

        Self {
            url: url.to_string(),
            fields,
            summary,
            overall,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn fields(&self) -> &[FieldReport] {
        &self.fields
    }

    pub fn field(&self, field: Field) -> &FieldReport {
        // `fields` always holds every Field in ALL order.
        &self.fields[field as usize]
    }

    pub fn value(&self, field: Field) -> &str {
        &self.field(field).value
    }

    pub fn confidence(&self, field: Field) -> Confidence {
        self.field(field).confidence
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn overall(&self) -> u8 {
        self.overall
    }
}
