//! # LC Baseline
//!
//! The structured, confidence-scored extraction of a Letter of Credit that
//! every later stage reads. One [`FieldResult`] per [`LcField`]; the field
//! set and each field's priority are fixed here, not supplied by callers, so
//! an extraction payload cannot demote `lc_number` to optional.
//!
//! ## Completeness
//!
//! - `extraction_completeness`: priority-weighted fraction of present fields
//!   (CRITICAL 3, REQUIRED 2, IMPORTANT 1, OPTIONAL 0.5).
//! - `critical_completeness`: fraction of CRITICAL fields present.
//!
//! A field is *present* when its status is EXTRACTED or PARTIAL. INVALID
//! values are retained for diagnostics but never count toward completeness.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::{FieldPriority, FieldStatus};
use crate::error::ValidationError;

// ---------------------------------------------------------------------------
// LcField
// ---------------------------------------------------------------------------

/// The named fields of an LC baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LcField {
    /// Documentary credit number (MT700 field 20).
    LcNumber,
    /// Credit amount (32B).
    Amount,
    /// Credit currency (32B).
    Currency,
    /// Expiry date (31D).
    ExpiryDate,
    /// Applicant (50).
    Applicant,
    /// Beneficiary (59).
    Beneficiary,
    /// Latest date of shipment (44C).
    LatestShipmentDate,
    /// Port of loading (44E).
    PortOfLoading,
    /// Port of discharge (44F).
    PortOfDischarge,
    /// Description of goods (45A).
    GoodsDescription,
    /// Issuing bank (52A).
    IssuingBank,
    /// Date of issue (31C).
    IssueDate,
    /// Incoterm named in 45A.
    Incoterm,
    /// Advising bank (57A).
    AdvisingBank,
    /// Period for presentation in days (48).
    PresentationPeriod,
}

impl LcField {
    /// All fields in canonical order.
    pub fn all() -> &'static [LcField] {
        &[
            Self::LcNumber,
            Self::Amount,
            Self::Currency,
            Self::ExpiryDate,
            Self::Applicant,
            Self::Beneficiary,
            Self::LatestShipmentDate,
            Self::PortOfLoading,
            Self::PortOfDischarge,
            Self::GoodsDescription,
            Self::IssuingBank,
            Self::IssueDate,
            Self::Incoterm,
            Self::AdvisingBank,
            Self::PresentationPeriod,
        ]
    }

    /// The number of baseline fields.
    pub const COUNT: usize = 15;

    /// Snake-case field name.
    pub fn name(self) -> &'static str {
        match self {
            Self::LcNumber => "lc_number",
            Self::Amount => "amount",
            Self::Currency => "currency",
            Self::ExpiryDate => "expiry_date",
            Self::Applicant => "applicant",
            Self::Beneficiary => "beneficiary",
            Self::LatestShipmentDate => "latest_shipment_date",
            Self::PortOfLoading => "port_of_loading",
            Self::PortOfDischarge => "port_of_discharge",
            Self::GoodsDescription => "goods_description",
            Self::IssuingBank => "issuing_bank",
            Self::IssueDate => "issue_date",
            Self::Incoterm => "incoterm",
            Self::AdvisingBank => "advising_bank",
            Self::PresentationPeriod => "presentation_period",
        }
    }

    /// Fixed examination priority of this field.
    pub fn priority(self) -> FieldPriority {
        match self {
            Self::LcNumber | Self::Amount | Self::Currency | Self::ExpiryDate => {
                FieldPriority::Critical
            }
            Self::Applicant
            | Self::Beneficiary
            | Self::LatestShipmentDate
            | Self::PortOfLoading
            | Self::PortOfDischarge
            | Self::GoodsDescription => FieldPriority::Required,
            Self::IssuingBank | Self::IssueDate | Self::Incoterm => FieldPriority::Important,
            Self::AdvisingBank | Self::PresentationPeriod => FieldPriority::Optional,
        }
    }

    /// Look up a field by its snake-case name.
    pub fn from_name(name: &str) -> Option<LcField> {
        Self::all().iter().copied().find(|f| f.name() == name)
    }
}

impl fmt::Display for LcField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// FieldResult
// ---------------------------------------------------------------------------

/// One extracted LC field.
///
/// Invariant: `status != MISSING` implies `value.is_some()`. Enforced by
/// every constructor and by deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawFieldResult")]
pub struct FieldResult {
    field_name: String,
    value: Option<String>,
    confidence: f64,
    priority: FieldPriority,
    status: FieldStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    source_tag: Option<String>,
}

#[derive(Deserialize)]
struct RawFieldResult {
    field_name: String,
    #[serde(default)]
    value: Option<String>,
    confidence: f64,
    priority: FieldPriority,
    status: FieldStatus,
    #[serde(default)]
    source_tag: Option<String>,
}

impl TryFrom<RawFieldResult> for FieldResult {
    type Error = ValidationError;

    fn try_from(raw: RawFieldResult) -> Result<Self, Self::Error> {
        let mut result = FieldResult::new(
            raw.field_name,
            raw.value,
            raw.confidence,
            raw.priority,
            raw.status,
        )?;
        result.source_tag = raw.source_tag;
        Ok(result)
    }
}

impl FieldResult {
    /// Create a validated field result.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] if the name is blank, the confidence is not
    /// within `[0, 1]`, or a non-MISSING status has no value.
    pub fn new(
        field_name: impl Into<String>,
        value: Option<String>,
        confidence: f64,
        priority: FieldPriority,
        status: FieldStatus,
    ) -> Result<Self, ValidationError> {
        let field_name = field_name.into();
        if field_name.trim().is_empty() {
            return Err(ValidationError::EmptyFieldName);
        }
        if !(0.0..=1.0).contains(&confidence) {
            return Err(ValidationError::ConfidenceOutOfRange {
                field: field_name,
                confidence,
            });
        }
        if status != FieldStatus::Missing && value.is_none() {
            return Err(ValidationError::MissingValue {
                field: field_name,
                status: status.to_string(),
            });
        }
        // A MISSING result never carries a stale value.
        let value = if status == FieldStatus::Missing {
            None
        } else {
            value
        };
        Ok(Self {
            field_name,
            value,
            confidence,
            priority,
            status,
            source_tag: None,
        })
    }

    /// A MISSING result for the given field.
    pub fn missing(field: LcField) -> Self {
        Self {
            field_name: field.name().to_string(),
            value: None,
            confidence: 0.0,
            priority: field.priority(),
            status: FieldStatus::Missing,
            source_tag: None,
        }
    }

    fn with_status(field: LcField, value: String, confidence: f64, status: FieldStatus) -> Self {
        Self {
            field_name: field.name().to_string(),
            value: Some(value),
            confidence: clamp_confidence(confidence),
            priority: field.priority(),
            status,
            source_tag: None,
        }
    }

    /// An EXTRACTED result. Confidence is clamped to `[0, 1]`.
    pub fn extracted(field: LcField, value: impl Into<String>, confidence: f64) -> Self {
        Self::with_status(field, value.into(), confidence, FieldStatus::Extracted)
    }

    /// A PARTIAL result. Confidence is clamped to `[0, 1]`.
    pub fn partial(field: LcField, value: impl Into<String>, confidence: f64) -> Self {
        Self::with_status(field, value.into(), confidence, FieldStatus::Partial)
    }

    /// An INVALID result. Confidence is clamped to `[0, 1]`.
    pub fn invalid(field: LcField, value: impl Into<String>, confidence: f64) -> Self {
        Self::with_status(field, value.into(), confidence, FieldStatus::Invalid)
    }

    /// Attach the extractor's source tag (e.g. the SWIFT tag it came from).
    pub fn with_source_tag(mut self, tag: impl Into<String>) -> Self {
        self.source_tag = Some(tag.into());
        self
    }

    /// Field name.
    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    /// Raw extracted value, regardless of status.
    pub fn raw_value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// Value, only when the field counts as present.
    pub fn value(&self) -> Option<&str> {
        if self.is_present() {
            self.value.as_deref()
        } else {
            None
        }
    }

    /// Extraction confidence in `[0, 1]`.
    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    /// Examination priority.
    pub fn priority(&self) -> FieldPriority {
        self.priority
    }

    /// Extraction status.
    pub fn status(&self) -> FieldStatus {
        self.status
    }

    /// Extractor source tag, if any.
    pub fn source_tag(&self) -> Option<&str> {
        self.source_tag.as_deref()
    }

    /// EXTRACTED or PARTIAL with a non-blank value.
    pub fn is_present(&self) -> bool {
        matches!(self.status, FieldStatus::Extracted | FieldStatus::Partial)
            && self
                .value
                .as_deref()
                .map(|v| !v.trim().is_empty())
                .unwrap_or(false)
    }
}

fn clamp_confidence(confidence: f64) -> f64 {
    if confidence.is_nan() {
        0.0
    } else {
        confidence.clamp(0.0, 1.0)
    }
}

// ---------------------------------------------------------------------------
// LcBaseline
// ---------------------------------------------------------------------------

/// The extracted LC baseline for one validation run. Read-only once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BaselinePayload")]
pub struct LcBaseline {
    fields: BTreeMap<LcField, FieldResult>,
    supplementary: BTreeMap<String, String>,
    extraction_completeness: f64,
    critical_completeness: f64,
}

impl LcBaseline {
    /// Start building a baseline. Unset fields become MISSING.
    pub fn builder() -> LcBaselineBuilder {
        LcBaselineBuilder::default()
    }

    /// The result for a field. Always present: unset fields are MISSING.
    pub fn field(&self, field: LcField) -> &FieldResult {
        // `build()` inserts every LcField, so the fallback is unreachable in
        // practice; it keeps this accessor total without panicking.
        self.fields.get(&field).unwrap_or(&MISSING_FALLBACK)
    }

    /// Value of a field, only when present.
    pub fn value(&self, field: LcField) -> Option<&str> {
        self.field(field).value()
    }

    /// Raw value of a field regardless of status.
    pub fn raw_value(&self, field: LcField) -> Option<&str> {
        self.field(field).raw_value()
    }

    /// Whether a field is present.
    pub fn is_present(&self, field: LcField) -> bool {
        self.field(field).is_present()
    }

    /// Iterate fields in canonical order.
    pub fn fields(&self) -> impl Iterator<Item = (LcField, &FieldResult)> {
        self.fields.iter().map(|(k, v)| (*k, v))
    }

    /// Additional LC terms outside the fifteen named fields.
    pub fn supplementary(&self) -> &BTreeMap<String, String> {
        &self.supplementary
    }

    /// A supplementary term by key.
    pub fn term(&self, key: &str) -> Option<&str> {
        self.supplementary
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }

    /// Priority-weighted fraction of present fields.
    pub fn extraction_completeness(&self) -> f64 {
        self.extraction_completeness
    }

    /// Fraction of CRITICAL fields present.
    pub fn critical_completeness(&self) -> f64 {
        self.critical_completeness
    }

    /// Names of absent CRITICAL fields, in canonical order.
    pub fn missing_critical(&self) -> Vec<String> {
        self.missing_with_priority(FieldPriority::Critical)
    }

    /// Names of absent REQUIRED fields, in canonical order.
    pub fn missing_required(&self) -> Vec<String> {
        self.missing_with_priority(FieldPriority::Required)
    }

    fn missing_with_priority(&self, priority: FieldPriority) -> Vec<String> {
        self.fields
            .iter()
            .filter(|(f, r)| f.priority() == priority && !r.is_present())
            .map(|(f, _)| f.name().to_string())
            .collect()
    }

    /// Render the baseline as a JSON object for the rule DSL.
    ///
    /// Present fields map to their value, absent fields to `null`.
    /// Supplementary terms are merged in without overriding named fields.
    pub fn to_context_value(&self) -> serde_json::Value {
        let mut map = serde_json::Map::new();
        for (key, value) in &self.supplementary {
            map.insert(key.clone(), serde_json::Value::String(value.clone()));
        }
        for (field, result) in &self.fields {
            let value = match result.value() {
                Some(v) => serde_json::Value::String(v.to_string()),
                None => serde_json::Value::Null,
            };
            map.insert(field.name().to_string(), value);
        }
        serde_json::Value::Object(map)
    }

    fn compute_completeness(fields: &BTreeMap<LcField, FieldResult>) -> (f64, f64) {
        let mut total_weight = 0.0;
        let mut present_weight = 0.0;
        let mut critical_total = 0usize;
        let mut critical_present = 0usize;
        for (field, result) in fields {
            let priority = field.priority();
            total_weight += priority.weight();
            if result.is_present() {
                present_weight += priority.weight();
            }
            if priority == FieldPriority::Critical {
                critical_total += 1;
                if result.is_present() {
                    critical_present += 1;
                }
            }
        }
        let completeness = if total_weight > 0.0 {
            present_weight / total_weight
        } else {
            0.0
        };
        let critical = if critical_total > 0 {
            critical_present as f64 / critical_total as f64
        } else {
            0.0
        };
        (completeness, critical)
    }
}

static MISSING_FALLBACK: FieldResult = FieldResult {
    field_name: String::new(),
    value: None,
    confidence: 0.0,
    priority: FieldPriority::Optional,
    status: FieldStatus::Missing,
    source_tag: None,
};

/// Builder for [`LcBaseline`].
#[derive(Debug, Default, Clone)]
pub struct LcBaselineBuilder {
    fields: BTreeMap<LcField, FieldResult>,
    supplementary: BTreeMap<String, String>,
}

impl LcBaselineBuilder {
    /// Set a field result. The field's fixed priority and name replace
    /// whatever the result carried.
    pub fn set(mut self, field: LcField, mut result: FieldResult) -> Self {
        result.field_name = field.name().to_string();
        result.priority = field.priority();
        self.fields.insert(field, result);
        self
    }

    /// Set an EXTRACTED field.
    pub fn extracted(self, field: LcField, value: impl Into<String>, confidence: f64) -> Self {
        self.set(field, FieldResult::extracted(field, value, confidence))
    }

    /// Set a PARTIAL field.
    pub fn partial(self, field: LcField, value: impl Into<String>, confidence: f64) -> Self {
        self.set(field, FieldResult::partial(field, value, confidence))
    }

    /// Set an INVALID field.
    pub fn invalid(self, field: LcField, value: impl Into<String>, confidence: f64) -> Self {
        self.set(field, FieldResult::invalid(field, value, confidence))
    }

    /// Add a supplementary LC term.
    pub fn term(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.supplementary.insert(key.into(), value.into());
        self
    }

    /// Finish the baseline, filling unset fields with MISSING results and
    /// computing completeness metrics.
    pub fn build(mut self) -> LcBaseline {
        for &field in LcField::all() {
            self.fields
                .entry(field)
                .or_insert_with(|| FieldResult::missing(field));
        }
        let (extraction_completeness, critical_completeness) =
            LcBaseline::compute_completeness(&self.fields);
        LcBaseline {
            fields: self.fields,
            supplementary: self.supplementary,
            extraction_completeness,
            critical_completeness,
        }
    }
}

// ---------------------------------------------------------------------------
// Payload deserialization
// ---------------------------------------------------------------------------

/// Loosely typed field entry as produced by an extraction collaborator.
#[derive(Debug, Deserialize)]
struct FieldPayload {
    #[serde(default)]
    value: Option<serde_json::Value>,
    #[serde(default)]
    confidence: Option<f64>,
    #[serde(default)]
    status: Option<FieldStatus>,
    #[serde(default)]
    source_tag: Option<String>,
}

/// Accepts either the serialized baseline shape or an extraction payload
/// `{ "fields": { "<name>": { "value": .., "confidence": .., "status": .. } } }`.
#[derive(Debug, Deserialize)]
struct BaselinePayload {
    #[serde(default)]
    fields: BTreeMap<String, FieldPayload>,
    #[serde(default)]
    supplementary: BTreeMap<String, String>,
}

impl TryFrom<BaselinePayload> for LcBaseline {
    type Error = ValidationError;

    fn try_from(payload: BaselinePayload) -> Result<Self, Self::Error> {
        let mut builder = LcBaseline::builder();
        for (name, entry) in payload.fields {
            let field =
                LcField::from_name(&name).ok_or_else(|| ValidationError::UnknownField(name))?;
            let value = entry.value.and_then(|v| match v {
                serde_json::Value::Null => None,
                serde_json::Value::String(s) => Some(s),
                other => Some(other.to_string()),
            });
            let status = entry.status.unwrap_or(if value.is_some() {
                FieldStatus::Extracted
            } else {
                FieldStatus::Missing
            });
            let confidence = entry
                .confidence
                .unwrap_or(if value.is_some() { 1.0 } else { 0.0 });
            let mut result =
                FieldResult::new(field.name(), value, confidence, field.priority(), status)?;
            result.source_tag = entry.source_tag;
            builder = builder.set(field, result);
        }
        builder.supplementary = payload.supplementary;
        Ok(builder.build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_baseline() -> LcBaseline {
        let mut b = LcBaseline::builder();
        for &field in LcField::all() {
            b = b.extracted(field, format!("value-{}", field.name()), 0.95);
        }
        b.build()
    }

    #[test]
    fn empty_baseline_has_zero_completeness() {
        let baseline = LcBaseline::builder().build();
        assert_eq!(baseline.extraction_completeness(), 0.0);
        assert_eq!(baseline.critical_completeness(), 0.0);
        assert_eq!(baseline.fields().count(), LcField::COUNT);
    }

    #[test]
    fn full_baseline_is_complete() {
        let baseline = full_baseline();
        assert!((baseline.extraction_completeness() - 1.0).abs() < 1e-9);
        assert!((baseline.critical_completeness() - 1.0).abs() < 1e-9);
        assert!(baseline.missing_critical().is_empty());
    }

    #[test]
    fn critical_completeness_counts_only_critical_fields() {
        let baseline = LcBaseline::builder()
            .extracted(LcField::LcNumber, "LC1", 0.9)
            .extracted(LcField::Amount, "100", 0.9)
            .extracted(LcField::Applicant, "ACME", 0.9)
            .build();
        assert!((baseline.critical_completeness() - 0.5).abs() < 1e-9);
        assert_eq!(
            baseline.missing_critical(),
            vec!["currency".to_string(), "expiry_date".to_string()]
        );
    }

    #[test]
    fn invalid_fields_do_not_count_as_present() {
        let baseline = LcBaseline::builder()
            .invalid(LcField::ExpiryDate, "31/02/2026", 0.8)
            .build();
        assert!(!baseline.is_present(LcField::ExpiryDate));
        assert_eq!(baseline.value(LcField::ExpiryDate), None);
        assert_eq!(baseline.raw_value(LcField::ExpiryDate), Some("31/02/2026"));
    }

    #[test]
    fn partial_fields_count_as_present() {
        let baseline = LcBaseline::builder()
            .partial(LcField::Applicant, "ACME TRAD", 0.6)
            .build();
        assert!(baseline.is_present(LcField::Applicant));
    }

    #[test]
    fn blank_value_is_not_present() {
        let baseline = LcBaseline::builder()
            .extracted(LcField::LcNumber, "   ", 0.9)
            .build();
        assert!(!baseline.is_present(LcField::LcNumber));
    }

    #[test]
    fn builder_enforces_fixed_priority() {
        let result = FieldResult::new(
            "whatever",
            Some("LC1".into()),
            0.9,
            FieldPriority::Optional,
            FieldStatus::Extracted,
        )
        .unwrap();
        let baseline = LcBaseline::builder().set(LcField::LcNumber, result).build();
        let field = baseline.field(LcField::LcNumber);
        assert_eq!(field.priority(), FieldPriority::Critical);
        assert_eq!(field.field_name(), "lc_number");
    }

    #[test]
    fn field_result_rejects_status_without_value() {
        let err = FieldResult::new(
            "amount",
            None,
            0.5,
            FieldPriority::Critical,
            FieldStatus::Extracted,
        )
        .unwrap_err();
        assert!(matches!(err, ValidationError::MissingValue { .. }));
    }

    #[test]
    fn field_result_rejects_out_of_range_confidence() {
        let err = FieldResult::new(
            "amount",
            Some("1".into()),
            1.2,
            FieldPriority::Critical,
            FieldStatus::Extracted,
        )
        .unwrap_err();
        assert!(matches!(err, ValidationError::ConfidenceOutOfRange { .. }));
    }

    #[test]
    fn missing_status_drops_value() {
        let r = FieldResult::new(
            "amount",
            Some("1".into()),
            0.0,
            FieldPriority::Critical,
            FieldStatus::Missing,
        )
        .unwrap();
        assert_eq!(r.raw_value(), None);
    }

    #[test]
    fn payload_deserializes_with_defaults() {
        let json = serde_json::json!({
            "fields": {
                "lc_number": { "value": "LC-2026-001", "confidence": 0.97 },
                "amount": { "value": 100000 },
                "expiry_date": { "value": null }
            },
            "supplementary": { "amount_tolerance": "5/5" }
        });
        let baseline: LcBaseline = serde_json::from_value(json).unwrap();
        assert_eq!(baseline.value(LcField::LcNumber), Some("LC-2026-001"));
        assert_eq!(baseline.value(LcField::Amount), Some("100000"));
        assert_eq!(baseline.field(LcField::Amount).confidence(), 1.0);
        assert!(!baseline.is_present(LcField::ExpiryDate));
        assert_eq!(baseline.term("amount_tolerance"), Some("5/5"));
    }

    #[test]
    fn payload_rejects_unknown_field() {
        let json = serde_json::json!({ "fields": { "favourite_colour": { "value": "red" } } });
        let err = serde_json::from_value::<LcBaseline>(json).unwrap_err();
        assert!(err.to_string().contains("favourite_colour"));
    }

    #[test]
    fn context_value_uses_present_values_only() {
        let baseline = LcBaseline::builder()
            .extracted(LcField::Currency, "USD", 0.99)
            .invalid(LcField::Amount, "abc", 0.4)
            .term("transport_mode", "multimodal")
            .build();
        let ctx = baseline.to_context_value();
        assert_eq!(ctx["currency"], "USD");
        assert!(ctx["amount"].is_null());
        assert_eq!(ctx["transport_mode"], "multimodal");
    }

    #[test]
    fn field_names_round_trip() {
        for &field in LcField::all() {
            assert_eq!(LcField::from_name(field.name()), Some(field));
        }
    }
}
