//! # Supporting Documents
//!
//! Supporting documents arrive from extraction as loosely typed JSON
//! objects whose keys vary by extractor and template. A
//! [`SupportingDocument`] keeps the raw map and answers lookups through
//! alias lists ([`keys`]): the first alias holding a usable value wins.
//! Key comparison ignores ASCII case.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use lcx_core::parse::{parse_amount_value, parse_date_value, parse_flag};
use lcx_core::DocumentType;
use serde::{Deserialize, Serialize};

/// Alias lists for fields read by the cross-document rules.
pub mod keys {
    /// Monetary amount.
    pub const AMOUNT: &[&str] = &["amount", "total_amount", "invoice_amount", "total"];
    /// Currency code.
    pub const CURRENCY: &[&str] = &["currency", "currency_code"];
    /// Goods description.
    pub const GOODS: &[&str] = &["goods_description", "description_of_goods", "description", "goods"];
    /// Invoice issuer.
    pub const ISSUER: &[&str] = &["seller", "issuer", "exporter", "beneficiary", "seller_name"];
    /// Invoice buyer.
    pub const BUYER: &[&str] = &["buyer", "applicant", "importer", "buyer_name"];
    /// Invoice date.
    pub const INVOICE_DATE: &[&str] = &["invoice_date", "date", "issue_date"];
    /// Credit number quoted on a document.
    pub const LC_REFERENCE: &[&str] = &["lc_number", "lc_reference", "credit_number", "documentary_credit_number"];
    /// Port of loading.
    pub const PORT_OF_LOADING: &[&str] = &["port_of_loading", "loading_port", "pol"];
    /// Port of discharge.
    pub const PORT_OF_DISCHARGE: &[&str] = &["port_of_discharge", "discharge_port", "pod"];
    /// Shipment (on-board) date. The issue date is the last resort, as
    /// for a transport document without a dated on-board notation.
    pub const SHIPMENT_DATE: &[&str] = &[
        "shipment_date",
        "on_board_date",
        "shipped_on_board_date",
        "date_of_shipment",
        "issue_date",
    ];
    /// Shipper.
    pub const SHIPPER: &[&str] = &["shipper", "shipper_name", "consignor"];
    /// Consignee.
    pub const CONSIGNEE: &[&str] = &["consignee", "consignee_name"];
    /// On-board notation flag.
    pub const ON_BOARD: &[&str] = &["on_board", "shipped_on_board", "on_board_notation"];
    /// Transport document type, e.g. "SHIPPED ON BOARD", "RECEIVED FOR SHIPMENT".
    pub const BL_TYPE: &[&str] = &["bl_type", "type", "transport_document_type"];
    /// Date of the on-board notation.
    pub const ON_BOARD_DATE: &[&str] = &["on_board_date", "shipped_on_board_date", "date_on_board"];
    /// Clauses and notations.
    pub const CLAUSES: &[&str] = &["clauses", "remarks", "notations", "clause"];
    /// Transport mode.
    pub const TRANSPORT_MODE: &[&str] = &["transport_mode", "mode_of_transport"];
    /// Place of receipt / taking in charge.
    pub const PLACE_OF_RECEIPT: &[&str] = &["place_of_receipt", "place_of_taking_in_charge"];
    /// Place of final delivery.
    pub const PLACE_OF_DELIVERY: &[&str] = &["place_of_delivery", "place_of_final_destination"];
    /// Dispatch / taking-in-charge date.
    pub const DISPATCH_DATE: &[&str] = &["dispatch_date", "date_of_dispatch", "taking_in_charge_date"];
    /// Insured amount.
    pub const INSURED_AMOUNT: &[&str] = &["insured_amount", "coverage_amount", "sum_insured", "amount"];
    /// Insurance document date.
    pub const INSURANCE_DATE: &[&str] = &["issue_date", "insurance_date", "policy_date", "date"];
    /// Country of origin.
    pub const ORIGIN: &[&str] = &["country_of_origin", "origin"];
    /// Gross weight.
    pub const GROSS_WEIGHT: &[&str] = &["gross_weight", "total_gross_weight"];
    /// Number of packages.
    pub const PACKAGES: &[&str] = &["packages", "number_of_packages", "total_packages", "package_count"];
}

/// One supporting document as a loosely typed field map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SupportingDocument {
    fields: BTreeMap<String, serde_json::Value>,
}

impl SupportingDocument {
    /// Empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Build from a JSON object. Non-objects give `None`.
    pub fn from_json(value: serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Object(map) => Some(Self {
                fields: map.into_iter().collect(),
            }),
            _ => None,
        }
    }

    /// `true` when the document has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Raw fields.
    pub fn fields(&self) -> &BTreeMap<String, serde_json::Value> {
        &self.fields
    }

    fn raw(&self, key: &str) -> Option<&serde_json::Value> {
        self.fields.get(key).or_else(|| {
            self.fields
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(key))
                .map(|(_, v)| v)
        })
    }

    /// First non-null value under any alias.
    pub fn get(&self, aliases: &[&str]) -> Option<&serde_json::Value> {
        aliases
            .iter()
            .filter_map(|k| self.raw(k))
            .find(|v| !v.is_null())
    }

    /// First non-blank text (numbers and booleans rendered).
    pub fn text(&self, aliases: &[&str]) -> Option<String> {
        aliases.iter().filter_map(|k| self.raw(k)).find_map(as_text)
    }

    /// First parseable amount.
    pub fn amount(&self, aliases: &[&str]) -> Option<f64> {
        aliases
            .iter()
            .filter_map(|k| self.raw(k))
            .find_map(parse_amount_value)
    }

    /// First parseable date.
    pub fn date(&self, aliases: &[&str]) -> Option<NaiveDate> {
        aliases
            .iter()
            .filter_map(|k| self.raw(k))
            .find_map(parse_date_value)
    }

    /// First interpretable flag.
    pub fn flag(&self, aliases: &[&str]) -> Option<bool> {
        aliases.iter().filter_map(|k| self.raw(k)).find_map(parse_flag)
    }

    /// Every text under every alias; arrays are flattened.
    pub fn texts(&self, aliases: &[&str]) -> Vec<String> {
        let mut out = Vec::new();
        for value in aliases.iter().filter_map(|k| self.raw(k)) {
            match value {
                serde_json::Value::Array(items) => out.extend(items.iter().filter_map(as_text)),
                other => out.extend(as_text(other)),
            }
        }
        out
    }

    /// The document as a JSON object.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(self.fields.clone().into_iter().collect())
    }
}

fn as_text(value: &serde_json::Value) -> Option<String> {
    let text = match value {
        serde_json::Value::String(s) => s.trim().to_string(),
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// The supporting documents of one presentation, keyed by type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SupportingDocuments {
    /// Commercial invoice.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice: Option<SupportingDocument>,
    /// Bill of lading or multimodal transport document.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bill_of_lading: Option<SupportingDocument>,
    /// Insurance policy or certificate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insurance: Option<SupportingDocument>,
    /// Certificate of origin.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate_of_origin: Option<SupportingDocument>,
    /// Packing list.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub packing_list: Option<SupportingDocument>,
}

impl SupportingDocuments {
    /// No documents.
    pub fn none() -> Self {
        Self::default()
    }

    /// Set a document by type. The LC itself is not a supporting document
    /// and is ignored.
    pub fn with(mut self, kind: DocumentType, document: SupportingDocument) -> Self {
        let slot = match kind {
            DocumentType::Invoice => &mut self.invoice,
            DocumentType::BillOfLading => &mut self.bill_of_lading,
            DocumentType::Insurance => &mut self.insurance,
            DocumentType::CertificateOfOrigin => &mut self.certificate_of_origin,
            DocumentType::PackingList => &mut self.packing_list,
            DocumentType::LetterOfCredit => return self,
        };
        *slot = Some(document);
        self
    }

    /// Document of a type, if presented.
    pub fn get(&self, kind: DocumentType) -> Option<&SupportingDocument> {
        match kind {
            DocumentType::Invoice => self.invoice.as_ref(),
            DocumentType::BillOfLading => self.bill_of_lading.as_ref(),
            DocumentType::Insurance => self.insurance.as_ref(),
            DocumentType::CertificateOfOrigin => self.certificate_of_origin.as_ref(),
            DocumentType::PackingList => self.packing_list.as_ref(),
            DocumentType::LetterOfCredit => None,
        }
    }

    /// Types presented, in a fixed order.
    pub fn presented(&self) -> Vec<DocumentType> {
        [
            DocumentType::Invoice,
            DocumentType::BillOfLading,
            DocumentType::Insurance,
            DocumentType::CertificateOfOrigin,
            DocumentType::PackingList,
        ]
        .into_iter()
        .filter(|k| self.get(*k).is_some())
        .collect()
    }

    /// `true` when nothing was presented.
    pub fn is_empty(&self) -> bool {
        self.presented().is_empty()
    }

    /// JSON object keyed by document type, for rule contexts.
    pub fn to_context_entries(&self) -> Vec<(String, serde_json::Value)> {
        self.presented()
            .into_iter()
            .filter_map(|k| self.get(k).map(|d| (k.as_str().to_string(), d.to_json())))
            .collect()
    }
}
