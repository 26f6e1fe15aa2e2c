//! Static description table for LC fields, used to word extraction issues.

use lcx_core::LcField;

/// How a field is described to an examiner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescription {
    /// Human name.
    pub name: &'static str,
    /// MT700 field tag.
    pub swift_tag: &'static str,
    /// What a correct value looks like.
    pub expectation: &'static str,
    /// Governing article.
    pub ucp_reference: Option<&'static str>,
}

/// Description of a field.
pub fn describe(field: LcField) -> FieldDescription {
    let (name, swift_tag, expectation, ucp_reference) = match field {
        LcField::LcNumber => (
            "LC Number",
            "20",
            "Documentary credit number",
            Some("UCP600 Article 6"),
        ),
        LcField::Amount => (
            "LC Amount",
            "32B",
            "Credit amount with currency, e.g. USD 100,000.00",
            Some("UCP600 Article 18(b)"),
        ),
        LcField::Currency => (
            "Currency",
            "32B",
            "ISO 4217 currency code",
            Some("UCP600 Article 18(a)"),
        ),
        LcField::ExpiryDate => (
            "Expiry Date",
            "31D",
            "Date and place for presentation",
            Some("UCP600 Article 6(d)"),
        ),
        LcField::Applicant => ("Applicant", "50", "Name and address of the applicant", Some("UCP600 Article 2")),
        LcField::Beneficiary => (
            "Beneficiary",
            "59",
            "Name and address of the beneficiary",
            Some("UCP600 Article 2"),
        ),
        LcField::LatestShipmentDate => (
            "Latest Shipment Date",
            "44C",
            "Latest date of shipment",
            Some("UCP600 Article 31"),
        ),
        LcField::PortOfLoading => (
            "Port of Loading",
            "44E",
            "Port of loading or airport of departure",
            Some("UCP600 Article 20(a)(iii)"),
        ),
        LcField::PortOfDischarge => (
            "Port of Discharge",
            "44F",
            "Port of discharge or airport of destination",
            Some("UCP600 Article 20(a)(iii)"),
        ),
        LcField::GoodsDescription => (
            "Goods Description",
            "45A",
            "Description of goods and/or services",
            Some("UCP600 Article 18(c)"),
        ),
        LcField::IssuingBank => ("Issuing Bank", "52A", "Issuing bank identifier or name", None),
        LcField::IssueDate => ("Date of Issue", "31C", "Date the credit was issued", None),
        LcField::Incoterm => (
            "Incoterm",
            "45A",
            "Trade term named with the goods, e.g. CIF Hamburg",
            None,
        ),
        LcField::AdvisingBank => ("Advising Bank", "57A", "Advising bank identifier or name", None),
        LcField::PresentationPeriod => (
            "Presentation Period",
            "48",
            "Days after shipment for presentation",
            Some("UCP600 Article 14(c)"),
        ),
    };
    FieldDescription {
        name,
        swift_tag,
        expectation,
        ucp_reference,
    }
}

impl FieldDescription {
    /// Expected-value text, e.g. `Credit amount with currency (MT700 field 32B)`.
    pub fn expected(&self) -> String {
        format!("{} (MT700 field {})", self.expectation, self.swift_tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_field_has_a_description() {
        for &field in LcField::all() {
            let d = describe(field);
            assert!(!d.name.is_empty());
            assert!(!d.swift_tag.is_empty());
        }
    }

    #[test]
    fn expected_text_names_the_tag() {
        assert_eq!(describe(LcField::ExpiryDate).expected(), "Date and place for presentation (MT700 field 31D)");
    }
}
