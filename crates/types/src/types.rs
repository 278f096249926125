//! Certificate record types.
//!
//! Field names serialize in camelCase so records line up with documents
//! already held by the hosted store.

use std::fmt;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::number::CertificateNumber;

/// The operator-entered details of a certificate.
#[derive(Debug, Clone, PartialEq, Eq, bon::Builder, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CertificateForm {
    /// Trainee identification number, printed on the certificate.
    #[builder(into)]
    pub id_number: String,
    /// Trainee full name.
    #[builder(into)]
    pub trainee_name: String,
    /// Course title, e.g. "Drilling Operations, Supervisor, Surface".
    #[builder(into)]
    pub course_name: String,
    /// Optional supplement title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(into)]
    pub supplement_name: Option<String>,
    /// Date the course was completed.
    #[schemars(with = "String")]
    pub completion_date: DateTime<Utc>,
    /// Date the certificate lapses; must be after completion.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Option<String>")]
    pub expiration_date: Option<DateTime<Utc>>,
    /// Issuing training provider.
    #[builder(into)]
    pub training_provider: String,
    /// Optional contact number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(into)]
    pub telephone: Option<String>,
    /// Instructor name.
    #[builder(into)]
    pub instructor_name: String,
}

/// An issued certificate.
///
/// Created once on submission and read on verification; never updated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Certificate {
    /// Storage key. Always equal to `certificate_number`.
    pub id: CertificateNumber,
    /// The issued certificate number.
    pub certificate_number: CertificateNumber,
    /// Operator-entered details.
    #[serde(flatten)]
    pub details: CertificateForm,
    /// Public URL that looks this certificate up.
    pub verification_url: String,
    /// QR image of `verification_url` as a `data:image/...` URI, when encoded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qr_code_data_uri: Option<String>,
}

impl Certificate {
    /// Returns the storage key.
    pub fn key(&self) -> &str {
        self.id.as_str()
    }
}

/// A named collection in the certificate store.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
    JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    /// Live certificates.
    #[default]
    Production,
    /// Certificates issued while testing the issuance flow.
    Test,
}

impl Collection {
    /// Lookup order: production first, then test.
    pub const LOOKUP_ORDER: [Collection; 2] = [Self::Production, Self::Test];

    /// Returns the collection's name in the store.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Production => "iadc_certificates",
            Self::Test => "certificates_test",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn sample_form() -> CertificateForm {
        CertificateForm::builder()
            .id_number("T-100")
            .trainee_name("Jane Doe")
            .course_name("Drilling Operations, Supervisor, Surface")
            .completion_date(Utc.with_ymd_and_hms(2025, 11, 20, 0, 0, 0).unwrap())
            .training_provider("Eagle Well Control")
            .instructor_name("Sam Rivera")
            .build()
    }

    #[test]
    fn test_form_serializes_camel_case_and_skips_absent_fields() {
        let json = serde_json::to_value(sample_form()).unwrap();
        assert_eq!(json["idNumber"], "T-100");
        assert_eq!(json["traineeName"], "Jane Doe");
        assert_eq!(json["completionDate"], "2025-11-20T00:00:00Z");
        assert!(json.get("expirationDate").is_none());
        assert!(json.get("supplementName").is_none());
    }

    #[test]
    fn test_certificate_flattens_details() {
        let certificate = Certificate {
            id: CertificateNumber::new("IADC-2025-0001"),
            certificate_number: CertificateNumber::new("IADC-2025-0001"),
            details: sample_form(),
            verification_url: "https://certs.example.com/search?id=IADC-2025-0001".to_string(),
            qr_code_data_uri: None,
        };
        let json = serde_json::to_value(&certificate).unwrap();
        assert_eq!(json["id"], "IADC-2025-0001");
        assert_eq!(json["certificateNumber"], "IADC-2025-0001");
        assert_eq!(json["courseName"], "Drilling Operations, Supervisor, Surface");

        let back: Certificate = serde_json::from_value(json).unwrap();
        assert_eq!(back, certificate);
        assert_eq!(back.key(), "IADC-2025-0001");
    }

    #[test]
    fn test_collection_names() {
        assert_eq!(Collection::Production.name(), "iadc_certificates");
        assert_eq!(Collection::Test.to_string(), "certificates_test");
        assert_eq!(Collection::LOOKUP_ORDER[0], Collection::Production);
        assert_eq!(serde_json::to_string(&Collection::Test).unwrap(), "\"test\"");
    }
}
