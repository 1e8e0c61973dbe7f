//! # Mobile Driving Licence
//!
//! The `org.iso.18013.5.1.mDL` document with its UK domestic extensions.

use chrono::NaiveDate;
use serde::Deserialize;

use super::{base64_bytes, dmy_date, DATE_FORMAT, ISO_NAMESPACE};
use crate::mdoc::ElementValue;
use crate::schema::{Element, Field, MdocDocument};

/// Document type of the mobile driving licence.
pub const MDL_DOC_TYPE: &str = "org.iso.18013.5.1.mDL";

/// Namespace for UK domestic data elements.
pub const GB_NAMESPACE: &str = "org.iso.18013.5.1.GB";

/// Mobile driving licence dataset.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct DrivingLicenceDocument {
    /// Family name.
    pub family_name: String,

    /// Given names.
    pub given_name: String,

    /// Title, e.g. `Miss`.
    pub title: String,

    /// Whether the licence was issued in Welsh.
    pub welsh_licence: bool,

    /// Portrait image (JPEG).
    #[serde(with = "base64_bytes")]
    pub portrait: Vec<u8>,

    /// Date of birth.
    #[serde(with = "dmy_date")]
    pub birth_date: NaiveDate,

    /// Place of birth.
    pub birth_place: String,

    /// Licence issue date.
    #[serde(with = "dmy_date")]
    pub issue_date: NaiveDate,

    /// Licence expiry date.
    #[serde(with = "dmy_date")]
    pub expiry_date: NaiveDate,

    /// Issuing authority, e.g. `DVLA`.
    pub issuing_authority: String,

    /// ISO 3166-1 alpha-2 country code.
    pub issuing_country: String,

    /// Licence number.
    pub document_number: String,

    /// Address lines.
    pub resident_address: Vec<String>,

    /// Postal code.
    pub resident_postal_code: String,

    /// City.
    pub resident_city: String,

    /// Full driving entitlements.
    pub driving_privileges: Vec<DrivingPrivilege>,

    /// UN distinguishing sign of the issuing country, e.g. `UK`.
    pub un_distinguishing_sign: String,

    /// Provisional entitlements, if any.
    #[serde(default)]
    pub provisional_driving_privileges: Option<Vec<DrivingPrivilege>>,
}

/// A single driving entitlement.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct DrivingPrivilege {
    /// Vehicle category, e.g. `B`.
    pub vehicle_category_code: String,

    /// Date the entitlement was granted, as `dd-MM-yyyy`.
    #[serde(default)]
    pub issue_date: Option<String>,

    /// Date the entitlement expires, as `dd-MM-yyyy`.
    #[serde(default)]
    pub expiry_date: Option<String>,

    /// Restriction codes.
    #[serde(default)]
    pub codes: Option<Vec<Code>>,
}

/// A restriction code on a driving entitlement.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct Code {
    /// The code, e.g. `01`.
    pub code: String,
}

impl DrivingPrivilege {
    /// The entitlement as a map holding only the fields that are present:
    /// `vehicle_category_code`, then `issue_date` and `expiry_date` when they
    /// parse, then `codes` when non-empty.
    #[must_use]
    pub fn to_element(&self) -> ElementValue {
        let mut entries =
            vec![("vehicle_category_code".to_string(), self.vehicle_category_code.as_str().into())];

        if let Some(date) = lenient_date(self.issue_date.as_deref(), "issue_date") {
            entries.push(("issue_date".to_string(), date.into()));
        }
        if let Some(date) = lenient_date(self.expiry_date.as_deref(), "expiry_date") {
            entries.push(("expiry_date".to_string(), date.into()));
        }
        if let Some(codes) = self.codes.as_ref().filter(|c| !c.is_empty()) {
            let codes = codes
                .iter()
                .map(|c| ElementValue::Map(vec![("code".to_string(), c.code.as_str().into())]))
                .collect();
            entries.push(("codes".to_string(), ElementValue::Array(codes)));
        }

        ElementValue::Map(entries)
    }
}

// An entitlement date that does not parse is dropped rather than failing
// issuance.
fn lenient_date(date: Option<&str>, name: &str) -> Option<NaiveDate> {
    let date = date?;
    match NaiveDate::parse_from_str(date, DATE_FORMAT) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            tracing::warn!("ignoring driving privilege {name} {date}: {e}");
            None
        }
    }
}

fn privileges(privileges: &[DrivingPrivilege]) -> ElementValue {
    ElementValue::Array(privileges.iter().map(DrivingPrivilege::to_element).collect())
}

static SCHEMA: &[Field<DrivingLicenceDocument>] = &[
    Field::required(ISO_NAMESPACE, "familyName", |d| Ok(d.family_name.as_str().into())),
    Field::required(ISO_NAMESPACE, "givenName", |d| Ok(d.given_name.as_str().into())),
    Field::required(GB_NAMESPACE, "title", |d| Ok(d.title.as_str().into())),
    Field::required(GB_NAMESPACE, "welshLicence", |d| Ok(d.welsh_licence.into())),
    Field::required(ISO_NAMESPACE, "portrait", |d| Ok(d.portrait.clone().into())),
    Field::required(ISO_NAMESPACE, "birthDate", |d| Ok(d.birth_date.into())),
    Field::required(ISO_NAMESPACE, "birthPlace", |d| Ok(d.birth_place.as_str().into())),
    Field::required(ISO_NAMESPACE, "issueDate", |d| Ok(d.issue_date.into())),
    Field::required(ISO_NAMESPACE, "expiryDate", |d| Ok(d.expiry_date.into())),
    Field::required(ISO_NAMESPACE, "issuingAuthority", |d| Ok(d.issuing_authority.as_str().into())),
    Field::required(ISO_NAMESPACE, "issuingCountry", |d| Ok(d.issuing_country.as_str().into())),
    Field::required(ISO_NAMESPACE, "documentNumber", |d| Ok(d.document_number.as_str().into())),
    Field::required(ISO_NAMESPACE, "residentAddress", |d| Ok(d.resident_address.join(", ").into())),
    Field::required(ISO_NAMESPACE, "residentPostalCode", |d| {
        Ok(d.resident_postal_code.as_str().into())
    }),
    Field::required(ISO_NAMESPACE, "residentCity", |d| Ok(d.resident_city.as_str().into())),
    Field::required(ISO_NAMESPACE, "drivingPrivileges", |d| {
        Ok(privileges(&d.driving_privileges).into())
    }),
    Field::required(ISO_NAMESPACE, "unDistinguishingSign", |d| {
        Ok(d.un_distinguishing_sign.as_str().into())
    }),
    Field::optional(GB_NAMESPACE, "provisionalDrivingPrivileges", |d| {
        Ok(Element::optional(d.provisional_driving_privileges.as_deref().map(privileges)))
    }),
];

impl MdocDocument for DrivingLicenceDocument {
    fn doc_type(&self) -> &str {
        MDL_DOC_TYPE
    }

    fn schema() -> &'static [Field<Self>] {
        SCHEMA
    }
}
