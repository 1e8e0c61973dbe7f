//! Example credential: ISO identity fields plus a fishing namespace, showing
//! that any document type with a schema can be issued.

use chrono::NaiveDate;
use serde::Deserialize;

use super::{base64_bytes, dmy_date, ISO_NAMESPACE};
use crate::schema::{Field, MdocDocument};

/// Document type of the example credential.
pub const EXAMPLE_DOC_TYPE: &str = "uk.gov.account.mobile.example-credential-issuer";

/// Namespace for the example's fishing data elements.
pub const FISHING_NAMESPACE: &str = "uk.gov.account.mobile.example-credential-issuer.fishing.1";

/// Example credential dataset.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct ExampleDocument {
    pub family_name: String,
    pub given_name: String,
    #[serde(with = "base64_bytes")]
    pub portrait: Vec<u8>,
    #[serde(with = "dmy_date")]
    pub birth_date: NaiveDate,
    #[serde(with = "dmy_date")]
    pub issue_date: NaiveDate,
    #[serde(with = "dmy_date")]
    pub expiry_date: NaiveDate,
    pub issuing_country: String,
    pub document_number: String,
    pub type_of_fish: String,
    pub number_of_fishing_rods: u32,
}

static SCHEMA: &[Field<ExampleDocument>] = &[
    Field::required(ISO_NAMESPACE, "familyName", |d| Ok(d.family_name.as_str().into())),
    Field::required(ISO_NAMESPACE, "givenName", |d| Ok(d.given_name.as_str().into())),
    Field::required(ISO_NAMESPACE, "portrait", |d| Ok(d.portrait.clone().into())),
    Field::required(ISO_NAMESPACE, "birthDate", |d| Ok(d.birth_date.into())),
    Field::required(ISO_NAMESPACE, "issueDate", |d| Ok(d.issue_date.into())),
    Field::required(ISO_NAMESPACE, "expiryDate", |d| Ok(d.expiry_date.into())),
    Field::required(ISO_NAMESPACE, "issuingCountry", |d| Ok(d.issuing_country.as_str().into())),
    Field::required(ISO_NAMESPACE, "documentNumber", |d| Ok(d.document_number.as_str().into())),
    Field::required(FISHING_NAMESPACE, "typeOfFish", |d| Ok(d.type_of_fish.as_str().into())),
    Field::required(FISHING_NAMESPACE, "numberOfFishingRods", |d| {
        Ok(d.number_of_fishing_rods.into())
    }),
];

impl MdocDocument for ExampleDocument {
    fn doc_type(&self) -> &str {
        EXAMPLE_DOC_TYPE
    }

    fn schema() -> &'static [Field<Self>] {
        SCHEMA
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::mdoc::ElementValue;
    use crate::mso::DigestIdGenerator;
    use crate::provider::OsRandom;
    use crate::schema::NamespaceBuilder;

    #[test]
    fn fishing_namespace() {
        let doc: ExampleDocument = serde_json::from_value(json!({
            "family_name": "Doe",
            "given_name": "John",
            "portrait": "AAEC",
            "birth_date": "05-12-1970",
            "issue_date": "01-01-2025",
            "expiry_date": "01-01-2026",
            "issuing_country": "GB",
            "document_number": "FLN123456",
            "type_of_fish": "Coarse fish",
            "number_of_fishing_rods": 2
        }))
        .expect("should deserialize");

        let mut id_gen = DigestIdGenerator::with_seed(0, 1);
        let name_spaces = NamespaceBuilder::new(&mut id_gen, &OsRandom).build(&doc).unwrap();

        assert_eq!(name_spaces.names().collect::<Vec<_>>(), vec![ISO_NAMESPACE, FISHING_NAMESPACE]);
        let fishing = name_spaces.get(FISHING_NAMESPACE).unwrap();
        assert_eq!(fishing[0].element_identifier, "type_of_fish");
        assert_eq!(fishing[1].element_identifier, "number_of_fishing_rods");
        assert_eq!(fishing[1].element_value, ElementValue::Uint(2));
        assert_eq!(doc.doc_type(), EXAMPLE_DOC_TYPE);
    }
}
