use mdoc_issuer::documents::{DrivingLicenceDocument, ExampleDocument};
use mdoc_issuer::mso::StatusListInfo;
use serde_json::{json, Value};

/// Driving licence dataset as held by the issuer's document store.
#[must_use]
pub fn driving_licence_dataset() -> Value {
    json!({
        "family_name": "Edwards-Smith",
        "given_name": "Sarah Elizabeth",
        "title": "Miss",
        "welsh_licence": false,
        "portrait": "/9j/4AAQSkZJRgABAQEASABIAAD/2wBDAAgGBgcGBQgHBwcJCQgKDBQNDAsLDBkSEw8UHRofHh0aHBwgJC4nICIsIxwcKDcpLDAxNDQ0Hyc5PTgyPC4zNDL/wAALCAABAAEBAREA/8QAFAABAAAAAAAAAAAAAAAAAAAACf/EABQQAQAAAAAAAAAAAAAAAAAAAAD/2gAIAQEAAD8AKp//2Q==",
        "birth_date": "24-02-1985",
        "birth_place": "London",
        "issue_date": "08-04-2019",
        "expiry_date": "08-04-2029",
        "issuing_authority": "DVLA",
        "issuing_country": "GB",
        "document_number": "EDWAR851245SE9DE",
        "resident_address": ["Flat 11", "Blashford", "Adelaide Road"],
        "resident_postal_code": "NW3 3RX",
        "resident_city": "London",
        "driving_privileges": [
            {
                "vehicle_category_code": "A",
                "issue_date": "01-08-2012",
                "expiry_date": "31-07-2031"
            },
            {
                "vehicle_category_code": "B",
                "issue_date": "01-05-2005",
                "expiry_date": "31-07-2031",
                "codes": [{"code": "01"}, {"code": "78"}]
            }
        ],
        "un_distinguishing_sign": "UK"
    })
}

/// # Panics
///
/// Panics if the sample dataset does not deserialize.
#[must_use]
pub fn driving_licence() -> DrivingLicenceDocument {
    serde_json::from_value(driving_licence_dataset()).expect("should deserialize")
}

/// # Panics
///
/// Panics if the sample dataset does not deserialize.
#[must_use]
pub fn example_document() -> ExampleDocument {
    serde_json::from_value(json!({
        "family_name": "Doe",
        "given_name": "John",
        "portrait": "AAECAwQ=",
        "birth_date": "05-12-1970",
        "issue_date": "01-01-2025",
        "expiry_date": "01-01-2026",
        "issuing_country": "GB",
        "document_number": "FLN123456",
        "type_of_fish": "Coarse fish",
        "number_of_fishing_rods": 2
    }))
    .expect("should deserialize")
}

#[must_use]
pub fn status_list() -> StatusListInfo {
    StatusListInfo {
        idx: 1234,
        uri: "https://status-list.example.com/t/3B0F3BD087A7".to_string(),
    }
}
