//! # Document Schema
//!
//! A document type describes its data elements as a static list of
//! [`Field`]s: the namespace each element belongs to, its name, and an
//! accessor that reads the value from the document. The [`NamespaceBuilder`]
//! walks that list to produce salted, numbered `IssuerSignedItem`s.

use std::collections::HashSet;

use tracing::instrument;

use crate::error::{Error, Result};
use crate::mdoc::{ElementValue, IssuerSignedItem, NameSpaces, SALT_LEN};
use crate::mso::DigestIdGenerator;
use crate::provider::RandomSource;

/// Reads one data element from a document.
pub type Accessor<D> = fn(&D) -> anyhow::Result<Element>;

/// The value read from a document field.
#[derive(Clone, Debug, PartialEq)]
pub enum Element {
    /// A value to be issued.
    Value(ElementValue),

    /// The field holds no value.
    Empty,

    /// The field does not apply to this document instance and is never
    /// issued, e.g. an internal identifier.
    NotApplicable,
}

impl Element {
    /// `Value` when `value` is present, otherwise `Empty`.
    pub fn optional<T: Into<ElementValue>>(value: Option<T>) -> Self {
        value.map_or(Self::Empty, |v| Self::Value(v.into()))
    }
}

impl<T: Into<ElementValue>> From<T> for Element {
    fn from(value: T) -> Self {
        Self::Value(value.into())
    }
}

/// One data element of a document type.
pub struct Field<D> {
    /// Namespace the element is issued under.
    pub namespace: &'static str,

    /// Field name in camelCase. The element identifier is its snake_case form.
    pub name: &'static str,

    /// Whether an empty value is omitted rather than treated as an error.
    pub optional: bool,

    accessor: Accessor<D>,
}

impl<D> Field<D> {
    /// A field that must always hold a value.
    pub const fn required(
        namespace: &'static str, name: &'static str, accessor: Accessor<D>,
    ) -> Self {
        Self {
            namespace,
            name,
            optional: false,
            accessor,
        }
    }

    /// A field that is omitted from the credential when empty.
    pub const fn optional(
        namespace: &'static str, name: &'static str, accessor: Accessor<D>,
    ) -> Self {
        Self {
            namespace,
            name,
            optional: true,
            accessor,
        }
    }

    /// The element identifier, e.g. `birthDate` becomes `birth_date`.
    #[must_use]
    pub fn element_identifier(&self) -> String {
        to_snake_case(self.name)
    }

    /// Read the field from `document`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SchemaAccess`] if the accessor fails.
    pub fn read(&self, document: &D) -> Result<Element> {
        (self.accessor)(document).map_err(|e| Error::schema_access(self.namespace, self.name, e))
    }
}

/// A document that can be issued as an mdoc.
pub trait MdocDocument: 'static {
    /// The mdoc document type, e.g. `org.iso.18013.5.1.mDL`.
    fn doc_type(&self) -> &str;

    /// The document's data elements in issuance order.
    fn schema() -> &'static [Field<Self>]
    where
        Self: Sized;
}

/// Convert a camelCase field name to a snake_case element identifier.
///
/// Every uppercase letter becomes `_` followed by its lowercase form.
#[must_use]
pub fn to_snake_case(name: &str) -> String {
    let mut snake = String::with_capacity(name.len() + 4);
    for c in name.chars() {
        if c.is_uppercase() {
            snake.push('_');
            snake.extend(c.to_lowercase());
        } else {
            snake.push(c);
        }
    }
    snake
}

/// Builds the issuer-signed namespaces for a document.
pub struct NamespaceBuilder<'a, R: RandomSource + ?Sized> {
    id_gen: &'a mut DigestIdGenerator,
    rng: &'a R,
}

impl<'a, R: RandomSource + ?Sized> NamespaceBuilder<'a, R> {
    /// Create a builder that numbers items with `id_gen` and salts them with
    /// bytes from `rng`.
    pub fn new(id_gen: &'a mut DigestIdGenerator, rng: &'a R) -> Self {
        Self { id_gen, rng }
    }

    /// Build namespaces from the document's own schema.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SchemaAccess`] when a field cannot be read or a
    /// required field is empty.
    pub fn build<D: MdocDocument>(&mut self, document: &D) -> Result<NameSpaces> {
        self.build_with_schema(document, D::schema())
    }

    /// Build namespaces by walking `schema` in order.
    ///
    /// Namespaces appear in the order they are first used. Within a namespace,
    /// items follow the schema order. Empty optional fields and fields that do
    /// not apply are skipped without consuming a digest ID.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SchemaAccess`] when a field cannot be read or a
    /// required field is empty, or [`Error::Encoding`] when the random source
    /// returns a short or repeated salt.
    #[instrument(level = "debug", skip_all, fields(fields = schema.len()))]
    pub fn build_with_schema<D>(
        &mut self, document: &D, schema: &[Field<D>],
    ) -> Result<NameSpaces> {
        tracing::debug!("NamespaceBuilder::build");

        let mut name_spaces = NameSpaces::default();
        let mut salts = HashSet::new();

        for field in schema {
            let value = match field.read(document)? {
                Element::Value(value) => value,
                Element::Empty if field.optional => {
                    tracing::debug!("omitting empty {}/{}", field.namespace, field.name);
                    continue;
                }
                Element::Empty => {
                    return Err(Error::schema_access(
                        field.namespace,
                        field.name,
                        "required field is empty",
                    ));
                }
                Element::NotApplicable => continue,
            };

            let random = self.rng.bytes(SALT_LEN);
            if random.len() != SALT_LEN || !salts.insert(random.clone()) {
                return Err(Error::Encoding(format!("bad salt for {}", field.name)));
            }

            let item = IssuerSignedItem {
                digest_id: self.id_gen.generate(),
                random,
                element_identifier: field.element_identifier(),
                element_value: value,
            };
            name_spaces.push(field.namespace, item);
        }

        Ok(name_spaces)
    }
}

#[cfg(test)]
mod tests {
    use anyhow::anyhow;

    use super::*;
    use crate::provider::OsRandom;

    const NS: &str = "org.example.1";
    const NS_EXT: &str = "org.example.1.ext";

    struct Licence {
        family_name: String,
        middle_name: Option<String>,
        number: String,
    }

    impl MdocDocument for Licence {
        fn doc_type(&self) -> &str {
            "org.example.licence"
        }

        fn schema() -> &'static [Field<Self>] {
            static SCHEMA: &[Field<Licence>] = &[
                Field::required(NS, "familyName", |d| Ok(d.family_name.as_str().into())),
                Field::optional(NS_EXT, "middleName", |d| {
                    Ok(Element::optional(d.middle_name.clone()))
                }),
                Field::required(NS, "documentNumber", |d| Ok(d.number.as_str().into())),
                Field::required(NS, "internalRef", |_| Ok(Element::NotApplicable)),
            ];
            SCHEMA
        }
    }

    fn licence() -> Licence {
        Licence {
            family_name: "Edwards".to_string(),
            middle_name: Some("Jo".to_string()),
            number: "EDWAR711178A99DE".to_string(),
        }
    }

    #[test]
    fn snake_case() {
        assert_eq!(to_snake_case("birthDate"), "birth_date");
        assert_eq!(to_snake_case("unDistinguishingSign"), "un_distinguishing_sign");
        assert_eq!(to_snake_case("portrait"), "portrait");
        assert_eq!(to_snake_case("ageOver18"), "age_over18");
    }

    #[test]
    fn items_in_schema_order() {
        let mut id_gen = DigestIdGenerator::with_seed(100, 3);
        let name_spaces =
            NamespaceBuilder::new(&mut id_gen, &OsRandom).build(&licence()).expect("should build");

        assert_eq!(name_spaces.names().collect::<Vec<_>>(), vec![NS, NS_EXT]);

        let items = name_spaces.get(NS).unwrap();
        let ids: Vec<_> = items.iter().map(|i| i.digest_id).collect();
        let names: Vec<_> = items.iter().map(|i| i.element_identifier.as_str()).collect();
        assert_eq!(ids, vec![103, 109]);
        assert_eq!(names, vec!["family_name", "document_number"]);

        let ext = name_spaces.get(NS_EXT).unwrap();
        assert_eq!(ext[0].digest_id, 106);
        assert_eq!(ext[0].element_value, ElementValue::Text("Jo".to_string()));
    }

    #[test]
    fn empty_optional_omitted() {
        let mut doc = licence();
        doc.middle_name = None;

        let mut id_gen = DigestIdGenerator::with_seed(0, 1);
        let name_spaces = NamespaceBuilder::new(&mut id_gen, &OsRandom).build(&doc).unwrap();

        assert!(name_spaces.get(NS_EXT).is_none());
        let ids: Vec<_> = name_spaces.get(NS).unwrap().iter().map(|i| i.digest_id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn salts_are_fresh() {
        let mut id_gen = DigestIdGenerator::with_seed(0, 1);
        let name_spaces = NamespaceBuilder::new(&mut id_gen, &OsRandom).build(&licence()).unwrap();
        let salts: HashSet<_> = name_spaces
            .iter()
            .flat_map(|(_, items)| items.iter().map(|i| i.random.clone()))
            .collect();
        assert_eq!(salts.len(), 3);
        assert!(salts.iter().all(|s| s.len() == SALT_LEN));
    }

    #[test]
    fn accessor_failure() {
        static FAILING: &[Field<Licence>] =
            &[Field::required(NS, "familyName", |_| Err(anyhow!("store unavailable")))];

        let mut id_gen = DigestIdGenerator::with_seed(0, 1);
        let err = NamespaceBuilder::new(&mut id_gen, &OsRandom)
            .build_with_schema(&licence(), FAILING)
            .expect_err("should fail");

        let Error::SchemaAccess { namespace, field, reason } = err else {
            panic!("expected schema access error");
        };
        assert_eq!(namespace, NS);
        assert_eq!(field, "familyName");
        assert_eq!(reason, "store unavailable");
    }

    #[test]
    fn required_empty_fails() {
        static REQUIRED: &[Field<Licence>] =
            &[Field::required(NS, "middleName", |d| Ok(Element::optional(d.middle_name.clone())))];

        let mut doc = licence();
        doc.middle_name = None;
        let mut id_gen = DigestIdGenerator::with_seed(0, 1);
        let err = NamespaceBuilder::new(&mut id_gen, &OsRandom)
            .build_with_schema(&doc, REQUIRED)
            .expect_err("should fail");
        assert!(matches!(err, Error::SchemaAccess { .. }));
    }

    #[test]
    fn repeated_salt_rejected() {
        struct Zeros;
        impl RandomSource for Zeros {
            fn bytes(&self, len: usize) -> Vec<u8> {
                vec![0; len]
            }
        }

        let mut id_gen = DigestIdGenerator::with_seed(0, 1);
        let err =
            NamespaceBuilder::new(&mut id_gen, &Zeros).build(&licence()).expect_err("should fail");
        assert!(matches!(err, Error::Encoding(_)));
    }
}
