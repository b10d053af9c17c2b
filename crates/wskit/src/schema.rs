//! Schema - attribute definitions for declared resource types
//!
//! A [`ResourceSchema`] lists attributes in declaration order together with
//! their validation rule, default and documentation. Schemas are registered
//! explicitly into a [`SchemaRegistry`] by the caller.

use crate::error::ValidationError;
use crate::validate;
use std::collections::BTreeMap;
use std::fmt;

/// Validation rule applied to an attribute value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    /// `[-0-9A-Za-z._]+`
    Identifier,
    /// Absolute filesystem path
    AbsolutePath,
    /// One of a fixed set of values
    Enum(&'static [&'static str]),
    /// Accepted unchanged
    PassThrough,
}

impl Rule {
    /// Check a value against this rule
    pub fn check(&self, field: &str, value: &str) -> Result<String, ValidationError> {
        match self {
            Rule::Identifier => validate::identifier(field, value),
            Rule::AbsolutePath => validate::absolute_path(field, value),
            Rule::Enum(allowed) => validate::one_of(field, value, allowed),
            Rule::PassThrough => Ok(value.to_string()),
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Identifier => f.write_str("identifier"),
            Rule::AbsolutePath => f.write_str("absolute path"),
            Rule::Enum(values) => write!(f, "{}", values.join(" | ")),
            Rule::PassThrough => f.write_str("string"),
        }
    }
}

/// Attribute schema
#[derive(Debug, Clone)]
pub struct AttributeSchema {
    pub name: String,
    pub rule: Rule,
    pub required: bool,
    pub default: Option<String>,
    pub description: Option<String>,
    /// Never shown in logs or reports
    pub sensitive: bool,
    /// Takes the declaration title when not given
    pub namevar: bool,
}

impl AttributeSchema {
    pub fn new(name: impl Into<String>, rule: Rule) -> Self {
        Self {
            name: name.into(),
            rule,
            required: false,
            default: None,
            description: None,
            sensitive: false,
            namevar: false,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_default(mut self, value: impl Into<String>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    pub fn namevar(mut self) -> Self {
        self.namevar = true;
        self.required = true;
        self
    }
}

/// Resource schema
#[derive(Debug, Clone)]
pub struct ResourceSchema {
    pub resource_type: String,
    /// Attributes in declaration order
    pub attributes: Vec<AttributeSchema>,
    pub description: Option<String>,
}

impl ResourceSchema {
    pub fn new(resource_type: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            attributes: Vec::new(),
            description: None,
        }
    }

    pub fn attribute(mut self, schema: AttributeSchema) -> Self {
        self.attributes.push(schema);
        self
    }

    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    /// Look up an attribute by name
    pub fn get(&self, name: &str) -> Option<&AttributeSchema> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Validate a single attribute value
    pub fn validate(&self, field: &str, value: &str) -> Result<String, ValidationError> {
        let attr = self
            .get(field)
            .ok_or_else(|| ValidationError::UnknownAttribute {
                field: field.to_string(),
            })?;
        attr.rule.check(field, value)
    }

    /// Resolve and validate a full set of declared attributes
    ///
    /// Unknown attributes are reported first. Then every schema attribute
    /// is resolved in declaration order (declared value, title for the
    /// namevar, default) and checked; the first failure is returned.
    pub fn resolve(
        &self,
        title: &str,
        declared: &BTreeMap<String, String>,
    ) -> Result<BTreeMap<String, String>, ValidationError> {
        if let Some(unknown) = declared.keys().find(|k| self.get(k).is_none()) {
            return Err(ValidationError::UnknownAttribute {
                field: unknown.clone(),
            });
        }

        let mut resolved = BTreeMap::new();
        for attr in &self.attributes {
            let value = declared
                .get(&attr.name)
                .cloned()
                .filter(|v| !(attr.namevar && v.is_empty()))
                .or_else(|| (attr.namevar && !title.is_empty()).then(|| title.to_string()))
                .or_else(|| attr.default.clone());

            match value {
                Some(v) => {
                    let checked = attr.rule.check(&attr.name, &v)?;
                    resolved.insert(attr.name.clone(), checked);
                }
                None if attr.required => {
                    return Err(ValidationError::MissingRequiredField {
                        field: attr.name.clone(),
                    });
                }
                None => {}
            }
        }

        log::debug!(
            "Resolved {} '{}' with {} attribute(s)",
            self.resource_type,
            title,
            resolved.len()
        );
        Ok(resolved)
    }
}

/// Schemas known to a run, keyed by resource type
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    schemas: BTreeMap<String, ResourceSchema>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a schema, replacing any previous one for the same type
    pub fn register(&mut self, schema: ResourceSchema) {
        self.schemas.insert(schema.resource_type.clone(), schema);
    }

    pub fn with(mut self, schema: ResourceSchema) -> Self {
        self.register(schema);
        self
    }

    pub fn get(&self, resource_type: &str) -> Option<&ResourceSchema> {
        self.schemas.get(resource_type)
    }

    /// Registered resource types in sorted order
    pub fn resource_types(&self) -> impl Iterator<Item = &str> {
        self.schemas.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResourceSchema> {
        self.schemas.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> ResourceSchema {
        ResourceSchema::new("widget")
            .attribute(AttributeSchema::new("name", Rule::PassThrough).namevar())
            .attribute(
                AttributeSchema::new("ensure", Rule::Enum(&["present", "absent"]))
                    .with_default("present"),
            )
            .attribute(AttributeSchema::new("home", Rule::AbsolutePath).required())
            .attribute(AttributeSchema::new("owner", Rule::Identifier).with_default("root"))
            .attribute(AttributeSchema::new("secret", Rule::PassThrough).sensitive())
    }

    fn attrs(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_resolve_applies_defaults_and_title() {
        let resolved = schema()
            .resolve("w1", &attrs(&[("home", "/srv/w1")]))
            .unwrap();

        assert_eq!(resolved["name"], "w1");
        assert_eq!(resolved["ensure"], "present");
        assert_eq!(resolved["owner"], "root");
        assert!(!resolved.contains_key("secret"));
    }

    #[test]
    fn test_explicit_name_wins_over_title() {
        let resolved = schema()
            .resolve("w1", &attrs(&[("name", "other"), ("home", "/srv")]))
            .unwrap();
        assert_eq!(resolved["name"], "other");
    }

    #[test]
    fn test_missing_required() {
        let err = schema().resolve("w1", &attrs(&[])).unwrap_err();
        assert_eq!(
            err,
            ValidationError::MissingRequiredField {
                field: "home".to_string()
            }
        );
    }

    #[test]
    fn test_empty_title_without_name() {
        let err = schema()
            .resolve("", &attrs(&[("home", "/srv")]))
            .unwrap_err();
        assert_eq!(err.field(), "name");
    }

    #[test]
    fn test_unknown_attribute() {
        let err = schema()
            .resolve("w1", &attrs(&[("home", "/srv"), ("hmoe", "/srv")]))
            .unwrap_err();
        assert_eq!(
            err,
            ValidationError::UnknownAttribute {
                field: "hmoe".to_string()
            }
        );
    }

    #[test]
    fn test_first_failure_in_declaration_order() {
        let err = schema()
            .resolve(
                "w1",
                &attrs(&[("ensure", "gone"), ("home", "relative"), ("owner", "a b")]),
            )
            .unwrap_err();
        assert_eq!(err.field(), "ensure");
    }

    #[test]
    fn test_validate_single_field() {
        let schema = schema();
        assert_eq!(schema.validate("owner", "wasadmin").unwrap(), "wasadmin");
        assert!(schema.validate("owner", "was admin").is_err());
        assert!(matches!(
            schema.validate("nope", "x"),
            Err(ValidationError::UnknownAttribute { .. })
        ));
    }

    #[test]
    fn test_registry() {
        let registry = SchemaRegistry::new().with(schema());
        assert!(registry.get("widget").is_some());
        assert!(registry.get("gadget").is_none());
        assert_eq!(registry.resource_types().collect::<Vec<_>>(), vec!["widget"]);
    }
}
