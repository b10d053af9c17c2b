//! JDBC provider declarations

use crate::error::ValidationError;
use crate::schema::{AttributeSchema, ResourceSchema, Rule};
use declarative::{Ensure, Resource};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// Resource type name used in declarations and plan targets
pub const RESOURCE_TYPE: &str = "jdbc_provider";

/// Default account wsadmin runs as
pub const DEFAULT_USER: &str = "root";

/// Placeholder shown instead of sensitive values
pub const REDACTED: &str = "****";

/// Declared attributes, keyed by attribute name
pub type Attributes = BTreeMap<String, String>;

/// A value that must never be printed
///
/// `Debug`, `Display` and `Serialize` all render [`REDACTED`]; use
/// [`Sensitive::expose`] where the real value is needed.
#[derive(Clone, PartialEq, Eq)]
pub struct Sensitive(String);

impl Sensitive {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Sensitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

impl fmt::Display for Sensitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

impl Serialize for Sensitive {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(REDACTED)
    }
}

/// A validated JDBC provider declaration
///
/// Built once per declaration with [`JdbcProvider::build`] and immutable
/// afterwards. The server is the source of truth for whether it exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JdbcProvider {
    pub name: String,
    pub ensure: Ensure,
    pub dmgr_profile: String,
    pub profile_base: PathBuf,
    pub user: String,
    pub node: Option<String>,
    pub server: Option<String>,
    pub cluster: Option<String>,
    pub cell: String,
    pub scope: Option<String>,
    pub dbtype: Option<String>,
    pub providertype: Option<String>,
    pub implementation: Option<String>,
    pub description: Option<String>,
    pub classpath: Option<String>,
    pub nativepath: Option<String>,
    pub wsadmin_user: Option<String>,
    pub wsadmin_pass: Option<Sensitive>,
}

impl JdbcProvider {
    /// Attribute schema for `jdbc_provider` declarations
    pub fn schema() -> ResourceSchema {
        ResourceSchema::new(RESOURCE_TYPE)
            .with_description(
                "Manages the existence of a WebSphere JDBC provider. \
                 Attributes are not managed after creation.",
            )
            .attribute(
                AttributeSchema::new("ensure", Rule::Enum(Ensure::VALUES))
                    .with_default(Ensure::Present.as_str())
                    .with_description("Whether the provider should exist"),
            )
            .attribute(
                AttributeSchema::new("dmgr_profile", Rule::Identifier)
                    .required()
                    .with_description("DMGR profile the provider is managed under"),
            )
            .attribute(
                AttributeSchema::new("name", Rule::PassThrough)
                    .namevar()
                    .with_description("Provider name. Defaults to the declaration title"),
            )
            .attribute(
                AttributeSchema::new("profile_base", Rule::AbsolutePath)
                    .required()
                    .with_description(
                        "Profiles directory containing dmgr_profile, \
                         e.g. /opt/IBM/WebSphere/AppServer/profiles",
                    ),
            )
            .attribute(
                AttributeSchema::new("user", Rule::Identifier)
                    .with_default(DEFAULT_USER)
                    .with_description("Account to run wsadmin as"),
            )
            .attribute(
                AttributeSchema::new("node", Rule::PassThrough)
                    .with_description("Required if scope is server or node"),
            )
            .attribute(
                AttributeSchema::new("server", Rule::PassThrough)
                    .with_description("Required if scope is server"),
            )
            .attribute(
                AttributeSchema::new("cluster", Rule::PassThrough)
                    .with_description("Required if scope is cluster"),
            )
            .attribute(
                AttributeSchema::new("cell", Rule::PassThrough)
                    .required()
                    .with_description("Cell the provider is managed under"),
            )
            .attribute(
                AttributeSchema::new("scope", Rule::PassThrough)
                    .with_description("One of node, server, cell or cluster"),
            )
            .attribute(
                AttributeSchema::new("dbtype", Rule::PassThrough)
                    .with_description("wsadmin -databaseType, e.g. DB2, Oracle"),
            )
            .attribute(
                AttributeSchema::new("providertype", Rule::PassThrough)
                    .with_description("wsadmin -providerType, e.g. \"Oracle JDBC Driver\""),
            )
            .attribute(
                AttributeSchema::new("implementation", Rule::PassThrough).with_description(
                    "wsadmin -implementationType, e.g. \"Connection pool data source\"",
                ),
            )
            .attribute(
                AttributeSchema::new("description", Rule::PassThrough)
                    .with_description("Free-form description"),
            )
            .attribute(
                AttributeSchema::new("classpath", Rule::PassThrough).with_description(
                    "wsadmin -classpath, e.g. ${ORACLE_JDBC_DRIVER_PATH}/ojdbc6.jar",
                ),
            )
            .attribute(
                AttributeSchema::new("nativepath", Rule::PassThrough)
                    .with_description("wsadmin -nativePath. May be blank"),
            )
            .attribute(
                AttributeSchema::new("wsadmin_user", Rule::PassThrough)
                    .with_description("Username for wsadmin authentication"),
            )
            .attribute(
                AttributeSchema::new("wsadmin_pass", Rule::PassThrough)
                    .sensitive()
                    .with_description("Password for wsadmin authentication"),
            )
    }

    /// Build and validate a declaration
    ///
    /// Fails fast on the first invalid attribute. Cross-field requirements
    /// (node/server/cluster for a given scope) are not checked here.
    pub fn build(title: &str, attributes: &Attributes) -> Result<Self, ValidationError> {
        Self::build_with(&Self::schema(), title, attributes)
    }

    /// Build against an explicit schema
    pub fn build_with(
        schema: &ResourceSchema,
        title: &str,
        attributes: &Attributes,
    ) -> Result<Self, ValidationError> {
        let mut resolved = schema.resolve(title, attributes)?;
        let mut take = |field: &str| resolved.remove(field);
        let require = |field: &str, value: Option<String>| {
            value.ok_or_else(|| ValidationError::MissingRequiredField {
                field: field.to_string(),
            })
        };

        let ensure = match take("ensure") {
            Some(v) => v.parse::<Ensure>().map_err(|_| ValidationError::InvalidEnum {
                field: "ensure".to_string(),
                value: v.clone(),
                expected: Ensure::VALUES.iter().map(|s| (*s).to_string()).collect(),
            })?,
            None => Ensure::default(),
        };

        Ok(Self {
            name: require("name", take("name"))?,
            ensure,
            dmgr_profile: require("dmgr_profile", take("dmgr_profile"))?,
            profile_base: PathBuf::from(require("profile_base", take("profile_base"))?),
            user: take("user").unwrap_or_else(|| DEFAULT_USER.to_string()),
            node: take("node"),
            server: take("server"),
            cluster: take("cluster"),
            cell: require("cell", take("cell"))?,
            scope: take("scope"),
            dbtype: take("dbtype"),
            providertype: take("providertype"),
            implementation: take("implementation"),
            description: take("description"),
            classpath: take("classpath"),
            nativepath: take("nativepath"),
            wsadmin_user: take("wsadmin_user"),
            wsadmin_pass: take("wsadmin_pass").map(Sensitive::new),
        })
    }

    /// Path to the wsadmin tool of the declared DMGR profile
    pub fn wsadmin_path(&self) -> PathBuf {
        self.profile_base
            .join(&self.dmgr_profile)
            .join("bin")
            .join("wsadmin.sh")
    }

    /// Attribute values for display, sensitive ones redacted
    pub fn display_attributes(&self) -> Vec<(&'static str, String)> {
        let mut attrs = vec![
            ("name", self.name.clone()),
            ("ensure", self.ensure.to_string()),
            ("dmgr_profile", self.dmgr_profile.clone()),
            ("profile_base", self.profile_base.display().to_string()),
            ("user", self.user.clone()),
            ("cell", self.cell.clone()),
        ];
        let optional = [
            ("node", &self.node),
            ("server", &self.server),
            ("cluster", &self.cluster),
            ("scope", &self.scope),
            ("dbtype", &self.dbtype),
            ("providertype", &self.providertype),
            ("implementation", &self.implementation),
            ("description", &self.description),
            ("classpath", &self.classpath),
            ("nativepath", &self.nativepath),
            ("wsadmin_user", &self.wsadmin_user),
        ];
        for (key, value) in optional {
            if let Some(v) = value {
                attrs.push((key, v.clone()));
            }
        }
        if self.wsadmin_pass.is_some() {
            attrs.push(("wsadmin_pass", REDACTED.to_string()));
        }
        attrs
    }
}

impl Resource for JdbcProvider {
    fn id(&self) -> String {
        self.name.clone()
    }

    fn description(&self) -> String {
        match &self.scope {
            Some(scope) => format!(
                "JDBC provider {} ({} scope, cell {})",
                self.name, scope, self.cell
            ),
            None => format!("JDBC provider {} (cell {})", self.name, self.cell),
        }
    }

    fn resource_type(&self) -> &'static str {
        RESOURCE_TYPE
    }

    fn ensure(&self) -> Ensure {
        self.ensure
    }
}
