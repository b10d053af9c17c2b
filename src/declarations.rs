//! Declaration files
//!
//! One table per resource type, one sub-table per declaration keyed by its
//! title. Every attribute value is a string:
//!
//! ```toml
//! [jdbc_provider.oracleJDBC]
//! dmgr_profile = "Dmgr01"
//! profile_base = "/opt/IBM/WebSphere/AppServer/profiles"
//! cell = "CELL01"
//! scope = "cell"
//! ```
//!
//! Declarations keep the order they are written in.

use anyhow::{Context, Result, bail};
use std::fs;
use std::path::Path;
use toml::{Table, Value};
use wskit::{Attributes, Declaration, SchemaRegistry};

/// Read and parse a declarations file
pub fn load(path: &Path, registry: &SchemaRegistry) -> Result<Vec<Declaration>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read declarations: {}", path.display()))?;
    let declarations = parse(&content, registry)
        .with_context(|| format!("Invalid declarations file: {}", path.display()))?;

    log::debug!(
        "Loaded {} declaration(s) from {}",
        declarations.len(),
        path.display()
    );
    Ok(declarations)
}

/// Parse declarations from TOML text
///
/// Resource types must be known to `registry`. Attribute names and values
/// are checked later, when the declarations are built.
pub fn parse(content: &str, registry: &SchemaRegistry) -> Result<Vec<Declaration>> {
    let document: Table = toml::from_str(content).context("Failed to parse TOML")?;
    let mut declarations = Vec::new();

    for (resource_type, entries) in document {
        if registry.get(&resource_type).is_none() {
            let known: Vec<&str> = registry.resource_types().collect();
            bail!(
                "unknown resource type '{resource_type}' (known: {})",
                known.join(", ")
            );
        }

        let Value::Table(entries) = entries else {
            bail!("'{resource_type}' must be a table of declarations");
        };

        for (title, body) in entries {
            let Value::Table(body) = body else {
                bail!("'{resource_type}.{title}' must be a table");
            };
            declarations.push(Declaration::new(title.clone(), attributes(&title, body)?));
        }
    }

    Ok(declarations)
}

fn attributes(title: &str, body: Table) -> Result<Attributes> {
    let mut attrs = Attributes::new();
    for (key, value) in body {
        match value {
            Value::String(s) => {
                attrs.insert(key, s);
            }
            other => bail!(
                "'{title}.{key}' must be a string, found {}",
                other.type_str()
            ),
        }
    }
    Ok(attrs)
}
