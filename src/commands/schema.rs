//! `wasctl schema` - describe declarable attributes

use anyhow::{Result, bail};
use colored::Colorize;
use serde::Serialize;
use wskit::{AttributeSchema, ResourceSchema};

use super::print_json;
use crate::cli::SchemaArgs;
use crate::ui;

#[derive(Serialize)]
struct AttributeJson<'a> {
    name: &'a str,
    rule: String,
    required: bool,
    default: Option<&'a str>,
    namevar: bool,
    sensitive: bool,
    description: Option<&'a str>,
}

#[derive(Serialize)]
struct SchemaJson<'a> {
    resource_type: &'a str,
    description: Option<&'a str>,
    attributes: Vec<AttributeJson<'a>>,
}

impl<'a> From<&'a ResourceSchema> for SchemaJson<'a> {
    fn from(schema: &'a ResourceSchema) -> Self {
        Self {
            resource_type: &schema.resource_type,
            description: schema.description.as_deref(),
            attributes: schema
                .attributes
                .iter()
                .map(|attr| AttributeJson {
                    name: &attr.name,
                    rule: attr.rule.to_string(),
                    required: attr.required,
                    default: attr.default.as_deref(),
                    namevar: attr.namevar,
                    sensitive: attr.sensitive,
                    description: attr.description.as_deref(),
                })
                .collect(),
        }
    }
}

pub fn run(args: &SchemaArgs) -> Result<()> {
    let registry = wskit::registry();
    let schemas: Vec<&ResourceSchema> = match args.resource_type.as_deref() {
        Some(resource_type) => match registry.get(resource_type) {
            Some(schema) => vec![schema],
            None => {
                let known: Vec<&str> = registry.resource_types().collect();
                bail!(
                    "Unknown resource type '{resource_type}' (known: {})",
                    known.join(", ")
                );
            }
        },
        None => registry.iter().collect(),
    };

    if args.json {
        let out: Vec<SchemaJson<'_>> = schemas.into_iter().map(SchemaJson::from).collect();
        return print_json(&out);
    }

    for schema in schemas {
        ui::header(&schema.resource_type);
        if let Some(description) = &schema.description {
            println!("{description}");
        }
        println!();
        for attr in &schema.attributes {
            println!("  {:<16} {}", attr.name.bold(), flags(attr).dimmed());
            if let Some(description) = &attr.description {
                for line in description.lines() {
                    ui::dim(&format!("  {line}"));
                }
            }
        }
    }
    Ok(())
}

/// `identifier, required`, `string, default "root"`
fn flags(attr: &AttributeSchema) -> String {
    let mut parts = vec![attr.rule.to_string()];
    if attr.namevar {
        parts.push("defaults to the title".to_string());
    } else if attr.required {
        parts.push("required".to_string());
    }
    if let Some(default) = &attr.default {
        parts.push(format!("default \"{default}\""));
    }
    if attr.sensitive {
        parts.push("sensitive".to_string());
    }
    parts.join(", ")
}
