//! Declaration batches
//!
//! A batch is every declaration of one run. Each declaration is built on its
//! own so one bad declaration does not hide problems in the others, but the
//! batch as a whole is rejected when two providers share a name.

use crate::error::{DeclarationError, ValidationError};
use crate::record::{Attributes, JdbcProvider, RESOURCE_TYPE};
use std::collections::HashMap;

/// A declaration as written: its title and raw attributes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub title: String,
    pub attributes: Attributes,
}

impl Declaration {
    pub fn new(title: impl Into<String>, attributes: Attributes) -> Self {
        Self {
            title: title.into(),
            attributes,
        }
    }
}

/// A declaration that failed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejected {
    pub title: String,
    pub error: ValidationError,
}

/// Built providers in declaration order, plus the declarations that failed
#[derive(Debug, Clone, Default)]
pub struct Batch {
    pub providers: Vec<JdbcProvider>,
    pub rejected: Vec<Rejected>,
}

impl Batch {
    /// Build every declaration, then check names are unique
    pub fn build<I>(declarations: I) -> Result<Self, DeclarationError>
    where
        I: IntoIterator<Item = Declaration>,
    {
        let mut batch = Self::default();
        let mut titles: Vec<String> = Vec::new();

        for declaration in declarations {
            match JdbcProvider::build(&declaration.title, &declaration.attributes) {
                Ok(provider) => {
                    titles.push(declaration.title);
                    batch.providers.push(provider);
                }
                Err(error) => {
                    log::debug!("Rejected '{}': {}", declaration.title, error);
                    batch.rejected.push(Rejected {
                        title: declaration.title,
                        error,
                    });
                }
            }
        }

        let mut seen: HashMap<&str, &str> = HashMap::new();
        for (provider, title) in batch.providers.iter().zip(&titles) {
            if let Some(first) = seen.insert(provider.name.as_str(), title.as_str()) {
                return Err(DeclarationError::DuplicateName {
                    resource_type: RESOURCE_TYPE.to_string(),
                    name: provider.name.clone(),
                    first: first.to_string(),
                    second: title.clone(),
                });
            }
        }

        Ok(batch)
    }

    /// Check if every declaration was valid
    pub fn is_valid(&self) -> bool {
        self.rejected.is_empty()
    }

    pub fn len(&self) -> usize {
        self.providers.len() + self.rejected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty() && self.rejected.is_empty()
    }
}
