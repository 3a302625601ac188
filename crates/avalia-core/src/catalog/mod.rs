//! Criteria catalog parsing and validation.
//!
//! A catalog lists the criteria users can select. It is structured data
//! validated against schema/catalog.schema.json, and it turns a user's
//! selection into the ordered request list the parser consumes.

mod parser;
mod schema;

pub use parser::{CatalogError, CriteriaCatalog, CriterionDefinition};
pub use schema::validate_catalog_schema;
