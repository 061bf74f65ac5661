//! # flowmap - Expression Language and Structural Data Mapper
//!
//! **flowmap** moves values between the scopes of a flow: trigger output into
//! flow input, flow attributes into activity input, and so on. Each move is a
//! *mapping* from a source (a literal, a reference such as `$flow.customer.name`,
//! or an expression such as `string.concat("Hello ", $flow.name)`) to a target
//! path inside an attribute of the output scope. Array mappings project every
//! element of a source array into a correspondingly shaped element of a target
//! array.
//!
//! ## Core Workflow
//!
//! 1.  **Declare Scopes**: Build an input scope holding the source values and an output
//!     scope declaring the attributes that may be written, e.g. with [`scope::SimpleScope`].
//! 2.  **Choose a Resolver**: [`scope::BasicResolver`] reads `$attr.path` from the input scope;
//!     [`scope::ScopeResolver`] understands qualifiers such as `$flow`, named scopes,
//!     and `$property[...]`.
//! 3.  **Build an Engine**: [`mapping::MappingEngine::builder`] creates an engine with the
//!     built-in functions plus any you register.
//! 4.  **Apply Mappings**: Pass mapping documents to the engine. Documents can be compiled once
//!     and run many times.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use flowmap::prelude::*;
//! use serde_json::json;
//!
//! fn main() -> Result<()> {
//!     let input = SimpleScope::from_json(json!({ "name": "World" }))?;
//!     let mut output = SimpleScope::with_attrs([Attribute::new("greeting", DataType::String, Value::Null)]);
//!
//!     let engine = MappingEngine::builder().build()?;
//!     let mapping = MappingDocument::new(
//!         "greeting",
//!         MappingType::Expression,
//!         json!("string.concat(\"Hello \", $flow.name)"),
//!     );
//!     engine.apply_assignment(&mapping, &input, &mut output, &ScopeResolver::new())?;
//!
//!     println!("{}", output.to_json());
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod expr;
pub mod function;
pub mod mapping;
pub mod path;
pub mod prelude;
pub mod scope;
pub mod tree;
pub mod value;
