//! Path queries, construction and serialization for JML, a JSON encoding of XML element
//! trees.
//!
//! ```
//! use jml::{EvaluateOptions, Tree, evaluate};
//!
//! let tree = Tree::from_json_str(r#"{"elements": [{
//!     "type": "element", "name": "persons", "elements": [
//!         {"type": "element", "name": "person", "attributes": {"birth": "1946-09-05"},
//!          "elements": [{"type": "text", "text": "Freddie Mercury"}]}
//!     ]}]}"#)?;
//! let names = evaluate("/person/text()", &tree, &EvaluateOptions::default())?;
//! assert_eq!(names[0].as_value(), Some("Freddie Mercury"));
//! # Ok::<(), jml::JmlError>(())
//! ```
pub mod create;
pub mod error;
pub mod evaluator;
pub mod model;
pub mod namespace;
pub mod parser;
pub mod predicate;
pub mod result;
pub mod serialize;
pub mod walk;

pub use create::{Content, CreateData, create};
pub use error::{JmlError, Result};
pub use evaluator::{CompiledPath, EvaluateOptions, compile_path, evaluate};
pub use model::{Element, Fragment, NamespaceDecl, Text, Tree};
pub use result::QueryResult;
pub use serialize::{Mapping, MappingEntry, MappingTable, Payload, SerializeOptions, serialize};
pub use walk::{child_trees, namespaces_of, walk_tree};
