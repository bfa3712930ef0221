//! Standard datatype namespaces.
//!
//! # Example use
//! ```
//! use chaser_api::{ns::xsd, term::Term};
//!
//! let answer = Term::typed("42", xsd::INTEGER).unwrap();
//! assert!(answer.is_constant());
//! ```

/// The standard `xsd:` namespace (the datatypes commonly used in typed constants).
pub mod xsd {
    /// The namespace IRI
    pub const NS: &str = "http://www.w3.org/2001/XMLSchema#";
    /// `xsd:string`
    pub const STRING: &str = "http://www.w3.org/2001/XMLSchema#string";
    /// `xsd:integer`
    pub const INTEGER: &str = "http://www.w3.org/2001/XMLSchema#integer";
    /// `xsd:decimal`
    pub const DECIMAL: &str = "http://www.w3.org/2001/XMLSchema#decimal";
    /// `xsd:double`
    pub const DOUBLE: &str = "http://www.w3.org/2001/XMLSchema#double";
    /// `xsd:boolean`
    pub const BOOLEAN: &str = "http://www.w3.org/2001/XMLSchema#boolean";
}
