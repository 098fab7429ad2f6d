//! Domain models and types for deid.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Annotations** ([`Annotation`]) - immutable, category-tagged spans with char offsets
//! - **Categories** ([`Category`]) - the closed set of sensitive-information kinds
//! - **Documents** ([`Document`], [`Metadata`], [`Person`]) - text plus annotator inputs
//! - **Error types** ([`DeidError`]) and the [`Result`] alias
//!
//! # Example
//!
//! ```rust
//! use deid::domain::{Category, Document, Metadata};
//!
//! # fn example() -> deid::domain::Result<()> {
//! let doc = Document::new("Hello John", Metadata::default());
//! let annotation = doc.annotation(6, 10, Category::Name)?;
//! assert_eq!(annotation.text(), "John");
//! # Ok(())
//! # }
//! ```

pub mod annotation;
pub mod category;
pub mod document;
pub mod errors;
pub mod ids;
pub mod offset;
pub mod result;

// Re-export commonly used types for convenience
pub use annotation::Annotation;
pub use category::Category;
pub use document::{Document, Metadata, Person};
pub use errors::DeidError;
pub use ids::DocumentId;
pub use result::Result;
