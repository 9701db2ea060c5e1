//! Core types for wikilens: annotations, dictionaries, the keyword scanner,
//! understanding-level transitions, and shared configuration.

pub mod annotation;
pub mod config;
pub mod detected;
pub mod dictionary;
mod error;
mod fold;
pub mod level;
pub mod scanner;
pub mod session;

pub use annotation::{Annotation, Reference};
pub use config::{ApiConfig, LensConfig};
pub use detected::{DetectedKeyword, RelatedDocument, parse_records, validate_records};
pub use dictionary::Dictionary;
pub use error::CoreError;
pub use fold::fold_keyword;
pub use level::{Color, LevelThresholds, UnderstandingLevel};
pub use scanner::{Scanner, Segment, annotate};
pub use session::LensSession;
