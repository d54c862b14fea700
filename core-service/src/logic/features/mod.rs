//! Features Module - Application Encoding
//!
//! Maps a loan application onto the fixed-order numeric vector the
//! classifier was trained on.
//!
//! ## Structure
//! - `layout`: authoritative feature order + layout hash
//! - `application`: `ApplicationInput`
//! - `encoder`: categorical encoding tables, `FeatureEncoder`
//! - `vector`: `FeatureVector`

pub mod application;
pub mod encoder;
pub mod layout;
pub mod vector;


pub use application::{ApplicationInput, FieldValue};
pub use encoder::{CategoryEncodings, CategoryMap, FeatureEncoder};
pub use layout::{layout_hash, LayoutInfo, LayoutMismatchError, CATEGORICAL_FEATURES, FEATURE_COUNT, FEATURE_LAYOUT};
pub use vector::FeatureVector;
