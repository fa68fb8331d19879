use std::num::ParseFloatError;

use thiserror::Error;

/// Internal error taxonomy for the parsing layer.
///
/// The public entry points never surface these: unreadable input and
/// malformed XML degrade to an empty (or partially filled) [`crate::GpxFile`]
/// per the error-handling contract. The enum exists so the recursive-descent
/// helpers can propagate reader failures with `?` up to the boundary where
/// the degrade happens.
#[derive(Debug, Error)]
pub enum GpxError {
    #[error("XML parse error: {0}")]
    XmlParse(#[from] quick_xml::Error),
    #[error("float parse error: {0}")]
    FloatParse(#[from] ParseFloatError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, GpxError>;
