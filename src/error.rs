use std::error;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

type BoxedCause = Box<dyn error::Error + Send + Sync + 'static>;

/// Error type for loading and querying a tile map
#[derive(Debug)]
pub enum MapError {
    /// The document is structurally invalid, could not be read, or is missing
    /// a required attribute
    MalformedDocument {
        /// File being loaded
        path: PathBuf,
        /// The violated expectation
        reason: String,
        /// Underlying I/O, XML or decoding failure, if any
        source: Option<BoxedCause>,
    },
    /// An attribute expected to hold a number failed the lexical check
    InvalidNumericLiteral {
        /// File being loaded
        path: PathBuf,
        /// Owning element and attribute, e.g. `layer 0 width`
        attribute: String,
        /// Offending text
        value: String,
    },
    /// A layer declares an `encoding` or `compression` this loader does not know
    UnsupportedEncoding {
        /// File being loaded
        path: PathBuf,
        /// Index of the layer in document order
        layer: usize,
        /// The unrecognised name
        name: String,
    },
    /// An element that must appear a fixed number of times does not
    MultipleOrMissingRequiredElement {
        /// File being loaded
        path: PathBuf,
        /// Element name
        element: &'static str,
        /// How many were present
        found: usize,
    },
    /// A property query addressed a pixel outside every layer
    PositionOutOfBounds {
        /// Pixel x coordinate
        x: i32,
        /// Pixel y coordinate
        y: i32,
    },
    /// A property value does not parse as the requested type
    InvalidPropertyType {
        /// Property name
        name: String,
        /// Raw string value
        value: String,
        /// Expected type, e.g. `integer`
        expected: &'static str,
    },
}

impl MapError {
    pub(crate) fn malformed(path: &Path, reason: impl Into<String>) -> Self {
        MapError::MalformedDocument {
            path: path.to_path_buf(),
            reason: reason.into(),
            source: None,
        }
    }

    pub(crate) fn malformed_with<E>(path: &Path, reason: impl Into<String>, source: E) -> Self
    where
        E: error::Error + Send + Sync + 'static,
    {
        MapError::MalformedDocument {
            path: path.to_path_buf(),
            reason: reason.into(),
            source: Some(Box::new(source)),
        }
    }

    pub(crate) fn io(path: &Path, source: io::Error) -> Self {
        MapError::malformed_with(path, "could not read file", source)
    }

    pub(crate) fn invalid_number(
        path: &Path,
        attribute: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        MapError::InvalidNumericLiteral {
            path: path.to_path_buf(),
            attribute: attribute.into(),
            value: value.into(),
        }
    }

    pub(crate) fn element_count(path: &Path, element: &'static str, found: usize) -> Self {
        MapError::MultipleOrMissingRequiredElement {
            path: path.to_path_buf(),
            element,
            found,
        }
    }
}

impl fmt::Display for MapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapError::MalformedDocument { path, reason, source } => {
                write!(f, "Malformed file `{}`: {}", path.display(), reason)?;
                if let Some(cause) = source {
                    write!(f, " ({})", cause)?;
                }
                Ok(())
            }
            MapError::InvalidNumericLiteral { path, attribute, value } => write!(
                f,
                "Malformed file `{}`: {} `{}` is not a valid number",
                path.display(),
                attribute,
                value
            ),
            MapError::UnsupportedEncoding { path, layer, name } => write!(
                f,
                "Malformed file `{}`: layer {} uses unsupported encoding `{}`",
                path.display(),
                layer,
                name
            ),
            MapError::MultipleOrMissingRequiredElement { path, element, found } => write!(
                f,
                "Malformed file `{}`: found {} `{}` elements",
                path.display(),
                found,
                element
            ),
            MapError::PositionOutOfBounds { x, y } => {
                write!(f, "Position ({}, {}) not on map", x, y)
            }
            MapError::InvalidPropertyType { name, value, expected } => write!(
                f,
                "Property `{}` had non-{} value `{}`",
                name, expected, value
            ),
        }
    }
}

impl error::Error for MapError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            MapError::MalformedDocument {
                source: Some(cause),
                ..
            } => Some(cause.as_ref() as &(dyn error::Error + 'static)),
            _ => None,
        }
    }
}
