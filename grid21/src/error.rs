//!
//! # Grid Result and Error Types
//!

// Local Imports
use crate::utils::{self, ErrorContext};
use crate::Int;

/// # [GridError] Result Type
pub type GridResult<T> = Result<T, GridError>;

///
/// # Grid Error Enumeration
///
pub enum GridError {
    /// Invalid table geometry or placement configuration
    Config {
        message: String,
        stack: Vec<ErrorContext>,
    },
    /// Coordinate outside the tiled extent
    OutOfExtent {
        x: Int,
        y: Int,
        rows: usize,
        cols: usize,
    },
    /// Request for a level other than the table's
    LevelMismatch { expected: u32, found: u32 },
    /// Wire id that does not refer to a live wire
    StaleWire(u32),
    /// Track-level placement failure
    Place {
        err: PlaceError,
        stack: Vec<ErrorContext>,
    },
    /// Boxed External Errors
    Boxed(Box<dyn std::error::Error + Send + Sync>),
    /// Uncategorized Error, with String Message
    Str(String),
}
impl GridError {
    /// Create a [GridError::Str] from anything String-convertible
    pub fn msg(s: impl Into<String>) -> Self {
        Self::Str(s.into())
    }
    /// Create an error-variant [Result] of our [GridError::Str] variant
    pub fn fail<T>(s: impl Into<String>) -> Result<T, Self> {
        Err(Self::msg(s))
    }
    /// Create a [GridError::Config] without context
    pub fn config(s: impl Into<String>) -> Self {
        Self::Config {
            message: s.into(),
            stack: Vec::new(),
        }
    }
    /// Push `ctx` onto our context stack, for variants which carry one
    pub fn context(mut self, ctx: ErrorContext) -> Self {
        match self {
            Self::Config { ref mut stack, .. } | Self::Place { ref mut stack, .. } => {
                stack.push(ctx)
            }
            _ => (),
        }
        self
    }
    /// Get the underlying [PlaceError], if any
    pub fn place_error(&self) -> Option<&PlaceError> {
        match self {
            Self::Place { err, .. } => Some(err),
            _ => None,
        }
    }
}
impl std::fmt::Debug for GridError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            GridError::Config { message, stack } => {
                write!(f, "Config Error: \n - {} \n - {:?}", message, stack)
            }
            GridError::OutOfExtent { x, y, rows, cols } => write!(
                f,
                "Out of Extent: ({}, {}) lands outside the {}x{} tile array",
                x, y, rows, cols
            ),
            GridError::LevelMismatch { expected, found } => {
                write!(f, "Level Mismatch: expected {}, found {}", expected, found)
            }
            GridError::StaleWire(id) => write!(f, "Stale Wire: #{}", id),
            GridError::Place { err, stack } => {
                write!(f, "Placement Error: \n - {:?} \n - {:?}", err, stack)
            }
            GridError::Boxed(err) => err.fmt(f),
            GridError::Str(err) => err.fmt(f),
        }
    }
}
impl std::fmt::Display for GridError {
    /// Delegates to the [Debug] implementation
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        std::fmt::Debug::fmt(self, f)
    }
}
impl std::error::Error for GridError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Boxed(e) => Some(&**e),
            Self::Place { err, .. } => Some(err),
            _ => None,
        }
    }
}
impl From<String> for GridError {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}
impl From<&str> for GridError {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}
impl From<utils::ser::Error> for GridError {
    fn from(e: utils::ser::Error) -> Self {
        Self::Boxed(Box::new(e))
    }
}
impl From<PlaceError> for GridError {
    fn from(err: PlaceError) -> Self {
        Self::Place {
            err,
            stack: Vec::new(),
        }
    }
}
impl From<crate::config::PlacementConfigBuilderError> for GridError {
    fn from(e: crate::config::PlacementConfigBuilderError) -> Self {
        Self::config(e.to_string())
    }
}
impl From<crate::config::TableSpecBuilderError> for GridError {
    fn from(e: crate::config::TableSpecBuilderError) -> Self {
        Self::config(e.to_string())
    }
}
impl<T: std::error::Error + Send + Sync + 'static> From<Box<T>> for GridError {
    fn from(e: Box<T>) -> Self {
        Self::Boxed(e)
    }
}

/// # [PlaceError] Result Type
pub type PlaceResult<T> = Result<T, PlaceError>;

///
/// # Track Placement Errors
///
/// Raised before any mutation. A failed placement leaves its grid untouched.
///
#[derive(Clone, PartialEq, Eq)]
pub enum PlaceError {
    /// Overlap refused under the reject policy, with the box ids of both parties
    Overlap { track: usize, existing: u32, new: u32 },
    /// Target track is blocked
    Blocked(usize),
    /// No free track within the retry cap
    NoFreeTrack { init: usize, tried: usize },
}
impl std::fmt::Debug for PlaceError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            PlaceError::Overlap {
                track,
                existing,
                new,
            } => write!(
                f,
                "Overlap on track #{}: box {} collides with existing box {}",
                track, new, existing
            ),
            PlaceError::Blocked(track) => write!(f, "Track #{} is blocked", track),
            PlaceError::NoFreeTrack { init, tried } => write!(
                f,
                "No free track near #{} after trying {} tracks",
                init, tried
            ),
        }
    }
}
impl std::fmt::Display for PlaceError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        std::fmt::Debug::fmt(self, f)
    }
}
impl std::error::Error for PlaceError {}
