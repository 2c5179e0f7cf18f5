//!
//! # Error-Helper Utilities
//!
//! ```rust
//! use grid21utils::error::{ErrorHelper, Unwrapper};
//!
//! /// A tile which reports its position on failure
//! struct Tile {
//!     row: usize,
//!     col: usize,
//! }
//! impl ErrorHelper for Tile {
//!     type Error = String;
//!     fn err(&self, msg: impl Into<String>) -> Self::Error {
//!         format!("Tile [{}][{}]: {}", self.row, self.col, msg.into())
//!     }
//! }
//! impl Tile {
//!     fn track(&self, tracks: &[u32], idx: usize) -> Result<u32, String> {
//!         self.assert(!tracks.is_empty(), "No tracks")?;
//!         tracks.get(idx).copied().unwrapper(self, "Track index out of range")
//!     }
//! }
//! let t = Tile { row: 1, col: 2 };
//! assert_eq!(t.track(&[7, 8], 1), Ok(8));
//! assert_eq!(t.track(&[7, 8], 5), Err("Tile [1][2]: Track index out of range".to_string()));
//! ```
//!

///
/// # ErrorHelper
///
/// Implemented by types with some state worth reporting upon failure.
/// Implementers supply `err`; `fail`, `unwrap`, `assert` and `check_index` are provided.
///
pub trait ErrorHelper {
    type Error;

    /// Create and return a [Self::Error] value.
    fn err(&self, msg: impl Into<String>) -> Self::Error;
    /// Return failure
    fn fail<T>(&self, msg: impl Into<String>) -> Result<T, Self::Error> {
        Err(self.err(msg))
    }
    /// Unwrap the [Option] `opt` if it is [Some], and return our error if not.
    fn unwrap<T>(&self, opt: Option<T>, msg: impl Into<String>) -> Result<T, Self::Error> {
        match opt {
            Some(val) => Ok(val),
            None => self.fail(msg),
        }
    }
    /// Assert a boolean condition. Returns through `self.fail` if it is not satisfied.
    fn assert(&self, b: bool, msg: impl Into<String>) -> Result<(), Self::Error> {
        match b {
            true => Ok(()),
            false => self.fail(msg),
        }
    }
    /// Check `idx` against exclusive upper bound `cnt`, naming `what` on failure.
    fn check_index(&self, idx: usize, cnt: usize, what: &str) -> Result<usize, Self::Error> {
        if idx < cnt {
            return Ok(idx);
        }
        self.fail(format!("{} index {} out of range [0, {})", what, idx, cnt))
    }
}

///
/// # Unwrapper
///
/// Post-fix [ErrorHelper] handling for [Option]s and [Result]s.
/// Import the trait and call `unwrapper(helper, msg)` where an `unwrap` would otherwise go.
///
pub trait Unwrapper {
    type Ok;
    fn unwrapper<H>(self, helper: &H, msg: impl Into<String>) -> Result<Self::Ok, H::Error>
    where
        H: ErrorHelper;
}

impl<T> Unwrapper for Option<T> {
    type Ok = T;
    fn unwrapper<H>(self, helper: &H, msg: impl Into<String>) -> Result<Self::Ok, H::Error>
    where
        H: ErrorHelper,
    {
        match self {
            Some(t) => Ok(t),
            None => helper.fail(msg),
        }
    }
}

/// The original error is dropped in favor of the helper's.
impl<T, E> Unwrapper for Result<T, E> {
    type Ok = T;
    fn unwrapper<H>(
        self,
        helper: &H,
        msg: impl Into<String>,
    ) -> Result<<Self as Unwrapper>::Ok, H::Error>
    where
        H: ErrorHelper,
    {
        match self {
            Ok(t) => Ok(t),
            Err(_) => helper.fail(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Named(&'static str);
    impl ErrorHelper for Named {
        type Error = String;
        fn err(&self, msg: impl Into<String>) -> String {
            format!("{}: {}", self.0, msg.into())
        }
    }

    #[test]
    fn check_index() {
        let h = Named("grid");
        assert_eq!(h.check_index(3, 4, "track"), Ok(3));
        assert_eq!(
            h.check_index(4, 4, "track"),
            Err("grid: track index 4 out of range [0, 4)".to_string())
        );
    }
    #[test]
    fn unwrapper_on_result() {
        let h = Named("pool");
        let r: Result<u8, ()> = Err(());
        assert_eq!(r.unwrapper(&h, "stale"), Err("pool: stale".to_string()));
    }
}
