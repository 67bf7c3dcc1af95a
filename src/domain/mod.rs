//! Domain error types and the crate-wide `Result` alias.
//!
//! All fallible library operations return [`Result<T, ShroudError>`]:
//!
//! ```rust
//! use shroud::domain::{Result, ShroudError};
//!
//! fn example() -> Result<()> {
//!     Err(ShroudError::Validation("empty input".to_string()))
//! }
//! ```

pub mod errors;
pub mod result;

pub use errors::{GenerationError, PipelineError, RecognitionError, ShroudError};
pub use result::Result;
