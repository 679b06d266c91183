//! Word Extraction
//!
//! Turns function and method names into word counts for the dashboard:
//!
//! - **split**: language conventions and identifier splitting
//! - **tally**: per-word counts and their upsert into `"words"`
//! - **seed**: bulk loading of word documents at startup
//!
//! ```text
//! identifiers → Language::split → WordTally → record_tally → WriteBatch → live views
//! ```

mod seed;
mod split;
mod tally;

pub use seed::{parse_seed, seed_from_file, SeedError};
pub use split::{camel_case_split, is_camel_case, is_snake_case, snake_case_split, Language};
pub use tally::{record_tally, WordTally};
