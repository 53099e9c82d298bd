//! Health scoring
//!
//! Raw measurements are classified per dimension against warn/crit
//! thresholds (`classifier`), then turned into issues, actions and a
//! summary line (`aggregator`). `migration` computes the secondary
//! native-code migration score.
//!
//! # Levels
//!
//! - **Green**: below warn
//! - **Yellow**: at or above warn, below crit
//! - **Red**: at or above crit
//!
//! A unit's overall level is its worst dimension level; its composite
//! score is the weighted mean of the dimension scores.

pub mod aggregator;
pub mod classifier;
pub mod migration;

pub use aggregator::{aggregate, summary_line, Aggregation, HEALTHY_ACTION, URGENT_ACTION};
pub use classifier::{classify, classify_all, composite_level, composite_score};
pub use migration::assess;
