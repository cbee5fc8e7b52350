//! CLI command implementations.
//!
//! | Module        | Commands handled        |
//! |---------------|-------------------------|
//! | `train`       | `Default`, `Compare`    |
//! | `interactive` | `Interactive`           |

pub mod interactive;
pub mod train;

pub use interactive::cmd_interactive;
pub use train::{cmd_compare, cmd_default};
