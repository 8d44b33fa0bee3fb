//! Supervisor synthesis: product, head/ear splitting, non-controllable-ear
//! removal, transition merging, and the `PushdownBlockfree`/
//! `PushdownAccessible`/`PushdownConstructController` orchestration
//! (`spec.md` §4.12–§4.16).

mod control;
mod merge;
mod rnce;
mod split;
mod times;

pub use control::{construct_controller, pushdown_accessible, pushdown_blockfree};
pub use merge::{merge_adjacent_transitions, merge_until_stable};
pub use rnce::rnce;
pub use split::{split, SplitIndex};
pub use times::times;
