//! The pushdown pipeline: DPDA normalisation, trimming, the
//! nondouble-acceptance transform, SPDA→CFG translation, and grammar
//! cleanup (`spec.md` §4.6–§4.10).

mod cleanup;
mod nda;
mod spda;
mod sp2lr;
mod trim;

pub use cleanup::{remove_non_productive, remove_unreachable};
pub use nda::nda;
pub use sp2lr::sp2lr;
pub use spda::{normalize as spda_normalize, rebuild_from_spda};
pub use trim::{trim_finite, trim_lookahead};
