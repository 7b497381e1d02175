//! Thin prompting strategies built on [`crate::core::Signature`],
//! [`crate::adapter::Adapter`], and [`crate::lm::Lm`]. Not the focus of this crate —
//! real strategy/optimizer libraries belong on top of it (see the crate's
//! non-goals) — these exist to exercise the rest of the stack end to end.

mod chain_of_thought;
mod predict;

pub use chain_of_thought::ChainOfThought;
pub use predict::Predict;
