//! Messages, bounded conversation history, and typed predictions.

mod history;
mod message;
mod prediction;

pub use history::History;
pub use message::{Message, Role};
pub use prediction::Prediction;
