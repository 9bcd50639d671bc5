//! Controller layer: user input commands and the pipelines they start.

pub mod events;
pub mod interaction;

pub use events::{InputCommand, HELP_TEXT};
pub use interaction::{InteractionController, PipelineOutcome};
