//! UI components module.

pub mod grid;
pub mod prompt;

pub use grid::{render_grid, GridState};
pub use prompt::{parse_request, render_prompt, BatchAction, PromptKind, PromptState};
