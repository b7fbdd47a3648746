//! Result rendering for Lens.
//!
//! - **sections**: Which result sections a workflow state shows, and in what order
//! - **text**: Plain-text rendering of those sections for a terminal

pub mod sections;
pub mod text;

pub use sections::{select_sections, Section, SectionKind, SummaryMetrics};
pub use text::{render_sections, render_state, BUSY_LINE};
