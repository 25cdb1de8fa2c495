//! Pipeline configuration and the preset table.

/// Pipeline configuration record.
pub mod pipeline;
/// Stock layouts.
pub mod presets;
