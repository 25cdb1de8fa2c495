//! Run orchestration: source -> compositor -> encoder sink -> progress -> packager.

/// The pipeline and its convenience entry points.
pub mod run;
