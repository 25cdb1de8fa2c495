/// Aspect-fit placement of the source video and the rounded clip outline.
pub mod fit;
