// ── Drawing ──

pub mod builder;
mod machine;

pub use builder::{Build, BuildMode, build};
pub use machine::{CompletedShape, DrawMode, DrawingMachine, DrawingState};
