//! Segmented frontier queue ("the pipe") and its per-pass accessor views.

pub mod in_view;
pub mod out_view;
pub mod pipe;

pub use in_view::InFrontierView;
pub use out_view::OutFrontierView;
pub use pipe::{CompressStats, PartitionSnapshot, Pipe, PipeSnapshot};
