//! Application layer: the post builder use case and the preview renderer.

pub mod builder;
pub mod preview;
pub mod prompt;
pub mod response;

pub use builder::{BuilderEvent, PostBuilder};
pub use preview::{
    Clipboard, ContainerSize, CopyTarget, PreviewBlock, PreviewLayout, PreviewRenderer, compute_scale, copy,
    hashtag_line,
};
