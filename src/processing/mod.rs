//! Generation of derived artefacts.

mod visual_diff;

pub use self::visual_diff::{
    GenerateVisualDiffError,
    RenderError,
    VisualDiffRenderer,
    generate_visual_diff,
    process_stale,
    reset_visual_diff,
};
