//! Radial Layout Engine
//!
//! Geometry for the zoomable training wheel: a partition step that turns the
//! hierarchy into angular/radial spans, and a zoom state machine that focuses,
//! animates and hit-tests those spans. Rendering itself stays out of this
//! crate; the engine only hands back coordinates and interaction decisions.

mod partition;
mod zoom;

pub use partition::{
    ArcGeometry, Segment, SegmentKind, Span, ADD_SEGMENT_COLOR, FULL_TURN,
};
pub use zoom::{
    ClickAction, LabelPlacement, RadialLayout, FOCUS_TRANSITION, LABEL_MIN_AREA,
};
