//! Zoomable Wheel State
//!
//! Owns the partitioned segments plus the focus/transition state machine.
//! Focusing a branch renormalizes every segment's span against the focus
//! node's base coordinates: its angular span stretches to the full turn and
//! its depth becomes the new center. Spans animate from their displayed
//! position toward the target over a fixed duration; a new focus taken
//! mid-flight simply retargets from wherever the spans currently are.

use std::time::Duration;

use crate::models::TrainingNode;

use super::partition::{partition, Segment, SegmentKind, Span, FULL_TURN};

/// Duration of the focus transition.
pub const FOCUS_TRANSITION: Duration = Duration::from_millis(800);

/// Minimum target area (span width times band height, radians) below which a
/// segment label is hidden.
pub const LABEL_MIN_AREA: f64 = 0.03;

/// What a click on a segment should do.
#[derive(Debug, Clone, PartialEq)]
pub enum ClickAction {
    /// Add a new child under this node.
    AddChild { parent_id: String },
    /// Refocus the wheel onto this branch.
    Focus { node_id: String },
    /// Open a log entry for this leaf.
    LogEntry { node_id: String },
}

/// Where to paint a segment label, relative to the wheel center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelPlacement {
    /// Rotation in degrees, 0 pointing up.
    pub rotation_deg: f64,
    /// Distance from center in pixels.
    pub radial_offset: f64,
    /// Whether the label sits on the left half and reads upside down
    /// unless counter-rotated.
    pub flipped: bool,
}

/// The zoomable radial layout over a training hierarchy.
#[derive(Debug, Clone)]
pub struct RadialLayout {
    segments: Vec<Segment>,
    height: u32,
    focus_id: String,
    transitioning: bool,
}

impl RadialLayout {
    pub fn new(tree: &TrainingNode) -> Self {
        let (segments, height) = partition(tree);
        Self {
            segments,
            height,
            focus_id: TrainingNode::ROOT_ID.to_string(),
            transitioning: false,
        }
    }

    /// All segments in draw order, root first.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Drawable arcs: everything except the root disc.
    pub fn arcs(&self) -> impl Iterator<Item = &Segment> {
        self.segments.iter().filter(|s| s.depth > 0)
    }

    pub fn segment(&self, segment_id: &str) -> Option<&Segment> {
        self.segments.iter().find(|s| s.id == segment_id)
    }

    pub fn focus_id(&self) -> &str {
        &self.focus_id
    }

    /// Maximum layout depth, add segments included.
    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn is_transitioning(&self) -> bool {
        self.transitioning
    }

    /// Refocus the wheel onto `node_id`, starting a transition from the
    /// currently displayed spans. Targets derive from base partition
    /// coordinates only, so the destination is independent of whatever focus
    /// was active before. Unknown ids are a no-op.
    pub fn focus(&mut self, node_id: &str) -> bool {
        let Some(focus) = self.segment(node_id) else {
            return false;
        };
        let f = focus.base;
        let f_depth = focus.depth;
        self.focus_id = node_id.to_string();

        let f_width = f.angular_width();
        let angle_of = |x: f64| {
            if f_width <= 0.0 {
                0.0
            } else {
                ((x - f.x0) / f_width).clamp(0.0, 1.0) * FULL_TURN
            }
        };

        for seg in &mut self.segments {
            seg.from = seg.current;
            seg.target = Span {
                x0: angle_of(seg.base.x0),
                x1: angle_of(seg.base.x1),
                y0: (seg.base.y0 - f64::from(f_depth)).max(0.0),
                y1: (seg.base.y1 - f64::from(f_depth)).max(0.0),
            };
        }
        self.transitioning = true;
        true
    }

    /// Advance the transition to `progress` in 0..=1 of [`FOCUS_TRANSITION`].
    /// At 1.0 the transition completes and spans pin to their targets.
    pub fn advance(&mut self, progress: f64) {
        let t = progress.clamp(0.0, 1.0);
        for seg in &mut self.segments {
            seg.current = Span::lerp(&seg.from, &seg.target, t);
        }
        if t >= 1.0 {
            for seg in &mut self.segments {
                seg.from = seg.target;
            }
            self.transitioning = false;
        }
    }

    /// Jump straight to the transition targets.
    pub fn snap_to_target(&mut self) {
        self.advance(1.0);
    }

    /// Re-partition after a structural edit. Any in-flight transition snaps
    /// to its target first; the kept focus then applies instantly, without
    /// an animation. A focus whose node no longer exists falls back to root.
    pub fn rebuild(&mut self, tree: &TrainingNode) {
        self.snap_to_target();
        let (segments, height) = partition(tree);
        self.segments = segments;
        self.height = height;

        if self.segment(&self.focus_id).is_none() {
            self.focus_id = TrainingNode::ROOT_ID.to_string();
        }
        let focus_id = self.focus_id.clone();
        self.focus(&focus_id);
        self.snap_to_target();
    }

    /// Resolve a pointer position (angle in radians from 12 o'clock, radius
    /// in band units) against the displayed arcs. Boundaries belong to the
    /// segment drawn last, so an add button wins over the sibling it abuts.
    pub fn hit_test(&self, angle: f64, radius: f64) -> Option<&Segment> {
        let angle = angle.rem_euclid(FULL_TURN);
        let mut hit = None;
        for seg in self.arcs() {
            if seg.current.contains(angle, radius) {
                hit = Some(seg);
            }
        }
        hit
    }

    /// What clicking `segment_id` should do.
    pub fn click(&self, segment_id: &str) -> Option<ClickAction> {
        let seg = self.segment(segment_id)?;
        Some(match &seg.kind {
            SegmentKind::AddButton { parent_id } => ClickAction::AddChild {
                parent_id: parent_id.clone(),
            },
            SegmentKind::Branch => ClickAction::Focus {
                node_id: seg.id.clone(),
            },
            SegmentKind::Leaf => ClickAction::LogEntry {
                node_id: seg.id.clone(),
            },
        })
    }

    /// A segment is editable (rename, recolor, delete) only while its parent
    /// is the focused node. Add buttons are never editable.
    pub fn is_editable(&self, segment_id: &str) -> bool {
        self.segment(segment_id).is_some_and(|seg| {
            !seg.is_add_button() && seg.parent_id.as_deref() == Some(self.focus_id.as_str())
        })
    }

    /// Whether a segment's label should be painted. Judged against the
    /// transition target while a transition is running so labels settle to
    /// their final visibility immediately.
    pub fn label_visible(&self, segment_id: &str) -> bool {
        let Some(seg) = self.segment(segment_id) else {
            return false;
        };
        if let SegmentKind::AddButton { parent_id } = &seg.kind {
            return parent_id == &self.focus_id;
        }
        let s = self.display_span(seg);
        s.y1 <= 3.0 && s.y0 >= 1.0 && s.radial_width() * s.angular_width() > LABEL_MIN_AREA
    }

    /// Label placement at the segment's angular and radial midpoint.
    pub fn label_placement(&self, segment_id: &str, radius_unit: f64) -> Option<LabelPlacement> {
        let seg = self.segment(segment_id)?;
        let s = self.display_span(seg);
        let mid_deg = (s.x0 + s.x1) / 2.0 * 180.0 / std::f64::consts::PI;
        Some(LabelPlacement {
            rotation_deg: mid_deg - 90.0,
            radial_offset: (s.y0 + s.y1) / 2.0 * radius_unit,
            flipped: mid_deg >= 180.0,
        })
    }

    /// Center text: the first word of the focused node's name, or "WHY" at
    /// the root.
    pub fn center_label(&self) -> String {
        if self.focus_id == TrainingNode::ROOT_ID {
            return "WHY".to_string();
        }
        self.segment(&self.focus_id)
            .and_then(|seg| seg.name.split_whitespace().next())
            .unwrap_or("WHY")
            .to_string()
    }

    fn display_span(&self, seg: &Segment) -> Span {
        if self.transitioning {
            seg.target
        } else {
            seg.current
        }
    }
}
