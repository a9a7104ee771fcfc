//! Radial Partition
//!
//! Mirrors the training hierarchy into a flat list of drawable segments.
//! Every node owns an angular span (radians, 0..2π) proportional to its
//! subtree leaf weight and a one-unit radial band per depth level. Containers
//! below the maximum editable level additionally carry one synthetic "add"
//! segment that renders the add-child affordance; it is excluded from normal
//! selection and always sorted last among its siblings.

use crate::models::TrainingNode;

/// One full turn, the angular budget of the whole wheel.
pub const FULL_TURN: f64 = std::f64::consts::TAU;

/// Fill color of the synthetic add segment.
pub const ADD_SEGMENT_COLOR: &str = "#f8fafc";

/// Angular/radial extent of a segment. Angles are radians; radial units are
/// depth levels (one band per level, root at 0..1).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Span {
    pub x0: f64,
    pub x1: f64,
    pub y0: f64,
    pub y1: f64,
}

impl Span {
    pub fn angular_width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn radial_width(&self) -> f64 {
        self.y1 - self.y0
    }

    /// Closed-interval containment. Boundaries belong to every adjacent
    /// segment; hit testing resolves the tie by draw order.
    pub fn contains(&self, angle: f64, radius: f64) -> bool {
        self.x0 <= angle && angle <= self.x1 && self.y0 <= radius && radius <= self.y1
    }

    /// Linear interpolation between two spans.
    pub fn lerp(from: &Span, to: &Span, t: f64) -> Span {
        let mix = |a: f64, b: f64| a + (b - a) * t;
        Span {
            x0: mix(from.x0, to.x0),
            x1: mix(from.x1, to.x1),
            y0: mix(from.y0, to.y0),
            y1: mix(from.y1, to.y1),
        }
    }
}

/// What a segment stands for, which decides its click semantics.
#[derive(Debug, Clone, PartialEq)]
pub enum SegmentKind {
    /// Has children in the layout; clicking refocuses the wheel onto it.
    Branch,
    /// Terminal data node; clicking requests a log entry.
    Leaf,
    /// Synthetic add affordance; clicking adds a child to its real parent.
    AddButton { parent_id: String },
}

/// One drawable arc of the wheel.
///
/// `base` holds the partition coordinates of the unfocused wheel and never
/// changes until the tree is rebuilt; `current` and `target` drive the zoom
/// transition.
#[derive(Debug, Clone)]
pub struct Segment {
    pub id: String,
    pub name: String,
    pub color: String,
    pub level: u32,
    pub kind: SegmentKind,
    /// Layout parent (None only for the root segment).
    pub parent_id: Option<String>,
    pub depth: u32,
    pub weight: f64,
    pub base: Span,
    pub current: Span,
    pub(crate) from: Span,
    pub(crate) target: Span,
}

impl Segment {
    pub fn is_add_button(&self) -> bool {
        matches!(self.kind, SegmentKind::AddButton { .. })
    }
}

/// Renderer-facing arc parameters for a segment span: a small pad angle
/// capped at half the span, and an outer radius pulled in by one pixel so
/// adjacent rings stay visually separated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcGeometry {
    pub start_angle: f64,
    pub end_angle: f64,
    pub pad_angle: f64,
    pub inner_radius: f64,
    pub outer_radius: f64,
}

impl ArcGeometry {
    /// Compute arc parameters for `span` given the pixel radius of one
    /// radial band.
    pub fn for_span(span: &Span, radius_unit: f64) -> ArcGeometry {
        ArcGeometry {
            start_angle: span.x0,
            end_angle: span.x1,
            pad_angle: (span.angular_width() / 2.0).min(0.01),
            inner_radius: span.y0 * radius_unit,
            outer_radius: (span.y0 * radius_unit).max(span.y1 * radius_unit - 1.0),
        }
    }
}

/// Intermediate weighted tree used while partitioning.
struct LayoutNode {
    id: String,
    name: String,
    color: String,
    level: u32,
    kind: SegmentKind,
    depth: u32,
    weight: f64,
    children: Vec<LayoutNode>,
}

fn build_layout_node(data: &TrainingNode, depth: u32) -> LayoutNode {
    // Deterministic draw order: real siblings ascending by id, add last.
    let mut sorted: Vec<&TrainingNode> = data.children.iter().flatten().collect();
    sorted.sort_by(|a, b| a.id.cmp(&b.id));

    let mut children: Vec<LayoutNode> = sorted
        .into_iter()
        .map(|child| build_layout_node(child, depth + 1))
        .collect();

    if data.level < TrainingNode::MAX_EDITABLE_LEVEL {
        children.push(LayoutNode {
            id: format!("add-{}", data.id),
            name: "+".to_string(),
            color: ADD_SEGMENT_COLOR.to_string(),
            level: data.level + 1,
            kind: SegmentKind::AddButton {
                parent_id: data.id.clone(),
            },
            depth: depth + 1,
            weight: 1.0,
            children: Vec::new(),
        });
    }

    // Leaf weight is 1; containers weigh the sum of their descendants' leaf
    // weights (synthetic add leaves included).
    let own = if data.children.is_none() { 1.0 } else { 0.0 };
    let weight = own + children.iter().map(|c| c.weight).sum::<f64>();

    let kind = if children.is_empty() {
        SegmentKind::Leaf
    } else {
        SegmentKind::Branch
    };

    LayoutNode {
        id: data.id.clone(),
        name: data.name.clone(),
        color: data.color.clone(),
        level: data.level,
        kind,
        depth,
        weight,
        children,
    }
}

fn assign_spans(
    node: LayoutNode,
    parent_id: Option<String>,
    x0: f64,
    x1: f64,
    out: &mut Vec<Segment>,
) {
    let span = Span {
        x0,
        x1,
        y0: f64::from(node.depth),
        y1: f64::from(node.depth + 1),
    };

    let id = node.id.clone();
    out.push(Segment {
        id: node.id,
        name: node.name,
        color: node.color,
        level: node.level,
        kind: node.kind,
        parent_id,
        depth: node.depth,
        weight: node.weight,
        base: span,
        current: span,
        from: span,
        target: span,
    });

    if node.children.is_empty() {
        return;
    }

    // Children divide the parent's angular span proportionally to weight,
    // laid out sequentially in draw order.
    let total = node.weight.max(f64::EPSILON);
    let width = x1 - x0;
    let mut cursor = x0;
    for child in node.children {
        let slice = width * child.weight / total;
        let child_x1 = cursor + slice;
        assign_spans(child, Some(id.clone()), cursor, child_x1, out);
        cursor = child_x1;
    }
}

/// Partition the hierarchy into pre-order segments (draw order) and return
/// them with the maximum layout depth.
pub(crate) fn partition(tree: &TrainingNode) -> (Vec<Segment>, u32) {
    let root = build_layout_node(tree, 0);
    let mut segments = Vec::new();
    assign_spans(root, None, 0.0, FULL_TURN, &mut segments);
    let height = segments.iter().map(|s| s.depth).max().unwrap_or(0);
    (segments, height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::seed::default_tree;

    #[test]
    fn root_owns_the_full_turn() {
        let (segments, height) = partition(&default_tree());
        let root = &segments[0];
        assert_eq!(root.base.x0, 0.0);
        assert!((root.base.x1 - FULL_TURN).abs() < 1e-9);
        assert_eq!(root.base.y0, 0.0);
        assert_eq!(root.base.y1, 1.0);
        // Deepest segments are the add buttons under level-2 containers.
        assert_eq!(height, 3);
    }

    #[test]
    fn every_depth_band_is_one_unit() {
        let (segments, _) = partition(&default_tree());
        for seg in &segments {
            assert_eq!(seg.base.y0, f64::from(seg.depth));
            assert_eq!(seg.base.radial_width(), 1.0);
        }
    }

    #[test]
    fn siblings_sort_ascending_with_add_last() {
        let (segments, _) = partition(&default_tree());
        let root_children: Vec<&Segment> = segments
            .iter()
            .filter(|s| s.parent_id.as_deref() == Some("root"))
            .collect();
        let ids: Vec<&str> = root_children.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["why-athletic", "why-balanced", "why-strong", "add-root"]
        );
        // Pre-order emission means draw order follows sibling order.
        assert!(root_children.last().unwrap().is_add_button());
    }

    #[test]
    fn container_weight_sums_descendant_leaves() {
        let (segments, _) = partition(&default_tree());
        // how-push: 3 real leaves + its own add segment.
        let how_push = segments.iter().find(|s| s.id == "how-push").unwrap();
        assert_eq!(how_push.weight, 4.0);

        let add = segments.iter().find(|s| s.id == "add-how-push").unwrap();
        assert_eq!(add.weight, 1.0);
        assert_eq!(
            add.kind,
            SegmentKind::AddButton {
                parent_id: "how-push".to_string()
            }
        );
    }

    #[test]
    fn sibling_spans_tile_the_parent() {
        let (segments, _) = partition(&default_tree());
        let parent = segments.iter().find(|s| s.id == "how-pull").unwrap();
        let children: Vec<&Segment> = segments
            .iter()
            .filter(|s| s.parent_id.as_deref() == Some("how-pull"))
            .collect();

        let mut cursor = parent.base.x0;
        for child in &children {
            assert!((child.base.x0 - cursor).abs() < 1e-9);
            cursor = child.base.x1;
        }
        assert!((cursor - parent.base.x1).abs() < 1e-9);
    }

    #[test]
    fn arc_geometry_matches_chart_configuration() {
        let span = Span {
            x0: 0.0,
            x1: 1.0,
            y0: 1.0,
            y1: 2.0,
        };
        let arc = ArcGeometry::for_span(&span, 100.0);
        assert_eq!(arc.pad_angle, 0.01);
        assert_eq!(arc.inner_radius, 100.0);
        assert_eq!(arc.outer_radius, 199.0);

        // Collapsed spans keep a non-inverted radius pair.
        let collapsed = Span {
            x0: 0.0,
            x1: 0.0,
            y0: 0.0,
            y1: 0.0,
        };
        let arc = ArcGeometry::for_span(&collapsed, 100.0);
        assert_eq!(arc.pad_angle, 0.0);
        assert_eq!(arc.inner_radius, arc.outer_radius);
    }
}
