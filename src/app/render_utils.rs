use eframe::egui::{Color32, Painter, Pos2, Rect, Shape, Stroke, Vec2};

use crate::graph::{EdgeKind, NodeKind};

pub(super) const BACKGROUND: Color32 = Color32::from_rgb(7, 7, 14);
pub(super) const PANEL: Color32 = Color32::from_rgb(13, 13, 30);
pub(super) const BORDER: Color32 = Color32::from_rgb(30, 30, 58);
pub(super) const ACCENT: Color32 = Color32::from_rgb(94, 231, 223);
pub(super) const WARN: Color32 = Color32::from_rgb(255, 107, 107);
pub(super) const OK: Color32 = Color32::from_rgb(74, 222, 128);

const FILE_ACCENTS: [Color32; 10] = [
    Color32::from_rgb(0x5e, 0xe7, 0xdf),
    Color32::from_rgb(0x7b, 0x8f, 0xff),
    Color32::from_rgb(0xff, 0xa7, 0x5e),
    Color32::from_rgb(0xff, 0x6b, 0x9d),
    Color32::from_rgb(0xa3, 0xe6, 0x35),
    Color32::from_rgb(0xf5, 0x9e, 0x0b),
    Color32::from_rgb(0xc0, 0x84, 0xfc),
    Color32::from_rgb(0x38, 0xbd, 0xf8),
    Color32::from_rgb(0xfb, 0x71, 0x85),
    Color32::from_rgb(0x34, 0xd3, 0x99),
];

pub(super) fn kind_color(kind: &NodeKind) -> Color32 {
    match kind {
        NodeKind::Person => Color32::from_rgb(0xff, 0x6b, 0x6b),
        NodeKind::Organization => Color32::from_rgb(0x4e, 0xcd, 0xc4),
        NodeKind::Location => Color32::from_rgb(0x45, 0xb7, 0xd1),
        NodeKind::Concept => Color32::from_rgb(0x82, 0xe0, 0xaa),
        NodeKind::Document => Color32::from_rgb(0xf0, 0xb2, 0x7a),
        NodeKind::Event => Color32::from_rgb(0xae, 0xd6, 0xf1),
        NodeKind::Obligation => Color32::from_rgb(0xc3, 0x9b, 0xd3),
        NodeKind::Condition => Color32::from_rgb(0xf9, 0xe7, 0x9f),
        NodeKind::Function => Color32::from_rgb(0x61, 0xaf, 0xef),
        NodeKind::Class => Color32::from_rgb(0xc6, 0x78, 0xdd),
        NodeKind::Variable => Color32::from_rgb(0xe5, 0xc0, 0x7b),
        NodeKind::Import => Color32::from_rgb(0x56, 0xb6, 0xc2),
        NodeKind::Module => Color32::from_rgb(0x98, 0xc3, 0x79),
        NodeKind::Skill => Color32::from_rgb(0xff, 0x9f, 0x43),
        NodeKind::Moc => Color32::from_rgb(0xee, 0x5a, 0x24),
        NodeKind::Claim => Color32::from_rgb(0xa3, 0xcb, 0x38),
        NodeKind::Technique => Color32::from_rgb(0xfd, 0xa7, 0xdf),
        NodeKind::Framework => Color32::from_rgb(0x9a, 0xec, 0xdb),
        NodeKind::File => Color32::from_rgb(0xab, 0xb2, 0xbf),
        NodeKind::Other(_) => Color32::from_rgb(0x63, 0x6e, 0x72),
    }
}

pub(super) fn edge_color(kind: &EdgeKind) -> Color32 {
    match kind {
        EdgeKind::References => Color32::from_rgb(0x66, 0x77, 0xaa),
        EdgeKind::ObligatedTo => Color32::from_rgb(0xc3, 0x9b, 0xd3),
        EdgeKind::Calls => Color32::from_rgb(0x61, 0xaf, 0xef),
        EdgeKind::Extends => Color32::from_rgb(0x98, 0xc3, 0x79),
        EdgeKind::Contradicts => Color32::from_rgb(0xff, 0x6b, 0x6b),
        EdgeKind::Clusters => Color32::from_rgb(0xf0, 0xb2, 0x7a),
        EdgeKind::Imports => Color32::from_rgb(0x56, 0xb6, 0xc2),
        EdgeKind::Defines => Color32::from_rgb(0x4e, 0xcd, 0xc4),
        EdgeKind::RelatedTo => Color32::from_rgb(0x55, 0x66, 0xaa),
        EdgeKind::CrossDomain => Color32::from_rgb(0xfd, 0xa7, 0xdf),
        EdgeKind::Triggers => Color32::from_rgb(0xf9, 0xe7, 0x9f),
        EdgeKind::ConflictsWith => Color32::from_rgb(0xff, 0x99, 0x66),
        EdgeKind::CrossDocument => Color32::from_rgb(0x8b, 0x9f, 0xff),
        EdgeKind::Other(_) => Color32::from_rgb(0x66, 0x77, 0xaa),
    }
}

pub(super) fn file_accent(file_index: usize) -> Color32 {
    FILE_ACCENTS[file_index % FILE_ACCENTS.len()]
}

pub(super) fn node_radius(degree: usize, selected: bool, neighbor: bool) -> f32 {
    if selected {
        22.0
    } else if neighbor {
        18.0
    } else {
        (11.0 + degree as f32 * 0.8).min(18.0)
    }
}

pub(super) fn with_alpha(color: Color32, alpha: f32) -> Color32 {
    let [r, g, b, _] = color.to_array();
    Color32::from_rgba_unmultiplied(r, g, b, (alpha.clamp(0.0, 1.0) * 255.0) as u8)
}

pub(super) fn blend_color(base: Color32, overlay: Color32, amount: f32) -> Color32 {
    let amount = amount.clamp(0.0, 1.0);
    let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * amount) as u8;

    Color32::from_rgba_unmultiplied(
        mix(base.r(), overlay.r()),
        mix(base.g(), overlay.g()),
        mix(base.b(), overlay.b()),
        mix(base.a(), overlay.a()),
    )
}

pub(super) fn draw_background(painter: &Painter, rect: Rect, pan: Vec2, zoom: f32) {
    painter.rect_filled(rect, 0.0, BACKGROUND);

    let step = (48.0 * zoom.clamp(0.5, 2.0)).max(16.0);
    let origin = rect.min + pan;
    let dot = with_alpha(BORDER, 0.8);

    let mut x = rect.left() + (origin.x - rect.left()).rem_euclid(step);
    while x < rect.right() {
        let mut y = rect.top() + (origin.y - rect.top()).rem_euclid(step);
        while y < rect.bottom() {
            painter.circle_filled(Pos2::new(x, y), 1.0, dot);
            y += step;
        }
        x += step;
    }
}

pub(super) fn circle_visible(rect: Rect, position: Pos2, radius: f32) -> bool {
    rect.expand(radius).contains(position)
}

pub(super) fn segment_visible(rect: Rect, start: Pos2, end: Pos2) -> bool {
    Rect::from_two_pos(start, end).intersects(rect)
}

pub(super) fn dashed_stroke(painter: &Painter, start: Pos2, end: Pos2, stroke: Stroke, zoom: f32) {
    painter.extend(Shape::dashed_line(&[start, end], stroke, 6.0 * zoom, 4.0 * zoom));
}

#[cfg(test)]
mod tests {
    use eframe::egui::{pos2, vec2};

    use super::*;

    #[test]
    fn radius_prefers_selection_then_neighbors_then_degree() {
        assert_eq!(node_radius(0, true, true), 22.0);
        assert_eq!(node_radius(0, false, true), 18.0);
        assert_eq!(node_radius(0, false, false), 11.0);
        assert_eq!(node_radius(50, false, false), 18.0);
    }

    #[test]
    fn file_accents_cycle() {
        assert_eq!(file_accent(0), file_accent(FILE_ACCENTS.len()));
        assert_ne!(file_accent(0), file_accent(1));
    }

    #[test]
    fn visibility_checks_account_for_extent() {
        let rect = Rect::from_min_size(pos2(0.0, 0.0), vec2(100.0, 100.0));
        assert!(circle_visible(rect, pos2(-5.0, 50.0), 10.0));
        assert!(!circle_visible(rect, pos2(-50.0, 50.0), 10.0));
        assert!(segment_visible(rect, pos2(-50.0, 50.0), pos2(150.0, 50.0)));
        assert!(!segment_visible(rect, pos2(-50.0, -50.0), pos2(-10.0, -10.0)));
    }

    #[test]
    fn blend_endpoints() {
        assert_eq!(blend_color(Color32::BLACK, Color32::WHITE, 0.0), Color32::BLACK);
        assert_eq!(blend_color(Color32::BLACK, Color32::WHITE, 1.0), Color32::WHITE);
    }
}
