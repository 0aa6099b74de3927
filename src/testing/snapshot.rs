//! Snapshot text helpers.
//!
//! Turns the arranged output of a coordinator into plain text, one element
//! per line, for inline snapshot assertions.

use std::fmt::Write;

use crate::scroll::{ArrangedElement, ScrollCoordinator, VisualId};
use crate::template::Template;

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Describe every element of the last arrange of `coordinator`.
///
/// Each line reads `<label> <x>,<y> <width>x<height>`, followed by `pinned`
/// for elements of the pinned collection. Units are named by their ordinal
/// among units of the same kind, so scalars and repeating units each count
/// from 0.
pub fn layout_summary(coordinator: &ScrollCoordinator) -> String {
    arranged_to_string(coordinator.template(), coordinator.arranged())
}

/// Describe `arranged` elements of `template`.
pub fn arranged_to_string(template: &Template, arranged: &[ArrangedElement]) -> String {
    let mut out = String::new();
    for element in arranged {
        let ordinal = |unit| template.unit(unit).map_or(usize::MAX, |u| u.ordinal());
        let label = match element.id {
            VisualId::Scalar(unit) => format!("scalar {}", ordinal(unit)),
            VisualId::Block { block, unit } => format!("block {block} unit {}", ordinal(unit)),
            VisualId::Row { row, unit } => format!("row {row} unit {}", ordinal(unit)),
        };
        let rect = element.rect;
        let line = format!(
            "{label:<16}{},{} {}x{}{}",
            rect.x,
            rect.y,
            rect.width,
            rect.height,
            if element.pinned { " pinned" } else { "" }
        );
        let _ = writeln!(out, "{}", line.trim_end());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::Element;
    use crate::geometry::Rect;
    use crate::template::TemplateArena;
    use crate::testing::FixedElement;

    #[test]
    fn summary_lines() {
        let mut arena = TemplateArena::new();
        let id = arena.create();
        let t = &mut arena[id];
        t.add_column("*").unwrap();
        t.add_row("20").unwrap();
        let unit = t
            .add_scalar(t.range(0, 0).unwrap(), || {
                Box::new(FixedElement::new(1.0, 1.0)) as Box<dyn Element>
            })
            .unwrap();
        let arranged = [
            ArrangedElement {
                id: VisualId::Scalar(unit),
                rect: Rect::new(0.0, 0.0, 100.0, 20.0),
                pinned: true,
            },
            ArrangedElement {
                id: VisualId::Row { row: 4, unit },
                rect: Rect::new(0.0, 12.5, 100.0, 20.0),
                pinned: false,
            },
        ];
        assert_eq!(
            arranged_to_string(&arena[id], &arranged),
            "scalar 0        0,0 100x20 pinned\nrow 4 unit 0    0,12.5 100x20\n"
        );
    }
}
