//! Units: the visual-producing entries of a template.

use std::fmt;

use slotmap::new_key_type;

use crate::element::Generator;
use crate::track::GridRange;

use super::TemplateId;

new_key_type! {
    /// Identifier of a unit within its template.
    pub struct UnitId;
}

/// How often a repeating unit is instantiated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RepeatScope {
    /// Once per data row.
    Row,
    /// Once per block of rows.
    Block,
}

/// Where a unit's instances live: rendered once, or once per row/block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Placement {
    Scalar,
    Repeating(RepeatScope),
}

/// The closed set of unit kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitKind {
    /// Rendered exactly once.
    Scalar,
    /// Rendered once per realized row or block.
    Repeating(RepeatScope),
    /// A child template laid out inside the unit's range; once, or per row/block.
    NestedGrid {
        child: TemplateId,
        repeat: Option<RepeatScope>,
    },
}

/// What a unit instantiates.
pub(crate) enum UnitContent {
    /// Host elements produced by a generator.
    Element(Box<dyn Generator>),
    /// A child template from the same arena.
    Grid(TemplateId),
}

/// A unit declared on a template.
pub struct Unit {
    pub(crate) placement: Placement,
    pub(crate) content: UnitContent,
    pub(crate) range: GridRange,
    pub(crate) ordinal: usize,
    pub(crate) auto_size_order: Option<u32>,
}

impl Unit {
    pub fn kind(&self) -> UnitKind {
        match (&self.content, self.placement) {
            (UnitContent::Grid(child), Placement::Scalar) => UnitKind::NestedGrid {
                child: *child,
                repeat: None,
            },
            (UnitContent::Grid(child), Placement::Repeating(scope)) => UnitKind::NestedGrid {
                child: *child,
                repeat: Some(scope),
            },
            (UnitContent::Element(_), Placement::Scalar) => UnitKind::Scalar,
            (UnitContent::Element(_), Placement::Repeating(scope)) => UnitKind::Repeating(scope),
        }
    }

    pub fn range(&self) -> GridRange {
        self.range
    }

    /// Position among units of the same placement, in declaration order.
    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    /// Explicit content-measurement priority; lower measures first.
    pub fn auto_size_order(&self) -> Option<u32> {
        self.auto_size_order
    }

    pub fn placement(&self) -> Placement {
        self.placement
    }

    pub fn is_scalar(&self) -> bool {
        self.placement == Placement::Scalar
    }

    pub fn is_repeating(&self) -> bool {
        !self.is_scalar()
    }

    /// The child template of a nested-grid unit.
    pub fn nested_child(&self) -> Option<TemplateId> {
        match self.content {
            UnitContent::Grid(child) => Some(child),
            UnitContent::Element(_) => None,
        }
    }
}

impl fmt::Debug for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Unit")
            .field("kind", &self.kind())
            .field("range", &self.range)
            .field("ordinal", &self.ordinal)
            .field("auto_size_order", &self.auto_size_order)
            .finish_non_exhaustive()
    }
}
