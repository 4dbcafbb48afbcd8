//! Dropdown positioning.
//!
//! The dropdown is placed once, right after it first becomes measurable: it hangs below the
//! trigger span, flips to the right edge when it would overflow the editor horizontally, and
//! anchors to the bottom when it would overflow vertically. There is no scroll or resize
//! tracking.
//!
//! Units are whatever the host measures in (pixels, terminal cells).

/// Inset applied to whichever horizontal edge the dropdown anchors to.
pub const DROPDOWN_INSET: f32 = 15.0;

/// An axis-aligned rectangle in host units.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    /// Left edge.
    pub left: f32,
    /// Top edge.
    pub top: f32,
    /// Width.
    pub width: f32,
    /// Height.
    pub height: f32,
}

impl Rect {
    /// Create a rectangle.
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Right edge.
    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    /// Bottom edge.
    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }
}

/// Dropdown anchoring, as CSS-like insets. `None` leaves an edge unset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DropdownPosition {
    /// Inset from the left edge.
    pub left: Option<f32>,
    /// Inset from the right edge.
    pub right: Option<f32>,
    /// Inset from the bottom edge.
    pub bottom: Option<f32>,
}

impl Default for DropdownPosition {
    fn default() -> Self {
        Self {
            left: Some(DROPDOWN_INSET),
            right: None,
            bottom: None,
        }
    }
}

/// Compute the dropdown anchoring from three measurements: the editor container, the
/// decorated trigger span, and the dropdown as first rendered (below the trigger, left-anchored).
pub fn compute_dropdown_position(editor: Rect, trigger: Rect, dropdown: Rect) -> DropdownPosition {
    let overflows_right = editor.width < trigger.left - editor.left + dropdown.width;
    let (left, right) = if overflows_right {
        (None, Some(DROPDOWN_INSET))
    } else {
        (Some(DROPDOWN_INSET), None)
    };
    let bottom = (editor.bottom() < dropdown.bottom()).then_some(0.0);

    DropdownPosition {
        left,
        right,
        bottom,
    }
}
