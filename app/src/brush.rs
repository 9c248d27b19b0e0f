use genemap_core::interval_index::IntervalIndex;
use genemap_core::selection::{SelectionDelta, SelectionSet};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum BrushState {
    #[default]
    Idle,
    Dragging {
        /// Normalized position where the drag started; `None` once the
        /// selection was changed from elsewhere.
        anchor: Option<f32>,
        cursor: f32,
    },
}

/// Drag-to-select over one axis of an interval index. Positions are
/// given in the same pixel space as the `size` the index is drawn at.
///
/// The brush never touches the selection itself; every transition
/// returns the delta, if any, for the caller to apply.
#[derive(Debug, Clone, Default)]
pub struct Brush {
    state: BrushState,
    // the current selection is the result of the last drag
    owns_selection: bool,
}

impl Brush {
    pub fn state(&self) -> BrushState {
        self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, BrushState::Dragging { .. })
    }

    /// The normalized range currently brushed, lowest end first.
    pub fn range(&self) -> Option<(f32, f32)> {
        match self.state {
            BrushState::Dragging {
                anchor: Some(anchor),
                cursor,
            } => Some((anchor.min(cursor), anchor.max(cursor))),
            _ => None,
        }
    }

    pub fn press(
        &mut self,
        index: &IntervalIndex,
        pos: [f32; 2],
        size: [f32; 2],
    ) {
        if !index.is_selectable() {
            return;
        }

        let t = index.normalize_point(pos, size);
        self.state = BrushState::Dragging {
            anchor: Some(t),
            cursor: t,
        };
    }

    /// Extends the drag to `pos`, replacing the selection with every id
    /// overlapping the dragged range.
    pub fn drag(
        &mut self,
        index: &IntervalIndex,
        selection: &SelectionSet,
        pos: [f32; 2],
        size: [f32; 2],
    ) -> Option<SelectionDelta> {
        if !index.is_selectable() {
            return None;
        }

        let BrushState::Dragging { anchor, .. } = self.state else {
            return None;
        };

        let cursor = index.normalize_point(pos, size);
        let anchor = anchor.unwrap_or(cursor);
        self.state = BrushState::Dragging {
            anchor: Some(anchor),
            cursor,
        };

        let ids = index.ids_overlapping(anchor, cursor);
        let delta = SelectionDelta::replace(selection, &ids);
        self.owns_selection = true;

        (!delta.is_empty()).then_some(delta)
    }

    /// Ends the drag, keeping whatever was brushed.
    pub fn release(&mut self) {
        self.state = BrushState::Idle;
    }

    /// A click without dragging clears a selection made by this brush.
    /// Selections replaced from elsewhere are left alone.
    pub fn click(
        &mut self,
        index: &IntervalIndex,
        selection: &SelectionSet,
    ) -> Option<SelectionDelta> {
        if !index.is_selectable() {
            return None;
        }

        self.state = BrushState::Idle;

        if !std::mem::take(&mut self.owns_selection) {
            return None;
        }

        let delta = SelectionDelta::clear(selection);
        (!delta.is_empty()).then_some(delta)
    }

    /// Called when the selection was replaced by someone else; an
    /// ongoing drag starts over from the next cursor position.
    pub fn selection_updated(&mut self) {
        self.owns_selection = false;
        if let BrushState::Dragging { anchor, .. } = &mut self.state {
            *anchor = None;
        }
    }
}
