//! Drag / resize gesture state machine for free-form element placement.
//!
//! `DragPositioner` owns the live box of one element together with the
//! geometry it must respect: the container bounds and an optional game area
//! that elements may never cover. Pointer events drive a three-state machine:
//!
//! ```text
//! Idle --down(body|handle)--> Dragging --up--> Idle
//! Idle --down(grip)---------> Resizing --up--> Idle
//! ```
//!
//! Handlers return [`Action`]s for the host. `CapturePointer` tells the host to
//! attach window-level move/up listeners; `ReleasePointer` tells it to detach
//! them. Exactly one of each is emitted per gesture so listeners never leak.
//!
//! A candidate box that would overlap the game area is rejected whole: the
//! element keeps its last valid position and size.

#[cfg(test)]
#[path = "drag_test.rs"]
mod drag_test;

use crate::consts::{HANDLE_SIZE_PX, MIN_HEIGHT, MIN_WIDTH, RESET_HEIGHT, RESET_WIDTH, RESET_X, RESET_Y};
use crate::geom::{Point, Rect, Size, clamp_origin};

/// Which part of the element received the pointer-down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitPart {
    /// The element body.
    Body,
    /// The dedicated drag handle rendered next to the element.
    DragHandle,
    /// The bottom-right resize grip.
    ResizeGrip,
}

/// Changes returned from gesture handlers for the host to process.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    /// The element moved to a new top-left corner.
    Moved(Point),
    /// The element took a new size.
    Resized(Size),
    /// A gesture started: attach pointer-move / pointer-up listeners.
    CapturePointer,
    /// The gesture ended: detach the listeners attached on capture.
    ReleasePointer,
}

/// Ephemeral gesture state. Created on pointer-down, dropped on pointer-up.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragState {
    /// No gesture in progress.
    #[default]
    Idle,
    /// Moving the element.
    Dragging {
        /// Pointer position minus element origin at pointer-down.
        offset: Point,
    },
    /// Resizing the element from its bottom-right corner.
    Resizing {
        /// Element origin at pointer-down; the new size is measured from here.
        origin: Point,
    },
}

/// Placement engine for a single element.
#[derive(Debug, Clone)]
pub struct DragPositioner {
    rect: Rect,
    container: Size,
    game_area: Option<Rect>,
    state: DragState,
}

impl DragPositioner {
    #[must_use]
    pub fn new(rect: Rect, container: Size) -> Self {
        Self { rect, container, game_area: None, state: DragState::Idle }
    }

    /// Reserve `area` for the game surface. The element may never overlap it.
    #[must_use]
    pub fn with_game_area(mut self, area: Rect) -> Self {
        self.game_area = Some(area);
        self
    }

    pub fn set_game_area(&mut self, area: Option<Rect>) {
        self.game_area = area;
    }

    pub fn set_container(&mut self, container: Size) {
        self.container = container;
    }

    // --- Queries ---

    #[must_use]
    pub fn rect(&self) -> Rect {
        self.rect
    }

    #[must_use]
    pub fn state(&self) -> DragState {
        self.state
    }

    /// Whether window-level listeners should currently be attached.
    #[must_use]
    pub fn is_capturing(&self) -> bool {
        !matches!(self.state, DragState::Idle)
    }

    /// Classify a pointer position against the element box.
    #[must_use]
    pub fn hit_test(&self, pointer: Point) -> Option<HitPart> {
        if !self.rect.contains(pointer) {
            return None;
        }
        let grip = Rect::new(
            self.rect.right() - HANDLE_SIZE_PX,
            self.rect.bottom() - HANDLE_SIZE_PX,
            HANDLE_SIZE_PX,
            HANDLE_SIZE_PX,
        );
        if grip.contains(pointer) {
            Some(HitPart::ResizeGrip)
        } else {
            Some(HitPart::Body)
        }
    }

    // --- Input events ---

    /// Start a gesture. Ignored while another gesture is active.
    pub fn on_pointer_down(&mut self, pointer: Point, part: HitPart) -> Vec<Action> {
        if self.is_capturing() {
            return Vec::new();
        }
        self.state = match part {
            HitPart::Body | HitPart::DragHandle => DragState::Dragging { offset: pointer.sub(self.rect.origin()) },
            HitPart::ResizeGrip => DragState::Resizing { origin: self.rect.origin() },
        };
        vec![Action::CapturePointer]
    }

    /// Advance the active gesture. Returns no actions when idle or when the
    /// candidate box is rejected.
    pub fn on_pointer_move(&mut self, pointer: Point) -> Vec<Action> {
        match self.state {
            DragState::Idle => Vec::new(),
            DragState::Dragging { offset } => self.drag_to(pointer.sub(offset)),
            DragState::Resizing { origin } => self.resize_to(pointer, origin),
        }
    }

    /// End the active gesture, whatever it was.
    pub fn on_pointer_up(&mut self) -> Vec<Action> {
        if !self.is_capturing() {
            return Vec::new();
        }
        self.state = DragState::Idle;
        vec![Action::ReleasePointer]
    }

    /// Restore the default geometry and end any gesture in progress.
    pub fn reset(&mut self) -> Vec<Action> {
        let mut actions = self.on_pointer_up();
        self.rect = Rect::new(RESET_X, RESET_Y, RESET_WIDTH, RESET_HEIGHT);
        actions.push(Action::Moved(self.rect.origin()));
        actions.push(Action::Resized(self.rect.size()));
        actions
    }

    // --- Internals ---

    fn drag_to(&mut self, candidate: Point) -> Vec<Action> {
        let size = self.rect.size();
        let origin = clamp_origin(candidate, size, self.container);
        let next = Rect::from_parts(origin, size);
        if self.blocked(&next) || next.origin() == self.rect.origin() {
            return Vec::new();
        }
        self.rect = next;
        vec![Action::Moved(origin)]
    }

    fn resize_to(&mut self, pointer: Point, origin: Point) -> Vec<Action> {
        let size = Size::new(
            (pointer.x - origin.x).max(MIN_WIDTH).min(self.container.width),
            (pointer.y - origin.y).max(MIN_HEIGHT).min(self.container.height),
        );
        let next = Rect::from_parts(clamp_origin(origin, size, self.container), size);
        if self.blocked(&next) || next == self.rect {
            return Vec::new();
        }

        let mut actions = Vec::with_capacity(2);
        if next.origin() != self.rect.origin() {
            actions.push(Action::Moved(next.origin()));
        }
        if next.size() != self.rect.size() {
            actions.push(Action::Resized(next.size()));
        }
        self.rect = next;
        actions
    }

    fn blocked(&self, candidate: &Rect) -> bool {
        self.game_area.as_ref().is_some_and(|area| candidate.overlaps(area))
    }
}
