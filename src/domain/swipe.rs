// src/domain/swipe.rs
//
// Gesture state machine for the topmost card of the discover stack.

use crate::domain::deal::DealStatus;
use std::time::Duration;

/// Horizontal distance (px) a release must pass to commit.
pub const COMMIT_THRESHOLD_PX: f64 = 100.0;

/// How long the fly-out animation runs before the card is removed.
pub const COMMIT_DELAY: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
}

impl Direction {
    pub fn status(self) -> DealStatus {
        match self {
            Direction::Right => DealStatus::Saved,
            Direction::Left => DealStatus::Deleted,
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "left" => Some(Direction::Left),
            "right" => Some(Direction::Right),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SwipePhase {
    Idle,
    Dragging { start_x: f64, offset: f64 },
    CommittingRight,
    CommittingLeft,
    SnappingBack,
}

/// What a finished commit asks the list state to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Commit {
    pub deal_id: i64,
    pub status: DealStatus,
}

/// Badge opacities while dragging, each in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Indicator {
    pub like: f64,
    pub nope: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SwipeEngine {
    top: Option<i64>,
    phase: SwipePhase,
}

impl Default for SwipeEngine {
    fn default() -> Self {
        Self::new(None)
    }
}

impl SwipeEngine {
    pub fn new(top: Option<i64>) -> Self {
        Self {
            top,
            phase: SwipePhase::Idle,
        }
    }

    /// Re-binds to a new topmost card (or none, which means the stack is empty).
    pub fn bind(&mut self, top: Option<i64>) {
        self.top = top;
        self.phase = SwipePhase::Idle;
    }

    pub fn top(&self) -> Option<i64> {
        self.top
    }

    pub fn phase(&self) -> SwipePhase {
        self.phase
    }

    pub fn is_empty(&self) -> bool {
        self.top.is_none()
    }

    /// Returns false when `card` is not the bound topmost card.
    pub fn pointer_down(&mut self, card: i64, x: f64) -> bool {
        if self.top != Some(card) {
            return false;
        }
        match self.phase {
            SwipePhase::Idle | SwipePhase::SnappingBack => {
                self.phase = SwipePhase::Dragging {
                    start_x: x,
                    offset: 0.0,
                };
                true
            }
            _ => false,
        }
    }

    pub fn drag_to(&mut self, x: f64) {
        if let SwipePhase::Dragging { start_x, .. } = self.phase {
            self.phase = SwipePhase::Dragging {
                start_x,
                offset: x - start_x,
            };
        }
    }

    pub fn offset(&self) -> f64 {
        match self.phase {
            SwipePhase::Dragging { offset, .. } => offset,
            _ => 0.0,
        }
    }

    pub fn indicator(&self) -> Indicator {
        let offset = self.offset();
        let strength = (offset.abs() / COMMIT_THRESHOLD_PX).min(1.0);
        if offset > 0.0 {
            Indicator {
                like: strength,
                nope: 0.0,
            }
        } else {
            Indicator {
                like: 0.0,
                nope: strength,
            }
        }
    }

    /// Ends a drag. Anything inside the threshold snaps back without side effects.
    pub fn release(&mut self) -> SwipePhase {
        let SwipePhase::Dragging { offset, .. } = self.phase else {
            return self.phase;
        };
        self.phase = if offset > COMMIT_THRESHOLD_PX {
            SwipePhase::CommittingRight
        } else if offset < -COMMIT_THRESHOLD_PX {
            SwipePhase::CommittingLeft
        } else {
            SwipePhase::SnappingBack
        };
        self.phase
    }

    /// Programmatic commit of the topmost card, skipping the drag.
    pub fn force(&mut self, direction: Direction) -> SwipePhase {
        if self.top.is_none() || self.committing().is_some() {
            return self.phase;
        }
        self.phase = match direction {
            Direction::Right => SwipePhase::CommittingRight,
            Direction::Left => SwipePhase::CommittingLeft,
        };
        self.phase
    }

    pub fn committing(&self) -> Option<Direction> {
        match self.phase {
            SwipePhase::CommittingRight => Some(Direction::Right),
            SwipePhase::CommittingLeft => Some(Direction::Left),
            _ => None,
        }
    }

    /// Called once `COMMIT_DELAY` has passed. Unbinds the card; the caller
    /// applies the commit and binds the next top card.
    pub fn complete(&mut self) -> Option<Commit> {
        let direction = self.committing()?;
        let deal_id = self.top.take()?;
        self.phase = SwipePhase::Idle;
        Some(Commit {
            deal_id,
            status: direction.status(),
        })
    }

    /// Convenience for a whole gesture reported at release time.
    pub fn swipe(&mut self, card: i64, offset: f64) -> SwipePhase {
        if !self.pointer_down(card, 0.0) {
            return self.phase;
        }
        self.drag_to(offset);
        self.release()
    }
}
