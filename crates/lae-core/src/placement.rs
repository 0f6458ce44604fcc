//! Lane assignment for events inside a `(date, slot)` cell.
//!
//! Lane 0 is the primary lane and holds at most one event. Lanes above 0
//! stack freely. The rules here are pure; the repository feeds them the
//! lanes already taken by other events in the target cell.

use crate::error::CoreError;

/// How the caller asked for a lane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaneRequest {
    /// Caller named a lane. A taken lane 0 is an error.
    Explicit(i64),
    /// Caller left it open: the primary lane if free, otherwise on top of
    /// the cell.
    Auto,
}

impl LaneRequest {
    /// Request shape for a create, or for an update that moves the event.
    pub fn from_requested(requested: Option<i64>) -> Self {
        requested.map_or(LaneRequest::Auto, LaneRequest::Explicit)
    }
}

/// Outcome of a placement decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub canvas_position_y: i64,
    /// True when the event was pushed off the primary lane.
    pub stacked: bool,
}

/// Picks the lane for an event given the lanes of every *other* event in
/// the target `(date, slot)`.
///
/// When the primary lane is taken and the request is implicit, the event
/// goes to lane `occupied_lanes.len()`, the number of events already in the
/// cell.
pub fn resolve_placement(request: LaneRequest, occupied_lanes: &[i64]) -> Result<Placement, CoreError> {
    let primary_taken = occupied_lanes.contains(&0);
    match request {
        LaneRequest::Explicit(lane) if lane < 0 => Err(CoreError::Validation(format!(
            "canvas_position_y must be zero or positive, got {lane}"
        ))),
        LaneRequest::Explicit(0) if primary_taken => Err(CoreError::slot_occupied()),
        LaneRequest::Explicit(lane) => Ok(Placement {
            canvas_position_y: lane,
            stacked: false,
        }),
        LaneRequest::Auto if primary_taken => Ok(Placement {
            canvas_position_y: occupied_lanes.len() as i64,
            stacked: true,
        }),
        LaneRequest::Auto => Ok(Placement {
            canvas_position_y: 0,
            stacked: false,
        }),
    }
}
