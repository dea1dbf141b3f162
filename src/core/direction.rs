// chargelog - core/direction.rs
//
// Direction resolution: who originated a frame.
// Resolution order: explicit transport marker wins outright, then the
// classified action is looked up in the two static command lists, else
// Unknown. Unknown matches neither direction filter.

use crate::core::frame;
use crate::core::model::{Direction, MessageType, ParsedFrame};
use crate::util::constants::{CHARGER_ACTIONS, SERVER_ACTIONS};

/// Look up an action name in the static command lists.
pub fn direction_for_action(action: &str) -> Direction {
    if CHARGER_ACTIONS.contains(&action) {
        Direction::ChargerToServer
    } else if SERVER_ACTIONS.contains(&action) {
        Direction::ServerToCharger
    } else {
        Direction::Unknown
    }
}

/// Resolve the direction of one log record.
///
/// The raw message text is consulted first because the marker reflects what
/// the transport actually saw; the action lists are a fallback for lines
/// whose marker was lost in capture. Only Call frames carry an
/// authoritative action, so replies without a marker stay Unknown.
pub fn resolve(message: &str, parsed: Option<&ParsedFrame>) -> Direction {
    if let Some(direction) = frame::marker_direction(message) {
        return direction;
    }

    if let Some(f) = parsed {
        if f.message_type == MessageType::Call {
            if let Some(action) = f.action.as_deref() {
                return direction_for_action(action);
            }
        }
    }

    Direction::Unknown
}
