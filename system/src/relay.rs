use crate::{ConnectionId, DeliveryError, Outbound, RoomRegistry, ServerEvent, StrokeSegment};

#[derive(Debug, Default, PartialEq)]
pub struct RelayOutcome {
    pub delivered: Vec<ConnectionId>,
    pub failed: Vec<(ConnectionId, DeliveryError)>,
}

/// Forwards `segment` to every member of its room except `from`.
///
/// A sender that is not a member of the segment's room reaches nobody. A
/// failing receiver does not stop delivery to the others; it is reported
/// in the outcome instead.
pub fn relay_stroke<O: Outbound>(
    registry: &RoomRegistry,
    from: &ConnectionId,
    segment: &StrokeSegment,
    outbound: &mut O,
) -> RelayOutcome {
    let mut outcome = RelayOutcome::default();

    if !registry.is_member(&segment.room, from) {
        log::debug!(
            "Connection {} is not in room {:?}, stroke dropped",
            from,
            segment.room
        );
        return outcome;
    }

    for to in registry.members_except(&segment.room, from) {
        match outbound.deliver(&to, ServerEvent::Drawing(segment.clone())) {
            Ok(()) => outcome.delivered.push(to),
            Err(err) => {
                log::warn!("Stroke delivery to {} failed: {}", to, err);
                outcome.failed.push((to, err));
            }
        }
    }

    outcome
}
