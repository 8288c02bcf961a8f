//! Best-effort hold command dispatch.
//!
//! Commands are issued every cycle the pair stays in danger. There is no
//! retry, de-duplication or acknowledgment tracking: a returned `HoldAction`
//! only means the command was handed to the link.

use crate::link::TelemetryLink;
use crate::models::{HoldAction, Vehicle};
use crate::store::StateStore;

/// Send a hold command to every vehicle with a known system id, each over its own link.
pub async fn dispatch_holds<L: TelemetryLink>(
    links: &mut [L; 2],
    store: &StateStore,
) -> Vec<HoldAction> {
    let mut actions = Vec::with_capacity(2);
    for vehicle in Vehicle::BOTH {
        let Some(system_id) = store.get(vehicle).system_id else {
            tracing::warn!(?vehicle, "Skipping hold command, system id unknown");
            continue;
        };
        links[vehicle.index()].send_hold_command(system_id).await;
        tracing::info!(?vehicle, system_id, "Requested hold mode");
        actions.push(HoldAction { vehicle, system_id });
    }
    actions
}
