//! Per-vehicle state retained across polling cycles.

use serde::{Deserialize, Serialize};

use crate::models::{AltitudeFix, GeoPosition, Vehicle, VehicleState};

/// Latest known state of both monitored vehicles.
///
/// Owned by a single monitor; never shared between instances.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StateStore {
    vehicles: [VehicleState; 2],
}

impl StateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge the reports one link delivered this cycle. Missing reports are a no-op.
    pub fn update(
        &mut self,
        vehicle: Vehicle,
        position: Option<GeoPosition>,
        altitude: Option<AltitudeFix>,
    ) {
        self.vehicles[vehicle.index()].apply(position, altitude);
    }

    pub fn get(&self, vehicle: Vehicle) -> &VehicleState {
        &self.vehicles[vehicle.index()]
    }

    pub fn pair(&self) -> (&VehicleState, &VehicleState) {
        (&self.vehicles[0], &self.vehicles[1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn updates_are_routed_per_vehicle() {
        let mut store = StateStore::new();
        store.update(Vehicle::First, Some(GeoPosition::new(1.0, 1.0)), None);
        store.update(Vehicle::Second, None, Some(AltitudeFix::new(2, 30.0)));

        assert_eq!(store.get(Vehicle::First).position, Some(GeoPosition::new(1.0, 1.0)));
        assert_eq!(store.get(Vehicle::First).altitude_m, None);
        assert_eq!(store.get(Vehicle::Second).position, None);
        assert_eq!(store.get(Vehicle::Second).system_id, Some(2));
    }

    #[test]
    fn stale_position_carries_forward() {
        let mut store = StateStore::new();
        store.update(Vehicle::First, Some(GeoPosition::new(10.0, 20.0)), None);
        let before = store.get(Vehicle::First).position;

        store.update(Vehicle::First, None, Some(AltitudeFix::new(1, 12.0)));
        store.update(Vehicle::First, None, None);

        assert_eq!(store.get(Vehicle::First).position, before);
        assert_eq!(store.get(Vehicle::First).altitude_m, Some(12.0));
    }
}
