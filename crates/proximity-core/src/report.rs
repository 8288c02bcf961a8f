//! Human-readable status lines for the continuous monitor.

use serde::Serialize;

use crate::models::{HoldAction, ProximityResult, ProximityStatus, SystemId};
use crate::rules::SeparationThresholds;

/// Everything one continuous-mode cycle produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CycleReport {
    pub result: ProximityResult,
    pub thresholds: SeparationThresholds,
    /// Unrounded horizontal distance is inside the horizontal minimum
    pub horizontally_close: bool,
    pub actions: Vec<HoldAction>,
}

impl CycleReport {
    /// Render the cycle as `[WARNING]`/`[INFO]`/`[ACTION]` lines.
    ///
    /// A cycle without both positions renders nothing.
    pub fn status_lines(&self) -> Vec<String> {
        let result = &self.result;
        let Some(horizontal) = result.horizontal_distance_m else {
            return Vec::new();
        };
        let (drone1, drone2) = (drone_label(result.sysid1), drone_label(result.sysid2));

        let mut lines = Vec::with_capacity(1 + self.actions.len());
        match (result.status, result.vertical_distance_m) {
            (ProximityStatus::Danger, Some(vertical)) => lines.push(format!(
                "[WARNING] Drone {drone1} and Drone {drone2} too close! H: {horizontal:.2} m, V: {vertical:.2} m"
            )),
            (_, vertical) if self.horizontally_close => {
                let axis = if vertical.is_some() { "safe" } else { "unknown" };
                lines.push(format!(
                    "[INFO] Drone {drone1} and Drone {drone2} close (H: {horizontal:.2} m), vertical separation {axis}"
                ));
            }
            (_, Some(vertical)) => {
                lines.push(format!("[INFO] Safe. H: {horizontal:.2} m, V: {vertical:.2} m"))
            }
            (_, None) => lines.push(format!("[INFO] Safe. H: {horizontal:.2} m")),
        }

        for action in &self.actions {
            lines.push(format!(
                "[ACTION] Requested Drone {} to switch to hold mode.",
                action.system_id
            ));
        }
        lines
    }
}

fn drone_label(system_id: Option<SystemId>) -> String {
    system_id.map_or_else(|| "unknown".to_string(), |id| id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Vehicle;

    fn report(
        horizontal: Option<f64>,
        vertical: Option<f64>,
        status: ProximityStatus,
        actions: Vec<HoldAction>,
    ) -> CycleReport {
        CycleReport {
            result: ProximityResult {
                horizontal_distance_m: horizontal,
                vertical_distance_m: vertical,
                status,
                sysid1: Some(1),
                sysid2: Some(2),
            },
            thresholds: SeparationThresholds::default(),
            horizontally_close: horizontal.is_some_and(|h| h < 15.0),
            actions,
        }
    }

    #[test]
    fn danger_renders_warning_and_actions() {
        let actions = vec![
            HoldAction { vehicle: Vehicle::First, system_id: 1 },
            HoldAction { vehicle: Vehicle::Second, system_id: 2 },
        ];
        let lines = report(Some(11.12), Some(2.0), ProximityStatus::Danger, actions).status_lines();
        assert_eq!(
            lines,
            vec![
                "[WARNING] Drone 1 and Drone 2 too close! H: 11.12 m, V: 2.00 m",
                "[ACTION] Requested Drone 1 to switch to hold mode.",
                "[ACTION] Requested Drone 2 to switch to hold mode.",
            ]
        );
    }

    #[test]
    fn horizontally_close_but_vertically_separated_is_info() {
        let lines = report(Some(8.0), Some(20.0), ProximityStatus::Safe, vec![]).status_lines();
        assert_eq!(
            lines,
            vec!["[INFO] Drone 1 and Drone 2 close (H: 8.00 m), vertical separation safe"]
        );
    }

    #[test]
    fn close_line_follows_unrounded_distance() {
        // 14.996 m rounds to 15.00 m but is still inside a 15 m minimum.
        let mut cycle = report(Some(15.0), Some(40.0), ProximityStatus::Safe, vec![]);
        cycle.horizontally_close = true;
        assert_eq!(
            cycle.status_lines(),
            vec!["[INFO] Drone 1 and Drone 2 close (H: 15.00 m), vertical separation safe"]
        );
    }

    #[test]
    fn horizontally_close_without_vertical_says_unknown() {
        let mut cycle = report(Some(8.0), None, ProximityStatus::Safe, vec![]);
        cycle.result.sysid2 = None;
        assert_eq!(
            cycle.status_lines(),
            vec!["[INFO] Drone 1 and Drone unknown close (H: 8.00 m), vertical separation unknown"]
        );
    }

    #[test]
    fn far_apart_is_safe_line() {
        let with_vertical = report(Some(120.5), Some(3.25), ProximityStatus::Safe, vec![]);
        assert_eq!(with_vertical.status_lines(), vec!["[INFO] Safe. H: 120.50 m, V: 3.25 m"]);

        let without_vertical = report(Some(120.5), None, ProximityStatus::Safe, vec![]);
        assert_eq!(without_vertical.status_lines(), vec!["[INFO] Safe. H: 120.50 m"]);
    }

    #[test]
    fn no_data_prints_nothing() {
        let cycle = report(None, None, ProximityStatus::NoData, vec![]);
        assert!(cycle.status_lines().is_empty());
    }
}
