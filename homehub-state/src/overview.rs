//! Aggregate overview of everything currently active.
//!
//! The overview answers "what is on or open right now" in one payload:
//! lights that are on, and open covers classified into doors, windows, and
//! shutters. Window covers configured as door-like window types count as
//! doors.

use serde::{Deserialize, Serialize};

use crate::display::{CoverView, CoverViewType, LightView, WindowType};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverviewData {
    pub summaries: Vec<OverviewSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverviewSummary {
    pub counts: OverviewCounts,
    pub devices: OverviewDevices,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverviewCounts {
    pub lights_on: usize,
    pub doors_open: usize,
    pub shutters_open: usize,
    pub windows_open: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverviewDevices {
    pub lights_on: Vec<LightView>,
    pub doors_open: Vec<CoverView>,
    pub shutters_open: Vec<CoverView>,
    pub windows_open: Vec<CoverView>,
}

/// Window types that behave like doors in the overview.
const DOOR_LIKE_WINDOWS: [WindowType; 2] = [WindowType::Door, WindowType::SlidingDoor];

pub(crate) fn is_door(cover: &CoverView) -> bool {
    match cover.cover_type {
        Some(CoverViewType::Door) | Some(CoverViewType::GarageDoor) | Some(CoverViewType::Gate) => {
            true
        }
        Some(CoverViewType::Window) => cover
            .window_type
            .is_some_and(|w| DOOR_LIKE_WINDOWS.contains(&w)),
        _ => false,
    }
}

pub(crate) fn is_window(cover: &CoverView) -> bool {
    cover.cover_type == Some(CoverViewType::Window)
        && !cover
            .window_type
            .is_some_and(|w| DOOR_LIKE_WINDOWS.contains(&w))
}

/// Classify the active entities into one overview summary.
pub fn build_overview(active_lights: Vec<LightView>, active_covers: Vec<CoverView>) -> OverviewData {
    let doors: Vec<_> = active_covers.iter().filter(|c| is_door(c)).cloned().collect();
    let windows: Vec<_> = active_covers.iter().filter(|c| is_window(c)).cloned().collect();
    let shutters: Vec<_> = active_covers
        .iter()
        .filter(|c| c.cover_type == Some(CoverViewType::Shutter))
        .cloned()
        .collect();

    OverviewData {
        summaries: vec![OverviewSummary {
            counts: OverviewCounts {
                lights_on: active_lights.len(),
                doors_open: doors.len(),
                shutters_open: shutters.len(),
                windows_open: windows.len(),
            },
            devices: OverviewDevices {
                lights_on: active_lights,
                doors_open: doors,
                shutters_open: shutters,
                windows_open: windows,
            },
        }],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CoverPosition, OnOff};

    fn cover(ident: &str, cover_type: Option<CoverViewType>, window_type: Option<WindowType>) -> CoverView {
        CoverView {
            ident: ident.to_string(),
            cover_type,
            name: ident.to_string(),
            open_position: None,
            tilt_position: None,
            state: CoverPosition::Open,
            window_type,
            features: Vec::new(),
        }
    }

    fn light(ident: &str) -> LightView {
        LightView {
            ident: ident.to_string(),
            name: ident.to_string(),
            brightness: Some(200),
            state: OnOff::On,
        }
    }

    #[test]
    fn classifies_doors_windows_and_shutters() {
        let covers = vec![
            cover("cover.front", Some(CoverViewType::Door), None),
            cover("cover.garage", Some(CoverViewType::GarageDoor), None),
            cover("cover.kitchen", Some(CoverViewType::Window), None),
            cover("cover.south", Some(CoverViewType::Shutter), None),
            cover("cover.untyped", None, None),
        ];
        let overview = build_overview(vec![light("light.desk")], covers);

        let summary = &overview.summaries[0];
        assert_eq!(summary.counts.lights_on, 1);
        assert_eq!(summary.counts.doors_open, 2);
        assert_eq!(summary.counts.windows_open, 1);
        assert_eq!(summary.counts.shutters_open, 1);
        assert_eq!(summary.devices.doors_open[0].ident, "cover.front");
    }

    #[test]
    fn door_like_window_counts_as_door() {
        let covers = vec![
            cover(
                "cover.terrace",
                Some(CoverViewType::Window),
                Some(WindowType::SlidingDoor),
            ),
            cover(
                "cover.skylight",
                Some(CoverViewType::Window),
                Some(WindowType::Skylight),
            ),
        ];
        let overview = build_overview(Vec::new(), covers);

        let summary = &overview.summaries[0];
        assert_eq!(summary.counts.doors_open, 1);
        assert_eq!(summary.counts.windows_open, 1);
        assert_eq!(summary.devices.doors_open[0].ident, "cover.terrace");
        assert_eq!(summary.devices.windows_open[0].ident, "cover.skylight");
    }
}
