//! Project configuration documents.
//!
//! Mirrors the structure of the `projects` container documents: a project
//! holds its physical cameras (with per-daytime counting-model schedules)
//! and its areas, each covered by camera configurations that carry the
//! position and masking settings.

use std::collections::HashMap;
use std::fmt;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::prediction::{AreaMapping, CameraPosition, ProjectMapping};

/// Counting model weights selectable per camera and schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CountingModel {
    #[serde(rename = "model_nwpu.pth")]
    #[default]
    Standard,
    #[serde(rename = "model_0725.pth")]
    Lightshow,
}

/// A time of day with second granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeAtDay {
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
}

impl TimeAtDay {
    /// Convert to a `NaiveTime`, clamping out-of-range components to midnight.
    pub fn to_time(self) -> NaiveTime {
        NaiveTime::from_hms_opt(self.hour, self.minute, self.second)
            .unwrap_or(NaiveTime::MIN)
    }
}

/// A daily schedule during which a specific counting model is active.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSchedule {
    pub id: String,
    pub name: String,
    pub start: TimeAtDay,
    pub end: TimeAtDay,
    pub model: CountingModel,
}

impl ModelSchedule {
    /// Whether this schedule is active at the given time of day.
    ///
    /// An interval whose start is after its end spans midnight.
    pub fn is_active(&self, check_time: NaiveTime) -> bool {
        let start = self.start.to_time();
        let end = self.end.to_time();

        if start <= end {
            start <= check_time && check_time <= end
        } else {
            start <= check_time || check_time <= end
        }
    }
}

/// Returns true when two daily schedules overlap, accounting for intervals
/// that span midnight.
fn schedules_overlap(a: &ModelSchedule, b: &ModelSchedule) -> bool {
    let (start1, end1) = (a.start.to_time(), a.end.to_time());
    let (start2, end2) = (b.start.to_time(), b.end.to_time());

    match (start1 <= end1, start2 <= end2) {
        // Neither spans midnight: standard interval intersection.
        (true, true) => start1 <= end2 && start2 <= end1,
        // First spans midnight.
        (false, true) => start2 >= start1 || end2 <= end1,
        // Second spans midnight.
        (true, false) => start1 >= start2 || end1 <= end2,
        // Both span midnight: both contain the instant before midnight.
        (false, false) => true,
    }
}

/// Errors raised when validating a project configuration document.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProjectConfigError {
    #[error("Schedules '{first}' and '{second}' have overlapping time ranges")]
    OverlappingSchedules { first: String, second: String },
}

/// A physical camera with its counting-model schedules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub id: String,
    pub name: String,
    pub resolution: (u32, u32),
    #[serde(default)]
    pub sensor_size: Option<(f64, f64)>,
    #[serde(default)]
    pub coordinates_3d: Option<(f64, f64, f64)>,
    #[serde(default)]
    pub default_model: Option<CountingModel>,
    #[serde(default)]
    pub model_schedules: Vec<ModelSchedule>,
}

impl Camera {
    /// Validate that no two model schedules overlap.
    pub fn validate_schedules(&self) -> Result<(), ProjectConfigError> {
        for (i, first) in self.model_schedules.iter().enumerate() {
            for second in self.model_schedules.iter().skip(i + 1) {
                if schedules_overlap(first, second) {
                    return Err(ProjectConfigError::OverlappingSchedules {
                        first: first.id.clone(),
                        second: second.id.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// The counting model active at the given time of day.
    ///
    /// Falls back to the camera's default model when no schedule matches.
    pub fn active_model(&self, current_time: NaiveTime) -> CountingModel {
        self.model_schedules
            .iter()
            .find(|schedule| schedule.is_active(current_time))
            .map(|schedule| schedule.model)
            .unwrap_or_else(|| self.default_model.unwrap_or_default())
    }
}

/// A named viewing position of a camera.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub name: String,
    #[serde(default)]
    pub center_ground_plane: Option<(f64, f64)>,
    #[serde(default)]
    pub focal_length: Option<f64>,
}

/// Polygon edges of an area mask, in pixel coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct MaskingConfig {
    #[serde(default)]
    pub edges: Vec<(i64, i64)>,
}

/// A camera assigned to an area, with its position and masking settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraConfig {
    pub id: String,
    pub name: String,
    pub camera_id: String,
    pub position: Position,
    pub enable_heatmap: bool,
    #[serde(default)]
    pub heatmap_config: Option<(u32, u32, u32, u32)>,
    pub enable_interpolation: bool,
    pub enable_masking: bool,
    #[serde(default)]
    pub masking_config: Option<MaskingConfig>,
}

/// A spatial zone covered by one or more camera configurations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Area {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub camera_configs: Vec<CameraConfig>,
}

/// A project configuration document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub cameras: Vec<Camera>,
    #[serde(default)]
    pub areas: Vec<Area>,
}

impl Project {
    /// Derive the camera-area mapping from this project's configuration.
    ///
    /// Every camera config of every area contributes one `CameraPosition`
    /// (carrying its masking flag) to that area's mapping, in document order.
    pub fn area_mappings(&self) -> ProjectMapping {
        let mut areas = HashMap::new();

        for area in &self.areas {
            let cameras: Vec<CameraPosition> = area
                .camera_configs
                .iter()
                .map(|config| CameraPosition {
                    camera_id: config.camera_id.clone(),
                    position: config.position.name.clone(),
                    enable_masking: config.enable_masking,
                })
                .collect();

            areas.insert(
                area.id.clone(),
                AreaMapping {
                    area_id: area.id.clone(),
                    cameras,
                },
            );
        }

        ProjectMapping {
            project_id: self.id.clone(),
            areas,
        }
    }
}

impl fmt::Display for Project {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Project '{}' with {} cameras and {} areas",
            self.id,
            self.cameras.len(),
            self.areas.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schedule(id: &str, start: (u32, u32), end: (u32, u32)) -> ModelSchedule {
        ModelSchedule {
            id: id.to_string(),
            name: id.to_string(),
            start: TimeAtDay {
                hour: start.0,
                minute: start.1,
                second: 0,
            },
            end: TimeAtDay {
                hour: end.0,
                minute: end.1,
                second: 0,
            },
            model: CountingModel::Lightshow,
        }
    }

    fn camera_with(schedules: Vec<ModelSchedule>) -> Camera {
        Camera {
            id: "cam1".to_string(),
            name: "Camera 1".to_string(),
            resolution: (1920, 1080),
            sensor_size: None,
            coordinates_3d: None,
            default_model: Some(CountingModel::Standard),
            model_schedules: schedules,
        }
    }

    #[test]
    fn test_schedule_active_same_day() {
        let s = schedule("day", (8, 0), (18, 0));
        assert!(s.is_active(NaiveTime::from_hms_opt(12, 0, 0).unwrap()));
        assert!(!s.is_active(NaiveTime::from_hms_opt(19, 0, 0).unwrap()));
    }

    #[test]
    fn test_schedule_active_across_midnight() {
        let s = schedule("night", (22, 0), (4, 0));
        assert!(s.is_active(NaiveTime::from_hms_opt(23, 30, 0).unwrap()));
        assert!(s.is_active(NaiveTime::from_hms_opt(2, 0, 0).unwrap()));
        assert!(!s.is_active(NaiveTime::from_hms_opt(12, 0, 0).unwrap()));
    }

    #[test]
    fn test_active_model_falls_back_to_default() {
        let camera = camera_with(vec![schedule("evening", (20, 0), (23, 0))]);
        assert_eq!(
            camera.active_model(NaiveTime::from_hms_opt(21, 0, 0).unwrap()),
            CountingModel::Lightshow
        );
        assert_eq!(
            camera.active_model(NaiveTime::from_hms_opt(10, 0, 0).unwrap()),
            CountingModel::Standard
        );
    }

    #[test]
    fn test_validate_schedules_detects_overlap() {
        let camera = camera_with(vec![
            schedule("a", (8, 0), (12, 0)),
            schedule("b", (11, 0), (14, 0)),
        ]);
        assert_eq!(
            camera.validate_schedules(),
            Err(ProjectConfigError::OverlappingSchedules {
                first: "a".to_string(),
                second: "b".to_string(),
            })
        );
    }

    #[test]
    fn test_validate_schedules_disjoint_ok() {
        let camera = camera_with(vec![
            schedule("a", (8, 0), (12, 0)),
            schedule("b", (13, 0), (18, 0)),
        ]);
        assert!(camera.validate_schedules().is_ok());
    }

    #[test]
    fn test_validate_schedules_both_span_midnight() {
        let camera = camera_with(vec![
            schedule("a", (22, 0), (2, 0)),
            schedule("b", (23, 0), (1, 0)),
        ]);
        assert!(camera.validate_schedules().is_err());
    }

    #[test]
    fn test_counting_model_wire_names() {
        assert_eq!(
            serde_json::to_string(&CountingModel::Standard).unwrap(),
            r#""model_nwpu.pth""#
        );
        assert_eq!(
            serde_json::to_string(&CountingModel::Lightshow).unwrap(),
            r#""model_0725.pth""#
        );
    }

    #[test]
    fn test_area_mappings_from_document() {
        let doc = serde_json::json!({
            "id": "demo",
            "name": "Demo Project",
            "cameras": [],
            "areas": [
                {
                    "id": "entrance",
                    "name": "Entrance",
                    "camera_configs": [
                        {
                            "id": "cfg1",
                            "name": "Entrance north",
                            "camera_id": "cam1",
                            "position": { "name": "standard" },
                            "enable_heatmap": false,
                            "enable_interpolation": true,
                            "enable_masking": true
                        },
                        {
                            "id": "cfg2",
                            "name": "Entrance south",
                            "camera_id": "cam2",
                            "position": { "name": "wide" },
                            "enable_heatmap": false,
                            "enable_interpolation": true,
                            "enable_masking": false
                        }
                    ]
                }
            ]
        });
        let project: Project = serde_json::from_value(doc).unwrap();
        let mapping = project.area_mappings();

        assert_eq!(mapping.project_id, "demo");
        let area = mapping.get_area("entrance").unwrap();
        assert_eq!(area.cameras.len(), 2);
        assert_eq!(area.cameras[0].camera_id, "cam1");
        assert!(area.cameras[0].enable_masking);
        assert_eq!(area.cameras[1].position, "wide");
        assert!(!area.cameras[1].enable_masking);
    }
}
