//! Cameras and rules as reported by the appliance.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Pseudo-camera name that queries clips across every camera.
pub const ANY_CAMERA: &str = "Any camera";

/// Built-in rule names understood by every camera.
pub const BUILTIN_RULES: &[&str] = &[
    "All objects",
    "People",
    "Vehicles",
    "Animals",
    "Unknown objects",
];

/// A detection rule attached to a camera.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub name: String,
    pub schedule: String,
    pub enabled: bool,
}

/// One camera as reported by the appliance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub name: String,
    pub active: bool,
    pub enabled: bool,
    pub frozen: bool,
    #[serde(default)]
    pub live_jpeg_uri: String,
    #[serde(default)]
    pub live_h264_uri: String,
    pub status: String,
    #[serde(default)]
    pub rules: Vec<Rule>,
}

/// Derived connection state of a camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraState {
    Off,
    Connecting,
    Connected,
    Failed,
    NoScheduledRules,
    Unknown,
}

impl Camera {
    /// Derive the displayable connection state.
    ///
    /// Order matters: a disabled camera is Off regardless of status,
    /// and a camera without a live H264 URI is still connecting.
    pub fn state(&self) -> CameraState {
        if !self.enabled {
            return CameraState::Off;
        }
        if self.status == "failed" {
            return CameraState::Failed;
        }
        if self.status == "on" || self.status == "off" {
            return CameraState::NoScheduledRules;
        }
        if self.live_h264_uri.is_empty() {
            return CameraState::Connecting;
        }
        CameraState::Connected
    }

    /// Whether `rule_name` applies to this camera. Built-in rules
    /// always match.
    pub fn contains_rule(&self, rule_name: &str) -> bool {
        BUILTIN_RULES.contains(&rule_name) || self.rules.iter().any(|r| r.name == rule_name)
    }
}

/// Totals across the active cameras.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CameraCount {
    pub total: u32,
    pub turned_on: u32,
}

/// Name-sorted set of cameras, refreshed wholesale from the appliance.
#[derive(Debug, Clone, Default)]
pub struct CameraDirectory {
    cameras: BTreeMap<String, Camera>,
}

impl CameraDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole directory with a fresh appliance listing.
    pub fn replace_all(&mut self, cameras: Vec<Camera>) {
        self.cameras = cameras.into_iter().map(|c| (c.name.clone(), c)).collect();
    }

    /// Insert or update a single camera (used after per-camera refresh).
    pub fn insert(&mut self, camera: Camera) {
        self.cameras.insert(camera.name.clone(), camera);
    }

    pub fn get(&self, name: &str) -> Option<&Camera> {
        self.cameras.get(name)
    }

    pub fn len(&self) -> usize {
        self.cameras.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cameras.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Camera> {
        self.cameras.values()
    }

    /// Cameras that are active and not frozen, in name order.
    pub fn active_cameras(&self) -> impl Iterator<Item = &Camera> {
        self.cameras.values().filter(|c| c.active && !c.frozen)
    }

    /// Count active cameras and how many of them are turned on.
    pub fn counts(&self) -> CameraCount {
        let mut count = CameraCount::default();
        for camera in self.cameras.values() {
            if camera.active && !camera.frozen {
                count.total += 1;
            }
            if camera.active && camera.enabled {
                count.turned_on += 1;
            }
        }
        count
    }

    /// Name of the first camera with live video, falling back to the
    /// first active camera when none is streaming yet.
    pub fn first_live_camera(&self) -> Option<&str> {
        let mut first_active = None;
        for camera in self.cameras.values() {
            if !camera.active {
                continue;
            }
            if first_active.is_none() {
                first_active = Some(camera.name.as_str());
            }
            if camera.live_h264_uri.is_empty() || camera.status == "failed" {
                continue;
            }
            return Some(camera.name.as_str());
        }
        first_active
    }

    /// Whether `rule_name` is valid for `camera_name` in this
    /// directory. The pseudo-camera and built-in rules always match.
    pub fn camera_contains_rule(&self, camera_name: &str, rule_name: &str) -> bool {
        if camera_name == ANY_CAMERA || BUILTIN_RULES.contains(&rule_name) {
            return true;
        }
        match self.cameras.get(camera_name) {
            Some(camera) => camera.contains_rule(rule_name),
            None => false,
        }
    }
}
