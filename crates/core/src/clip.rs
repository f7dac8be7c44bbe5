//! Clip records as reported by the appliance.
//!
//! The appliance returns each clip as a positional array:
//! `[camera, [startSecs, startMs], [stopSecs, stopMs],
//! [thumbSecs, thumbMs], displayTime, [[objectId, objectType], ...]]`.
//! [`ClipRecord::from_wire`] decodes that shape; [`ClipRecord::key`]
//! derives the identity used for cache deduplication.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Composite appliance timestamp: whole epoch seconds plus a
/// millisecond remainder. Serializes as the wire pair `[secs, millis]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "(i64, i64)", into = "(i64, i64)")]
pub struct ClipTime {
    pub epoch_secs: i64,
    pub millis: i64,
}

impl ClipTime {
    pub fn new(epoch_secs: i64, millis: i64) -> Self {
        Self { epoch_secs, millis }
    }

    /// Fractional epoch seconds (`secs + millis / 1000`).
    pub fn as_secs_f64(&self) -> f64 {
        self.epoch_secs as f64 + self.millis as f64 / 1000.0
    }
}

impl From<(i64, i64)> for ClipTime {
    fn from((epoch_secs, millis): (i64, i64)) -> Self {
        Self { epoch_secs, millis }
    }
}

impl From<ClipTime> for (i64, i64) {
    fn from(t: ClipTime) -> Self {
        (t.epoch_secs, t.millis)
    }
}

/// One detected object within a clip. Wire shape: `[id, type]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(i64, String)", into = "(i64, String)")]
pub struct ClipObject {
    pub id: i64,
    pub kind: String,
}

impl From<(i64, String)> for ClipObject {
    fn from((id, kind): (i64, String)) -> Self {
        Self { id, kind }
    }
}

impl From<ClipObject> for (i64, String) {
    fn from(o: ClipObject) -> Self {
        (o.id, o.kind)
    }
}

/// Cache identity of a clip: camera name concatenated with the whole
/// start-time seconds.
///
/// The millisecond component is deliberately excluded -- two clips on
/// the same camera starting within the same second collide, and
/// dedup behavior elsewhere relies on exactly this key shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClipKey(String);

impl ClipKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClipKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One server-reported clip occurrence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipRecord {
    pub camera_name: String,
    pub start_time: ClipTime,
    pub stop_time: ClipTime,
    pub thumbnail_time: ClipTime,
    /// Pre-formatted display string; opaque to this crate.
    pub display_time: String,
    pub objects: Vec<ClipObject>,
}

impl ClipRecord {
    /// Identity under which this clip is cached.
    pub fn key(&self) -> ClipKey {
        ClipKey(format!("{}{}", self.camera_name, self.start_time.epoch_secs))
    }

    /// IDs of all detected objects, in reported order.
    pub fn object_ids(&self) -> Vec<i64> {
        self.objects.iter().map(|o| o.id).collect()
    }

    /// Decode a raw positional clip tuple.
    pub fn from_wire(value: &serde_json::Value) -> Result<Self, CoreError> {
        let fields = value
            .as_array()
            .ok_or_else(|| malformed("clip tuple is not an array", value))?;
        if fields.len() < 6 {
            return Err(malformed("clip tuple has fewer than 6 elements", value));
        }

        let camera_name = fields[0]
            .as_str()
            .ok_or_else(|| malformed("camera name is not a string", value))?
            .to_string();
        let display_time = fields[4]
            .as_str()
            .ok_or_else(|| malformed("display time is not a string", value))?
            .to_string();

        let objects = fields[5]
            .as_array()
            .ok_or_else(|| malformed("object list is not an array", value))?
            .iter()
            .map(object_from_wire)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            camera_name,
            start_time: time_from_wire(&fields[1])?,
            stop_time: time_from_wire(&fields[2])?,
            thumbnail_time: time_from_wire(&fields[3])?,
            display_time,
            objects,
        })
    }
}

fn time_from_wire(value: &serde_json::Value) -> Result<ClipTime, CoreError> {
    let pair = value
        .as_array()
        .filter(|a| a.len() == 2)
        .ok_or_else(|| malformed("timestamp is not a [secs, millis] pair", value))?;
    let epoch_secs = pair[0]
        .as_i64()
        .ok_or_else(|| malformed("timestamp seconds is not an integer", value))?;
    let millis = pair[1]
        .as_i64()
        .ok_or_else(|| malformed("timestamp millis is not an integer", value))?;
    Ok(ClipTime { epoch_secs, millis })
}

fn object_from_wire(value: &serde_json::Value) -> Result<ClipObject, CoreError> {
    let pair = value
        .as_array()
        .filter(|a| a.len() == 2)
        .ok_or_else(|| malformed("object entry is not an [id, type] pair", value))?;
    let id = pair[0]
        .as_i64()
        .ok_or_else(|| malformed("object id is not an integer", value))?;
    let kind = pair[1]
        .as_str()
        .ok_or_else(|| malformed("object type is not a string", value))?
        .to_string();
    Ok(ClipObject { id, kind })
}

fn malformed(reason: &str, value: &serde_json::Value) -> CoreError {
    CoreError::MalformedClip(format!("{reason}: {value}"))
}
