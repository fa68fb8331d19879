use chrono::{DateTime, Utc};
use serde::Serialize;

/// Nominal accuracy attached to parsed points; GPX rarely encodes real values.
pub const NOMINAL_HORIZONTAL_ACCURACY_M: f64 = 10.0;
pub const NOMINAL_VERTICAL_ACCURACY_M: f64 = 15.0;

/// A parsed GPX file: tracks plus standalone waypoints.
///
/// A file with zero tracks and zero waypoints is valid but empty; callers
/// detect "nothing to show" by checking `tracks.is_empty()`.
#[derive(Debug, Default, Serialize)]
pub struct GpxFile {
    pub filename: String,
    pub tracks: Vec<Track>,
    pub waypoints: Vec<Waypoint>,
}

impl GpxFile {
    pub fn empty(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            tracks: Vec::new(),
            waypoints: Vec::new(),
        }
    }
}

/// A recorded route (<trk>), composed of zero or more segments.
#[derive(Debug, Default, Serialize)]
pub struct Track {
    /// Never empty after parsing; defaults to "Track N" (1-based).
    pub name: String,
    pub track_type: String,
    /// Representative date: first point timestamp, else the file's
    /// metadata time, else absent.
    pub date: Option<DateTime<Utc>>,
    pub segments: Vec<TrackSegment>,
}

/// One contiguous recording session (<trkseg>).
///
/// Point order is the recorded GPS order: never reordered, never
/// deduplicated.
#[derive(Debug, Default, Serialize)]
pub struct TrackSegment {
    pub points: Vec<TrackPoint>,
    /// Index of the parent track in `GpxFile::tracks`, assigned when the
    /// enclosing track element finishes parsing.
    pub track_index: usize,
}

/// A single location sample (<trkpt>).
#[derive(Debug, Clone, Serialize)]
pub struct TrackPoint {
    pub lat: f64,
    pub lon: f64,
    /// Meters; 0.0 when the file carried no <ele>.
    pub ele: f64,
    pub time: Option<DateTime<Utc>>,
    pub horizontal_accuracy: f64,
    pub vertical_accuracy: f64,
}

impl TrackPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self {
            lat,
            lon,
            ele: 0.0,
            time: None,
            horizontal_accuracy: NOMINAL_HORIZONTAL_ACCURACY_M,
            vertical_accuracy: NOMINAL_VERTICAL_ACCURACY_M,
        }
    }
}

/// A standalone point of interest (<wpt>), independent of any track.
#[derive(Debug, Clone, Serialize)]
pub struct Waypoint {
    /// Defaults to "POI" when the file carried no <name>.
    pub name: String,
    pub desc: Option<String>,
    pub lat: f64,
    pub lon: f64,
    pub ele: Option<f64>,
    pub time: Option<DateTime<Utc>>,
    pub sym: Option<String>,
}

impl Waypoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self {
            name: String::new(),
            desc: None,
            lat,
            lon,
            ele: None,
            time: None,
            sym: None,
        }
    }
}
