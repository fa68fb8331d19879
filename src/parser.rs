use chrono::{DateTime, Utc};
use log::{debug, warn};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::error::Result;
use crate::gpx_types::*;

/// Parse a GPX document into a [`GpxFile`].
///
/// This never fails: unreadable or malformed input degrades to an empty (or
/// partially filled) file. On an XML error mid-document, everything fully
/// closed before the error is kept; the file with `tracks.is_empty()` is the
/// uniform "nothing to show" signal for callers.
pub fn parse_gpx(xml: &str, filename: &str) -> GpxFile {
    let mut reader = Reader::from_str(xml);
    let mut file = GpxFile::empty(filename);
    let mut metadata_time: Option<DateTime<Utc>> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"metadata" => match parse_metadata(&mut reader) {
                    Ok(time) => metadata_time = time.or(metadata_time),
                    Err(err) => {
                        warn!("{filename}: malformed <metadata>, returning partial result: {err}");
                        break;
                    }
                },
                b"trk" => match parse_track(&mut reader) {
                    // Track boundaries are only known once </trk> arrives, so
                    // segment indices are assigned here, at finalize time.
                    Ok(track) => finalize_track(&mut file, track),
                    Err(err) => {
                        warn!("{filename}: malformed <trk>, returning partial result: {err}");
                        break;
                    }
                },
                b"wpt" => match parse_waypoint(&e, &mut reader) {
                    Ok(wpt) => file.waypoints.push(wpt),
                    Err(err) => {
                        warn!("{filename}: malformed <wpt>, returning partial result: {err}");
                        break;
                    }
                },
                _ => {}
            },
            Ok(Event::Empty(e)) => {
                if e.local_name().as_ref() == b"wpt" {
                    let (lat, lon) = parse_lat_lon(&e);
                    let mut wpt = Waypoint::new(lat, lon);
                    wpt.name = "POI".to_string();
                    file.waypoints.push(wpt);
                }
            }
            Ok(Event::Eof) => break,
            Err(err) => {
                warn!("{filename}: XML error, returning partial result: {err}");
                break;
            }
            _ => {}
        }
    }

    // Tracks that carried no point timestamp fall back to the file-level
    // metadata date. No wall-clock fallback: parsing stays deterministic.
    for track in &mut file.tracks {
        if track.date.is_none() {
            track.date = metadata_time;
        }
    }

    debug!(
        "{filename}: parsed {} track(s), {} waypoint(s)",
        file.tracks.len(),
        file.waypoints.len()
    );
    file
}

/// Append a completed track, defaulting its name and rewriting the track
/// index of every segment it accumulated.
fn finalize_track(file: &mut GpxFile, mut track: Track) {
    let index = file.tracks.len();
    if track.name.is_empty() {
        track.name = format!("Track {}", index + 1);
    }
    for segment in &mut track.segments {
        segment.track_index = index;
    }
    file.tracks.push(track);
}

/// Read lat/lon attributes from a <trkpt> or <wpt> start tag.
/// A missing or unparseable attribute defaults to 0.0, never an error.
fn parse_lat_lon(e: &BytesStart<'_>) -> (f64, f64) {
    let mut lat = 0.0;
    let mut lon = 0.0;
    for attr in e.attributes().flatten() {
        let val = std::str::from_utf8(&attr.value).unwrap_or_default();
        match attr.key.local_name().as_ref() {
            b"lat" => lat = val.trim().parse().unwrap_or(0.0),
            b"lon" => lon = val.trim().parse().unwrap_or(0.0),
            _ => {}
        }
    }
    (lat, lon)
}

/// Parse a <metadata> element, returning its <time> if present.
fn parse_metadata(reader: &mut Reader<&[u8]>) -> Result<Option<DateTime<Utc>>> {
    let mut time = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"time" => {
                    let text = read_text_owned(reader, &e)?;
                    time = parse_timestamp(&text);
                }
                _ => {
                    reader.read_to_end(e.name())?;
                }
            },
            Ok(Event::End(e)) if e.local_name().as_ref() == b"metadata" => break,
            Ok(Event::Eof) => break,
            Err(e) => return Err(e.into()),
            _ => {}
        }
    }

    Ok(time)
}

/// Parse a <trk> element and all of its segments.
fn parse_track(reader: &mut Reader<&[u8]>) -> Result<Track> {
    let mut track = Track::default();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"name" => track.name = read_text_owned(reader, &e)?,
                b"type" => track.track_type = read_text_owned(reader, &e)?,
                b"trkseg" => {
                    let segment = parse_segment(reader)?;
                    if track.date.is_none() {
                        track.date = segment.points.iter().find_map(|p| p.time);
                    }
                    track.segments.push(segment);
                }
                _ => {
                    reader.read_to_end(e.name())?;
                }
            },
            Ok(Event::End(e)) if e.local_name().as_ref() == b"trk" => break,
            Ok(Event::Eof) => break,
            Err(e) => return Err(e.into()),
            _ => {}
        }
    }

    Ok(track)
}

/// Parse a <trkseg> element into a segment with a placeholder track index.
fn parse_segment(reader: &mut Reader<&[u8]>) -> Result<TrackSegment> {
    let mut segment = TrackSegment::default();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"trkpt" => segment.points.push(parse_trkpt(&e, reader)?),
                _ => {
                    reader.read_to_end(e.name())?;
                }
            },
            Ok(Event::Empty(e)) => {
                if e.local_name().as_ref() == b"trkpt" {
                    let (lat, lon) = parse_lat_lon(&e);
                    segment.points.push(TrackPoint::new(lat, lon));
                }
            }
            Ok(Event::End(e)) if e.local_name().as_ref() == b"trkseg" => break,
            Ok(Event::Eof) => break,
            Err(e) => return Err(e.into()),
            _ => {}
        }
    }

    Ok(segment)
}

/// Parse a <trkpt> element and its children.
/// Called after receiving Event::Start for the point element.
fn parse_trkpt(start: &BytesStart<'_>, reader: &mut Reader<&[u8]>) -> Result<TrackPoint> {
    let (lat, lon) = parse_lat_lon(start);
    let mut point = TrackPoint::new(lat, lon);
    let end_name = start.name().0.to_vec();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"ele" => {
                    let text = read_text_owned(reader, &e)?;
                    point.ele = text.trim().parse().unwrap_or(0.0);
                }
                b"time" => {
                    let text = read_text_owned(reader, &e)?;
                    point.time = parse_timestamp(&text);
                }
                _ => {
                    // Skip unknown/extensions elements
                    reader.read_to_end(e.name())?;
                }
            },
            Ok(Event::End(e)) if e.name().0 == end_name.as_slice() => break,
            Ok(Event::Eof) => break,
            Err(e) => return Err(e.into()),
            _ => {}
        }
    }

    Ok(point)
}

/// Parse a <wpt> element: like a track point, plus name/desc/sym children.
fn parse_waypoint(start: &BytesStart<'_>, reader: &mut Reader<&[u8]>) -> Result<Waypoint> {
    let (lat, lon) = parse_lat_lon(start);
    let mut wpt = Waypoint::new(lat, lon);
    let end_name = start.name().0.to_vec();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"name" => wpt.name = read_text_owned(reader, &e)?,
                b"desc" => wpt.desc = Some(read_text_owned(reader, &e)?),
                b"sym" => wpt.sym = Some(read_text_owned(reader, &e)?),
                b"ele" => {
                    let text = read_text_owned(reader, &e)?;
                    wpt.ele = text.trim().parse().ok();
                }
                b"time" => {
                    let text = read_text_owned(reader, &e)?;
                    wpt.time = parse_timestamp(&text);
                }
                _ => {
                    reader.read_to_end(e.name())?;
                }
            },
            Ok(Event::End(e)) if e.name().0 == end_name.as_slice() => break,
            Ok(Event::Eof) => break,
            Err(e) => return Err(e.into()),
            _ => {}
        }
    }

    if wpt.name.is_empty() {
        wpt.name = "POI".to_string();
    }
    Ok(wpt)
}

/// ISO-8601 timestamp; unparseable input is treated as absent.
fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text.trim())
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

/// Read text content of an element as an owned String.
/// Handles regular text, CDATA sections, and entity references.
fn read_text_owned(reader: &mut Reader<&[u8]>, start: &BytesStart<'_>) -> Result<String> {
    let end_name = start.name().0.to_vec();
    let mut text = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Text(e)) => {
                let raw = std::str::from_utf8(e.as_ref()).unwrap_or_default();
                text.push_str(raw);
            }
            Ok(Event::CData(e)) => {
                let s = std::str::from_utf8(e.as_ref()).unwrap_or_default();
                text.push_str(s);
            }
            Ok(Event::GeneralRef(e)) => {
                // Character references (&#60; &#x3C;) and predefined entities
                if let Ok(Some(ch)) = e.resolve_char_ref() {
                    text.push(ch);
                } else {
                    let name = std::str::from_utf8(e.as_ref()).unwrap_or_default();
                    match name {
                        "amp" => text.push('&'),
                        "lt" => text.push('<'),
                        "gt" => text.push('>'),
                        "quot" => text.push('"'),
                        "apos" => text.push('\''),
                        _ => {}
                    }
                }
            }
            Ok(Event::End(e)) if e.name().0 == end_name.as_slice() => break,
            Ok(Event::Eof) => break,
            Err(e) => return Err(e.into()),
            _ => {}
        }
    }

    Ok(text)
}
