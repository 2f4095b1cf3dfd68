use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Frame interval used when a `frame` event does not carry its own.
pub const DEFAULT_FRAME_MS: u64 = 16;

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct TouchPoint {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointerMoveMessage {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TouchMoveMessage {
    pub touches: Vec<TouchPoint>,
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResizeMessage {
    pub width: f64,
    pub height: f64,
}

/// One event a host page delivers to a trail container.
///
/// Pointer and touch coordinates are in client space; the engine converts
/// them to container-local positions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostEvent {
    PointerMove(PointerMoveMessage),
    TouchMove(TouchMoveMessage),
    Frame {
        #[serde(default)]
        dt_ms: Option<u64>,
    },
    Resize(ResizeMessage),
    SetVariant {
        variant: String,
    },
    /// Visible fraction of the fade-in element changed.
    Intersection {
        ratio: f64,
    },
    Teardown,
}

impl HostEvent {
    pub fn is_input(&self) -> bool {
        matches!(self, HostEvent::PointerMove(_) | HostEvent::TouchMove(_))
    }

    /// Frame interval in milliseconds, `None` for non-frame events.
    pub fn frame_interval(&self) -> Option<u64> {
        match self {
            HostEvent::Frame { dt_ms } => Some(dt_ms.unwrap_or(DEFAULT_FRAME_MS)),
            _ => None,
        }
    }
}

impl fmt::Display for HostEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostEvent::PointerMove(m) => write!(f, "pointer_move({}, {})", m.x, m.y),
            HostEvent::TouchMove(m) => write!(f, "touch_move({} touches)", m.touches.len()),
            HostEvent::Frame { dt_ms } => {
                write!(f, "frame({}ms)", dt_ms.unwrap_or(DEFAULT_FRAME_MS))
            }
            HostEvent::Resize(m) => write!(f, "resize({}x{})", m.width, m.height),
            HostEvent::SetVariant { variant } => write!(f, "set_variant({variant})"),
            HostEvent::Intersection { ratio } => write!(f, "intersection({ratio})"),
            HostEvent::Teardown => write!(f, "teardown"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    #[error("Failed to read script: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed event on line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// Parses a JSON-lines event script. Blank lines and lines starting with
/// `#` are skipped.
pub fn parse_script<R: BufRead>(reader: R) -> Result<Vec<HostEvent>, ScriptError> {
    let mut events = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let event = serde_json::from_str::<HostEvent>(trimmed).map_err(|source| {
            ScriptError::Parse {
                line: index + 1,
                source,
            }
        })?;
        events.push(event);
    }
    log::debug!("parse_script: parsed {} events", events.len());
    Ok(events)
}

pub fn load_script(path: &Path) -> Result<Vec<HostEvent>, ScriptError> {
    log::info!("Loading event script from {}", path.display());
    let file = File::open(path)?;
    parse_script(BufReader::new(file))
}

/// Serializes events back into the JSON-lines format `parse_script` reads.
pub fn write_script(events: &[HostEvent]) -> Result<String, serde_json::Error> {
    let mut out = String::new();
    for event in events {
        out.push_str(&serde_json::to_string(event)?);
        out.push('\n');
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};

    #[test]
    fn test_parse_mixed_script() {
        let script = r#"
# warm up
{"type":"pointer_move","x":10.0,"y":20.0}
{"type":"frame"}
{"type":"frame","dt_ms":33}

{"type":"touch_move","touches":[{"x":1.0,"y":2.0},{"x":5.0,"y":6.0}]}
{"type":"resize","width":640.0,"height":480.0}
{"type":"set_variant","variant":"7"}
{"type":"intersection","ratio":0.25}
{"type":"teardown"}
"#;
        let events = parse_script(Cursor::new(script)).unwrap();
        assert_eq!(events.len(), 8);
        assert_eq!(
            events[0],
            HostEvent::PointerMove(PointerMoveMessage { x: 10.0, y: 20.0 })
        );
        assert_eq!(events[1].frame_interval(), Some(DEFAULT_FRAME_MS));
        assert_eq!(events[2].frame_interval(), Some(33));
        assert!(events[3].is_input());
        assert!(!events[4].is_input());
        assert!(matches!(&events[5], HostEvent::SetVariant { variant } if variant == "7"));
        assert_eq!(events[6], HostEvent::Intersection { ratio: 0.25 });
        assert_eq!(events[7], HostEvent::Teardown);
    }

    #[test]
    fn test_parse_error_reports_line() {
        let script = "{\"type\":\"frame\"}\n{\"type\":\"wobble\"}\n";
        match parse_script(Cursor::new(script)) {
            Err(ScriptError::Parse { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_load_script_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{{\"type\":\"pointer_move\",\"x\":1.0,\"y\":1.0}}").unwrap();
        writeln!(file, "{{\"type\":\"frame\",\"dt_ms\":8}}").unwrap();
        file.flush().unwrap();

        let events = load_script(file.path()).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].frame_interval(), Some(8));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.jsonl");
        assert!(matches!(load_script(&missing), Err(ScriptError::Io(_))));
    }

    #[test]
    fn test_written_script_parses_back() {
        let events = vec![
            HostEvent::Resize(ResizeMessage {
                width: 300.0,
                height: 200.0,
            }),
            HostEvent::Frame { dt_ms: None },
        ];
        let text = write_script(&events).unwrap();
        assert_eq!(parse_script(Cursor::new(text)).unwrap(), events);
    }
}
