// ---------------------------------------------------------------------------
// OverlayError: typed failures for the flood overlay pipeline
// ---------------------------------------------------------------------------

use std::fmt;

/// Errors that can occur while loading inputs or pushing overlay data.
///
/// None of these are fatal to the overlay: callers log them and fall back to
/// a reduced visual state (skip a node, drop the line field, stop pushing).
#[derive(Debug)]
pub enum OverlayError {
    /// I/O error while reading an input file.
    Io(std::io::Error),
    /// JSON input could not be parsed.
    Parse(String),
    /// A vulnerability record references a node absent from the topology.
    MissingCoordinate { node_id: String },
    /// The pipe network could not be fetched or contained no features.
    TopologyUnavailable(String),
    /// The rendering engine never exposed the layer we push into.
    RenderTargetNotReady { layer: String, attempts: u32 },
    /// A geometry did not have the shape the overlay needs (e.g. a pipe with
    /// fewer than two vertices).
    InvalidGeometry(String),
}

impl fmt::Display for OverlayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverlayError::Io(e) => write!(f, "I/O error: {e}"),
            OverlayError::Parse(msg) => write!(f, "Parse error: {msg}"),
            OverlayError::MissingCoordinate { node_id } => {
                write!(f, "Missing coordinate for node {node_id}")
            }
            OverlayError::TopologyUnavailable(msg) => write!(f, "Topology unavailable: {msg}"),
            OverlayError::RenderTargetNotReady { layer, attempts } => write!(
                f,
                "Render target not ready: layer {layer} still missing after {attempts} attempts"
            ),
            OverlayError::InvalidGeometry(msg) => write!(f, "Invalid geometry: {msg}"),
        }
    }
}

impl std::error::Error for OverlayError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            OverlayError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for OverlayError {
    fn from(e: std::io::Error) -> Self {
        OverlayError::Io(e)
    }
}

impl From<serde_json::Error> for OverlayError {
    fn from(e: serde_json::Error) -> Self {
        OverlayError::Parse(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlay_error_display_io() {
        let err = OverlayError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "pipes.geojson",
        ));
        let msg = format!("{err}");
        assert!(msg.contains("I/O error"), "got: {msg}");
        assert!(msg.contains("pipes.geojson"), "got: {msg}");
    }

    #[test]
    fn test_overlay_error_display_missing_coordinate() {
        let err = OverlayError::MissingCoordinate {
            node_id: "J-17".to_string(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("J-17"), "got: {msg}");
    }

    #[test]
    fn test_overlay_error_display_render_target() {
        let err = OverlayError::RenderTargetNotReady {
            layer: "flood-heat-nodes-layer".to_string(),
            attempts: 10,
        };
        let msg = format!("{err}");
        assert!(msg.contains("flood-heat-nodes-layer"), "got: {msg}");
        assert!(msg.contains("10 attempts"), "got: {msg}");
    }

    #[test]
    fn test_overlay_error_from_serde_json() {
        let json_err = serde_json::from_str::<Vec<u32>>("[1, 2,").unwrap_err();
        let err: OverlayError = json_err.into();
        assert!(matches!(err, OverlayError::Parse(_)));
    }

    #[test]
    fn test_overlay_error_source_only_for_io() {
        let io = OverlayError::Io(std::io::Error::new(std::io::ErrorKind::Other, "x"));
        assert!(std::error::Error::source(&io).is_some());
        let other = OverlayError::TopologyUnavailable("empty".to_string());
        assert!(std::error::Error::source(&other).is_none());
    }
}
