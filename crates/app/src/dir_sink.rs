//! Render sink that writes each source as a GeoJSON file.
//!
//! Every push replaces `<dir>/<source>.geojson` atomically (write to a temp
//! file, then rename), so a viewer polling the directory never reads a half
//! written frame.

use std::fs;
use std::path::PathBuf;

use bevy::prelude::*;

use flood_overlay::geojson::FeatureCollection;
use flood_overlay::{OverlayError, RenderSink};

pub struct GeoJsonDirSink {
    dir: PathBuf,
}

impl GeoJsonDirSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn write(&self, source: &str, data: &FeatureCollection) -> Result<(), OverlayError> {
        let bytes = serde_json::to_vec(data)?;
        let target = self.dir.join(format!("{source}.geojson"));
        let tmp = self.dir.join(format!(".{source}.geojson.tmp"));
        fs::write(&tmp, bytes)?;
        fs::rename(&tmp, &target)?;
        Ok(())
    }
}

impl RenderSink for GeoJsonDirSink {
    /// Layers exist as long as the output directory does.
    fn has_layer(&self, _layer: &str) -> bool {
        self.dir.is_dir()
    }

    fn replace_source_data(&mut self, source: &str, data: FeatureCollection) {
        if let Err(e) = self.write(source, &data) {
            warn!("Flood overlay: writing {} failed: {}", source, e);
        }
    }
}
