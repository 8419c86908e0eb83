use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FetcherError;

/// Declares that an image was uploaded from a volume (`IMAGE=VOLUME`).
///
/// Glance does not record this, so the `glance.image.created_from` edges only
/// exist for images named here. `image` matches an image id or name; `volume`
/// is a volume id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageProvenance {
    pub image: String,
    pub volume: String,
}

impl FromStr for ImageProvenance {
    type Err = FetcherError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let (image, volume) = raw.split_once('=').ok_or_else(|| {
            FetcherError::InvalidParam(format!("expected IMAGE=VOLUME, got '{}'", raw))
        })?;
        let (image, volume) = (image.trim(), volume.trim());
        if image.is_empty() || volume.is_empty() {
            return Err(FetcherError::InvalidParam(format!(
                "image and volume must both be set in '{}'",
                raw
            )));
        }
        Ok(Self {
            image: image.to_string(),
            volume: volume.to_string(),
        })
    }
}
