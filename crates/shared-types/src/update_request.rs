// Update requests accepted by the widget controller.
// JS callers pass partial options objects; these are classified once into a
// tagged request so the controller never inspects which keys were present.

use serde::{Deserialize, Serialize};

use crate::{Scale, Station};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum UpdateRequest {
    StationChange(Station),
    ScaleChange(Scale),
    /// Render if nothing has been rendered yet
    Refresh,
}

/// Partial options as passed to `request_update` from JavaScript
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartialUpdate {
    #[serde(default)]
    pub station: Option<Station>,
    #[serde(default)]
    pub scale: Option<Scale>,
}

impl UpdateRequest {
    /// A station that differs from the current one wins over a scale change;
    /// a scale equal to the current one is no change at all.
    pub fn from_partial(
        partial: &PartialUpdate,
        current_station: Option<&Station>,
        current_scale: Scale,
    ) -> UpdateRequest {
        if let Some(station) = &partial.station {
            if Some(station) != current_station {
                return UpdateRequest::StationChange(station.clone());
            }
        }

        match partial.scale {
            Some(scale) if scale != current_scale => UpdateRequest::ScaleChange(scale),
            _ => UpdateRequest::Refresh,
        }
    }

    pub fn describe(&self) -> String {
        match self {
            UpdateRequest::StationChange(station) => format!("station -> {station}"),
            UpdateRequest::ScaleChange(scale) => format!("scale -> {scale}"),
            UpdateRequest::Refresh => "refresh".to_string(),
        }
    }
}
