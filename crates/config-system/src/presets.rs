//! Applying caller overrides over a preset of widget options

use shared_types::{WidgetError, WidgetResult};

use crate::validation::OptionsValidator;
use crate::WidgetOptions;

/// Deep-merges `overrides` over `base`, then validates the result.
///
/// Objects are merged key by key; any other override value replaces the base
/// value outright (arrays included).
pub fn apply_overrides(
    base: &WidgetOptions,
    overrides: serde_json::Value,
) -> WidgetResult<WidgetOptions> {
    let options = if overrides.is_null() {
        base.clone()
    } else {
        let mut base_json = serde_json::to_value(base).map_err(|e| WidgetError::Internal {
            message: format!("Serialization error: {e}"),
        })?;

        merge_json(&mut base_json, overrides);

        serde_json::from_value(base_json).map_err(|e| WidgetError::InvalidConfig {
            message: format!("Deserialization error: {e}"),
            field: None,
        })?
    };

    OptionsValidator::validate(&options)?;
    log::debug!(
        "Widget options resolved: station={:?} scale={}",
        options.station(),
        options.scale
    );
    Ok(options)
}

pub fn merge_json(base: &mut serde_json::Value, overrides: serde_json::Value) {
    match (base, overrides) {
        (serde_json::Value::Object(base_map), serde_json::Value::Object(override_map)) => {
            for (key, value) in override_map {
                match base_map.get_mut(&key) {
                    Some(base_value) => merge_json(base_value, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (base, override_value) => {
            *base = override_value;
        }
    }
}
