//! Widget options validation

use shared_types::{WidgetError, WidgetResult};

use crate::colors::Rgb;
use crate::{CachePolicy, WidgetOptions};

const MAX_DEBOUNCE_MS: u64 = 1_000;
const MAX_PRECISION: u32 = 6;
const MAX_EXPORT_SIDE: u32 = 8_192;

/// Options validator with per-section checks
pub struct OptionsValidator;

impl OptionsValidator {
    pub fn validate(options: &WidgetOptions) -> WidgetResult<()> {
        Self::validate_years(options)?;
        Self::validate_data(options)?;
        Self::validate_layout(options)?;
        Self::validate_colors(options)?;
        Self::validate_popover(options)?;
        Self::validate_export(options)?;
        Ok(())
    }

    fn validate_years(options: &WidgetOptions) -> WidgetResult<()> {
        if options.years.is_empty() {
            return Err(WidgetError::invalid_config(
                "years",
                format!(
                    "Invalid year range: start {} > end {}",
                    options.years.start, options.years.end
                ),
            ));
        }
        Ok(())
    }

    fn validate_data(options: &WidgetOptions) -> WidgetResult<()> {
        for (field, endpoint) in [
            ("data.historical_url", &options.data.historical_url),
            ("data.projection_url", &options.data.projection_url),
        ] {
            url::Url::parse(endpoint).map_err(|e| {
                WidgetError::invalid_config(field, format!("Invalid endpoint '{endpoint}': {e}"))
            })?;
        }

        if let CachePolicy::Lru { capacity: 0 } = options.data.cache_policy {
            return Err(WidgetError::invalid_config(
                "data.cache_policy",
                "LRU cache capacity must be greater than 0",
            ));
        }

        if options.data.timeout_ms == 0 {
            return Err(WidgetError::invalid_config(
                "data.timeout_ms",
                "Fetch timeout must be greater than 0",
            ));
        }
        Ok(())
    }

    fn validate_layout(options: &WidgetOptions) -> WidgetResult<()> {
        if !options.layout.is_object() {
            return Err(WidgetError::invalid_config("layout", "Layout must be an object"));
        }
        if !options.config.is_object() {
            return Err(WidgetError::invalid_config("config", "Chart config must be an object"));
        }
        Ok(())
    }

    fn validate_colors(options: &WidgetOptions) -> WidgetResult<()> {
        for (field, color) in options.colors.entries() {
            Rgb::parse(color).map_err(|e| WidgetError::invalid_config(field, e.to_string()))?;
        }

        let opacity = &options.colors.opacity;
        for value in [
            opacity.ann_hist_minmax,
            opacity.ann_proj_minmax,
            opacity.mon_proj_minmax,
            opacity.hist_obs,
            opacity.proj_line,
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(WidgetError::invalid_config(
                    "colors.opacity",
                    format!("Invalid opacity: {value}. Must be between 0.0 and 1.0"),
                ));
            }
        }
        Ok(())
    }

    fn validate_popover(options: &WidgetOptions) -> WidgetResult<()> {
        if options.popover.debounce_ms > MAX_DEBOUNCE_MS {
            return Err(WidgetError::invalid_config(
                "popover.debounce_ms",
                format!(
                    "Invalid debounce: {}ms. Must be at most {MAX_DEBOUNCE_MS}ms",
                    options.popover.debounce_ms
                ),
            ));
        }
        if options.popover.precision > MAX_PRECISION {
            return Err(WidgetError::invalid_config(
                "popover.precision",
                format!(
                    "Invalid precision: {}. Must be at most {MAX_PRECISION}",
                    options.popover.precision
                ),
            ));
        }
        Ok(())
    }

    fn validate_export(options: &WidgetOptions) -> WidgetResult<()> {
        let export = &options.export;
        for (field, side) in [("export.width", export.width), ("export.height", export.height)] {
            if side == 0 || side > MAX_EXPORT_SIDE {
                return Err(WidgetError::invalid_config(
                    field,
                    format!("Invalid image size: {side}. Must be between 1 and {MAX_EXPORT_SIDE}"),
                ));
            }
        }
        if !matches!(export.format.as_str(), "png" | "jpeg" | "webp" | "svg") {
            return Err(WidgetError::invalid_config(
                "export.format",
                format!("Unsupported image format '{}'", export.format),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::YearRange;

    fn field_of(result: WidgetResult<()>) -> Option<String> {
        match result {
            Err(WidgetError::InvalidConfig { field, .. }) => field,
            _ => None,
        }
    }

    #[test]
    fn test_rejects_inverted_years() {
        let options = WidgetOptions {
            years: YearRange::new(2100, 1920),
            ..WidgetOptions::default()
        };
        assert_eq!(field_of(OptionsValidator::validate(&options)).as_deref(), Some("years"));
    }

    #[test]
    fn test_rejects_bad_endpoint() {
        let mut options = WidgetOptions::default();
        options.data.projection_url = "not a url".to_string();
        assert_eq!(
            field_of(OptionsValidator::validate(&options)).as_deref(),
            Some("data.projection_url")
        );
    }

    #[test]
    fn test_rejects_zero_capacity_cache() {
        let mut options = WidgetOptions::default();
        options.data.cache_policy = CachePolicy::Lru { capacity: 0 };
        assert!(OptionsValidator::validate(&options).is_err());
    }

    #[test]
    fn test_rejects_zero_timeout() {
        let mut options = WidgetOptions::default();
        options.data.timeout_ms = 0;
        assert_eq!(
            field_of(OptionsValidator::validate(&options)).as_deref(),
            Some("data.timeout_ms")
        );
    }

    #[test]
    fn test_rejects_hex_color() {
        let mut options = WidgetOptions::default();
        options.colors.hist.bar = "#777".to_string();
        assert_eq!(
            field_of(OptionsValidator::validate(&options)).as_deref(),
            Some("colors.hist.bar")
        );
    }

    #[test]
    fn test_rejects_out_of_range_popover_and_export() {
        let mut options = WidgetOptions::default();
        options.popover.precision = 12;
        assert!(OptionsValidator::validate(&options).is_err());

        let mut options = WidgetOptions::default();
        options.export.format = "gif".to_string();
        assert!(OptionsValidator::validate(&options).is_err());
    }
}
