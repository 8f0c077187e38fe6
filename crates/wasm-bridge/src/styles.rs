//! Style rules scoped to the widget's container id

use config_system::{rgba, ColorPalette};
use shared_types::WidgetResult;

pub const POPOVER_CLASS: &str = "high_tide_flooding_popover";
pub const OPEN_CLASS: &str = "popover-open";
pub const PINNED_CLASS: &str = "popover-pinned";

pub fn scoped_rules(element_id: &str, colors: &ColorPalette) -> WidgetResult<Vec<String>> {
    let root = format!("#{element_id}");
    let popover = format!("{root} .{POPOVER_CLASS}");

    Ok(vec![
        format!("{root} {{position: relative;}}"),
        format!("{root} .hoverlayer .legend {{display: none !important;}}"),
        format!(
            "{popover} {{z-index: 9999; display: none; position: absolute; \
             background: rgba(252,253,255,0.75); pointer-events: none; min-height: 3.75rem; \
             flex-flow: column nowrap; height: fit-content; width: 16rem; \
             box-shadow: 2px 1px 5px rgb(0 0 0 / 50%); border: solid 1.3px rgba(0, 0, 0, 0.3); \
             padding: 0.45rem 0.55rem; font-size: 1rem; font-weight: 500; line-height: 1.5rem;}}"
        ),
        format!(
            "{popover} .bg-rcp85 {{ background-color: {}; }}",
            rgba(&colors.rcp85.outer_band, 0.1)?
        ),
        format!(
            "{popover} .bg-rcp45 {{ background-color: {}; }}",
            rgba(&colors.rcp45.outer_band, 0.1)?
        ),
        format!("{popover} .label1 {{ font-size: 1rem; font-weight: 700; line-height: 1.5rem; grid-column: 1 / span 2; }}"),
        format!("{popover} .label2 {{ font-size: 0.7rem; padding-left: 0.3rem; line-height: 1rem; grid-column: 1 / span 2; }}"),
        format!("{popover} .legend-line {{ margin-left: 0.5rem; border-left-width: 0.15rem; border-left-style: solid; padding-left: 0.5rem; }}"),
        format!("{popover} .popover-header {{ display: flex; flex-flow: row nowrap; align-items: center;}}"),
        format!(
            "{root}.{PINNED_CLASS} .{POPOVER_CLASS} {{ pointer-events: all; \
             background: rgba(252,253,255,0.95); left: 60px !important; top: 15px !important; }}"
        ),
        format!("{root}.{OPEN_CLASS} .{POPOVER_CLASS} {{ display: flex; }}"),
    ])
}

pub fn stylesheet(element_id: &str, colors: &ColorPalette) -> WidgetResult<String> {
    Ok(scoped_rules(element_id, colors)?.join("\n"))
}
