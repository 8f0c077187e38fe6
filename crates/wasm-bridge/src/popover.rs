//! Popover state machine and markup.
//!
//! Hides are debounced: `begin_hide` only marks a hide as pending and
//! `finish_hide`, called after the debounce delay, hides only if no show
//! happened in between. A pinned popover ignores hovers and unforced hides.

use std::cell::Cell;
use std::fmt::Write as _;

use config_system::{rgba, ColorPalette, PopoverOptions};
use shared_types::{PopoverContent, PopoverGeometry, PopoverMode, PopoverPosition, WidgetResult};

use crate::render_sink::PopoverView;

pub struct PopoverController {
    options: PopoverOptions,
    colors: ColorPalette,
    mode: Cell<PopoverMode>,
    hide_pending: Cell<bool>,
}

impl PopoverController {
    pub fn new(options: PopoverOptions, colors: ColorPalette) -> Self {
        Self {
            options,
            colors,
            mode: Cell::new(PopoverMode::Hidden),
            hide_pending: Cell::new(false),
        }
    }

    pub fn mode(&self) -> PopoverMode {
        self.mode.get()
    }

    pub fn is_pinned(&self) -> bool {
        self.mode.get() == PopoverMode::Pinned
    }

    pub fn is_hide_pending(&self) -> bool {
        self.hide_pending.get()
    }

    pub fn debounce_ms(&self) -> u64 {
        self.options.debounce_ms
    }

    pub fn precision(&self) -> u32 {
        self.options.precision
    }

    /// Returns the view to show, or `None` when a hover arrives while pinned.
    /// State only changes once the markup has been built.
    pub fn show(
        &self,
        content: &PopoverContent,
        pixel_x: Option<f64>,
        pinned: bool,
        geometry: PopoverGeometry,
    ) -> WidgetResult<Option<PopoverView>> {
        if !pinned && self.is_pinned() {
            return Ok(None);
        }

        let html = self.render_html(content, pinned)?;
        let position = if pinned {
            PopoverPosition::PINNED_ANCHOR
        } else {
            geometry.position_for(pixel_x)
        };

        self.hide_pending.set(false);
        self.mode.set(if pinned {
            PopoverMode::Pinned
        } else {
            PopoverMode::Transient
        });

        Ok(Some(PopoverView {
            html,
            position,
            pinned,
            year: content.year(),
        }))
    }

    /// Marks a hide as pending; returns `false` when it is ignored because the
    /// popover is pinned and the hide is not forced.
    pub fn begin_hide(&self, force: bool) -> bool {
        if !force && self.is_pinned() {
            return false;
        }
        self.hide_pending.set(true);
        true
    }

    /// Hides if the pending hide was not cancelled by a show
    pub fn finish_hide(&self) -> bool {
        if !self.hide_pending.replace(false) {
            return false;
        }
        self.mode.set(PopoverMode::Hidden);
        true
    }

    pub fn render_html(&self, content: &PopoverContent, pinned: bool) -> WidgetResult<String> {
        let mut html = String::new();
        html.push_str("<div class=\"popover-header\"><span class=\"high_tide_flooding_popover-title\">");
        html.push_str(&escape_html(&self.options.title));
        html.push_str("</span>");
        if pinned {
            html.push_str(CLOSE_BUTTON);
        }
        html.push_str("</div><div><div style=\"display: grid; grid-template-columns: auto auto;\">");

        match content {
            PopoverContent::Projection {
                year,
                higher,
                lower,
            } => {
                let opacity = self.colors.opacity.proj_line;
                let _ = write!(html, "<div class=\"label1\">{year} projection</div>");
                self.projection_row(
                    &mut html,
                    "rcp85",
                    "Higher Emissions",
                    &format!("{year} higher emissions weighted mean"),
                    &rgba(&self.colors.rcp85.line, opacity)?,
                    *higher,
                );
                self.projection_row(
                    &mut html,
                    "rcp45",
                    "Lower Emissions",
                    &format!("{year} lower emissions weighted mean"),
                    &rgba(&self.colors.rcp45.line, opacity)?,
                    *lower,
                );
            }
            PopoverContent::Observed { year, count } => {
                let border = rgba(&self.colors.hist.bar, 0.75)?;
                let _ = write!(
                    html,
                    "<div class=\"label1\" style=\"font-size: 0.8rem;\">{year} observed</div>\
                     <div style=\"grid-column: 1 / span 2;\">\
                     <div title=\"{year} observed\" class=\"legend-line\" style=\"border-left-color: {border};\">{}</div>\
                     </div>",
                    format_value(*count)
                );
            }
        }

        html.push_str("</div></div>");
        Ok(html)
    }

    fn projection_row(
        &self,
        html: &mut String,
        class: &str,
        label: &str,
        title: &str,
        border: &str,
        value: Option<f64>,
    ) {
        let _ = write!(
            html,
            "<div class=\"bg-{class} label2\">{label}</div>\
             <div class=\"bg-{class}\" style=\"grid-column: 1 / span 2; padding-bottom: 0.25rem;\">\
             <div title=\"{title}\" class=\"legend-line\" style=\"font-size: 1.1rem; border-left-color: {border};\">{}</div>\
             </div>",
            format_value(value)
        );
    }
}

const CLOSE_BUTTON: &str = "<button style=\"background: none; margin-left: auto; margin-right: 0.156rem; \
height: fit-content; padding: 0.062rem; font-size: 0.781rem; border: none;\" \
data-popover-action=\"hide\" title=\"Close\"><span aria-hidden=\"true\">&#x2715;</span></button>";

fn format_value(value: Option<f64>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => "n/a".to_string(),
    }
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}
