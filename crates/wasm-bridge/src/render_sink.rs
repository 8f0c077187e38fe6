//! Seams between the widget controller and whatever draws the chart and the
//! popover. The browser implementations live in `dom`; tests record calls.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shared_types::{PopoverGeometry, PopoverPosition, WidgetResult};

use crate::chart_spec::ChartSpec;

/// Result of handing a chart to the sink
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    Drawn,
    /// The container is gone; nothing was drawn and no draw will finish
    NoTarget,
}

/// Image export request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageExport {
    pub format: String,
    pub width: u32,
    pub height: u32,
    pub filename: String,
}

#[async_trait(?Send)]
pub trait RenderSink {
    /// Draws or redraws the chart in place
    async fn render(&self, spec: &ChartSpec) -> WidgetResult<RenderOutcome>;

    async fn relayout(&self, layout: &serde_json::Value) -> WidgetResult<()>;

    async fn export_image(&self, export: &ImageExport) -> WidgetResult<()>;

    /// Resolves once the chart reports its next completed draw
    async fn draw_finished(&self) -> WidgetResult<()>;
}

/// Everything the surface needs to show the popover
#[derive(Debug, Clone, PartialEq)]
pub struct PopoverView {
    pub html: String,
    pub position: PopoverPosition,
    pub pinned: bool,
    pub year: i32,
}

pub trait PopoverSurface {
    fn show(&self, view: &PopoverView) -> WidgetResult<()>;

    fn hide(&self) -> WidgetResult<()>;

    /// Current container and popover sizes, measured before showing
    fn geometry(&self) -> PopoverGeometry;
}
