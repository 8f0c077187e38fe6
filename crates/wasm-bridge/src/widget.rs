//! Widget controller: fetch, transform, render, and the popover.
//!
//! All state sits behind `RefCell`/`Cell` and no borrow is held across an
//! `.await`. Every update takes a generation number; an update that finds a
//! newer one after its fetch resolves without rendering. A station change
//! still fetching is the baseline for later updates, so the newer update
//! renders the requested station instead of dropping it.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use config_system::{export_layout, restore_layout, WidgetOptions};
use data_manager::{build_series, CacheStats, DataManager, TransformOptions};
use shared_types::{
    Clock, PointerEvent, PopoverContent, PopoverMode, RawStationData, Scale, SeriesSet, Station,
    SystemClock, UpdateRequest, WidgetError, WidgetResult,
};

use crate::chart_spec::ChartSpec;
use crate::popover::PopoverController;
use crate::render_sink::{ImageExport, PopoverSurface, RenderOutcome, RenderSink};
use crate::timer::{default_sleeper, Sleeper};

/// What is currently on screen
#[derive(Debug, Clone)]
pub struct RenderedChart {
    pub station: Station,
    pub scale: Scale,
    pub series: Rc<SeriesSet>,
    pub layout: serde_json::Value,
}

struct WidgetState {
    options: WidgetOptions,
    rendered: Option<RenderedChart>,
    /// Target of the newest station change whose fetch has not settled
    pending_station: Option<Option<Station>>,
}

pub struct Widget {
    state: RefCell<WidgetState>,
    generation: Cell<u64>,
    data: DataManager,
    sink: Rc<dyn RenderSink>,
    surface: Rc<dyn PopoverSurface>,
    popover: PopoverController,
    clock: Rc<dyn Clock>,
    sleeper: Rc<dyn Sleeper>,
}

impl Widget {
    pub fn new(
        options: WidgetOptions,
        data: DataManager,
        sink: Rc<dyn RenderSink>,
        surface: Rc<dyn PopoverSurface>,
    ) -> Self {
        let popover = PopoverController::new(options.popover.clone(), options.colors.clone());
        Self {
            state: RefCell::new(WidgetState {
                options,
                rendered: None,
                pending_station: None,
            }),
            generation: Cell::new(0),
            data,
            sink,
            surface,
            popover,
            clock: Rc::new(SystemClock),
            sleeper: default_sleeper(),
        }
    }

    pub fn with_clock(mut self, clock: Rc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_sleeper(mut self, sleeper: Rc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// First render after mount
    pub async fn initialize(&self) -> WidgetResult<()> {
        log::info!("Initializing tidal stations widget");
        self.request_update(UpdateRequest::Refresh).await
    }

    pub fn station(&self) -> Option<Station> {
        self.state.borrow().options.station().cloned()
    }

    pub fn scale(&self) -> Scale {
        self.state.borrow().options.scale
    }

    pub fn rendered(&self) -> Option<RenderedChart> {
        self.state.borrow().rendered.clone()
    }

    pub fn popover_mode(&self) -> PopoverMode {
        self.popover.mode()
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.data.cache_stats()
    }

    pub fn options(&self) -> WidgetOptions {
        self.state.borrow().options.clone()
    }

    pub async fn request_update(&self, request: UpdateRequest) -> WidgetResult<()> {
        let generation = self.generation.get() + 1;
        self.generation.set(generation);
        log::debug!("Update #{generation}: {}", request.describe());

        let result = self.run_update(generation, request).await;

        // the latest update settled, so no station change is in flight
        if self.generation.get() == generation {
            self.state.borrow_mut().pending_station = None;
        }
        result
    }

    async fn run_update(&self, generation: u64, request: UpdateRequest) -> WidgetResult<()> {
        let (committed_station, current_scale, has_chart, pending_station) = {
            let state = self.state.borrow();
            (
                state.options.station().cloned(),
                state.options.scale,
                state.rendered.is_some(),
                state.pending_station.clone(),
            )
        };

        // A station change still fetching is carried by later updates, so a
        // zoom made meanwhile does not drop it.
        let station = match &request {
            UpdateRequest::StationChange(requested) => {
                let requested = (!requested.is_empty()).then(|| requested.clone());
                self.state.borrow_mut().pending_station = Some(requested.clone());
                requested
            }
            _ => pending_station.unwrap_or_else(|| committed_station.clone()),
        };
        let station_changed = station != committed_station;

        // (scale, whether to draw)
        let (scale, redraw) = match request {
            UpdateRequest::ScaleChange(scale) if station_changed || scale != current_scale => {
                (scale, true)
            }
            _ if station_changed => (Scale::Full, true),
            _ => (current_scale, !has_chart),
        };

        let data = match &station {
            Some(station) => Some(self.data.get_or_fetch(station).await?),
            None => None,
        };

        if self.generation.get() != generation {
            log::debug!("Update #{generation} superseded, not rendering");
            return Ok(());
        }

        let (Some(station), Some(data), true) = (station.clone(), data, redraw) else {
            self.commit(station, scale, None);
            return Ok(());
        };

        let (spec, series) = self.build_chart(&data, scale)?;
        let outcome = self.sink.render(&spec).await?;

        let chart = RenderedChart {
            station: station.clone(),
            scale,
            series: Rc::new(series),
            layout: spec.layout,
        };
        self.commit(Some(station), scale, Some(chart));

        match outcome {
            RenderOutcome::Drawn => self.sink.draw_finished().await,
            RenderOutcome::NoTarget => {
                log::warn!("Chart container missing, nothing drawn");
                Ok(())
            }
        }
    }

    fn build_chart(&self, data: &RawStationData, scale: Scale) -> WidgetResult<(ChartSpec, SeriesSet)> {
        let state = self.state.borrow();
        let options = &state.options;
        let transform = TransformOptions::new(options.years, self.clock.as_ref(), options.data.severity);
        let series = build_series(data, &transform)?;
        let spec = ChartSpec::build(&series, options, scale, transform.current_year)?;
        Ok((spec, series))
    }

    fn commit(&self, station: Option<Station>, scale: Scale, chart: Option<RenderedChart>) {
        let mut state = self.state.borrow_mut();
        state.options.station = station;
        state.options.scale = scale;
        if chart.is_some() {
            state.rendered = chart;
        }
    }

    pub async fn zoom_toggle(&self) -> WidgetResult<()> {
        let scale = self.scale().toggled();
        self.request_update(UpdateRequest::ScaleChange(scale)).await
    }

    /// Exports the chart as an image; does nothing before the first render
    pub async fn request_download_image(&self) -> WidgetResult<()> {
        let (chart, export) = {
            let state = self.state.borrow();
            let Some(chart) = state.rendered.clone() else {
                log::debug!("Nothing rendered, skipping image export");
                return Ok(());
            };
            let options = &state.options.export;
            let export = ImageExport {
                format: options.format.clone(),
                width: options.width,
                height: options.height,
                filename: options.filename(&chart.station),
            };
            (chart, export)
        };

        self.sink.relayout(&export_layout(&chart.layout)).await?;
        let exported = self.sink.export_image(&export).await;
        self.sink.relayout(&restore_layout(&chart.layout)).await?;

        if exported.is_ok() {
            log::info!("Exported {}", export.filename);
        }
        exported
    }

    /// Debounced hide; resolves to whether the popover was hidden
    pub async fn request_hide_popover(&self, force: bool) -> WidgetResult<bool> {
        if !self.popover.begin_hide(force) {
            return Ok(false);
        }

        self.sleeper.sleep(self.popover.debounce_ms()).await;

        if self.popover.finish_hide() {
            self.surface.hide()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Routes a hover or click on the chart to the popover; failures hide it
    pub async fn handle_pointer(&self, event: PointerEvent) -> WidgetResult<()> {
        if let Err(e) = self.show_popover(&event) {
            log::warn!("Cannot show popover: {e}");
            self.request_hide_popover(event.is_click()).await?;
        }
        Ok(())
    }

    fn show_popover(&self, event: &PointerEvent) -> WidgetResult<()> {
        let year = event.year()?;
        let series = self
            .state
            .borrow()
            .rendered
            .as_ref()
            .map(|chart| Rc::clone(&chart.series))
            .ok_or_else(|| WidgetError::Internal {
                message: "pointer event before the first render".to_string(),
            })?;

        let content = PopoverContent::for_year(
            &series,
            year,
            self.clock.current_year(),
            self.popover.precision(),
        )?;

        let view = self
            .popover
            .show(&content, event.pixel_x, event.is_click(), self.surface.geometry())?;
        if let Some(view) = view {
            self.surface.show(&view)?;
        }
        Ok(())
    }
}
