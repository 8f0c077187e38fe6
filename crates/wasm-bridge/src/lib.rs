//! WASM Bridge crate for the tidal stations widget
//! Orchestrates fetch, transform and render, and exposes the widget to
//! JavaScript as `TidalStationsWidget`.

pub mod chart_spec;
pub mod popover;
pub mod render_sink;
pub mod styles;
pub mod timer;
pub mod widget;

#[cfg(target_arch = "wasm32")]
pub mod dom;

pub use chart_spec::ChartSpec;
pub use popover::PopoverController;
pub use render_sink::{ImageExport, PopoverSurface, PopoverView, RenderOutcome, RenderSink};
pub use widget::{RenderedChart, Widget};

#[cfg(target_arch = "wasm32")]
pub use wasm_api::TidalStationsWidget;

#[cfg(target_arch = "wasm32")]
mod wasm_api {
    use std::rc::Rc;
    use std::sync::Once;

    use config_system::WidgetOptions;
    use data_manager::DataManager;
    use futures::channel::mpsc::{self, UnboundedReceiver, UnboundedSender};
    use futures::StreamExt;
    use js_sys::Promise;
    use shared_types::{PartialUpdate, UpdateRequest, WidgetError, WidgetResult};
    use wasm_bindgen::prelude::*;
    use wasm_bindgen_futures::{future_to_promise, spawn_local};
    use web_sys::HtmlElement;

    use crate::dom::{self, DomEvent, DomListeners};
    use crate::widget::Widget;

    fn init_logging() {
        static INIT: Once = Once::new();
        INIT.call_once(|| {
            console_error_panic_hook::set_once();
            // Try to initialize logger, but don't panic if it fails (already initialized)
            let _ = console_log::init_with_level(log::Level::Info);
        });
    }

    fn from_js<T: serde::de::DeserializeOwned + Default>(value: JsValue, field: &str) -> WidgetResult<T> {
        if value.is_undefined() || value.is_null() {
            return Ok(T::default());
        }
        serde_wasm_bindgen::from_value(value)
            .map_err(|e| WidgetError::invalid_config(field, e.to_string()))
    }

    #[wasm_bindgen]
    pub struct TidalStationsWidget {
        widget: Rc<Widget>,
        events: UnboundedSender<DomEvent>,
        _listeners: DomListeners,
    }

    #[wasm_bindgen]
    impl TidalStationsWidget {
        #[wasm_bindgen(constructor)]
        pub fn new(element: HtmlElement, options: JsValue) -> Result<TidalStationsWidget, JsValue> {
            init_logging();

            let overrides: serde_json::Value = from_js(options, "options")?;
            let options = WidgetOptions::from_overrides(overrides)?;
            let data = DataManager::from_options(&options.data)?;

            let (events, receiver) = mpsc::unbounded();
            let mounted = dom::mount(&element, &options, events.clone())?;
            let widget = Rc::new(Widget::new(
                options,
                data,
                Rc::new(mounted.sink),
                Rc::new(mounted.surface),
            ));

            spawn_local(dispatch_events(Rc::clone(&widget), receiver));

            let initial = Rc::clone(&widget);
            spawn_local(async move {
                if let Err(e) = initial.initialize().await {
                    log::error!("Initial update failed: {e}");
                }
            });

            Ok(TidalStationsWidget {
                widget,
                events,
                _listeners: mounted.listeners,
            })
        }

        /// Accepts `{station?, scale?}`
        pub fn request_update(&self, options: JsValue) -> Promise {
            let widget = Rc::clone(&self.widget);
            future_to_promise(async move {
                let partial: PartialUpdate = from_js(options, "request_update")?;
                let request =
                    UpdateRequest::from_partial(&partial, widget.station().as_ref(), widget.scale());
                widget.request_update(request).await?;
                Ok(JsValue::UNDEFINED)
            })
        }

        pub fn zoom_toggle(&self) -> Promise {
            let widget = Rc::clone(&self.widget);
            future_to_promise(async move {
                widget.zoom_toggle().await?;
                Ok(JsValue::UNDEFINED)
            })
        }

        pub fn request_download_image(&self) -> Promise {
            let widget = Rc::clone(&self.widget);
            future_to_promise(async move {
                widget.request_download_image().await?;
                Ok(JsValue::UNDEFINED)
            })
        }

        /// Resolves to whether the popover was hidden
        pub fn request_hide_popover(&self, force: Option<bool>) -> Promise {
            let widget = Rc::clone(&self.widget);
            future_to_promise(async move {
                let hidden = widget.request_hide_popover(force.unwrap_or(false)).await?;
                Ok(JsValue::from_bool(hidden))
            })
        }

        pub fn scale(&self) -> String {
            self.widget.scale().to_string()
        }

        pub fn station(&self) -> Option<String> {
            self.widget.station().map(|station| station.to_string())
        }

        pub fn cache_stats(&self) -> JsValue {
            serde_wasm_bindgen::to_value(&self.widget.cache_stats()).unwrap_or(JsValue::NULL)
        }
    }

    impl Drop for TidalStationsWidget {
        fn drop(&mut self) {
            // ends dispatch_events, which releases its widget handle
            self.events.close_channel();
        }
    }

    /// Each event runs as its own task so a show can cancel a pending hide
    async fn dispatch_events(widget: Rc<Widget>, mut events: UnboundedReceiver<DomEvent>) {
        while let Some(event) = events.next().await {
            let widget = Rc::clone(&widget);
            spawn_local(async move {
                let result = match event {
                    DomEvent::Pointer(pointer) => widget.handle_pointer(pointer).await,
                    DomEvent::MouseLeave => widget.request_hide_popover(false).await.map(|_| ()),
                    DomEvent::Close => widget.request_hide_popover(true).await.map(|_| ()),
                };
                if let Err(e) = result {
                    log::warn!("Event handling failed: {e}");
                }
            });
        }
        log::debug!("Widget event channel closed");
    }
}
