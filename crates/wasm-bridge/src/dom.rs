//! Browser side of the widget: Plotly bindings, the render sink over a
//! `.chart` node, the popover node, and the DOM listeners.
//!
//! DOM and chart events are forwarded into an unbounded channel; the closures
//! that produce them are owned by the structs below so they live exactly as
//! long as the widget.

use std::cell::RefCell;

use async_trait::async_trait;
use config_system::WidgetOptions;
use futures::channel::mpsc::UnboundedSender;
use js_sys::{Array, Function, Promise, Reflect};
use serde::Serialize;
use shared_types::{
    ChartPoint, PointerEvent, PointerKind, PopoverGeometry, WidgetError, WidgetResult,
};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Element, Event, HtmlElement};

use crate::chart_spec::ChartSpec;
use crate::render_sink::{ImageExport, PopoverSurface, PopoverView, RenderOutcome, RenderSink};
use crate::styles::{self, OPEN_CLASS, PINNED_CLASS, POPOVER_CLASS};

const CHART_CLASS: &str = "chart";
const CLOSE_SELECTOR: &str = "[data-popover-action=\"hide\"]";

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = Plotly, js_name = react, catch)]
    fn plotly_react(
        target: &HtmlElement,
        data: &JsValue,
        layout: &JsValue,
        config: &JsValue,
    ) -> Result<Promise, JsValue>;

    #[wasm_bindgen(js_namespace = Plotly, js_name = relayout, catch)]
    fn plotly_relayout(target: &HtmlElement, layout: &JsValue) -> Result<Promise, JsValue>;

    #[wasm_bindgen(js_namespace = Plotly, js_name = downloadImage, catch)]
    fn plotly_download_image(target: &HtmlElement, options: &JsValue) -> Result<Promise, JsValue>;

    /// A div after Plotly has initialised it; carries Plotly's event emitter
    #[wasm_bindgen(extends = HtmlElement)]
    type GraphDiv;

    #[wasm_bindgen(method)]
    fn on(this: &GraphDiv, event: &str, handler: &Closure<dyn FnMut(JsValue)>);

    #[wasm_bindgen(method)]
    fn once(this: &GraphDiv, event: &str, handler: &Function);
}

/// Events raised by the page
#[derive(Debug, Clone)]
pub enum DomEvent {
    Pointer(PointerEvent),
    MouseLeave,
    /// Close button of a pinned popover
    Close,
}

fn to_js<T: Serialize + ?Sized>(value: &T) -> WidgetResult<JsValue> {
    // json_compatible: maps become plain objects and `None` becomes null
    let serializer = serde_wasm_bindgen::Serializer::json_compatible();
    value.serialize(&serializer).map_err(|e| WidgetError::JsInterop {
        message: format!("Serialization error: {e}"),
    })
}

fn as_html(element: Element) -> WidgetResult<HtmlElement> {
    element.dyn_into::<HtmlElement>().map_err(|e| WidgetError::JsInterop {
        message: format!("<{}> is not an HTML element", e.tag_name()),
    })
}

fn render_error(e: JsValue) -> WidgetError {
    WidgetError::Render {
        message: e.as_string().unwrap_or_else(|| format!("{e:?}")),
    }
}

pub struct DomRenderSink {
    container: HtmlElement,
    chart: RefCell<Option<HtmlElement>>,
    pending_draw: RefCell<Option<Promise>>,
    events: UnboundedSender<DomEvent>,
    handlers: RefCell<Vec<Closure<dyn FnMut(JsValue)>>>,
}

impl DomRenderSink {
    pub fn new(container: HtmlElement, events: UnboundedSender<DomEvent>) -> Self {
        Self {
            container,
            chart: RefCell::new(None),
            pending_draw: RefCell::new(None),
            events,
            handlers: RefCell::new(Vec::new()),
        }
    }

    /// Reuses an existing `.chart` child or appends a new one
    fn chart_node(&self) -> WidgetResult<HtmlElement> {
        if let Some(chart) = self.chart.borrow().as_ref() {
            return Ok(chart.clone());
        }

        let chart = match self.container.query_selector(&format!(".{CHART_CLASS}"))? {
            Some(existing) => as_html(existing)?,
            None => {
                let document = self
                    .container
                    .owner_document()
                    .ok_or_else(|| WidgetError::Render {
                        message: "container has no document".to_string(),
                    })?;
                let node = as_html(document.create_element("div")?)?;
                node.class_list().add_1(CHART_CLASS)?;
                self.container.append_child(&node)?;
                node
            }
        };

        *self.chart.borrow_mut() = Some(chart.clone());
        Ok(chart)
    }

    fn rendered_chart(&self) -> WidgetResult<HtmlElement> {
        self.chart.borrow().clone().ok_or_else(|| WidgetError::Render {
            message: "chart has not been drawn".to_string(),
        })
    }

    fn attach_pointer_handlers(&self, graph: &GraphDiv) {
        if !self.handlers.borrow().is_empty() {
            return;
        }

        let mut handlers = self.handlers.borrow_mut();
        for (name, kind) in [("plotly_hover", PointerKind::Hover), ("plotly_click", PointerKind::Click)] {
            let events = self.events.clone();
            let handler = Closure::wrap(Box::new(move |event: JsValue| {
                match parse_pointer_event(kind, &event) {
                    Ok(pointer) => {
                        let _ = events.unbounded_send(DomEvent::Pointer(pointer));
                    }
                    Err(e) => log::warn!("Ignoring {name} event: {e}"),
                }
            }) as Box<dyn FnMut(JsValue)>);
            graph.on(name, &handler);
            handlers.push(handler);
        }
    }
}

#[async_trait(?Send)]
impl RenderSink for DomRenderSink {
    async fn render(&self, spec: &ChartSpec) -> WidgetResult<RenderOutcome> {
        if !self.container.is_connected() {
            return Ok(RenderOutcome::NoTarget);
        }

        let chart = self.chart_node()?;
        let rendered = plotly_react(
            &chart,
            &to_js(&spec.data)?,
            &to_js(&spec.layout)?,
            &to_js(&spec.config)?,
        )
        .map_err(render_error)?;

        // Plotly has attached its emitter synchronously inside react
        let graph: &GraphDiv = chart.unchecked_ref();
        let afterplot = Promise::new(&mut |resolve, _reject| {
            graph.once("plotly_afterplot", &resolve);
        });
        *self.pending_draw.borrow_mut() = Some(afterplot);
        self.attach_pointer_handlers(graph);

        JsFuture::from(rendered).await.map_err(render_error)?;
        Ok(RenderOutcome::Drawn)
    }

    async fn relayout(&self, layout: &serde_json::Value) -> WidgetResult<()> {
        let chart = self.rendered_chart()?;
        let promise = plotly_relayout(&chart, &to_js(layout)?).map_err(render_error)?;
        JsFuture::from(promise).await.map_err(render_error)?;
        Ok(())
    }

    async fn export_image(&self, export: &ImageExport) -> WidgetResult<()> {
        let chart = self.rendered_chart()?;
        let promise = plotly_download_image(&chart, &to_js(export)?).map_err(render_error)?;
        JsFuture::from(promise).await.map_err(render_error)?;
        Ok(())
    }

    async fn draw_finished(&self) -> WidgetResult<()> {
        let pending = self.pending_draw.borrow_mut().take();
        if let Some(afterplot) = pending {
            JsFuture::from(afterplot).await?;
        }
        Ok(())
    }
}

fn parse_pointer_event(kind: PointerKind, event: &JsValue) -> WidgetResult<PointerEvent> {
    let points = Reflect::get(event, &"points".into())?;
    let points = Array::from(&points)
        .iter()
        .map(|point| {
            let x = Reflect::get(&point, &"x".into())?
                .as_string()
                .ok_or_else(|| WidgetError::data_shape("point has no x label"))?;
            let y = Reflect::get(&point, &"y".into())?.as_f64();
            let curve = Reflect::get(&point, &"curveNumber".into())?
                .as_f64()
                .unwrap_or_default();
            Ok(ChartPoint::new(x, y, curve as usize))
        })
        .collect::<WidgetResult<Vec<_>>>()?;

    Ok(PointerEvent {
        kind,
        points,
        pixel_x: pointer_pixel_x(event),
    })
}

/// `xaxes[0].l2p(xvals[0])`, when the event carries axes
fn pointer_pixel_x(event: &JsValue) -> Option<f64> {
    let xaxes = Reflect::get(event, &"xaxes".into()).ok()?;
    if xaxes.is_undefined() {
        return None;
    }
    let axis = Array::from(&xaxes).get(0);
    let to_pixel = Reflect::get(&axis, &"l2p".into()).ok()?.dyn_into::<Function>().ok()?;
    let xval = Array::from(&Reflect::get(event, &"xvals".into()).ok()?).get(0);
    to_pixel.call1(&axis, &xval).ok()?.as_f64()
}

pub struct DomPopoverSurface {
    container: HtmlElement,
    node: HtmlElement,
}

impl PopoverSurface for DomPopoverSurface {
    fn show(&self, view: &PopoverView) -> WidgetResult<()> {
        let classes = self.container.class_list();
        classes.add_1(OPEN_CLASS)?;
        if view.pinned {
            classes.add_1(PINNED_CLASS)?;
        }

        let style = self.node.style();
        style.set_property("top", &format!("{}px", view.position.top))?;
        style.set_property("left", &format!("{}px", view.position.left))?;
        self.node.set_inner_html(&view.html);
        Ok(())
    }

    fn hide(&self) -> WidgetResult<()> {
        self.container.class_list().remove_2(OPEN_CLASS, PINNED_CLASS)?;
        Ok(())
    }

    fn geometry(&self) -> PopoverGeometry {
        PopoverGeometry {
            container_width: self.container.offset_width() as f64,
            container_height: self.container.offset_height() as f64,
            popover_width: self.node.offset_width() as f64,
            popover_height: self.node.offset_height() as f64,
        }
    }
}

/// Keeps the container listeners alive
pub struct DomListeners {
    _on_mouse_leave: Closure<dyn FnMut(Event)>,
    _on_popover_click: Closure<dyn FnMut(Event)>,
}

pub struct MountedWidget {
    pub sink: DomRenderSink,
    pub surface: DomPopoverSurface,
    pub listeners: DomListeners,
}

/// Installs the scoped styles, the popover node and the listeners into
/// `container`. A container without an id gets a generated one.
pub fn mount(
    container: &HtmlElement,
    options: &WidgetOptions,
    events: UnboundedSender<DomEvent>,
) -> WidgetResult<MountedWidget> {
    if container.id().is_empty() {
        container.set_id(&format!("tidal-widget-{}", uuid::Uuid::new_v4()));
    }
    let document = container.owner_document().ok_or_else(|| WidgetError::JsInterop {
        message: "container has no document".to_string(),
    })?;

    let style = document.create_element("style")?;
    style.set_inner_html(&styles::stylesheet(&container.id(), &options.colors)?);
    container.append_child(&style)?;

    let node = as_html(document.create_element("span")?)?;
    node.class_list().add_1(POPOVER_CLASS)?;
    container.append_child(&node)?;

    let leave_events = events.clone();
    let on_mouse_leave = Closure::wrap(Box::new(move |_: Event| {
        let _ = leave_events.unbounded_send(DomEvent::MouseLeave);
    }) as Box<dyn FnMut(Event)>);
    container
        .add_event_listener_with_callback("mouseleave", on_mouse_leave.as_ref().unchecked_ref())?;

    let close_events = events.clone();
    let on_popover_click = Closure::wrap(Box::new(move |event: Event| {
        let on_close_button = event
            .target()
            .and_then(|target| target.dyn_into::<Element>().ok())
            .and_then(|target| target.closest(CLOSE_SELECTOR).ok().flatten())
            .is_some();
        if on_close_button {
            let _ = close_events.unbounded_send(DomEvent::Close);
        }
    }) as Box<dyn FnMut(Event)>);
    node.add_event_listener_with_callback("click", on_popover_click.as_ref().unchecked_ref())?;

    log::debug!("Mounted widget into #{}", container.id());

    Ok(MountedWidget {
        sink: DomRenderSink::new(container.clone(), events),
        surface: DomPopoverSurface {
            container: container.clone(),
            node,
        },
        listeners: DomListeners {
            _on_mouse_leave: on_mouse_leave,
            _on_popover_click: on_popover_click,
        },
    })
}
