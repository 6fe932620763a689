//! Browser backend built on `web-sys`.
//!
//! The page's style sheet is expected to provide rules for the animate,
//! paused and duplicate marker classes; this module only toggles them and
//! publishes the loop duration as an inline style.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use tracing::{debug, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    Document, Element, Event, EventTarget, HtmlElement, MediaQueryList,
    MediaQueryListEvent, Window,
};

use crate::config::MarqueeConfig;
use crate::controller::{MarqueeController, MarqueeStatus, MountStatus};
use crate::error::{MarqueeError, Result};
use crate::playback::PlaybackState;
use crate::surface::{ListenerKind, MarqueeEvent, MarqueeHost, MarqueeSurface};

type SharedController = Rc<RefCell<MarqueeController<WebHost>>>;

/// A container element in the live document.
#[derive(Clone, Debug)]
pub struct WebSurface {
    element: HtmlElement,
}

impl WebSurface {
    /// Wrap a container element.
    pub fn new(element: HtmlElement) -> Self {
        Self { element }
    }

    /// The underlying container element.
    pub fn element(&self) -> &HtmlElement {
        &self.element
    }

    fn child(&self, index: usize) -> Option<Element> {
        let index = u32::try_from(index).ok()?;
        self.element.children().item(index)
    }
}

impl MarqueeSurface for WebSurface {
    /// `innerHTML` of the container
    type Snapshot = String;

    fn child_count(&self) -> usize {
        self.element.children().length() as usize
    }

    fn child_has_class(&self, index: usize, class: &str) -> bool {
        self.child(index)
            .map(|c| c.class_list().contains(class))
            .unwrap_or(false)
    }

    fn append_tagged_clone(&mut self, index: usize, class: &str) -> Result<()> {
        let child = self.child(index).ok_or_else(|| {
            MarqueeError::dom("children.item", format!("no child at index {}", index))
        })?;
        let copy = child
            .clone_node_with_deep(true)
            .map_err(|e| MarqueeError::dom("cloneNode", e))?
            .dyn_into::<Element>()
            .map_err(|e| MarqueeError::dom("cloneNode", e))?;
        copy.class_list()
            .add_1(class)
            .map_err(|e| MarqueeError::dom("classList.add", e))?;
        self.element
            .append_child(&copy)
            .map_err(|e| MarqueeError::dom("appendChild", e))?;
        Ok(())
    }

    fn snapshot(&self) -> String {
        self.element.inner_html()
    }

    fn restore(&mut self, snapshot: &Self::Snapshot) -> Result<()> {
        self.element.set_inner_html(snapshot);
        Ok(())
    }

    fn has_class(&self, class: &str) -> bool {
        self.element.class_list().contains(class)
    }

    fn add_class(&mut self, class: &str) -> Result<()> {
        self.element
            .class_list()
            .add_1(class)
            .map_err(|e| MarqueeError::dom("classList.add", e))
    }

    fn remove_class(&mut self, class: &str) -> Result<()> {
        self.element
            .class_list()
            .remove_1(class)
            .map_err(|e| MarqueeError::dom("classList.remove", e))
    }

    fn set_style_property(&mut self, name: &str, value: &str) -> Result<()> {
        self.element
            .style()
            .set_property(name, value)
            .map_err(|e| MarqueeError::dom("style.setProperty", e))
    }

    fn content_width(&self) -> f64 {
        self.element.scroll_width() as f64
    }

    fn viewport_width(&self) -> Option<f64> {
        self.element.parent_element().map(|p| p.client_width() as f64)
    }
}

/// A registered DOM listener. Dropping it without unsubscribing leaks the
/// registration, so the controller always hands it back to the host.
pub struct WebListener {
    target: EventTarget,
    event_type: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

/// The live window/document pair plus a back-reference used by listeners
/// to reach the controller that owns this host.
pub struct WebHost {
    window: Window,
    document: Document,
    /// Query list for the configured reduced-motion query, shared by the
    /// preference read and the change listener
    motion_list: Option<(String, MediaQueryList)>,
    controller: Weak<RefCell<MarqueeController<WebHost>>>,
}

impl WebHost {
    fn media_list(&self, query: &str) -> Result<MediaQueryList> {
        if let Some((cached, list)) = &self.motion_list {
            if cached == query {
                return Ok(list.clone());
            }
        }
        self.window
            .match_media(query)
            .map_err(|e| MarqueeError::dom("matchMedia", e))?
            .ok_or_else(|| MarqueeError::dom("matchMedia", "query not supported"))
    }
}

impl MarqueeHost for WebHost {
    type Surface = WebSurface;
    type Subscription = WebListener;

    fn find_container(&mut self, id: &str) -> Option<WebSurface> {
        self.document
            .get_element_by_id(id)?
            .dyn_into::<HtmlElement>()
            .ok()
            .map(WebSurface::new)
    }

    fn prefers_reduced_motion(&self, query: &str) -> bool {
        self.media_list(query)
            .map(|list| list.matches())
            .unwrap_or(false)
    }

    fn subscribe(
        &mut self,
        surface: &WebSurface,
        kind: ListenerKind,
        reduced_motion_query: &str,
    ) -> Result<WebListener> {
        let target: EventTarget = match kind {
            ListenerKind::PointerEnter | ListenerKind::PointerLeave => {
                surface.element.clone().into()
            }
            ListenerKind::Resize => self.window.clone().into(),
            ListenerKind::MotionPreference => self.media_list(reduced_motion_query)?.into(),
        };

        let controller = self.controller.clone();
        let callback = Closure::wrap(Box::new(move |event: Event| {
            if let Some(event) = translate_event(kind, &event) {
                dispatch(&controller, event);
            }
        }) as Box<dyn FnMut(Event)>);

        target
            .add_event_listener_with_callback(kind.event_type(), callback.as_ref().unchecked_ref())
            .map_err(|e| MarqueeError::dom("addEventListener", e))?;

        Ok(WebListener {
            target,
            event_type: kind.event_type(),
            callback,
        })
    }

    fn unsubscribe(&mut self, listener: WebListener) {
        if let Err(err) = listener.target.remove_event_listener_with_callback(
            listener.event_type,
            listener.callback.as_ref().unchecked_ref(),
        ) {
            warn!(event_type = listener.event_type, ?err, "failed to remove marquee listener");
        }
    }
}

fn translate_event(kind: ListenerKind, event: &Event) -> Option<MarqueeEvent> {
    match kind {
        ListenerKind::PointerEnter => Some(MarqueeEvent::PointerEnter),
        ListenerKind::PointerLeave => Some(MarqueeEvent::PointerLeave),
        ListenerKind::Resize => Some(MarqueeEvent::Resize),
        ListenerKind::MotionPreference => event
            .dyn_ref::<MediaQueryListEvent>()
            .map(|e| MarqueeEvent::MotionPreferenceChanged { reduced: e.matches() }),
    }
}

fn dispatch(controller: &Weak<RefCell<MarqueeController<WebHost>>>, event: MarqueeEvent) {
    let Some(controller) = controller.upgrade() else {
        return;
    };
    let Ok(mut controller) = controller.try_borrow_mut() else {
        warn!(?event, "marquee busy, event dropped");
        return;
    };
    if let Err(err) = controller.handle_event(event) {
        warn!(?event, %err, "marquee event failed");
    }
}

/// A marquee mounted in the current document.
///
/// Cloning shares the same controller.
#[derive(Clone)]
pub struct WebMarquee {
    inner: SharedController,
}

impl WebMarquee {
    /// Create an unmounted marquee bound to the global window.
    pub fn new(config: MarqueeConfig) -> Result<Self> {
        let window =
            web_sys::window().ok_or_else(|| MarqueeError::dom("window", "no window available"))?;
        let document = window
            .document()
            .ok_or_else(|| MarqueeError::dom("document", "no document available"))?;
        let query = config.reduced_motion_query.clone();
        let motion_list = window
            .match_media(&query)
            .ok()
            .flatten()
            .map(|list| (query, list));

        let inner = Rc::new_cyclic(|weak| {
            RefCell::new(MarqueeController::new(
                config,
                WebHost {
                    window,
                    document,
                    motion_list,
                    controller: weak.clone(),
                },
            ))
        });
        Ok(Self { inner })
    }

    /// Mount on the configured container.
    pub fn initialize(&self) -> Result<MountStatus> {
        let mut controller = self.inner.borrow_mut();
        let container_id = controller.config().container_id.clone();
        controller.initialize(&container_id)
    }

    /// Restore the original markup and mount again.
    pub fn reset(&self) -> Result<()> {
        self.inner.borrow_mut().reset()
    }

    /// Remove every listener and marker class.
    pub fn teardown(&self) -> Result<()> {
        self.inner.borrow_mut().teardown()
    }

    /// Snapshot of the underlying controller.
    pub fn status(&self) -> MarqueeStatus {
        self.inner.borrow().status()
    }

    /// The query list the reduced-motion listener is attached to.
    pub fn motion_query_list(&self) -> Option<MediaQueryList> {
        let controller = self.inner.borrow();
        let query = &controller.config().reduced_motion_query;
        controller.host().media_list(query).ok()
    }

    /// Register a JS-visible handle under `name` on the window, for
    /// inspection from the developer console.
    pub fn expose_for_debugging(&self, name: &str) -> Result<()> {
        let window =
            web_sys::window().ok_or_else(|| MarqueeError::dom("window", "no window available"))?;
        let handle = MarqueeHandle { inner: self.clone() };
        js_sys::Reflect::set(&window, &JsValue::from_str(name), &JsValue::from(handle))
            .map_err(|e| MarqueeError::dom("Reflect.set", e))?;
        debug!(name, "marquee exposed for debugging");
        Ok(())
    }
}

/// Create a marquee and mount it once the document is parsed.
///
/// Mount failures are logged, never returned: the page simply keeps a
/// static band.
pub fn mount_when_ready(config: MarqueeConfig) -> Result<WebMarquee> {
    let marquee = WebMarquee::new(config)?;
    let document = marquee.inner.borrow().host().document.clone();

    if document.ready_state() == "loading" {
        let pending = marquee.clone();
        let on_ready = Closure::once_into_js(move || initialize_logged(&pending));
        document
            .add_event_listener_with_callback("DOMContentLoaded", on_ready.unchecked_ref())
            .map_err(|e| MarqueeError::dom("addEventListener", e))?;
    } else {
        initialize_logged(&marquee);
    }
    Ok(marquee)
}

fn initialize_logged(marquee: &WebMarquee) {
    match marquee.initialize() {
        Ok(MountStatus::Mounted) => debug!("marquee mounted"),
        Ok(MountStatus::Missing) => {}
        Err(err) => warn!(%err, "marquee failed to start"),
    }
}

/// JS handle to a mounted marquee.
#[wasm_bindgen]
pub struct MarqueeHandle {
    inner: WebMarquee,
}

#[wasm_bindgen]
impl MarqueeHandle {
    pub fn reset(&self) -> std::result::Result<(), JsValue> {
        self.inner.reset().map_err(to_js)
    }

    pub fn teardown(&self) -> std::result::Result<(), JsValue> {
        self.inner.teardown().map_err(to_js)
    }

    #[wasm_bindgen(js_name = isPaused)]
    pub fn is_paused(&self) -> bool {
        self.inner.status().playback == PlaybackState::Paused
    }

    #[wasm_bindgen(js_name = durationSecs)]
    pub fn duration_secs(&self) -> f64 {
        self.inner.status().duration_secs
    }

    /// Status snapshot as text (JSON with the `serde` feature).
    pub fn status(&self) -> String {
        status_text(&self.inner.status())
    }
}

/// Mount a marquee on `container_id` (default `marqueeContent`) and return
/// a handle to it.
#[wasm_bindgen(js_name = mountMarquee)]
pub fn mount_marquee(container_id: Option<String>) -> std::result::Result<MarqueeHandle, JsValue> {
    let config = match container_id {
        Some(id) => MarqueeConfig::for_container(id),
        None => MarqueeConfig::default(),
    };
    let inner = mount_when_ready(config).map_err(to_js)?;
    Ok(MarqueeHandle { inner })
}

fn to_js(err: MarqueeError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

#[cfg(feature = "serde")]
fn status_text(status: &MarqueeStatus) -> String {
    serde_json::to_string(status).unwrap_or_else(|e| format!("{{\"error\":\"{}\"}}", e))
}

#[cfg(not(feature = "serde"))]
fn status_text(status: &MarqueeStatus) -> String {
    format!("{:?}", status)
}
