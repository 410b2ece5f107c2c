use anyhow::Result;
use async_trait::async_trait;

use crate::models::{
    ElementDescriptor, MouseButton, Rect, Scope, SelectorParams, WindowDescriptor,
};

/// Stable identifier for live UI elements, scoped to the provider that
/// issued it.
pub type ElementId = String;

/// Live-UI capability consumed by the resolver and the action executors.
/// Abstracts the platform accessibility API behind a common interface so
/// everything above it can run against a test double.
///
/// Queries return plain lists and options; the caller decides what a zero
/// match or a missing window means.
#[async_trait]
pub trait AutomationProvider: Send + Sync {
    /// Root element for a search, narrowed by the window scope filter.
    /// `None` when no window satisfies the filter.
    async fn scope_root(&self, scope: Option<&Scope>) -> Result<Option<ElementId>>;

    /// All descendants of `root` matching the structural attributes in
    /// `selector` (automation id, name, control type, class).
    async fn find_by_attributes(
        &self,
        root: &ElementId,
        selector: &SelectorParams,
    ) -> Result<Vec<ElementId>>;

    /// Elements near the text label named by `selector.label`, constrained
    /// by `selector.direction` and `selector.max_distance_px`.
    async fn find_near_label(
        &self,
        root: &ElementId,
        selector: &SelectorParams,
    ) -> Result<Vec<ElementId>>;

    /// Serializable snapshot of an element.
    async fn describe(&self, element: &ElementId) -> Result<ElementDescriptor>;

    /// Screen-space bounds, when the element reports any.
    async fn bounding_rect(&self, element: &ElementId) -> Result<Option<Rect>>;

    /// Single or double click with the given button.
    async fn click(&self, element: &ElementId, button: MouseButton, double: bool) -> Result<()>;

    /// Direct value write through the element's value accessor.
    async fn set_value(&self, element: &ElementId, value: &str) -> Result<()>;

    /// Clipboard copy, focus, paste. The slow path behind `set_value`.
    async fn paste_text(&self, element: &ElementId, text: &str) -> Result<()>;

    /// Exposed value, or the element's display name when it has no value
    /// accessor.
    async fn get_value(&self, element: &ElementId) -> Result<String>;

    async fn is_visible(&self, element: &ElementId) -> Result<bool>;

    /// Control type of the focused element, if anything holds focus.
    async fn focused_control_type(&self) -> Result<Option<String>>;

    /// The current foreground window, if any.
    async fn active_window(&self) -> Result<Option<WindowDescriptor>>;

    /// Bring the first window matching `scope` to the foreground and
    /// return its descriptor. `None` when nothing matches.
    async fn focus_window(&self, scope: &Scope) -> Result<Option<WindowDescriptor>>;
}

/// Create the platform automation provider.
///
/// The accessibility backends live out of tree; builds that ship one
/// register it here. Without one the service still answers protocol,
/// run-lifecycle, and screenshot methods.
pub fn create_provider() -> Result<Box<dyn AutomationProvider>> {
    Err(anyhow::anyhow!(
        "no automation provider is built into this binary"
    ))
}
