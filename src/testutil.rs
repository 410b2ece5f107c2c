//! Shared fakes for unit tests.

use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;

use crate::artifacts::{CaptureMode, ScreenCapture};
use crate::models::{
    ElementDescriptor, MouseButton, Rect, Scope, SelectorParams, WindowDescriptor,
};
use crate::provider::{AutomationProvider, ElementId};

/// In-memory provider. Attribute and label queries are keyed by the
/// selector's `name`/`label` field; everything else is configurable state.
pub struct FakeProvider {
    matches: HashMap<String, Vec<ElementId>>,
    label_matches: HashMap<String, Vec<ElementId>>,
    failing_selectors: Vec<String>,
    /// Queries return empty until this many find calls have happened.
    matches_after: usize,
    scope_found: bool,
    pub values: Mutex<HashMap<ElementId, String>>,
    /// When non-empty, `get_value` pops from the front instead.
    pub value_sequence: Mutex<VecDeque<String>>,
    pub visible: bool,
    pub rect: Option<Rect>,
    pub active: Option<WindowDescriptor>,
    pub focused: Option<String>,
    pub fail_set_value: bool,
    pub fail_paste: bool,
    /// Every mutation the provider was asked for, in order.
    pub calls: Mutex<Vec<String>>,
    pub find_calls: AtomicUsize,
}

impl Default for FakeProvider {
    fn default() -> Self {
        Self {
            matches: HashMap::new(),
            label_matches: HashMap::new(),
            failing_selectors: Vec::new(),
            matches_after: 0,
            scope_found: true,
            values: Mutex::new(HashMap::new()),
            value_sequence: Mutex::new(VecDeque::new()),
            visible: true,
            rect: None,
            active: None,
            focused: None,
            fail_set_value: false,
            fail_paste: false,
            calls: Mutex::new(Vec::new()),
            find_calls: AtomicUsize::new(0),
        }
    }
}

impl FakeProvider {
    pub fn with_matches(mut self, name: &str, elements: Vec<&str>) -> Self {
        self.matches
            .insert(name.to_string(), elements.into_iter().map(String::from).collect());
        self
    }

    pub fn with_label_matches(mut self, label: &str, elements: Vec<&str>) -> Self {
        self.label_matches
            .insert(label.to_string(), elements.into_iter().map(String::from).collect());
        self
    }

    pub fn matches_after(mut self, calls: usize) -> Self {
        self.matches_after = calls;
        self
    }

    pub fn without_scope(mut self) -> Self {
        self.scope_found = false;
        self
    }

    pub fn failing_on(mut self, name: &str) -> Self {
        self.failing_selectors.push(name.to_string());
        self
    }

    pub fn with_value(self, element: &str, value: &str) -> Self {
        self.values
            .lock()
            .unwrap()
            .insert(element.to_string(), value.to_string());
        self
    }

    pub fn with_active_window(mut self, window: WindowDescriptor) -> Self {
        self.active = Some(window);
        self
    }

    pub fn recorded_calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn lookup(&self, table: &HashMap<String, Vec<ElementId>>, key: Option<&str>) -> Vec<ElementId> {
        let count = self.find_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if count <= self.matches_after {
            return Vec::new();
        }
        key.and_then(|k| table.get(k)).cloned().unwrap_or_default()
    }
}

#[async_trait]
impl AutomationProvider for FakeProvider {
    async fn scope_root(&self, _scope: Option<&Scope>) -> Result<Option<ElementId>> {
        Ok(self.scope_found.then(|| "root".to_string()))
    }

    async fn find_by_attributes(
        &self,
        _root: &ElementId,
        selector: &SelectorParams,
    ) -> Result<Vec<ElementId>> {
        if let Some(name) = &selector.name {
            if self.failing_selectors.contains(name) {
                self.find_calls.fetch_add(1, Ordering::SeqCst);
                bail!("provider query failed for {name}");
            }
        }
        Ok(self.lookup(&self.matches, selector.name.as_deref()))
    }

    async fn find_near_label(
        &self,
        _root: &ElementId,
        selector: &SelectorParams,
    ) -> Result<Vec<ElementId>> {
        Ok(self.lookup(&self.label_matches, selector.label.as_deref()))
    }

    async fn describe(&self, element: &ElementId) -> Result<ElementDescriptor> {
        Ok(ElementDescriptor {
            name: Some(element.clone()),
            ..Default::default()
        })
    }

    async fn bounding_rect(&self, _element: &ElementId) -> Result<Option<Rect>> {
        Ok(self.rect)
    }

    async fn click(&self, element: &ElementId, button: MouseButton, double: bool) -> Result<()> {
        let gesture = if double { "double" } else { "single" };
        self.record(format!("click:{element}:{}:{gesture}", button.as_str()));
        Ok(())
    }

    async fn set_value(&self, element: &ElementId, value: &str) -> Result<()> {
        if self.fail_set_value {
            bail!("value pattern rejected the write");
        }
        self.record(format!("set_value:{element}:{value}"));
        self.values
            .lock()
            .unwrap()
            .insert(element.clone(), value.to_string());
        Ok(())
    }

    async fn paste_text(&self, element: &ElementId, text: &str) -> Result<()> {
        if self.fail_paste {
            bail!("paste rejected");
        }
        self.record(format!("paste:{element}:{text}"));
        Ok(())
    }

    async fn get_value(&self, element: &ElementId) -> Result<String> {
        if let Some(next) = self.value_sequence.lock().unwrap().pop_front() {
            return Ok(next);
        }
        Ok(self
            .values
            .lock()
            .unwrap()
            .get(element)
            .cloned()
            .unwrap_or_default())
    }

    async fn is_visible(&self, _element: &ElementId) -> Result<bool> {
        Ok(self.visible)
    }

    async fn focused_control_type(&self) -> Result<Option<String>> {
        Ok(self.focused.clone())
    }

    async fn active_window(&self) -> Result<Option<WindowDescriptor>> {
        Ok(self.active.clone())
    }

    async fn focus_window(&self, scope: &Scope) -> Result<Option<WindowDescriptor>> {
        self.record("focus_window".to_string());
        Ok(self.active.clone().filter(|w| scope.matches(w)))
    }
}

/// Capture double that writes a stub file where a PNG would go.
pub struct FakeCapture;

impl ScreenCapture for FakeCapture {
    fn capture(&self, name: &str, dir: &Path, _mode: CaptureMode) -> Result<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(name);
        std::fs::write(&path, b"stub-png")?;
        Ok(path)
    }
}

/// Capture double that always fails.
pub struct FailingCapture;

impl ScreenCapture for FailingCapture {
    fn capture(&self, _name: &str, _dir: &Path, _mode: CaptureMode) -> Result<PathBuf> {
        Err(anyhow!("capture device unavailable"))
    }
}
