//! Integration tests for the RPC dispatcher.
//!
//! These drive the full dispatch path the way the orchestrator does over
//! stdio: one serialized request line in, one response line out, against
//! fake automation and capture capabilities.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::Mutex;

use anyhow::{bail, Result};
use async_trait::async_trait;
use serde_json::{json, Value};

use uipilot::artifacts::{CaptureMode, ScreenCapture};
use uipilot::config::Config;
use uipilot::models::{
    ElementDescriptor, MouseButton, Rect, Scope, SelectorParams, WindowDescriptor,
};
use uipilot::provider::{AutomationProvider, ElementId};
use uipilot::rpc::Dispatcher;

/// Minimal desktop stand-in: a notepad-like window with one edit control
/// and one button.
struct ScriptedDesktop {
    elements: HashMap<String, Vec<ElementId>>,
    values: Mutex<HashMap<ElementId, String>>,
    reject_direct_set: bool,
    calls: Mutex<Vec<String>>,
}

impl ScriptedDesktop {
    fn new() -> Self {
        let mut elements = HashMap::new();
        elements.insert("editor".to_string(), vec!["edit-1".to_string()]);
        elements.insert("save".to_string(), vec!["btn-save".to_string()]);
        Self {
            elements,
            values: Mutex::new(HashMap::new()),
            reject_direct_set: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    fn window() -> WindowDescriptor {
        WindowDescriptor {
            id: "w1".to_string(),
            title: "Untitled - Notepad".to_string(),
            window_class: Some("Notepad".to_string()),
            process_name: Some("notepad.exe".to_string()),
            process_id: Some(77),
        }
    }
}

#[async_trait]
impl AutomationProvider for ScriptedDesktop {
    async fn scope_root(&self, _scope: Option<&Scope>) -> Result<Option<ElementId>> {
        Ok(Some("root".to_string()))
    }

    async fn find_by_attributes(
        &self,
        _root: &ElementId,
        selector: &SelectorParams,
    ) -> Result<Vec<ElementId>> {
        Ok(selector
            .name
            .as_deref()
            .and_then(|name| self.elements.get(name))
            .cloned()
            .unwrap_or_default())
    }

    async fn find_near_label(
        &self,
        _root: &ElementId,
        _selector: &SelectorParams,
    ) -> Result<Vec<ElementId>> {
        Ok(Vec::new())
    }

    async fn describe(&self, element: &ElementId) -> Result<ElementDescriptor> {
        Ok(ElementDescriptor {
            automation_id: Some(element.clone()),
            control_type: Some("Edit".to_string()),
            bounding_rect: Some(Rect::new(10.0, 10.0, 200.0, 24.0)),
            ..Default::default()
        })
    }

    async fn bounding_rect(&self, _element: &ElementId) -> Result<Option<Rect>> {
        Ok(Some(Rect::new(10.0, 10.0, 200.0, 24.0)))
    }

    async fn click(&self, element: &ElementId, button: MouseButton, double: bool) -> Result<()> {
        self.calls.lock().unwrap().push(format!(
            "click:{element}:{}:{}",
            button.as_str(),
            if double { "double" } else { "single" }
        ));
        Ok(())
    }

    async fn set_value(&self, element: &ElementId, value: &str) -> Result<()> {
        if self.reject_direct_set {
            bail!("value pattern not supported");
        }
        self.values
            .lock()
            .unwrap()
            .insert(element.clone(), value.to_string());
        Ok(())
    }

    async fn paste_text(&self, element: &ElementId, text: &str) -> Result<()> {
        self.calls.lock().unwrap().push(format!("paste:{element}"));
        self.values
            .lock()
            .unwrap()
            .insert(element.clone(), text.to_string());
        Ok(())
    }

    async fn get_value(&self, element: &ElementId) -> Result<String> {
        Ok(self
            .values
            .lock()
            .unwrap()
            .get(element)
            .cloned()
            .unwrap_or_default())
    }

    async fn is_visible(&self, _element: &ElementId) -> Result<bool> {
        Ok(true)
    }

    async fn focused_control_type(&self) -> Result<Option<String>> {
        Ok(Some("Edit".to_string()))
    }

    async fn active_window(&self) -> Result<Option<WindowDescriptor>> {
        Ok(Some(Self::window()))
    }

    async fn focus_window(&self, scope: &Scope) -> Result<Option<WindowDescriptor>> {
        let window = Self::window();
        Ok(scope.matches(&window).then_some(window))
    }
}

struct StubCapture;

impl ScreenCapture for StubCapture {
    fn capture(&self, name: &str, dir: &Path, _mode: CaptureMode) -> Result<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(name);
        std::fs::write(&path, b"stub")?;
        Ok(path)
    }
}

fn dispatcher(desktop: ScriptedDesktop) -> Dispatcher {
    Dispatcher::new(
        Some(Arc::new(desktop)),
        Arc::new(StubCapture),
        Config::default(),
    )
}

async fn call(d: &Dispatcher, request: Value) -> Value {
    let raw = d.handle_line(&serde_json::to_string(&request).unwrap()).await;
    serde_json::from_str(&raw).unwrap()
}

fn editor_target() -> Value {
    json!({"ladder": [{"kind": "attr", "selector": {"name": "editor"}}]})
}

// ============================================================================
// Full run flow: begin, focus, act, assert, extract, screenshot, end
// ============================================================================

#[tokio::test]
async fn test_full_run_flow() {
    let d = dispatcher(ScriptedDesktop::new());
    let dir = tempfile::tempdir().unwrap();

    let begin = call(
        &d,
        json!({
            "jsonrpc": "2.0", "id": 1, "method": "run.begin",
            "params": {"run_id": "r1", "artifact_dir": dir.path()}
        }),
    )
    .await;
    assert_eq!(begin["result"]["ok"], true);

    let focus = call(
        &d,
        json!({
            "jsonrpc": "2.0", "id": 2, "method": "window.focus",
            "params": {"run_id": "r1", "step_id": "s1", "scope": {"title_contains": "notepad"}}
        }),
    )
    .await;
    assert_eq!(focus["result"]["ok"], true);
    assert_eq!(focus["result"]["window"]["id"], "w1");

    let set = call(
        &d,
        json!({
            "jsonrpc": "2.0", "id": 3, "method": "action.setValue",
            "params": {
                "run_id": "r1", "step_id": "s2",
                "target": editor_target(), "value": "Hello world"
            }
        }),
    )
    .await;
    assert_eq!(set["result"]["ok"], true);
    assert_eq!(set["result"]["resolved"]["rung_index"], 0);

    let check = call(
        &d,
        json!({
            "jsonrpc": "2.0", "id": 4, "method": "assert.check",
            "params": {
                "run_id": "r1", "step_id": "s3",
                "assertions": [
                    {"kind": "window_active", "scope": {"process_name": "notepad"}},
                    {"kind": "value_contains", "target": editor_target(), "value": "Hello"},
                    {"kind": "focused_control_type", "control_type": "Edit"}
                ]
            }
        }),
    )
    .await;
    assert_eq!(check["result"]["ok"], true);

    let extract = call(
        &d,
        json!({
            "jsonrpc": "2.0", "id": 5, "method": "extract.getValue",
            "params": {"run_id": "r1", "step_id": "s4", "target": editor_target()}
        }),
    )
    .await;
    assert_eq!(extract["result"]["value"], "Hello world");

    let shot = call(
        &d,
        json!({
            "jsonrpc": "2.0", "id": 6, "method": "artifact.screenshot",
            "params": {"run_id": "r1", "step_id": "s5", "name": "final.png", "mode": "screen"}
        }),
    )
    .await;
    assert_eq!(shot["result"]["ok"], true);
    assert!(dir.path().join("final.png").exists());

    let end = call(
        &d,
        json!({"jsonrpc": "2.0", "id": 7, "method": "run.end", "params": {"run_id": "r1"}}),
    )
    .await;
    assert_eq!(end["result"]["ok"], true);
}

// ============================================================================
// Click gestures
// ============================================================================

#[tokio::test]
async fn test_triple_click_composes_double_then_single() {
    let desktop = ScriptedDesktop::new();
    let d = dispatcher(desktop);

    let response = call(
        &d,
        json!({
            "jsonrpc": "2.0", "id": 1, "method": "action.click",
            "params": {
                "run_id": "r1", "step_id": "s1",
                "target": json!({"ladder": [{"kind": "attr", "selector": {"name": "save"}}]}),
                "clicks": 3
            }
        }),
    )
    .await;

    assert_eq!(response["result"]["ok"], true);
    assert_eq!(response["result"]["match_attempts"][0]["matched_count"], 1);
}

// ============================================================================
// Paste fallback
// ============================================================================

#[tokio::test]
async fn test_set_value_falls_back_to_paste_when_direct_write_fails() {
    let mut desktop = ScriptedDesktop::new();
    desktop.reject_direct_set = true;
    let d = dispatcher(desktop);

    let response = call(
        &d,
        json!({
            "jsonrpc": "2.0", "id": 1, "method": "action.setValue",
            "params": {
                "run_id": "r1", "step_id": "s1",
                "target": editor_target(), "value": "pasted"
            }
        }),
    )
    .await;

    assert_eq!(response["result"]["ok"], true);

    let extract = call(
        &d,
        json!({
            "jsonrpc": "2.0", "id": 2, "method": "extract.getValue",
            "params": {"run_id": "r1", "step_id": "s2", "target": editor_target()}
        }),
    )
    .await;
    assert_eq!(extract["result"]["value"], "pasted");
}

// ============================================================================
// Error envelopes
// ============================================================================

#[tokio::test]
async fn test_failed_resolution_envelope_embeds_trace() {
    let d = dispatcher(ScriptedDesktop::new());

    let response = call(
        &d,
        json!({
            "jsonrpc": "2.0", "id": 1, "method": "action.click",
            "params": {
                "run_id": "r1", "step_id": "s1",
                "target": {"ladder": [
                    {"kind": "attr", "selector": {"name": "no-such-control"}},
                    {"kind": "coords", "selector": {}}
                ]}
            }
        }),
    )
    .await;

    let error = &response["error"];
    assert_eq!(error["code"], 1001);
    let trace = &error["data"]["trace"];
    assert_eq!(trace["ok"], false);
    assert_eq!(trace["error_code"], 1001);
    assert_eq!(trace["match_attempts"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_assertion_failures_are_aggregated() {
    let d = dispatcher(ScriptedDesktop::new());

    let response = call(
        &d,
        json!({
            "jsonrpc": "2.0", "id": 1, "method": "assert.check",
            "params": {
                "run_id": "r1", "step_id": "s1",
                "assertions": [
                    {"kind": "value_equals", "target": editor_target(), "value": "nope"},
                    {"kind": "element_exists", "target": {"ladder": [{"kind": "attr", "selector": {"name": "ghost"}}]}},
                    {"kind": "window_active", "scope": {"title_contains": "Notepad"}}
                ]
            }
        }),
    )
    .await;

    let error = &response["error"];
    assert_eq!(error["code"], 1004);
    let failed = error["data"]["failed"].as_array().unwrap();
    assert_eq!(failed.len(), 2);
    assert_eq!(failed[0]["index"], 0);
    assert_eq!(failed[0]["kind"], "value_equals");
    assert_eq!(failed[1]["index"], 1);
}

#[tokio::test]
async fn test_malformed_line_and_envelope_validation() {
    let d = dispatcher(ScriptedDesktop::new());

    let parse: Value =
        serde_json::from_str(&d.handle_line(r#"{"jsonrpc": "2.0",,,"#).await).unwrap();
    assert_eq!(parse["error"]["code"], -32700);
    assert_eq!(parse["id"], Value::Null);

    let missing_method = call(&d, json!({"jsonrpc": "2.0", "id": 1})).await;
    assert_eq!(missing_method["error"]["code"], -32600);

    let unknown = call(
        &d,
        json!({"jsonrpc": "2.0", "id": 2, "method": "window.close"}),
    )
    .await;
    assert_eq!(unknown["error"]["code"], -32601);
}
