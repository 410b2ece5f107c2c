//! Request validation, routing, and error normalization.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::actions::{self, ActionContext};
use crate::artifacts::ScreenCapture;
use crate::assertions;
use crate::config::Config;
use crate::models::{
    AssertParams, ClickParams, ExtractParams, FocusParams, PasteTextParams, ResolveParams,
    RunBeginParams, RunEndParams, ScreenshotParams, SetValueParams,
};
use crate::provider::AutomationProvider;
use crate::resolver;
use crate::runs::RunRegistry;

use super::envelope::{Response, RpcError, PROTOCOL_VERSION};

/// Stateless-per-request dispatcher over a fixed handler table.
pub struct Dispatcher {
    provider: Option<Arc<dyn AutomationProvider>>,
    capture: Arc<dyn ScreenCapture>,
    runs: RunRegistry,
    config: Config,
}

impl Dispatcher {
    pub fn new(
        provider: Option<Arc<dyn AutomationProvider>>,
        capture: Arc<dyn ScreenCapture>,
        config: Config,
    ) -> Self {
        Self {
            provider,
            capture,
            runs: RunRegistry::new(),
            config,
        }
    }

    /// One raw input line in, one serialized response line out.
    pub async fn handle_line(&self, line: &str) -> String {
        let payload: Value = match serde_json::from_str(line) {
            Ok(value) => value,
            // No id could be extracted from an unparseable line
            Err(_) => return serialize(Response::error(Value::Null, RpcError::parse_error())),
        };
        serialize(self.handle_request(payload).await)
    }

    pub async fn handle_request(&self, payload: Value) -> Response {
        let id = payload.get("id").cloned().unwrap_or(Value::Null);
        match self.route(payload).await {
            Ok(result) => Response::result(id, result),
            Err(err) => Response::error(id, err),
        }
    }

    async fn route(&self, payload: Value) -> Result<Value, RpcError> {
        let request = payload
            .as_object()
            .ok_or_else(|| RpcError::invalid_request("Invalid request"))?;
        if request.get("jsonrpc").and_then(Value::as_str) != Some(PROTOCOL_VERSION) {
            return Err(RpcError::invalid_request("Invalid JSON-RPC version"));
        }
        let method = request
            .get("method")
            .and_then(Value::as_str)
            .ok_or_else(|| RpcError::invalid_request("Missing method"))?;
        if !request.contains_key("id") {
            return Err(RpcError::invalid_request("Missing id"));
        }
        let params = request.get("params").cloned().unwrap_or_else(|| json!({}));
        if !params.is_object() {
            return Err(RpcError::invalid_params("params must be an object"));
        }

        tracing::debug!("dispatching {method}");
        self.dispatch(method, params).await
    }

    async fn dispatch(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        match method {
            "system.ping" => Ok(json!({
                "ok": true,
                "service": env!("CARGO_PKG_NAME"),
                "version": env!("CARGO_PKG_VERSION"),
            })),

            "system.getCapabilities" => {
                let automation = self.provider.is_some();
                Ok(json!({
                    "automation": automation,
                    "matchers": {
                        "attr": automation,
                        "near_label": automation,
                        "visual_anchor": false,
                        "coords": false,
                    },
                    "screenshots": self.capture.is_supported(),
                }))
            }

            "run.begin" => {
                let p: RunBeginParams = decode(params)?;
                tracing::info!("run {} started (artifacts: {})", p.run_id, p.artifact_dir.display());
                self.runs.begin(&p.run_id, p.artifact_dir);
                Ok(json!({"ok": true}))
            }

            "run.end" => {
                let p: RunEndParams = decode(params)?;
                let known = self.runs.end(&p.run_id);
                tracing::info!("run {} ended", p.run_id);
                Ok(json!({"ok": known}))
            }

            "window.focus" => {
                let p: FocusParams = decode(params)?;
                let ctx = self.action_ctx()?;
                let trace = actions::focus_window(&ctx, p).await?;
                to_result(trace)
            }

            "target.resolve" => {
                let p: ResolveParams = decode(params)?;
                let provider = self.provider()?;
                let resolution =
                    resolver::resolve(provider, &p.target, p.retry.as_ref(), p.timeout_ms).await?;
                Ok(json!({
                    "resolved": resolution.resolved,
                    "match_attempts": resolution.attempts,
                }))
            }

            "action.click" => {
                let p: ClickParams = decode(params)?;
                let ctx = self.action_ctx()?;
                to_result(actions::click(&ctx, p).await?)
            }

            "action.setValue" => {
                let p: SetValueParams = decode(params)?;
                let ctx = self.action_ctx()?;
                to_result(actions::set_value(&ctx, p).await?)
            }

            "action.pasteText" => {
                let p: PasteTextParams = decode(params)?;
                let ctx = self.action_ctx()?;
                to_result(actions::paste_text(&ctx, p).await?)
            }

            "assert.check" => {
                let p: AssertParams = decode(params)?;
                let ctx = self.action_ctx()?;
                let trace =
                    assertions::check(&ctx, p, self.config.assert_poll_interval()).await?;
                to_result(trace)
            }

            "extract.getValue" => {
                let p: ExtractParams = decode(params)?;
                let ctx = self.action_ctx()?;
                to_result(actions::get_value(&ctx, p).await?)
            }

            "artifact.screenshot" => {
                let p: ScreenshotParams = decode(params)?;
                let trace = actions::capture_artifact(
                    self.capture.as_ref(),
                    &self.runs,
                    &self.config.artifact_root,
                    p,
                )
                .await?;
                to_result(trace)
            }

            _ => Err(RpcError::method_not_found()),
        }
    }

    fn provider(&self) -> Result<&dyn AutomationProvider, RpcError> {
        self.provider
            .as_deref()
            .ok_or_else(|| RpcError::internal("Automation provider not available"))
    }

    fn action_ctx(&self) -> Result<ActionContext<'_>, RpcError> {
        Ok(ActionContext {
            provider: self.provider()?,
            capture: self.capture.as_ref(),
            runs: &self.runs,
            artifact_root: &self.config.artifact_root,
        })
    }
}

fn decode<T: DeserializeOwned>(params: Value) -> Result<T, RpcError> {
    serde_json::from_value(params).map_err(|e| RpcError::invalid_params(e.to_string()))
}

fn to_result<T: serde::Serialize>(value: T) -> Result<Value, RpcError> {
    serde_json::to_value(value).map_err(|e| RpcError::internal(e.to_string()))
}

fn serialize(response: Response) -> String {
    serde_json::to_string(&response).unwrap_or_else(|e| {
        tracing::error!("failed to serialize response: {e}");
        format!(
            r#"{{"jsonrpc":"2.0","id":null,"error":{{"code":{},"message":"Internal error"}}}}"#,
            crate::error::codes::INTERNAL_ERROR
        )
    })
}
