//! WASM bindings for the canvas path boolean kernel.
//!
//! Exposes the [`PathBoolean`] engine for use in JavaScript/TypeScript via
//! wasm-bindgen. Paths cross the boundary as plain objects in the same shape
//! the kernel serializes: `{segments, closed, fillRule}` with points as
//! `[x, y]` pairs.

use std::sync::Arc;

use canvas_kernel_booleans::{
    BooleanOp, EventLog, OperationResult, PathBooleanOperations,
};
use canvas_kernel_path::Path;
use serde::Serialize;
use wasm_bindgen::prelude::*;

/// Initialize the WASM module (sets up panic hook for better error messages).
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Parse an operation name as used in results and events.
pub fn parse_operation(name: &str) -> Result<BooleanOp, String> {
    BooleanOp::ALL
        .into_iter()
        .find(|op| op.name() == name)
        .ok_or_else(|| format!("Unknown operation '{}'", name))
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsError> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| JsError::new(&e.to_string()))
}

fn path_from_js(value: JsValue, which: &str) -> Result<Path, JsError> {
    serde_wasm_bindgen::from_value(value)
        .map_err(|e| JsError::new(&format!("Invalid path {}: {}", which, e)))
}

/// Boolean engine for canvas paths.
///
/// Every operation returns an `OperationResult` object
/// (`{success, operation, paths, error?, warnings?}`) and never throws for
/// geometric failures. Only operands that are not path objects at all are
/// rejected with an exception.
#[wasm_bindgen]
pub struct PathBoolean {
    engine: PathBooleanOperations,
    log: Arc<EventLog>,
    listener: Option<js_sys::Function>,
}

impl Default for PathBoolean {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl PathBoolean {
    /// Create an engine with default precision and no event listener.
    #[wasm_bindgen(constructor)]
    pub fn new() -> PathBoolean {
        let log = Arc::new(EventLog::new());
        let mut engine = PathBooleanOperations::new();
        engine.set_event_bus(log.clone());
        PathBoolean {
            engine,
            log,
            listener: None,
        }
    }

    /// Current linear tolerance.
    #[wasm_bindgen(getter)]
    pub fn precision(&self) -> f64 {
        self.engine.precision()
    }

    /// Set the linear tolerance used by every stage.
    #[wasm_bindgen(js_name = setPrecision)]
    pub fn set_precision(&mut self, epsilon: f64) -> Result<(), JsError> {
        self.engine
            .set_precision(epsilon)
            .map_err(|e| JsError::new(&e.to_string()))
    }

    /// Register `listener(eventName, payload)` for lifecycle events.
    #[wasm_bindgen(js_name = setEventBus)]
    pub fn set_event_bus(&mut self, listener: js_sys::Function) {
        self.listener = Some(listener);
    }

    /// Stop delivering lifecycle events.
    #[wasm_bindgen(js_name = clearEventBus)]
    pub fn clear_event_bus(&mut self) {
        self.listener = None;
    }

    /// Area covered by either path.
    #[wasm_bindgen(js_name = union)]
    pub fn union(&self, a: JsValue, b: JsValue) -> Result<JsValue, JsError> {
        self.run(BooleanOp::Union, a, b)
    }

    /// Area covered by both paths.
    #[wasm_bindgen(js_name = intersection)]
    pub fn intersection(&self, a: JsValue, b: JsValue) -> Result<JsValue, JsError> {
        self.run(BooleanOp::Intersection, a, b)
    }

    /// Area of `a` not covered by `b`.
    #[wasm_bindgen(js_name = difference)]
    pub fn difference(&self, a: JsValue, b: JsValue) -> Result<JsValue, JsError> {
        self.run(BooleanOp::Difference, a, b)
    }

    /// Area covered by exactly one path.
    #[wasm_bindgen(js_name = exclusion)]
    pub fn exclusion(&self, a: JsValue, b: JsValue) -> Result<JsValue, JsError> {
        self.run(BooleanOp::Exclusion, a, b)
    }

    /// Run an operation by name (`"union"`, `"intersection"`, ...).
    #[wasm_bindgen(js_name = execute)]
    pub fn execute(&self, operation: &str, a: JsValue, b: JsValue) -> Result<JsValue, JsError> {
        let op = parse_operation(operation).map_err(|e| JsError::new(&e))?;
        self.run(op, a, b)
    }

    /// Run an operation on two SVG path data strings.
    #[wasm_bindgen(js_name = executeSvg)]
    pub fn execute_svg(&self, operation: &str, a: &str, b: &str) -> Result<JsValue, JsError> {
        let op = parse_operation(operation).map_err(|e| JsError::new(&e))?;
        let result = self.engine.execute_svg(op, a, b);
        self.deliver(result)
    }

    /// Render a path object as SVG path data.
    #[wasm_bindgen(js_name = toSvgPathData)]
    pub fn to_svg_path_data(
        path: JsValue,
        tolerance: Option<f64>,
        digits: Option<usize>,
    ) -> Result<String, JsError> {
        let path = path_from_js(path, "argument")?;
        Ok(path.to_svg_path_data(tolerance.unwrap_or(0.01), digits.unwrap_or(3)))
    }
}

impl PathBoolean {
    fn run(&self, op: BooleanOp, a: JsValue, b: JsValue) -> Result<JsValue, JsError> {
        let a = path_from_js(a, "A")?;
        let b = path_from_js(b, "B")?;
        let result = self.engine.execute(op, &a, &b);
        self.deliver(result)
    }

    /// Forward recorded events to the listener, then convert the result.
    fn deliver(&self, result: OperationResult) -> Result<JsValue, JsError> {
        let events = self.log.drain();
        if let Some(listener) = &self.listener {
            for (name, payload) in events {
                let payload = to_js(&payload)?;
                if let Err(err) = listener.call2(&JsValue::NULL, &JsValue::from_str(&name), &payload)
                {
                    web_sys::console::warn_2(&"[canvas-kernel] event listener threw".into(), &err);
                }
            }
        }
        to_js(&result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_operation() {
        assert_eq!(parse_operation("union"), Ok(BooleanOp::Union));
        assert_eq!(parse_operation("exclusion"), Ok(BooleanOp::Exclusion));
        assert!(parse_operation("xor").is_err());
    }
}
