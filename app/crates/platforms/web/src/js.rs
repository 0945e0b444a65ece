//! Calls into JS modules installed on a global object

use anyhow::{Result, anyhow};
use js_sys::{Array, Function, Reflect};
use wasm_bindgen::{JsCast, JsError, JsValue};

/// Reads the module installed as `scope[name]`.
pub fn installed_module(scope: &JsValue, name: &str) -> Result<JsValue, JsValue> {
    let module = Reflect::get(scope, &JsValue::from_str(name))?;
    if module.is_undefined() || module.is_null() {
        return Err(JsValue::from_str(&format!(
            "{name} is not installed on the global object"
        )));
    }
    Ok(module)
}

/// Calls `target[name](...args)` with `target` as `this`.
pub fn call_method(target: &JsValue, name: &str, args: &Array) -> Result<JsValue> {
    let function = Reflect::get(target, &JsValue::from_str(name))
        .map_err(js_error)?
        .dyn_into::<Function>()
        .map_err(|_| anyhow!("{name} is not a function"))?;
    function.apply(target, args).map_err(js_error)
}

/// Property `name` of `target`.
pub fn property(target: &JsValue, name: &str) -> Result<JsValue> {
    Reflect::get(target, &JsValue::from_str(name)).map_err(js_error)
}

/// Converts a thrown JS value, keeping the message of `Error` objects.
pub fn js_error(value: JsValue) -> anyhow::Error {
    match value.dyn_ref::<js_sys::Error>() {
        Some(err) => anyhow!(String::from(err.message())),
        None => anyhow!(value.as_string().unwrap_or_else(|| format!("{value:?}"))),
    }
}

/// Rust error as a JS `Error`.
pub fn to_js_error(err: impl std::error::Error) -> JsValue {
    JsError::new(&err.to_string()).into()
}
