//! JNI bindings for Android.
//!
//! These functions are called from Kotlin via the JNI bridge.

use jni::objects::{JClass, JString};
use jni::sys::jstring;
use jni::JNIEnv;

use crate::{overlay_to_json, render_overlay_json};

/// Render a display list against a markup snapshot of the mounted lines.
/// Returns `{"below": ..., "above": ...}` or null on invalid input.
///
/// Called from Kotlin as:
///   external fun renderJson(displayList: String, domMarkup: String, options: String?): String?
#[no_mangle]
pub extern "system" fn Java_com_notation_editor_OverlayLib_renderJson(
    mut env: JNIEnv,
    _class: JClass,
    display_list: JString,
    dom_markup: JString,
    options: JString,
) -> jstring {
    let list: String = match env.get_string(&display_list) {
        Ok(s) => s.into(),
        Err(_) => return std::ptr::null_mut(),
    };
    let markup: String = match env.get_string(&dom_markup) {
        Ok(s) => s.into(),
        Err(_) => return std::ptr::null_mut(),
    };
    let opts: String = if options.is_null() {
        String::new()
    } else {
        env.get_string(&options).map(|s| s.into()).unwrap_or_default()
    };

    match render_overlay_json(&list, &markup, &opts).and_then(|svg| overlay_to_json(&svg)) {
        Ok(json) => match env.new_string(&json) {
            Ok(js) => js.into_raw(),
            Err(_) => std::ptr::null_mut(),
        },
        Err(err) => {
            tracing::warn!(%err, "overlay render failed");
            std::ptr::null_mut()
        }
    }
}
