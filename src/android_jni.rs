//! JNI bindings for the Android app.
//!
//! Each public function here corresponds to a `external fun` declaration
//! in RustBridge.kt. The function names follow JNI naming conventions:
//! Java_<package>_<class>_<method> with dots replaced by underscores.
//!
//! The Kotlin side holds an opaque `Long` handle per navigation session.
//! The handle owns a `Mutex<NavigationState>` so the location callback
//! thread and the UI thread can both call in. Nothing here may panic
//! across the FFI boundary: failures are logged and reported as
//! `false`, `0` or `null`.

use std::sync::{Mutex, MutexGuard};

use jni::objects::{JClass, JString};
use jni::sys::{jboolean, jdouble, jlong, jstring, JNI_FALSE, JNI_TRUE};
use jni::JNIEnv;
use log::{info, warn};

use crate::catalog::Catalog;
use crate::config::EngineConfig;
use crate::error::Result;
use crate::geo::Coordinate;
use crate::nav::NavigationState;

type Session = Mutex<NavigationState>;

fn into_handle(state: NavigationState) -> jlong {
    Box::into_raw(Box::new(Mutex::new(state))) as jlong
}

/// # Safety
///
/// `handle` must be 0 or a value returned by `into_handle` that has not
/// been passed to `destroy` yet.
unsafe fn session<'a>(handle: jlong) -> Option<&'a Session> {
    (handle as *const Session).as_ref()
}

fn lock(session: &Session) -> MutexGuard<'_, NavigationState> {
    // A panic inside a previous call must not take the whole app down
    session.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn create_state(config_json: Option<&str>) -> Result<NavigationState> {
    let config = match config_json {
        Some(json) if !json.trim().is_empty() => EngineConfig::from_json(json)?,
        _ => EngineConfig::default(),
    };
    Ok(NavigationState::with_config(config))
}

fn apply_catalog(state: &mut NavigationState, json: &str) -> bool {
    match Catalog::from_json(json) {
        Ok(catalog) => {
            state.set_catalog(catalog);
            true
        }
        Err(e) => {
            warn!("catalog rejected: {e}");
            false
        }
    }
}

/// Non-finite coordinates mean the host has no fix.
fn apply_position(state: &mut NavigationState, lat: f64, lon: f64) {
    let position = Coordinate::new(lat, lon);
    let fix = position.is_finite().then_some(position);
    let origin = state.config().origin_or_default(fix);
    state.update_position(origin);
}

fn snapshot_json(state: &NavigationState) -> Option<String> {
    serde_json::to_string(&state.snapshot())
        .map_err(|e| warn!("snapshot serialize error: {e}"))
        .ok()
}

fn to_jboolean(value: bool) -> jboolean {
    if value { JNI_TRUE } else { JNI_FALSE }
}

/// Installs the Android logger. Safe to call more than once.
/// Maps to: RustBridge.init()
#[unsafe(no_mangle)]
pub extern "system" fn Java_com_itinera_app_RustBridge_init(_env: JNIEnv, _class: JClass) {
    android_logger::init_once(
        android_logger::Config::default()
            .with_max_level(log::LevelFilter::Debug)
            .with_tag("itinera"),
    );
    info!("itinera {} ready", crate::VERSION);
}

/// Returns the library version.
/// Maps to: RustBridge.version() -> String
#[unsafe(no_mangle)]
pub extern "system" fn Java_com_itinera_app_RustBridge_version(
    env: JNIEnv,
    _class: JClass,
) -> jstring {
    env.new_string(crate::VERSION)
        .map(|s| s.into_raw())
        .unwrap_or(std::ptr::null_mut())
}

/// Opens a navigation session. `config` may be null or a JSON object.
/// Returns 0 if the configuration is invalid.
/// Maps to: RustBridge.create(config: String?) -> Long
#[unsafe(no_mangle)]
pub extern "system" fn Java_com_itinera_app_RustBridge_create(
    mut env: JNIEnv,
    _class: JClass,
    config: JString,
) -> jlong {
    let json: Option<String> = if config.is_null() {
        None
    } else {
        match env.get_string(&config) {
            Ok(s) => Some(s.into()),
            Err(e) => {
                warn!("unreadable config string: {e}");
                return 0;
            }
        }
    };

    match create_state(json.as_deref()) {
        Ok(state) => into_handle(state),
        Err(e) => {
            warn!("config rejected: {e}");
            0
        }
    }
}

/// Closes a session. The handle must not be used afterwards.
/// Maps to: RustBridge.destroy(handle: Long)
#[unsafe(no_mangle)]
pub extern "system" fn Java_com_itinera_app_RustBridge_destroy(
    _env: JNIEnv,
    _class: JClass,
    handle: jlong,
) {
    if handle != 0 {
        // SAFETY: the Kotlin side hands back a handle from `create` exactly once
        drop(unsafe { Box::from_raw(handle as *mut Session) });
    }
}

/// Replaces the POI catalog (JSON array). Returns false if it was rejected,
/// in which case the previous catalog stays in effect.
/// Maps to: RustBridge.setCatalog(handle: Long, json: String) -> Boolean
#[unsafe(no_mangle)]
pub extern "system" fn Java_com_itinera_app_RustBridge_setCatalog(
    mut env: JNIEnv,
    _class: JClass,
    handle: jlong,
    json: JString,
) -> jboolean {
    // SAFETY: see `session`
    let Some(session) = (unsafe { session(handle) }) else {
        return JNI_FALSE;
    };
    let json: String = match env.get_string(&json) {
        Ok(s) => s.into(),
        Err(e) => {
            warn!("unreadable catalog string: {e}");
            return JNI_FALSE;
        }
    };
    to_jboolean(apply_catalog(&mut lock(session), &json))
}

/// Feeds a position fix. Pass NaN when no fix is available.
/// Maps to: RustBridge.setPosition(handle: Long, lat: Double, lon: Double)
#[unsafe(no_mangle)]
pub extern "system" fn Java_com_itinera_app_RustBridge_setPosition(
    _env: JNIEnv,
    _class: JClass,
    handle: jlong,
    lat: jdouble,
    lon: jdouble,
) {
    // SAFETY: see `session`
    if let Some(session) = unsafe { session(handle) } {
        apply_position(&mut lock(session), lat, lon);
    }
}

/// Maps to: RustBridge.updateHeading(handle: Long, degrees: Double)
#[unsafe(no_mangle)]
pub extern "system" fn Java_com_itinera_app_RustBridge_updateHeading(
    _env: JNIEnv,
    _class: JClass,
    handle: jlong,
    degrees: jdouble,
) {
    // SAFETY: see `session`
    if let Some(session) = unsafe { session(handle) } {
        lock(session).update_heading(degrees);
    }
}

/// Returns true if the cursor moved.
/// Maps to: RustBridge.advance(handle: Long) -> Boolean
#[unsafe(no_mangle)]
pub extern "system" fn Java_com_itinera_app_RustBridge_advance(
    _env: JNIEnv,
    _class: JClass,
    handle: jlong,
) -> jboolean {
    // SAFETY: see `session`
    match unsafe { session(handle) } {
        Some(session) => to_jboolean(lock(session).advance().moved()),
        None => JNI_FALSE,
    }
}

/// Returns true if the cursor moved.
/// Maps to: RustBridge.rewind(handle: Long) -> Boolean
#[unsafe(no_mangle)]
pub extern "system" fn Java_com_itinera_app_RustBridge_rewind(
    _env: JNIEnv,
    _class: JClass,
    handle: jlong,
) -> jboolean {
    // SAFETY: see `session`
    match unsafe { session(handle) } {
        Some(session) => to_jboolean(lock(session).rewind().moved()),
        None => JNI_FALSE,
    }
}

/// Returns the session state as JSON, or null on failure.
/// Maps to: RustBridge.snapshot(handle: Long) -> String?
#[unsafe(no_mangle)]
pub extern "system" fn Java_com_itinera_app_RustBridge_snapshot(
    env: JNIEnv,
    _class: JClass,
    handle: jlong,
) -> jstring {
    // SAFETY: see `session`
    let Some(session) = (unsafe { session(handle) }) else {
        return std::ptr::null_mut();
    };
    let Some(json) = snapshot_json(&lock(session)) else {
        return std::ptr::null_mut();
    };
    env.new_string(json)
        .map(|s| s.into_raw())
        .unwrap_or(std::ptr::null_mut())
}
