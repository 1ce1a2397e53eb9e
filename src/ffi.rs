//! FFI bindings for MindSync Wellbeing
//!
//! C-compatible functions for calling the engine from the dashboard shell and
//! other hosts. All functions take null-terminated C strings and return
//! allocated memory that must be released with `wellbeing_free_string`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::pipeline::{vitals_to_advisory, vitals_to_assessment, WellbeingProcessor};
use crate::schema::VitalsRecord;

thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

unsafe fn cstr_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

/// Caller must free with `wellbeing_free_string`
fn string_to_cstr(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

/// Run a JSON-in/JSON-out conversion and hand the result across the boundary
unsafe fn convert_json(
    json: *const c_char,
    convert: fn(String) -> Result<String, crate::ComputeError>,
) -> *mut c_char {
    clear_last_error();

    let Some(json_str) = cstr_to_string(json) else {
        set_last_error("Invalid JSON string pointer");
        return ptr::null_mut();
    };

    match convert(json_str) {
        Ok(result) => string_to_cstr(&result),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Stateless API
// ============================================================================

/// Score a vitals JSON object and return the assessment JSON.
///
/// # Safety
/// - `json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `wellbeing_free_string`.
/// - Returns NULL on error; call `wellbeing_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn wellbeing_assess(json: *const c_char) -> *mut c_char {
    convert_json(json, vitals_to_assessment)
}

/// Score a vitals JSON object and return the advisory JSON.
///
/// # Safety
/// Same contract as `wellbeing_assess`.
#[no_mangle]
pub unsafe extern "C" fn wellbeing_advise(json: *const c_char) -> *mut c_char {
    convert_json(json, vitals_to_advisory)
}

// ============================================================================
// Stateful Processor API
// ============================================================================

/// Opaque handle to a WellbeingProcessor
pub struct WellbeingProcessorHandle {
    processor: WellbeingProcessor,
}

/// Create a new processor with empty state.
///
/// # Safety
/// - Returns a pointer to a newly allocated processor.
/// - Must be freed with `wellbeing_processor_free`.
#[no_mangle]
pub unsafe extern "C" fn wellbeing_processor_new() -> *mut WellbeingProcessorHandle {
    clear_last_error();

    let handle = Box::new(WellbeingProcessorHandle {
        processor: WellbeingProcessor::new(),
    });
    Box::into_raw(handle)
}

/// Free a processor.
///
/// # Safety
/// - `processor` must be a valid pointer returned by `wellbeing_processor_new`, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn wellbeing_processor_free(processor: *mut WellbeingProcessorHandle) {
    if !processor.is_null() {
        drop(Box::from_raw(processor));
    }
}

/// Score a vitals JSON object with both views and record the result.
///
/// # Safety
/// - `processor` must be a valid pointer returned by `wellbeing_processor_new`.
/// - `json` must be a valid null-terminated C string.
/// - Returns a newly allocated report JSON that must be freed with `wellbeing_free_string`.
/// - Returns NULL on error; call `wellbeing_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn wellbeing_processor_report(
    processor: *mut WellbeingProcessorHandle,
    json: *const c_char,
) -> *mut c_char {
    clear_last_error();

    if processor.is_null() {
        set_last_error("Null processor pointer");
        return ptr::null_mut();
    }

    let handle = &mut *processor;

    let Some(json_str) = cstr_to_string(json) else {
        set_last_error("Invalid JSON string pointer");
        return ptr::null_mut();
    };

    let record = match VitalsRecord::from_json(&json_str) {
        Ok(record) => record,
        Err(e) => {
            set_last_error(&e.to_string());
            return ptr::null_mut();
        }
    };

    let report = handle.processor.report(&record);
    match serde_json::to_string(&report) {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Mark a tip as done (`completed != 0`) or not done.
///
/// # Safety
/// - `processor` must be a valid pointer returned by `wellbeing_processor_new`.
/// - `tip_id` must be a valid null-terminated C string.
/// - Returns 0 on success, non-zero on error.
#[no_mangle]
pub unsafe extern "C" fn wellbeing_processor_set_tip_completed(
    processor: *mut WellbeingProcessorHandle,
    tip_id: *const c_char,
    completed: i32,
) -> i32 {
    clear_last_error();

    if processor.is_null() {
        set_last_error("Null processor pointer");
        return -1;
    }

    let handle = &mut *processor;

    let Some(tip_id) = cstr_to_string(tip_id) else {
        set_last_error("Invalid tip id string pointer");
        return -1;
    };

    handle.processor.set_tip_completed(&tip_id, completed != 0);
    0
}

/// Save processor state to JSON.
///
/// # Safety
/// - `processor` must be a valid pointer returned by `wellbeing_processor_new`.
/// - Returns a newly allocated string that must be freed with `wellbeing_free_string`.
/// - Returns NULL on error; call `wellbeing_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn wellbeing_processor_save_state(
    processor: *mut WellbeingProcessorHandle,
) -> *mut c_char {
    clear_last_error();

    if processor.is_null() {
        set_last_error("Null processor pointer");
        return ptr::null_mut();
    }

    let handle = &*processor;

    match handle.processor.save_state() {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Load processor state from JSON.
///
/// # Safety
/// - `processor` must be a valid pointer returned by `wellbeing_processor_new`.
/// - `json` must be a valid null-terminated C string.
/// - Returns 0 on success, non-zero on error.
/// - On error, call `wellbeing_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn wellbeing_processor_load_state(
    processor: *mut WellbeingProcessorHandle,
    json: *const c_char,
) -> i32 {
    clear_last_error();

    if processor.is_null() {
        set_last_error("Null processor pointer");
        return -1;
    }

    let handle = &mut *processor;

    let Some(json_str) = cstr_to_string(json) else {
        set_last_error("Invalid JSON string pointer");
        return -1;
    };

    match handle.processor.load_state(&json_str) {
        Ok(()) => 0,
        Err(e) => {
            set_last_error(&e.to_string());
            -1
        }
    }
}

// ============================================================================
// Memory Management
// ============================================================================

/// Free a string returned by a `wellbeing_*` function.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by this library, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn wellbeing_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Get the last error message.
///
/// # Safety
/// - Returns a pointer to a thread-local error string.
/// - The pointer is valid until the next `wellbeing_*` call on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn wellbeing_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

/// Get the library version.
///
/// # Safety
/// - Returns a pointer to a static string. Do NOT free.
#[no_mangle]
pub unsafe extern "C" fn wellbeing_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strained_json() -> CString {
        CString::new(
            r#"{"heartRate": 110, "sleepHours": 5, "steps": 2000, "stressLevel": 80,
                "energy": 30, "bp": "145/95", "temperature": 38.0}"#,
        )
        .unwrap()
    }

    unsafe fn take_string(ptr: *mut c_char) -> String {
        assert!(!ptr.is_null());
        let s = CStr::from_ptr(ptr).to_str().unwrap().to_string();
        wellbeing_free_string(ptr);
        s
    }

    #[test]
    fn test_ffi_assess_and_advise() {
        let json = strained_json();
        unsafe {
            let assessment = take_string(wellbeing_assess(json.as_ptr()));
            let value: serde_json::Value = serde_json::from_str(&assessment).unwrap();
            assert!(value["categories"]["anxiety"]["score"].is_u64());

            let advisory = take_string(wellbeing_advise(json.as_ptr()));
            let value: serde_json::Value = serde_json::from_str(&advisory).unwrap();
            assert_eq!(value["score"], 20);
            assert_eq!(value["status"], "Critical - Seek Help");
        }
    }

    #[test]
    fn test_ffi_processor_lifecycle() {
        unsafe {
            let processor = wellbeing_processor_new();
            assert!(!processor.is_null());

            let tip = CString::new("hr-tip-1").unwrap();
            assert_eq!(wellbeing_processor_set_tip_completed(processor, tip.as_ptr(), 1), 0);

            let json = strained_json();
            let report = take_string(wellbeing_processor_report(processor, json.as_ptr()));
            let value: serde_json::Value = serde_json::from_str(&report).unwrap();
            assert_eq!(value["escalate"], true);
            assert_eq!(value["completedTips"][0], "hr-tip-1");

            let state = wellbeing_processor_save_state(processor);
            assert!(!state.is_null());

            let processor2 = wellbeing_processor_new();
            assert_eq!(wellbeing_processor_load_state(processor2, state), 0);

            wellbeing_free_string(state);
            wellbeing_processor_free(processor);
            wellbeing_processor_free(processor2);
        }
    }

    #[test]
    fn test_ffi_error_handling() {
        unsafe {
            let invalid_json = CString::new("not json").unwrap();
            let result = wellbeing_assess(invalid_json.as_ptr());
            assert!(result.is_null());

            let error = wellbeing_last_error();
            assert!(!error.is_null());
            let error_str = CStr::from_ptr(error).to_str().unwrap();
            assert!(!error_str.is_empty());

            assert!(wellbeing_advise(ptr::null()).is_null());
            assert!(wellbeing_processor_save_state(ptr::null_mut()).is_null());
        }
    }

    #[test]
    fn test_ffi_version() {
        unsafe {
            let version = wellbeing_version();
            assert!(!version.is_null());
            let version_str = CStr::from_ptr(version).to_str().unwrap();
            assert_eq!(version_str, env!("CARGO_PKG_VERSION"));
        }
    }
}
