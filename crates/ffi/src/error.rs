use blowing_snow_core::{BlowingSnowError, ErrorKind};
use std::cell::RefCell;
use std::ffi::CString;
use std::os::raw::c_char;
use std::ptr;

/// Common interface for errors that cross the FFI boundary.
///
/// - `code()` - The error code handed back to the caller
/// - `msg()` - The diagnostic message stored for `blowing_snow_last_error`
pub(crate) trait FfiError {
    /// Returns the error code to be returned across the FFI boundary.
    fn code(&self) -> BlowingSnowErrorCode;

    /// Returns the human-readable error message.
    fn msg(&self) -> String;
}

/// Errors raised by the FFI layer itself, before the kernel runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct BoundaryError {
    code: BlowingSnowErrorCode,
    msg: String,
}

impl BoundaryError {
    /// Create error for null pointer passed where non-null required.
    ///
    /// # Arguments
    /// * `param_name` - The name of the parameter that was null (e.g., `"inputs"`, `"out_flux"`)
    pub fn null_pointer(param_name: &str) -> Self {
        Self {
            code: BlowingSnowErrorCode::NullPointer,
            msg: format!("Parameter '{param_name}' cannot be null"),
        }
    }

    /// Create error for an integer field the kernel cannot represent.
    ///
    /// # Arguments
    /// * `field` - The name of the offending field (e.g., `"wind_bins"`)
    /// * `value` - The value received from the caller
    pub fn out_of_range(field: &str, value: i32) -> Self {
        Self {
            code: BlowingSnowErrorCode::InvalidParameter,
            msg: format!("Field '{field}' must be non-negative, got {value}"),
        }
    }
}

impl FfiError for BoundaryError {
    fn code(&self) -> BlowingSnowErrorCode {
        self.code
    }

    fn msg(&self) -> String {
        self.msg.clone()
    }
}

impl FfiError for BlowingSnowError {
    fn code(&self) -> BlowingSnowErrorCode {
        match self.kind() {
            ErrorKind::InvalidBracket => BlowingSnowErrorCode::InvalidBracket,
            ErrorKind::NonConvergence => BlowingSnowErrorCode::NonConvergence,
            ErrorKind::InvalidConfig | ErrorKind::InvalidInput => {
                BlowingSnowErrorCode::InvalidParameter
            }
        }
    }

    fn msg(&self) -> String {
        self.to_string()
    }
}

/// FFI error codes returned by blowing-snow functions.
/// Follows standard C convention: 0 = success, non-zero = error.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlowingSnowErrorCode {
    /// Operation completed successfully.
    Ok = 0,

    /// Invalid pointer: null pointer passed where non-null required.
    NullPointer = 1,

    /// Invalid input state or options (non-finite fields, negative counts,
    /// fewer than two wind bins).
    InvalidParameter = 2,

    /// The shear velocity root was not bracketed by the search interval.
    InvalidBracket = 3,

    /// The root solver or the suspension integral exhausted its budget.
    NonConvergence = 4,
}

thread_local! {
    /// Most recent FFI error on this thread (C string, error code).
    /// The `CString` is owned here so the pointer handed to C stays valid.
    static LAST_ERROR: RefCell<(Option<CString>, BlowingSnowErrorCode)> =
        const { RefCell::new((None, BlowingSnowErrorCode::Ok)) };
}

/// Internal helper to read `LAST_ERROR` thread-local storage (cstring, code).
pub(crate) fn with_last_error<F, R>(f: F) -> R
where
    F: FnOnce(&(Option<CString>, BlowingSnowErrorCode)) -> R,
{
    LAST_ERROR.with_borrow(f)
}

/// Internal helper to mutate `LAST_ERROR` thread-local storage (cstring, code).
pub(crate) fn with_last_error_mut<F, R>(f: F) -> R
where
    F: FnOnce(&mut (Option<CString>, BlowingSnowErrorCode)) -> R,
{
    LAST_ERROR.with_borrow_mut(f)
}

/// Retrieve the most recent FFI error message as a null-terminated C string.
///
/// Returns:
/// - A borrowed pointer to the error message if the last call on this thread failed.
/// - `null` if the last call succeeded or no call has been made.
///
/// # Lifetime
/// The returned pointer is valid until the next `blowing_snow_*` call on this
/// thread. **DO NOT FREE THIS POINTER** - it is managed internally.
///
/// Example:
/// ```c
/// double flux = 0.0;
/// BlowingSnowErrorCode err = blowing_snow_flux(&inputs, NULL, &flux);
/// if (err != Ok) {
///     const char* error = blowing_snow_last_error();
///     if (error) {
///         fprintf(stderr, "blowing snow failed: %s\n", error);
///     }
/// }
/// ```
#[no_mangle]
pub extern "C" fn blowing_snow_last_error() -> *const c_char {
    with_last_error(|(cstring, _code)| cstring.as_ref().map_or(ptr::null(), |cs| cs.as_ptr()))
}

/// Retrieve the most recent FFI error code.
///
/// Returns `Ok` (0) if the last call on this thread succeeded, otherwise the
/// code that call returned.
#[no_mangle]
pub extern "C" fn blowing_snow_last_error_code() -> BlowingSnowErrorCode {
    with_last_error(|(_cstring, code)| *code)
}
