//! C-ABI wrapper around `watchlist-core`.
//!
//! # Overview
//! Exposes the watchlist request builders, response parsers and the
//! membership toggle through `extern "C"` functions, so a native shell can
//! drive the save/remove button with its own HTTP stack.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - `build_*` / `parse_*` mirror the core client 1:1. One
//!   `FfiWatchlistResult` envelope with `FfiDataTag` + `void* data` carries
//!   payloads and errors uniformly.
//! - A toggle `finish_*` call given a null response treats the round-trip
//!   as a network failure.
//! - The caller owns every returned pointer and releases it with the
//!   matching `watchlist_free_*` / `*_free` function.

pub mod types;

use std::ffi::CStr;
use std::os::raw::c_char;
use std::panic::{AssertUnwindSafe, catch_unwind};

use watchlist_core::{ApiError, HttpResponse, MembershipToggle, MovieSummary, Session};

use types::*;

/// Borrow a C string as UTF-8. Null and invalid UTF-8 give `None`.
fn read_str<'a>(s: *const c_char) -> Option<&'a str> {
    if s.is_null() {
        return None;
    }
    unsafe { CStr::from_ptr(s) }.to_str().ok()
}

fn read_response(resp: &FfiHttpResponse) -> HttpResponse {
    HttpResponse::new(resp.status, read_str(resp.body).unwrap_or(""))
}

/// The host's answer for a toggle request: a response, or null when the
/// transport failed.
fn transport_outcome(response: *const FfiHttpResponse) -> Result<HttpResponse, ApiError> {
    if response.is_null() {
        return Err(ApiError::NetworkFailure("host transport failed".to_string()));
    }
    Ok(read_response(unsafe { &*response }))
}

// ---------------------------------------------------------------------------
// Client lifecycle
// ---------------------------------------------------------------------------

/// Create a client bound to `base_url` (the `/api` prefix included).
///
/// Returns null if `base_url` is null or not UTF-8.
/// Free with `watchlist_client_free`.
#[unsafe(no_mangle)]
pub extern "C" fn watchlist_client_new(base_url: *const c_char) -> *mut FfiWatchlistClient {
    catch_unwind(|| {
        let Some(url) = read_str(base_url) else {
            return std::ptr::null_mut();
        };
        let inner = watchlist_core::WatchlistClient::new(url);
        Box::into_raw(Box::new(FfiWatchlistClient { inner }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn watchlist_client_free(client: *mut FfiWatchlistClient) {
    if !client.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { Box::from_raw(client) });
        });
    }
}

// ---------------------------------------------------------------------------
// Build request functions
// ---------------------------------------------------------------------------

/// Build `GET /watchlist/{user_id}`. Returns null on a null argument.
#[unsafe(no_mangle)]
pub extern "C" fn watchlist_build_list(
    client: *const FfiWatchlistClient,
    user_id: *const c_char,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        let Some(user_id) = read_str(user_id) else {
            return std::ptr::null_mut();
        };
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        FfiHttpRequest::from_core(client.inner.build_list_watchlist(&Session::new(user_id)))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Build `GET /watchlist/check?user_id=..&movie_id=..`.
#[unsafe(no_mangle)]
pub extern "C" fn watchlist_build_check(
    client: *const FfiWatchlistClient,
    user_id: *const c_char,
    movie_id: i64,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        let Some(user_id) = read_str(user_id) else {
            return std::ptr::null_mut();
        };
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        let req = client
            .inner
            .build_check_status(&Session::new(user_id), movie_id);
        FfiHttpRequest::from_core(req)
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Build `POST /watchlist/save`.
///
/// `poster_path` and `release_date` may be null. Returns null if `client`,
/// `user_id` or `title` is null, or if serialization fails.
#[unsafe(no_mangle)]
pub extern "C" fn watchlist_build_save(
    client: *const FfiWatchlistClient,
    user_id: *const c_char,
    movie_id: i64,
    title: *const c_char,
    poster_path: *const c_char,
    vote_average: f64,
    release_date: *const c_char,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        let (Some(user_id), Some(title)) = (read_str(user_id), read_str(title)) else {
            return std::ptr::null_mut();
        };
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        let movie = MovieSummary {
            id: movie_id,
            title: title.to_string(),
            poster_path: read_str(poster_path).map(str::to_string),
            vote_average,
            release_date: read_str(release_date).map(str::to_string),
        };
        match client.inner.build_save_movie(&Session::new(user_id), &movie) {
            Ok(req) => FfiHttpRequest::from_core(req),
            Err(_) => std::ptr::null_mut(),
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Build `DELETE /watchlist/remove` with a JSON body.
#[unsafe(no_mangle)]
pub extern "C" fn watchlist_build_remove(
    client: *const FfiWatchlistClient,
    user_id: *const c_char,
    movie_id: i64,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        let Some(user_id) = read_str(user_id) else {
            return std::ptr::null_mut();
        };
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        match client
            .inner
            .build_remove_movie(&Session::new(user_id), movie_id)
        {
            Ok(req) => FfiHttpRequest::from_core(req),
            Err(_) => std::ptr::null_mut(),
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

// ---------------------------------------------------------------------------
// Parse response functions
// ---------------------------------------------------------------------------

/// Shared null checks and conversion for every `watchlist_parse_*`.
fn parse_with(
    client: *const FfiWatchlistClient,
    response: *const FfiHttpResponse,
    parse: impl FnOnce(&watchlist_core::WatchlistClient, HttpResponse) -> *mut FfiWatchlistResult,
) -> *mut FfiWatchlistResult {
    if client.is_null() {
        return FfiWatchlistResult::null_arg("client");
    }
    if response.is_null() {
        return FfiWatchlistResult::null_arg("response");
    }
    let client = unsafe { &*client };
    parse(&client.inner, read_response(unsafe { &*response }))
}

/// Parse a list response. `data_tag = EntryList` on success.
#[unsafe(no_mangle)]
pub extern "C" fn watchlist_parse_list(
    client: *const FfiWatchlistClient,
    response: *const FfiHttpResponse,
) -> *mut FfiWatchlistResult {
    catch_unwind(|| {
        parse_with(client, response, |c, resp| match c.parse_list_watchlist(resp) {
            Ok(entries) => FfiWatchlistResult::ok_entries(entries),
            Err(e) => FfiWatchlistResult::from_error(e),
        })
    })
    .unwrap_or_else(|_| FfiWatchlistResult::panic("panic in watchlist_parse_list"))
}

/// Parse a membership check. `data_tag = Saved` (`bool*`) on success.
#[unsafe(no_mangle)]
pub extern "C" fn watchlist_parse_check(
    client: *const FfiWatchlistClient,
    response: *const FfiHttpResponse,
) -> *mut FfiWatchlistResult {
    catch_unwind(|| {
        parse_with(client, response, |c, resp| match c.parse_check_status(resp) {
            Ok(saved) => FfiWatchlistResult::ok_saved(saved),
            Err(e) => FfiWatchlistResult::from_error(e),
        })
    })
    .unwrap_or_else(|_| FfiWatchlistResult::panic("panic in watchlist_parse_check"))
}

/// Parse a save response. `data_tag = Message` on success.
#[unsafe(no_mangle)]
pub extern "C" fn watchlist_parse_save(
    client: *const FfiWatchlistClient,
    response: *const FfiHttpResponse,
) -> *mut FfiWatchlistResult {
    catch_unwind(|| {
        parse_with(client, response, |c, resp| match c.parse_save_movie(resp) {
            Ok(message) => FfiWatchlistResult::ok_message(message),
            Err(e) => FfiWatchlistResult::from_error(e),
        })
    })
    .unwrap_or_else(|_| FfiWatchlistResult::panic("panic in watchlist_parse_save"))
}

/// Parse a remove response. `data_tag = Message` on success.
#[unsafe(no_mangle)]
pub extern "C" fn watchlist_parse_remove(
    client: *const FfiWatchlistClient,
    response: *const FfiHttpResponse,
) -> *mut FfiWatchlistResult {
    catch_unwind(|| {
        parse_with(client, response, |c, resp| match c.parse_remove_movie(resp) {
            Ok(message) => FfiWatchlistResult::ok_message(message),
            Err(e) => FfiWatchlistResult::from_error(e),
        })
    })
    .unwrap_or_else(|_| FfiWatchlistResult::panic("panic in watchlist_parse_remove"))
}

// ---------------------------------------------------------------------------
// Membership toggle
// ---------------------------------------------------------------------------

/// Create the toggle for one movie, in the `Unknown` state.
/// Free with `watchlist_toggle_free`.
#[unsafe(no_mangle)]
pub extern "C" fn watchlist_toggle_new(movie_id: i64) -> *mut FfiToggle {
    catch_unwind(|| {
        Box::into_raw(Box::new(FfiToggle {
            inner: MembershipToggle::new(movie_id),
            checks: Vec::new(),
        }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn watchlist_toggle_free(toggle: *mut FfiToggle) {
    if !toggle.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { Box::from_raw(toggle) });
        });
    }
}

/// Start a membership check.
///
/// Returns a ticket to pass to `watchlist_toggle_finish_check`, or 0 when
/// no request should be sent (a save/remove is in flight, or unmounted).
#[unsafe(no_mangle)]
pub extern "C" fn watchlist_toggle_begin_check(toggle: *mut FfiToggle) -> u64 {
    if toggle.is_null() {
        return 0;
    }
    let toggle = unsafe { &mut *toggle };
    catch_unwind(AssertUnwindSafe(|| match toggle.inner.begin_check() {
        Some(ticket) => {
            toggle.checks.push(ticket);
            ticket.generation()
        }
        None => 0,
    }))
    .unwrap_or(0)
}

/// Resolve a check. `response` null means the request failed in transit.
///
/// Returns whether the result was applied; results for superseded tickets
/// are dropped.
#[unsafe(no_mangle)]
pub extern "C" fn watchlist_toggle_finish_check(
    toggle: *mut FfiToggle,
    client: *const FfiWatchlistClient,
    ticket: u64,
    response: *const FfiHttpResponse,
) -> bool {
    if toggle.is_null() || client.is_null() {
        return false;
    }
    let toggle = unsafe { &mut *toggle };
    let client = unsafe { &*client };
    catch_unwind(AssertUnwindSafe(|| {
        let Some(ticket) = toggle.take_check(ticket) else {
            return false;
        };
        let result = transport_outcome(response).and_then(|r| client.inner.parse_check_status(r));
        toggle.inner.finish_check(ticket, result)
    }))
    .unwrap_or(false)
}

/// Handle a tap. Returns which request to send, or `None` to send nothing.
#[unsafe(no_mangle)]
pub extern "C" fn watchlist_toggle_begin(toggle: *mut FfiToggle) -> FfiMutation {
    if toggle.is_null() {
        return FfiMutation::None;
    }
    let toggle = unsafe { &mut *toggle };
    catch_unwind(AssertUnwindSafe(|| toggle.inner.begin_toggle().into()))
        .unwrap_or(FfiMutation::None)
}

/// Resolve the request started by `watchlist_toggle_begin`.
///
/// `response` null means the request failed in transit. Returns the
/// notification to show, or null when there is nothing to show.
/// Free with `watchlist_free_notification`.
#[unsafe(no_mangle)]
pub extern "C" fn watchlist_toggle_finish(
    toggle: *mut FfiToggle,
    client: *const FfiWatchlistClient,
    mutation: FfiMutation,
    response: *const FfiHttpResponse,
) -> *mut FfiNotification {
    if toggle.is_null() || client.is_null() {
        return std::ptr::null_mut();
    }
    let toggle = unsafe { &mut *toggle };
    let client = unsafe { &*client };
    catch_unwind(AssertUnwindSafe(|| {
        let Some(mutation) = mutation.to_core() else {
            return std::ptr::null_mut();
        };
        let outcome = transport_outcome(response);
        let result = match mutation {
            watchlist_core::Mutation::Save => {
                outcome.and_then(|r| client.inner.parse_save_movie(r))
            }
            watchlist_core::Mutation::Remove => {
                outcome.and_then(|r| client.inner.parse_remove_movie(r))
            }
        };
        toggle
            .inner
            .finish_toggle(mutation, result)
            .map_or(std::ptr::null_mut(), FfiNotification::from_core)
    }))
    .unwrap_or(std::ptr::null_mut())
}

#[unsafe(no_mangle)]
pub extern "C" fn watchlist_toggle_state(toggle: *const FfiToggle) -> FfiMembershipState {
    if toggle.is_null() {
        return FfiMembershipState::Unknown;
    }
    unsafe { &*toggle }.inner.state().into()
}

/// True in `Saved`, and in `Removing` until the removal is confirmed.
#[unsafe(no_mangle)]
pub extern "C" fn watchlist_toggle_is_saved(toggle: *const FfiToggle) -> bool {
    !toggle.is_null() && unsafe { &*toggle }.inner.is_saved()
}

/// True while a save or remove is in flight.
#[unsafe(no_mangle)]
pub extern "C" fn watchlist_toggle_is_saving(toggle: *const FfiToggle) -> bool {
    !toggle.is_null() && unsafe { &*toggle }.inner.is_saving()
}

/// Text of the failure behind the current state, or null when the last
/// check or mutation succeeded. Free with `watchlist_free_string`.
#[unsafe(no_mangle)]
pub extern "C" fn watchlist_toggle_last_error(toggle: *const FfiToggle) -> *mut c_char {
    if toggle.is_null() {
        return std::ptr::null_mut();
    }
    let toggle = unsafe { &*toggle };
    catch_unwind(AssertUnwindSafe(|| {
        toggle
            .inner
            .last_error()
            .map_or(std::ptr::null_mut(), |err| c_string(err.to_string()))
    }))
    .unwrap_or(std::ptr::null_mut())
}

/// Detach the toggle from its screen; later results change nothing.
#[unsafe(no_mangle)]
pub extern "C" fn watchlist_toggle_unmount(toggle: *mut FfiToggle) {
    if !toggle.is_null() {
        unsafe { &mut *toggle }.inner.unmount();
    }
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free a request from any `watchlist_build_*`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn watchlist_free_request(req: *mut FfiHttpRequest) {
    if req.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let req = unsafe { Box::from_raw(req) };
        free_c_string(req.path);
        free_c_string(req.body);
        if !req.headers.is_null() {
            let headers = unsafe {
                Box::from_raw(std::ptr::slice_from_raw_parts_mut(
                    req.headers,
                    req.headers_len as usize,
                ))
            };
            for h in headers.iter() {
                free_c_string(h.key);
                free_c_string(h.value);
            }
        }
    });
}

/// Free a result from any `watchlist_parse_*`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn watchlist_free_result(result: *mut FfiWatchlistResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let result = unsafe { Box::from_raw(result) };
        free_c_string(result.error_message);
        if result.data.is_null() {
            return;
        }
        match result.data_tag {
            FfiDataTag::EntryList => {
                let list = unsafe { Box::from_raw(result.data as *mut FfiEntryList) };
                if !list.items.is_null() {
                    let items = unsafe {
                        Box::from_raw(std::ptr::slice_from_raw_parts_mut(
                            list.items,
                            list.len as usize,
                        ))
                    };
                    items.iter().for_each(FfiWatchlistEntry::free_fields);
                }
            }
            FfiDataTag::Saved => drop(unsafe { Box::from_raw(result.data as *mut bool) }),
            FfiDataTag::Message => free_c_string(result.data as *mut c_char),
            FfiDataTag::None => {}
        }
    });
}

/// Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn watchlist_free_notification(notification: *mut FfiNotification) {
    if !notification.is_null() {
        let _ = catch_unwind(|| {
            let n = unsafe { Box::from_raw(notification) };
            free_c_string(n.title);
            free_c_string(n.message);
        });
    }
}

/// Free a C string allocated by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn watchlist_free_string(s: *mut c_char) {
    let _ = catch_unwind(|| free_c_string(s));
}
