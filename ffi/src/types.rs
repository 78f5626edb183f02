//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Each type mirrors a core type with C-compatible fields: `*mut c_char`
//! for strings (null for absent optionals), raw pointer plus length for
//! lists, and enums with explicit discriminants. Conversions live here so
//! `lib.rs` stays focused on the `extern "C"` surface.

use std::ffi::{CString, c_void};
use std::os::raw::c_char;

use watchlist_core::{
    ApiError, CheckTicket, HttpMethod, MembershipState, MembershipToggle, Mutation,
    Notification, NotificationKind, WatchlistEntry,
};

/// Opaque handle to a `WatchlistClient`.
pub struct FfiWatchlistClient {
    pub(crate) inner: watchlist_core::WatchlistClient,
}

/// Opaque handle to one movie's membership toggle.
///
/// Outstanding check tickets are kept here so C callers only deal in
/// plain generation numbers.
pub struct FfiToggle {
    pub(crate) inner: MembershipToggle,
    pub(crate) checks: Vec<CheckTicket>,
}

impl FfiToggle {
    pub(crate) fn take_check(&mut self, generation: u64) -> Option<CheckTicket> {
        let index = self
            .checks
            .iter()
            .position(|t| t.generation() == generation)?;
        Some(self.checks.swap_remove(index))
    }
}

/// Copy `s` into a heap C string. Interior NULs are dropped.
pub(crate) fn c_string(s: impl Into<String>) -> *mut c_char {
    let mut s: String = s.into();
    s.retain(|c| c != '\0');
    CString::new(s).unwrap_or_default().into_raw()
}

fn c_string_opt(s: Option<String>) -> *mut c_char {
    s.map_or(std::ptr::null_mut(), c_string)
}

/// Release a string made by `c_string`. Null is ignored.
pub(crate) fn free_c_string(s: *mut c_char) {
    if !s.is_null() {
        drop(unsafe { CString::from_raw(s) });
    }
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

#[repr(C)]
pub enum FfiHttpMethod {
    Get = 0,
    Post = 1,
    Delete = 2,
}

impl From<HttpMethod> for FfiHttpMethod {
    fn from(m: HttpMethod) -> Self {
        match m {
            HttpMethod::Get => FfiHttpMethod::Get,
            HttpMethod::Post => FfiHttpMethod::Post,
            HttpMethod::Delete => FfiHttpMethod::Delete,
        }
    }
}

#[repr(C)]
pub struct FfiHeader {
    pub key: *mut c_char,
    pub value: *mut c_char,
}

/// A request described as plain data. `path` is the absolute URL.
///
/// Built by `watchlist_build_*`; the host executes it and hands the
/// response to the matching `watchlist_parse_*`.
#[repr(C)]
pub struct FfiHttpRequest {
    pub method: FfiHttpMethod,
    pub path: *mut c_char,
    pub headers: *mut FfiHeader,
    pub headers_len: u32,
    pub body: *mut c_char,
}

impl FfiHttpRequest {
    pub(crate) fn from_core(req: watchlist_core::HttpRequest) -> *mut Self {
        let headers_len = req.headers.len() as u32;
        let headers = if req.headers.is_empty() {
            std::ptr::null_mut()
        } else {
            let headers: Box<[FfiHeader]> = req
                .headers
                .into_iter()
                .map(|(k, v)| FfiHeader {
                    key: c_string(k),
                    value: c_string(v),
                })
                .collect();
            Box::into_raw(headers) as *mut FfiHeader
        };
        Box::into_raw(Box::new(FfiHttpRequest {
            method: req.method.into(),
            path: c_string(req.path),
            headers,
            headers_len,
            body: c_string_opt(req.body),
        }))
    }
}

/// Response input built by the host. Read, never freed, by this library.
#[repr(C)]
pub struct FfiHttpResponse {
    pub status: u16,
    pub body: *const c_char,
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

#[repr(C)]
#[derive(Debug, PartialEq, Eq)]
pub enum FfiErrorCode {
    Ok = 0,
    NetworkFailure = 1,
    RemoteRejection = 2,
    MalformedResponse = 3,
    Serialization = 4,
    Panic = 5,
    NullArg = 6,
}

/// Tells `watchlist_free_result` what `FfiWatchlistResult::data` points to.
#[repr(C)]
#[derive(Debug, PartialEq, Eq)]
pub enum FfiDataTag {
    None = 0,
    /// `FfiEntryList`
    EntryList = 1,
    /// `bool`
    Saved = 2,
    /// `char`, the server's confirmation text
    Message = 3,
}

#[repr(C)]
pub struct FfiWatchlistEntry {
    pub user_id: *mut c_char,
    pub movie_id: i64,
    pub title: *mut c_char,
    pub poster_path: *mut c_char,
    pub vote_average: f64,
    pub release_date: *mut c_char,
}

impl FfiWatchlistEntry {
    fn from_core(entry: WatchlistEntry) -> Self {
        Self {
            user_id: c_string(entry.user_id.as_str()),
            movie_id: entry.movie_id,
            title: c_string(entry.title),
            poster_path: c_string_opt(entry.poster_path),
            vote_average: entry.vote_average,
            release_date: c_string_opt(entry.release_date),
        }
    }

    pub(crate) fn free_fields(&self) {
        free_c_string(self.user_id);
        free_c_string(self.title);
        free_c_string(self.poster_path);
        free_c_string(self.release_date);
    }
}

#[repr(C)]
pub struct FfiEntryList {
    pub items: *mut FfiWatchlistEntry,
    pub len: u32,
}

/// Result envelope for every parse operation.
///
/// On success `error_code` is `Ok`, `error_message` is null and `data`
/// points to the payload named by `data_tag`. On failure `data` is null and
/// `http_status` is set for `RemoteRejection`.
#[repr(C)]
pub struct FfiWatchlistResult {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub http_status: u16,
    pub data_tag: FfiDataTag,
    pub data: *mut c_void,
}

impl FfiWatchlistResult {
    fn ok(data_tag: FfiDataTag, data: *mut c_void) -> *mut Self {
        Box::into_raw(Box::new(FfiWatchlistResult {
            error_code: FfiErrorCode::Ok,
            error_message: std::ptr::null_mut(),
            http_status: 0,
            data_tag,
            data,
        }))
    }

    fn err(error_code: FfiErrorCode, http_status: u16, message: String) -> *mut Self {
        Box::into_raw(Box::new(FfiWatchlistResult {
            error_code,
            error_message: c_string(message),
            http_status,
            data_tag: FfiDataTag::None,
            data: std::ptr::null_mut(),
        }))
    }

    pub(crate) fn ok_entries(entries: Vec<WatchlistEntry>) -> *mut Self {
        let len = entries.len() as u32;
        let items = if entries.is_empty() {
            std::ptr::null_mut()
        } else {
            let items: Box<[FfiWatchlistEntry]> =
                entries.into_iter().map(FfiWatchlistEntry::from_core).collect();
            Box::into_raw(items) as *mut FfiWatchlistEntry
        };
        let list = Box::new(FfiEntryList { items, len });
        Self::ok(FfiDataTag::EntryList, Box::into_raw(list) as *mut c_void)
    }

    pub(crate) fn ok_saved(saved: bool) -> *mut Self {
        Self::ok(FfiDataTag::Saved, Box::into_raw(Box::new(saved)) as *mut c_void)
    }

    pub(crate) fn ok_message(message: String) -> *mut Self {
        Self::ok(FfiDataTag::Message, c_string(message) as *mut c_void)
    }

    pub(crate) fn from_error(err: ApiError) -> *mut Self {
        let message = err.to_string();
        match err {
            ApiError::NetworkFailure(_) => Self::err(FfiErrorCode::NetworkFailure, 0, message),
            ApiError::RemoteRejection { status, .. } => {
                Self::err(FfiErrorCode::RemoteRejection, status, message)
            }
            ApiError::MalformedResponse(_) => {
                Self::err(FfiErrorCode::MalformedResponse, 0, message)
            }
            ApiError::Serialization(_) => Self::err(FfiErrorCode::Serialization, 0, message),
        }
    }

    pub(crate) fn null_arg(name: &str) -> *mut Self {
        Self::err(FfiErrorCode::NullArg, 0, format!("null argument: {name}"))
    }

    pub(crate) fn panic(message: &str) -> *mut Self {
        Self::err(FfiErrorCode::Panic, 0, message.to_string())
    }
}

// ---------------------------------------------------------------------------
// Toggle types
// ---------------------------------------------------------------------------

#[repr(C)]
#[derive(Debug, PartialEq, Eq)]
pub enum FfiMembershipState {
    Unknown = 0,
    Checking = 1,
    Saved = 2,
    NotSaved = 3,
    Saving = 4,
    Removing = 5,
}

impl From<MembershipState> for FfiMembershipState {
    fn from(s: MembershipState) -> Self {
        match s {
            MembershipState::Unknown => FfiMembershipState::Unknown,
            MembershipState::Checking => FfiMembershipState::Checking,
            MembershipState::Saved => FfiMembershipState::Saved,
            MembershipState::NotSaved => FfiMembershipState::NotSaved,
            MembershipState::Saving => FfiMembershipState::Saving,
            MembershipState::Removing => FfiMembershipState::Removing,
        }
    }
}

/// Which request a tap requires. `None` means send nothing.
#[repr(C)]
#[derive(Debug, PartialEq, Eq)]
pub enum FfiMutation {
    None = 0,
    Save = 1,
    Remove = 2,
}

impl From<Option<Mutation>> for FfiMutation {
    fn from(m: Option<Mutation>) -> Self {
        match m {
            Some(Mutation::Save) => FfiMutation::Save,
            Some(Mutation::Remove) => FfiMutation::Remove,
            None => FfiMutation::None,
        }
    }
}

impl FfiMutation {
    pub(crate) fn to_core(&self) -> Option<Mutation> {
        match self {
            FfiMutation::Save => Some(Mutation::Save),
            FfiMutation::Remove => Some(Mutation::Remove),
            FfiMutation::None => None,
        }
    }
}

#[repr(C)]
#[derive(Debug, PartialEq, Eq)]
pub enum FfiNotificationKind {
    Saved = 0,
    Removed = 1,
    SaveFailed = 2,
    RemoveFailed = 3,
}

#[repr(C)]
pub struct FfiNotification {
    pub kind: FfiNotificationKind,
    pub title: *mut c_char,
    pub message: *mut c_char,
}

impl FfiNotification {
    pub(crate) fn from_core(n: Notification) -> *mut Self {
        let kind = match n.kind {
            NotificationKind::Saved => FfiNotificationKind::Saved,
            NotificationKind::Removed => FfiNotificationKind::Removed,
            NotificationKind::SaveFailed => FfiNotificationKind::SaveFailed,
            NotificationKind::RemoveFailed => FfiNotificationKind::RemoveFailed,
        };
        Box::into_raw(Box::new(FfiNotification {
            kind,
            title: c_string(n.title),
            message: c_string(n.message),
        }))
    }
}
