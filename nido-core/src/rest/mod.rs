// SPDX-FileCopyrightText: 2026 Nido Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! REST Transport Layer
//!
//! HTTP seam between the core and the backend API. The session store is
//! the only component that talks to it directly; everything else goes
//! through the session store's guarded request wrapper.

#[cfg(feature = "testing")]
pub mod mock;
#[cfg(not(feature = "testing"))]
mod mock;

#[cfg(feature = "testing")]
pub mod transport;
#[cfg(not(feature = "testing"))]
mod transport;

#[cfg(feature = "rest-reqwest")]
mod http;

pub use mock::MockRestTransport;
pub use transport::{
    ApiRequest, ApiResponse, Method, RestConfig, RestError, RestResult, RestTransport,
};

#[cfg(feature = "rest-reqwest")]
pub use http::ReqwestRestTransport;
