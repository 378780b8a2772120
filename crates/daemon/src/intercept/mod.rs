// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Request interception for offline use.
//!
//! Requests are served network-first. Successful GET responses are copied
//! into the asset cache; when the network fails the cache answers, then the
//! offline shell, then a synthetic 503. Excluded hosts are relayed untouched.

mod fetch;
mod interceptor;
mod lifecycle;
mod proxy;

pub use fetch::{is_hop_by_hop, FetchError, FetchRequest, FetchResponse, Fetcher, HttpFetcher};
pub use interceptor::{Intercepted, Interceptor, ResponseSource};
pub use lifecycle::InstallReport;
pub use proxy::{router, serve, target_url, SOURCE_HEADER};

#[cfg(test)]
mod test_helpers;
