// Copyright 2026 Zillow Client Contributors
// SPDX-License-Identifier: Apache-2.0

//! Client for the Zillow Web Services valuation API.
//!
//! Issues one HTTP GET per operation and maps the XML responses into typed
//! [`Property`] records. Mapping is deliberately tolerant: the API omits
//! and reshapes fields freely between responses, so every entity field is
//! an `Option` filled independently, and a missing field never fails a
//! call.
//!
//! ```no_run
//! use zillow::ValuationClient;
//!
//! # async fn run() -> zillow::Result<()> {
//! let client = ValuationClient::new()?;
//! let place = client
//!     .search_results("your-zws-id", "2114 Bigelow Ave", "Seattle, WA", false)
//!     .await?;
//! println!("zpid {:?} valued at {:?}", place.zpid, place.zestimate.amount);
//! # Ok(())
//! # }
//! ```
//!
//! Failures fall into three kinds: [`Error::InvalidRequest`] for missing
//! parameters (raised before any network traffic), [`Error::Transport`]
//! for network and HTTP-status failures, and [`Error::MalformedResponse`]
//! for bodies that decode but lack the expected result structure (the raw
//! body text rides along for diagnosis).

pub mod client;
pub mod config;
pub mod error;
pub mod notices;
pub mod property;
pub mod xml;

pub use client::ValuationClient;
pub use config::ClientConfig;
pub use error::{Error, Result};
pub use notices::{Notice, NoticeBus};
pub use property::{
    map_comparables, Address, CompReject, CompsResult, DetailLevel, ExtendedDetails, Links,
    LocalMarket, MapError, Property, Zestimate,
};
