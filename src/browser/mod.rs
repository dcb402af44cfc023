// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Browser sessions and automation drivers
//!
//! [`BrowserSession`] wraps a [`FrameDriver`]. The default driver is the
//! in-process [`NativeDriver`]; the `webdriver` feature adds a driver for
//! real browsers.

mod config;
mod driver;
mod engine;
mod frame;
mod session;
#[cfg(feature = "webdriver")]
mod webdriver;

pub use config::{BrowserConfig, DriverKind};
pub use driver::{By, FrameDriver};
pub use engine::NativeDriver;
pub use frame::{FrameLoader, FrameSource};
pub use session::{BrowserSession, ScanInput};
#[cfg(feature = "webdriver")]
pub use webdriver::WebDriverDriver;
