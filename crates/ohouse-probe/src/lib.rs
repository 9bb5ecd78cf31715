//! ohouse-probe: Android UI automation for the 오늘의집 app
//!
//! Drives a device through an Appium server (W3C WebDriver over HTTP) and
//! `adb shell`, and runs scripted end-to-end journeys against the app.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//! │  Scenarios   │──►│ Page models  │──►│ Resolver /   │──►│ DeviceSession│──► Appium
//! │  (runner)    │   │ (BasePage)   │   │ Waiter/Toast │   │ DeviceShell  │──► adb
//! └──────────────┘   └──────────────┘   └──────────────┘   └──────────────┘
//! ```
//!
//! Everything is synchronous. Every wait is a poll loop with a wall-clock
//! deadline ([`wait::poll`]). The [`mock`] module provides an in-memory
//! device and shell so flows can be exercised without hardware.

#![warn(missing_docs)]
#![cfg_attr(test, allow(clippy::large_stack_arrays, clippy::large_stack_frames))]

mod result;

/// Soft and hard assertions
pub mod assertion;

/// W3C WebDriver transport for Appium
#[allow(clippy::missing_errors_doc)]
pub mod appium;

/// Suite configuration
pub mod config;

/// Network toggles and app process control
#[allow(clippy::missing_errors_doc)]
pub mod device;

/// Session lifecycle
pub mod fixture;

pub mod locator;

/// In-memory device and shell
#[allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]
pub mod mock;

/// Page base and the page trait
#[allow(clippy::missing_errors_doc)]
pub mod page_object;

/// Page models for the app and the Play Store
#[allow(clippy::missing_errors_doc)]
pub mod pages;

pub mod resolver;

/// End-to-end journeys
#[allow(clippy::missing_errors_doc)]
pub mod scenario;

/// Automation session abstraction
pub mod session;

/// `adb shell` access
pub mod shell;

/// Toast detection
pub mod toast;

pub mod wait;

pub use assertion::{ensure, AssertionMode, CheckFailure, SoftChecks};
pub use config::{AppConfig, AppLaunch, Credentials};
pub use device::{best_effort, DeviceController};
pub use fixture::{with_fixture, AppiumFactory, Fixture, OpenedSession, SessionFactory, SessionFixture};
pub use locator::{Locator, Strategy, Target, UiSelector};
pub use page_object::{BasePage, Pace, PageObject};
pub use resolver::Resolver;
pub use result::{ProbeError, ProbeResult};
pub use scenario::{
    all_scenarios, find_scenario, OutcomeStatus, Priority, RunObserver, RunOptions, Scenario,
    ScenarioContext, ScenarioOutcome, ScenarioRunner, SuiteReport,
};
pub use session::{DeviceSession, ElementHandle, Point};
pub use shell::{AdbShell, CommandOutput, DeviceShell};
pub use toast::{ToastDetector, ToastOutcome};
pub use wait::{poll, Condition, WaitOptions, WaitResult, Waiter};
