//! Locator abstraction for finding Android UI elements.
//!
//! A [`Locator`] is a strategy plus an expression. Page models declare them as
//! constants; a logical element that renders differently across app builds gets
//! an ordered fallback chain instead. Both shapes resolve through [`Target`].
//!
//! ```
//! use ohouse_probe::locator::{Locator, Target, UiSelector};
//!
//! const LOGO: Locator = Locator::id("net.bucketplace:id/logo");
//! let home = UiSelector::new().text("홈").instance(0).into_locator();
//! let target = Target::chain(&[LOGO, home]);
//! assert_eq!(target.locators().len(), 2);
//! ```

use crate::result::{ProbeError, ProbeResult};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

/// How the automation server should interpret a locator expression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Android resource id (`net.bucketplace:id/logo`)
    Id,
    /// XPath over the UiAutomator hierarchy dump
    XPath,
    /// Content description
    AccessibilityId,
    /// UiAutomator `UiSelector`/`UiScrollable` Java expression
    UiAutomator,
    /// Widget class name
    ClassName,
}

impl Strategy {
    /// All strategies, in display order
    pub const ALL: [Self; 5] = [
        Self::Id,
        Self::XPath,
        Self::AccessibilityId,
        Self::UiAutomator,
        Self::ClassName,
    ];

    /// The `using` value sent over the W3C protocol
    #[must_use]
    pub const fn as_w3c(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::XPath => "xpath",
            Self::AccessibilityId => "accessibility id",
            Self::UiAutomator => "-android uiautomator",
            Self::ClassName => "class name",
        }
    }

    /// Short prefix used in `strategy=expression` text form
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::XPath => "xpath",
            Self::AccessibilityId => "accessibility_id",
            Self::UiAutomator => "uiautomator",
            Self::ClassName => "class",
        }
    }
}

impl FromStr for Strategy {
    type Err = ProbeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|strategy| strategy.prefix() == wanted || strategy.as_w3c() == wanted)
            .ok_or_else(|| ProbeError::invalid_locator(format!("unknown strategy `{wanted}`")))
    }
}

/// A strategy + expression pair identifying how to query an element
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Locator {
    strategy: Strategy,
    expression: Cow<'static, str>,
}

impl Locator {
    /// Locator with a runtime-built expression
    #[must_use]
    pub fn new(strategy: Strategy, expression: impl Into<String>) -> Self {
        Self {
            strategy,
            expression: Cow::Owned(expression.into()),
        }
    }

    /// Locator from a static expression, usable in `const` catalogs
    #[must_use]
    pub const fn from_static(strategy: Strategy, expression: &'static str) -> Self {
        Self {
            strategy,
            expression: Cow::Borrowed(expression),
        }
    }

    /// By resource id
    #[must_use]
    pub const fn id(expression: &'static str) -> Self {
        Self::from_static(Strategy::Id, expression)
    }

    /// By XPath
    #[must_use]
    pub const fn xpath(expression: &'static str) -> Self {
        Self::from_static(Strategy::XPath, expression)
    }

    /// By content description
    #[must_use]
    pub const fn accessibility_id(expression: &'static str) -> Self {
        Self::from_static(Strategy::AccessibilityId, expression)
    }

    /// By UiAutomator expression
    #[must_use]
    pub const fn ui_automator(expression: &'static str) -> Self {
        Self::from_static(Strategy::UiAutomator, expression)
    }

    /// By class name
    #[must_use]
    pub const fn class_name(expression: &'static str) -> Self {
        Self::from_static(Strategy::ClassName, expression)
    }

    /// Strategy
    #[must_use]
    pub const fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Expression
    #[must_use]
    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// Reject locators the server could never match
    pub fn validate(&self) -> ProbeResult<()> {
        if self.expression.trim().is_empty() {
            return Err(ProbeError::invalid_locator(format!(
                "empty {} expression",
                self.strategy.prefix()
            )));
        }
        Ok(())
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.strategy.prefix(), self.expression)
    }
}

impl FromStr for Locator {
    type Err = ProbeError;

    /// Parse the `strategy=expression` text form used in config files and the CLI
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (strategy, expression) = s.split_once('=').ok_or_else(|| {
            ProbeError::invalid_locator(format!("expected `strategy=expression`, got `{s}`"))
        })?;
        let locator = Self::new(strategy.parse()?, expression);
        locator.validate()?;
        Ok(locator)
    }
}

/// Either one locator or an ordered fallback chain for the same element
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// A single locator
    Single(Locator),
    /// Alternatives tried left to right; first success wins
    Chain(Vec<Locator>),
}

impl Target {
    /// Build a chain from a static catalog slice
    #[must_use]
    pub fn chain(locators: &[Locator]) -> Self {
        Self::Chain(locators.to_vec())
    }

    /// The locators in the order they will be tried
    #[must_use]
    pub fn locators(&self) -> &[Locator] {
        match self {
            Self::Single(locator) => std::slice::from_ref(locator),
            Self::Chain(locators) => locators,
        }
    }

    /// Check shape before any device round trip
    pub fn validate(&self) -> ProbeResult<()> {
        if self.locators().is_empty() {
            return Err(ProbeError::invalid_locator("empty fallback chain"));
        }
        self.locators().iter().try_for_each(Locator::validate)
    }
}

impl From<Locator> for Target {
    fn from(locator: Locator) -> Self {
        Self::Single(locator)
    }
}

impl From<&Locator> for Target {
    fn from(locator: &Locator) -> Self {
        Self::Single(locator.clone())
    }
}

impl From<Vec<Locator>> for Target {
    fn from(locators: Vec<Locator>) -> Self {
        Self::Chain(locators)
    }
}

impl From<&[Locator]> for Target {
    fn from(locators: &[Locator]) -> Self {
        Self::chain(locators)
    }
}

impl<const N: usize> From<&[Locator; N]> for Target {
    fn from(locators: &[Locator; N]) -> Self {
        Self::chain(locators)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single(locator) => write!(f, "{locator}"),
            Self::Chain(locators) => {
                let parts: Vec<String> = locators.iter().map(ToString::to_string).collect();
                write!(f, "[{}]", parts.join(" | "))
            }
        }
    }
}

// ============================================================================
// UiAutomator expression builders
// ============================================================================

/// Builder for `new UiSelector()...` expressions
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UiSelector {
    calls: Vec<String>,
}

impl UiSelector {
    /// Empty selector
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn call(mut self, method: &str, arg: String) -> Self {
        self.calls.push(format!(".{method}({arg})"));
        self
    }

    /// Exact text
    #[must_use]
    pub fn text(self, text: &str) -> Self {
        self.call("text", java_string(text))
    }

    /// Text containing a fragment
    #[must_use]
    pub fn text_contains(self, text: &str) -> Self {
        self.call("textContains", java_string(text))
    }

    /// Exact content description
    #[must_use]
    pub fn description(self, description: &str) -> Self {
        self.call("description", java_string(description))
    }

    /// Content description containing a fragment
    #[must_use]
    pub fn description_contains(self, description: &str) -> Self {
        self.call("descriptionContains", java_string(description))
    }

    /// Resource id
    #[must_use]
    pub fn resource_id(self, id: &str) -> Self {
        self.call("resourceId", java_string(id))
    }

    /// Widget class
    #[must_use]
    pub fn class_name(self, class: &str) -> Self {
        self.call("className", java_string(class))
    }

    /// Only scrollable containers
    #[must_use]
    pub fn scrollable(self, scrollable: bool) -> Self {
        self.call("scrollable", scrollable.to_string())
    }

    /// Zero-based match index
    #[must_use]
    pub fn instance(self, index: u32) -> Self {
        self.call("instance", index.to_string())
    }

    /// Render the Java expression
    #[must_use]
    pub fn expression(&self) -> String {
        format!("new UiSelector(){}", self.calls.concat())
    }

    /// Wrap as a UiAutomator locator
    #[must_use]
    pub fn into_locator(self) -> Locator {
        Locator::new(Strategy::UiAutomator, self.expression())
    }
}

/// Locator whose lookup scrolls the first scrollable container until `text` is visible
#[must_use]
pub fn scroll_text_into_view(text: &str) -> Locator {
    Locator::new(
        Strategy::UiAutomator,
        format!(
            "new UiScrollable(new UiSelector().scrollable(true)).scrollTextIntoView({});",
            java_string(text)
        ),
    )
}

/// Locator whose lookup flings the first scrollable container to its end
#[must_use]
pub fn scroll_to_end(max_swipes: u32) -> Locator {
    Locator::new(
        Strategy::UiAutomator,
        format!("new UiScrollable(new UiSelector().scrollable(true)).scrollToEnd({max_swipes});"),
    )
}

fn java_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}
