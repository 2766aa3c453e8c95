//! Message text to safe HTML in one call.

use chatmark_markdown::{Parser, TimestampFormatter};
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::base_html::render_tokens;
use crate::highlight::HighlighterRegistry;
use crate::sanitize::sanitize;

/// Source of the current time for relative timestamps.
pub trait Clock {
    /// Current time in epoch seconds.
    fn now(&self) -> i64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> i64 {
        match web_time::SystemTime::now().duration_since(web_time::UNIX_EPOCH) {
            Ok(elapsed) => i64::try_from(elapsed.as_secs()).unwrap_or(i64::MAX),
            Err(before) => i64::try_from(before.duration().as_secs()).map_or(i64::MIN, |s| -s),
        }
    }
}

/// A clock stopped at a fixed epoch second.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub i64);

impl Clock for FixedClock {
    fn now(&self) -> i64 {
        self.0
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> i64 {
        (**self).now()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RenderOptions {
    /// Overrides the clock when set.
    pub now: Option<i64>,
    /// Offset applied to absolute timestamps.
    pub utc_offset_minutes: i32,
    /// POSIX locale name for month and weekday names, e.g. `en_US`.
    pub locale: SmolStr,
    /// Run the allowlist sanitizer over the rendered HTML.
    pub sanitize: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            now: None,
            utc_offset_minutes: 0,
            locale: SmolStr::new_static("en_US"),
            sanitize: true,
        }
    }
}

/// Parse, render and sanitize with a caller-owned registry and clock.
pub struct Renderer<R, C = SystemClock> {
    registry: R,
    clock: C,
    options: RenderOptions,
}

impl<R: HighlighterRegistry> Renderer<R> {
    pub fn new(registry: R) -> Self {
        Self {
            registry,
            clock: SystemClock,
            options: RenderOptions::default(),
        }
    }
}

impl<R: HighlighterRegistry, C: Clock> Renderer<R, C> {
    pub fn with_clock<C2: Clock>(self, clock: C2) -> Renderer<R, C2> {
        Renderer {
            registry: self.registry,
            clock,
            options: self.options,
        }
    }

    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    pub fn registry(&self) -> &R {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut R {
        &mut self.registry
    }

    /// Parser configured from the current options and clock.
    pub fn parser(&self) -> Parser {
        let now = self.options.now.unwrap_or_else(|| self.clock.now());
        let formatter =
            TimestampFormatter::from_settings(self.options.utc_offset_minutes, &self.options.locale);
        Parser::new().with_now(now).with_formatter(formatter)
    }

    /// Render `text` to HTML. Sanitized unless the options say otherwise.
    pub fn render(&self, text: &str) -> String {
        let _span = tracing::trace_span!("render", len = text.len()).entered();
        let tokens = self.parser().parse(text);
        let html = render_tokens(&tokens, &self.registry);
        if self.options.sanitize {
            sanitize(&html)
        } else {
            html
        }
    }
}

#[cfg(feature = "syntax-highlighting")]
static DEFAULT_REGISTRY: std::sync::LazyLock<crate::highlight::SyntectRegistry> =
    std::sync::LazyLock::new(crate::highlight::SyntectRegistry::with_all_languages);

/// Render `text` with default options, the system clock and every bundled
/// grammar available.
pub fn render(text: &str) -> String {
    #[cfg(feature = "syntax-highlighting")]
    let registry = &*DEFAULT_REGISTRY;
    #[cfg(not(feature = "syntax-highlighting"))]
    let registry = crate::highlight::NoHighlighting;

    Renderer::new(registry).render(text)
}
