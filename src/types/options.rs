use std::ops::Range;

/// Identifier of the debugger display surface used when nothing better is known.
pub const DEFAULT_DISPLAY_NAME: &str = "*Highlight Studio*";

/// Per-session settings.
///
/// ```
/// use highlight_studio::SessionOptions;
///
/// let options = SessionOptions::new()
///     .region(0..120)
///     .stop_at_forms(false)
///     .display_name("*studio*");
/// assert_eq!(options.display_name, "*studio*");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOptions {
    /// Byte range matching is restricted to. `None` is the whole document.
    pub region: Option<Range<usize>>,
    /// Pause at pre- and post-match forms instead of running them as part
    /// of the neighbouring transition.
    pub stop_at_forms: bool,
    /// Source identity reported for fragments without a defining file.
    pub display_name: String,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            region: None,
            stop_at_forms: true,
            display_name: DEFAULT_DISPLAY_NAME.to_owned(),
        }
    }
}

impl SessionOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn region(mut self, region: Range<usize>) -> Self {
        self.region = Some(region);
        self
    }

    #[must_use]
    pub fn stop_at_forms(mut self, stop: bool) -> Self {
        self.stop_at_forms = stop;
        self
    }

    #[must_use]
    pub fn display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = name.into();
        self
    }
}
