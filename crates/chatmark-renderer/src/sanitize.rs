//! Allowlist HTML sanitizer and URL policy.
//!
//! Anything not on the allowlist is removed, never merely escaped. Inline
//! tags that are not allowed are unwrapped so their text survives; the
//! dangerous tags in [`SanitizePolicy::clean_content_tags`] are dropped along
//! with their whole subtree.

use std::borrow::Cow;
use std::collections::HashSet;
use std::sync::LazyLock;

/// URL schemes kept as-is by [`sanitize_url`].
pub const ALLOWED_SCHEMES: &[&str] = &["http", "https", "mailto"];

const BLOCKED_SCHEMES: &[&str] = &["javascript:", "data:", "vbscript:"];

pub const ALLOWED_TAGS: &[&str] = &[
    "a",
    "strong",
    "b",
    "em",
    "i",
    "s",
    "del",
    "u",
    "code",
    "pre",
    "span",
    "ul",
    "ol",
    "li",
    "blockquote",
    "p",
    "br",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
];

pub const ALLOWED_ATTRIBUTES: &[&str] = &[
    "class",
    "href",
    "rel",
    "target",
    "data-epoch",
    "data-style",
    "data-language",
    "title",
    "tabindex",
    "role",
    "aria-label",
];

/// Tags removed together with everything inside them.
pub const CLEAN_CONTENT_TAGS: &[&str] = &[
    "script", "style", "iframe", "object", "embed", "form", "input", "img", "textarea", "select",
    "noscript",
];

/// Immutable allowlists driving [`sanitize_with`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizePolicy {
    tags: HashSet<&'static str>,
    attributes: HashSet<&'static str>,
    url_schemes: HashSet<&'static str>,
    clean_content_tags: HashSet<&'static str>,
}

impl Default for SanitizePolicy {
    fn default() -> Self {
        Self::new(
            ALLOWED_TAGS,
            ALLOWED_ATTRIBUTES,
            ALLOWED_SCHEMES,
            CLEAN_CONTENT_TAGS,
        )
    }
}

impl SanitizePolicy {
    /// Build a policy. Forbidden tags always win over allowed ones and `on*`
    /// event-handler attributes are never allowed.
    pub fn new(
        tags: &[&'static str],
        attributes: &[&'static str],
        url_schemes: &[&'static str],
        clean_content_tags: &[&'static str],
    ) -> Self {
        let clean_content_tags: HashSet<_> = clean_content_tags.iter().copied().collect();
        Self {
            tags: tags
                .iter()
                .copied()
                .filter(|tag| !clean_content_tags.contains(tag))
                .collect(),
            attributes: attributes
                .iter()
                .copied()
                .filter(|attr| !is_event_handler(attr))
                .collect(),
            url_schemes: url_schemes.iter().copied().collect(),
            clean_content_tags,
        }
    }

    pub fn allows_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    pub fn allows_attribute(&self, attribute: &str) -> bool {
        self.attributes.contains(attribute)
    }

    /// Compile the allowlists into a reusable [`Sanitizer`].
    pub fn sanitizer(&self) -> Sanitizer {
        Sanitizer {
            builder: self.builder(),
        }
    }

    fn builder(&self) -> ammonia::Builder<'static> {
        let mut builder = ammonia::Builder::default();
        builder
            .tags(self.tags.clone())
            .clean_content_tags(self.clean_content_tags.clone())
            .generic_attributes(self.attributes.clone())
            .tag_attributes(Default::default())
            .url_schemes(self.url_schemes.clone())
            // `rel` is on the attribute allowlist, so ammonia must not manage it.
            .link_rel(None)
            .strip_comments(true)
            .attribute_filter(filter_attribute);
        builder
    }
}

fn is_event_handler(attribute: &str) -> bool {
    attribute
        .get(..2)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("on"))
}

fn filter_attribute<'u>(_element: &str, attribute: &str, value: &'u str) -> Option<Cow<'u, str>> {
    if is_event_handler(attribute) {
        return None;
    }
    if attribute == "href" {
        let url = sanitize_url(value);
        if url.is_empty() {
            tracing::debug!(href = value, "dropping unsafe href");
            return None;
        }
        return Some(Cow::Owned(url));
    }
    Some(Cow::Borrowed(value))
}

/// A [`SanitizePolicy`] built into an ammonia cleaner once and shared
/// across calls.
pub struct Sanitizer {
    builder: ammonia::Builder<'static>,
}

impl Sanitizer {
    pub fn clean(&self, html: &str) -> String {
        self.builder.clean(html).to_string()
    }
}

static DEFAULT_SANITIZER: LazyLock<Sanitizer> =
    LazyLock::new(|| SanitizePolicy::default().sanitizer());

/// Clean `html` with the default policy.
pub fn sanitize(html: &str) -> String {
    DEFAULT_SANITIZER.clean(html)
}

/// Clean `html` with a one-off policy. Keep a [`Sanitizer`] from
/// [`SanitizePolicy::sanitizer`] when the same policy runs repeatedly.
pub fn sanitize_with(html: &str, policy: &SanitizePolicy) -> String {
    policy.sanitizer().clean(html)
}

/// Normalise a link target, returning an empty string if it is unsafe.
///
/// Blocked schemes are rejected case-insensitively. Allowed schemes, absolute
/// paths and fragments pass unchanged. Scheme-less input gets `https://`.
/// Anything else is rejected.
pub fn sanitize_url(url: &str) -> String {
    let url = url.trim();
    if url.is_empty() {
        return String::new();
    }
    // Control characters and whitespace inside the scheme are ignored by
    // browsers, so `java\tscript:` must still be caught.
    let scheme_probe: String = url
        .chars()
        .filter(|c| !c.is_ascii_control() && !c.is_whitespace())
        .take(16)
        .collect::<String>()
        .to_ascii_lowercase();
    if BLOCKED_SCHEMES
        .iter()
        .any(|scheme| scheme_probe.starts_with(scheme))
    {
        return String::new();
    }

    let lower = url.to_ascii_lowercase();
    let has_allowed_scheme = ALLOWED_SCHEMES.iter().any(|scheme| {
        lower
            .strip_prefix(scheme)
            .is_some_and(|rest| rest.starts_with(':'))
    });
    if has_allowed_scheme || url.starts_with('/') || url.starts_with('#') {
        return url.to_string();
    }
    if !url.contains("://") {
        return format!("https://{url}");
    }
    String::new()
}
