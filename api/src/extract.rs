use scraper::{ElementRef, Selector};

/// Where a matched element's value comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Text,
    Attr(&'static str),
}

#[derive(Debug)]
struct Rule {
    selector: Selector,
    source: Source,
}

/// Ordered `(selector, source)` candidates for one field.
///
/// Team pages come from several revisions of the same template, so a field
/// lists every selector it has been seen under. The first candidate that
/// yields a non-empty value wins; a field that can't be found is absent.
#[derive(Debug)]
pub struct FieldRules {
    field: &'static str,
    rules: Vec<Rule>,
}

impl FieldRules {
    /// Compile the candidates. A selector that doesn't parse is logged and
    /// left out so the remaining candidates still work.
    pub fn new(field: &'static str, candidates: &[(&str, Source)]) -> Self {
        let rules = candidates
            .iter()
            .filter_map(|(css, source)| match Selector::parse(css) {
                Ok(selector) => Some(Rule { selector, source: *source }),
                Err(e) => {
                    log::warn!("dropping selector {css:?} for {field}: {e:?}");
                    None
                }
            })
            .collect();
        Self { field, rules }
    }

    /// Candidates that all read element text.
    pub fn text(field: &'static str, selectors: &[&str]) -> Self {
        let candidates: Vec<(&str, Source)> = selectors.iter().map(|s| (*s, Source::Text)).collect();
        Self::new(field, &candidates)
    }

    pub fn field(&self) -> &'static str {
        self.field
    }

    /// First element matched by the earliest candidate that matches anything.
    pub fn first<'a>(&self, scope: ElementRef<'a>) -> Option<ElementRef<'a>> {
        self.rules
            .iter()
            .find_map(|rule| scope.select(&rule.selector).next())
    }

    /// Every element matched by the earliest candidate that matches anything.
    /// Candidates are alternatives, not unions.
    pub fn all<'a>(&self, scope: ElementRef<'a>) -> Vec<ElementRef<'a>> {
        for rule in &self.rules {
            let found: Vec<ElementRef<'a>> = scope.select(&rule.selector).collect();
            if !found.is_empty() {
                return found;
            }
        }
        Vec::new()
    }

    /// First non-empty value across the candidates, in order.
    pub fn value(&self, scope: ElementRef<'_>) -> Option<String> {
        self.rules.iter().find_map(|rule| {
            scope
                .select(&rule.selector)
                .filter_map(|el| read(el, rule.source))
                .next()
        })
    }

    /// All non-empty values of the earliest candidate that yields any.
    pub fn values(&self, scope: ElementRef<'_>) -> Vec<String> {
        for rule in &self.rules {
            let found: Vec<String> = scope
                .select(&rule.selector)
                .filter_map(|el| read(el, rule.source))
                .collect();
            if !found.is_empty() {
                return found;
            }
        }
        Vec::new()
    }

    /// Whether any candidate matches at all. Used for structural markers.
    pub fn present(&self, scope: ElementRef<'_>) -> bool {
        self.first(scope).is_some()
    }
}

fn read(el: ElementRef<'_>, source: Source) -> Option<String> {
    let value = match source {
        Source::Text => clean_text(el),
        Source::Attr(name) => normalize_ws(el.value().attr(name)?),
    };
    (!value.is_empty()).then_some(value)
}

/// All descendant text of `el`, whitespace (including NBSP) collapsed.
pub fn clean_text(el: ElementRef<'_>) -> String {
    normalize_ws(&el.text().collect::<String>())
}

fn normalize_ws(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn has_class(el: ElementRef<'_>, name: &str) -> bool {
    el.value().classes().any(|c| c.eq_ignore_ascii_case(name))
}

/// Protocol-relative image paths (`//cdn.host/a.jpg`) become `https:` URLs.
/// Anything else is returned unchanged.
pub fn absolute_image_url(raw: &str) -> String {
    let raw = raw.trim();
    match raw.strip_prefix("//") {
        Some(rest) => format!("https://{rest}"),
        None => raw.to_owned(),
    }
}
