use crate::dom::element::{normalize_whitespace, Element};
use crate::errors::{BrowserError, Result};
use scraper::{ElementRef, Html};
use std::collections::HashMap;
use url::Url;

/// A parsed response body.
///
/// Owned and cloneable: every navigation produces a new `Document`, and a
/// clone handed out by [`crate::Browser`] never changes underneath its holder.
#[derive(Debug, Clone)]
pub struct Document {
    html: Html,
    url: Url,
    base: Url,
    overrides: HashMap<String, String>,
}

/// Element resolved from a visible text, see [`Document::clickable`].
#[derive(Debug, Clone, Copy)]
pub enum Clickable<'a> {
    Submit(Element<'a>),
    Link(Element<'a>),
}

impl Document {
    /// Parse possibly malformed markup. Only an empty body is rejected.
    pub fn parse(html: &str, url: Url) -> Result<Self> {
        if html.trim().is_empty() {
            return Err(BrowserError::EmptyDocument);
        }
        Ok(Self::from_html(Html::parse_document(html), url))
    }

    /// Placeholder for a failed or body-less exchange; every query misses.
    pub fn empty(url: Url) -> Self {
        Self::from_html(Html::parse_document(""), url)
    }

    fn from_html(html: Html, url: Url) -> Self {
        let base = html
            .tree
            .root()
            .descendants()
            .filter_map(ElementRef::wrap)
            .filter(|el| el.value().name() == "base")
            .find_map(|el| el.value().attr("href"))
            .and_then(|href| url.join(href.trim()).ok())
            .unwrap_or_else(|| url.clone());

        Self {
            html,
            url,
            base,
            overrides: HashMap::new(),
        }
    }

    /// URL this document was served from.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Effective base: `<base href>` when present, the document URL otherwise.
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Resolve a reference against the effective base. Components present in
    /// `reference` are kept; missing ones come from the base.
    pub fn absolutize(&self, reference: &str) -> String {
        match self.base.join(reference.trim()) {
            Ok(url) => url.to_string(),
            Err(_) => reference.to_string(),
        }
    }

    pub fn title(&self) -> Option<String> {
        self.by_tag("title")
            .first()
            .map(|t| t.text())
            .filter(|t| !t.is_empty())
    }

    /// All elements in document order.
    pub fn elements(&self) -> impl Iterator<Item = Element<'_>> + '_ {
        self.html
            .tree
            .root()
            .descendants()
            .filter_map(ElementRef::wrap)
            .map(move |el| Element::new(el, self))
    }

    pub fn by_id(&self, id: &str) -> Option<Element<'_>> {
        self.elements().find(|el| el.id() == Some(id))
    }

    pub fn by_name(&self, name: &str) -> Option<Element<'_>> {
        self.elements().find(|el| el.name() == Some(name))
    }

    pub fn by_classes(&self, classes: &[&str]) -> Option<Element<'_>> {
        self.elements().find(|el| el.has_classes(classes))
    }

    pub fn by_tag(&self, tag_name: &str) -> Vec<Element<'_>> {
        self.elements().filter(|el| el.is(tag_name)).collect()
    }

    /// Element directly owning a text node equal to `text` (whitespace-normalized).
    pub fn by_text(&self, text: &str) -> Option<Element<'_>> {
        self.text_owners(text).next()
    }

    /// Every element directly owning a text node equal to `text`, in document order.
    fn text_owners(&self, text: &str) -> impl Iterator<Item = Element<'_>> + '_ {
        let wanted = normalize_whitespace(text);
        self.html
            .tree
            .root()
            .descendants()
            .filter(move |node| {
                node.value()
                    .as_text()
                    .map(|t| normalize_whitespace(t) == wanted)
                    .unwrap_or(false)
            })
            .filter_map(|node| node.parent().and_then(ElementRef::wrap))
            .map(move |el| Element::new(el, self))
    }

    pub fn submit_by_value(&self, label: &str) -> Option<Element<'_>> {
        let wanted = normalize_whitespace(label);
        self.elements()
            .find(|el| el.submit_label().as_deref() == Some(wanted.as_str()))
    }

    pub fn link_by_text(&self, text: &str) -> Option<Element<'_>> {
        let wanted = normalize_whitespace(text);
        self.elements()
            .find(|el| el.is("a") && el.has_attribute("href") && el.text() == wanted)
    }

    pub fn links(&self) -> Vec<Element<'_>> {
        self.elements()
            .filter(|el| el.is("a") && el.has_attribute("href"))
            .collect()
    }

    pub fn forms(&self) -> Vec<Element<'_>> {
        self.by_tag("form")
    }

    /// Resolve what a user would click when looking for `text`:
    /// a submit control labelled `text` that belongs to a form, else a link
    /// with that text, else the nearest link around a text node equal to
    /// `text`. Candidates that lead nowhere are skipped.
    pub fn clickable(&self, text: &str) -> Option<Clickable<'_>> {
        let label = normalize_whitespace(text);
        let submit = self.elements().find(|el| {
            el.submit_label().as_deref() == Some(label.as_str())
                && self.owning_form(el).is_some()
        });
        if let Some(submit) = submit {
            return Some(Clickable::Submit(submit));
        }
        if let Some(link) = self.link_by_text(text) {
            return Some(Clickable::Link(link));
        }
        self.text_owners(text)
            .find_map(|el| {
                let link = if el.is("a") {
                    Some(el)
                } else {
                    el.closest_ancestor("a")
                };
                link.filter(|a| a.has_attribute("href"))
            })
            .map(Clickable::Link)
    }

    /// Every `input[name]` with its current value, later duplicates winning.
    pub fn form_field_values(&self) -> HashMap<String, String> {
        self.elements()
            .filter(|el| el.is("input"))
            .filter_map(|el| {
                let name = el.name()?;
                let value = self
                    .overrides
                    .get(name)
                    .cloned()
                    .unwrap_or_else(|| el.raw_attribute("value").unwrap_or_default().to_string());
                Some((name.to_string(), value))
            })
            .collect()
    }

    /// Override the value a named control will submit with.
    pub fn set_value(&mut self, name: &str, value: &str) -> Result<()> {
        let exists = self
            .elements()
            .any(|el| is_form_control(&el) && el.name() == Some(name));
        if !exists {
            return Err(BrowserError::ElementNotFound(format!(
                "form control named '{}'",
                name
            )));
        }
        self.overrides.insert(name.to_string(), value.to_string());
        Ok(())
    }

    pub fn value_override(&self, name: &str) -> Option<&str> {
        self.overrides.get(name).map(String::as_str)
    }

    /// Raw markup, re-serialized.
    pub fn html(&self) -> String {
        self.html.html()
    }
}

pub(crate) fn is_form_control(el: &Element<'_>) -> bool {
    matches!(el.tag_name(), "input" | "select" | "textarea" | "button")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(html: &str, url: &str) -> Document {
        Document::parse(html, Url::parse(url).unwrap()).unwrap()
    }

    #[test]
    fn relative_links_resolve_against_document_url() {
        let doc = parse(
            r#"<a id="l" href="/path?a=1">x</a><form id="f" action="submit.do"></form>"#,
            "https://x.com/sub/page",
        );
        assert_eq!(
            doc.by_id("l").unwrap().attribute("href").as_deref(),
            Some("https://x.com/path?a=1")
        );
        assert_eq!(
            doc.by_id("f").unwrap().attribute("action").as_deref(),
            Some("https://x.com/sub/submit.do")
        );
        assert_eq!(doc.by_id("l").unwrap().raw_attribute("href"), Some("/path?a=1"));
    }

    #[test]
    fn base_element_overrides_document_url() {
        let doc = parse(
            r#"<html><head><base href="https://cdn.bank.example/portal/"></head>
               <body><a id="l" href="konto.html">Konto</a><a id="abs" href="https://other.example/x">o</a></body></html>"#,
            "https://x.com/sub/page",
        );
        assert_eq!(doc.base_url().as_str(), "https://cdn.bank.example/portal/");
        assert_eq!(
            doc.by_id("l").unwrap().attribute("href").as_deref(),
            Some("https://cdn.bank.example/portal/konto.html")
        );
        assert_eq!(
            doc.by_id("abs").unwrap().attribute("href").as_deref(),
            Some("https://other.example/x")
        );
    }

    #[test]
    fn relative_base_is_resolved_first() {
        let doc = parse(
            r#"<base href="/banking/"><a id="l" href="?page=2">n</a>"#,
            "https://x.com/sub/page",
        );
        assert_eq!(
            doc.by_id("l").unwrap().attribute("href").as_deref(),
            Some("https://x.com/banking/?page=2")
        );
    }

    #[test]
    fn malformed_markup_is_tolerated() {
        let doc = parse(
            "<table><tr><td>Saldo<td><b>1.234,56</table></div></span><p>unclosed",
            "https://x.com/",
        );
        assert_eq!(doc.by_tag("td").len(), 2);
        assert!(doc.by_text("1.234,56").is_some());
    }

    #[test]
    fn empty_body_is_an_error_but_empty_document_queries_miss() {
        let url = Url::parse("https://x.com/").unwrap();
        assert!(matches!(
            Document::parse("  \n", url.clone()),
            Err(BrowserError::EmptyDocument)
        ));
        let doc = Document::empty(url);
        assert!(doc.by_id("x").is_none());
        assert!(doc.clickable("Login").is_none());
        assert!(doc.title().is_none());
    }

    #[test]
    fn lookups_return_first_match_or_none() {
        let doc = parse(
            r#"<input name="user" id="first" value="a"><input name="user" id="second" value="b">
               <div class="x y" id="c1"></div><div class="y" id="c2"></div>"#,
            "https://x.com/",
        );
        assert_eq!(doc.by_name("user").and_then(|e| e.id()), Some("first"));
        assert_eq!(doc.by_classes(&["y"]).and_then(|e| e.id()), Some("c1"));
        assert!(doc.by_id("missing").is_none());
        assert!(doc.by_name("missing").is_none());
        assert_eq!(doc.form_field_values().get("user").map(String::as_str), Some("b"));
    }

    #[test]
    fn text_containing_query_syntax_is_matched_literally() {
        let doc = parse(
            r#"<a href="/x" id="l">Weiter ']" or 1=1 [</a>"#,
            "https://x.com/",
        );
        match doc.clickable("Weiter ']\" or 1=1 [") {
            Some(Clickable::Link(a)) => assert_eq!(a.id(), Some("l")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn clickable_prefers_submit_then_link_then_text() {
        let doc = parse(
            r#"<a href="/a" id="link">Weiter</a>
               <form><input type="submit" id="btn" value="Weiter"></form>
               <a href="/nested" id="outer"><span>Umsätze</span> <img></a>
               <p>Hilfe</p>"#,
            "https://x.com/",
        );
        assert!(matches!(doc.clickable("Weiter"), Some(Clickable::Submit(b)) if b.id() == Some("btn")));
        assert!(matches!(doc.clickable("Umsätze"), Some(Clickable::Link(a)) if a.id() == Some("outer")));
        assert!(doc.clickable("Hilfe").is_none());
        assert!(doc.clickable("Nirgends").is_none());
    }

    #[test]
    fn repeated_heading_text_does_not_hide_the_link() {
        let doc = parse(
            r#"<h2>Kontoumsätze</h2>
               <a href="/u" id="nav"><img alt=""><span>Kontoumsätze</span><small>neu</small></a>"#,
            "https://x.com/",
        );
        assert!(matches!(doc.clickable("Kontoumsätze"), Some(Clickable::Link(a)) if a.id() == Some("nav")));
    }

    #[test]
    fn formless_button_falls_through_to_the_link() {
        let doc = parse(
            r#"<button onclick="x()">Weiter</button><a href="/next" id="next">Weiter</a>"#,
            "https://x.com/",
        );
        assert!(matches!(doc.clickable("Weiter"), Some(Clickable::Link(a)) if a.id() == Some("next")));
        // still reachable through the plain query
        assert!(doc.submit_by_value("Weiter").is_some());
    }

    #[test]
    fn overrides_require_an_existing_control() {
        let mut doc = parse(r#"<form><input name="pin"><select name="acct"></select></form>"#, "https://x.com/");
        assert!(doc.set_value("pin", "12345").is_ok());
        assert!(doc.set_value("acct", "2").is_ok());
        assert!(matches!(
            doc.set_value("tan", "1"),
            Err(BrowserError::ElementNotFound(_))
        ));
        assert_eq!(doc.value_override("pin"), Some("12345"));
        assert_eq!(doc.form_field_values().get("pin").map(String::as_str), Some("12345"));
    }
}
