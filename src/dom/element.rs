use crate::dom::Document;
use scraper::ElementRef;
use std::collections::HashMap;

/// Collapse every whitespace run (including `&nbsp;`) into one space and trim.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Borrowed view of one element of a [`Document`].
#[derive(Debug, Clone, Copy)]
pub struct Element<'a> {
    node: ElementRef<'a>,
    document: &'a Document,
}

impl<'a> Element<'a> {
    pub(crate) fn new(node: ElementRef<'a>, document: &'a Document) -> Self {
        Self { node, document }
    }

    pub(crate) fn node(&self) -> ElementRef<'a> {
        self.node
    }

    pub fn tag_name(&self) -> &'a str {
        self.node.value().name()
    }

    pub fn is(&self, tag_name: &str) -> bool {
        self.tag_name().eq_ignore_ascii_case(tag_name)
    }

    /// Attribute value; `a[href]` and `form[action]` come back absolutized.
    pub fn attribute(&self, name: &str) -> Option<String> {
        let raw = self.raw_attribute(name)?;
        let absolutize = (self.is("a") && name.eq_ignore_ascii_case("href"))
            || (self.is("form") && name.eq_ignore_ascii_case("action"));

        if absolutize {
            Some(self.document.absolutize(raw))
        } else {
            Some(raw.to_string())
        }
    }

    /// Attribute value exactly as written in the markup.
    pub fn raw_attribute(&self, name: &str) -> Option<&'a str> {
        self.node.value().attr(name)
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.raw_attribute(name).is_some()
    }

    pub fn attributes(&self) -> HashMap<String, String> {
        self.node
            .value()
            .attrs()
            .map(|(name, _)| {
                let value = self.attribute(name).unwrap_or_default();
                (name.to_string(), value)
            })
            .collect()
    }

    pub fn id(&self) -> Option<&'a str> {
        self.raw_attribute("id")
    }

    pub fn name(&self) -> Option<&'a str> {
        self.raw_attribute("name")
    }

    /// True when every token in `classes` is one of this element's class tokens.
    pub fn has_classes(&self, classes: &[&str]) -> bool {
        let own: Vec<&str> = self
            .raw_attribute("class")
            .map(|c| c.split_whitespace().collect())
            .unwrap_or_default();
        !classes.is_empty() && classes.iter().all(|wanted| own.contains(wanted))
    }

    /// Text content with whitespace normalized.
    pub fn text(&self) -> String {
        normalize_whitespace(&self.raw_text())
    }

    pub fn raw_text(&self) -> String {
        self.node.text().collect()
    }

    pub fn closest_ancestor(&self, tag_name: &str) -> Option<Element<'a>> {
        self.node
            .ancestors()
            .filter_map(ElementRef::wrap)
            .find(|el| el.value().name().eq_ignore_ascii_case(tag_name))
            .map(|el| Element::new(el, self.document))
    }

    pub fn parent(&self) -> Option<Element<'a>> {
        self.node
            .parent()
            .and_then(ElementRef::wrap)
            .map(|el| Element::new(el, self.document))
    }

    pub fn children_by_tag(&self, tag_name: &str) -> Vec<Element<'a>> {
        self.node
            .children()
            .filter_map(ElementRef::wrap)
            .filter(|el| el.value().name().eq_ignore_ascii_case(tag_name))
            .map(|el| Element::new(el, self.document))
            .collect()
    }

    pub fn descendants_by_tag(&self, tag_name: &str) -> Vec<Element<'a>> {
        self.node
            .descendants()
            .skip(1)
            .filter_map(ElementRef::wrap)
            .filter(|el| el.value().name().eq_ignore_ascii_case(tag_name))
            .map(|el| Element::new(el, self.document))
            .collect()
    }

    /// Normalized text of the direct `td`/`th` children of a table row.
    pub fn cells(&self) -> Vec<String> {
        self.node
            .children()
            .filter_map(ElementRef::wrap)
            .filter(|el| matches!(el.value().name(), "td" | "th"))
            .map(|el| Element::new(el, self.document).text())
            .collect()
    }

    /// `input[type=submit]`, or a `button` whose type is submit (the default).
    pub fn is_submit(&self) -> bool {
        match self.tag_name() {
            "input" => self
                .raw_attribute("type")
                .map(|t| t.eq_ignore_ascii_case("submit"))
                .unwrap_or(false),
            "button" => self
                .raw_attribute("type")
                .map(|t| t.eq_ignore_ascii_case("submit"))
                .unwrap_or(true),
            _ => false,
        }
    }

    /// What a user sees on a submit control.
    pub fn submit_label(&self) -> Option<String> {
        if !self.is_submit() {
            return None;
        }
        match self.tag_name() {
            "input" => Some(normalize_whitespace(self.raw_attribute("value").unwrap_or("Submit"))),
            _ => Some(self.text()),
        }
    }

    pub fn is_disabled(&self) -> bool {
        self.has_attribute("disabled")
    }
}

impl PartialEq for Element<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.node.id() == other.node.id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn document(html: &str) -> Document {
        Document::parse(html, Url::parse("https://bank.example/app/start").unwrap()).unwrap()
    }

    #[test]
    fn whitespace_is_collapsed() {
        assert_eq!(normalize_whitespace("  Konto\n\t Umsätze\u{a0} "), "Konto Umsätze");
    }

    #[test]
    fn class_tokens_match_whole_words() {
        let doc = document(r#"<div id="a" class="row  highlighted odd">x</div>"#);
        let el = doc.by_id("a").unwrap();
        assert!(el.has_classes(&["row"]));
        assert!(el.has_classes(&["odd", "row"]));
        assert!(!el.has_classes(&["high"]));
        assert!(!el.has_classes(&[]));
    }

    #[test]
    fn table_row_cells() {
        let doc = document(
            "<table><tr id=r><td> 01.03.2024 </td><th>Miete</th><td>-750,00</td></tr></table>",
        );
        let row = doc.by_id("r").unwrap();
        assert_eq!(row.cells(), vec!["01.03.2024", "Miete", "-750,00"]);
    }

    #[test]
    fn closest_ancestor_walks_up() {
        let doc = document(r#"<form id="f"><div><span id="s">x</span></div></form>"#);
        let span = doc.by_id("s").unwrap();
        assert_eq!(span.closest_ancestor("form").and_then(|f| f.id()), Some("f"));
        assert!(span.closest_ancestor("table").is_none());
    }

    #[test]
    fn submit_labels() {
        let doc = document(
            r#"<form>
                 <input id="i" type="SUBMIT" value=" Weiter ">
                 <button id="b"><b>Anmelden</b></button>
                 <button id="r" type="reset">Reset</button>
               </form>"#,
        );
        assert_eq!(doc.by_id("i").unwrap().submit_label().as_deref(), Some("Weiter"));
        assert_eq!(doc.by_id("b").unwrap().submit_label().as_deref(), Some("Anmelden"));
        assert_eq!(doc.by_id("r").unwrap().submit_label(), None);
    }
}
