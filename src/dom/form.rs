use crate::dom::document::is_form_control;
use crate::dom::element::normalize_whitespace;
use crate::dom::{Document, Element};
use crate::types::Method;
use url::Url;

/// A form ready to be sent: resolved target, method and encoded fields.
#[derive(Debug, Clone, PartialEq)]
pub struct FormSubmission {
    pub method: Method,
    pub url: Url,
    pub fields: Vec<(String, String)>,
}

impl FormSubmission {
    /// For GET forms the fields are merged into the target's query string,
    /// replacing parameters of the same name.
    pub fn into_request(self) -> (Method, Url, Vec<(String, String)>) {
        match self.method {
            Method::Post => (Method::Post, self.url, self.fields),
            Method::Get => {
                let mut url = self.url;
                let kept: Vec<(String, String)> = url
                    .query_pairs()
                    .filter(|(k, _)| !self.fields.iter().any(|(name, _)| name == k))
                    .map(|(k, v)| (k.into_owned(), v.into_owned()))
                    .collect();
                url.set_query(None);
                if !kept.is_empty() || !self.fields.is_empty() {
                    url.query_pairs_mut()
                        .extend_pairs(kept.iter().chain(self.fields.iter()));
                }
                (Method::Get, url, Vec::new())
            }
        }
    }
}

/// Insert or replace, keeping the position of the first occurrence.
fn upsert(fields: &mut Vec<(String, String)>, name: &str, value: String) {
    match fields.iter_mut().find(|(n, _)| n == name) {
        Some(slot) => slot.1 = value,
        None => fields.push((name.to_string(), value)),
    }
}

impl Document {
    /// The form a control belongs to: its `form="id"` owner, else the
    /// enclosing `<form>`.
    pub fn owning_form<'a>(&'a self, control: &Element<'a>) -> Option<Element<'a>> {
        if let Some(form_id) = control.raw_attribute("form") {
            return self.by_id(form_id).filter(|f| f.is("form"));
        }
        control.closest_ancestor("form")
    }

    /// Controls associated with `form`, in document order.
    ///
    /// Legacy pages often open a `<form>` inside a table, which the parser
    /// closes immediately. When such a form ends up empty, the controls
    /// following it up to the next form are taken as its fields.
    pub fn form_controls<'a>(&'a self, form: &Element<'a>) -> Vec<Element<'a>> {
        let form_id = form.id();
        let owned: Vec<Element<'a>> = self
            .elements()
            .filter(is_form_control)
            .filter(|el| match el.raw_attribute("form") {
                Some(owner) => form_id == Some(owner),
                None => el.closest_ancestor("form").as_ref() == Some(form),
            })
            .collect();
        let closed_by_table = form
            .parent()
            .map(|p| matches!(p.tag_name(), "table" | "thead" | "tbody" | "tfoot" | "tr"))
            .unwrap_or(false);
        if !owned.is_empty() || !closed_by_table {
            return owned;
        }

        let mut after_form = false;
        let mut trailing = Vec::new();
        for el in self.elements() {
            if el.is("form") {
                if after_form {
                    break;
                }
                after_form = el == *form;
                continue;
            }
            if after_form
                && is_form_control(&el)
                && el.raw_attribute("form").is_none()
                && el.closest_ancestor("form").is_none()
            {
                trailing.push(el);
            }
        }
        trailing
    }

    /// Name/value pairs `form` would submit, `enter` overrides applied.
    /// Submit controls never contribute here; see [`Document::submission`].
    pub fn form_fields(&self, form: &Element<'_>) -> Vec<(String, String)> {
        let mut fields = Vec::new();
        for control in self.form_controls(form) {
            let Some(name) = control.name() else {
                continue;
            };
            if control.is_disabled() || control.is("button") {
                continue;
            }
            if let Some(value) = self.value_override(name) {
                if !is_excluded_input(&control) {
                    upsert(&mut fields, name, value.to_string());
                }
                continue;
            }
            match control.tag_name() {
                "input" => {
                    if let Some(value) = input_value(&control) {
                        upsert(&mut fields, name, value);
                    }
                }
                "select" => {
                    for value in selected_values(&control) {
                        upsert(&mut fields, name, value);
                    }
                }
                "textarea" => {
                    let text = control.raw_text();
                    let text = text.strip_prefix('\n').unwrap_or(&text);
                    upsert(&mut fields, name, text.to_string());
                }
                _ => {}
            }
        }
        fields
    }

    /// Materialize the submission triggered by clicking `submit`.
    pub fn submission(&self, submit: &Element<'_>) -> Option<FormSubmission> {
        let form = self.owning_form(submit)?;

        let action = submit
            .raw_attribute("formaction")
            .or_else(|| form.raw_attribute("action"))
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .and_then(|a| self.base_url().join(a).ok())
            .unwrap_or_else(|| self.url().clone());

        let method = submit
            .raw_attribute("formmethod")
            .or_else(|| form.raw_attribute("method"))
            .map(Method::from_form_attribute)
            .unwrap_or(Method::Get);

        let mut fields = self.form_fields(&form);
        if let Some(name) = submit.name() {
            let value = match submit.tag_name() {
                "input" => submit.raw_attribute("value").unwrap_or("Submit").to_string(),
                _ => submit.raw_attribute("value").unwrap_or_default().to_string(),
            };
            upsert(&mut fields, name, value);
        }

        Some(FormSubmission {
            method,
            url: action,
            fields,
        })
    }
}

fn input_type(input: &Element<'_>) -> String {
    input
        .raw_attribute("type")
        .unwrap_or("text")
        .trim()
        .to_ascii_lowercase()
}

fn is_excluded_input(control: &Element<'_>) -> bool {
    control.is("input")
        && matches!(
            input_type(control).as_str(),
            "submit" | "button" | "image" | "reset" | "file"
        )
}

fn input_value(input: &Element<'_>) -> Option<String> {
    if is_excluded_input(input) {
        return None;
    }
    match input_type(input).as_str() {
        "checkbox" | "radio" => {
            if input.has_attribute("checked") {
                Some(input.raw_attribute("value").unwrap_or("on").to_string())
            } else {
                None
            }
        }
        _ => Some(input.raw_attribute("value").unwrap_or_default().to_string()),
    }
}

fn option_value(option: &Element<'_>) -> String {
    option
        .raw_attribute("value")
        .map(str::to_string)
        .unwrap_or_else(|| normalize_whitespace(&option.raw_text()))
}

fn selected_values(select: &Element<'_>) -> Vec<String> {
    let options: Vec<Element<'_>> = select
        .descendants_by_tag("option")
        .into_iter()
        .filter(|o| !o.is_disabled())
        .collect();
    let selected: Vec<&Element<'_>> = options.iter().filter(|o| o.has_attribute("selected")).collect();

    if select.has_attribute("multiple") {
        return selected.into_iter().map(option_value).collect();
    }
    // Single select: the last `selected` wins, the first option is the fallback
    selected
        .last()
        .copied()
        .or_else(|| options.first())
        .map(option_value)
        .into_iter()
        .collect()
}
