use crate::dom::Document;
use serde::{Deserialize, Serialize};

/// Snapshot of what a page offers to a script: its links and forms.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageSummary {
    pub url: String,
    pub title: String,
    pub links: Vec<LinkSummary>,
    pub forms: Vec<FormSummary>,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkSummary {
    pub text: String,
    pub href: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormSummary {
    pub id: Option<String>,
    pub name: Option<String>,
    pub method: String,
    pub action: String,
    pub fields: Vec<(String, String)>,
    pub submits: Vec<String>,
}

impl PageSummary {
    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn find_form(&self, id_or_name: &str) -> Option<&FormSummary> {
        self.forms.iter().find(|f| {
            f.id.as_deref() == Some(id_or_name) || f.name.as_deref() == Some(id_or_name)
        })
    }
}

impl Document {
    pub fn summary(&self) -> PageSummary {
        let links = self
            .links()
            .into_iter()
            .map(|a| LinkSummary {
                text: a.text(),
                href: a.attribute("href").unwrap_or_default(),
            })
            .collect();

        let forms = self
            .forms()
            .into_iter()
            .map(|form| {
                let submits = self
                    .form_controls(&form)
                    .iter()
                    .filter_map(|c| c.submit_label())
                    .collect();
                FormSummary {
                    id: form.id().map(str::to_string),
                    name: form.name().map(str::to_string),
                    method: form
                        .raw_attribute("method")
                        .unwrap_or("get")
                        .to_ascii_uppercase(),
                    action: form
                        .attribute("action")
                        .unwrap_or_else(|| self.url().to_string()),
                    fields: self.form_fields(&form),
                    submits,
                }
            })
            .collect();

        PageSummary {
            url: self.url().to_string(),
            title: self.title().unwrap_or_default(),
            links,
            forms,
            timestamp: chrono::Utc::now(),
        }
    }
}
