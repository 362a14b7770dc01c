//! Turns a lenient [`ResumeInput`] into the flat, escaped record the templates consume.

use std::fmt;

use askama_escape::{escape, Escaped, Html};

use crate::models::ResumeInput;

/// Numeric id selecting a template skin (`template{id}.html`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TemplateId(u32);

impl TemplateId {
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn get(self) -> u32 {
        self.0
    }

    pub fn file_name(self) -> String {
        format!("template{}.html", self.0)
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Per-template styling decisions that are made server side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyleVariant {
    pub skill_class: &'static str,
}

const DEFAULT_VARIANT: StyleVariant = StyleVariant { skill_class: "skill-badge" };

const STYLE_VARIANTS: &[(TemplateId, StyleVariant)] = &[
    (TemplateId::new(1), StyleVariant { skill_class: "skill-chip" }),
    (TemplateId::new(2), StyleVariant { skill_class: "skill-tag" }),
];

impl StyleVariant {
    /// Ids without an entry share the default variant.
    pub fn for_template(id: TemplateId) -> Self {
        STYLE_VARIANTS
            .iter()
            .find(|(tid, _)| *tid == id)
            .map(|(_, variant)| *variant)
            .unwrap_or(DEFAULT_VARIANT)
    }
}

/// HTML fragment that is already escaped and must be inserted verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Markup(String);

impl Markup {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Markup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn esc(raw: &str) -> Escaped<'_, Html> {
    escape(raw, Html)
}

/// Flat, request-scoped view of one resume for one template.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedRecord {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub summary: String,
    pub skills: Markup,
    pub education: Markup,
    pub projects: Markup,
    pub certificates: Markup,
}

/// Builds the record for `template`. Pure: no I/O, never fails, input untouched.
pub fn normalize(input: &ResumeInput, template: TemplateId) -> NormalizedRecord {
    let variant = StyleVariant::for_template(template);

    NormalizedRecord {
        name: input.personal.full_name.clone(),
        email: input.personal.email.clone(),
        phone: input.personal.phone.clone(),
        location: input.personal.location.clone(),
        summary: input.summary.clone(),
        skills: fragments(&input.skills, |skill| {
            format!("<span class=\"{}\">{}</span>", variant.skill_class, esc(skill))
        }),
        education: fragments(&input.education, |e| {
            format!("<li>{} - {} ({})</li>", esc(&e.school), esc(&e.degree), esc(&e.year))
        }),
        projects: fragments(&input.projects, |p| {
            format!("<li><strong>{}</strong>: {}</li>", esc(&p.title), esc(&p.description))
        }),
        certificates: fragments(&input.certificates, |c| {
            format!("<li>{} - {} ({})</li>", esc(&c.name), esc(&c.issuer), esc(&c.date))
        }),
    }
}

fn fragments<T>(items: &[T], line: impl Fn(&T) -> String) -> Markup {
    Markup(items.iter().map(line).collect())
}
