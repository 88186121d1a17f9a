//! Field extraction and filename assembly driven by document templates.

pub mod filename;

use regex::{Regex, RegexBuilder};

use crate::config::schema::{Config, DocumentTemplate, FieldTransform, NamePart, NamingOptions};

pub use filename::{clean_filename, fallback_name, UniqueNames};

/// Compiled template set. Built once per run and shared by every file.
pub struct FieldParser {
    templates: Vec<CompiledTemplate>,
}

struct CompiledTemplate {
    name: String,
    patterns: Vec<String>,
    fields: Vec<CompiledField>,
    parts: Vec<NamePart>,
    format: Option<String>,
}

struct CompiledField {
    name: String,
    regex: Regex,
}

impl CompiledTemplate {
    fn field(&self, name: &str) -> Option<&CompiledField> {
        self.fields.iter().find(|f| f.name == name)
    }
}

impl FieldParser {
    pub fn new(templates: &[DocumentTemplate]) -> Self {
        let templates = templates
            .iter()
            .map(|template| CompiledTemplate {
                name: template.name.clone(),
                patterns: template.patterns.clone(),
                fields: template
                    .fields
                    .iter()
                    .filter_map(|(name, pattern)| match compile_field(pattern) {
                        Ok(regex) => Some(CompiledField {
                            name: name.clone(),
                            regex,
                        }),
                        Err(e) => {
                            log::warn!(
                                "Skipping field '{}' of template '{}': {}",
                                name,
                                template.name,
                                e
                            );
                            None
                        }
                    })
                    .collect(),
                parts: template.parts.clone(),
                format: template.format.clone(),
            })
            .collect();

        Self { templates }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.effective_templates())
    }

    pub fn template_names(&self) -> impl Iterator<Item = &str> {
        self.templates.iter().map(|t| t.name.as_str())
    }

    pub fn has_template(&self, doc_type: &str) -> bool {
        self.template(doc_type).is_some()
    }

    /// Naming pattern tags offered by a template.
    pub fn patterns(&self, doc_type: &str) -> Option<&[String]> {
        self.template(doc_type).map(|t| t.patterns.as_slice())
    }

    fn template(&self, doc_type: &str) -> Option<&CompiledTemplate> {
        self.templates.iter().find(|t| t.name == doc_type)
    }

    /// Extracts a single field. `None` when the template or field is unknown
    /// or the pattern does not match.
    pub fn extract_field(&self, text: &str, doc_type: &str, field: &str) -> Option<String> {
        let template = self.template(doc_type)?;
        capture_value(template.field(field)?, text)
    }

    /// Builds the new filename stem (no extension) for a document.
    ///
    /// Returns `None` for an unknown document type or when no field could be
    /// extracted; prefix and suffix alone never make a name.
    pub fn generate_filename(
        &self,
        text: &str,
        doc_type: &str,
        pattern: &str,
        naming: &NamingOptions,
    ) -> Option<String> {
        let template = self.template(doc_type)?;
        let separator = naming.separator.as_str();

        let field_parts = match &template.format {
            Some(format) => render_format(template, format, text).into_iter().collect(),
            None => render_parts(template, pattern, separator, text),
        };

        if field_parts.is_empty() {
            return None;
        }

        let mut parts = Vec::with_capacity(field_parts.len() + 2);
        if !naming.prefix.is_empty() {
            parts.push(naming.prefix.clone());
        }
        parts.extend(field_parts);
        if !naming.suffix.is_empty() {
            parts.push(naming.suffix.clone());
        }

        let name = clean_filename(&parts.join(separator));
        if name.is_empty() {
            None
        } else {
            Some(name)
        }
    }
}

fn compile_field(pattern: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .multi_line(true)
        .build()
}

/// The named group matching the field name wins over group 1.
fn capture_value(field: &CompiledField, text: &str) -> Option<String> {
    let caps = field.regex.captures(text)?;
    let matched = caps.name(&field.name).or_else(|| caps.get(1))?;
    let value = matched.as_str().trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn render_parts(
    template: &CompiledTemplate,
    pattern: &str,
    separator: &str,
    text: &str,
) -> Vec<String> {
    let mut rendered = Vec::new();

    for part in &template.parts {
        if let Some(token) = &part.when_pattern_contains {
            if !pattern.contains(token.as_str()) {
                continue;
            }
        }

        let Some(value) = template.field(&part.field).and_then(|f| capture_value(f, text))
        else {
            continue;
        };

        let value = match part.max_chars {
            Some(max) => value.chars().take(max).collect::<String>().trim().to_string(),
            None => value,
        };
        let value = match part.transform {
            Some(transform) => apply_transform(&value, transform),
            None => value,
        };

        match &part.label {
            Some(label) => rendered.push(format!("{}{}{}", label, separator, value)),
            None => rendered.push(value),
        }
    }

    rendered
}

/// Substitutes `{field}` placeholders. `None` unless at least one field matched.
fn render_format(template: &CompiledTemplate, format: &str, text: &str) -> Option<String> {
    let mut result = format.to_string();
    let mut matched_any = false;

    for field in &template.fields {
        let placeholder = format!("{{{}}}", field.name);
        if !result.contains(&placeholder) {
            continue;
        }
        let value = capture_value(field, text);
        matched_any |= value.is_some();
        result = result.replace(&placeholder, value.as_deref().unwrap_or(""));
    }

    if matched_any && !result.trim().is_empty() {
        Some(result)
    } else {
        None
    }
}

fn apply_transform(value: &str, transform: FieldTransform) -> String {
    match transform {
        FieldTransform::DateDashes => value.replace('/', "-"),
        FieldTransform::Currency => format!("R${}", value.replace('.', "").replace(',', ".")),
        FieldTransform::Uppercase => value.to_uppercase(),
        FieldTransform::Lowercase => value.to_lowercase(),
    }
}
