//! Form field definitions and schemas.

use std::collections::BTreeMap;
use std::str::FromStr;

use crate::error::{ErrorState, FieldError, FormError, Result};
use crate::validation::{
    validate_form_data, EmailValidator, MaxLengthValidator, PhoneValidator, UrlValidator, ValidationResult,
    Validator,
};

/// Current value per field name.
pub type FormState = BTreeMap<String, String>;

/// The kind of input a field collects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldKind {
    /// Single-line free text.
    #[default]
    Text,
    /// Email address.
    Email,
    /// Phone number.
    Phone,
    /// Absolute URL.
    Url,
    /// Multi-line free text.
    Textarea,
}

impl FieldKind {
    /// Returns the HTML input type used to render this kind.
    pub fn input_type(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Email => "email",
            Self::Phone => "tel",
            Self::Url => "url",
            Self::Textarea => "textarea",
        }
    }

    /// Returns the format validator for this kind.
    fn format_validator(self) -> Option<Box<dyn Validator>> {
        match self {
            Self::Email => Some(Box::new(EmailValidator::new())),
            Self::Phone => Some(Box::new(PhoneValidator::new())),
            Self::Url => Some(Box::new(UrlValidator::new())),
            Self::Text | Self::Textarea => None,
        }
    }
}

impl FromStr for FieldKind {
    type Err = FormError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "email" => Ok(Self::Email),
            "phone" | "tel" => Ok(Self::Phone),
            "url" => Ok(Self::Url),
            "textarea" => Ok(Self::Textarea),
            other => Err(FormError::UnknownFieldKind(other.to_string())),
        }
    }
}

/// Definition of a form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
    /// Field name.
    pub name: String,
    /// Field label.
    pub label: String,
    /// What the field collects.
    pub kind: FieldKind,
    /// Whether the field is required.
    pub required: bool,
    /// Placeholder text.
    pub placeholder: Option<String>,
    /// Maximum length in characters.
    pub max_length: Option<usize>,
}

impl FieldDef {
    /// Creates a new, optional field definition.
    pub fn new(name: impl Into<String>, label: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            kind,
            required: false,
            placeholder: None,
            max_length: None,
        }
    }

    /// Makes the field required.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Sets placeholder text.
    #[must_use]
    pub fn placeholder(mut self, text: impl Into<String>) -> Self {
        self.placeholder = Some(text.into());
        self
    }

    /// Sets the maximum length.
    #[must_use]
    pub fn max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }

    /// Checks a non-empty value against the field's format and length rules.
    fn check(&self, value: &str) -> Option<FieldError> {
        let mut validators: Vec<Box<dyn Validator>> = Vec::new();
        validators.extend(self.kind.format_validator());
        if let Some(max) = self.max_length {
            validators.push(Box::new(MaxLengthValidator::new(max)));
        }

        validators
            .iter()
            .find_map(|v| v.validate(value).err())
            .map(|message| FieldError::invalid_format(&self.name, message))
    }
}

/// An ordered set of field definitions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormSchema {
    fields: Vec<FieldDef>,
}

impl FormSchema {
    /// Creates an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// The portfolio contact form: name, email and message, all required.
    pub fn contact() -> Self {
        Self::new()
            .field(
                FieldDef::new("name", "Name", FieldKind::Text)
                    .required()
                    .placeholder("Your name"),
            )
            .field(
                FieldDef::new("email", "Email", FieldKind::Email)
                    .required()
                    .placeholder("you@example.com"),
            )
            .field(
                FieldDef::new("message", "Message", FieldKind::Textarea)
                    .required()
                    .placeholder("Tell me what you're building..."),
            )
    }

    /// Adds a field to the schema.
    #[must_use]
    pub fn field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }

    /// Returns the field definitions in declaration order.
    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    /// Looks up a field by name.
    pub fn get(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Returns the names of all required fields.
    pub fn required_fields(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|f| f.required)
            .map(|f| f.name.as_str())
            .collect()
    }

    /// Validates `data` against the schema.
    ///
    /// Required and email checks run first, as in [`validate_form_data`].
    /// Fields still without an error then get their format and length
    /// rules applied to any non-empty value.
    pub fn validate(&self, data: &FormState) -> ValidationResult {
        let required = self.required_fields();
        let base = validate_form_data(data, required.as_slice());
        let mut errors: ErrorState = base.errors;

        for field in &self.fields {
            if errors.contains(&field.name) {
                continue;
            }
            let Some(value) = data.get(&field.name).filter(|v| !v.is_empty()) else {
                continue;
            };
            if let Some(error) = field.check(value) {
                errors.record(&error);
            }
        }

        ValidationResult {
            is_valid: errors.is_empty(),
            errors,
        }
    }
}

/// Parses a `key=value` assignment into its parts.
///
/// # Errors
///
/// Returns [`FormError::ParseError`] when there is no `=` or the key is empty.
pub fn parse_assignment(input: &str) -> Result<(String, String)> {
    match input.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(FormError::ParseError(input.to_string())),
    }
}
