//! Turns `validator` failures into one human-readable message.
//!
//! Only the first violation is reported: fields are visited in the order the
//! request type declares them in its label table, and within a field a
//! `required` failure wins over anything else.

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use validator::{ValidationError, ValidationErrors, ValidationErrorsKind};

use crate::infrastructure::settings::Locale;

/// Display metadata for one request field.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FieldLabel {
    /// Serialized field name, as reported by `validator`.
    pub(crate) name: &'static str,
    pub(crate) labels: &'static [(Locale, &'static str)],
    /// Field this one must equal, named in `must_match` messages.
    pub(crate) matches: Option<&'static str>,
}

impl FieldLabel {
    pub(crate) const fn plain(name: &'static str) -> Self {
        Self {
            name,
            labels: &[],
            matches: None,
        }
    }

    pub(crate) const fn labeled(
        name: &'static str,
        labels: &'static [(Locale, &'static str)],
    ) -> Self {
        Self {
            name,
            labels,
            matches: None,
        }
    }

    pub(crate) const fn matching(self, other: &'static str) -> Self {
        Self {
            matches: Some(other),
            ..self
        }
    }

    fn resolve(&self, locale: Locale) -> String {
        self.labels
            .iter()
            .find(|(l, _)| *l == locale)
            .map(|(_, label)| (*label).to_string())
            .unwrap_or_else(|| title_case(self.name))
    }
}

/// Request types list their fields here, in declaration order.
pub(crate) trait LabeledFields {
    const FIELD_LABELS: &'static [FieldLabel];
}

pub(crate) fn invalid_request_message(locale: Locale) -> &'static str {
    match locale {
        Locale::En => "invalid request parameters",
        Locale::Zh => "请求参数无效",
    }
}

/// Custom `required` rule for string fields.
pub(crate) fn required(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("required"));
    }
    Ok(())
}

/// Deserializes a string with surrounding whitespace removed, so length rules
/// see the value that gets stored.
pub(crate) fn trimmed<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = String::deserialize(deserializer)?;
    Ok(value.trim().to_owned())
}

pub(crate) fn format_validation_errors(
    errors: &ValidationErrors,
    fields: &[FieldLabel],
    locale: Locale,
) -> String {
    let field_errors = |name: &str| match errors.errors().get(name) {
        Some(ValidationErrorsKind::Field(errs)) if !errs.is_empty() => Some(errs),
        _ => None,
    };

    for field in fields {
        if let Some(errs) = field_errors(field.name) {
            return format_field_error(
                &field.resolve(locale),
                pick_error(errs),
                field.matches,
                fields,
                locale,
            );
        }
    }

    // fields without label metadata fall back to their raw identifier
    let mut unlabeled: Vec<&str> = errors
        .errors()
        .keys()
        .map(|name| &**name)
        .filter(|name| fields.iter().all(|f| f.name != *name))
        .collect();
    unlabeled.sort_unstable();

    unlabeled
        .into_iter()
        .find_map(|name| {
            field_errors(name)
                .map(|errs| format_field_error(name, pick_error(errs), None, fields, locale))
        })
        .unwrap_or_else(|| invalid_request_message(locale).to_string())
}

fn pick_error(errs: &[ValidationError]) -> &ValidationError {
    errs.iter()
        .find(|e| e.code == "required")
        .unwrap_or(&errs[0])
}

fn format_field_error(
    label: &str,
    err: &ValidationError,
    matches: Option<&str>,
    fields: &[FieldLabel],
    locale: Locale,
) -> String {
    match err.code.as_ref() {
        "required" => match locale {
            Locale::En => format!("{label} must not be empty"),
            Locale::Zh => format!("{label} 不能为空"),
        },
        "email" => match locale {
            Locale::En => format!("{label} format invalid"),
            Locale::Zh => format!("{label} 格式不正确"),
        },
        "length" => format_length_error(label, err, locale),
        "must_match" => {
            let other = matches.map(|name| {
                fields
                    .iter()
                    .find(|f| f.name == name)
                    .map(|f| f.resolve(locale))
                    .unwrap_or_else(|| name.to_string())
            });
            match (locale, other) {
                (Locale::En, Some(other)) => format!("{label} does not match {other}"),
                (Locale::Zh, Some(other)) => format!("{label} 与 {other} 不一致"),
                (Locale::En, None) => format!("{label} does not match"),
                (Locale::Zh, None) => format!("{label} 不一致"),
            }
        }
        _ => generic_failure(label, locale),
    }
}

fn format_length_error(label: &str, err: &ValidationError, locale: Locale) -> String {
    let min = param_u64(err, "min");
    let max = param_u64(err, "max");
    let actual = err
        .params
        .get("value")
        .and_then(Value::as_str)
        .map(|value| value.chars().count() as u64);

    let too_short = match (min, actual) {
        (Some(min), Some(actual)) => actual < min,
        (Some(_), None) => max.is_none(),
        _ => false,
    };

    match (too_short, min, max) {
        (true, Some(min), _) | (false, Some(min), None) => match locale {
            Locale::En => format!("{label} length must be at least {min}"),
            Locale::Zh => format!("{label} 长度不能少于 {min} 位"),
        },
        (_, _, Some(max)) => match locale {
            Locale::En => format!("{label} length must be at most {max}"),
            Locale::Zh => format!("{label} 长度不能超过 {max} 位"),
        },
        _ => generic_failure(label, locale),
    }
}

fn generic_failure(label: &str, locale: Locale) -> String {
    match locale {
        Locale::En => format!("{label} validation failed"),
        Locale::Zh => format!("{label} 参数校验失败"),
    }
}

fn param_u64(err: &ValidationError, key: &str) -> Option<u64> {
    err.params.get(key).and_then(Value::as_u64)
}

fn title_case(name: &str) -> String {
    name.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
