//! Input validation shared by catalog operations.

use crate::error::{ApiError, ApiResult};

/// Trimmed, non-empty text or a validation error mentioning `field`.
pub fn required<'a>(field: &str, value: &'a str) -> ApiResult<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        Err(ApiError::validation(format!("{field} is required")))
    } else {
        Ok(value)
    }
}

/// Like [`required`], for optional patch fields.
pub fn optional<'a>(field: &str, value: Option<&'a str>) -> ApiResult<Option<&'a str>> {
    value.map(|v| required(field, v)).transpose()
}

pub fn price(value: Option<f64>) -> ApiResult<Option<f64>> {
    match value {
        Some(p) if !p.is_finite() || p < 0.0 => {
            Err(ApiError::validation("Price must be a non-negative number"))
        }
        other => Ok(other),
    }
}

/// Attachment name: the given one, else the last path segment of the URL.
pub fn attachment_name<'a>(name: Option<&'a str>, url: &'a str) -> ApiResult<&'a str> {
    if let Some(name) = name.map(str::trim).filter(|n| !n.is_empty()) {
        return Ok(name);
    }
    let derived = url
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .map(|segment| segment.split(['?', '#']).next().unwrap_or(segment))
        .unwrap_or_default();
    required("Attachment name", derived)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_is_rejected() {
        assert!(required("Title", "  ").is_err());
        assert_eq!(required("Title", " Intro ").unwrap(), "Intro");
    }

    #[test]
    fn optional_passes_none_through() {
        assert_eq!(optional("Title", None).unwrap(), None);
        assert!(optional("Title", Some("")).is_err());
    }

    #[test]
    fn negative_price_is_rejected() {
        assert!(price(Some(-1.0)).is_err());
        assert!(price(Some(f64::NAN)).is_err());
        assert_eq!(price(Some(0.0)).unwrap(), Some(0.0));
    }

    #[test]
    fn attachment_name_falls_back_to_url() {
        assert_eq!(
            attachment_name(None, "https://files.example/f/slides.pdf?sig=1").unwrap(),
            "slides.pdf"
        );
        assert_eq!(
            attachment_name(Some("Notes"), "https://files.example/x").unwrap(),
            "Notes"
        );
    }
}
