//! Resource filter expressions
//!
//! Recognized forms:
//! - `tagName eq '<key>'` - the resource has a tag with this key
//! - `tagName eq '<key>' and tagValue eq '<value>'` - the tag has exactly this value
//! - `resourceType eq '<Namespace/type>'` - case-insensitive type match

use crate::error::{Error, Result};
use crate::models::GenericResource;

/// Parsed filter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceFilter {
    TagName(String),
    TagValue { name: String, value: String },
    ResourceType(String),
}

impl ResourceFilter {
    /// Parse a filter expression, `None` if the syntax is not recognized
    pub fn parse(expr: &str) -> Option<Self> {
        let clauses = split_and(expr)
            .into_iter()
            .map(parse_clause)
            .collect::<Option<Vec<_>>>()?;

        match clauses.as_slice() {
            [(field, key)] if field.eq_ignore_ascii_case("tagName") => {
                Some(Self::TagName(key.clone()))
            }
            [(f1, key), (f2, value)]
                if f1.eq_ignore_ascii_case("tagName") && f2.eq_ignore_ascii_case("tagValue") =>
            {
                Some(Self::TagValue {
                    name: key.clone(),
                    value: value.clone(),
                })
            }
            [(field, ty)] if field.eq_ignore_ascii_case("resourceType") => {
                Some(Self::ResourceType(ty.clone()))
            }
            _ => None,
        }
    }

    pub fn matches(&self, resource: &GenericResource) -> bool {
        match self {
            Self::TagName(key) => resource
                .tags
                .as_ref()
                .is_some_and(|tags| tags.contains_key(key)),
            Self::TagValue { name, value } => resource.tag(name) == Some(value.as_str()),
            Self::ResourceType(ty) => resource.resource_type.eq_ignore_ascii_case(ty),
        }
    }
}

/// Resolve an optional filter expression
///
/// Unrecognized text means "no filter" unless `strict` is set, in which case
/// it is rejected with a validation error.
pub(crate) fn resolve(expr: Option<&str>, strict: bool) -> Result<Option<ResourceFilter>> {
    let Some(expr) = expr.map(str::trim).filter(|e| !e.is_empty()) else {
        return Ok(None);
    };

    match ResourceFilter::parse(expr) {
        Some(filter) => Ok(Some(filter)),
        None if strict => Err(Error::Validation(format!(
            "Unsupported filter expression: {}",
            expr
        ))),
        None => {
            tracing::warn!("Ignoring unrecognized filter expression: {}", expr);
            Ok(None)
        }
    }
}

/// Split on the `and` keyword, outside of quoted values
fn split_and(expr: &str) -> Vec<&str> {
    let mut clauses = Vec::new();
    let mut in_quotes = false;
    let mut start = 0;
    let bytes = expr.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'\'' => in_quotes = !in_quotes,
            b' ' if !in_quotes => {
                let rest = &bytes[i..];
                if rest.len() >= 5 && rest[..5].eq_ignore_ascii_case(b" and ") {
                    clauses.push(&expr[start..i]);
                    start = i + 5;
                    i += 5;
                    continue;
                }
            }
            _ => {}
        }
        i += 1;
    }
    clauses.push(&expr[start..]);
    clauses
}

/// Parse `<field> eq '<value>'`
fn parse_clause(clause: &str) -> Option<(String, String)> {
    let mut parts = clause.trim().splitn(3, ' ');
    let field = parts.next()?.trim();
    let op = parts.next()?.trim();
    let value = parts.next()?.trim();

    if field.is_empty() || !op.eq_ignore_ascii_case("eq") {
        return None;
    }
    let inner = value.strip_prefix('\'')?.strip_suffix('\'')?;
    if inner.contains('\'') {
        return None;
    }
    Some((field.to_string(), inner.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tag_name() {
        assert_eq!(
            ResourceFilter::parse("tagName eq 'owner'"),
            Some(ResourceFilter::TagName("owner".to_string()))
        );
    }

    #[test]
    fn test_parse_tag_value() {
        assert_eq!(
            ResourceFilter::parse("tagName eq 'owner' and tagValue eq 'Homer Simpson'"),
            Some(ResourceFilter::TagValue {
                name: "owner".to_string(),
                value: "Homer Simpson".to_string()
            })
        );
    }

    #[test]
    fn test_parse_resource_type() {
        assert_eq!(
            ResourceFilter::parse("resourceType eq 'Microsoft.Web/sites'"),
            Some(ResourceFilter::ResourceType("Microsoft.Web/sites".to_string()))
        );
    }

    #[test]
    fn test_value_containing_and_keyword() {
        assert_eq!(
            ResourceFilter::parse("tagName eq 'rock and roll'"),
            Some(ResourceFilter::TagName("rock and roll".to_string()))
        );
    }

    #[test]
    fn test_unrecognized() {
        assert_eq!(ResourceFilter::parse("location eq 'uksouth'"), None);
        assert_eq!(ResourceFilter::parse("tagName eq owner"), None);
        assert_eq!(ResourceFilter::parse("nonsense"), None);
        assert_eq!(ResourceFilter::parse("tagValue eq 'x'"), None);
    }

    #[test]
    fn test_resolve_permissive_and_strict() {
        assert_eq!(resolve(Some("garbage"), false).unwrap(), None);
        assert_eq!(resolve(Some("  "), true).unwrap(), None);
        assert_eq!(resolve(None, true).unwrap(), None);
        let err = resolve(Some("garbage"), true).unwrap_err();
        assert_eq!(err.status_code(), 400);
    }
}
