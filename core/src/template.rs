//! Named-placeholder substitution for endpoint URL templates.
//!
//! Templates use `{name}` placeholders, e.g. `websites/{website_id}/`.
//! Values are inserted verbatim: callers percent-encode free-form path
//! segments themselves.

use crate::error::ApiError;

pub fn render(template: &str, params: &[(&str, String)]) -> Result<String, ApiError> {
    let mut rendered = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        rendered.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let end = after.find('}').ok_or_else(|| {
            ApiError::Configuration(format!("unterminated placeholder in url template {template:?}"))
        })?;
        let name = &after[..end];
        let (_, value) = params.iter().find(|(key, _)| *key == name).ok_or_else(|| {
            ApiError::Configuration(format!(
                "no value for placeholder {{{name}}} in url template {template:?}"
            ))
        })?;
        rendered.push_str(value);
        rest = &after[end + 1..];
    }
    rendered.push_str(rest);

    Ok(rendered)
}

/// Joins a relative path to `base_url`; absolute URLs pass through.
pub fn resolve(base_url: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitutes_named_placeholders() {
        let url = render(
            "websites/{website_id}/campaigns/{campaign_id}/",
            &[("campaign_id", "7".to_string()), ("website_id", "4".to_string())],
        )
        .unwrap();
        assert_eq!(url, "websites/4/campaigns/7/");
    }

    #[test]
    fn values_are_not_escaped() {
        let url = render("deeplink/{id}/", &[("id", "a%20b".to_string())]).unwrap();
        assert_eq!(url, "deeplink/a%20b/");
    }

    #[test]
    fn extra_params_are_ignored() {
        let url = render("websites/", &[("website_id", "4".to_string())]).unwrap();
        assert_eq!(url, "websites/");
    }

    #[test]
    fn missing_placeholder_value_is_a_configuration_error() {
        let err = render("websites/{website_id}/", &[]).unwrap_err();
        assert!(matches!(err, ApiError::Configuration(ref msg) if msg.contains("website_id")));
    }

    #[test]
    fn unterminated_placeholder_is_a_configuration_error() {
        let err = render("websites/{website_id/", &[("website_id", "1".to_string())]).unwrap_err();
        assert!(matches!(err, ApiError::Configuration(_)));
    }

    #[test]
    fn resolve_joins_relative_paths() {
        assert_eq!(
            resolve("https://api.admitad.com/", "/websites/"),
            "https://api.admitad.com/websites/"
        );
        assert_eq!(
            resolve("http://127.0.0.1:3000", "token/"),
            "http://127.0.0.1:3000/token/"
        );
        assert_eq!(
            resolve("https://api.admitad.com/", "http://other.host/x/"),
            "http://other.host/x/"
        );
    }
}
