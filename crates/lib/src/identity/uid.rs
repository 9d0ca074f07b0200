//! Application UID derivation.
//!
//! An application UID is `name.project.org`, each segment normalized so it is
//! safe in URLs and storage keys. Dots never survive normalization, which
//! keeps the three segments unambiguous.

/// Lowercase `value` and replace every character outside `[a-zA-Z0-9-]` with `-`.
pub fn normalize_segment(value: &str) -> String {
  value
    .chars()
    .map(|c| {
      if c.is_ascii_alphanumeric() || c == '-' {
        c.to_ascii_lowercase()
      } else {
        '-'
      }
    })
    .collect()
}

/// Build the application UID for `name` in `project` owned by `org`.
pub fn application_uid(org: &str, project: &str, name: &str) -> String {
  format!(
    "{}.{}.{}",
    normalize_segment(name),
    normalize_segment(project),
    normalize_segment(org)
  )
}

/// Split a fully-qualified `name.project.org` reference into its segments.
///
/// Returns `None` unless there are exactly three non-empty segments.
pub fn split_application_uid(value: &str) -> Option<(&str, &str, &str)> {
  let mut parts = value.split('.');
  let name = parts.next()?;
  let project = parts.next()?;
  let org = parts.next()?;
  if parts.next().is_some() || name.is_empty() || project.is_empty() || org.is_empty() {
    return None;
  }
  Some((name, project, org))
}

#[cfg(test)]
mod tests {
  use super::*;
  use proptest::prelude::*;

  #[test]
  fn normalizes_each_segment() {
    assert_eq!(
      application_uid("My_Org!", "My-Project#123", "App Name@2024"),
      "app-name-2024.my-project-123.my-org-"
    );
  }

  #[test]
  fn non_ascii_letters_become_dashes() {
    assert_eq!(normalize_segment("Café"), "caf-");
  }

  #[test]
  fn splits_fully_qualified_reference() {
    assert_eq!(split_application_uid("cart.shop.acme"), Some(("cart", "shop", "acme")));
    assert_eq!(split_application_uid("cart.shop"), None);
    assert_eq!(split_application_uid("a.b.c.d"), None);
    assert_eq!(split_application_uid("a..c"), None);
  }

  proptest! {
    #[test]
    fn uid_has_three_clean_segments(org in ".{0,16}", project in ".{0,16}", name in ".{0,16}") {
      let uid = application_uid(&org, &project, &name);
      prop_assert_eq!(uid.matches('.').count(), 2);
      prop_assert!(uid.chars().all(|c| c == '.' || c == '-' || c.is_ascii_digit() || c.is_ascii_lowercase()));
    }

    #[test]
    fn normalization_is_idempotent(value in ".{0,32}") {
      let once = normalize_segment(&value);
      prop_assert_eq!(normalize_segment(&once), once.clone());
    }
  }
}
