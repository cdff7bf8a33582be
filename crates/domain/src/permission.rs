//! Permission records and their dotted storage codes.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use dialcrm_core::{AppError, PermissionId};
use serde::{Deserialize, Serialize};

/// Validated permission code in dotted `resource.action` form.
///
/// The resource part carries no dots; the action part may (legacy seeds use
/// codes like `calls.recording.listen`). Both parts are non-empty and drawn
/// from lowercase ASCII, digits, and underscores.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PermissionCode(String);

impl PermissionCode {
    /// Creates a validated permission code.
    pub fn new(value: impl Into<String>) -> Result<Self, AppError> {
        let value = value.into();
        let Some((resource, action)) = value.split_once('.') else {
            return Err(AppError::Validation(format!(
                "permission code '{value}' must use dotted resource.action form"
            )));
        };

        if resource.is_empty() || action.is_empty() {
            return Err(AppError::Validation(format!(
                "permission code '{value}' has an empty resource or action part"
            )));
        }

        let part_is_valid = |part: &str| {
            !part.is_empty()
                && part
                    .chars()
                    .all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '_')
        };

        if !part_is_valid(resource) || !action.split('.').all(part_is_valid) {
            return Err(AppError::Validation(format!(
                "permission code '{value}' contains characters outside [a-z0-9_.]"
            )));
        }

        Ok(Self(value))
    }

    /// Builds a code from a literal known to satisfy the dotted form.
    ///
    /// Only for statically known values such as policy defaults; arbitrary
    /// input goes through `new`.
    pub(crate) fn from_trusted(value: &'static str) -> Self {
        debug_assert!(value.split_once('.').is_some_and(|(r, a)| {
            !r.is_empty() && !a.is_empty()
        }));
        Self(value.to_owned())
    }

    /// Returns the resource part (everything before the first dot).
    #[must_use]
    pub fn resource(&self) -> &str {
        self.0.split_once('.').map_or(self.0.as_str(), |(r, _)| r)
    }

    /// Returns the action part (everything after the first dot).
    #[must_use]
    pub fn action(&self) -> &str {
        self.0.split_once('.').map_or("", |(_, a)| a)
    }

    /// Returns whether the code falls under a reserved code-family prefix.
    #[must_use]
    pub fn has_prefix(&self, prefix: &str) -> bool {
        self.0.starts_with(prefix)
    }

    /// Returns the underlying string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for PermissionCode {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

impl FromStr for PermissionCode {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::new(value)
    }
}

/// Named capability enforced by policy checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    /// Stable permission identifier.
    pub id: PermissionId,
    /// Unique dotted storage code.
    pub code: PermissionCode,
    /// Human-readable permission name.
    pub name: String,
    /// Optional longer description.
    pub description: Option<String>,
    /// Grouping label for administrative views.
    pub category: Option<String>,
    /// Indicates a system-protected permission.
    pub is_system: bool,
}

impl Permission {
    /// Returns the resource part of the permission code.
    #[must_use]
    pub fn resource(&self) -> &str {
        self.code.resource()
    }

    /// Returns the action part of the permission code.
    #[must_use]
    pub fn action(&self) -> &str {
        self.code.action()
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::PermissionCode;

    #[test]
    fn code_decomposes_into_resource_and_action() {
        let code = PermissionCode::new("rbac.manage_roles").map(|code| {
            (code.resource().to_owned(), code.action().to_owned())
        });
        assert_eq!(
            code.ok(),
            Some(("rbac".to_owned(), "manage_roles".to_owned()))
        );
    }

    #[test]
    fn code_allows_dotted_action_part() {
        assert!(PermissionCode::new("calls.recording.listen").is_ok());
    }

    #[test]
    fn code_without_dot_is_rejected() {
        assert!(PermissionCode::new("admin").is_err());
    }

    #[test]
    fn code_with_empty_part_is_rejected() {
        assert!(PermissionCode::new(".manage").is_err());
        assert!(PermissionCode::new("rbac.").is_err());
    }

    #[test]
    fn code_with_uppercase_is_rejected() {
        assert!(PermissionCode::new("Rbac.manage").is_err());
    }

    proptest! {
        #[test]
        fn valid_dotted_codes_round_trip(
            resource in "[a-z][a-z0-9_]{0,15}",
            action in "[a-z][a-z0-9_]{0,15}",
        ) {
            let value = format!("{resource}.{action}");
            let code = PermissionCode::new(value.clone());
            prop_assert!(code.is_ok());
            if let Ok(code) = code {
                prop_assert_eq!(code.as_str(), value.as_str());
                prop_assert_eq!(code.resource(), resource.as_str());
                prop_assert_eq!(code.action(), action.as_str());
            }
        }

        #[test]
        fn codes_with_invalid_characters_are_rejected(
            bad in "[A-Z !@#$%^&*]{1,8}",
        ) {
            let value = format!("rbac.{bad}");
            prop_assert!(PermissionCode::new(value).is_err());
        }
    }
}
