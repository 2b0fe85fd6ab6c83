//! # Namespace Emulation
//!
//! Derives a three-level project → service → environment tree from flat
//! object paths. Depth is explicit: at `UnderService` a listed segment may be
//! a version filename (`dev-v3.json`) and must be reduced to the environment
//! name, while shallower segments are real path components.

use std::collections::BTreeSet;

use crate::domain::errors::StoreError;
use crate::domain::key::validate_segment;

/// Where in the tree a browse request is looking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowseScope {
    /// List projects.
    Root,
    /// List services of a project.
    UnderProject { project: String },
    /// List environments of a service.
    UnderService { project: String, service: String },
}

impl BrowseScope {
    /// Parse an external browse path (`""`, `"proj"`, `"proj/svc"`, with or
    /// without a trailing `/`).
    pub fn parse(path: &str) -> Result<Self, StoreError> {
        let trimmed = path.strip_suffix('/').unwrap_or(path);
        if trimmed.is_empty() {
            return Ok(BrowseScope::Root);
        }

        let segments: Vec<&str> = trimmed.split('/').collect();
        match segments.as_slice() {
            [project] => {
                validate_segment("project", project)?;
                Ok(BrowseScope::UnderProject {
                    project: project.to_string(),
                })
            }
            [project, service] => {
                validate_segment("project", project)?;
                validate_segment("service", service)?;
                Ok(BrowseScope::UnderService {
                    project: project.to_string(),
                    service: service.to_string(),
                })
            }
            _ => Err(StoreError::Validation(format!(
                "browse path '{path}' is deeper than project/service"
            ))),
        }
    }

    /// Listing prefix for this scope.
    pub fn prefix(&self) -> String {
        match self {
            BrowseScope::Root => String::new(),
            BrowseScope::UnderProject { project } => format!("{project}/"),
            BrowseScope::UnderService { project, service } => format!("{project}/{service}/"),
        }
    }

    /// Child name for the first segment below the prefix.
    fn child_name<'a>(&self, segment: &'a str) -> &'a str {
        match self {
            BrowseScope::UnderService { .. } => strip_version_suffix(segment),
            _ => segment,
        }
    }

    /// Reduce listed pathnames to sorted, deduplicated child names.
    pub fn children<'a>(&self, pathnames: impl IntoIterator<Item = &'a str>) -> Vec<String> {
        let prefix = self.prefix();
        let names: BTreeSet<&str> = pathnames
            .into_iter()
            .filter_map(|path| path.strip_prefix(prefix.as_str()))
            .filter_map(|relative| relative.split('/').next())
            .filter(|segment| !segment.is_empty())
            .map(|segment| self.child_name(segment))
            .filter(|name| !name.is_empty())
            .collect();

        names.into_iter().map(str::to_string).collect()
    }
}

/// `dev-v12.json` → `dev`. Anything else is returned unchanged.
fn strip_version_suffix(segment: &str) -> &str {
    let Some(stem) = segment.strip_suffix(".json") else {
        return segment;
    };
    let Some(idx) = stem.rfind("-v") else {
        return segment;
    };
    let digits = &stem[idx + 2..];
    if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
        &stem[..idx]
    } else {
        segment
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_depths() {
        assert_eq!(BrowseScope::parse("").unwrap(), BrowseScope::Root);
        assert_eq!(BrowseScope::parse("/").unwrap(), BrowseScope::Root);
        assert_eq!(
            BrowseScope::parse("proj1").unwrap(),
            BrowseScope::UnderProject {
                project: "proj1".to_string()
            }
        );
        assert_eq!(
            BrowseScope::parse("proj1/svcA/").unwrap(),
            BrowseScope::UnderService {
                project: "proj1".to_string(),
                service: "svcA".to_string()
            }
        );
    }

    #[test]
    fn test_parse_rejects_deep_or_empty_segments() {
        assert!(BrowseScope::parse("a/b/c").is_err());
        assert!(BrowseScope::parse("a//").is_err());
        assert!(BrowseScope::parse("/a").is_err());
    }

    #[test]
    fn test_strip_version_suffix() {
        assert_eq!(strip_version_suffix("dev-v1.json"), "dev");
        assert_eq!(strip_version_suffix("pre-prod-v10.json"), "pre-prod");
        assert_eq!(strip_version_suffix("dev"), "dev");
        assert_eq!(strip_version_suffix("dev-vx.json"), "dev-vx.json");
        assert_eq!(strip_version_suffix("config.json"), "config.json");
    }

    #[test]
    fn test_children_at_each_depth() {
        let paths = [
            "proj1/svcA/dev-v1.json",
            "proj1/svcA/dev-v2.json",
            "proj1/svcB/prod-v1.json",
            "proj1/svcA/staging/v1.json",
            "proj2/svcC/qa/v4.json",
        ];

        assert_eq!(
            BrowseScope::Root.children(paths),
            vec!["proj1".to_string(), "proj2".to_string()]
        );
        assert_eq!(
            BrowseScope::parse("proj1").unwrap().children(paths),
            vec!["svcA".to_string(), "svcB".to_string()]
        );
        assert_eq!(
            BrowseScope::parse("proj1/svcA").unwrap().children(paths),
            vec!["dev".to_string(), "staging".to_string()]
        );
    }

    #[test]
    fn test_shallow_depth_keeps_version_like_names() {
        let paths = ["proj1/svc-v1.json/dev/v1.json"];
        assert_eq!(
            BrowseScope::parse("proj1").unwrap().children(paths),
            vec!["svc-v1.json".to_string()]
        );
    }
}
