//! Project allowlist.
//!
//! Decides whether an envelope may be forwarded to a given project.
//! An empty allowlist means the deployment has not restricted destinations,
//! so every project is accepted.

use std::collections::HashSet;

/// Set of project ids permitted as forwarding destinations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectAllowlist {
    projects: HashSet<String>,
}

impl ProjectAllowlist {
    /// Build an allowlist from individual project ids.
    pub fn new<I, S>(projects: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            projects: projects.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns true if envelopes for `project_id` may be forwarded.
    ///
    /// Matching is exact and case-sensitive.
    pub fn is_allowed(&self, project_id: &str) -> bool {
        self.projects.is_empty() || self.projects.contains(project_id)
    }
}
