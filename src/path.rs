//! Project-relative path normalization
//!
//! Paths reported by the runner may use either separator and, on Windows,
//! a drive letter whose case differs from the configured project root.

/// Maps absolute paths to forward-slash, project-relative paths
#[derive(Debug, Clone)]
pub struct PathNormalizer {
    root: String,
    root_lower: String,
    compact_paths: bool,
}

impl PathNormalizer {
    pub fn new(project_root: &str, compact_paths: bool) -> Self {
        let trimmed = project_root.trim_end_matches(&['/', '\\'][..]);
        let root = format!("{}/", to_forward_slashes(trimmed));
        let root_lower = root.to_ascii_lowercase();

        Self {
            root,
            root_lower,
            compact_paths,
        }
    }

    /// Normalize a path; with compaction on, paths under the root become relative
    pub fn normalize(&self, path: &str) -> String {
        if path.is_empty() {
            return String::new();
        }

        let normalized = to_forward_slashes(path);
        if !self.compact_paths {
            return normalized;
        }

        match self.strip_root(&normalized) {
            Some(relative) => relative.trim_start_matches('/').to_string(),
            None => normalized,
        }
    }

    pub fn normalize_opt(&self, path: Option<&str>) -> Option<String> {
        path.map(|p| self.normalize(p))
    }

    /// Whether the path has a `vendor` directory segment
    pub fn is_vendor_path(&self, path: &str) -> bool {
        if path.is_empty() {
            return false;
        }

        let normalized = to_forward_slashes(path).to_ascii_lowercase();
        normalized.starts_with("vendor/") || normalized.contains("/vendor/")
    }

    fn strip_root<'a>(&self, path: &'a str) -> Option<&'a str> {
        if let Some(rest) = path.strip_prefix(self.root.as_str()) {
            return Some(rest);
        }

        // ASCII lowercasing keeps byte offsets, so the prefix length carries over
        let lowered = path.to_ascii_lowercase();
        if lowered.starts_with(self.root_lower.as_str()) {
            return path.get(self.root_lower.len()..);
        }

        None
    }
}

fn to_forward_slashes(path: &str) -> String {
    path.replace('\\', "/")
}
