use serde::Serialize;

/// Tag key carrying the application name.
pub const TAG_APPLICATION: &str = "application";
/// Tag key carrying the runtime version.
pub const TAG_RUNTIME_VERSION: &str = "runtime.version";
/// Tag key carrying the detected library version.
pub const TAG_LIBRARY_VERSION: &str = "library.version";

/// Immutable tag set for the application info counter.
///
/// Built once at startup; there are no mutators after construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomMetricTags {
    tags: Vec<(String, String)>,
}

impl CustomMetricTags {
    /// Common tags plus the runtime version, plus the library version when known.
    pub fn new(application: &str, runtime_version: &str, library_version: Option<&str>) -> Self {
        let mut tags = vec![
            (TAG_APPLICATION.to_string(), application.to_string()),
            (TAG_RUNTIME_VERSION.to_string(), runtime_version.to_string()),
        ];
        if let Some(lib) = library_version {
            tags.push((TAG_LIBRARY_VERSION.to_string(), lib.to_string()));
        }
        tags.sort();
        Self { tags }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Borrowed `(key, value)` pairs, sorted by key.
    pub fn as_pairs(&self) -> Vec<(&str, &str)> {
        self.tags
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}
