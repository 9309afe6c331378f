//! Environment snapshots

use std::collections::HashMap;
use std::env;
use std::ffi::{OsStr, OsString};

use crate::error::EnvError;

/// Read-only copy of environment variables, taken once per construction.
///
/// Later changes to the process environment are not observed.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    vars: HashMap<OsString, OsString>,
}

impl Snapshot {
    /// Capture the current process environment.
    ///
    /// Entries that are not valid unicode are kept; reading one of them
    /// through [`get`](Self::get) reports [`EnvError::NotUnicode`].
    pub fn capture() -> Self {
        env::vars_os().collect()
    }

    /// Value of `name`, or `None` when the variable is not set.
    pub fn get(&self, name: &str) -> Result<Option<&str>, EnvError> {
        match self.vars.get(OsStr::new(name)) {
            None => Ok(None),
            Some(value) => value
                .to_str()
                .map(Some)
                .ok_or_else(|| EnvError::NotUnicode {
                    name: name.to_string(),
                }),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.vars.contains_key(OsStr::new(name))
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Snapshot
where
    K: Into<OsString>,
    V: Into<OsString>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_from_iter() {
        let snapshot: Snapshot = [("A", "123"), ("B", "")].into_iter().collect();
        assert_eq!(snapshot.get("A").unwrap(), Some("123"));
        assert_eq!(snapshot.get("B").unwrap(), Some(""));
        assert_eq!(snapshot.get("C").unwrap(), None);
        assert_eq!(snapshot.len(), 2);
    }

    #[test]
    #[serial]
    fn test_capture_is_a_copy() {
        env::set_var("ENVIRA_SNAPSHOT_TEST", "before");
        let snapshot = Snapshot::capture();
        env::set_var("ENVIRA_SNAPSHOT_TEST", "after");

        assert_eq!(snapshot.get("ENVIRA_SNAPSHOT_TEST").unwrap(), Some("before"));

        env::remove_var("ENVIRA_SNAPSHOT_TEST");
    }

    #[cfg(unix)]
    #[test]
    fn test_non_unicode_value() {
        use std::os::unix::ffi::OsStringExt;

        let snapshot: Snapshot = [(OsString::from("BAD"), OsString::from_vec(vec![0xff, 0xfe]))]
            .into_iter()
            .collect();
        assert!(snapshot.contains("BAD"));
        assert!(matches!(snapshot.get("BAD"), Err(EnvError::NotUnicode { .. })));
    }
}
