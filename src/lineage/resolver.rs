use std::path::{Component, Path, PathBuf};

use super::event::Dataset;
use super::reference::DatasetReference;
use crate::error::ResolveError;

/// Turns an observed reference into a namespaced dataset.
///
/// Called once per accumulated reference at emission time, never at record time.
pub trait DatasetResolver: Send + Sync {
    fn resolve(&self, reference: &DatasetReference) -> Result<Dataset, ResolveError>;
}

/// Default resolver for local paths and URI-style storage locations.
///
/// - local paths and `file://`: namespace `file://`, name is the absolute path
/// - `s3://`, `s3a://`, `s3n://`: namespace `s3://<bucket>`, name is the key
/// - anything else: namespace `<scheme>://`, name is the rest of the uri
#[derive(Debug, Default, Clone, Copy)]
pub struct StorageResolver;

impl DatasetResolver for StorageResolver {
    fn resolve(&self, reference: &DatasetReference) -> Result<Dataset, ResolveError> {
        let (namespace, name) = split_location(reference.path())?;
        Ok(Dataset::with_columns(namespace, name, reference.columns()))
    }
}

/// Splits a location string into `(namespace, name)`.
pub fn split_location(location: &str) -> Result<(String, String), ResolveError> {
    let location = location.trim();
    if location.is_empty() {
        return Err(ResolveError::EmptyPath);
    }

    let Some((scheme, rest)) = location.split_once("://") else {
        return local_location(location);
    };

    if !is_valid_scheme(scheme) {
        return Err(ResolveError::MalformedScheme(location.to_string()));
    }

    match scheme.to_ascii_lowercase().as_str() {
        "file" | "local" => {
            let path = strip_local_authority(rest);
            if path.is_empty() {
                return Err(ResolveError::EmptyLocation(location.to_string()));
            }
            local_location(path)
        }
        "s3" | "s3a" | "s3n" => {
            let (bucket, key) = rest.split_once('/').unwrap_or((rest, ""));
            if bucket.is_empty() {
                return Err(ResolveError::MissingBucket(location.to_string()));
            }
            let key = key.trim_start_matches('/');
            if key.is_empty() {
                return Err(ResolveError::MissingKey(location.to_string()));
            }
            Ok((format!("s3://{}", bucket), key.to_string()))
        }
        other => {
            if rest.is_empty() {
                return Err(ResolveError::EmptyLocation(location.to_string()));
            }
            Ok((format!("{}://", other), rest.to_string()))
        }
    }
}

// RFC 3986: ALPHA *( ALPHA / DIGIT / "+" / "-" / "." )
fn is_valid_scheme(scheme: &str) -> bool {
    let mut chars = scheme.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

// `file://localhost/x` and `file:///x` name the same file.
fn strip_local_authority(rest: &str) -> &str {
    let host_len = rest.find('/').unwrap_or(rest.len());
    if rest[..host_len].eq_ignore_ascii_case("localhost") {
        &rest[host_len..]
    } else {
        rest
    }
}

fn local_location(path: &str) -> Result<(String, String), ResolveError> {
    let path = Path::new(path);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        let cwd = std::env::current_dir().map_err(|e| ResolveError::WorkingDirectory {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        cwd.join(path)
    };

    let normalized: PathBuf = absolute
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect();

    Ok(("file://".to_string(), normalized.display().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_absolute_path() {
        let (ns, name) = split_location("/data/in.csv").unwrap();
        assert_eq!(ns, "file://");
        assert_eq!(name, "/data/in.csv");
    }

    #[test]
    fn file_uri_matches_plain_path() {
        assert_eq!(
            split_location("file:///data/in.csv").unwrap(),
            split_location("/data/in.csv").unwrap()
        );
    }

    #[test]
    fn file_uri_with_localhost_authority() {
        assert_eq!(
            split_location("file://localhost/data/x.csv").unwrap(),
            ("file://".to_string(), "/data/x.csv".to_string())
        );
        assert_eq!(
            split_location("file://LOCALHOST/data/x.csv").unwrap(),
            split_location("file:///data/x.csv").unwrap()
        );
        assert!(matches!(
            split_location("file://localhost"),
            Err(ResolveError::EmptyLocation(_))
        ));
    }

    #[test]
    fn relative_path_is_made_absolute() {
        let (ns, name) = split_location("./in.csv").unwrap();
        assert_eq!(ns, "file://");
        let expected = std::env::current_dir().unwrap().join("in.csv");
        assert_eq!(name, expected.display().to_string());
    }

    #[test]
    fn s3_splits_bucket_and_key() {
        let (ns, name) = split_location("s3://bucket/key.csv").unwrap();
        assert_eq!(ns, "s3://bucket");
        assert_eq!(name, "key.csv");

        let (ns, name) = split_location("s3a://lake/raw/2024/part.csv").unwrap();
        assert_eq!(ns, "s3://lake");
        assert_eq!(name, "raw/2024/part.csv");
    }

    #[test]
    fn unknown_scheme_uses_generic_rule() {
        let (ns, name) = split_location("gs://bucket/obj.csv").unwrap();
        assert_eq!(ns, "gs://");
        assert_eq!(name, "bucket/obj.csv");
    }

    #[test]
    fn malformed_locations_fail() {
        assert_eq!(split_location("  "), Err(ResolveError::EmptyPath));
        assert!(matches!(
            split_location("s3:///key.csv"),
            Err(ResolveError::MissingBucket(_))
        ));
        assert!(matches!(
            split_location("s3://bucket"),
            Err(ResolveError::MissingKey(_))
        ));
        assert!(matches!(
            split_location("://nowhere"),
            Err(ResolveError::MalformedScheme(_))
        ));
        assert!(matches!(
            split_location("gs://"),
            Err(ResolveError::EmptyLocation(_))
        ));
    }
}
