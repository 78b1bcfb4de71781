//! Mapping between script paths and their escaped resource URLs.
use percent_encoding::AsciiSet;
use percent_encoding::NON_ALPHANUMERIC;
use percent_encoding::percent_decode_str;
use percent_encoding::utf8_percent_encode;

use crate::errors::Error;
use crate::path::ScriptPath;

/// Root of the versioned HTTP API.
pub const API_ROOT: &str = "/api/v1";

/// URL prefix of the scripts collection.
pub const SCRIPTS_PREFIX: &str = "/api/v1/scripts";

// Characters left literal inside a single path segment. `/` is escaped so
// a name can never introduce a separator.
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b'$')
    .remove(b'&')
    .remove(b'+')
    .remove(b':')
    .remove(b'=')
    .remove(b'@');

/// Percent-escapes a single path segment.
pub fn escape_segment(segment: &str) -> String {
    utf8_percent_encode(segment, SEGMENT).to_string()
}

/// Reverses [`escape_segment`].
pub fn unescape_segment(segment: &str) -> Result<String, Error> {
    percent_decode_str(segment)
        .decode_utf8()
        .map(|s| s.into_owned())
        .map_err(|e| Error::InvalidPath {
            what: format!("{segment}: {e}"),
        })
}

/// Builds a resource URL by escaping every part on its own and joining
/// them onto `prefix`.
///
/// `prefix` is taken as-is; it is expected to be already escaped.
pub fn resource_url<T: AsRef<str>>(prefix: &str, parts: &[T]) -> String {
    let mut url = prefix.trim_end_matches('/').to_owned();
    for part in parts {
        url.push('/');
        url.push_str(&escape_segment(part.as_ref()));
    }
    url
}

/// URL of a script resource in the scripts collection.
pub fn script_url(path: &ScriptPath) -> String {
    resource_url(SCRIPTS_PREFIX, path.components())
}

/// Decodes an escaped request path under `prefix` back into a
/// [`ScriptPath`].
///
/// Each segment is unescaped on its own before normalization, so `%2F`
/// never acts as a separator and is rejected as part of a component.
pub fn parse_resource_path(prefix: &str, raw_path: &str) -> Result<ScriptPath, Error> {
    let rest = raw_path
        .strip_prefix(prefix.trim_end_matches('/'))
        .ok_or_else(|| Error::InvalidPath {
            what: format!("{raw_path} is not under {prefix}"),
        })?;
    if !rest.is_empty() && !rest.starts_with('/') {
        return Err(Error::InvalidPath {
            what: format!("{raw_path} is not under {prefix}"),
        });
    }
    let segments = rest
        .split('/')
        .map(unescape_segment)
        .collect::<Result<Vec<_>, _>>()?;
    ScriptPath::from_segments(segments).map_err(|e| Error::InvalidPath {
        what: format!("{raw_path}: {e}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_keeps_plain_names() {
        assert_eq!(escape_segment("test.lua"), "test.lua");
        assert_eq!(escape_segment("a-b_c~d"), "a-b_c~d");
    }

    #[test]
    fn escape_slash_space_and_percent() {
        assert_eq!(escape_segment("a/b"), "a%2Fb");
        assert_eq!(escape_segment("my script.lua"), "my%20script.lua");
        assert_eq!(escape_segment("100%"), "100%25");
        assert_eq!(escape_segment("q?x#y"), "q%3Fx%23y");
    }

    #[test]
    fn escape_is_stable_under_unescape() {
        for name in ["a/b", "my script.lua", "100%", "%2F", "ünïcödé", "a+b=c@d"] {
            assert_eq!(unescape_segment(&escape_segment(name)).unwrap(), name);
        }
    }

    #[test]
    fn resource_url_escapes_each_part() {
        assert_eq!(
            resource_url(SCRIPTS_PREFIX, &["dir one", "x.lua"]),
            "/api/v1/scripts/dir%20one/x.lua"
        );
        assert_eq!(resource_url(SCRIPTS_PREFIX, &["a/b"]), "/api/v1/scripts/a%2Fb");
        assert_eq!(resource_url::<&str>(SCRIPTS_PREFIX, &[]), SCRIPTS_PREFIX);
    }

    #[test]
    fn nested_prefix_is_not_escaped_twice() {
        let prefix = resource_url(SCRIPTS_PREFIX, &["50%"]);
        assert_eq!(prefix, "/api/v1/scripts/50%25");
        assert_eq!(resource_url(&prefix, &["b c"]), "/api/v1/scripts/50%25/b%20c");
    }

    #[test]
    fn parse_resource_path_decodes_segments() {
        let path = parse_resource_path(SCRIPTS_PREFIX, "/api/v1/scripts/dir%20one/x.lua").unwrap();
        assert_eq!(path.components(), ["dir one", "x.lua"]);
        assert!(
            parse_resource_path(SCRIPTS_PREFIX, "/api/v1/scripts")
                .unwrap()
                .is_root()
        );
    }

    #[test]
    fn parse_resource_path_rejects_traversal() {
        assert!(parse_resource_path(SCRIPTS_PREFIX, "/api/v1/scripts/../x").is_err());
        assert!(parse_resource_path(SCRIPTS_PREFIX, "/api/v1/scripts/%2E%2E/x").is_err());
        assert!(parse_resource_path(SCRIPTS_PREFIX, "/api/v1/scripts/a%2Fb").is_err());
        assert!(parse_resource_path(SCRIPTS_PREFIX, "/api/v1/scriptsx").is_err());
    }

    #[test]
    fn script_url_round_trips() {
        let path = ScriptPath::from_segments(["a", "b c", "d.lua"]).unwrap();
        let url = script_url(&path);
        assert_eq!(parse_resource_path(SCRIPTS_PREFIX, &url).unwrap(), path);
    }
}
