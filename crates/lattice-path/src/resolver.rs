//! Pure lookup of a path inside a record.

use serde_json::Value;

use crate::validator::{Path, PathError, Segment};

/// Resolve a path, reporting grammar failures.
///
/// `Ok(None)` means the path is valid but nothing is there: a missing key, an
/// out-of-range index, a step through a scalar, or a `null` on the way or at
/// the end.
pub fn try_resolve<'a>(item: &'a Value, path: &str) -> Result<Option<&'a Value>, PathError> {
    let path = Path::parse(path)?;
    Ok(lookup(item, &path))
}

/// Resolve a path, treating a rejected path as absent.
pub fn resolve<'a>(item: &'a Value, path: &str) -> Option<&'a Value> {
    try_resolve(item, path).ok().flatten()
}

/// Walk a validated path one segment at a time.
pub fn lookup<'a>(item: &'a Value, path: &Path) -> Option<&'a Value> {
    let mut current = item;

    for segment in path.segments() {
        current = match (current, segment) {
            (Value::Object(map), Segment::Key(key)) => map.get(key)?,
            (Value::Object(map), Segment::Index(index)) => map.get(&index.to_string())?,
            (Value::Array(list), Segment::Index(index)) => list.get(*index)?,
            _ => return None,
        };

        if current.is_null() {
            return None;
        }
    }

    Some(current)
}
