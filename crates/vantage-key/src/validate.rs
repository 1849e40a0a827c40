//! Development-time key diagnostics
//!
//! Malformed keys usually come from factory misuse (hand-built keys, ids
//! interpolated as empty strings, filters nested past reason). These checks
//! run in debug assertions and tests, not on the hot path.

use crate::canonical::value_depth;
use crate::key::{QueryKey, Segment};

/// Maximum accepted segment count
pub const MAX_SEGMENTS: usize = 8;

/// Maximum accepted nesting depth inside a parameter segment
pub const MAX_PARAM_DEPTH: usize = 4;

/// Malformed query key
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyError {
    /// Key with no segments
    #[error("key has no segments")]
    Empty,

    /// A literal segment that is an empty string
    #[error("segment {index} is an empty literal")]
    EmptyLiteral {
        /// Position of the offending segment
        index: usize,
    },

    /// Parameter segment whose value is not a JSON object
    #[error("segment {index} params must be a JSON object")]
    NonObjectParams {
        /// Position of the offending segment
        index: usize,
    },

    /// Parameter object nested past [`MAX_PARAM_DEPTH`]
    #[error("params nested {depth} levels deep (max {max})")]
    ParamsTooDeep {
        /// Observed depth
        depth: usize,
        /// Allowed maximum
        max: usize,
    },

    /// More segments than [`MAX_SEGMENTS`]
    #[error("key has {count} segments (max {max})")]
    TooManySegments {
        /// Observed count
        count: usize,
        /// Allowed maximum
        max: usize,
    },
}

/// Check a key for the malformations listed on [`KeyError`]
///
/// # Errors
/// Returns the first malformation found, scanning front to back.
pub fn validate_key(key: &QueryKey) -> Result<(), KeyError> {
    if key.is_empty() {
        return Err(KeyError::Empty);
    }
    if key.len() > MAX_SEGMENTS {
        return Err(KeyError::TooManySegments { count: key.len(), max: MAX_SEGMENTS });
    }
    for (index, segment) in key.segments().iter().enumerate() {
        match segment {
            Segment::Literal(s) if s.is_empty() => {
                return Err(KeyError::EmptyLiteral { index });
            }
            Segment::Params(params) => {
                if !params.value().is_object() {
                    return Err(KeyError::NonObjectParams { index });
                }
                let depth = value_depth(params.value());
                if depth > MAX_PARAM_DEPTH {
                    return Err(KeyError::ParamsTooDeep { depth, max: MAX_PARAM_DEPTH });
                }
            }
            Segment::Literal(_) => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::dashboards;
    use serde_json::json;
    use vantage_model::DashboardId;

    #[test]
    fn factory_keys_validate() {
        assert_eq!(validate_key(&dashboards::all()), Ok(()));
        assert_eq!(validate_key(&dashboards::widgets(DashboardId::new())), Ok(()));
        assert_eq!(
            validate_key(&dashboards::list(Some(json!({"search": "x"}).into()))),
            Ok(())
        );
    }

    #[test]
    fn hand_built_malformations_are_caught() {
        let empty = QueryKey::root("dashboards").push("");
        assert_eq!(validate_key(&empty), Err(KeyError::EmptyLiteral { index: 1 }));

        let scalar_params = QueryKey::root("dashboards").with_params(json!(42));
        assert_eq!(validate_key(&scalar_params), Err(KeyError::NonObjectParams { index: 1 }));

        let deep = QueryKey::root("dashboards")
            .with_params(json!({"a": {"b": {"c": {"d": {"e": 1}}}}}));
        assert!(matches!(validate_key(&deep), Err(KeyError::ParamsTooDeep { .. })));

        let mut long = QueryKey::root("dashboards");
        for i in 0..MAX_SEGMENTS {
            long = long.push(format!("s{i}"));
        }
        assert!(matches!(validate_key(&long), Err(KeyError::TooManySegments { .. })));
    }
}
