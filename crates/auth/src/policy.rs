//! Role policy registry: which roles may call which route.
//!
//! Policies are declared once at startup through [`RoutePolicyRegistryBuilder`]
//! and frozen into a [`RoutePolicyRegistry`]. The frozen registry is never
//! mutated, so concurrent request tasks read it without synchronisation.

use http::Method;
use thiserror::Error;

use crate::roles::{Role, RoleSet};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PolicyError {
    #[error("route {method} {pattern} declares no permitted roles")]
    EmptyRoleSet { method: Method, pattern: String },

    #[error("invalid route pattern '{0}'")]
    InvalidPattern(String),

    #[error("route {method} {pattern} is already registered")]
    DuplicateRoute { method: Method, pattern: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
}

/// A path pattern such as `/api/v1/hotels/{id}`.
///
/// `{name}` segments match any single non-empty path segment; all other
/// segments match literally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePattern {
    raw: String,
    segments: Vec<Segment>,
}

impl RoutePattern {
    pub fn parse(raw: &str) -> Result<Self, PolicyError> {
        let invalid = || PolicyError::InvalidPattern(raw.to_string());
        if !raw.starts_with('/') {
            return Err(invalid());
        }

        let segments = split_path(raw)
            .map(|seg| {
                if let Some(name) = seg.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
                    if name.is_empty() || name.contains(['{', '}']) {
                        return Err(invalid());
                    }
                    Ok(Segment::Param(name.to_string()))
                } else if seg.is_empty() || seg.contains(['{', '}']) {
                    Err(invalid())
                } else {
                    Ok(Segment::Literal(seg.to_string()))
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    fn matches(&self, path: &[&str]) -> bool {
        self.segments.len() == path.len()
            && self.segments.iter().zip(path).all(|(seg, part)| match seg {
                Segment::Literal(lit) => lit == part,
                Segment::Param(_) => !part.is_empty(),
            })
    }

    /// Literal-vs-parameter shape, compared left to right. Larger is more specific.
    fn specificity(&self) -> Vec<bool> {
        self.segments
            .iter()
            .map(|s| matches!(s, Segment::Literal(_)))
            .collect()
    }

    /// Two patterns with the same shape match exactly the same paths.
    fn same_shape(&self, other: &RoutePattern) -> bool {
        self.segments.len() == other.segments.len()
            && self
                .segments
                .iter()
                .zip(&other.segments)
                .all(|(a, b)| match (a, b) {
                    (Segment::Literal(x), Segment::Literal(y)) => x == y,
                    (Segment::Param(_), Segment::Param(_)) => true,
                    _ => false,
                })
    }
}

impl core::fmt::Display for RoutePattern {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Permitted roles for one (method, pattern) pair. The role set is never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePolicy {
    pub method: Method,
    pub pattern: RoutePattern,
    pub roles: RoleSet,
}

impl RoutePolicy {
    pub fn is_public(&self) -> bool {
        self.roles.contains(Role::Anyone)
    }
}

#[derive(Debug, Default)]
pub struct RoutePolicyRegistryBuilder {
    policies: Vec<RoutePolicy>,
}

impl RoutePolicyRegistryBuilder {
    pub fn register(
        &mut self,
        method: Method,
        pattern: &str,
        roles: impl IntoIterator<Item = Role>,
    ) -> Result<&mut Self, PolicyError> {
        let roles: RoleSet = roles.into_iter().collect();
        if roles.is_empty() {
            return Err(PolicyError::EmptyRoleSet {
                method,
                pattern: pattern.to_string(),
            });
        }

        let pattern = RoutePattern::parse(pattern)?;
        if self
            .policies
            .iter()
            .any(|p| p.method == method && p.pattern.same_shape(&pattern))
        {
            return Err(PolicyError::DuplicateRoute {
                method,
                pattern: pattern.raw,
            });
        }

        self.policies.push(RoutePolicy {
            method,
            pattern,
            roles,
        });
        Ok(self)
    }

    pub fn build(self) -> RoutePolicyRegistry {
        RoutePolicyRegistry {
            policies: self.policies,
        }
    }
}

/// Frozen route → roles table.
#[derive(Debug, Clone, Default)]
pub struct RoutePolicyRegistry {
    policies: Vec<RoutePolicy>,
}

impl RoutePolicyRegistry {
    pub fn builder() -> RoutePolicyRegistryBuilder {
        RoutePolicyRegistryBuilder::default()
    }

    /// Permitted roles for the most specific pattern matching `path`.
    pub fn resolve(&self, method: &Method, path: &str) -> Option<&RoleSet> {
        self.resolve_policy(method, path).map(|p| &p.roles)
    }

    /// Like [`resolve`](Self::resolve) but returns the whole policy.
    ///
    /// `HEAD` falls back to the `GET` policy when no `HEAD` route is declared.
    pub fn resolve_policy(&self, method: &Method, path: &str) -> Option<&RoutePolicy> {
        let parts: Vec<&str> = split_path(path).collect();
        self.best_match(method, &parts).or_else(|| {
            if *method == Method::HEAD {
                self.best_match(&Method::GET, &parts)
            } else {
                None
            }
        })
    }

    fn best_match(&self, method: &Method, parts: &[&str]) -> Option<&RoutePolicy> {
        self.policies
            .iter()
            .filter(|p| &p.method == method && p.pattern.matches(parts))
            .max_by_key(|p| p.pattern.specificity())
    }

    /// Whether any method has a policy for `path`.
    pub fn serves_path(&self, path: &str) -> bool {
        let parts: Vec<&str> = split_path(path).collect();
        self.policies.iter().any(|p| p.pattern.matches(&parts))
    }

    /// All policies, in registration order.
    pub fn policies(&self) -> impl Iterator<Item = &RoutePolicy> {
        self.policies.iter()
    }

    pub fn len(&self) -> usize {
        self.policies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }
}

/// Split a path into segments, ignoring the leading slash and any trailing slash.
pub(crate) fn split_path(path: &str) -> impl Iterator<Item = &str> {
    let trimmed = path.strip_prefix('/').unwrap_or(path);
    let trimmed = trimmed.strip_suffix('/').unwrap_or(trimmed);
    trimmed.split('/').filter(move |_| !trimmed.is_empty())
}
