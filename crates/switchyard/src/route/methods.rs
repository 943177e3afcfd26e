//! HTTP method sets for route declarations.

use std::fmt;
use std::str::FromStr;

use axum::http::Method;
use axum::routing::MethodFilter;
use serde::{Serialize, Serializer};

use crate::error::{ControllerError, ControllerResult};

/// The HTTP methods a route answers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Methods {
    /// Every method.
    Any,
    /// An explicit, de-duplicated list.
    Only(Vec<Method>),
}

impl Methods {
    /// A set holding a single method.
    pub fn one(method: Method) -> Self {
        Self::Only(vec![method])
    }

    /// Build a set from a list, dropping duplicates while keeping order.
    pub fn from_list(methods: impl IntoIterator<Item = Method>) -> Self {
        let mut list: Vec<Method> = Vec::new();
        for method in methods {
            if !list.contains(&method) {
                list.push(method);
            }
        }
        Self::Only(list)
    }

    /// Check whether the set includes `method`.
    pub fn contains(&self, method: &Method) -> bool {
        match self {
            Self::Any => true,
            Self::Only(list) => list.contains(method),
        }
    }

    /// Check whether two sets share at least one method.
    pub fn overlaps(&self, other: &Methods) -> bool {
        match (self, other) {
            (Self::Any, Self::Any) => true,
            (Self::Any, only) => only.overlaps(self),
            (Self::Only(list), _) => list.iter().any(|m| other.contains(m)),
        }
    }

    /// Axum filter for the set; `None` means "any method".
    pub(crate) fn filter(&self) -> ControllerResult<Option<MethodFilter>> {
        let list = match self {
            Self::Any => return Ok(None),
            Self::Only(list) => list,
        };

        let mut filter: Option<MethodFilter> = None;
        for method in list {
            let next = MethodFilter::try_from(method.clone()).map_err(|_| {
                ControllerError::UnsupportedMethod {
                    method: method.to_string(),
                }
            })?;
            filter = Some(match filter {
                Some(acc) => acc.or(next),
                None => next,
            });
        }

        filter
            .map(Some)
            .ok_or_else(|| ControllerError::InvalidMethods {
                input: String::new(),
            })
    }
}

impl FromStr for Methods {
    type Err = ControllerError;

    /// Parse `"GET"`, `"get,post"`, `"GET|POST"`, `"*"` or `"all"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed == "*" || trimmed.eq_ignore_ascii_case("all") {
            return Ok(Self::Any);
        }

        let mut methods = Vec::new();
        for part in trimmed.split([',', '|']) {
            let part = part.trim();
            if part.is_empty() {
                return Err(ControllerError::InvalidMethods {
                    input: s.to_string(),
                });
            }
            let method = Method::from_bytes(part.to_ascii_uppercase().as_bytes()).map_err(|_| {
                ControllerError::InvalidMethods {
                    input: s.to_string(),
                }
            })?;
            methods.push(method);
        }

        Ok(Self::from_list(methods))
    }
}

impl fmt::Display for Methods {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("*"),
            Self::Only(list) => {
                let names: Vec<&str> = list.iter().map(Method::as_str).collect();
                f.write_str(&names.join("|"))
            }
        }
    }
}

impl Serialize for Methods {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
