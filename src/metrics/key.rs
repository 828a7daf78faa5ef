//! Metric key resolution.
//!
//! Maps dot-delimited gauge names onto the entities they describe. Two
//! upstream naming conventions are understood:
//!
//! - **Standard**: `gauge.hystrix.HystrixCommand.<service>.<method>.<field>`
//!   for circuits and `gauge.hystrix.HystrixThreadPool.<service>.<field>` for
//!   thread pools.
//! - **Alternate publisher**: `<service>.<method>.<field>` with no namespace.
//!   A three-token name is only accepted once a marker field exists under the
//!   same `<service>.<method>` prefix. After the first confirmation the
//!   resolver stays on this scheme for circuits until [`KeyResolver::reset`].
//!
//! Thread pools are only recognised in the standard form.

use std::fmt;

use serde::Serialize;

use super::snapshot::{metric_name, MetricSnapshot};

const CIRCUIT_NAMESPACE: &str = "gauge.hystrix.HystrixCommand";
const THREAD_POOL_NAMESPACE: &str = "gauge.hystrix.HystrixThreadPool";

const STANDARD_CIRCUIT_TOKENS: usize = 6;
const STANDARD_THREAD_POOL_TOKENS: usize = 5;
const ALTERNATE_CIRCUIT_TOKENS: usize = 3;

/// Field whose presence confirms the alternate publisher's naming.
pub const DEFAULT_ALTERNATE_MARKER: &str = "countShortCircuited";

/// The kind of entity a metric describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum EntityKind {
    Circuit,
    ThreadPool,
}

impl EntityKind {
    /// Returns the display label for this kind.
    pub fn label(&self) -> &'static str {
        match self {
            EntityKind::Circuit => "Circuit",
            EntityKind::ThreadPool => "Thread Pools",
        }
    }
}

/// Identity of one dashboard widget.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct EntityKey {
    pub kind: EntityKind,
    pub service: String,
    pub method: Option<String>,
}

impl EntityKey {
    pub fn circuit(service: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            kind: EntityKind::Circuit,
            service: service.into(),
            method: Some(method.into()),
        }
    }

    pub fn thread_pool(service: impl Into<String>) -> Self {
        Self {
            kind: EntityKind::ThreadPool,
            service: service.into(),
            method: None,
        }
    }

    /// Human-readable name: `service.method` for circuits, `service` for pools.
    pub fn display_name(&self) -> String {
        match &self.method {
            Some(method) => format!("{}.{}", self.service, method),
            None => self.service.clone(),
        }
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Naming convention used by the upstream publisher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum NamingScheme {
    #[default]
    Standard,
    AlternatePublisher,
}

impl NamingScheme {
    pub fn label(&self) -> &'static str {
        match self {
            NamingScheme::Standard => "standard",
            NamingScheme::AlternatePublisher => "alternate",
        }
    }
}

/// A metric name resolved to its entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub key: EntityKey,
    /// Prefix under which the entity's individual fields are looked up.
    pub prefix: String,
}

/// Resolves gauge names into entity keys, remembering which naming scheme
/// the publisher uses.
#[derive(Debug, Clone)]
pub struct KeyResolver {
    marker_field: String,
    alternate_confirmed: bool,
}

impl Default for KeyResolver {
    fn default() -> Self {
        Self::new(DEFAULT_ALTERNATE_MARKER)
    }
}

impl KeyResolver {
    /// Create a resolver that confirms the alternate scheme via `marker_field`.
    pub fn new(marker_field: impl Into<String>) -> Self {
        Self {
            marker_field: marker_field.into(),
            alternate_confirmed: false,
        }
    }

    /// The scheme currently used for circuit names.
    pub fn scheme(&self) -> NamingScheme {
        if self.alternate_confirmed {
            NamingScheme::AlternatePublisher
        } else {
            NamingScheme::Standard
        }
    }

    /// Forget any detected scheme.
    pub fn reset(&mut self) {
        self.alternate_confirmed = false;
    }

    /// Resolve a gauge name into a circuit or thread-pool entity.
    pub fn resolve(&mut self, name: &str, snapshot: &MetricSnapshot) -> Option<Resolution> {
        self.resolve_circuit(name, snapshot)
            .or_else(|| self.resolve_thread_pool(name))
    }

    /// Resolve a gauge name into a circuit entity.
    ///
    /// `snapshot` is consulted for the marker field when a three-token name
    /// has to be disambiguated.
    pub fn resolve_circuit(&mut self, name: &str, snapshot: &MetricSnapshot) -> Option<Resolution> {
        let tokens = split_tokens(name)?;

        if self.alternate_confirmed {
            return alternate_circuit(&tokens);
        }

        if tokens.len() == STANDARD_CIRCUIT_TOKENS && in_namespace(&tokens, CIRCUIT_NAMESPACE) {
            return Some(Resolution {
                key: EntityKey::circuit(tokens[3], tokens[4]),
                prefix: tokens[..STANDARD_CIRCUIT_TOKENS - 1].join("."),
            });
        }

        if tokens.len() == ALTERNATE_CIRCUIT_TOKENS {
            let prefix = format!("{}.{}", tokens[0], tokens[1]);
            if snapshot.contains(&metric_name(&prefix, &self.marker_field)) {
                tracing::info!(
                    marker = %self.marker_field,
                    entity = %prefix,
                    "alternate publisher naming scheme confirmed"
                );
                self.alternate_confirmed = true;
                return alternate_circuit(&tokens);
            }
        }

        None
    }

    /// Resolve a gauge name into a thread-pool entity (standard form only).
    pub fn resolve_thread_pool(&self, name: &str) -> Option<Resolution> {
        let tokens = split_tokens(name)?;
        if tokens.len() != STANDARD_THREAD_POOL_TOKENS || !in_namespace(&tokens, THREAD_POOL_NAMESPACE)
        {
            return None;
        }

        Some(Resolution {
            key: EntityKey::thread_pool(tokens[3]),
            prefix: tokens[..STANDARD_THREAD_POOL_TOKENS - 1].join("."),
        })
    }
}

/// Split on dots, rejecting names with empty segments.
fn split_tokens(name: &str) -> Option<Vec<&str>> {
    let tokens: Vec<&str> = name.split('.').collect();
    if tokens.iter().any(|t| t.is_empty()) {
        return None;
    }
    Some(tokens)
}

/// Whether the leading tokens spell out `namespace` exactly.
fn in_namespace(tokens: &[&str], namespace: &str) -> bool {
    let expected: Vec<&str> = namespace.split('.').collect();
    tokens.len() > expected.len() && tokens[..expected.len()] == expected[..]
}

fn alternate_circuit(tokens: &[&str]) -> Option<Resolution> {
    if tokens.len() != ALTERNATE_CIRCUIT_TOKENS {
        return None;
    }
    Some(Resolution {
        key: EntityKey::circuit(tokens[0], tokens[1]),
        prefix: format!("{}.{}", tokens[0], tokens[1]),
    })
}
