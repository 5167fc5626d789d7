//! Service identity: a namespace plus a service name

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ServiceIdError;

/// Identifies one deployable unit, rendered as `namespace/name`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ServiceId {
    namespace: String,
    name: String,
}

impl ServiceId {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// Split into `(namespace, name)`
    pub fn components(&self) -> (&str, &str) {
        (&self.namespace, &self.name)
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

impl FromStr for ServiceId {
    type Err = ServiceIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (namespace, name) =
            s.split_once('/')
                .ok_or_else(|| ServiceIdError::MissingSeparator { id: s.to_string() })?;

        if namespace.is_empty() {
            return Err(ServiceIdError::EmptyNamespace { id: s.to_string() });
        }
        if name.is_empty() || name.contains('/') {
            return Err(ServiceIdError::EmptyName { id: s.to_string() });
        }

        Ok(Self::new(namespace, name))
    }
}

// Serialized as a plain string so it can be used as a JSON/YAML map key.
impl Serialize for ServiceId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ServiceId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Ordered set of service IDs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceIdSet(BTreeSet<ServiceId>);

impl ServiceIdSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, ids: impl IntoIterator<Item = ServiceId>) {
        self.0.extend(ids);
    }

    pub fn contains(&self, id: &ServiceId) -> bool {
        self.0.contains(id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ServiceId> {
        self.0.iter()
    }
}

impl FromIterator<ServiceId> for ServiceIdSet {
    fn from_iter<I: IntoIterator<Item = ServiceId>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
