// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipewright contributors

//! Matrix expansion
//!
//! A matrix is an ordered list of named dimensions, each holding an ordered
//! list of values. Expansion yields the full cross-product with the first
//! declared dimension varying slowest, so identical configuration always
//! produces identically ordered and labelled job variants.

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

use crate::errors::ConfigError;

/// One named dimension of a matrix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dimension {
    pub name: String,
    pub values: Vec<String>,
}

/// Partial assignment of dimension values, used by `include` and `exclude`
pub type Assignment = BTreeMap<String, String>;

/// Declarative matrix: dimensions in declaration order plus adjustments
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatrixSpec {
    #[serde(flatten)]
    pub dimensions: Dimensions,

    /// Extra combinations appended after the cross-product
    #[serde(
        default,
        skip_serializing_if = "Vec::is_empty",
        deserialize_with = "deserialize_assignments"
    )]
    pub include: Vec<Assignment>,

    /// Combinations removed from the cross-product
    #[serde(
        default,
        skip_serializing_if = "Vec::is_empty",
        deserialize_with = "deserialize_assignments"
    )]
    pub exclude: Vec<Assignment>,
}

/// Order-preserving list of dimensions
///
/// Deserialised from a mapping so the YAML declaration order is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dimensions(pub Vec<Dimension>);

impl MatrixSpec {
    /// Build a matrix from `(name, values)` pairs
    pub fn from_pairs<N, V, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (N, Vec<V>)>,
        N: Into<String>,
        V: Into<String>,
    {
        let dimensions = pairs
            .into_iter()
            .map(|(name, values)| Dimension {
                name: name.into(),
                values: values.into_iter().map(Into::into).collect(),
            })
            .collect();

        Self {
            dimensions: Dimensions(dimensions),
            include: vec![],
            exclude: vec![],
        }
    }

    pub fn dimensions(&self) -> &[Dimension] {
        &self.dimensions.0
    }

    fn dimension_names(&self) -> impl Iterator<Item = &str> {
        self.dimensions.0.iter().map(|d| d.name.as_str())
    }

    /// Number of variants the plain cross-product produces
    pub fn product_size(&self) -> usize {
        self.dimensions.0.iter().map(|d| d.values.len()).product()
    }

    /// Check the matrix for structural errors
    pub fn validate(&self, pipeline: &str) -> Result<(), ConfigError> {
        let mut seen = std::collections::HashSet::new();

        for dim in &self.dimensions.0 {
            if !seen.insert(dim.name.as_str()) {
                return Err(ConfigError::DuplicateDimension {
                    pipeline: pipeline.to_string(),
                    dimension: dim.name.clone(),
                });
            }
            if dim.values.is_empty() {
                return Err(ConfigError::EmptyDimension {
                    pipeline: pipeline.to_string(),
                    dimension: dim.name.clone(),
                });
            }
        }

        for (section, entries) in [("exclude", &self.exclude), ("include", &self.include)] {
            for entry in entries {
                if let Some(unknown) = entry.keys().find(|k| !seen.contains(k.as_str())) {
                    return Err(ConfigError::UnknownDimension {
                        pipeline: pipeline.to_string(),
                        section: section.to_string(),
                        dimension: unknown.clone(),
                    });
                }
            }
        }

        Ok(())
    }
}

/// One concrete point of the matrix
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct JobVariant {
    /// Position in the deterministic expansion order
    pub index: usize,
    /// Dimension name and value, in dimension declaration order
    #[serde(serialize_with = "serialize_values")]
    pub values: Vec<(String, String)>,
    /// Human-readable label derived from the values
    pub label: String,
}

impl JobVariant {
    fn new(index: usize, values: Vec<(String, String)>) -> Self {
        let label = if values.is_empty() {
            "default".to_string()
        } else {
            values
                .iter()
                .map(|(_, v)| v.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        };

        Self {
            index,
            values,
            label,
        }
    }

    /// Value bound to a dimension in this variant
    pub fn get(&self, dimension: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(name, _)| name == dimension)
            .map(|(_, value)| value.as_str())
    }

    fn matches(&self, assignment: &Assignment) -> bool {
        assignment
            .iter()
            .all(|(name, value)| self.get(name) == Some(value.as_str()))
    }
}

/// Expand a matrix into its ordered job variants
pub fn expand(spec: &MatrixSpec) -> Result<Vec<JobVariant>, ConfigError> {
    if let Some(dim) = spec.dimensions().iter().find(|d| d.values.is_empty()) {
        return Err(ConfigError::EmptyDimension {
            pipeline: String::new(),
            dimension: dim.name.clone(),
        });
    }

    let mut combinations: Vec<Vec<(String, String)>> = vec![vec![]];

    for dim in spec.dimensions() {
        let mut next = Vec::with_capacity(combinations.len() * dim.values.len());
        for combo in &combinations {
            for value in &dim.values {
                let mut extended = combo.clone();
                extended.push((dim.name.clone(), value.clone()));
                next.push(extended);
            }
        }
        combinations = next;
    }

    let mut variants: Vec<JobVariant> = combinations
        .into_iter()
        .map(|values| JobVariant::new(0, values))
        .filter(|v| !spec.exclude.iter().any(|ex| v.matches(ex)))
        .collect();

    for include in &spec.include {
        // Keep dimension order for the included values
        let values: Vec<(String, String)> = spec
            .dimension_names()
            .filter_map(|name| include.get(name).map(|v| (name.to_string(), v.clone())))
            .collect();

        if !variants.iter().any(|v| v.values == values) {
            variants.push(JobVariant::new(0, values));
        }
    }

    for (index, variant) in variants.iter_mut().enumerate() {
        variant.index = index;
    }

    Ok(variants)
}

fn serialize_values<S: Serializer>(
    values: &[(String, String)],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    use serde::ser::SerializeMap;

    let mut map = serializer.serialize_map(Some(values.len()))?;
    for (name, value) in values {
        map.serialize_entry(name, value)?;
    }
    map.end()
}

impl Serialize for Dimensions {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for dim in &self.0 {
            map.serialize_entry(&dim.name, &dim.values)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Dimensions {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct DimensionsVisitor;

        impl<'de> Visitor<'de> for DimensionsVisitor {
            type Value = Dimensions;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a mapping of dimension names to lists of values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut dims = Vec::new();
                while let Some((name, values)) = access.next_entry::<String, Vec<ScalarValue>>()? {
                    dims.push(Dimension {
                        name,
                        values: values.into_iter().map(|v| v.0).collect(),
                    });
                }
                Ok(Dimensions(dims))
            }
        }

        deserializer.deserialize_map(DimensionsVisitor)
    }
}

fn deserialize_assignments<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Vec<Assignment>, D::Error> {
    let raw: Vec<BTreeMap<String, ScalarValue>> = Deserialize::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .map(|entry| entry.into_iter().map(|(k, v)| (k, v.0)).collect())
        .collect())
}

/// Matrix value written as a string, integer or bool in YAML
struct ScalarValue(String);

impl<'de> Deserialize<'de> for ScalarValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match serde_yaml::Value::deserialize(deserializer)? {
            serde_yaml::Value::String(s) => Ok(Self(s)),
            serde_yaml::Value::Number(n) if n.is_i64() || n.is_u64() => Ok(Self(n.to_string())),
            // YAML reads 3.10 as the float 3.1, so versions must be quoted
            serde_yaml::Value::Number(n) => Err(serde::de::Error::custom(format!(
                "matrix value {} is not an integer; quote it (e.g. \"3.10\") to keep it as written",
                n
            ))),
            serde_yaml::Value::Bool(b) => Ok(Self(b.to_string())),
            other => Err(serde::de::Error::custom(format!(
                "matrix values must be scalars, got {:?}",
                other
            ))),
        }
    }
}
