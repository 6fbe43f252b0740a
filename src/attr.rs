//! Typed per-entity attributes.
//!
//! Every entity kind (vertex, edge, loop, face) carries a name-to-value
//! attribute map, and the mesh keeps one [`AttributeRegistry`] per kind. A
//! registered attribute is guaranteed present on every entity of its kind:
//! registration back-fills existing entities and entity creation runs the
//! registry's ensure cycle. Names that were never registered may still be
//! attached to individual entities ad hoc; the registry neither enforces
//! nor cleans those.
//!
//! Values are flat fixed-dimension arrays of either 32-bit signed integers
//! or IEEE-754 32-bit floats, modeled as a tagged sum.

use std::collections::HashMap;

/// The scalar kind of an attribute value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeBaseType {
    /// 32-bit signed integers.
    Int,
    /// IEEE-754 32-bit floats.
    Float,
}

/// A flat, fixed-dimension attribute value.
///
/// Deep copy is `Clone`; the backing storage is an owned vector either way.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    /// An array of 32-bit signed integers.
    Int(Vec<i32>),
    /// An array of IEEE-754 32-bit floats.
    Float(Vec<f32>),
}

impl AttributeValue {
    /// A zero-filled value of the given type and dimension.
    pub fn zeroed(base_type: AttributeBaseType, dimensions: usize) -> Self {
        match base_type {
            AttributeBaseType::Int => AttributeValue::Int(vec![0; dimensions]),
            AttributeBaseType::Float => AttributeValue::Float(vec![0.0; dimensions]),
        }
    }

    /// The scalar kind of this value.
    pub fn base_type(&self) -> AttributeBaseType {
        match self {
            AttributeValue::Int(_) => AttributeBaseType::Int,
            AttributeValue::Float(_) => AttributeBaseType::Float,
        }
    }

    /// The number of scalars in this value.
    pub fn len(&self) -> usize {
        match self {
            AttributeValue::Int(values) => values.len(),
            AttributeValue::Float(values) => values.len(),
        }
    }

    /// Whether the value holds no scalars.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check this value against a registered type and dimension.
    pub fn matches(&self, base_type: AttributeBaseType, dimensions: usize) -> bool {
        self.base_type() == base_type && self.len() == dimensions
    }

    /// Borrow the integer data, or `None` for a float value.
    pub fn as_int(&self) -> Option<&[i32]> {
        match self {
            AttributeValue::Int(values) => Some(values),
            AttributeValue::Float(_) => None,
        }
    }

    /// Borrow the float data, or `None` for an integer value.
    pub fn as_float(&self) -> Option<&[f32]> {
        match self {
            AttributeValue::Float(values) => Some(values),
            AttributeValue::Int(_) => None,
        }
    }

    /// Euclidean distance between two values of the same type and
    /// dimension. Any type or dimension mismatch yields positive infinity.
    pub fn distance(&self, other: &AttributeValue) -> f32 {
        match (self, other) {
            (AttributeValue::Int(a), AttributeValue::Int(b)) if a.len() == b.len() => a
                .iter()
                .zip(b)
                .map(|(x, y)| {
                    let d = (x - y) as f32;
                    d * d
                })
                .sum::<f32>()
                .sqrt(),
            (AttributeValue::Float(a), AttributeValue::Float(b)) if a.len() == b.len() => a
                .iter()
                .zip(b)
                .map(|(x, y)| (x - y) * (x - y))
                .sum::<f32>()
                .sqrt(),
            _ => f32::INFINITY,
        }
    }
}

/// A named, typed attribute declaration.
///
/// The `default` field is public on purpose: the mesh's `add_*_attribute`
/// methods return a mutable borrow of the registered definition so callers
/// can adjust the default that subsequent entities receive. The default is
/// deep-copied into each entity, so editing it never retro-mutates values
/// already installed.
#[derive(Debug, Clone)]
pub struct AttributeDefinition {
    name: String,
    base_type: AttributeBaseType,
    dimensions: usize,
    /// The value installed on entities that do not carry this attribute yet.
    pub default: AttributeValue,
}

impl AttributeDefinition {
    /// Declare an attribute with a zero-filled default.
    ///
    /// Panics if `dimensions` is zero.
    pub fn new(
        name: impl Into<String>,
        base_type: AttributeBaseType,
        dimensions: usize,
    ) -> Self {
        assert!(dimensions >= 1, "attributes must have at least one dimension");
        Self {
            name: name.into(),
            base_type,
            dimensions,
            default: AttributeValue::zeroed(base_type, dimensions),
        }
    }

    /// Replace the default value.
    ///
    /// Panics if the value does not match the declared type and dimension.
    pub fn with_default(mut self, default: AttributeValue) -> Self {
        assert!(
            default.matches(self.base_type, self.dimensions),
            "default value does not match the declared type and dimension"
        );
        self.default = default;
        self
    }

    /// The attribute's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The attribute's scalar kind.
    pub fn base_type(&self) -> AttributeBaseType {
        self.base_type
    }

    /// The attribute's dimension count.
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }
}

/// The ordered list of attribute definitions for one entity kind.
#[derive(Debug, Clone)]
pub struct AttributeRegistry {
    definitions: Vec<AttributeDefinition>,
    kind: &'static str,
}

impl AttributeRegistry {
    pub(crate) fn new(kind: &'static str) -> Self {
        Self {
            definitions: Vec::new(),
            kind,
        }
    }

    /// Whether an attribute with the given name is registered.
    pub fn has(&self, name: &str) -> bool {
        self.definitions.iter().any(|def| def.name == name)
    }

    /// Look up a definition by name.
    pub fn get(&self, name: &str) -> Option<&AttributeDefinition> {
        self.definitions.iter().find(|def| def.name == name)
    }

    /// All registered definitions, in registration order.
    pub fn definitions(&self) -> &[AttributeDefinition] {
        &self.definitions
    }

    /// Register a definition and return a mutable borrow of the stored one.
    ///
    /// If the name is already taken, the registry is left unchanged and the
    /// previously registered definition is returned; the duplicate argument
    /// is discarded.
    pub(crate) fn register(&mut self, definition: AttributeDefinition) -> &mut AttributeDefinition {
        if let Some(position) = self
            .definitions
            .iter()
            .position(|def| def.name == definition.name)
        {
            return &mut self.definitions[position];
        }
        self.definitions.push(definition);
        let last = self.definitions.len() - 1;
        &mut self.definitions[last]
    }

    /// Bring an entity's attribute map up to date with the registry.
    ///
    /// Missing registered names get a deep-copied default. A present value
    /// of the wrong type or dimension is reported on the log channel and
    /// overwritten with the default; this is the only recoverable failure
    /// path in the crate. Ad-hoc names are left alone.
    pub(crate) fn ensure(&self, attributes: &mut HashMap<String, AttributeValue>) {
        for def in &self.definitions {
            match attributes.get(&def.name) {
                Some(value) if value.matches(def.base_type, def.dimensions) => {}
                Some(value) => {
                    log::warn!(
                        "{} attribute `{}` has type {:?}[{}], expected {:?}[{}]; resetting to default",
                        self.kind,
                        def.name,
                        value.base_type(),
                        value.len(),
                        def.base_type,
                        def.dimensions,
                    );
                    attributes.insert(def.name.clone(), def.default.clone());
                }
                None => {
                    attributes.insert(def.name.clone(), def.default.clone());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zeroed_value() {
        assert_eq!(
            AttributeValue::zeroed(AttributeBaseType::Int, 2),
            AttributeValue::Int(vec![0, 0])
        );
        assert_eq!(
            AttributeValue::zeroed(AttributeBaseType::Float, 3),
            AttributeValue::Float(vec![0.0, 0.0, 0.0])
        );
    }

    #[test]
    fn test_distance() {
        let a = AttributeValue::Float(vec![1.0, 0.0]);
        let b = AttributeValue::Float(vec![1.0, 2.0]);
        assert_eq!(a.distance(&b), 2.0);

        let c = AttributeValue::Int(vec![3, 0]);
        let d = AttributeValue::Int(vec![0, 4]);
        assert_eq!(c.distance(&d), 5.0);
    }

    #[test]
    fn test_distance_mismatch_is_infinite() {
        let int2 = AttributeValue::Int(vec![0, 0]);
        let float2 = AttributeValue::Float(vec![0.0, 0.0]);
        let float3 = AttributeValue::Float(vec![0.0, 0.0, 0.0]);

        assert_eq!(int2.distance(&float2), f32::INFINITY);
        assert_eq!(float2.distance(&float3), f32::INFINITY);
    }

    #[test]
    #[should_panic(expected = "does not match")]
    fn test_with_default_rejects_mismatch() {
        let _ = AttributeDefinition::new("uv", AttributeBaseType::Float, 2)
            .with_default(AttributeValue::Int(vec![0, 0]));
    }

    #[test]
    fn test_ensure_backfills_missing() {
        let mut registry = AttributeRegistry::new("vertex");
        registry.register(
            AttributeDefinition::new("flag", AttributeBaseType::Int, 1)
                .with_default(AttributeValue::Int(vec![42])),
        );

        let mut attributes = HashMap::new();
        registry.ensure(&mut attributes);
        assert_eq!(attributes["flag"], AttributeValue::Int(vec![42]));
    }

    #[test]
    fn test_ensure_resets_wrong_type() {
        let mut registry = AttributeRegistry::new("vertex");
        registry.register(
            AttributeDefinition::new("flag", AttributeBaseType::Int, 1)
                .with_default(AttributeValue::Int(vec![42])),
        );

        let mut attributes = HashMap::new();
        attributes.insert(
            "flag".to_owned(),
            AttributeValue::Float(vec![1.0, 2.0, 3.0]),
        );
        registry.ensure(&mut attributes);
        assert_eq!(attributes["flag"], AttributeValue::Int(vec![42]));
    }

    #[test]
    fn test_ensure_leaves_adhoc_names_alone() {
        let registry = AttributeRegistry::new("vertex");
        let mut attributes = HashMap::new();
        attributes.insert("scratch".to_owned(), AttributeValue::Int(vec![7]));
        registry.ensure(&mut attributes);
        assert_eq!(attributes["scratch"], AttributeValue::Int(vec![7]));
    }

    #[test]
    fn test_duplicate_registration_keeps_original() {
        let mut registry = AttributeRegistry::new("face");
        registry.register(
            AttributeDefinition::new("weight", AttributeBaseType::Float, 1)
                .with_default(AttributeValue::Float(vec![1.0])),
        );
        let stored = registry.register(
            AttributeDefinition::new("weight", AttributeBaseType::Float, 1)
                .with_default(AttributeValue::Float(vec![9.0])),
        );

        assert_eq!(stored.default, AttributeValue::Float(vec![1.0]));
        assert_eq!(registry.definitions().len(), 1);
    }
}
