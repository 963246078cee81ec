//! Operation descriptors for configurable interfaces

use crate::value::{ParamType, Precondition};
use std::fmt;

/// One parameter of an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamSpec {
    /// Parameter name, for diagnostics
    pub name: &'static str,

    /// Parameter type
    pub ty: ParamType,

    /// Documented precondition, if any
    pub precondition: Option<Precondition>,
}

impl ParamSpec {
    /// Create an unconstrained parameter
    pub const fn new(name: &'static str, ty: ParamType) -> Self {
        Self {
            name,
            ty,
            precondition: None,
        }
    }

    /// Attach a documented precondition
    pub const fn requiring(self, precondition: Precondition) -> Self {
        Self {
            precondition: Some(precondition),
            ..self
        }
    }
}

/// Whether an operation configures the builder or produces a product
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    /// Returns the builder itself
    Fluent,

    /// Produces the final product (e.g. `build`)
    Terminal,
}

/// Static description of an interface operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationDescriptor {
    /// Operation name
    pub name: &'static str,

    /// Ordered parameters
    pub params: &'static [ParamSpec],

    /// Fluent or terminal
    pub kind: OperationKind,
}

impl OperationDescriptor {
    /// Describe a fluent setter
    pub const fn fluent(name: &'static str, params: &'static [ParamSpec]) -> Self {
        Self {
            name,
            params,
            kind: OperationKind::Fluent,
        }
    }

    /// Describe a terminal operation
    pub const fn terminal(name: &'static str, params: &'static [ParamSpec]) -> Self {
        Self {
            name,
            params,
            kind: OperationKind::Terminal,
        }
    }

    /// Returns `true` if the operation returns the builder itself
    pub fn is_fluent(&self) -> bool {
        self.kind == OperationKind::Fluent
    }

    /// Parameter-type signature
    pub fn signature(&self) -> Vec<ParamType> {
        self.params.iter().map(|p| p.ty).collect()
    }

    /// Identifier (name plus signature)
    pub fn id(&self) -> OperationId {
        OperationId::new(self.name, self.signature())
    }
}

impl fmt::Display for OperationDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.id().fmt(f)
    }
}

/// Identifies an operation by name and parameter-type signature
///
/// Two operations sharing a name but not a signature are distinct.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OperationId {
    name: String,
    params: Vec<ParamType>,
}

impl OperationId {
    /// Create an identifier
    pub fn new(name: impl Into<String>, params: impl IntoIterator<Item = ParamType>) -> Self {
        Self {
            name: name.into(),
            params: params.into_iter().collect(),
        }
    }

    /// Operation name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parameter-type signature
    pub fn params(&self) -> &[ParamType] {
        &self.params
    }

    /// Returns `true` if this id names the given descriptor
    pub fn identifies(&self, op: &OperationDescriptor) -> bool {
        self.name == op.name
            && self.params.len() == op.params.len()
            && self.params.iter().zip(op.params).all(|(t, p)| *t == p.ty)
    }
}

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, ty) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", ty)?;
        }
        f.write_str(")")
    }
}
