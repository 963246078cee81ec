//! Trait definitions for configurable interfaces
//!
//! These traits define the boundary between the verifier and a concrete
//! builder interface. Concrete interfaces live in other crates
//! (tether-channel).

use crate::operation::{OperationDescriptor, OperationId};
use crate::value::Value;

/// A configurable interface described as data
///
/// Implemented by a marker type standing for a builder trait. The operation
/// table lists exactly the operations declared on that trait, in a stable
/// order; operations inherited from broader capabilities are not listed.
pub trait Interface {
    /// What the terminal operation produces
    type Product;

    /// Interface name, for diagnostics
    const NAME: &'static str;

    /// Every operation declared directly on the interface
    fn operations() -> &'static [OperationDescriptor];

    /// Reference identity between two products
    fn same_product(a: &Self::Product, b: &Self::Product) -> bool;

    /// Find an operation by id
    fn find(id: &OperationId) -> Option<&'static OperationDescriptor> {
        Self::operations().iter().find(|op| id.identifies(op))
    }

    /// Fluent operations only
    fn fluent_operations() -> impl Iterator<Item = &'static OperationDescriptor> {
        Self::operations().iter().filter(|op| op.is_fluent())
    }
}

/// Address of a live instance, used for reference-identity checks
///
/// Only ever compared; never turned back into a pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InstanceAddr(usize);

impl InstanceAddr {
    /// Address of the value behind `r`
    pub fn of<T: ?Sized>(r: &T) -> Self {
        Self(std::ptr::from_ref(r).cast::<()>() as usize)
    }
}

/// What an invoked operation handed back to its caller
#[derive(Debug, Clone)]
pub enum Returned<P> {
    /// A fluent operation returned this reference
    Builder(InstanceAddr),

    /// A terminal operation produced this product
    Product(P),
}

impl<P> Returned<P> {
    /// Returns `true` if the operation returned the instance at `addr`
    pub fn is_instance(&self, addr: InstanceAddr) -> bool {
        matches!(self, Returned::Builder(a) if *a == addr)
    }

    /// The produced product, if any
    pub fn into_product(self) -> Option<P> {
        match self {
            Returned::Product(p) => Some(p),
            Returned::Builder(_) => None,
        }
    }
}

/// Invoke an interface operation by descriptor on a target of type `B`
///
/// Implemented by the interface marker for every implementor of the
/// interface's builder trait, so wrappers, delegates and concrete builders
/// can all be driven by name.
pub trait Dispatch<B: ?Sized>: Interface {
    /// Error raised by the underlying operation
    type Error: std::error::Error + Send + Sync + 'static;

    /// Call `operation` on `target` with `args`
    fn dispatch(
        target: &mut B,
        operation: &OperationDescriptor,
        args: &[Value],
    ) -> Result<Returned<Self::Product>, Self::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instance_addr_identity() {
        let a = String::from("a");
        let b = String::from("a");
        assert_eq!(InstanceAddr::of(&a), InstanceAddr::of(&a));
        assert_ne!(InstanceAddr::of(&a), InstanceAddr::of(&b));
    }

    #[test]
    fn test_returned_is_instance() {
        let x = 5u8;
        let returned: Returned<()> = Returned::Builder(InstanceAddr::of(&x));
        assert!(returned.is_instance(InstanceAddr::of(&x)));
        assert!(returned.into_product().is_none());

        let product: Returned<u8> = Returned::Product(7);
        assert!(!product.is_instance(InstanceAddr::of(&x)));
        assert_eq!(product.into_product(), Some(7));
    }
}
