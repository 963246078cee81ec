//! Operation table and by-name dispatch for [`ManagedChannelBuilder`]

use crate::builder::{dispatch_fluent, ManagedChannelBuilder, OPERATIONS};
use crate::channel::ChannelHandle;
use crate::error::ChannelError;
use std::sync::Arc;
use tether_domain::{Args, Dispatch, DispatchError, Interface, OperationDescriptor, Returned, Value};

/// Marker type standing for the [`ManagedChannelBuilder`] interface
#[derive(Debug, Clone, Copy, Default)]
pub struct ChannelBuilderInterface;

impl Interface for ChannelBuilderInterface {
    type Product = ChannelHandle;

    const NAME: &'static str = "ManagedChannelBuilder";

    fn operations() -> &'static [OperationDescriptor] {
        OPERATIONS
    }

    fn same_product(a: &ChannelHandle, b: &ChannelHandle) -> bool {
        Arc::ptr_eq(a, b)
    }
}

impl<B: ManagedChannelBuilder> Dispatch<B> for ChannelBuilderInterface {
    type Error = ChannelError;

    fn dispatch(
        target: &mut B,
        operation: &OperationDescriptor,
        args: &[Value],
    ) -> Result<Returned<ChannelHandle>, ChannelError> {
        let args = Args::new(operation, args)?;

        if operation.name == "build" {
            return target.build().map(Returned::Product);
        }
        match dispatch_fluent(target, operation.name, &args)? {
            Some(addr) => Ok(Returned::Builder(addr)),
            None => Err(DispatchError::UnknownOperation(operation.name.to_string()).into()),
        }
    }
}
