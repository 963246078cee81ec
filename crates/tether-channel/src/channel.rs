//! The product of a channel builder

use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// A built, managed RPC channel
///
/// Only the lifecycle surface is modelled here; issuing calls belongs to the
/// transport behind each implementation.
pub trait ManagedChannel: fmt::Debug + Send + Sync {
    /// Authority (`host:port`) the channel presents to servers
    fn authority(&self) -> String;

    /// Largest inbound message the channel accepts, if it enforces one
    fn max_inbound_message_size(&self) -> Option<i32> {
        None
    }

    /// Stop accepting new calls
    ///
    /// Idempotent.
    fn shutdown(&self);

    /// Returns `true` once [`ManagedChannel::shutdown`] has been called
    fn is_shutdown(&self) -> bool;

    /// The concrete channel, for [`downcast_ref`](dyn ManagedChannel::downcast_ref)
    fn as_any(&self) -> &dyn Any;
}

impl dyn ManagedChannel {
    /// The concrete channel behind a handle, if it is a `T`
    ///
    /// Decorating channels are not seen through; unwrap them first.
    pub fn downcast_ref<T: ManagedChannel + 'static>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    /// Returns `true` if the concrete channel is a `T`
    pub fn is<T: ManagedChannel + 'static>(&self) -> bool {
        self.as_any().is::<T>()
    }
}

/// Shared handle to a built channel
///
/// Builders hand out handles; two handles name the same channel exactly when
/// [`Arc::ptr_eq`] holds.
pub type ChannelHandle = Arc<dyn ManagedChannel>;
