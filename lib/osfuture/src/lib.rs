#![cfg_attr(not(test), no_std)]
extern crate alloc;

use alloc::{boxed::Box, sync::Arc, task::Wake};
use core::task::{Context, Poll};

/// `BlockWaker` is a structure which implements Wake trait.
/// It means that this waker can be passed in context as a
/// waker and when it is called, it can act as its pre-set
/// action and not act by default.
struct BlockWaker;

impl Wake for BlockWaker {
    fn wake(self: Arc<Self>) {
        log::trace!("block waker wakes");
    }
}

/// Run a future to completion on the current thread.
/// Note that since this function is used in kernel mode,
/// we won't switch thread when the inner future pending.
/// Instead, we just poll the inner future again and again.
pub fn block_on<T>(fut: impl Future<Output = T>) -> T {
    let mut fut = Box::pin(fut);

    let waker = Arc::new(BlockWaker).into();
    let mut cx = Context::from_waker(&waker);

    loop {
        match fut.as_mut().poll(&mut cx) {
            Poll::Ready(res) => return res,
            Poll::Pending => continue,
        }
    }
}
