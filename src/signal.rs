use std::future::{self, Future};
use std::pin::Pin;
use std::task::Poll;

pub type Interrupt = Pin<Box<dyn Future<Output = ()> + Send>>;

/// Listen for Ctrl+C. The handler is already installed when this returns, so
/// a signal arriving before the loop first waits still resolves the future
/// instead of killing the process. Never resolves if installation fails.
pub async fn ctrl_c() -> Interrupt {
    let mut interrupt: Interrupt = Box::pin(async {
        if tokio::signal::ctrl_c().await.is_err() {
            future::pending::<()>().await;
        }
    });

    // First poll registers the handler
    let fired = future::poll_fn(|cx| Poll::Ready(interrupt.as_mut().poll(cx).is_ready())).await;
    if fired {
        return Box::pin(future::ready(()));
    }
    interrupt
}
