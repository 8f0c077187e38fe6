//! Delays for the popover hide debounce

use async_trait::async_trait;

#[async_trait(?Send)]
pub trait Sleeper {
    async fn sleep(&self, ms: u64);
}

/// Tokio timer; honours a paused test clock
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[cfg(not(target_arch = "wasm32"))]
#[async_trait(?Send)]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, ms: u64) {
        tokio::time::sleep(std::time::Duration::from_millis(ms)).await;
    }
}

/// `window.setTimeout` wrapped in a promise
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone, Copy, Default)]
pub struct TimeoutSleeper;

#[cfg(target_arch = "wasm32")]
#[async_trait(?Send)]
impl Sleeper for TimeoutSleeper {
    async fn sleep(&self, ms: u64) {
        let promise = js_sys::Promise::new(&mut |resolve, _reject| {
            let scheduled = web_sys::window().map(|window| {
                window.set_timeout_with_callback_and_timeout_and_arguments_0(
                    &resolve,
                    ms.min(i32::MAX as u64) as i32,
                )
            });
            if !matches!(scheduled, Some(Ok(_))) {
                // no timer available; resolve right away
                let _ = resolve.call0(&wasm_bindgen::JsValue::NULL);
            }
        });
        let _ = wasm_bindgen_futures::JsFuture::from(promise).await;
    }
}

/// Timer of the current platform
pub fn default_sleeper() -> std::rc::Rc<dyn Sleeper> {
    #[cfg(not(target_arch = "wasm32"))]
    let sleeper = std::rc::Rc::new(TokioSleeper);
    #[cfg(target_arch = "wasm32")]
    let sleeper = std::rc::Rc::new(TimeoutSleeper);
    sleeper
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_tokio_sleeper_advances_paused_clock() {
        let start = tokio::time::Instant::now();
        TokioSleeper.sleep(10).await;
        assert!(start.elapsed() >= std::time::Duration::from_millis(10));
    }
}
