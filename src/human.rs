use std::time::Duration;

use rand::Rng;
use tracing::debug;

use crate::browser::PageHandle;

const SCROLL_STEPS: (u32, u32) = (3, 5);
const SCROLL_STEP_PX: (u32, u32) = (250, 650);
const SCROLL_PAUSE_MS: (u64, u64) = (250, 600);

/// Sleeps for a uniformly random duration in `[min_ms, max_ms]`.
pub async fn human_delay(min_ms: u64, max_ms: u64) {
    let (low, high) = if min_ms <= max_ms {
        (min_ms, max_ms)
    } else {
        (max_ms, min_ms)
    };
    let ms = rand::rng().random_range(low..=high);
    tokio::time::sleep(Duration::from_millis(ms)).await;
}

/// Scrolls down in a few uneven steps with pauses in between, so lazy
/// sections load the way they would for a reader.
pub async fn human_scroll(page: &dyn PageHandle) {
    let steps = rand::rng().random_range(SCROLL_STEPS.0..=SCROLL_STEPS.1);

    for step in 0..steps {
        let distance = rand::rng().random_range(SCROLL_STEP_PX.0..=SCROLL_STEP_PX.1);
        let script = format!("window.scrollBy(0, {distance})");

        if let Err(e) = page.evaluate(&script).await {
            debug!(step, "scroll stopped: {e}");
            return;
        }

        human_delay(SCROLL_PAUSE_MS.0, SCROLL_PAUSE_MS.1).await;
    }
}
