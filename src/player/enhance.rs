// Best-effort fullscreen + landscape lock
//
// Both requests usually need a user gesture on mobile. Failures are logged
// at debug level and never change the recovery state.

use std::sync::Arc;
use tracing::debug;

use super::errors::EnhancementError;
use super::models::{FullscreenTarget, OrientationLock};
use super::traits::Viewport;

/// Outcome of one enhancement attempt. Safe to drop unread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnhancementReport {
    /// `None` when fullscreen was already active and nothing was requested
    pub fullscreen: Option<Result<(), EnhancementError>>,
    pub orientation: Result<(), EnhancementError>,
}

impl EnhancementReport {
    pub fn fully_applied(&self) -> bool {
        !matches!(self.fullscreen, Some(Err(_))) && self.orientation.is_ok()
    }
}

/// Request fullscreen on `target`, then lock landscape.
///
/// The two steps are independent: a rejected fullscreen request does not
/// skip the orientation lock.
pub async fn fullscreen_and_landscape(
    viewport: &dyn Viewport,
    target: FullscreenTarget,
) -> EnhancementReport {
    let fullscreen = if viewport.is_fullscreen() {
        None
    } else {
        let result = viewport.request_fullscreen(target).await;
        if let Err(e) = &result {
            debug!("Fullscreen request on {:?} failed: {}", target, e);
        }
        Some(result)
    };

    let orientation = viewport.lock_orientation(OrientationLock::Landscape).await;
    if let Err(e) = &orientation {
        debug!(
            "Orientation lock to {} failed: {}",
            OrientationLock::Landscape.as_str(),
            e
        );
    }

    EnhancementReport {
        fullscreen,
        orientation,
    }
}

/// Fire-and-forget variant; the spawned task never reports back.
pub fn spawn_fullscreen_and_landscape(viewport: Arc<dyn Viewport>, target: FullscreenTarget) {
    tokio::spawn(async move {
        let report = fullscreen_and_landscape(viewport.as_ref(), target).await;
        if report.fully_applied() {
            debug!("Fullscreen on {:?} with landscape lock applied", target);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::headless::{AutoplayPolicy, HeadlessPage};

    #[tokio::test]
    async fn test_blocked_fullscreen_still_tries_orientation() {
        let page = HeadlessPage::new(AutoplayPolicy {
            fullscreen_without_gesture: false,
            ..AutoplayPolicy::default()
        });

        let report = fullscreen_and_landscape(page.viewport.as_ref(), FullscreenTarget::DocumentRoot).await;
        assert!(matches!(report.fullscreen, Some(Err(EnhancementError::Rejected(_)))));
        assert!(report.orientation.is_ok());
        assert!(!report.fully_applied());
        assert_eq!(page.viewport.orientation(), Some(OrientationLock::Landscape));
    }

    #[tokio::test]
    async fn test_missing_orientation_api_is_absorbed() {
        let page = HeadlessPage::new(AutoplayPolicy {
            orientation_lock_supported: false,
            ..AutoplayPolicy::default()
        });

        let report = fullscreen_and_landscape(page.viewport.as_ref(), FullscreenTarget::DocumentRoot).await;
        assert_eq!(report.fullscreen, Some(Ok(())));
        assert!(matches!(report.orientation, Err(EnhancementError::Unsupported(_))));
    }

    #[tokio::test]
    async fn test_already_fullscreen_skips_request() {
        let page = HeadlessPage::new(AutoplayPolicy::default());
        let first = fullscreen_and_landscape(page.viewport.as_ref(), FullscreenTarget::DocumentRoot).await;
        assert!(first.fully_applied());

        let second = fullscreen_and_landscape(page.viewport.as_ref(), FullscreenTarget::Player).await;
        assert_eq!(second.fullscreen, None);
        assert_eq!(page.viewport.fullscreen_element(), Some(FullscreenTarget::DocumentRoot));
    }
}
