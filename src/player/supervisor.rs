// Playback supervisor - mounts the player and recovers from blocked autoplay
//
// Flow:
// 1. Classify + resolve the source, or render a terminal message and halt
// 2. Mount exactly one surface (iframe for providers, media for files)
// 3. Fire-and-forget: media play(), fullscreen + landscape on the document
// 4. After AUTOPLAY_CHECK_DELAY, check playback; if not playing show the
//    overlay and wait for one activation, then retry from that gesture

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::classifier::identify;
use super::enhance::{fullscreen_and_landscape, spawn_fullscreen_and_landscape};
use super::errors::StartupHalt;
use super::models::{FullscreenTarget, PageMessage, RecoveryState};
use super::page::DEFAULT_SOURCE_PARAM;
use super::resolver::resolve_embed;
use super::surface::PlayerSurface;
use super::traits::{MediaElement, PageHandles};

/// Delay between mounting the player and the autoplay check. Fixed.
pub const AUTOPLAY_CHECK_DELAY: Duration = Duration::from_millis(800);

/// Builds the player into the injected page handles
pub struct PlaybackSupervisor {
    page: PageHandles,
    source_param: String,
}

impl PlaybackSupervisor {
    pub fn new(page: PageHandles) -> Self {
        Self {
            page,
            source_param: DEFAULT_SOURCE_PARAM.to_string(),
        }
    }

    /// Name of the query parameter, used in the instructions message
    pub fn with_source_param(mut self, param: impl Into<String>) -> Self {
        self.source_param = param.into();
        self
    }

    /// Mount the player for `source` and start the autoplay attempt.
    ///
    /// On a halt the matching message is already rendered into the
    /// container and no surface exists. The best-effort requests are
    /// spawned onto the current Tokio runtime.
    pub async fn start(self, source: Option<&str>) -> Result<PlaybackSession, StartupHalt> {
        let started_at = Instant::now();

        let source = match source.filter(|s| !s.is_empty()) {
            Some(source) => source,
            None => return Err(self.halt(StartupHalt::MissingSource)),
        };

        let video = match identify(source) {
            Ok(video) => video,
            Err(halt) => return Err(self.halt(halt)),
        };
        let target = resolve_embed(&video);
        let surface = PlayerSurface::for_source(&video, &target);
        info!("Mounting {} player: {}", video.kind(), target);

        let media = match &surface {
            PlayerSurface::Iframe(frame) => {
                self.page.container.append_iframe(frame);
                None
            }
            PlayerSurface::Media(media) => {
                let element = self.page.container.append_media(media);
                spawn_play(element.clone());
                Some(element)
            }
        };

        spawn_fullscreen_and_landscape(self.page.viewport.clone(), FullscreenTarget::DocumentRoot);

        let (state, _) = watch::channel(RecoveryState::AttemptingAutoplay);
        Ok(PlaybackSession {
            page: self.page,
            surface,
            media,
            started_at,
            state,
        })
    }

    /// Start, then supervise until the session settles.
    pub async fn run(self, source: Option<&str>) -> Result<RecoveryState, StartupHalt> {
        let session = self.start(source).await?;
        Ok(session.supervise().await)
    }

    fn halt(&self, halt: StartupHalt) -> StartupHalt {
        if halt.is_failure() {
            warn!("Player not created: {}", halt);
        } else {
            info!("No source in '{}' parameter, showing instructions", self.source_param);
        }
        self.page
            .container
            .render_message(&PageMessage::for_halt(&halt, &self.source_param));
        halt
    }
}

/// Issue play() without waiting; rejection is expected on strict hosts
fn spawn_play(element: Arc<dyn MediaElement>) {
    tokio::spawn(async move {
        if let Err(e) = element.play().await {
            debug!("Autoplay rejected: {}", e);
        }
    });
}

/// One mounted player and its recovery state machine
pub struct PlaybackSession {
    page: PageHandles,
    surface: PlayerSurface,
    media: Option<Arc<dyn MediaElement>>,
    started_at: Instant,
    state: watch::Sender<RecoveryState>,
}

impl PlaybackSession {
    pub fn state(&self) -> RecoveryState {
        *self.state.borrow()
    }

    /// Observe state transitions
    pub fn subscribe(&self) -> watch::Receiver<RecoveryState> {
        self.state.subscribe()
    }

    pub fn surface(&self) -> &PlayerSurface {
        &self.surface
    }

    /// Run the deferred check and, if needed, the gesture-gated retry.
    ///
    /// Returns the final state, which is always `Recovered`; it is only
    /// reached after a user activation when autoplay did not start.
    pub async fn supervise(self) -> RecoveryState {
        tokio::time::sleep_until(self.started_at + AUTOPLAY_CHECK_DELAY).await;

        if self.is_playing() {
            info!("Autoplay confirmed");
            return self.transition(RecoveryState::Recovered);
        }

        info!("Autoplay not confirmed, waiting for user gesture");
        self.transition(RecoveryState::AwaitingUserGesture);
        self.page.overlay.show();

        // Whichever fires first wins; the other listener is dropped with it
        tokio::select! {
            _ = self.page.start_control.activated() => debug!("Start control activated"),
            _ = self.page.overlay.activated() => debug!("Overlay activated"),
        }
        self.page.overlay.hide();

        self.retry_from_gesture().await;
        self.transition(RecoveryState::Recovered)
    }

    /// Media: observed directly. Iframe: cross-origin, so fullscreen is the proxy.
    fn is_playing(&self) -> bool {
        match &self.media {
            Some(media) => media.snapshot().is_playing(),
            None => self.page.viewport.is_fullscreen(),
        }
    }

    async fn retry_from_gesture(&self) {
        match &self.media {
            Some(media) => {
                let play = async {
                    if let Err(e) = media.play().await {
                        debug!("play() after gesture rejected: {}", e);
                    }
                };
                let enhance =
                    fullscreen_and_landscape(self.page.viewport.as_ref(), FullscreenTarget::Player);
                tokio::join!(play, enhance);
            }
            None => {
                fullscreen_and_landscape(self.page.viewport.as_ref(), FullscreenTarget::DocumentRoot)
                    .await;
            }
        }
    }

    fn transition(&self, next: RecoveryState) -> RecoveryState {
        let previous = self.state.send_replace(next);
        debug!("Recovery state {} -> {}", previous, next);
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::headless::{AutoplayPolicy, HeadlessPage};

    fn supervisor(page: &HeadlessPage) -> PlaybackSupervisor {
        PlaybackSupervisor::new(page.handles())
    }

    fn strict_media() -> AutoplayPolicy {
        AutoplayPolicy {
            autoplay_allowed: false,
            fullscreen_without_gesture: false,
            ..AutoplayPolicy::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_source_shows_instructions() {
        let page = HeadlessPage::new(AutoplayPolicy::default());
        let result = supervisor(&page).start(None).await;

        assert!(matches!(result, Err(StartupHalt::MissingSource)));
        assert!(page.container.surfaces().is_empty());
        let message = page.container.message().unwrap();
        assert!(message.text().starts_with("No video specified"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_source_counts_as_missing() {
        let page = HeadlessPage::new(AutoplayPolicy::default());
        let result = supervisor(&page).start(Some("")).await;
        assert!(matches!(result, Err(StartupHalt::MissingSource)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unresolvable_vimeo_id_halts() {
        let page = HeadlessPage::new(AutoplayPolicy::default());
        let result = supervisor(&page).start(Some("https://vimeo.com/abcdef")).await;

        assert!(matches!(result, Err(StartupHalt::UnresolvedIdentifier(_))));
        assert!(page.container.surfaces().is_empty());
        assert_eq!(page.container.html(), "Could not extract Vimeo video ID.");
        assert_eq!(page.viewport.fullscreen_requests(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_youtube_mounts_iframe() {
        let page = HeadlessPage::new(AutoplayPolicy::default());
        let session = supervisor(&page)
            .start(Some("https://youtu.be/dQw4w9WgXcQ"))
            .await
            .unwrap();

        assert_eq!(session.state(), RecoveryState::AttemptingAutoplay);
        assert_eq!(
            session.surface().src(),
            "https://www.youtube.com/embed/dQw4w9WgXcQ?autoplay=1&playsinline=1&rel=0&modestbranding=1&mute=1"
        );
        let surfaces = page.container.surfaces();
        assert_eq!(surfaces.len(), 1);
        assert!(matches!(surfaces[0], PlayerSurface::Iframe(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_direct_file_mounts_media_with_exact_src() {
        let page = HeadlessPage::new(AutoplayPolicy::default());
        let session = supervisor(&page)
            .start(Some("https://example.com/clip.mp4"))
            .await
            .unwrap();

        match session.surface() {
            PlayerSurface::Media(media) => assert_eq!(media.src, "https://example.com/clip.mp4"),
            other => panic!("expected media surface, got {:?}", other),
        }
        assert!(page.container.media().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_autoplay_confirmed_for_media() {
        let page = HeadlessPage::new(AutoplayPolicy::default());
        let session = supervisor(&page)
            .start(Some("https://example.com/clip.mp4"))
            .await
            .unwrap();

        assert_eq!(session.supervise().await, RecoveryState::Recovered);
        assert!(!page.overlay.is_visible());
        assert_eq!(page.container.media().unwrap().play_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_iframe_with_fullscreen_counts_as_playing() {
        let page = HeadlessPage::new(AutoplayPolicy::default());
        let session = supervisor(&page)
            .start(Some("https://vimeo.com/76979871"))
            .await
            .unwrap();

        assert_eq!(session.supervise().await, RecoveryState::Recovered);
        assert!(!page.overlay.is_visible());
        assert_eq!(page.viewport.fullscreen_element(), Some(FullscreenTarget::DocumentRoot));
    }

    #[tokio::test(start_paused = true)]
    async fn test_check_runs_after_fixed_delay() {
        let page = HeadlessPage::new(strict_media());
        let session = supervisor(&page)
            .start(Some("https://example.com/clip.mp4"))
            .await
            .unwrap();
        let mut states = session.subscribe();
        let handle = tokio::spawn(session.supervise());

        tokio::time::sleep(AUTOPLAY_CHECK_DELAY - Duration::from_millis(1)).await;
        assert_eq!(*states.borrow_and_update(), RecoveryState::AttemptingAutoplay);
        assert!(!page.overlay.is_visible());

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(*states.borrow_and_update(), RecoveryState::AwaitingUserGesture);
        assert!(page.overlay.is_visible());

        page.overlay.click();
        assert_eq!(handle.await.unwrap(), RecoveryState::Recovered);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rejected_autoplay_recovers_from_start_control() {
        let page = HeadlessPage::new(strict_media());
        let session = supervisor(&page)
            .start(Some("https://example.com/clip.mp4"))
            .await
            .unwrap();
        let handle = tokio::spawn(session.supervise());

        tokio::time::sleep(AUTOPLAY_CHECK_DELAY + Duration::from_millis(1)).await;
        let media = page.container.media().unwrap();
        assert_eq!(media.play_calls(), 1);
        assert!(page.overlay.is_visible());
        assert_eq!(page.start_control.listener_count(), 1);
        assert_eq!(page.overlay.listener_count(), 1);

        page.start_control.click();
        assert_eq!(handle.await.unwrap(), RecoveryState::Recovered);

        assert!(!page.overlay.is_visible());
        assert_eq!(media.play_calls(), 2);
        assert!(!media.snapshot().paused);
        assert_eq!(page.viewport.fullscreen_element(), Some(FullscreenTarget::Player));
        assert_eq!(page.start_control.listener_count(), 0);
        assert_eq!(page.overlay.listener_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_activation_has_no_effect() {
        let page = HeadlessPage::new(strict_media());
        let session = supervisor(&page)
            .start(Some("https://example.com/clip.mp4"))
            .await
            .unwrap();
        let handle = tokio::spawn(session.supervise());

        tokio::time::sleep(AUTOPLAY_CHECK_DELAY + Duration::from_millis(1)).await;
        page.overlay.click();
        handle.await.unwrap();

        let media = page.container.media().unwrap();
        let requests = page.viewport.fullscreen_requests();
        assert_eq!(media.play_calls(), 2);

        page.overlay.click();
        page.start_control.click();
        tokio::time::sleep(Duration::from_secs(5)).await;

        assert_eq!(media.play_calls(), 2);
        assert_eq!(page.viewport.fullscreen_requests(), requests);
        assert!(!page.overlay.is_visible());
    }

    #[tokio::test(start_paused = true)]
    async fn test_iframe_retry_targets_document() {
        let page = HeadlessPage::new(AutoplayPolicy {
            fullscreen_without_gesture: false,
            orientation_lock_supported: false,
            ..AutoplayPolicy::default()
        });
        let session = supervisor(&page)
            .start(Some("https://www.youtube.com/watch?v=dQw4w9WgXcQ"))
            .await
            .unwrap();
        let handle = tokio::spawn(session.supervise());

        tokio::time::sleep(AUTOPLAY_CHECK_DELAY + Duration::from_millis(1)).await;
        assert!(page.overlay.is_visible());
        assert!(page.viewport.fullscreen_element().is_none());

        page.start_control.click();
        assert_eq!(handle.await.unwrap(), RecoveryState::Recovered);
        assert_eq!(page.viewport.fullscreen_element(), Some(FullscreenTarget::DocumentRoot));
    }

    #[tokio::test(start_paused = true)]
    async fn test_gesture_during_delay_does_not_skip_check() {
        let page = HeadlessPage::new(strict_media());
        let session = supervisor(&page)
            .start(Some("https://example.com/clip.mp4"))
            .await
            .unwrap();
        let mut states = session.subscribe();
        let handle = tokio::spawn(session.supervise());

        tokio::time::sleep(AUTOPLAY_CHECK_DELAY / 2).await;
        page.start_control.click();
        page.overlay.click();
        tokio::task::yield_now().await;

        assert_eq!(*states.borrow_and_update(), RecoveryState::AttemptingAutoplay);
        assert!(!page.overlay.is_visible());
        assert_eq!(page.start_control.listener_count(), 0);
        assert_eq!(page.overlay.listener_count(), 0);

        tokio::time::sleep(AUTOPLAY_CHECK_DELAY / 2 + Duration::from_millis(1)).await;
        let media = page.container.media().unwrap();
        assert_eq!(media.play_calls(), 1);
        assert_eq!(*states.borrow_and_update(), RecoveryState::AwaitingUserGesture);
        assert!(page.overlay.is_visible());
        assert_eq!(page.start_control.listener_count(), 1);
        assert_eq!(page.overlay.listener_count(), 1);

        page.overlay.click();
        assert_eq!(handle.await.unwrap(), RecoveryState::Recovered);
        assert!(!page.overlay.is_visible());
        assert_eq!(media.play_calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ended_media_is_not_playing() {
        let page = HeadlessPage::new(AutoplayPolicy::default());
        let session = supervisor(&page)
            .start(Some("https://example.com/clip.mp4"))
            .await
            .unwrap();
        let handle = tokio::spawn(session.supervise());

        tokio::time::sleep(Duration::from_millis(100)).await;
        let media = page.container.media().unwrap();
        assert!(media.snapshot().is_playing());
        media.finish();

        tokio::time::sleep(AUTOPLAY_CHECK_DELAY).await;
        assert!(page.overlay.is_visible());

        page.start_control.click();
        assert_eq!(handle.await.unwrap(), RecoveryState::Recovered);
        assert!(!media.snapshot().ended);
        assert_eq!(media.play_calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_iframe_that_left_fullscreen_is_not_playing() {
        let page = HeadlessPage::new(AutoplayPolicy::default());
        let session = supervisor(&page)
            .start(Some("https://vimeo.com/76979871"))
            .await
            .unwrap();
        let handle = tokio::spawn(session.supervise());

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(page.viewport.fullscreen_element(), Some(FullscreenTarget::DocumentRoot));
        page.viewport.exit_fullscreen();

        tokio::time::sleep(AUTOPLAY_CHECK_DELAY).await;
        assert!(page.overlay.is_visible());
        assert!(page.viewport.fullscreen_element().is_none());

        page.overlay.click();
        assert_eq!(handle.await.unwrap(), RecoveryState::Recovered);
        assert_eq!(page.viewport.fullscreen_element(), Some(FullscreenTarget::DocumentRoot));
    }

    #[tokio::test(start_paused = true)]
    async fn test_custom_param_in_instructions() {
        let page = HeadlessPage::new(AutoplayPolicy::default());
        let result = supervisor(&page).with_source_param("src").start(None).await;
        assert!(result.is_err());
        assert!(page.container.message().unwrap().text().contains("?src=<URL>"));
    }
}
