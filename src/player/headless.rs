// Headless page - in-memory implementation of every page seam
//
// Models the parts of a browser the supervisor depends on: an autoplay
// policy, sticky user activation (set by the first click), fullscreen and
// orientation APIs, and the container / overlay / start control elements.
// Used by the CLI dry run and by the tests.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::Notify;
use tokio::time::Instant;

use super::errors::{EnhancementError, PlaybackError};
use super::models::{FullscreenTarget, OrientationLock, PageMessage, PlaybackSnapshot};
use super::surface::{IframeSurface, MediaSurface, PlayerSurface};
use super::traits::{Activatable, MediaElement, Overlay, PageHandles, PlayerContainer, Viewport};

/// What the simulated browser allows before a user gesture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoplayPolicy {
    /// Muted media may start without a gesture
    pub autoplay_allowed: bool,
    /// Fullscreen may be requested without a gesture
    pub fullscreen_without_gesture: bool,
    /// Fullscreen API exists at all
    pub fullscreen_supported: bool,
    /// `screen.orientation.lock` exists
    pub orientation_lock_supported: bool,
}

impl AutoplayPolicy {
    /// Mobile-Safari-like host: nothing starts without a tap
    pub fn strict() -> Self {
        Self {
            autoplay_allowed: false,
            fullscreen_without_gesture: false,
            fullscreen_supported: true,
            orientation_lock_supported: false,
        }
    }
}

impl Default for AutoplayPolicy {
    fn default() -> Self {
        Self {
            autoplay_allowed: true,
            fullscreen_without_gesture: true,
            fullscreen_supported: true,
            orientation_lock_supported: true,
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Sticky user activation shared by all elements of a page
#[derive(Debug, Default)]
struct UserActivation(AtomicBool);

impl UserActivation {
    fn activate(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    fn is_active(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Decrements the listener count when an activation wait is dropped
struct ListenerGuard<'a>(&'a AtomicUsize);

impl<'a> ListenerGuard<'a> {
    fn attach(count: &'a AtomicUsize) -> Self {
        count.fetch_add(1, Ordering::SeqCst);
        Self(count)
    }
}

impl Drop for ListenerGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Clickable element (start button)
pub struct HeadlessControl {
    activation: Arc<UserActivation>,
    notify: Notify,
    listeners: AtomicUsize,
}

impl HeadlessControl {
    fn new(activation: Arc<UserActivation>) -> Self {
        Self {
            activation,
            notify: Notify::new(),
            listeners: AtomicUsize::new(0),
        }
    }

    /// Dispatch a click. Only listeners attached right now observe it.
    pub fn click(&self) {
        self.activation.activate();
        self.notify.notify_waiters();
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Activatable for HeadlessControl {
    async fn activated(&self) {
        let notified = self.notify.notified();
        let _listener = ListenerGuard::attach(&self.listeners);
        notified.await;
    }
}

/// Manual-start overlay; starts hidden
pub struct HeadlessOverlay {
    control: HeadlessControl,
    visible: AtomicBool,
}

impl HeadlessOverlay {
    pub fn click(&self) {
        self.control.click();
    }

    pub fn is_visible(&self) -> bool {
        self.visible.load(Ordering::SeqCst)
    }

    pub fn listener_count(&self) -> usize {
        self.control.listener_count()
    }
}

#[async_trait]
impl Activatable for HeadlessOverlay {
    async fn activated(&self) {
        self.control.activated().await;
    }
}

impl Overlay for HeadlessOverlay {
    fn show(&self) {
        self.visible.store(true, Ordering::SeqCst);
    }

    fn hide(&self) {
        self.visible.store(false, Ordering::SeqCst);
    }
}

#[derive(Debug, Default)]
struct MediaState {
    playing_since: Option<Instant>,
    ended: bool,
}

/// Native media element whose position advances with the (Tokio) clock
pub struct HeadlessMedia {
    src: String,
    policy: AutoplayPolicy,
    activation: Arc<UserActivation>,
    state: Mutex<MediaState>,
    play_calls: AtomicUsize,
}

impl HeadlessMedia {
    pub fn play_calls(&self) -> usize {
        self.play_calls.load(Ordering::SeqCst)
    }

    /// Mark the media as finished (paused at its end)
    pub fn finish(&self) {
        lock(&self.state).ended = true;
    }
}

#[async_trait]
impl MediaElement for HeadlessMedia {
    async fn play(&self) -> Result<(), PlaybackError> {
        self.play_calls.fetch_add(1, Ordering::SeqCst);
        if self.src.trim().is_empty() {
            return Err(PlaybackError::Unsupported("no source".to_string()));
        }
        if !(self.policy.autoplay_allowed || self.activation.is_active()) {
            return Err(PlaybackError::NotAllowed(
                "the user didn't interact with the document first".to_string(),
            ));
        }

        let mut state = lock(&self.state);
        state.ended = false;
        state.playing_since.get_or_insert_with(Instant::now);
        Ok(())
    }

    fn snapshot(&self) -> PlaybackSnapshot {
        let state = lock(&self.state);
        PlaybackSnapshot {
            paused: state.playing_since.is_none() || state.ended,
            ended: state.ended,
            current_time: state
                .playing_since
                .map(|since| since.elapsed().as_secs_f64())
                .unwrap_or(0.0),
        }
    }
}

#[derive(Default)]
struct ContainerState {
    message: Option<PageMessage>,
    surfaces: Vec<PlayerSurface>,
    media: Vec<Arc<HeadlessMedia>>,
}

/// Player container recording everything rendered into it
pub struct HeadlessContainer {
    policy: AutoplayPolicy,
    activation: Arc<UserActivation>,
    state: Mutex<ContainerState>,
}

impl HeadlessContainer {
    pub fn message(&self) -> Option<PageMessage> {
        lock(&self.state).message.clone()
    }

    pub fn surfaces(&self) -> Vec<PlayerSurface> {
        lock(&self.state).surfaces.clone()
    }

    /// The most recently appended media element
    pub fn media(&self) -> Option<Arc<HeadlessMedia>> {
        lock(&self.state).media.last().cloned()
    }

    /// Current content as HTML
    pub fn html(&self) -> String {
        let state = lock(&self.state);
        match &state.message {
            Some(message) => message.to_html(),
            None => state
                .surfaces
                .iter()
                .map(PlayerSurface::to_html)
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

impl PlayerContainer for HeadlessContainer {
    fn render_message(&self, message: &PageMessage) {
        let mut state = lock(&self.state);
        state.surfaces.clear();
        state.media.clear();
        state.message = Some(message.clone());
    }

    fn append_iframe(&self, frame: &IframeSurface) {
        let mut state = lock(&self.state);
        state.message = None;
        state.surfaces.push(PlayerSurface::Iframe(frame.clone()));
    }

    fn append_media(&self, media: &MediaSurface) -> Arc<dyn MediaElement> {
        let element = Arc::new(HeadlessMedia {
            src: media.src.clone(),
            policy: self.policy,
            activation: self.activation.clone(),
            state: Mutex::new(MediaState::default()),
            play_calls: AtomicUsize::new(0),
        });

        let mut state = lock(&self.state);
        state.message = None;
        state.surfaces.push(PlayerSurface::Media(media.clone()));
        state.media.push(element.clone());
        element
    }
}

/// Fullscreen and orientation state of the page
pub struct HeadlessViewport {
    policy: AutoplayPolicy,
    activation: Arc<UserActivation>,
    fullscreen: Mutex<Option<FullscreenTarget>>,
    orientation: Mutex<Option<OrientationLock>>,
    fullscreen_requests: AtomicUsize,
}

impl HeadlessViewport {
    pub fn fullscreen_element(&self) -> Option<FullscreenTarget> {
        *lock(&self.fullscreen)
    }

    pub fn orientation(&self) -> Option<OrientationLock> {
        *lock(&self.orientation)
    }

    pub fn fullscreen_requests(&self) -> usize {
        self.fullscreen_requests.load(Ordering::SeqCst)
    }

    /// Leave fullscreen (user pressed escape / swiped down)
    pub fn exit_fullscreen(&self) {
        *lock(&self.fullscreen) = None;
    }
}

#[async_trait]
impl Viewport for HeadlessViewport {
    fn is_fullscreen(&self) -> bool {
        self.fullscreen_element().is_some()
    }

    async fn request_fullscreen(&self, target: FullscreenTarget) -> Result<(), EnhancementError> {
        self.fullscreen_requests.fetch_add(1, Ordering::SeqCst);
        if !self.policy.fullscreen_supported {
            return Err(EnhancementError::Unsupported("requestFullscreen"));
        }
        if !(self.policy.fullscreen_without_gesture || self.activation.is_active()) {
            return Err(EnhancementError::Rejected(
                "permissions check failed: no user gesture".to_string(),
            ));
        }

        *lock(&self.fullscreen) = Some(target);
        Ok(())
    }

    async fn lock_orientation(&self, orientation: OrientationLock) -> Result<(), EnhancementError> {
        if !self.policy.orientation_lock_supported {
            return Err(EnhancementError::Unsupported("screen.orientation.lock"));
        }

        *lock(&self.orientation) = Some(orientation);
        Ok(())
    }
}

/// A complete simulated page with all four handles
#[derive(Clone)]
pub struct HeadlessPage {
    pub container: Arc<HeadlessContainer>,
    pub overlay: Arc<HeadlessOverlay>,
    pub start_control: Arc<HeadlessControl>,
    pub viewport: Arc<HeadlessViewport>,
}

impl HeadlessPage {
    pub fn new(policy: AutoplayPolicy) -> Self {
        let activation = Arc::new(UserActivation::default());

        Self {
            container: Arc::new(HeadlessContainer {
                policy,
                activation: activation.clone(),
                state: Mutex::new(ContainerState::default()),
            }),
            overlay: Arc::new(HeadlessOverlay {
                control: HeadlessControl::new(activation.clone()),
                visible: AtomicBool::new(false),
            }),
            start_control: Arc::new(HeadlessControl::new(activation.clone())),
            viewport: Arc::new(HeadlessViewport {
                policy,
                activation,
                fullscreen: Mutex::new(None),
                orientation: Mutex::new(None),
                fullscreen_requests: AtomicUsize::new(0),
            }),
        }
    }

    /// Handles for injecting into the supervisor
    pub fn handles(&self) -> PageHandles {
        PageHandles {
            container: self.container.clone(),
            overlay: self.overlay.clone(),
            start_control: self.start_control.clone(),
            viewport: self.viewport.clone(),
        }
    }
}
