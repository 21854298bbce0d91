use crate::browser::capture_script::{
    install_script, set_capture_script, set_overlay_script, PageEvent, RawPageEvent, DRAIN_SCRIPT,
};
use crate::browser::overlay::PageOverlay;
use crate::capture::Recorder;
use crate::core::{BrowserTrait, Config, TimerId};
use crate::errors::{RecorderError, Result};
use crate::steps::Step;
use crate::utils::{JavaScriptRunner, TokioScheduler};
use std::future::Future;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

pub type LiveRecorder = Recorder<TokioScheduler, PageOverlay>;

/// A recorder attached to one live browser tab.
///
/// The page queues snapshots of its events; the session drains that queue on a
/// fixed interval, feeds the recorder and pushes listener and overlay state
/// back into the page.
pub struct RecordingSession<B: BrowserTrait> {
    browser: B,
    tab: B::TabHandle,
    config: Config,
    recorder: LiveRecorder,
    timers: mpsc::UnboundedReceiver<TimerId>,
    session_id: String,
    capture_synced: Option<bool>,
}

impl<B: BrowserTrait> RecordingSession<B> {
    pub async fn new(mut browser: B, config: Config) -> Result<Self> {
        browser.launch(&config).await?;
        let tab = browser.new_tab().await?;
        let (scheduler, timers) = TokioScheduler::new();
        let recorder = Recorder::new(&config, scheduler, PageOverlay::new());
        let session_id = uuid::Uuid::new_v4().to_string();

        info!(%session_id, "recording session created");
        Ok(Self {
            browser,
            tab,
            config,
            recorder,
            timers,
            session_id,
            capture_synced: None,
        })
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn recorder(&self) -> &LiveRecorder {
        &self.recorder
    }

    pub fn recorder_mut(&mut self) -> &mut LiveRecorder {
        &mut self.recorder
    }

    pub fn steps(&self) -> &[Step] {
        self.recorder.steps()
    }

    /// Navigates the tab and installs the capture script into the new document.
    pub async fn open(&mut self, url: &str) -> Result<()> {
        let url = url::Url::parse(url)?;
        self.browser.navigate(&self.tab, url.as_str()).await?;
        let location = self.browser.get_url(&self.tab).await?;
        self.recorder.set_location(location);
        self.install().await
    }

    async fn install(&mut self) -> Result<()> {
        let script = install_script(&self.config.recorder.panel_selector);
        self.run_script(&script).await?;
        self.capture_synced = None;
        self.recorder.overlay_mut().mark_stale();
        self.sync_page().await?;
        debug!(session_id = %self.session_id, "capture script installed");
        Ok(())
    }

    /// Drains the page queue once and feeds every event to the recorder.
    ///
    /// Returns the number of events handled. A document without the capture
    /// script (after a navigation) gets it reinstalled.
    pub async fn poll_once(&mut self) -> Result<usize> {
        let location = self.browser.get_url(&self.tab).await?;
        if location != self.recorder.location() {
            debug!(%location, "location changed");
            self.recorder.set_location(location);
        }

        let drained: Option<Vec<RawPageEvent>> = JavaScriptRunner::fetch_json(
            &self.browser,
            &self.tab,
            DRAIN_SCRIPT,
            self.config.browser.script_timeout_ms,
        )
        .await?;

        let Some(events) = drained else {
            self.install().await?;
            return Ok(0);
        };

        let mut handled = 0;
        for raw in events {
            if let Some(location) = raw.location.clone() {
                self.recorder.set_location(location);
            }
            let at = raw.occurred_at();
            match raw.into_page_event() {
                Some(PageEvent::Dom(event)) => match at {
                    Some(at) => self.recorder.handle_event_at(event, at),
                    None => self.recorder.handle_event(event),
                },
                Some(PageEvent::Selected(element)) => {
                    self.recorder.on_element_selected(&element);
                }
                None => continue,
            }
            handled += 1;
        }

        self.sync_page().await?;
        Ok(handled)
    }

    /// Pushes listener and overlay changes made by the recorder into the page.
    async fn sync_page(&mut self) -> Result<()> {
        let capture = self.recorder.subscription().is_some();
        if self.capture_synced != Some(capture) {
            self.run_script(&set_capture_script(capture)).await?;
            self.capture_synced = Some(capture);
            debug!(capture, "capture listeners synced");
        }

        if let Some(active) = self.recorder.overlay_mut().take_request() {
            if let Err(e) = self.run_script(&set_overlay_script(active)).await {
                self.recorder.overlay_mut().mark_stale();
                return Err(e);
            }
            debug!(active, "overlay synced");
        }
        Ok(())
    }

    /// Delivers an elapsed debounce timer.
    ///
    /// Events still queued in the page happened before the timer was seen, so
    /// they are drained first and may cancel it.
    pub async fn fire_timer(&mut self, timer: TimerId) -> Result<()> {
        match self.poll_once().await {
            Ok(_) => {}
            Err(e @ (RecorderError::JavaScriptFailed(_) | RecorderError::JavaScriptTimeout)) => {
                warn!("page poll before timer failed: {}", e);
            }
            Err(e) => return Err(e),
        }
        self.recorder.on_timer(timer);
        self.sync_page().await
    }

    /// Polls the page and fires debounce timers until `shutdown` resolves.
    ///
    /// Script failures while a page is loading are logged and retried on the next tick.
    pub async fn run_until<F>(&mut self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut ticker =
            tokio::time::interval(Duration::from_millis(self.config.browser.poll_interval_ms.max(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                Some(timer) = self.timers.recv() => match self.fire_timer(timer).await {
                    Ok(()) => {}
                    Err(e @ (RecorderError::JavaScriptFailed(_) | RecorderError::JavaScriptTimeout)) => {
                        warn!("page sync after timer failed: {}", e);
                    }
                    Err(e) => return Err(e),
                },
                _ = ticker.tick() => match self.poll_once().await {
                    Ok(_) => {}
                    Err(e @ (RecorderError::JavaScriptFailed(_) | RecorderError::JavaScriptTimeout)) => {
                        warn!("page poll failed, retrying: {}", e);
                    }
                    Err(e) => return Err(e),
                },
            }
        }

        info!(session_id = %self.session_id, steps = self.recorder.steps().len(), "recording session ending");
        Ok(())
    }

    /// Stops recording, detaches the page listeners and closes the browser.
    pub async fn close(mut self) -> Result<Vec<Step>> {
        self.recorder.stop_recording();
        self.recorder.cancel_display_capture();
        if let Err(e) = self.sync_page().await {
            debug!("could not detach page listeners: {}", e);
        }
        self.browser.close().await?;
        Ok(self.recorder.steps().to_vec())
    }

    async fn run_script(&self, script: &str) -> Result<serde_json::Value> {
        JavaScriptRunner::execute_with_timeout(
            &self.browser,
            &self.tab,
            script,
            self.config.browser.script_timeout_ms,
        )
        .await
    }
}
