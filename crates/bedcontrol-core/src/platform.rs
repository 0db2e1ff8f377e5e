// ── Platform: discovery and polling ──
//
// Owns the shared session, the privacy map and one `BedController` per
// discovered bed. Discovery probes optional foundation hardware for new
// beds and restores cached ones; polling pushes family status into every
// non-private bed on a fixed interval until cancelled or until the API
// fails.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use bedcontrol_api::{BedInfo, Error as ApiError, Outlet, PauseMode};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::api::BedApi;
use crate::bed::{BedController, Fetch};
use crate::capability::{OutletKind, Scope, Side};
use crate::config::PlatformConfig;
use crate::error::CoreError;
use crate::features::{BedFeatures, bed_ignore_list, is_bed_ignored};
use crate::host::{AccessoryContext, BedStats, Host};
use crate::privacy::PrivacyMap;
use crate::session::Session;

/// What one poll tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Family status was fetched and pushed to this many beds.
    Updated(usize),
    /// Every bed is private; nothing was fetched. `warned` is set on the
    /// tick that entered this state and logged the skip.
    AllPrivate { warned: bool },
    /// The fetch failed; polling stops.
    Failed,
}

/// Discovery and polling coordinator for all beds on the account.
pub struct Platform<A> {
    session: Arc<Session<A>>,
    host: Arc<dyn Host>,
    privacy: Arc<PrivacyMap>,
    config: PlatformConfig,
    controllers: RwLock<Vec<Arc<BedController<A>>>>,
    /// Set while the "all beds private" warning is in effect.
    all_private_logged: AtomicBool,
    cancel: CancellationToken,
}

impl<A: BedApi> Platform<A> {
    pub fn new(session: Arc<Session<A>>, host: Arc<dyn Host>, config: PlatformConfig) -> Self {
        if let Some(platform) = &config.bed_platform {
            debug!(platform = %platform, "bed platform configured");
        }
        Self {
            session,
            host,
            privacy: Arc::new(PrivacyMap::new()),
            config,
            controllers: RwLock::new(Vec::new()),
            all_private_logged: AtomicBool::new(false),
            cancel: CancellationToken::new(),
        }
    }

    pub fn session(&self) -> &Arc<Session<A>> {
        &self.session
    }

    pub fn privacy(&self) -> &PrivacyMap {
        &self.privacy
    }

    pub fn config(&self) -> &PlatformConfig {
        &self.config
    }

    pub fn controllers(&self) -> Vec<Arc<BedController<A>>> {
        self.controllers
            .read()
            .expect("controllers lock poisoned")
            .clone()
    }

    pub fn controller(&self, bed_id: &str) -> Option<Arc<BedController<A>>> {
        self.controllers
            .read()
            .expect("controllers lock poisoned")
            .iter()
            .find(|c| c.bed_id() == bed_id)
            .cloned()
    }

    // ── Discovery ────────────────────────────────────────────────────

    /// Load every bed on the account and build its controller.
    ///
    /// Cached accessories are restored as-is unless their ignore list
    /// changed, in which case they are unregistered and probed again.
    /// Returns the number of beds now controlled.
    pub async fn discover(&self) -> Result<usize, CoreError> {
        let api = self.session.api();
        let beds = required(
            "family status",
            self.session.call(|| api.family_status()).await,
        )?;
        let infos = required("bed list", self.session.call(|| api.list_beds()).await)?;

        let mut controllers = Vec::with_capacity(beds.len());
        for bed in &beds {
            let Some(info) = infos.iter().find(|b| b.bed_id == bed.bed_id) else {
                warn!(bed_id = %bed.bed_id, "bed missing from bed list, skipping");
                continue;
            };

            if is_bed_ignored(&self.config.ignore, &bed.bed_id) {
                info!("Ignoring bed: {}", bed.bed_id);
                continue;
            }

            let ignore_list = bed_ignore_list(&self.config.ignore, &bed.bed_id);
            self.privacy.track(&bed.bed_id);

            let cached = self.host.cached_accessory(&bed.bed_id).filter(|existing| {
                if existing.ignore_list == ignore_list {
                    return true;
                }
                info!("Ignore list for bed {} changed. Reloading device", info.name);
                self.host.unregister_accessory(&bed.bed_id);
                false
            });

            let context = match cached {
                Some(context) => self.restore(context),
                None => self.add(info, ignore_list).await,
            };

            controllers.push(Arc::new(BedController::new(
                &context,
                Arc::clone(&self.session),
                Arc::clone(&self.host),
                Arc::clone(&self.privacy),
                self.config.send_delay(),
            )));
        }

        let count = controllers.len();
        let previous = std::mem::replace(
            &mut *self.controllers.write().expect("controllers lock poisoned"),
            controllers,
        );
        for controller in previous {
            controller.cancel_pending_writes();
        }
        info!(beds = count, "discovery complete");
        Ok(count)
    }

    /// Bring a cached accessory's timing settings up to date.
    fn restore(&self, mut context: AccessoryContext) -> AccessoryContext {
        info!("Restoring existing bed from cache: {}", context.name());
        if context.update_interval != self.config.update_interval_secs
            || context.send_delay != self.config.send_delay_secs
        {
            context.update_interval = self.config.update_interval_secs;
            context.send_delay = self.config.send_delay_secs;
            self.host.update_accessory(context.clone());
        }
        context
    }

    async fn add(&self, info: &BedInfo, ignore_list: Vec<String>) -> AccessoryContext {
        info!("Adding new bed: {}", info.name);

        let mut features = self.probe(info).await;
        features.apply_ignore(&info.name, &ignore_list);

        let context = AccessoryContext {
            bed_stats: BedStats {
                bed_id: info.bed_id.clone(),
                name: info.name.clone(),
                model: info.model.clone(),
            },
            bed_features: features,
            update_interval: self.config.update_interval_secs,
            send_delay: self.config.send_delay_secs,
            ignore_list,
        };
        self.host.register_accessory(context.clone());
        context
    }

    /// Probe optional foundation hardware. Each probe that fails (404
    /// or otherwise) marks that hardware absent.
    async fn probe(&self, info: &BedInfo) -> BedFeatures {
        let api = self.session.api();
        let bed_id = info.bed_id.as_str();
        let name = info.name.as_str();
        let mut features = BedFeatures::baseline(&info.model, bed_id);

        if !self
            .detect(name, "Foundation", || api.foundation_status(bed_id))
            .await
        {
            return features;
        }

        features.foundation = true;
        for side in Side::BOTH {
            let f = features.scope_mut(side.into());
            f.head_control = true;
            f.foot_control = true;
        }

        for kind in [OutletKind::Outlet, OutletKind::Light] {
            for side in Side::BOTH {
                let outlet = kind.outlet(side);
                let what = format!("Outlet {} ({})", outlet.id(), outlet_label(outlet));
                if self
                    .detect(name, &what, || api.outlet_status(bed_id, outlet))
                    .await
                {
                    let f = features.scope_mut(side.into());
                    match kind {
                        OutletKind::Outlet => f.outlet = true,
                        OutletKind::Light => f.light = true,
                    }
                }
            }
        }
        features.aggregate_outlets();

        if self
            .detect(name, "Footwarming", || api.footwarming(bed_id))
            .await
        {
            features.scope_mut(Scope::Left).footwarming = true;
            features.scope_mut(Scope::Right).footwarming = true;
        }

        features
    }

    async fn detect<T, F, Fut>(&self, name: &str, what: &str, op: F) -> bool
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        match self.session.call(op).await {
            Ok(Some(_)) => {
                info!("[{name}] {what} detected");
                true
            }
            Ok(None) => {
                info!("[{name}] {what} not detected");
                false
            }
            Err(e) => {
                debug!(error = %e, "[{name}] {what} probe failed");
                info!("[{name}] {what} not detected");
                false
            }
        }
    }

    // ── Polling ──────────────────────────────────────────────────────

    /// Read pause mode for every bed and push it to its privacy switch.
    pub async fn sync_privacy(&self) {
        let api = self.session.api();
        let beds = match self.session.call(|| api.family_status()).await {
            Ok(Some(beds)) => beds,
            Ok(None) | Err(_) => {
                warn!("[Polling] No beds found");
                return;
            }
        };

        for bed in beds {
            let Some(controller) = self.controller(&bed.bed_id) else {
                continue;
            };
            match self.session.call(|| api.pause_mode(&bed.bed_id)).await {
                Ok(Some(mode)) => {
                    let enabled = mode == PauseMode::On;
                    debug!("[Polling][{}] Get Privacy Mode -> {enabled}", controller.name());
                    controller.sync_privacy(enabled);
                }
                Ok(None) => {
                    warn!("[Polling][{}] Privacy mode unavailable", controller.name());
                }
                Err(e) => {
                    warn!(error = %e, "[Polling][{}] Privacy mode unavailable", controller.name());
                }
            }
        }
    }

    /// One poll cycle.
    ///
    /// When every bed is private the network is not touched and the
    /// warning is logged once until some bed leaves privacy mode.
    pub async fn poll_tick(&self) -> TickOutcome {
        if self.privacy.all_enabled() {
            let warned = !self.all_private_logged.swap(true, Ordering::SeqCst);
            if warned {
                warn!(
                    "[Polling] All beds have privacy mode enabled. Polling skipped to reduce \
                     unnecessary API requests. Changing privacy from the vendor app will not \
                     resume polling until the privacy switch is read again."
                );
            }
            return TickOutcome::AllPrivate { warned };
        }
        self.all_private_logged.store(false, Ordering::SeqCst);

        let api = self.session.api();
        let beds = match self.session.call(|| api.family_status()).await {
            Ok(Some(beds)) => beds,
            Ok(None) | Err(_) => {
                error!("[Polling] Failed to connect to the API. Disabling polling function...");
                return TickOutcome::Failed;
            }
        };

        let mut updated = 0;
        for bed in &beds {
            if let Some(controller) = self.controller(&bed.bed_id) {
                controller.apply_family_status(bed);
                updated += 1;
            }
        }
        TickOutcome::Updated(updated)
    }

    /// Sync privacy, then spawn the poll loop when an interval is set.
    pub async fn start_polling(self: &Arc<Self>) -> Option<JoinHandle<()>> {
        self.sync_privacy().await;

        let Some(period) = self.config.poll_interval() else {
            debug!("[Polling] update interval is 0, polling disabled");
            return None;
        };
        let platform = Arc::clone(self);
        let cancel = self.cancel.clone();
        Some(tokio::spawn(poll_task(platform, period, cancel)))
    }

    /// Stop the poll loop and drop queued writes.
    pub fn shutdown(&self) {
        self.cancel.cancel();
        for controller in self.controllers() {
            controller.cancel_pending_writes();
        }
    }
}

/// Unwrap a discovery fetch, turning absence into an error.
fn required<T>(what: &str, fetched: Fetch<T>) -> Result<T, CoreError> {
    match fetched {
        Ok(Some(value)) => Ok(value),
        Ok(None) => {
            error!("Error connecting to API. No beds loaded.");
            Err(CoreError::Discovery {
                message: format!("no {what} returned"),
            })
        }
        Err(e) => {
            error!(error = %e, "Error connecting to API. No beds loaded.");
            Err(CoreError::Discovery {
                message: format!("{what}: {e}"),
            })
        }
    }
}

fn outlet_label(outlet: Outlet) -> &'static str {
    match outlet {
        Outlet::LeftPlug => "Left Plug",
        Outlet::RightPlug => "Right Plug",
        Outlet::LeftLight => "Left Light",
        Outlet::RightLight => "Right Light",
    }
}

async fn poll_task<A: BedApi>(
    platform: Arc<Platform<A>>,
    period: std::time::Duration,
    cancel: CancellationToken,
) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval.tick().await; // first tick is immediate

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                if platform.poll_tick().await == TickOutcome::Failed {
                    break;
                }
            }
        }
    }
    debug!("[Polling] stopped");
}
