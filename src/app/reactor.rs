//! The single-writer reactor task that owns the model.

use std::collections::BTreeSet;
use std::sync::Arc;

use futures::future::BoxFuture;
use tokio::select;
use tokio::sync::{broadcast, oneshot, watch};
use tracing::{debug, error, info, warn};

use crate::config::Settings;
use crate::sources::{self, Services};
use crate::state::{Lifecycle, ModelChange, ModelPath, ModelState, PrefSnapshot};

use super::channels::{Channels, Control, WorkerResult, recv_optional};
use super::dispatch::{self, Effect, Step};
use super::init;

/// Publishing ends shared between the reactor and the session handle.
pub struct Outlets {
    /// Lifecycle state.
    pub lifecycle_tx: watch::Sender<Lifecycle>,
    /// Latest published snapshot.
    pub snapshot_tx: watch::Sender<Option<Arc<ModelState>>>,
    /// Change notifications.
    pub change_tx: broadcast::Sender<ModelChange>,
}

/// What: Reactor state while the session is ready.
///
/// Details:
/// - `current` is shared with readers; edits go through `Arc::make_mut`, so a
///   snapshot a reader holds is never modified.
/// - The watch channel always holds the published `Arc`, so every event
///   copies `ModelState`, no-op events included. The copy is shallow:
///   catalog entries, language records and the index stay shared `Arc`s and
///   only the per-language flag records are duplicated.
struct Reactor {
    services: Services,
    settings: Settings,
    channels: Channels,
    outlets: Outlets,
    current: Arc<ModelState>,
    /// Workers spawned and not yet reported.
    pending: usize,
    /// Settle requests waiting for `pending` to reach zero.
    settle_waiters: Vec<oneshot::Sender<()>>,
}

/// What: Session task body: build the model, then react until torn down.
///
/// Inputs:
/// - `services`: Collaborators.
/// - `settings`: Session settings.
/// - `channels`: Subscriptions taken at connect time.
/// - `outlets`: Publishing ends.
///
/// Details:
/// - Teardown before construction completes abandons it without publishing.
/// - A failed construction logs and returns, dropping the outlets so waiters
///   observe the session as unavailable.
pub async fn run(services: Services, settings: Settings, mut channels: Channels, outlets: Outlets) {
    outlets.lifecycle_tx.send_replace(Lifecycle::Building);
    debug!("fetching language settings model inputs");
    let fetched = select! {
        biased;
        _ = &mut channels.shutdown_rx => {
            info!("session torn down before the model was built");
            return;
        }
        fetched = init::fetch_model_args(&services) => fetched,
    };
    let args = match fetched {
        Ok(args) => args,
        Err(e) => {
            error!(error = %e, "language settings unavailable: initial fetch failed");
            return;
        }
    };
    let prefs = PrefSnapshot::read(services.prefs.as_ref());
    let (state, effects) = init::create_model(args, &prefs, &settings);

    let current = Arc::new(state);
    outlets.snapshot_tx.send_replace(Some(Arc::clone(&current)));
    outlets.lifecycle_tx.send_replace(Lifecycle::Ready);
    info!("language settings ready");

    let mut reactor = Reactor {
        services,
        settings,
        channels,
        outlets,
        current,
        pending: 0,
        settle_waiters: Vec::new(),
    };
    for effect in effects {
        reactor.spawn_effect(effect);
    }
    reactor.event_loop().await;
    info!("language settings session closed");
}

impl Reactor {
    /// What: Process events one at a time until shutdown.
    ///
    /// Details:
    /// - `biased` polling drains collaborator events and worker results before
    ///   control requests, so a settle request sees every earlier event.
    async fn event_loop(&mut self) {
        loop {
            select! {
                biased;
                _ = &mut self.channels.shutdown_rx => break,
                Some(path) = self.channels.pref_rx.recv() => {
                    debug!(path = path.key(), "preference changed");
                    let prefs = self.read_prefs();
                    let state = Arc::make_mut(&mut self.current);
                    let step = dispatch::apply_pref_change(state, path, &prefs, &self.settings);
                    self.commit(step);
                }
                Some(event) = self.channels.ime_rx.recv() => {
                    debug!(event = ?event, "input method event");
                    let state = Arc::make_mut(&mut self.current);
                    let step = dispatch::apply_input_method_event(state, event);
                    self.commit(step);
                }
                Some(statuses) = self.channels.dictionary_rx.recv() => {
                    debug!(count = statuses.len(), "dictionary statuses pushed");
                    let state = Arc::make_mut(&mut self.current);
                    let step = dispatch::apply_dictionary_statuses(state, &statuses);
                    self.commit(step);
                }
                change = recv_optional(&mut self.channels.pack_rx) => {
                    debug!(ids = ?change.engine_ids, status = ?change.status, "language pack status pushed");
                    let state = Arc::make_mut(&mut self.current);
                    let step = dispatch::apply_language_pack_change(state, &change);
                    self.commit(step);
                }
                Some(result) = self.channels.worker_rx.recv() => {
                    self.pending = self.pending.saturating_sub(1);
                    self.handle_worker(result);
                    self.answer_settled();
                }
                Some(control) = self.channels.control_rx.recv() => {
                    match control {
                        Control::Settle(tx) => {
                            self.settle_waiters.push(tx);
                            self.answer_settled();
                        }
                    }
                }
                else => break,
            }
        }
    }

    fn read_prefs(&self) -> PrefSnapshot {
        PrefSnapshot::read(self.services.prefs.as_ref())
    }

    /// What: Apply a worker result to the model.
    fn handle_worker(&mut self, result: WorkerResult) {
        let step = match result {
            WorkerResult::DictionaryStatuses(Ok(statuses)) => {
                let state = Arc::make_mut(&mut self.current);
                dispatch::apply_dictionary_statuses(state, &statuses)
            }
            WorkerResult::TranslateTarget(Ok(target)) => {
                let prefs = self.read_prefs();
                let state = Arc::make_mut(&mut self.current);
                dispatch::apply_translate_target(state, target, &prefs)
            }
            WorkerResult::InputMethodCatalog(Ok(lists)) => {
                let prefs = self.read_prefs();
                let state = Arc::make_mut(&mut self.current);
                dispatch::apply_input_method_catalog(state, lists, &prefs, &self.settings)
            }
            WorkerResult::LanguagePackStatus { id, result: Ok(status) } => {
                let state = Arc::make_mut(&mut self.current);
                dispatch::apply_language_pack_status(state, &id, status)
            }
            WorkerResult::LanguagePackStatus { id, result: Err(e) } => {
                warn!(id = %id, error = %e, "language pack status fetch failed; keeping placeholder");
                let state = Arc::make_mut(&mut self.current);
                dispatch::apply_language_pack_failure(state, &id)
            }
            WorkerResult::DictionaryStatuses(Err(e))
            | WorkerResult::TranslateTarget(Err(e))
            | WorkerResult::InputMethodCatalog(Err(e)) => {
                warn!(error = %e, "background fetch failed");
                return;
            }
        };
        self.commit(step);
    }

    /// What: Publish the step's changes and start its follow-up fetches.
    fn commit(&mut self, step: Step) {
        for effect in step.effects {
            self.spawn_effect(effect);
        }
        self.publish(step.paths);
    }

    /// What: Bump the revision and publish a snapshot when anything changed.
    fn publish(&mut self, paths: BTreeSet<ModelPath>) {
        if paths.is_empty() {
            return;
        }
        let state = Arc::make_mut(&mut self.current);
        state.revision += 1;
        let revision = state.revision;
        self.outlets
            .snapshot_tx
            .send_replace(Some(Arc::clone(&self.current)));
        let paths: Vec<ModelPath> = paths.into_iter().collect();
        debug!(revision, paths = ?paths, "published model change");
        // No subscribers is fine.
        let _ = self.outlets.change_tx.send(ModelChange { revision, paths });
    }

    /// What: Start the fetch behind `effect` on a worker task.
    fn spawn_effect(&mut self, effect: Effect) {
        match effect {
            Effect::FetchDictionaryStatuses => {
                let fut = self.services.dictionaries.dictionary_statuses();
                self.spawn_worker(fut, WorkerResult::DictionaryStatuses);
            }
            Effect::FetchTranslateTarget => {
                let fut = self.services.catalog.translate_target();
                self.spawn_worker(fut, WorkerResult::TranslateTarget);
            }
            Effect::FetchInputMethods => {
                let fut = self.services.input_methods.list_input_methods();
                self.spawn_worker(fut, WorkerResult::InputMethodCatalog);
            }
            Effect::FetchLanguagePacks(ids) => {
                debug!(count = ids.len(), "fetching language pack statuses");
                for id in ids {
                    let fut = self.services.language_packs.status(&id);
                    self.spawn_worker(fut, move |result| WorkerResult::LanguagePackStatus {
                        id,
                        result,
                    });
                }
            }
        }
    }

    /// What: Await `fut` on a spawned task and report through the worker channel.
    fn spawn_worker<T, F>(&mut self, fut: BoxFuture<'static, sources::Result<T>>, wrap: F)
    where
        T: Send + 'static,
        F: FnOnce(Result<T, String>) -> WorkerResult + Send + 'static,
    {
        self.pending += 1;
        let tx = self.channels.worker_tx.clone();
        tokio::spawn(async move {
            let result = fut.await.map_err(|e| e.to_string());
            let _ = tx.send(wrap(result));
        });
    }

    /// What: Release settle waiters once no worker is outstanding.
    fn answer_settled(&mut self) {
        if self.pending > 0 {
            return;
        }
        for tx in self.settle_waiters.drain(..) {
            let _ = tx.send(());
        }
    }
}
