use tokio::sync::{mpsc, oneshot};

use crate::sources::Services;
use crate::state::{
    DictionaryStatus, InputMethodEvent, InputMethodLists, LanguagePackStatus,
    LanguagePackStatusChange, PrefPath,
};

/// What: Result reported by a spawned fetch worker back to the reactor.
///
/// Details:
/// - Errors are carried as strings; the reactor only logs them.
#[derive(Debug)]
pub enum WorkerResult {
    /// Dictionary statuses fetched after build or an enabled-language change.
    DictionaryStatuses(Result<Vec<DictionaryStatus>, String>),
    /// Translate target refetched after an enabled-language change.
    TranslateTarget(Result<String, String>),
    /// Engine catalog refetched after an engine was added or removed.
    InputMethodCatalog(Result<InputMethodLists, String>),
    /// Language-pack status for one engine.
    LanguagePackStatus {
        /// Engine id.
        id: String,
        /// Fetched status.
        result: Result<LanguagePackStatus, String>,
    },
}

/// Requests from the session handle to the reactor.
#[derive(Debug)]
pub enum Control {
    /// Answer once queued events and in-flight workers are drained.
    Settle(oneshot::Sender<()>),
}

/// What: Receiving ends the reactor selects over.
///
/// Details:
/// - Collaborator subscriptions are taken when the session connects, so push
///   events raised during construction are buffered and replayed once ready.
pub struct Channels {
    /// Preference change notifications.
    pub pref_rx: mpsc::UnboundedReceiver<PrefPath>,
    /// Engine added/removed/current events.
    pub ime_rx: mpsc::UnboundedReceiver<InputMethodEvent>,
    /// Dictionary status batches.
    pub dictionary_rx: mpsc::UnboundedReceiver<Vec<DictionaryStatus>>,
    /// Language-pack status pushes; absent when language packs are disabled.
    pub pack_rx: Option<mpsc::UnboundedReceiver<LanguagePackStatusChange>>,
    /// Worker results.
    pub worker_rx: mpsc::UnboundedReceiver<WorkerResult>,
    /// Sender handed to workers.
    pub worker_tx: mpsc::UnboundedSender<WorkerResult>,
    /// Session control requests.
    pub control_rx: mpsc::UnboundedReceiver<Control>,
    /// Fires (or closes) when the session is torn down.
    pub shutdown_rx: oneshot::Receiver<()>,
}

impl Channels {
    /// What: Subscribe to every collaborator stream and create internal channels.
    ///
    /// Inputs:
    /// - `services`: Collaborators to subscribe to.
    /// - `language_packs`: Whether to subscribe to language-pack pushes.
    ///
    /// Output:
    /// - `(channels, control_tx, shutdown_tx)`.
    pub fn subscribe(
        services: &Services,
        language_packs: bool,
    ) -> (Self, mpsc::UnboundedSender<Control>, oneshot::Sender<()>) {
        let (worker_tx, worker_rx) = mpsc::unbounded_channel();
        let (control_tx, control_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let channels = Self {
            pref_rx: services.prefs.subscribe(),
            ime_rx: services.input_methods.subscribe(),
            dictionary_rx: services.dictionaries.subscribe(),
            pack_rx: language_packs.then(|| services.language_packs.subscribe()),
            worker_rx,
            worker_tx,
            control_rx,
            shutdown_rx,
        };
        (channels, control_tx, shutdown_tx)
    }
}

/// What: Receive from an optional channel; pends forever when absent or closed.
pub async fn recv_optional<T>(rx: &mut Option<mpsc::UnboundedReceiver<T>>) -> T {
    if let Some(rx) = rx.as_mut()
        && let Some(value) = rx.recv().await
    {
        return value;
    }
    futures::future::pending().await
}
