//! Session credential shared by every poller and the detail fetcher.

use std::sync::Arc;

use log::info;
use tickerboard_market_data::Credential;
use tokio::sync::watch;

use crate::banner::ErrorBanner;
use crate::selection::SelectionController;

/// Live credential plus a counter bumped on every `set_credential` call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CredentialRevision {
    pub credential: Credential,
    pub revision: u64,
}

/// Owner of the live credential.
///
/// Setting a credential always resets the session: the selection and the
/// page-level error are cleared before subscribers are told to restart,
/// even when the new value equals the old one.
#[derive(Clone)]
pub struct CredentialStore {
    tx: Arc<watch::Sender<CredentialRevision>>,
    selection: SelectionController,
    banner: ErrorBanner,
}

impl CredentialStore {
    pub fn new(initial: Credential, selection: SelectionController, banner: ErrorBanner) -> Self {
        let (tx, _) = watch::channel(CredentialRevision {
            credential: initial,
            revision: 0,
        });
        Self {
            tx: Arc::new(tx),
            selection,
            banner,
        }
    }

    /// Replace the credential. Blank input selects the default key.
    pub fn set_credential(&self, raw: &str) -> Credential {
        let credential = Credential::new(raw);

        self.selection.clear();
        self.banner.clear();
        self.tx.send_modify(|current| {
            current.credential = credential.clone();
            current.revision += 1;
        });

        info!(
            "Credential changed ({}); restarting all fetchers",
            if credential.is_default() {
                "default key"
            } else {
                "user key"
            }
        );
        credential
    }

    pub fn current(&self) -> Credential {
        self.tx.borrow().credential.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<CredentialRevision> {
        self.tx.subscribe()
    }
}
