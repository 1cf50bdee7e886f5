use std::time::Instant;

use anyhow::{Context, Result};
use tracing::debug;

use crate::catalog::{Catalog, CatalogError};
use crate::config::CatalogCredentials;
use crate::store::ShowsManager;

/// Runs token-bearing catalog calls with a single renew-and-retry on auth failure.
pub(crate) struct AuthManager<'a> {
    catalog: &'a dyn Catalog,
    store: &'a ShowsManager,
    credentials: &'a CatalogCredentials,
}

impl<'a> AuthManager<'a> {
    pub(crate) fn new(
        catalog: &'a dyn Catalog,
        store: &'a ShowsManager,
        credentials: &'a CatalogCredentials,
    ) -> Self {
        Self {
            catalog,
            store,
            credentials,
        }
    }

    pub(crate) fn call<T>(
        &self,
        operation: &str,
        op: impl Fn(&str) -> Result<T, CatalogError>,
    ) -> Result<T> {
        let token = self.store.token();
        match op(&token) {
            Ok(value) => Ok(value),
            Err(err) if err.is_auth() => {
                debug!("{operation} failed on first attempt ({err}), renewing token");
                let token = self.renew()?;
                debug!("attempting {operation} a second time");
                op(&token).with_context(|| format!("{operation} failed after token renewal"))
            }
            Err(err) => Err(err).with_context(|| format!("{operation} failed")),
        }
    }

    fn renew(&self) -> Result<String> {
        let started = Instant::now();
        let creds = self.credentials;
        let token = self
            .catalog
            .issue_token(
                &creds.client_id,
                &creds.client_secret,
                &creds.user,
                &creds.password,
            )
            .context("failed to renew myshows token")?;
        self.store.set_token(token.clone());
        debug!("token renewal took {:?}", started.elapsed());
        Ok(token)
    }
}
