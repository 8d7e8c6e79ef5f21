// ABOUTME: Bearer credential lifecycle shared by authenticated provider clients
// ABOUTME: Logs in lazily and retries a rejected request exactly once after re-authenticating
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Carbon Aware Contributors

//! # Credential Manager
//!
//! A provider client starts without a token. The first request triggers a
//! login; a `401`/`403` on a data request triggers one re-login followed by one
//! replay of that request. A second rejection is returned to the caller
//! untouched, so there is never a retry loop.

use reqwest::{Response, StatusCode};
use std::future::Future;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::errors::ProviderResult;

/// Whether `status` means the provider rejected our credential
#[must_use]
pub fn is_auth_rejection(status: StatusCode) -> bool {
    status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN
}

/// Cached bearer token for one provider client
#[derive(Debug)]
pub struct BearerCredential {
    provider: &'static str,
    token: RwLock<Option<String>>,
}

impl BearerCredential {
    /// Credential with no token yet
    #[must_use]
    pub const fn new(provider: &'static str) -> Self {
        Self {
            provider,
            token: RwLock::const_new(None),
        }
    }

    /// Current token, if a login has succeeded
    pub async fn token(&self) -> Option<String> {
        self.token.read().await.clone()
    }

    /// Whether a token is currently held
    pub async fn is_authenticated(&self) -> bool {
        self.token.read().await.is_some()
    }

    /// Forget the current token so the next request logs in again
    pub async fn invalidate(&self) {
        *self.token.write().await = None;
    }

    /// Run `login` and store the token it yields
    ///
    /// A failed login leaves the credential empty.
    ///
    /// # Errors
    ///
    /// Returns whatever error `login` produced.
    pub async fn login<L, LFut>(&self, login: &L) -> ProviderResult<String>
    where
        L: Fn() -> LFut + Sync,
        LFut: Future<Output = ProviderResult<String>> + Send,
    {
        debug!(provider = self.provider, "Requesting provider access token");
        match login().await {
            Ok(token) => {
                *self.token.write().await = Some(token.clone());
                info!(provider = self.provider, "Provider login succeeded");
                Ok(token)
            }
            Err(e) => {
                *self.token.write().await = None;
                warn!(provider = self.provider, error = %e, "Provider login failed");
                Err(e)
            }
        }
    }

    /// Send a request with the held token, re-authenticating at most once
    ///
    /// `send` receives the bearer token and must build a fresh request each
    /// time it is called. The returned response may still carry a non-success
    /// status; mapping it to an error is the caller's job.
    ///
    /// # Errors
    ///
    /// Returns the login error if authentication fails, or the transport error
    /// produced by `send`.
    pub async fn send_with_reauth<L, LFut, S, SFut>(
        &self,
        login: L,
        send: S,
    ) -> ProviderResult<Response>
    where
        L: Fn() -> LFut + Sync,
        LFut: Future<Output = ProviderResult<String>> + Send,
        S: Fn(String) -> SFut + Sync,
        SFut: Future<Output = ProviderResult<Response>> + Send,
    {
        let token = match self.token().await {
            Some(token) => token,
            None => self.login(&login).await?,
        };

        let response = send(token).await?;
        if !is_auth_rejection(response.status()) {
            return Ok(response);
        }

        warn!(
            provider = self.provider,
            status = response.status().as_u16(),
            "Provider rejected credential, re-authenticating once"
        );
        let token = self.login(&login).await?;
        send(token).await
    }
}
