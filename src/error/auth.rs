//! OAuth and token handling error types.
//!
//! This module defines errors raised by the Discord OAuth orchestrator and the
//! token encryption layer: one-time state validation, authorization-code and
//! refresh grants, and AEAD encrypt/decrypt of stored tokens.

use oauth2::{basic::BasicErrorResponseType, HttpClientError, StandardErrorResponse};
use thiserror::Error;

/// Authentication and token error type.
#[derive(Error, Debug)]
pub enum AuthError {
    /// OAuth state was absent, expired, or already consumed.
    ///
    /// The callback's `state` parameter did not match a live row in the
    /// one-time state store. Presenting the same state twice always fails the
    /// second attempt with this error.
    #[error("OAuth state is invalid, expired, or already used")]
    InvalidOauthState,

    /// A Discord account required for the operation is not linked.
    #[error("No linked Discord account found for user ID {0}")]
    DiscordAccountNotLinked(i32),

    /// An OAuth callback arrived with no user to bind to.
    ///
    /// The state carried no `user_id` and the Discord account has never been
    /// linked before, so there is no internal user to attach the tokens to.
    #[error("OAuth callback has no user to bind: state carried no user id and the account is not linked")]
    NoLinkTarget,

    /// OAuth2 token exchange or refresh failed.
    ///
    /// The authorization code or refresh token could not be exchanged at
    /// Discord's token endpoint. For the refresh loop this is recorded and
    /// retried on the next tick; the stored tokens remain unchanged.
    #[error(transparent)]
    RequestTokenErr(
        #[from]
        oauth2::RequestTokenError<
            HttpClientError<reqwest::Error>,
            StandardErrorResponse<BasicErrorResponseType>,
        >,
    ),

    /// A URL built from configuration failed to parse.
    #[error(transparent)]
    UrlParse(#[from] url::ParseError),

    /// OpenSSL failure while encrypting or decrypting a stored token.
    ///
    /// Includes AEAD tag mismatches, which indicate the ciphertext was
    /// tampered with or the cipher secret changed.
    #[error(transparent)]
    Crypto(#[from] openssl::error::ErrorStack),

    /// A stored token payload could not be decoded.
    ///
    /// The base64 envelope around the nonce, tag, and ciphertext is damaged.
    #[error("Stored token payload is malformed")]
    MalformedTokenPayload,
}
