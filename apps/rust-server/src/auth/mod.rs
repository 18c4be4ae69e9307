// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Google ID token authentication for the Stride API.
//!
//! ## Auth Flow
//!
//! 1. The app signs the user in with Google and obtains an ID token
//! 2. The app sends `Authorization: Bearer <ID token>`
//! 3. The server:
//!    - Asks Google's `tokeninfo` endpoint whether the token is genuine
//!    - Checks that the token's `aud` is our OAuth client id
//!    - Caches the returned claims while the request is handled
//!
//! ## Security
//!
//! - Every protected request is verified again; claims never outlive the
//!   request that verified them
//! - Verification is bounded by a 10 second timeout and never retried

pub mod cache;
pub mod claims;
pub mod error;
pub mod extractor;
pub mod introspect;
pub mod middleware;

pub use cache::{ClaimCache, ClaimGuard};
pub use claims::Claims;
pub use error::AuthError;
pub use extractor::{BearerToken, EmailClaim};
pub use introspect::{TokenIntrospector, VERIFICATION_TIMEOUT};
pub use middleware::{authenticate, bearer_token, protect, AuthGate};
