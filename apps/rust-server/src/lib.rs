// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Stride - Run Logging & Social Backend
//!
//! REST backend for a running app: users sign in with a Google ID token,
//! record runs, keep preferences and relate to other users and clubs.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - ID token verification gate and request-scoped claim cache
//! - `relations` - Friend, club and block relations
//! - `storage` - Embedded redb persistence

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod relations;
pub mod state;
pub mod storage;
