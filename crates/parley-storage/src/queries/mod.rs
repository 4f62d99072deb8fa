// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed queries, one module per table.
//!
//! Every `*_at` / `last_checked` column is stamped by SQLite itself with
//! `strftime('%Y-%m-%dT%H:%M:%fZ', 'now')`, so callers never supply times.

pub mod bot_state;
pub mod processed;
pub mod threads;
