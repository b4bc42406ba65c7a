// ABOUTME: Core data models for users, purchase items, tokens, and login sessions
// ABOUTME: Plain serde types shared by the database, service, and route layers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Daily Cost Contributors

mod auth;
mod item;
mod session;
mod user;

pub use auth::{TokenPair, UserInfo};
pub use item::{Item, ItemChanges, ItemFilter, NewItem, SortField, SortOrder};
pub use session::{LoginSession, SessionStatus};
pub use user::{NewUser, User};
