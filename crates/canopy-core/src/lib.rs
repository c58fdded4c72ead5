//! Canopy Core - Permission resolution and access gating.
//!
//! This crate answers one question: may this user perform this action on
//! this object? Objects are nested (workspace → space → page) with content
//! blocks overlaid on pages.
//!
//! # Architecture
//!
//! ```text
//! request (user, object, action)
//!        │
//!        ▼
//!  PermissionCore ──► AbilityCache ──miss──► AbilityBuilder
//!        │                                        │
//!        │                              RoleResolver + GrantStore
//!        │
//!        └──► BlockAccessGate (page renders and block mutations)
//!                     │
//!             block permission rows
//! ```
//!
//! Page- and space-level access comes from the ability layer: the space
//! role (admins get everything, unconditionally) unioned with explicit
//! grants to the user or their groups. Block-level rows then narrow what is
//! visible or editable inside a page the user can already reach; they never
//! widen access.
//!
//! Every store failure propagates as an error and is treated by callers as
//! a deny. The engine never retries and never falls back to an allow.

pub mod ability;
pub mod cache;
pub mod config;
pub mod gate;
pub mod resolver;
pub mod service;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use ability::AbilityBuilder;
pub use cache::{AbilityCache, CachedAbility, ScopeKey};
pub use config::PermissionConfig;
pub use gate::BlockAccessGate;
pub use resolver::RoleResolver;
pub use service::PermissionCore;
