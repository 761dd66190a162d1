// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # rolegate-core
//!
//! Identity resolution, lazy profile provisioning and role-based access
//! control for rolegate.
//!
//! - **Types**: `ProfileId`, `RoleName`, `Profile`, `Role`, `Principal`
//! - **Error**: `CoreError` taxonomy and `StoreError`
//! - **Store**: `ProfileStore` and `RoleCatalog` contracts
//! - **Provision**: first-contact profile creation
//! - **Roles**: per-request role loading
//! - **Guard**: composable authorization guards
//! - **Admin**: role and membership administration
//! - **Directory**: profile reads and self-service updates
//!
//! ## Example
//!
//! ```rust,ignore
//! use rolegate_core::{Identity, ProfileProvisioner, RoleResolver, GuardChain};
//!
//! let provisioned = provisioner.get_or_create(&identity).await?;
//! let roles = resolver.load_roles(&provisioned.profile.id).await?;
//! let principal = Principal::new(provisioned.profile, roles);
//!
//! GuardChain::admin().evaluate(Some(&principal))?;
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]

pub mod admin;
pub mod directory;
pub mod error;
pub mod guard;
pub mod provision;
pub mod roles;
pub mod store;
pub mod types;

pub use admin::{RoleAdministration, RoleDefinition};
pub use directory::ProfileDirectory;
pub use error::{AuthFailure, ConflictKind, CoreError, CoreResult, StoreError, StoreResult};
pub use guard::{Guard, GuardChain, GuardMode, Guarded, RoleGuard};
pub use provision::{ProfileProvisioner, Provisioned};
pub use roles::RoleResolver;
pub use store::{ProfileStore, RoleCatalog};
pub use types::*;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
