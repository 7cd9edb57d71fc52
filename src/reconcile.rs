//! Farm update reconciliation.
//!
//! Pure validation and application of a requested farm mutation against an
//! in-memory [`Config`]. Performs no I/O: the caller loads the config, calls
//! [`reconcile`], and persists the result on success. On any error the
//! original config is untouched — the operation either fully applies or not
//! at all.

use std::collections::BTreeSet;
use thiserror::Error;

use crate::config::Config;

// ============================================================================
// Request
// ============================================================================

/// What to do with the default-farm selection.
///
/// Tri-state on purpose: an absent `--default` flag must leave the selection
/// alone, while an explicit `--default=false` clears it even if it points at
/// a different farm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DefaultDirective {
    /// Leave the default-farm selection as is
    #[default]
    Unchanged,
    /// Make the target farm the default
    Set,
    /// Clear the default-farm selection entirely
    Clear,
}

impl DefaultDirective {
    /// Build a directive from a tri-state CLI flag value
    pub fn from_flag(flag: Option<bool>) -> Self {
        match flag {
            None => Self::Unchanged,
            Some(true) => Self::Set,
            Some(false) => Self::Clear,
        }
    }
}

/// A requested mutation of a single farm
#[derive(Debug, Clone, Default)]
pub struct UpdateRequest {
    /// Connection names to add to the farm
    pub add: Vec<String>,
    /// Connection names to remove from the farm
    pub remove: Vec<String>,
    /// What to do with the default-farm selection
    pub default: DefaultDirective,
}

impl UpdateRequest {
    /// Whether the request carries no actionable change
    pub fn is_empty(&self) -> bool {
        self.add.is_empty()
            && self.remove.is_empty()
            && self.default == DefaultDirective::Unchanged
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Validation failures when updating a farm.
///
/// All variants are terminal for the invocation: nothing was mutated and
/// nothing should be persisted.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UpdateError {
    /// Request carried no additions, removals, or default change
    #[error(
        "nothing to update for farm {0:?}, please use the --add, --remove, or --default flags to update a farm"
    )]
    NothingToUpdate(String),

    /// The configuration holds no farms at all
    #[error("no farms are created at this time, there is nothing to update")]
    NoFarmsExist,

    /// The named farm is not in the configuration
    #[error("cannot update farm, {0:?} farm doesn't exist")]
    FarmNotFound(String),

    /// A removal named a connection that is not a member of the farm
    #[error("cannot remove from farm, {0:?} is not a connection in the farm")]
    ConnectionNotInFarm(String),

    /// An addition named a connection absent from the registry
    #[error("cannot add to farm, {0:?} is not a system connection")]
    UnknownConnection(String),
}

// ============================================================================
// Reconciler
// ============================================================================

/// Apply an [`UpdateRequest`] to the named farm, returning the new config.
///
/// Validation order: non-empty request, non-empty farm collection, farm
/// exists. Removals are validated and applied strictly before additions, so
/// a name present in both lists ends the operation as a member (removed,
/// then re-added). Additions are idempotent: re-adding a present connection
/// succeeds with unchanged membership.
pub fn reconcile(
    config: &Config,
    farm_name: &str,
    request: &UpdateRequest,
) -> Result<Config, UpdateError> {
    if request.is_empty() {
        return Err(UpdateError::NothingToUpdate(farm_name.to_string()));
    }

    if config.farms.list.is_empty() {
        return Err(UpdateError::NoFarmsExist);
    }

    let Some(current) = config.farms.list.get(farm_name) else {
        return Err(UpdateError::FarmNotFound(farm_name.to_string()));
    };

    let mut updated = config.clone();

    match request.default {
        DefaultDirective::Set => updated.farms.default = farm_name.to_string(),
        DefaultDirective::Clear => updated.farms.default.clear(),
        DefaultDirective::Unchanged => {}
    }

    let mut connections: BTreeSet<String> = current.clone();

    // Removals first: a name in both lists ends up present, not absent
    for name in &request.remove {
        if !connections.remove(name) {
            return Err(UpdateError::ConnectionNotInFarm(name.clone()));
        }
    }

    for name in &request.add {
        if !config.has_connection(name) {
            return Err(UpdateError::UnknownConnection(name.clone()));
        }
        connections.insert(name.clone());
    }

    updated.farms.list.insert(farm_name.to_string(), connections);

    Ok(updated)
}

// ============================================================================
// Tests
// ============================================================================
