//! Shared windowing context
//!
//! [`WindowSystem`] owns the platform, remembers which window classes have
//! been registered, hands out control identifiers and decides what happens
//! when a caller breaks an API contract.

use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::ShellConfig;
use crate::foundation::Margins;
use crate::platform::{HeadlessPlatform, NativeHandle, Platform, PlatformResult};

/// First identifier handed to child controls
const FIRST_CONTROL_ID: u16 = 100;

/// What to do when a caller violates an API contract
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContractPolicy {
    /// Log and panic; the default for debug builds
    Abort,
    /// Log and return the violation as an error; the default for release builds
    Report,
}

impl Default for ContractPolicy {
    fn default() -> Self {
        if cfg!(debug_assertions) {
            Self::Abort
        } else {
            Self::Report
        }
    }
}

/// A caller broke an API contract
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContractViolation {
    /// Content margins must be non-negative
    #[error("content margins must be non-negative, got {0:?}")]
    NegativeMargins(Margins),

    /// Content spacing must be non-negative
    #[error("content spacing must be non-negative, got {0}")]
    NegativeSpacing(i32),

    /// Item padding must be non-negative
    #[error("item padding must be non-negative, got {0:?}")]
    NegativePadding(Margins),

    /// The handle already routes through an object
    #[error("handle {0:?} is already subclassed")]
    AlreadySubclassed(NativeHandle),

    /// The child has no native handle to lay out
    #[error("child window is not attached to a native handle")]
    UnattachedChild,
}

/// Per-thread windowing context shared by every window
///
/// Held behind `Rc`; each [`crate::window::Window`] keeps a strong reference so
/// the platform outlives every handle created through it.
pub struct WindowSystem {
    platform: Rc<dyn Platform>,
    classes: RefCell<HashSet<String>>,
    contract_policy: ContractPolicy,
    next_control_id: Cell<u16>,
}

impl WindowSystem {
    /// Create a context over `platform`
    pub fn new(platform: Rc<dyn Platform>, contract_policy: ContractPolicy) -> Rc<Self> {
        log::info!(
            "Window system on {} platform, contract policy {:?}",
            platform.name(),
            contract_policy
        );
        Rc::new(Self {
            platform,
            classes: RefCell::new(HashSet::new()),
            contract_policy,
            next_control_id: Cell::new(FIRST_CONTROL_ID),
        })
    }

    /// Create a context from a loaded configuration
    pub fn from_config(platform: Rc<dyn Platform>, config: &ShellConfig) -> Rc<Self> {
        Self::new(platform, config.contracts)
    }

    /// Create a context over a fresh [`HeadlessPlatform`]
    ///
    /// The concrete platform is returned as well so callers can drive and
    /// inspect the simulation.
    pub fn headless(contract_policy: ContractPolicy) -> (Rc<Self>, Rc<HeadlessPlatform>) {
        let platform = Rc::new(HeadlessPlatform::new());
        let system = Self::new(Rc::clone(&platform) as Rc<dyn Platform>, contract_policy);
        (system, platform)
    }

    /// Create a context over the native Win32 protocol
    #[cfg(windows)]
    pub fn native(contract_policy: ContractPolicy) -> Rc<Self> {
        Self::new(
            Rc::new(crate::platform::Win32Platform::current()),
            contract_policy,
        )
    }

    /// The platform all windows of this context live on
    pub fn platform(&self) -> &dyn Platform {
        self.platform.as_ref()
    }

    /// Shared reference to the platform, for owners that outlive a borrow
    pub fn platform_rc(&self) -> Rc<dyn Platform> {
        Rc::clone(&self.platform)
    }

    /// Active contract policy
    pub fn contract_policy(&self) -> ContractPolicy {
        self.contract_policy
    }

    /// True when `class_name` was registered through this context
    pub fn is_class_registered(&self, class_name: &str) -> bool {
        self.classes.borrow().contains(class_name)
    }

    /// Register `class_name` on first use
    ///
    /// Returns true when this call performed the registration. A failed
    /// registration is not remembered, so a later call retries it.
    pub fn ensure_class(&self, class_name: &str) -> PlatformResult<bool> {
        if self.is_class_registered(class_name) {
            return Ok(false);
        }
        self.platform.register_class(class_name)?;
        self.classes.borrow_mut().insert(class_name.to_string());
        log::debug!("Registered window class `{class_name}`");
        Ok(true)
    }

    /// Next identifier for a child control; never zero
    pub(crate) fn next_control_id(&self) -> u16 {
        let id = self.next_control_id.get();
        let next = id.checked_add(1).unwrap_or(FIRST_CONTROL_ID);
        self.next_control_id.set(next);
        id
    }

    /// Apply the contract policy to a violation
    ///
    /// Logs the violation, then panics under [`ContractPolicy::Abort`] or hands
    /// it back for the caller to return under [`ContractPolicy::Report`].
    pub fn report(&self, violation: ContractViolation) -> ContractViolation {
        log::error!("Contract violation: {violation}");
        if self.contract_policy == ContractPolicy::Abort {
            panic!("contract violation: {violation}");
        }
        violation
    }

    /// Ask the loop to stop with `exit_code`
    pub fn post_quit(&self, exit_code: i32) {
        log::debug!("Posting quit with exit code {exit_code}");
        self.platform.post_quit(exit_code);
    }
}
