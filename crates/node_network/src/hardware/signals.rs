//! Raw device signals fed into tier classification

use thiserror::Error;

/// Observable device characteristics
///
/// Every field is optional: browsers and sandboxes routinely hide some or
/// all of them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeviceSignals {
    /// User agent string
    pub user_agent: Option<String>,
    /// Number of logical CPU cores
    pub logical_cores: Option<u32>,
    /// Approximate device memory in gigabytes
    pub memory_gb: Option<f32>,
}

impl DeviceSignals {
    /// Probe what the current process can observe about its host.
    ///
    /// Only the core count is available through `std`; memory is left unset.
    pub fn probe_host() -> Self {
        let logical_cores = match std::thread::available_parallelism() {
            Ok(cores) => u32::try_from(cores.get()).ok(),
            Err(err) => {
                log::debug!("Core count unavailable: {}", err);
                None
            }
        };

        Self {
            user_agent: None,
            logical_cores,
            memory_gb: None,
        }
    }

    /// Whether no signal at all is present
    pub fn is_empty(&self) -> bool {
        self.user_agent.is_none() && self.logical_cores.is_none() && self.memory_gb.is_none()
    }
}

/// Hardware detection errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HardwareError {
    /// No device signal could be observed
    #[error("no device capability signals available")]
    SignalsUnavailable,
}
