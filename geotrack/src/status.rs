use log::info;

/// Two binary health indicators, e.g. LEDs on a field unit.
///
/// The upload scheduler drives network health after every evaluation, the decoding path
/// drives fix health after every position sentence.
pub trait StatusIndicator {
    fn set_network_health(&mut self, healthy: bool);
    fn set_fix_health(&mut self, valid: bool);
}

/// Reports indicator transitions through the logger.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogIndicator {
    network: Option<bool>,
    fix: Option<bool>,
}

impl LogIndicator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn network_health(&self) -> Option<bool> {
        self.network
    }

    pub fn fix_health(&self) -> Option<bool> {
        self.fix
    }
}

impl StatusIndicator for LogIndicator {
    fn set_network_health(&mut self, healthy: bool) {
        if self.network.replace(healthy) != Some(healthy) {
            info!("Network {}", if healthy { "healthy" } else { "degraded" });
        }
    }

    fn set_fix_health(&mut self, valid: bool) {
        if self.fix.replace(valid) != Some(valid) {
            info!("GPS fix {}", if valid { "acquired" } else { "lost" });
        }
    }
}
