pub mod glints;
pub mod jobstreet;
pub mod kalibrr;

pub use glints::GlintsClient;
pub use jobstreet::JobStreetClient;
pub use kalibrr::KalibrrClient;

use crate::crawler::JobBoard;
use crate::models::Platform;

pub fn adapter_for(platform: Platform) -> Box<dyn JobBoard> {
    match platform {
        Platform::Kalibrr => Box::new(KalibrrClient::new()),
        Platform::Glints => Box::new(GlintsClient::new()),
        Platform::JobStreet => Box::new(JobStreetClient::new()),
    }
}
