//! Built-in metric modules.

mod battery;
mod network;
mod unlock;

pub use battery::BatteryModule;
pub use network::NetworkModule;
pub use unlock::UnlockModule;

use crate::monitor::Module;

/// The fixed module set, in registration order.
pub fn builtin() -> Vec<Box<dyn Module>> {
    vec![
        Box::new(BatteryModule::new()),
        Box::new(NetworkModule::new()),
        Box::new(UnlockModule::new()),
    ]
}
