// Purpose: Own the realtime state and carry control across threads
// The audio callback owns a GlitchProcessor; everything else talks to it
// through a GlitchHandle and reads back through the ProcessorMonitor.

pub mod glitch;
#[cfg(feature = "rtrb")]
pub mod handle;
pub mod message;
pub mod monitor;

pub use glitch::GlitchProcessor;
#[cfg(feature = "rtrb")]
pub use handle::{build, GlitchHandle};
pub use message::{ControlMessage, MessageReceiver, NoMessages};
pub use monitor::ProcessorMonitor;
