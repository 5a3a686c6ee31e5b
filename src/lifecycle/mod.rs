//! Service lifecycle module.
//!
//! Drives the tunnel service through create, start, stop and status, and
//! projects native service states onto the stages reported to listeners:
//!
//! | Native state                  | Stage           |
//! |-------------------------------|-----------------|
//! | stopped, paused, absent       | `disconnected`  |
//! | stop-pending, pause-pending   | `disconnecting` |
//! | start-pending                 | `connecting`    |
//! | running                       | `connected`     |
//! | continue-pending              | `reconnecting`  |
//! | query denied, no manager      | `denied`        |
//! | anything else                 | `no_connection` |

mod controller;
mod listener;
mod stage;
mod timing;
mod worker;

pub use crate::scm::CreateSpec;
pub use controller::ServiceController;
pub use listener::StageListener;
pub use stage::ServiceStage;
pub use timing::LifecycleTiming;
pub use worker::ServiceWorker;
