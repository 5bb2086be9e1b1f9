pub mod error;
pub mod mapper;
pub mod sink;
pub mod types;

pub use error::*;
pub use mapper::*;
pub use sink::*;
pub use types::*;

#[cfg(test)]
mod tests {
    use super::{
        notification_for_outcome, CallToAction, CommandNavigator, LogNavigator, LogNotifier,
        NotificationMessage, NotificationSeverity, NotificationTopic, NotifierKind, NotifyError,
        StdoutNavigator, StdoutNotifier,
    };
    use std::any::TypeId;
    use wb_core::outcome::BranchCreationReport;

    #[test]
    fn crate_root_reexports_types() {
        let _ = TypeId::of::<NotifyError>();
        let _ = TypeId::of::<NotificationMessage>();
        let _ = TypeId::of::<NotificationSeverity>();
        let _ = TypeId::of::<NotificationTopic>();
        let _ = TypeId::of::<NotifierKind>();
        let _ = TypeId::of::<CallToAction>();
        let _ = TypeId::of::<StdoutNotifier>();
        let _ = TypeId::of::<LogNotifier>();
        let _ = TypeId::of::<StdoutNavigator>();
        let _ = TypeId::of::<LogNavigator>();
        let _ = TypeId::of::<CommandNavigator>();
    }

    #[test]
    fn crate_root_reexports_mapper_helper() {
        let _mapper: fn(&BranchCreationReport) -> NotificationMessage = notification_for_outcome;
    }
}
