pub mod capability;
pub mod dispatcher;
pub mod registry;
