pub mod dispatcher;
pub mod extractor;
pub mod handler;
pub mod request;
pub mod resolver;
pub mod response;
pub mod validator;

pub use crate::domain::model::{
    BuildProject, BuildTriggerRequest, DispatchAction, DispatchResult, RefChange,
};
pub use crate::domain::ports::{BuildSystem, ConfigProvider};
pub use crate::utils::error::Result;
