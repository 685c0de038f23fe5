pub mod flow;
pub mod login;

pub use flow::Flow;
pub use login::{
    begin_login, complete_login, identify, verify_state, CallbackError, CallbackParams,
    LoginOutcome, LoginStart,
};
