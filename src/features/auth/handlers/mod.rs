pub mod auth_handler;

pub use auth_handler::{
    __path_callback_github, __path_get_session, __path_sign_out, __path_signin_github,
    callback_github, get_session, sign_out, signin_github,
};
