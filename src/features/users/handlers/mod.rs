pub mod user_handler;

pub use user_handler::{
    __path_get_current_user, __path_list_my_files, get_current_user, list_my_files,
};
