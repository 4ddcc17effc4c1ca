mod cleanup_handler;
mod file_handler;

pub use cleanup_handler::{__path_trigger_cleanup, trigger_cleanup};
pub use file_handler::{
    __path_delete_file, __path_download_file, __path_get_file, __path_upload_file, delete_file,
    download_file, get_file, upload_file,
};
