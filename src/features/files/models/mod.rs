mod file;

pub use file::{ExpiredFile, FileRecord, FileWithUploader, NewFileRecord};
