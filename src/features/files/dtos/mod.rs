mod file_dto;

pub use file_dto::{
    DeleteFileResponseDto, OwnedFileResponseDto, PublicFileResponseDto, UploadFileDto,
    UploadResponseDto,
};
