pub mod quiz_dto;
pub mod video_dto;
