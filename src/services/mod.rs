pub mod email_service;
pub mod grading_service;
pub mod question_service;
pub mod storage_service;
pub mod transcript_service;
pub mod video_service;
