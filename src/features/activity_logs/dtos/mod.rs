mod activity_log_dto;

pub use activity_log_dto::ActivityLogResponseDto;
