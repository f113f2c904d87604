mod telegram_dto;

pub use telegram_dto::{ChatQuery, LinkChatDto, LinkStatusDto, LinkTokenResponseDto};
