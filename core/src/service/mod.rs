pub mod analysis;
pub mod diary_service;
pub mod dto;
pub mod export;
pub mod reminder_service;
