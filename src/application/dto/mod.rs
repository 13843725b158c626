pub mod conversion_dto;
