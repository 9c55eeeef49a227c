pub mod get_rankings_dto;
