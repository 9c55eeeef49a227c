pub mod find_node_dto;
