use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct FindNodeDto {
    pub node_id: Option<String>,
}

impl FindNodeDto {
    pub fn node_id(&self) -> Option<u32> {
        parse_node_id(self.node_id.as_deref()?)
    }
}

pub fn parse_node_id(value: &str) -> Option<u32> {
    value.trim().parse::<u32>().ok()
}
