use serde::Deserialize;
use validator::Validate;

pub const DEFAULT_TOP: usize = 50;

#[derive(Debug, Default, Deserialize, Validate)]
pub struct GetRankingsDto {
    #[validate(range(min = 1, max = 1000, message = "top must be between 1 and 1000."))]
    pub top: Option<u16>,
}

impl GetRankingsDto {
    pub fn top(&self) -> usize {
        self.top.map(usize::from).unwrap_or(DEFAULT_TOP)
    }
}
