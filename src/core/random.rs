use crate::domain::model::{Empty, RandomNumberResponse};
use crate::rpc::service::ExternalConverterService;
use crate::rpc::status::Status;
use async_trait::async_trait;

pub const RANDOM_MIN: i32 = 0;
pub const RANDOM_MAX: i32 = 100;

/// Answers `GetRandomNumber` with a uniform integer in `RANDOM_MIN..=RANDOM_MAX`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomNumberListener;

#[async_trait]
impl ExternalConverterService for RandomNumberListener {
    async fn get_random_number(
        &self,
        _request: Empty,
    ) -> Result<RandomNumberResponse, Status> {
        let random_number = rand::random_range(RANDOM_MIN..=RANDOM_MAX);
        tracing::debug!("Generated random number {}", random_number);
        Ok(RandomNumberResponse { random_number })
    }
}
