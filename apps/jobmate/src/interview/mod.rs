//! Turn-based interview flow against the backend interview service.

pub mod controller;
pub mod session;

use async_trait::async_trait;

use crate::errors::ClientError;
use crate::models::interview::{
    GenerateQuestionRequest, GenerateQuestionResponse, SubmitAnswerRequest, SubmitAnswerResponse,
};

pub use controller::InterviewController;
pub use session::InterviewSession;

/// Backend operations the interview flow depends on. Implemented by
/// `ApiClient`; tests substitute scripted fakes.
#[async_trait]
pub trait InterviewService: Send + Sync {
    async fn generate_question(
        &self,
        request: GenerateQuestionRequest<'_>,
    ) -> Result<GenerateQuestionResponse, ClientError>;

    async fn submit_answer(
        &self,
        request: SubmitAnswerRequest<'_>,
    ) -> Result<SubmitAnswerResponse, ClientError>;
}
