//! Maps every collaborator's error type into the categorized [`gateway_types::GatewayError`]
//! that crosses the pipeline's boundary.

use gateway_types::GatewayError;

pub( crate ) fn from_ledger( error: gateway_ledger::LedgerError ) -> GatewayError
{
  match error
  {
    gateway_ledger::LedgerError::BudgetExceeded { .. } => GatewayError::BudgetExceeded( error.to_string() ),
    gateway_ledger::LedgerError::UnknownReservation( .. ) => GatewayError::Internal( error.to_string() ),
  }
}

pub( crate ) fn from_vault( error: gateway_vault::VaultError ) -> GatewayError
{
  match error
  {
    gateway_vault::VaultError::NotFound => GatewayError::ConfigurationError( "no provider credential configured for this project".into() ),
    gateway_vault::VaultError::SecretCorrupted( .. ) => GatewayError::ConfigurationError( error.to_string() ),
  }
}

pub( crate ) fn from_inference( error: gateway_reliability::InferenceError ) -> GatewayError
{
  match error
  {
    gateway_reliability::InferenceError::CircuitOpen | gateway_reliability::InferenceError::Timeout => GatewayError::Unavailable( error.to_string() ),
    gateway_reliability::InferenceError::ConnectionError( .. ) => GatewayError::Unavailable( error.to_string() ),
    gateway_reliability::InferenceError::ServerError( .. ) => GatewayError::Upstream( error.to_string() ),
    gateway_reliability::InferenceError::ClientError { .. } => GatewayError::Upstream( error.to_string() ),
  }
}
