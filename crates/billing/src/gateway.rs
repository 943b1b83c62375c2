//! Payment gateway abstraction
//!
//! The billing services take a gateway as an explicit dependency so tests
//! can substitute a fake and cash/manual flows can skip the network
//! entirely. Every gateway call is a single attempt.

use async_trait::async_trait;
use stripe::{Client, CreatePaymentIntent, Currency, PaymentIntent, PaymentIntentStatus};

use crate::error::{BillingError, BillingResult};

/// Outcome of creating a charge with a gateway.
#[derive(Debug, Clone)]
pub struct ChargeOutcome {
    /// Gateway-side reference, recorded on the payment row.
    pub gateway_id: Option<String>,
    /// Client secret for checkout UIs, when the gateway issues one.
    pub client_secret: Option<String>,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create a charge for `amount` in `currency`. Amounts are in major
    /// units (e.g. pounds), not cents.
    async fn create_charge(
        &self,
        amount: f64,
        currency: &str,
        description: &str,
    ) -> BillingResult<ChargeOutcome>;

    /// Confirm that a previously created charge settled.
    async fn confirm_charge(&self, gateway_id: &str) -> BillingResult<bool>;
}

/// Stripe-backed gateway using PaymentIntents.
pub struct StripeGateway {
    client: Client,
}

impl StripeGateway {
    pub fn new(secret_key: &str) -> Self {
        Self {
            client: Client::new(secret_key),
        }
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_charge(
        &self,
        amount: f64,
        currency: &str,
        description: &str,
    ) -> BillingResult<ChargeOutcome> {
        let currency: Currency = currency
            .to_lowercase()
            .parse()
            .map_err(|_| BillingError::Gateway(format!("unsupported currency '{}'", currency)))?;

        let mut params = CreatePaymentIntent::new((amount * 100.0).round() as i64, currency);
        params.description = Some(description);

        let intent = PaymentIntent::create(&self.client, params)
            .await
            .map_err(|e| BillingError::Gateway(e.to_string()))?;

        Ok(ChargeOutcome {
            gateway_id: Some(intent.id.to_string()),
            client_secret: intent.client_secret,
        })
    }

    async fn confirm_charge(&self, gateway_id: &str) -> BillingResult<bool> {
        let id = gateway_id.parse().map_err(|_| {
            BillingError::Gateway(format!("invalid payment intent id '{}'", gateway_id))
        })?;

        let intent = PaymentIntent::retrieve(&self.client, &id, &[])
            .await
            .map_err(|e| BillingError::Gateway(e.to_string()))?;

        Ok(intent.status == PaymentIntentStatus::Succeeded)
    }
}

/// Gateway for cash/manual flows: no external call, always settled.
pub struct LocalGateway;

#[async_trait]
impl PaymentGateway for LocalGateway {
    async fn create_charge(
        &self,
        _amount: f64,
        _currency: &str,
        _description: &str,
    ) -> BillingResult<ChargeOutcome> {
        Ok(ChargeOutcome {
            gateway_id: None,
            client_secret: None,
        })
    }

    async fn confirm_charge(&self, _gateway_id: &str) -> BillingResult<bool> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn local_gateway_settles_without_reference() {
        let outcome = LocalGateway
            .create_charge(100.0, "EGP", "subscription")
            .await
            .unwrap();
        assert!(outcome.gateway_id.is_none());
        assert!(LocalGateway.confirm_charge("anything").await.unwrap());
    }
}
