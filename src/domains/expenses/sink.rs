//! Persistence sink for expense records.
//!
//! The sink is the only component that talks to the storage backend. It is
//! constructor-injected into the recorder so tests can substitute a fake.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

use super::error::ExpenseError;
use crate::core::config::SupabaseConfig;

/// A fully validated expense record, ready to be persisted.
///
/// Construction goes through [`NewExpense::new`] so that every record in the
/// system satisfies the field invariants: non-empty product, non-negative
/// finite amount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewExpense {
    /// Name of the product or service purchased.
    pub producto: String,

    /// Amount in Colombian pesos.
    pub valor_cop: f64,

    /// Free-form note. Empty string when the caller omitted it.
    pub descripcion: String,
}

impl NewExpense {
    /// Build a record, validating the field invariants.
    pub fn new(
        producto: impl Into<String>,
        valor_cop: f64,
        descripcion: impl Into<String>,
    ) -> Result<Self, ExpenseError> {
        let producto = producto.into();
        if producto.trim().is_empty() {
            return Err(ExpenseError::invalid_argument("'producto' must not be empty"));
        }
        if !valor_cop.is_finite() {
            return Err(ExpenseError::invalid_argument(
                "'valor_cop' must be a finite number",
            ));
        }
        if valor_cop < 0.0 {
            return Err(ExpenseError::invalid_argument(
                "'valor_cop' must not be negative",
            ));
        }
        Ok(Self {
            producto,
            valor_cop,
            descripcion: descripcion.into(),
        })
    }
}

/// Storage backend boundary: one operation, one row per call.
///
/// Implementations must be safe to share across concurrent requests; the
/// server holds a single handle and performs no locking around it.
#[async_trait]
pub trait ExpenseSink: Send + Sync {
    /// Persist one expense record. Either the whole row is written or the
    /// call fails; there is no partial-write state.
    async fn insert(&self, expense: &NewExpense) -> Result<(), ExpenseError>;
}

/// Sink backed by the Supabase REST API (PostgREST insert).
pub struct SupabaseSink {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl SupabaseSink {
    /// Create a sink for the configured project and table.
    ///
    /// The underlying HTTP client carries a bounded request timeout so a
    /// stalled backend cannot suspend a request indefinitely.
    pub fn new(config: &SupabaseConfig) -> Result<Self, ExpenseError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ExpenseError::persistence(format!("failed to build HTTP client: {e}")))?;

        let endpoint = format!(
            "{}/rest/v1/{}",
            config.url.trim_end_matches('/'),
            config.table
        );

        Ok(Self {
            http,
            endpoint,
            api_key: config.anon_key.clone(),
        })
    }

    /// The REST endpoint rows are posted to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ExpenseSink for SupabaseSink {
    #[instrument(skip_all, fields(producto = %expense.producto))]
    async fn insert(&self, expense: &NewExpense) -> Result<(), ExpenseError> {
        debug!("Inserting expense row via {}", self.endpoint);

        let response = self
            .http
            .post(&self.endpoint)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header("Prefer", "return=minimal")
            .json(expense)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(ExpenseError::persistence(format!(
            "insert failed ({status}): {body}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_expense_valid() {
        let expense = NewExpense::new("Café", 15000.0, "").unwrap();
        assert_eq!(expense.producto, "Café");
        assert_eq!(expense.valor_cop, 15000.0);
        assert_eq!(expense.descripcion, "");
    }

    #[test]
    fn test_new_expense_empty_product_rejected() {
        let err = NewExpense::new("   ", 100.0, "").unwrap_err();
        assert!(matches!(err, ExpenseError::InvalidArgument(_)));
        assert!(err.to_string().contains("producto"));
    }

    #[test]
    fn test_new_expense_negative_amount_rejected() {
        let err = NewExpense::new("Pan", -1.0, "").unwrap_err();
        assert!(matches!(err, ExpenseError::InvalidArgument(_)));
        assert!(err.to_string().contains("valor_cop"));
    }

    #[test]
    fn test_new_expense_non_finite_amount_rejected() {
        assert!(NewExpense::new("Pan", f64::NAN, "").is_err());
        assert!(NewExpense::new("Pan", f64::INFINITY, "").is_err());
    }

    #[test]
    fn test_new_expense_zero_amount_allowed() {
        assert!(NewExpense::new("Muestra gratis", 0.0, "promo").is_ok());
    }

    #[test]
    fn test_supabase_endpoint_construction() {
        let config = SupabaseConfig {
            url: "https://example.supabase.co/".to_string(),
            anon_key: "anon".to_string(),
            table: "gastos".to_string(),
            timeout_secs: 10,
        };
        let sink = SupabaseSink::new(&config).unwrap();
        assert_eq!(sink.endpoint(), "https://example.supabase.co/rest/v1/gastos");
    }

    #[test]
    fn test_expense_serializes_with_wire_field_names() {
        let expense = NewExpense::new("Pan", 5000.0, "desayuno").unwrap();
        let value = serde_json::to_value(&expense).unwrap();
        assert_eq!(value["producto"], "Pan");
        assert_eq!(value["valor_cop"], 5000.0);
        assert_eq!(value["descripcion"], "desayuno");
    }
}
