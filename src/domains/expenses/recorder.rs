//! Expense recorder - the single write path shared by every transport.

use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::error::ExpenseError;
use super::sink::{ExpenseSink, NewExpense};

/// Records expenses against an injected persistence sink.
///
/// Success produces the confirmation text shown to clients. Persistence
/// failures come back as a typed error; converting them into the uniform
/// user-facing failure text is the tool layer's job, so every transport
/// surfaces the same outcome.
pub struct ExpenseRecorder {
    sink: Arc<dyn ExpenseSink>,
}

impl ExpenseRecorder {
    /// Create a recorder backed by the given sink.
    pub fn new(sink: Arc<dyn ExpenseSink>) -> Self {
        Self { sink }
    }

    /// Persist one expense and return the confirmation message.
    ///
    /// Exactly one insert per call; no retry and nothing to roll back.
    #[instrument(skip_all, fields(producto = %expense.producto))]
    pub async fn record(&self, expense: &NewExpense) -> Result<String, ExpenseError> {
        match self.sink.insert(expense).await {
            Ok(()) => {
                info!("Expense recorded: {}", expense.producto);
                Ok(format!(
                    "✅ Registrado: {} por {} COP.",
                    expense.producto,
                    format_cop(expense.valor_cop)
                ))
            }
            Err(e) => {
                warn!("Expense insert failed: {}", e);
                Err(e)
            }
        }
    }
}

/// Format an amount as a thousands-grouped, zero-decimal peso string.
///
/// `15000.0` -> `"$15,000"`.
pub fn format_cop(valor: f64) -> String {
    let rounded = valor.round() as i64;
    let digits = rounded.unsigned_abs().to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    if rounded < 0 {
        format!("-${grouped}")
    } else {
        format!("${grouped}")
    }
}
